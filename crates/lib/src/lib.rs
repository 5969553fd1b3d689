//!
//! Propbag: path-addressable nested collections and typed property registries.
//!
//! ## Core Concepts
//!
//! * **Values (`value::Value`)**: JSON-like nodes: scalars, ordered lists and ordered string-keyed maps.
//! * **Paths (`path::KeyPath`)**: Slash-delimited (or pre-split) addresses of nested values. Reads never
//!   create nodes; writes create missing intermediate maps and refuse to descend through scalars.
//! * **Merging (`merge`)**: Deep insert, deep merge, list append with union, de-duplication and
//!   other structural helpers over nested maps.
//! * **Collections (`collection::Collection`)**: An owned root map with typed getters, batch mutation
//!   (union, replace, merge, push, prepend) and path access.
//! * **Properties (`property::Property`)**: Typed field descriptors with defaults, grouping and UI hints.
//! * **Registries (`registry::PropertyRegistry`)**: Collections of serialized descriptors with
//!   group-aware batch reads and writes.

pub mod collection;
pub mod config;
pub mod loader;
pub mod merge;
pub mod path;
pub mod property;
pub mod registry;
pub mod value;

pub use collection::Collection;
pub use config::ConfigProperties;
pub use path::{KeyPath, PathError};
pub use property::{Property, PropertyError, PropertyType};
pub use registry::{Descriptor, GROUPS_KEY, PropertyRegistry};
pub use value::{Equality, Map, Value};

/// Result type used throughout the Propbag library.
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for the Propbag library.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Structured path errors from the path module
    #[error(transparent)]
    Path(#[from] path::PathError),

    /// Structured property errors from the property module
    #[error(transparent)]
    Property(#[from] property::PropertyError),
}

impl Error {
    /// Get the originating module for this error.
    pub fn module(&self) -> &'static str {
        match self {
            Error::Io(_) => "io",
            Error::Serialize(_) => "serialize",
            Error::Path(_) => "path",
            Error::Property(_) => "property",
        }
    }

    /// Check if this error is a structural failure (writing through a scalar
    /// or onto a reserved registry key).
    pub fn is_structural_error(&self) -> bool {
        match self {
            Error::Path(_) => true,
            Error::Property(property_err) => property_err.is_reserved_name(),
            _ => false,
        }
    }

    /// Check if this error is a malformed shorthand descriptor.
    pub fn is_parse_error(&self) -> bool {
        match self {
            Error::Property(property_err) => property_err.is_parse_error(),
            _ => false,
        }
    }

    /// Check if this error is I/O related.
    pub fn is_io_error(&self) -> bool {
        matches!(self, Error::Io(_))
    }
}
