//! Declaring configurable settings as property registries.

use crate::{Result, registry::PropertyRegistry, value::Map};

/// Implemented by components that expose configurable settings.
///
/// # Example
///
/// ```
/// use propbag::{ConfigProperties, PropertyRegistry, Result};
///
/// struct Mailer;
///
/// impl ConfigProperties for Mailer {
///     fn init_config_properties(&self, properties: &mut PropertyRegistry) -> Result<()> {
///         properties
///             .property("host", "type=text|default=localhost")?
///             .property("port", "type=number|default=25")?;
///         Ok(())
///     }
/// }
///
/// let config = Mailer.create_config_properties()?;
/// assert_eq!(config.len(), 2);
/// # Ok::<(), propbag::Error>(())
/// ```
pub trait ConfigProperties {
    /// Registers this component's settings.
    fn init_config_properties(&self, properties: &mut PropertyRegistry) -> Result<()>;

    /// Builds a fresh registry, populates it, and returns its serialized form.
    fn create_config_properties(&self) -> Result<Map> {
        let mut properties = PropertyRegistry::new();
        self.init_config_properties(&mut properties)?;
        Ok(properties.into_map())
    }

    /// Restores previously serialized settings, or an empty registry when
    /// `text` is not a JSON object.
    fn load_config_properties(&self, text: &str) -> PropertyRegistry {
        PropertyRegistry::from_json_str(text)
    }
}
