/*! Integration tests for Propbag.
 *
 * This test suite is organized as a single integration test binary
 * following the pattern described by matklad in
 * https://matklad.github.io/2021/02/27/delete-cargo-integration-tests.html
 *
 * The module structure mirrors the main library structure:
 * - path: Tests for path parsing, traversal and structural writes
 * - merge: Tests for the structural merge helpers
 * - collection: Tests for Collection getters and batch mutation
 * - property: Tests for Property descriptors and shorthand parsing
 * - registry: Tests for PropertyRegistry storage, groups and batch values
 * - loader: Tests for JSON loading at the collection boundary
 */

use tracing_subscriber::EnvFilter;

#[ctor::ctor]
fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("propbag=info".parse().unwrap()),
        )
        .with_test_writer()
        .try_init();
}

mod loader;
mod path;
mod property;
mod registry;
