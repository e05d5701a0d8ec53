//! Fixture loading helpers for the integration tests.

use std::path::PathBuf;

/// Path of a fixture under this crate's `test_fixtures/` directory.
pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("test_fixtures")
        .join(name)
}

/// Read a fixture file into a string, panicking with the resolved path
/// when it cannot be read.
pub fn load_fixture(name: &str) -> String {
    let path = fixture_path(name);
    std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("failed to load fixture {}: {}", path.display(), e))
}
