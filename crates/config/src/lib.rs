//! Configuration schema and discovery for ferry.
//!
//! Config files: `ferry.toml`, `ferry.yaml`, `ferry.yml` or `ferry.json`,
//! searched in `./` then the user config directory.

pub mod loader;
pub mod schema;

pub use {
    loader::{config_dir, data_dir, discover_and_load, load_config},
    schema::{FerryConfig, MediaConfig, MetricsConfig, UploadTrust},
};
