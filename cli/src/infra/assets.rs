//! Embedded assets: documents compiled into the installer binary.

use crate::application::ports::BundledAssets;

/// Default collector configuration (`assets/config.yaml`).
static DEFAULT_CONFIG: &[u8] = include_bytes!("../../assets/config.yaml");

/// Production `BundledAssets` serving the compiled-in documents.
pub struct EmbeddedAssets;

impl BundledAssets for EmbeddedAssets {
    fn default_config(&self) -> &'static [u8] {
        DEFAULT_CONFIG
    }
}
