//! Domain layer: pure installer rules, types, and validation.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All functions are synchronous and take data in, returning data out.

pub mod backup;
pub mod config;
pub mod error;
pub mod layout;
pub mod options;
pub mod platform;

pub use config::{DocumentCheck, InstallerSettings};
pub use error::{ConfigError, FetchError, InstallError, PlatformError};
pub use layout::InstallLayout;
pub use options::{ConfigSource, Mode, RunOptions, Step};
pub use platform::{
    Architecture, InstallTarget, PackageManager, PackageStrategy, PlatformFacts,
};
