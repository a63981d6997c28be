//! Application services: use-case orchestration.
//!
//! Each service module implements a single use-case by composing domain logic
//! with port trait calls. Services import only from `crate::domain` and
//! `crate::application::ports`: never from `crate::infra`, `crate::commands`,
//! or `crate::output`.

pub mod artifact_fetch;
pub mod config_install;
pub mod install_flow;
pub mod installer;
pub mod platform_probe;
pub mod removal;
