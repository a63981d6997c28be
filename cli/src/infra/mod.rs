//! Infrastructure layer: concrete implementations of application port traits.
//!
//! This module contains all I/O-performing code: process execution, HTTP,
//! filesystem access, archive extraction, and host inspection.
//!
//! Imports from `crate::domain` and `crate::application::ports` are allowed.
//! Imports from `crate::commands` or `crate::output` are forbidden.

pub mod archive;
pub mod assets;
pub mod clock;
pub mod command_runner;
pub mod config;
pub mod fs;
pub mod http;
pub mod platform;
