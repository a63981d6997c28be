//! Typed domain error enums.
//!
//! All error types implement `thiserror::Error` and convert to `anyhow::Error`
//! via the `?` operator. Callers that need to branch on the failure kind use
//! `anyhow::Error::downcast_ref`.

use std::path::PathBuf;

use thiserror::Error;

// ── Platform errors ───────────────────────────────────────────────────────────

/// The host cannot run any published collector artifact.
#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("unsupported operating system '{kernel}': only Linux hosts are supported")]
    UnsupportedOs { kernel: String },

    #[error("unsupported architecture '{machine}': supported are amd64 (x86_64) and arm64 (aarch64)")]
    UnsupportedArchitecture { machine: String },
}

// ── Fetch errors ──────────────────────────────────────────────────────────────

/// A download did not produce a usable file.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("download of {url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("download of {url} failed: {reason}")]
    Transport { url: String, reason: String },

    #[error("cannot write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no checksum for {file} in {url}")]
    ChecksumUnavailable { file: String, url: String },

    #[error("checksum mismatch for {file}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        file: String,
        expected: String,
        actual: String,
    },
}

// ── Install errors ────────────────────────────────────────────────────────────

/// The artifact could not be applied to the host.
#[derive(Debug, Error)]
pub enum InstallError {
    #[error("package manager '{manager}' is not available: {reason}")]
    ManagerUnavailable { manager: String, reason: String },

    #[error("'{manager}' failed to install {file} (exit code {}): {stderr}", exit_code_label(.exit_code))]
    PackageManager {
        manager: String,
        file: String,
        exit_code: Option<i32>,
        stderr: String,
    },

    #[error("cannot unpack {archive}: {reason}")]
    Extract { archive: PathBuf, reason: String },

    #[error("binary '{binary}' not found in {archive}")]
    BinaryNotFound { archive: PathBuf, binary: String },

    #[error("cannot place binary at {path}: {reason}")]
    Place { path: PathBuf, reason: String },
}

fn exit_code_label(code: &Option<i32>) -> String {
    code.map_or_else(|| "none".to_string(), |c| c.to_string())
}

// ── Config errors ─────────────────────────────────────────────────────────────

/// Configuration document or installer settings failures.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot create configuration directory {path}: {reason}")]
    CreateDir { path: PathBuf, reason: String },

    #[error("cannot copy configuration to {path}: {reason}")]
    Copy { path: PathBuf, reason: String },

    #[error("cannot set permissions on {path}: {reason}")]
    Permissions { path: PathBuf, reason: String },

    #[error("configuration source {source_path} is not readable: {reason}")]
    Source { source_path: String, reason: String },

    #[error("invalid installer settings in {path}: {reason}")]
    InvalidSettings { path: PathBuf, reason: String },
}
