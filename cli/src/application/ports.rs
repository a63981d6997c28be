//! Port trait definitions for the Application layer.
//!
//! Ports are the interfaces (contracts) that infrastructure must fulfill.
//! This file imports only from `crate::domain`: never from `crate::infra`,
//! `crate::commands`, or `crate::output`.

use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::process::Output;
use std::time::Duration;

use anyhow::Result;
use chrono::NaiveDateTime;

use crate::domain::{FetchError, InstallerSettings, PlatformFacts, Step};

// ── Command Runner Port ───────────────────────────────────────────────────────

/// Abstracts process execution so infrastructure can be swapped or mocked.
#[allow(async_fn_in_trait)]
pub trait CommandRunner {
    /// Run a program and capture its output.
    ///
    /// Implementations should delegate to `run_with_timeout` using the
    /// instance's configured default timeout.
    async fn run(&self, program: &str, args: &[&str]) -> Result<Output>;
    /// Run a program with a custom timeout override.
    ///
    /// # Errors
    ///
    /// Returns an error if the process cannot be spawned or exceeds `timeout`.
    /// On timeout, the child process must be killed (not left orphaned). A
    /// program that does not exist surfaces as an `std::io::Error` of kind
    /// `NotFound` somewhere in the error chain.
    async fn run_with_timeout(
        &self,
        program: &str,
        args: &[&str],
        timeout: Duration,
    ) -> Result<Output>;
}

// ── Progress Reporting Port ───────────────────────────────────────────────────

/// Abstracts progress reporting so services can emit events without
/// depending on the Presentation layer. Sync trait.
pub trait ProgressReporter {
    /// A new installation phase begins.
    fn phase(&self, step: Step);
    /// Emit an in-progress step message.
    fn step(&self, message: &str);
    /// Emit a success message.
    fn success(&self, message: &str);
    /// Emit a warning message.
    fn warn(&self, message: &str);
}

// ── HTTP Port ─────────────────────────────────────────────────────────────────

/// A response whose status has not been judged yet.
pub struct HttpResponse {
    /// Final status after redirects.
    pub status: u16,
    /// `Content-Length`, when the server sent one.
    pub content_length: Option<u64>,
    pub body: Box<dyn Read + Send>,
}

/// Blocking HTTP GET. Redirects are followed by the implementation.
pub trait HttpTransport {
    /// Issue a GET and return the final response, whatever its status.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Transport`] when no response was received.
    fn get(&self, url: &str) -> std::result::Result<HttpResponse, FetchError>;
}

// ── Filesystem Ports ──────────────────────────────────────────────────────────

/// Raw filesystem operations used by the remover, installer, and
/// configuration installer.
pub trait FileSystem {
    fn exists(&self, path: &Path) -> bool;
    /// `true` when `path` is a directory with no entries.
    fn dir_is_empty(&self, path: &Path) -> Result<bool>;
    fn create_dir_all(&self, path: &Path) -> Result<()>;
    fn remove_file(&self, path: &Path) -> Result<()>;
    /// Remove an empty directory.
    fn remove_dir(&self, path: &Path) -> Result<()>;
    fn remove_dir_all(&self, path: &Path) -> Result<()>;
    fn copy(&self, from: &Path, to: &Path) -> Result<()>;
    /// Move a file, replacing `to`. Works across filesystems.
    fn move_file(&self, from: &Path, to: &Path) -> Result<()>;
    /// Set Unix permission bits. No-op on other platforms.
    fn set_mode(&self, path: &Path, mode: u32) -> Result<()>;
    /// Create or truncate a file for writing.
    fn create_file(&self, path: &Path) -> Result<Box<dyn Write>>;
    fn read(&self, path: &Path) -> Result<Vec<u8>>;
    fn write(&self, path: &Path, content: &[u8]) -> Result<()>;
    /// Depth-first search below `root` for a regular file called `name`.
    fn find_file(&self, root: &Path, name: &str) -> Result<Option<PathBuf>>;
}

/// Abstracts file hashing operations.
pub trait FileHasher {
    /// Compute the lowercase hex SHA-256 of a file.
    fn sha256_file(&self, path: &Path) -> Result<String>;
}

/// Unpacks release tarballs.
pub trait ArchiveUnpacker {
    /// Extract a gzip-compressed tarball into `dest`.
    fn unpack_tar_gz(&self, archive: &Path, dest: &Path) -> Result<()>;
}

// ── Host Ports ────────────────────────────────────────────────────────────────

/// Gathers the raw facts the platform probe decides on.
#[allow(async_fn_in_trait)]
pub trait PlatformSource {
    /// Kernel name, machine architecture, and `/etc/os-release` contents.
    ///
    /// The machine is the one the host reports at run time, not the
    /// installer's own compile target.
    async fn facts(&self) -> Result<PlatformFacts>;
}

/// Local wall-clock time, used to name configuration backups.
pub trait Clock {
    fn now(&self) -> NaiveDateTime;
}

/// Documents compiled into the installer binary.
pub trait BundledAssets {
    /// Default collector configuration installed when no source is given.
    fn default_config(&self) -> &'static [u8];
}

// ── Settings Port ─────────────────────────────────────────────────────────────

/// Abstracts loading of the optional installer settings file.
pub trait SettingsStore {
    /// Load settings; a missing file yields the defaults.
    fn load(&self) -> Result<InstallerSettings>;
    /// Location the settings are read from.
    fn path(&self) -> PathBuf;
}
