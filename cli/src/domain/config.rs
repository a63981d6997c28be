//! Installer settings schema and loose checks on collector documents.
//!
//! Pure functions only. The collector configuration itself is opaque; only
//! its top-level section markers are inspected.

use serde::Deserialize;

// ── Installer settings ───────────────────────────────────────────────────────

/// Optional installer settings file (`settings.yaml`).
///
/// Every key is optional and unknown keys are ignored. A value here is only
/// used when the matching command-line flag is absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct InstallerSettings {
    pub mode: Option<String>,
    pub version: Option<String>,
    pub replace_config: Option<bool>,
    pub config_url: Option<String>,
    pub download_base_url: Option<String>,
    pub verify_checksum: Option<bool>,
    pub start_service: Option<bool>,
}

// ── Collector document checks ────────────────────────────────────────────────

/// Top-level sections every usable collector document declares.
pub const REQUIRED_SECTIONS: &[&str] = &["receivers:", "processors:", "exporters:"];

/// Outcome of [`inspect_document`]. Neither failure blocks installation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentCheck {
    Ok,
    /// Body is empty or whitespace only.
    Empty,
    /// Markers absent from the document, in [`REQUIRED_SECTIONS`] order.
    MissingSections(Vec<&'static str>),
}

/// Check that a document is non-empty and declares the required sections
/// at the start of a line.
#[must_use]
pub fn inspect_document(bytes: &[u8]) -> DocumentCheck {
    let text = String::from_utf8_lossy(bytes);
    if text.trim().is_empty() {
        return DocumentCheck::Empty;
    }
    let missing: Vec<&'static str> = REQUIRED_SECTIONS
        .iter()
        .copied()
        .filter(|marker| !text.lines().any(|line| line.starts_with(marker)))
        .collect();
    if missing.is_empty() {
        DocumentCheck::Ok
    } else {
        DocumentCheck::MissingSections(missing)
    }
}

// ── Checksum manifest ────────────────────────────────────────────────────────

/// Find the SHA-256 for `file_name` in a `sha256sum`-style manifest.
///
/// Lines look like `<hex>  <name>` (binary mode `<hex> *<name>` is accepted).
/// The returned digest is lowercased.
#[must_use]
pub fn find_checksum(manifest: &str, file_name: &str) -> Option<String> {
    manifest.lines().find_map(|line| {
        let mut parts = line.split_whitespace();
        let digest = parts.next()?;
        let name = parts.next()?.trim_start_matches('*');
        (name == file_name && digest.len() == 64 && digest.chars().all(|c| c.is_ascii_hexdigit()))
            .then(|| digest.to_ascii_lowercase())
    })
}
