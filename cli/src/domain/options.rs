//! Run options and the fixed sequence of installation phases.

use std::fmt;
use std::path::PathBuf;
use std::sync::LazyLock;

use regex::Regex;

use crate::domain::platform::{DEFAULT_DOWNLOAD_BASE_URL, DEFAULT_VERSION};

#[allow(clippy::expect_used)] // pattern is a compile-time constant
static VERSION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\.\d+\.\d+$").expect("valid version pattern"));

/// Presentation style. Has no effect on installation semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Colored output with spinners.
    #[default]
    Interactive,
    /// Plain numbered lines, suitable for logs and CI.
    Basic,
}

impl Mode {
    /// Parse `interactive` / `basic` (case-insensitive).
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "interactive" => Some(Self::Interactive),
            "basic" => Some(Self::Basic),
            _ => None,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Interactive => "interactive",
            Self::Basic => "basic",
        })
    }
}

/// Where a replacement configuration document comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Downloaded over HTTP.
    Url(String),
    /// Read from a local file.
    File(PathBuf),
    /// The default document compiled into the installer.
    Bundled,
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Url(url) => f.write_str(url),
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Bundled => f.write_str("bundled default"),
        }
    }
}

/// Everything the caller decided for this run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOptions {
    pub mode: Mode,
    /// Release version without a leading `v`.
    pub requested_version: String,
    /// Install the configuration document over the packaged one.
    pub replace_config: bool,
    pub config_source: ConfigSource,
    pub download_base_url: String,
    /// Compare the artifact against the release checksum manifest.
    pub verify_checksum: bool,
    /// Enable and start the service after a successful install.
    pub start_service: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            mode: Mode::default(),
            requested_version: DEFAULT_VERSION.to_string(),
            replace_config: false,
            config_source: ConfigSource::Bundled,
            download_base_url: DEFAULT_DOWNLOAD_BASE_URL.to_string(),
            verify_checksum: false,
            start_service: false,
        }
    }
}

/// Strip surrounding whitespace and one leading `v`.
#[must_use]
pub fn normalize_version(raw: &str) -> String {
    let trimmed = raw.trim();
    trimmed
        .strip_prefix('v')
        .or_else(|| trimmed.strip_prefix('V'))
        .unwrap_or(trimmed)
        .to_string()
}

/// `true` when `version` is a plain `X.Y.Z` release number.
///
/// Non-matching versions are still attempted; callers only warn.
#[must_use]
pub fn is_release_version(version: &str) -> bool {
    VERSION_RE.is_match(version)
}

/// Installation phases in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Probe,
    Remove,
    Fetch,
    Install,
    Configure,
    Service,
}

impl Step {
    /// 1-based position used by the basic presentation.
    #[must_use]
    pub fn ordinal(self) -> usize {
        self as usize + 1
    }

    /// Number of phases.
    pub const COUNT: usize = 6;
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Probe => "Detecting platform",
            Self::Remove => "Removing existing installation",
            Self::Fetch => "Downloading artifact",
            Self::Install => "Installing collector",
            Self::Configure => "Installing configuration",
            Self::Service => "Starting service",
        })
    }
}
