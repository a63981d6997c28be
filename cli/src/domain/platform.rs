//! Platform detection rules: distribution table, architecture normalization,
//! and artifact naming.
//!
//! Pure functions only: the raw host facts are gathered by the
//! `PlatformSource` port and handed in as [`PlatformFacts`].

use std::fmt;

use crate::domain::error::PlatformError;

// ── Constants ────────────────────────────────────────────────────────────────

/// Name of the collector binary, package and systemd service.
pub const BINARY_NAME: &str = "otelcol-contrib";

/// Release version installed when none is requested.
pub const DEFAULT_VERSION: &str = "0.126.0";

/// Release download root; the version tag and file name are appended.
pub const DEFAULT_DOWNLOAD_BASE_URL: &str =
    "https://github.com/open-telemetry/opentelemetry-collector-releases/releases/download";

/// Checksum manifest published next to every release's artifacts.
pub const CHECKSUMS_FILE_NAME: &str = "opentelemetry-collector-releases_otelcol-contrib_checksums.txt";

/// Distribution name prefixes with a native package format.
///
/// Each candidate (`ID`, every `ID_LIKE` token, then `NAME`) is lowercased and
/// tested against these prefixes in order. Anything unmatched on a Linux
/// kernel installs from the plain archive.
pub const DISTRO_TABLE: &[(&str, PackageStrategy)] = &[
    ("debian", PackageStrategy::NativeDeb),
    ("ubuntu", PackageStrategy::NativeDeb),
    ("linuxmint", PackageStrategy::NativeDeb),
    ("raspbian", PackageStrategy::NativeDeb),
    ("kali", PackageStrategy::NativeDeb),
    ("pop", PackageStrategy::NativeDeb),
    ("rhel", PackageStrategy::NativeRpm),
    ("red hat", PackageStrategy::NativeRpm),
    ("centos", PackageStrategy::NativeRpm),
    ("fedora", PackageStrategy::NativeRpm),
    ("rocky", PackageStrategy::NativeRpm),
    ("almalinux", PackageStrategy::NativeRpm),
    ("amzn", PackageStrategy::NativeRpm),
    ("amazon", PackageStrategy::NativeRpm),
    ("sles", PackageStrategy::NativeRpm),
    ("suse", PackageStrategy::NativeRpm),
    ("opensuse", PackageStrategy::NativeRpm),
];

// ── Strategy and package managers ────────────────────────────────────────────

/// How the artifact gets onto the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PackageStrategy {
    /// `.deb` installed with `dpkg`.
    NativeDeb,
    /// `.rpm` installed with `rpm`.
    NativeRpm,
    /// `.tar.gz` unpacked and the binary placed by hand.
    Archive,
}

impl PackageStrategy {
    /// File extension of the release artifact for this strategy.
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Self::NativeDeb => "deb",
            Self::NativeRpm => "rpm",
            Self::Archive => "tar.gz",
        }
    }

    /// The package manager that applies the artifact, if any.
    #[must_use]
    pub fn manager(self) -> Option<PackageManager> {
        match self {
            Self::NativeDeb => Some(PackageManager::Dpkg),
            Self::NativeRpm => Some(PackageManager::Rpm),
            Self::Archive => None,
        }
    }
}

impl fmt::Display for PackageStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::NativeDeb => "native-deb",
            Self::NativeRpm => "native-rpm",
            Self::Archive => "archive",
        })
    }
}

/// Native package managers the remover and installer drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PackageManager {
    Dpkg,
    Rpm,
}

impl PackageManager {
    /// Every manager the remover probes, in probe order.
    pub const ALL: [PackageManager; 2] = [PackageManager::Dpkg, PackageManager::Rpm];

    /// Executable name.
    #[must_use]
    pub fn program(self) -> &'static str {
        match self {
            Self::Dpkg => "dpkg",
            Self::Rpm => "rpm",
        }
    }

    /// Arguments that succeed only when `package` is registered.
    #[must_use]
    pub fn query_args(self, package: &str) -> Vec<String> {
        match self {
            Self::Dpkg => vec!["-s".to_string(), package.to_string()],
            Self::Rpm => vec!["-q".to_string(), package.to_string()],
        }
    }

    /// Arguments that remove `package` together with its config and unit files.
    #[must_use]
    pub fn purge_args(self, package: &str) -> Vec<String> {
        match self {
            Self::Dpkg => vec!["--purge".to_string(), package.to_string()],
            Self::Rpm => vec!["-e".to_string(), package.to_string()],
        }
    }

    /// Arguments that install a local package file.
    #[must_use]
    pub fn install_args(self, file: &str) -> Vec<String> {
        vec!["-i".to_string(), file.to_string()]
    }
}

impl fmt::Display for PackageManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.program())
    }
}

// ── Architecture ─────────────────────────────────────────────────────────────

/// Supported hardware architectures, named as release artifacts name them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Architecture {
    Amd64,
    Arm64,
}

impl Architecture {
    /// Normalize a machine string (`uname -m` style) to a supported architecture.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError::UnsupportedArchitecture`] for anything outside
    /// the supported set.
    pub fn normalize(machine: &str) -> Result<Self, PlatformError> {
        match machine.trim().to_ascii_lowercase().as_str() {
            "x86_64" | "amd64" => Ok(Self::Amd64),
            "aarch64" | "arm64" => Ok(Self::Arm64),
            _ => Err(PlatformError::UnsupportedArchitecture {
                machine: machine.trim().to_string(),
            }),
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Amd64 => "amd64",
            Self::Arm64 => "arm64",
        }
    }
}

impl fmt::Display for Architecture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── os-release ───────────────────────────────────────────────────────────────

/// The fields of `/etc/os-release` the probe cares about.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OsRelease {
    pub id: Option<String>,
    pub id_like: Vec<String>,
    pub name: Option<String>,
}

impl OsRelease {
    /// Parse `KEY=value` lines; quotes are stripped, comments and unknown keys ignored.
    #[must_use]
    pub fn parse(content: &str) -> Self {
        let mut release = Self::default();
        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let value = value.trim().trim_matches('"').trim_matches('\'').to_string();
            match key.trim() {
                "ID" => release.id = Some(value),
                "ID_LIKE" => {
                    release.id_like = value.split_whitespace().map(String::from).collect();
                }
                "NAME" => release.name = Some(value),
                _ => {}
            }
        }
        release
    }

    /// Candidate strings in match order: `ID`, `ID_LIKE` tokens, `NAME`.
    fn candidates(&self) -> impl Iterator<Item = String> + '_ {
        self.id
            .iter()
            .chain(self.id_like.iter())
            .chain(self.name.iter())
            .map(|s| s.to_ascii_lowercase())
    }

    /// Human-facing family label (`ID`, else `NAME`, else `linux`).
    #[must_use]
    pub fn family(&self) -> String {
        self.id
            .clone()
            .or_else(|| self.name.clone())
            .unwrap_or_else(|| "linux".to_string())
    }
}

/// Map an os-release record to a package strategy using [`DISTRO_TABLE`].
#[must_use]
pub fn classify_distro(release: &OsRelease) -> PackageStrategy {
    for candidate in release.candidates() {
        if let Some((_, strategy)) = DISTRO_TABLE
            .iter()
            .find(|(prefix, _)| candidate.starts_with(prefix))
        {
            return *strategy;
        }
    }
    PackageStrategy::Archive
}

// ── Install target ───────────────────────────────────────────────────────────

/// Raw facts gathered from the host before any decision is made.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformFacts {
    /// Kernel / OS name, e.g. `linux`.
    pub kernel: String,
    /// Machine architecture string, e.g. `x86_64`.
    pub machine: String,
    /// Contents of `/etc/os-release`, if the file exists.
    pub os_release: Option<String>,
}

/// Everything the fetcher and installer need, resolved once per run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallTarget {
    pub os_family: String,
    pub package_strategy: PackageStrategy,
    pub architecture: Architecture,
    pub artifact_version: String,
    pub artifact_filename: String,
    pub artifact_url: String,
}

impl InstallTarget {
    /// One-line description used in error context. The URL is left to
    /// the fetch errors, which name it themselves.
    #[must_use]
    pub fn describe(&self) -> String {
        format!(
            "os={}, arch={}, strategy={}",
            self.os_family, self.architecture, self.package_strategy
        )
    }
}

/// `otelcol-contrib_<version>_linux_<arch>.<ext>`
#[must_use]
pub fn artifact_filename(version: &str, arch: Architecture, strategy: PackageStrategy) -> String {
    format!(
        "{BINARY_NAME}_{version}_linux_{}.{}",
        arch.as_str(),
        strategy.extension()
    )
}

/// `<base>/v<version>/<file>`; a trailing slash on `base` is tolerated.
#[must_use]
pub fn release_url(base: &str, version: &str, file: &str) -> String {
    format!("{}/v{version}/{file}", base.trim_end_matches('/'))
}

/// Resolve a complete [`InstallTarget`] from host facts.
///
/// # Errors
///
/// Returns [`PlatformError`] when the kernel is not Linux or the architecture
/// is not supported. Nothing is resolved partially.
pub fn resolve_target(
    facts: &PlatformFacts,
    version: &str,
    base_url: &str,
) -> Result<InstallTarget, PlatformError> {
    if !facts.kernel.trim().eq_ignore_ascii_case("linux") {
        return Err(PlatformError::UnsupportedOs {
            kernel: facts.kernel.trim().to_string(),
        });
    }
    let architecture = Architecture::normalize(&facts.machine)?;
    let release = facts
        .os_release
        .as_deref()
        .map(OsRelease::parse)
        .unwrap_or_default();
    let package_strategy = classify_distro(&release);
    let artifact_filename = artifact_filename(version, architecture, package_strategy);
    let artifact_url = release_url(base_url, version, &artifact_filename);

    Ok(InstallTarget {
        os_family: release.family(),
        package_strategy,
        architecture,
        artifact_version: version.to_string(),
        artifact_filename,
        artifact_url,
    })
}

// ── Unit tests ───────────────────────────────────────────────────────────────
