//! Application service: artifact and configuration document retrieval.

use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::application::ports::{
    BundledAssets, FileHasher, FileSystem, HttpResponse, HttpTransport,
};
use crate::domain::config::{DocumentCheck, find_checksum, inspect_document};
use crate::domain::error::{ConfigError, FetchError};
use crate::domain::ConfigSource;
use crate::domain::platform::{CHECKSUMS_FILE_NAME, InstallTarget, release_url};

/// File name of the staged configuration document inside the work directory.
pub const STAGED_CONFIG_NAME: &str = "config.yaml";

/// A configuration document ready to be copied into place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedConfig {
    /// Staged copy inside the work directory.
    pub path: PathBuf,
    pub check: DocumentCheck,
}

/// Download `url` into `dest`. Returns the number of bytes written.
///
/// Only HTTP 200 counts as success. The body is streamed into
/// `<dest>.partial` and renamed on completion; on any failure the partial
/// file is removed and `dest` is left untouched.
///
/// # Errors
///
/// Returns [`FetchError`] for a non-200 status, a transport failure, or a
/// local write failure. No retry is attempted.
pub fn fetch(
    http: &impl HttpTransport,
    fs: &impl FileSystem,
    url: &str,
    dest: &Path,
) -> Result<u64, FetchError> {
    let response = open_ok(http, url)?;
    log::debug!(
        "downloading {url} ({} bytes announced)",
        response
            .content_length
            .map_or_else(|| "unknown".to_string(), |n| n.to_string())
    );

    let partial = partial_path(dest);
    match stream_to(fs, url, response.body, &partial) {
        Ok(written) => {
            fs.move_file(&partial, dest).map_err(|e| FetchError::Write {
                path: dest.to_path_buf(),
                source: std::io::Error::other(format!("{e:#}")),
            })?;
            Ok(written)
        }
        Err(e) => {
            if fs.exists(&partial) {
                let _ = fs.remove_file(&partial);
            }
            Err(e)
        }
    }
}

/// Download `url` fully into memory.
///
/// # Errors
///
/// Returns [`FetchError`] for a non-200 status or a transport failure.
pub fn fetch_bytes(http: &impl HttpTransport, url: &str) -> Result<Vec<u8>, FetchError> {
    let mut response = open_ok(http, url)?;
    let mut buf = Vec::new();
    response
        .body
        .read_to_end(&mut buf)
        .map_err(|e| FetchError::Transport {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
    Ok(buf)
}

fn open_ok(
    http: &impl HttpTransport,
    url: &str,
) -> Result<HttpResponse, FetchError> {
    let response = http.get(url)?;
    if response.status != 200 {
        return Err(FetchError::Status {
            url: url.to_string(),
            status: response.status,
        });
    }
    Ok(response)
}

fn stream_to(
    fs: &impl FileSystem,
    url: &str,
    mut body: Box<dyn Read + Send>,
    path: &Path,
) -> Result<u64, FetchError> {
    let write_err = |source: std::io::Error| FetchError::Write {
        path: path.to_path_buf(),
        source,
    };
    let mut file = fs
        .create_file(path)
        .map_err(|e| write_err(std::io::Error::other(format!("{e:#}"))))?;
    let mut buf = vec![0u8; 64 * 1024];
    let mut written = 0u64;
    loop {
        let n = body.read(&mut buf).map_err(|e| FetchError::Transport {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        if n == 0 {
            break;
        }
        file.write_all(&buf[..n]).map_err(write_err)?;
        written += n as u64;
    }
    file.flush().map_err(write_err)?;
    Ok(written)
}

fn partial_path(dest: &Path) -> PathBuf {
    let mut s = dest.as_os_str().to_owned();
    s.push(".partial");
    PathBuf::from(s)
}

/// Compare the downloaded artifact against the release checksum manifest.
///
/// Returns the verified digest.
///
/// # Errors
///
/// Returns [`FetchError::ChecksumUnavailable`] when the manifest has no entry
/// for the artifact and [`FetchError::ChecksumMismatch`] when the digests
/// differ. Download failures of the manifest itself are also fatal.
pub fn verify_checksum(
    http: &impl HttpTransport,
    hasher: &impl FileHasher,
    target: &InstallTarget,
    base_url: &str,
    artifact: &Path,
) -> Result<String> {
    let manifest_url = release_url(base_url, &target.artifact_version, CHECKSUMS_FILE_NAME);
    let manifest = fetch_bytes(http, &manifest_url)?;
    let manifest = String::from_utf8_lossy(&manifest);

    let expected = find_checksum(&manifest, &target.artifact_filename).ok_or_else(|| {
        FetchError::ChecksumUnavailable {
            file: target.artifact_filename.clone(),
            url: manifest_url.clone(),
        }
    })?;
    let actual = hasher
        .sha256_file(artifact)
        .with_context(|| format!("hashing {}", artifact.display()))?;
    if actual != expected {
        return Err(FetchError::ChecksumMismatch {
            file: target.artifact_filename.clone(),
            expected,
            actual,
        }
        .into());
    }
    log::debug!("checksum ok for {}: {actual}", target.artifact_filename);
    Ok(actual)
}

/// Stage the configuration document from `source` into `work_dir`.
///
/// An empty document or one missing the standard top-level sections is
/// still staged; the caller decides how to surface [`PreparedConfig::check`].
///
/// # Errors
///
/// Returns [`FetchError`] for a failed download and [`ConfigError::Source`]
/// for an unreadable local file.
pub fn fetch_config_document(
    http: &impl HttpTransport,
    fs: &impl FileSystem,
    assets: &impl BundledAssets,
    source: &ConfigSource,
    work_dir: &Path,
) -> Result<PreparedConfig> {
    let bytes = match source {
        ConfigSource::Url(url) => fetch_bytes(http, url)?,
        ConfigSource::File(path) => fs.read(path).map_err(|e| ConfigError::Source {
            source_path: path.display().to_string(),
            reason: format!("{e:#}"),
        })?,
        ConfigSource::Bundled => assets.default_config().to_vec(),
    };
    let check = inspect_document(&bytes);
    let path = work_dir.join(STAGED_CONFIG_NAME);
    fs.write(&path, &bytes)
        .with_context(|| format!("staging configuration from {source}"))?;
    Ok(PreparedConfig { path, check })
}
