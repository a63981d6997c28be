//! Application service: platform detection use-case.

use anyhow::{Context, Result};

use crate::application::ports::PlatformSource;
use crate::domain::InstallTarget;
use crate::domain::platform::resolve_target;

/// Resolve the install target for this host.
///
/// Reads host facts through `source` and applies the distribution and
/// architecture rules. Nothing on the host is changed.
///
/// # Errors
///
/// Returns an error if the facts cannot be read, or a
/// [`PlatformError`](crate::domain::PlatformError) when the host is unsupported.
pub async fn resolve(
    source: &impl PlatformSource,
    version: &str,
    base_url: &str,
) -> Result<InstallTarget> {
    let facts = source.facts().await.context("reading host platform facts")?;
    log::debug!(
        "platform facts: kernel={} machine={} os-release={}",
        facts.kernel,
        facts.machine,
        if facts.os_release.is_some() { "present" } else { "absent" }
    );
    let target = resolve_target(&facts, version, base_url)?;
    log::debug!("resolved target: {} ({})", target.describe(), target.artifact_url);
    Ok(target)
}
