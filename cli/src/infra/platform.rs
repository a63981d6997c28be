//! Infrastructure implementation of the `PlatformSource` port.

use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::application::ports::{CommandRunner, PlatformSource};
use crate::domain::PlatformFacts;

/// Location of the distribution identification file.
pub const OS_RELEASE_PATH: &str = "/etc/os-release";

/// Reads facts from the running host.
///
/// Kernel and machine come from `uname`, so an emulated build (binfmt,
/// box64) still sees the hardware it runs on.
pub struct HostPlatform<R> {
    runner: R,
    os_release_path: PathBuf,
}

impl<R: CommandRunner> HostPlatform<R> {
    #[must_use]
    pub fn new(runner: R) -> Self {
        Self {
            runner,
            os_release_path: PathBuf::from(OS_RELEASE_PATH),
        }
    }

    async fn uname(&self, flag: &str) -> Result<String> {
        let output = self
            .runner
            .run("uname", &[flag])
            .await
            .with_context(|| format!("running uname {flag}"))?;
        if !output.status.success() {
            anyhow::bail!(
                "uname {flag} failed: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }
        let value = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if value.is_empty() {
            anyhow::bail!("uname {flag} printed nothing");
        }
        Ok(value)
    }
}

impl<R: CommandRunner> PlatformSource for HostPlatform<R> {
    async fn facts(&self) -> Result<PlatformFacts> {
        let kernel = self.uname("-s").await?;
        let machine = self.uname("-m").await?;
        let os_release = match std::fs::read_to_string(&self.os_release_path) {
            Ok(content) => Some(content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("reading {}", self.os_release_path.display()));
            }
        };
        Ok(PlatformFacts {
            kernel,
            machine,
            os_release,
        })
    }
}
