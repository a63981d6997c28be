//! Application service: applies a fetched artifact to the host.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;

use crate::application::ports::{ArchiveUnpacker, CommandRunner, FileSystem};
use crate::domain::error::InstallError;
use crate::domain::platform::BINARY_NAME;
use crate::domain::{InstallLayout, InstallTarget, PackageManager, PackageStrategy};

/// Timeout for package manager installs and purges.
pub const PACKAGE_TIMEOUT: Duration = Duration::from_secs(600);

/// Permission bits of a binary placed from the archive.
pub const BINARY_MODE: u32 = 0o755;

/// How the collector ended up on the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallOutcome {
    /// Installed and registered by a native package manager.
    Package { manager: PackageManager },
    /// Binary placed by hand; no service unit or configuration created.
    Archive { binary_path: PathBuf },
}

/// Install `artifact` according to the target's strategy.
///
/// # Errors
///
/// Returns [`InstallError`] when the package manager is missing or fails,
/// or when the archive cannot be unpacked or its binary placed.
pub async fn install(
    runner: &impl CommandRunner,
    fs: &impl FileSystem,
    unpacker: &impl ArchiveUnpacker,
    target: &InstallTarget,
    layout: &InstallLayout,
    artifact: &Path,
    work_dir: &Path,
) -> Result<InstallOutcome> {
    match target.package_strategy.manager() {
        Some(manager) => install_package(runner, manager, artifact).await,
        None => {
            debug_assert_eq!(target.package_strategy, PackageStrategy::Archive);
            install_archive(fs, unpacker, layout, artifact, work_dir)
        }
    }
}

async fn install_package(
    runner: &impl CommandRunner,
    manager: PackageManager,
    artifact: &Path,
) -> Result<InstallOutcome> {
    let program = manager.program();
    let file = artifact.display().to_string();
    let args = manager.install_args(&file);
    let args: Vec<&str> = args.iter().map(String::as_str).collect();
    log::debug!("{program} {}", args.join(" "));

    let output = match runner.run_with_timeout(program, &args, PACKAGE_TIMEOUT).await {
        Ok(output) => output,
        Err(e) if is_not_found(&e) => {
            return Err(InstallError::ManagerUnavailable {
                manager: program.to_string(),
                reason: format!("{e:#}"),
            }
            .into());
        }
        Err(e) => return Err(e.context(format!("running {program} {}", args.join(" ")))),
    };

    if !output.status.success() {
        return Err(InstallError::PackageManager {
            manager: program.to_string(),
            file,
            exit_code: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        }
        .into());
    }
    Ok(InstallOutcome::Package { manager })
}

fn install_archive(
    fs: &impl FileSystem,
    unpacker: &impl ArchiveUnpacker,
    layout: &InstallLayout,
    archive: &Path,
    work_dir: &Path,
) -> Result<InstallOutcome> {
    let extract_dir = work_dir.join("extract");
    let extract_err = |e: anyhow::Error| InstallError::Extract {
        archive: archive.to_path_buf(),
        reason: format!("{e:#}"),
    };
    fs.create_dir_all(&extract_dir).map_err(extract_err)?;
    unpacker
        .unpack_tar_gz(archive, &extract_dir)
        .map_err(extract_err)?;

    let found = fs
        .find_file(&extract_dir, BINARY_NAME)
        .map_err(extract_err)?
        .ok_or_else(|| InstallError::BinaryNotFound {
            archive: archive.to_path_buf(),
            binary: BINARY_NAME.to_string(),
        })?;
    log::debug!("found {} in archive", found.display());

    let place_err = |e: anyhow::Error| InstallError::Place {
        path: layout.binary_path.clone(),
        reason: format!("{e:#}"),
    };
    fs.set_mode(&found, BINARY_MODE).map_err(place_err)?;
    if let Some(parent) = layout.binary_path.parent() {
        fs.create_dir_all(parent).map_err(place_err)?;
    }
    fs.move_file(&found, &layout.binary_path).map_err(place_err)?;

    Ok(InstallOutcome::Archive {
        binary_path: layout.binary_path.clone(),
    })
}

fn is_not_found(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| {
        cause
            .downcast_ref::<std::io::Error>()
            .is_some_and(|io| io.kind() == std::io::ErrorKind::NotFound)
    })
}
