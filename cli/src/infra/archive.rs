//! Infrastructure implementation of the `ArchiveUnpacker` port.

use std::path::Path;

use anyhow::{Context, Result};
use flate2::read::GzDecoder;

use crate::application::ports::ArchiveUnpacker;

/// Unpacks `.tar.gz` release archives with `tar` + `flate2`.
///
/// Entries that would escape `dest` (absolute paths, `..`) are skipped by
/// `tar::Archive::unpack`.
pub struct TarGzUnpacker;

impl ArchiveUnpacker for TarGzUnpacker {
    fn unpack_tar_gz(&self, archive: &Path, dest: &Path) -> Result<()> {
        let file = std::fs::File::open(archive)
            .with_context(|| format!("opening {}", archive.display()))?;
        let mut tar = tar::Archive::new(GzDecoder::new(file));
        tar.set_preserve_permissions(true);
        tar.unpack(dest)
            .with_context(|| format!("unpacking {} into {}", archive.display(), dest.display()))
    }
}
