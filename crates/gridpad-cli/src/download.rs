//! Saving finished exports into the output directory.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use tempfile::{Builder, NamedTempFile};

/// Prefix of the staging file written next to a download before it is
/// renamed into place.
const STAGING_PREFIX: &str = ".gridpad-download-";

/// Save `bytes` as `<dir>/<file_name>` and return the full path.
///
/// `dir` is created when missing. The bytes are staged in a hidden file in
/// `dir` and renamed over the target only once they are flushed to disk, so a
/// crash mid-export leaves the previous download (if any) intact.
pub fn save_download(dir: &Path, file_name: &str, bytes: &[u8]) -> Result<PathBuf> {
    if Path::new(file_name).file_name() != Some(std::ffi::OsStr::new(file_name)) {
        bail!("download name {file_name:?} is not a plain file name");
    }

    std::fs::create_dir_all(dir)
        .with_context(|| format!("create download directory {}", dir.display()))?;
    let target = dir.join(file_name);

    let mut staged = Builder::new()
        .prefix(STAGING_PREFIX)
        .tempfile_in(dir)
        .with_context(|| format!("stage download in {}", dir.display()))?;
    fill(&mut staged, bytes)
        .with_context(|| format!("write staged download for {}", target.display()))?;

    // `persist` renames over an existing file on every platform tempfile supports.
    staged
        .persist(&target)
        .map_err(|err| err.error)
        .with_context(|| format!("move download into place at {}", target.display()))?;

    log::debug!("saved {} bytes to {}", bytes.len(), target.display());
    Ok(target)
}

fn fill(staged: &mut NamedTempFile, bytes: &[u8]) -> std::io::Result<()> {
    staged.write_all(bytes)?;
    staged.flush()?;
    staged.as_file().sync_all()
}
