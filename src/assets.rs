//! First-run provisioning of the bundled reference databases. An installed
//! build ships a read-only `Versiones` directory next to the executable; on
//! startup every file in it that the writable data directory does not already
//! have is copied over exactly once. Files the user already has are never
//! touched, so re-running after an upgrade only fills in what is new.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Name of the read-only bundle directory shipped beside the executable.
const BUNDLE_DIR_NAME: &str = "Versiones";

/// Locate the install-time bundle: `Versiones` next to the running executable,
/// falling back to the working directory for source checkouts. Either
/// candidate may be absent; [`provision`] treats that as "nothing to copy".
pub fn default_bundle_dir() -> PathBuf {
    if let Ok(exe) = env::current_exe() {
        if let Some(dir) = exe.parent() {
            let candidate = dir.join(BUNDLE_DIR_NAME);
            if candidate.is_dir() {
                return candidate;
            }
        }
    }
    PathBuf::from(BUNDLE_DIR_NAME)
}

/// Copy every regular file from `bundle` into `dest` unless the destination
/// already has it. Returns how many files were copied. A missing bundle
/// directory is the normal state after first run and is not an error.
pub fn provision(bundle: &Path, dest: &Path) -> Result<usize> {
    fs::create_dir_all(dest)
        .with_context(|| format!("failed to create data directory {}", dest.display()))?;

    if !bundle.is_dir() {
        return Ok(0);
    }

    let entries = fs::read_dir(bundle)
        .with_context(|| format!("failed to read bundle directory {}", bundle.display()))?;

    let mut copied = 0;
    for entry in entries {
        let entry = entry.context("failed to read bundle entry")?;
        if !entry.file_type().context("failed to stat bundle entry")?.is_file() {
            continue;
        }
        let target = dest.join(entry.file_name());
        if target.exists() {
            continue;
        }
        fs::copy(entry.path(), &target).with_context(|| {
            format!(
                "failed to copy {} into {}",
                entry.path().display(),
                dest.display()
            )
        })?;
        copied += 1;
    }

    Ok(copied)
}
