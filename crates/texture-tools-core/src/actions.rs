//! Filesystem side effects. Every change goes through here so that dry runs
//! and the FS CHANGE log stay complete.

use log::info;
use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::logging::{log_file_error, log_fs_modification};
use crate::raster::{self, Raster};
use crate::types::{ActionResult, ActionType};

/// Move `path` into `dest_dir`, picking a free name if one is taken.
///
/// `claimed` holds targets already handed out in this batch, so a dry run
/// reports the same names a real run would use.
pub fn move_into(
    path: &Path,
    dest_dir: &Path,
    dry_run: bool,
    claimed: &mut HashSet<PathBuf>,
) -> ActionResult {
    let target = match free_target(path, dest_dir, claimed) {
        Ok(target) => target,
        Err(e) => return failure(ActionType::Move, path, None, e),
    };
    claimed.insert(target.clone());

    if dry_run {
        info!("[dry run] would move {} -> {}", path.display(), target.display());
        return ActionResult::ok(ActionType::Move, path.to_path_buf(), Some(target));
    }

    let result = fs::create_dir_all(dest_dir).and_then(|_| rename_or_copy(path, &target));
    match result {
        Ok(()) => {
            log_fs_modification("move", path, Some(&format!("to {}", target.display())));
            ActionResult::ok(ActionType::Move, path.to_path_buf(), Some(target))
        }
        Err(e) => failure(ActionType::Move, path, Some(target), e.into()),
    }
}

/// Copy `path` into `dest_dir`, overwriting a file of the same name
pub fn copy_into(path: &Path, dest_dir: &Path, dry_run: bool) -> ActionResult {
    let target = match path.file_name() {
        Some(name) => dest_dir.join(name),
        None => return failure(ActionType::Copy, path, None, no_file_name(path)),
    };

    if dry_run {
        info!("[dry run] would copy {} -> {}", path.display(), target.display());
        return ActionResult::ok(ActionType::Copy, path.to_path_buf(), Some(target));
    }

    match fs::copy(path, &target) {
        Ok(_) => {
            log_fs_modification("copy", path, Some(&format!("to {}", target.display())));
            ActionResult::ok(ActionType::Copy, path.to_path_buf(), Some(target))
        }
        Err(e) => failure(ActionType::Copy, path, Some(target), e.into()),
    }
}

/// Delete `path`
pub fn delete(path: &Path, dry_run: bool) -> ActionResult {
    if dry_run {
        info!("[dry run] would delete {}", path.display());
        return ActionResult::ok(ActionType::Delete, path.to_path_buf(), None);
    }

    match fs::remove_file(path) {
        Ok(()) => {
            log_fs_modification("delete", path, None);
            ActionResult::ok(ActionType::Delete, path.to_path_buf(), None)
        }
        Err(e) => failure(ActionType::Delete, path, None, e.into()),
    }
}

/// Encode `raster` over `path`
pub fn rewrite(path: &Path, raster: &Raster, dry_run: bool) -> Result<()> {
    if dry_run {
        info!("[dry run] would rewrite {}", path.display());
        return Ok(());
    }

    raster::save(raster, path)?;
    log_fs_modification(
        "rewrite",
        path,
        Some(&format!("{}x{}", raster.width(), raster.height())),
    );
    Ok(())
}

fn failure(action: ActionType, path: &Path, target: Option<PathBuf>, error: Error) -> ActionResult {
    log_file_error(path, &format!("{:?}", action).to_lowercase(), &error);
    ActionResult::failed(action, path.to_path_buf(), target, &error)
}

fn no_file_name(path: &Path) -> Error {
    Error::Io(io::Error::new(
        io::ErrorKind::InvalidInput,
        format!("{} has no file name", path.display()),
    ))
}

/// `dest_dir/name`, or `dest_dir/stem_N.ext` for the first N not taken
fn free_target(path: &Path, dest_dir: &Path, claimed: &HashSet<PathBuf>) -> Result<PathBuf> {
    let is_free = |candidate: &Path| !candidate.exists() && !claimed.contains(candidate);

    let name = path.file_name().ok_or_else(|| no_file_name(path))?;
    let candidate = dest_dir.join(name);
    if is_free(&candidate) {
        return Ok(candidate);
    }

    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = path
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();

    (1..)
        .map(|n| dest_dir.join(format!("{}_{}{}", stem, n, ext)))
        .find(|candidate| is_free(candidate))
        .ok_or_else(|| no_file_name(path))
}

/// Rename, falling back to copy + remove across filesystems
fn rename_or_copy(from: &Path, to: &Path) -> io::Result<()> {
    match fs::rename(from, to) {
        Ok(()) => Ok(()),
        Err(_) => {
            fs::copy(from, to)?;
            fs::remove_file(from)
        }
    }
}
