//! Filename-based folder tools for merging texture dumps.
//!
//! These compare names only, never pixels: a dump and a pack that share a
//! file name are assumed to describe the same texture slot.

use log::info;
use std::collections::HashSet;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::actions;
use crate::discovery::list_textures;
use crate::error::Result;
use crate::types::ActionResult;

/// Prefix texture editors give to backup copies
pub const BACKUP_PREFIX: &str = "BKP_";

fn file_names(dir: &Path) -> Result<HashSet<OsString>> {
    Ok(list_textures(dir)?
        .into_iter()
        .filter_map(|f| f.path.file_name().map(|n| n.to_os_string()))
        .collect())
}

fn name_in(path: &Path, names: &HashSet<OsString>) -> bool {
    path.file_name()
        .map(|n| names.contains(n))
        .unwrap_or(false)
}

/// Files in `dest` whose name also exists in `source`
pub fn names_in_both(source: &Path, dest: &Path) -> Result<Vec<PathBuf>> {
    let source_names = file_names(source)?;
    Ok(list_textures(dest)?
        .into_iter()
        .map(|f| f.path)
        .filter(|p| name_in(p, &source_names))
        .collect())
}

/// Delete every file in `dest` whose name also exists in `source`
pub fn remove_name_duplicates(
    source: &Path,
    dest: &Path,
    dry_run: bool,
) -> Result<Vec<ActionResult>> {
    let matches = names_in_both(source, dest)?;
    info!(
        "{} files in {} also exist in {}",
        matches.len(),
        dest.display(),
        source.display()
    );
    Ok(matches.iter().map(|p| actions::delete(p, dry_run)).collect())
}

/// Copy files from `source` whose name is not yet present in `dest`
pub fn copy_new_files(source: &Path, dest: &Path, dry_run: bool) -> Result<Vec<ActionResult>> {
    let existing = file_names(dest)?;
    let new_files: Vec<PathBuf> = list_textures(source)?
        .into_iter()
        .map(|f| f.path)
        .filter(|p| !name_in(p, &existing))
        .collect();

    info!("Found {} new files to copy", new_files.len());
    Ok(new_files
        .iter()
        .map(|p| actions::copy_into(p, dest, dry_run))
        .collect())
}

/// Overwrite files in `dest` with same-named files from `source`
pub fn replace_matching_files(
    source: &Path,
    dest: &Path,
    dry_run: bool,
) -> Result<Vec<ActionResult>> {
    let existing = file_names(dest)?;
    let matching: Vec<PathBuf> = list_textures(source)?
        .into_iter()
        .map(|f| f.path)
        .filter(|p| name_in(p, &existing))
        .collect();

    info!("Found {} matching files to replace", matching.len());
    Ok(matching
        .iter()
        .map(|p| actions::copy_into(p, dest, dry_run))
        .collect())
}

/// Delete PNGs in `dir` whose name starts with [`BACKUP_PREFIX`]
pub fn remove_backup_files(dir: &Path, dry_run: bool) -> Result<Vec<ActionResult>> {
    let backups: Vec<PathBuf> = list_textures(dir)?
        .into_iter()
        .map(|f| f.path)
        .filter(|p| {
            p.file_name()
                .map(|n| n.to_string_lossy().starts_with(BACKUP_PREFIX))
                .unwrap_or(false)
        })
        .collect();

    info!("Found {} backup files in {}", backups.len(), dir.display());
    Ok(backups.iter().map(|p| actions::delete(p, dry_run)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn setup() -> (tempfile::TempDir, PathBuf, PathBuf) {
        let dir = tempdir().unwrap();
        let source = dir.path().join("source");
        let dest = dir.path().join("dest");
        fs::create_dir(&source).unwrap();
        fs::create_dir(&dest).unwrap();

        fs::write(source.join("shared.png"), b"upscaled").unwrap();
        fs::write(source.join("only_source.png"), b"new").unwrap();
        fs::write(dest.join("shared.png"), b"original").unwrap();
        fs::write(dest.join("only_dest.png"), b"old").unwrap();

        (dir, source, dest)
    }

    #[test]
    fn test_names_in_both() {
        let (_dir, source, dest) = setup();
        assert_eq!(names_in_both(&source, &dest).unwrap(), vec![dest.join("shared.png")]);
    }

    #[test]
    fn test_remove_name_duplicates() {
        let (_dir, source, dest) = setup();
        let results = remove_name_duplicates(&source, &dest, false).unwrap();

        assert_eq!(results.len(), 1);
        assert!(!dest.join("shared.png").exists());
        assert!(dest.join("only_dest.png").exists());
        assert!(source.join("shared.png").exists());
    }

    #[test]
    fn test_copy_new_files() {
        let (_dir, source, dest) = setup();
        let results = copy_new_files(&source, &dest, false).unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(fs::read(dest.join("only_source.png")).unwrap(), b"new");
        assert_eq!(fs::read(dest.join("shared.png")).unwrap(), b"original");
    }

    #[test]
    fn test_replace_matching_files() {
        let (_dir, source, dest) = setup();
        let results = replace_matching_files(&source, &dest, false).unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(fs::read(dest.join("shared.png")).unwrap(), b"upscaled");
        assert!(!dest.join("only_source.png").exists());
    }

    #[test]
    fn test_remove_backup_files() {
        let (_dir, source, _dest) = setup();
        fs::write(source.join("BKP_shared.png"), b"backup").unwrap();

        let results = remove_backup_files(&source, false).unwrap();
        assert_eq!(results.len(), 1);
        assert!(!source.join("BKP_shared.png").exists());
        assert!(source.join("shared.png").exists());
    }
}
