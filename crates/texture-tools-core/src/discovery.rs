use log::{debug, warn};
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::logging::log_file_error;
use crate::types::TextureFile;

/// Discover PNG textures in the provided directories.
///
/// The configured duplicates directory is never descended into, so files
/// archived by an earlier run are not scanned again.
pub fn discover_textures<P: AsRef<Path> + Sync>(
    directories: &[P],
    config: &Config,
) -> Result<Vec<TextureFile>> {
    let excluded = excluded_directory(config);
    directories
        .par_iter()
        .map(|dir| discover_in_directory(dir.as_ref(), config.max_depth, excluded.as_deref()))
        .collect::<Vec<Result<Vec<TextureFile>>>>()
        .into_iter()
        .try_fold(Vec::new(), |mut acc, result| {
            acc.extend(result?);
            Ok(acc)
        })
}

/// PNG textures directly inside `directory`, no recursion
pub fn list_textures(directory: &Path) -> Result<Vec<TextureFile>> {
    discover_in_directory(directory, Some(1), None)
}

/// Canonical path of the duplicates directory, if it exists yet
fn excluded_directory(config: &Config) -> Option<PathBuf> {
    if config.duplicates_dir.as_os_str().is_empty() {
        return None;
    }
    fs::canonicalize(&config.duplicates_dir).ok()
}

fn is_excluded(entry: &DirEntry, excluded: Option<&Path>) -> bool {
    match excluded {
        Some(excluded) if entry.depth() > 0 && entry.file_type().is_dir() => {
            fs::canonicalize(entry.path())
                .map(|path| path == excluded)
                .unwrap_or(false)
        }
        _ => false,
    }
}

/// Discover textures in a single directory, sorted by path
fn discover_in_directory(
    directory: &Path,
    max_depth: Option<usize>,
    excluded: Option<&Path>,
) -> Result<Vec<TextureFile>> {
    if !directory.is_dir() {
        return Err(Error::FileNotFound(directory.to_path_buf()));
    }

    let max_depth = max_depth.unwrap_or(usize::MAX);
    let mut textures = Vec::new();

    for entry in WalkDir::new(directory)
        .max_depth(max_depth)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| {
            let skip = is_excluded(e, excluded);
            if skip {
                debug!("Skipping duplicates directory {}", e.path().display());
            }
            !skip
        })
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
    {
        let path = entry.path();
        if !is_texture_path(path) {
            continue;
        }

        match entry.metadata() {
            Ok(metadata) => textures.push(TextureFile {
                path: path.to_path_buf(),
                size: metadata.len(),
            }),
            Err(e) => {
                // Log error but continue with other files
                log_file_error(path, "metadata", &e);
            }
        }
    }

    if textures.is_empty() {
        warn!("No PNG files found in {}", directory.display());
    } else {
        debug!("Found {} PNG files in {}", textures.len(), directory.display());
    }

    Ok(textures)
}

/// Returns if the given path has a `.png` extension (any case)
pub fn is_texture_path(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("png"))
        .unwrap_or(false)
}

// -- Tests --

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self, File};
    use std::io::Write;
    use std::path::PathBuf;
    use tempfile::tempdir;

    fn create_file(dir: &Path, name: &str) -> PathBuf {
        let file_path = dir.join(name);
        let mut file = File::create(&file_path).unwrap();
        // Discovery only looks at names, contents need not decode
        file.write_all(b"DUMMY TEXTURE DATA").unwrap();
        file_path
    }

    fn setup_test_directory() -> (tempfile::TempDir, Vec<PathBuf>) {
        let dir = tempdir().unwrap();
        let subdir_path = dir.path().join("subdir");
        fs::create_dir(&subdir_path).unwrap();

        let files = vec![
            create_file(dir.path(), "tex1.png"),
            create_file(dir.path(), "TEX2.PNG"),
            create_file(&subdir_path, "sub_tex.png"),
        ];

        create_file(dir.path(), "notes.txt");
        create_file(dir.path(), "photo.jpg");

        (dir, files)
    }

    #[test]
    fn test_is_texture_path() {
        assert!(is_texture_path(Path::new("a.png")));
        assert!(is_texture_path(Path::new("a.PnG")));
        assert!(!is_texture_path(Path::new("a.jpg")));
        assert!(!is_texture_path(Path::new("png")));
    }

    #[test]
    fn test_discover_recursive() {
        let (dir, files) = setup_test_directory();
        let discovered = discover_textures(&[dir.path()], &Config::default()).unwrap();

        assert_eq!(discovered.len(), 3);
        let paths: Vec<PathBuf> = discovered.iter().map(|f| f.path.clone()).collect();
        for file in &files {
            assert!(paths.contains(file));
        }
        assert!(discovered.iter().all(|f| f.size == 18));
    }

    #[test]
    fn test_list_textures_is_flat() {
        let (dir, _) = setup_test_directory();
        let listed = list_textures(dir.path()).unwrap();

        assert_eq!(listed.len(), 2);
        for file in &listed {
            assert_eq!(file.path.parent().unwrap(), dir.path());
        }
    }

    #[test]
    fn test_discover_nonexistent_directory() {
        let result = discover_textures(&[Path::new("/path/that/does/not/exist")], &Config::default());
        assert!(matches!(result, Err(Error::FileNotFound(_))));
    }

    #[test]
    fn test_discover_skips_duplicates_dir() {
        let (dir, _) = setup_test_directory();
        let config = Config {
            duplicates_dir: dir.path().join("subdir"),
            ..Config::default()
        };

        let discovered = discover_textures(&[dir.path()], &config).unwrap();
        assert_eq!(discovered.len(), 2);
        assert!(discovered.iter().all(|f| !f.path.starts_with(dir.path().join("subdir"))));
    }

    #[test]
    fn test_discover_multiple_directories() {
        let (dir1, _) = setup_test_directory();
        let (dir2, _) = setup_test_directory();

        let discovered = discover_textures(&[dir1.path(), dir2.path()], &Config::default()).unwrap();
        assert_eq!(discovered.len(), 6);
    }
}
