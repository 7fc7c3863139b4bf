use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::media::{is_checked_image, ImageFile};

/// Images found under a root, plus directories that could not be read.
#[derive(Debug, Default)]
pub struct ScanResult {
    pub images: Vec<ImageFile>,
    pub skipped_dirs: Vec<(PathBuf, String)>,
}

/// Collect images below `root`, top-down: a directory's own files come
/// before its subdirectories, and both are visited in name order.
pub fn scan_dir(root: &Path) -> anyhow::Result<ScanResult> {
    let entries = read_sorted(root).with_context(|| format!("cannot read {}", root.display()))?;
    let mut result = ScanResult::default();
    collect(root, entries, &mut result);
    Ok(result)
}

/// Directory entries in name order, with whether each one is a directory to
/// descend into. Symlinked directories are neither walked nor checked.
fn read_sorted(dir: &Path) -> std::io::Result<Vec<(PathBuf, bool)>> {
    let mut entries = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        let file_type = entry.file_type()?;
        if file_type.is_symlink() && path.is_dir() {
            continue;
        }
        entries.push((path, file_type.is_dir()));
    }
    entries.sort();
    Ok(entries)
}

fn collect(root: &Path, entries: Vec<(PathBuf, bool)>, result: &mut ScanResult) {
    let (dirs, files): (Vec<_>, Vec<_>) = entries.into_iter().partition(|(_, is_dir)| *is_dir);

    for (path, _) in files {
        if is_checked_image(&path) {
            result.images.push(ImageFile::new(root, path));
        }
    }

    for (dir, _) in dirs {
        match read_sorted(&dir) {
            Ok(entries) => collect(root, entries, result),
            Err(e) => {
                eprintln!("Skipping {}: {}", dir.display(), e);
                result.skipped_dirs.push((dir, e.to_string()));
            }
        }
    }
}
