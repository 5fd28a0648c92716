//! Source file enumeration.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

/// Collect all `.sol` files under `root`, skipping hidden directories,
/// build output, and any path containing one of the `excludes` components.
pub fn collect_sol_files(root: &Path, excludes: &[String]) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|entry| {
            // The root is always walked, even when its own name is hidden.
            if entry.depth() == 0 {
                return true;
            }
            let name = entry.file_name().to_string_lossy();
            !(name.starts_with('.') && name.len() > 1)
                && name != "out"
                && name != "artifacts"
                && name != "cache"
        })
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| path.extension().and_then(|e| e.to_str()) == Some("sol"))
        .filter(|path| !is_excluded(path, excludes))
        .collect();
    files.sort();
    files
}

fn is_excluded(path: &Path, excludes: &[String]) -> bool {
    if excludes.is_empty() {
        return false;
    }
    path.components().any(|component| {
        let component = component.as_os_str().to_string_lossy();
        excludes.iter().any(|exclude| component == *exclude)
    })
}
