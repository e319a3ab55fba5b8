use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::foundation::error::{AdsmithError, AdsmithResult};

const IMAGE_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "webp"];

/// Return every image file under `dir`, sorted by path for a stable run order.
pub fn discover_sources(dir: &Path) -> AdsmithResult<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(AdsmithError::validation(format!(
            "source directory '{}' does not exist",
            dir.display()
        )));
    }

    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .follow_links(false)
        .into_iter()
        .filter_map(std::result::Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| is_image_path(entry.path()))
        .map(walkdir::DirEntry::into_path)
        .collect();

    files.sort();
    Ok(files)
}

fn is_image_path(path: &Path) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            IMAGE_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}
