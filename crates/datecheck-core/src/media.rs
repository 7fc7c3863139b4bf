use std::path::{Path, PathBuf};

/// An image found in the archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFile {
    /// Path relative to the archive root; the date is guessed from this
    pub rel_path: PathBuf,
    /// Path used to open the file
    pub abs_path: PathBuf,
}

impl ImageFile {
    pub fn new(root: &Path, abs_path: PathBuf) -> Self {
        let rel_path = abs_path
            .strip_prefix(root)
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| abs_path.clone());
        Self { rel_path, abs_path }
    }
}

/// Whether the file's extension marks it as a JPEG or PNG image.
pub fn is_checked_image(path: &Path) -> bool {
    mime_guess::from_path(path).iter().any(|mime| {
        mime.type_() == mime_guess::mime::IMAGE
            && (mime.subtype() == mime_guess::mime::JPEG || mime.subtype() == mime_guess::mime::PNG)
    })
}
