//! File filtering logic for the enumerator.

use std::collections::HashSet;
use std::path::Path;

/// Extensions the default codec can decode
const DEFAULT_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "webp", "gif", "bmp", "tiff", "tif", "ico", "tga", "pnm", "ppm",
    "pgm", "pbm", "qoi",
];

/// Filters files to determine if they are candidate images
#[derive(Debug, Clone)]
pub struct ImageFilter {
    /// File extensions to include (lowercase)
    extensions: HashSet<String>,
    /// Whether to include hidden files
    include_hidden: bool,
    /// Accept every regular file and let decoding sort them out
    all_files: bool,
}

impl ImageFilter {
    /// Create a new filter with the default image extensions
    pub fn new() -> Self {
        Self {
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            include_hidden: false,
            all_files: false,
        }
    }

    /// Include hidden files (starting with .)
    pub fn with_hidden(mut self, include: bool) -> Self {
        self.include_hidden = include;
        self
    }

    /// Override the list of extensions to accept
    pub fn with_extensions(mut self, extensions: Vec<String>) -> Self {
        self.extensions = extensions.into_iter().map(|e| e.to_lowercase()).collect();
        self
    }

    /// Skip the extension check entirely
    pub fn with_all_files(mut self, all_files: bool) -> Self {
        self.all_files = all_files;
        self
    }

    /// Check if a file should be included
    pub fn should_include(&self, path: &Path) -> bool {
        if !self.include_hidden && is_hidden(path) {
            return false;
        }

        if self.all_files {
            return true;
        }

        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) => self.extensions.contains(&ext.to_lowercase()),
            None => false,
        }
    }
}

impl Default for ImageFilter {
    fn default() -> Self {
        Self::new()
    }
}

pub(super) fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_includes_common_formats_case_insensitively() {
        let filter = ImageFilter::new();
        assert!(filter.should_include(Path::new("/photos/image.jpg")));
        assert!(filter.should_include(Path::new("/photos/image.JPEG")));
        assert!(filter.should_include(Path::new("/photos/scan.Png")));
    }

    #[test]
    fn filter_excludes_non_images() {
        let filter = ImageFilter::new();
        assert!(!filter.should_include(Path::new("/photos/document.pdf")));
        assert!(!filter.should_include(Path::new("/photos/no_extension")));
    }

    #[test]
    fn filter_excludes_hidden_by_default() {
        let filter = ImageFilter::new();
        assert!(!filter.should_include(Path::new("/photos/.hidden.jpg")));
        assert!(ImageFilter::new()
            .with_hidden(true)
            .should_include(Path::new("/photos/.hidden.jpg")));
    }

    #[test]
    fn all_files_accepts_anything_visible() {
        let filter = ImageFilter::new().with_all_files(true);
        assert!(filter.should_include(Path::new("/photos/notes.txt")));
        assert!(filter.should_include(Path::new("/photos/no_extension")));
        assert!(!filter.should_include(Path::new("/photos/.DS_Store")));
    }

    #[test]
    fn custom_extensions_replace_defaults() {
        let filter = ImageFilter::new().with_extensions(vec!["RAW".to_string()]);
        assert!(filter.should_include(Path::new("a.raw")));
        assert!(!filter.should_include(Path::new("a.jpg")));
    }
}
