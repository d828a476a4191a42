//! Directory walking implementation using walkdir.

use super::filter::{is_hidden, ImageFilter};
use super::{group_for_root, ScanResult, ScanRoot};
use crate::core::fingerprint::FingerprintRecord;
use crate::error::ScanError;
use std::path::Path;
use tracing::debug;
use walkdir::WalkDir;

/// Configuration for the enumerator
#[derive(Debug, Clone, Default)]
pub struct ScanConfig {
    /// Whether to follow symbolic links
    pub follow_symlinks: bool,
    /// Whether to include hidden files and directories
    pub include_hidden: bool,
    /// Custom extensions to include (None = use defaults)
    pub extensions: Option<Vec<String>>,
    /// Accept every file regardless of extension
    pub all_files: bool,
}

/// Flattens configured roots into record stubs
pub struct FileEnumerator {
    config: ScanConfig,
    filter: ImageFilter,
}

impl FileEnumerator {
    /// Create a new enumerator with the given configuration
    pub fn new(config: ScanConfig) -> Self {
        let mut filter = ImageFilter::new()
            .with_hidden(config.include_hidden)
            .with_all_files(config.all_files);

        if let Some(ref extensions) = config.extensions {
            filter = filter.with_extensions(extensions.clone());
        }

        Self { config, filter }
    }

    /// Enumerate every root in order, tagging records with their root's group.
    ///
    /// Unreadable roots and entries are skipped and reported in
    /// [`ScanResult::skipped`]; they never abort the walk.
    pub fn enumerate(&self, roots: &[ScanRoot]) -> ScanResult {
        let mut result = ScanResult::default();

        for (index, root) in roots.iter().enumerate() {
            let group = group_for_root(index, roots.len());
            let before = result.records.len();

            if let Err(e) = self.walk_root(root, group, &mut result) {
                debug!(root = %root.path.display(), error = %e, "skipping root");
                result.skipped.push(e);
                continue;
            }

            debug!(
                root = %root.path.display(),
                group,
                files = result.records.len() - before,
                "enumerated root"
            );
        }

        result
    }

    fn walk_root(
        &self,
        root: &ScanRoot,
        group: u32,
        result: &mut ScanResult,
    ) -> Result<(), ScanError> {
        if !root.path.is_dir() {
            return Err(ScanError::DirectoryNotFound {
                path: root.path.clone(),
            });
        }

        let mut walker = WalkDir::new(&root.path)
            .follow_links(self.config.follow_symlinks)
            .sort_by_file_name();

        if !root.recursive {
            walker = walker.max_depth(1);
        }

        let include_hidden = self.config.include_hidden;
        let entries = walker
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || include_hidden || !is_hidden(e.path()));

        for entry_result in entries {
            match entry_result {
                Ok(entry) => {
                    if !entry.file_type().is_file() {
                        continue;
                    }
                    if !self.filter.should_include(entry.path()) {
                        continue;
                    }
                    result
                        .records
                        .push(FingerprintRecord::new(entry.into_path(), group));
                }
                Err(e) => {
                    let path = e.path().map(Path::to_path_buf).unwrap_or_default();
                    let error = if e.io_error().map(|io| io.kind())
                        == Some(std::io::ErrorKind::PermissionDenied)
                    {
                        ScanError::PermissionDenied { path }
                    } else {
                        ScanError::ReadDirectory {
                            path,
                            source: std::io::Error::other(e.to_string()),
                        }
                    };
                    debug!(error = %error, "skipping entry");
                    result.skipped.push(error);
                }
            }
        }

        Ok(())
    }
}
