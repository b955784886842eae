use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::config::ScanConfig;
use crate::error::{DocsynthError, Result};

/// Walks a source tree and collects the files worth analyzing
pub struct DirectoryScanner {
    skip_dirs: HashSet<String>,
    extensions: HashSet<String>,
    fail_on_error: bool,
}

impl DirectoryScanner {
    pub fn new(config: &ScanConfig) -> Self {
        Self {
            skip_dirs: config.skip_dirs.iter().cloned().collect(),
            extensions: config
                .extensions
                .iter()
                .map(|ext| ext.trim_start_matches('.').to_string())
                .collect(),
            fail_on_error: config.fail_on_error,
        }
    }

    /// Collect matching files under `root` in walker order
    pub fn scan<P: AsRef<Path>>(&self, root: P) -> Result<Vec<PathBuf>> {
        let root = root.as_ref();
        if !root.is_dir() {
            return Err(DocsynthError::FileSystem(format!(
                "source root is not a directory: {}",
                root.display()
            )));
        }

        let mut files = Vec::new();
        let walker = WalkDir::new(root)
            .into_iter()
            .filter_entry(|entry| entry.depth() == 0 || !self.is_skipped_dir(entry));

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) if self.fail_on_error => {
                    return Err(DocsynthError::FileSystem(e.to_string()));
                }
                Err(e) => {
                    warn!("Skipping unreadable entry: {}", e);
                    continue;
                }
            };

            if entry.file_type().is_file() && self.should_include(entry.path()) {
                files.push(entry.into_path());
            }
        }

        debug!("Scanned {} matching files under {}", files.len(), root.display());
        Ok(files)
    }

    fn is_skipped_dir(&self, entry: &walkdir::DirEntry) -> bool {
        entry.file_type().is_dir()
            && entry
                .file_name()
                .to_str()
                .map_or(false, |name| self.skip_dirs.contains(name))
    }

    fn should_include(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map_or(false, |ext| self.extensions.contains(ext))
    }
}
