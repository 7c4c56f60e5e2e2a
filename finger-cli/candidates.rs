use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use finger_core::Candidate;
use tracing::debug;

/// File extensions treated as images, compared case-insensitively
pub const SUPPORTED_EXTENSIONS: [&str; 4] = ["bmp", "jpg", "jpeg", "png"];

pub fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| SUPPORTED_EXTENSIONS.iter().any(|s| e.eq_ignore_ascii_case(s)))
}

/// Candidate images in one directory, sorted by file name.
#[derive(Debug, Clone)]
pub struct ImageDirectory {
    root: PathBuf,
    exclude: Option<PathBuf>,
    limit: Option<usize>,
}

impl ImageDirectory {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            exclude: None,
            limit: None,
        }
    }

    /// Leave this file out, typically the reference image itself
    pub fn excluding(mut self, path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        self.exclude = Some(fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf()));
        self
    }

    /// Return at most `limit` candidates
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// List supported image files; sorting keeps tie-breaks reproducible
    pub fn candidates(&self) -> io::Result<Vec<Candidate>> {
        let mut paths = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            let path = entry.path();
            if !entry.file_type()?.is_file() || !is_supported_image(&path) {
                continue;
            }
            if self.is_excluded(&path) {
                debug!("Excluding {} from candidates", path.display());
                continue;
            }
            paths.push(path);
        }

        paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
        if let Some(limit) = self.limit {
            paths.truncate(limit);
        }

        Ok(paths.into_iter().map(Candidate::from_path).collect())
    }

    fn is_excluded(&self, path: &Path) -> bool {
        match &self.exclude {
            Some(excluded) => fs::canonicalize(path).map_or(path == excluded, |p| &p == excluded),
            None => false,
        }
    }
}
