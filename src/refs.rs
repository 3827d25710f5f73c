//! Reference-file snapshot.
//!
//! The reference directory holds recurring files (templates, checklists)
//! copied into every materialized folder. It is read exactly once per run —
//! a snapshot, not a live view — so every message in a run sees the same
//! reference content.

use std::path::Path;

use crate::error::{Result, StowError};

/// One reference file: name and content, captured at run start.
#[derive(Debug, Clone)]
pub struct ReferenceFile {
    pub name: String,
    pub content: Vec<u8>,
}

/// Snapshot of the reference directory, ordered by filename.
#[derive(Debug, Clone, Default)]
pub struct ReferenceSet {
    pub files: Vec<ReferenceFile>,
}

impl ReferenceSet {
    /// An empty snapshot (no reference directory configured).
    pub fn empty() -> Self {
        Self::default()
    }

    /// Snapshot a directory. A missing directory yields an empty set;
    /// a directory that exists but cannot be read is a run-level error.
    pub fn load(dir: &Path) -> Result<Self> {
        if !dir.is_dir() {
            tracing::debug!(path = %dir.display(), "No reference directory, skipping");
            return Ok(Self::empty());
        }

        let entries = std::fs::read_dir(dir).map_err(|e| StowError::ReferenceDir {
            path: dir.to_path_buf(),
            source: e,
        })?;

        let mut files = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| StowError::ReferenceDir {
                path: dir.to_path_buf(),
                source: e,
            })?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let content = std::fs::read(&path).map_err(|e| StowError::io(&path, e))?;
            files.push(ReferenceFile {
                name: entry.file_name().to_string_lossy().into_owned(),
                content,
            });
        }

        files.sort_by(|a, b| a.name.cmp(&b.name));
        tracing::info!(path = %dir.display(), count = files.len(), "Loaded reference snapshot");
        Ok(Self { files })
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }
}
