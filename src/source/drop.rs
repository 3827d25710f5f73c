//! Local drop-folder connector.
//!
//! Scans a directory for `.eml` files and decodes them in filename order,
//! so repeated runs see the same sequence.

use std::path::{Path, PathBuf};

use crate::error::{Result, StowError};
use crate::model::message::Message;
use crate::parser::eml;

use super::MessageSource;

/// Reads saved messages out of a local drop directory.
pub struct DropDir {
    dir: PathBuf,
}

impl DropDir {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// List `.eml` files in the drop folder, sorted by filename.
    fn list_message_files(&self) -> Result<Vec<PathBuf>> {
        if !self.dir.is_dir() {
            return Err(StowError::DropFolderNotFound(self.dir.clone()));
        }

        let entries = std::fs::read_dir(&self.dir).map_err(|e| StowError::io(&self.dir, e))?;

        let mut paths = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| StowError::io(&self.dir, e))?;
            let path = entry.path();
            if path.is_file() && has_eml_extension(&path) {
                paths.push(path);
            }
        }
        paths.sort();
        Ok(paths)
    }
}

impl MessageSource for DropDir {
    fn fetch(&self) -> Result<Vec<Message>> {
        let paths = self.list_message_files()?;
        tracing::info!(path = %self.dir.display(), count = paths.len(), "Scanning drop folder");

        let mut messages = Vec::with_capacity(paths.len());
        for path in paths {
            match eml::decode_file(&path) {
                Ok(message) => messages.push(message),
                Err(e) => {
                    // One unreadable file must not sink the batch
                    tracing::warn!(
                        path = %path.display(),
                        error = %e,
                        "Skipping undecodable message file"
                    );
                }
            }
        }
        Ok(messages)
    }

    fn describe(&self) -> String {
        format!("drop folder {}", self.dir.display())
    }
}

fn has_eml_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("eml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &[u8] = b"From: a@b.com\r\nSubject: Test - one\r\n\r\nbody\r\n";

    #[test]
    fn test_missing_dir_is_fatal() {
        let source = DropDir::new("/nonexistent/drop");
        assert!(matches!(
            source.fetch(),
            Err(StowError::DropFolderNotFound(_))
        ));
    }

    #[test]
    fn test_fetch_sorted_and_filtered_by_extension() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("b.eml"), MINIMAL).unwrap();
        std::fs::write(tmp.path().join("a.EML"), MINIMAL).unwrap();
        std::fs::write(tmp.path().join("notes.txt"), b"not a message").unwrap();

        let source = DropDir::new(tmp.path());
        let messages = source.fetch().unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].token, "a");
        assert_eq!(messages[1].token, "b");
    }

    #[test]
    fn test_undecodable_file_skipped() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("bad.eml"), b"").unwrap();
        std::fs::write(tmp.path().join("good.eml"), MINIMAL).unwrap();

        let source = DropDir::new(tmp.path());
        let messages = source.fetch().unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].token, "good");
    }
}
