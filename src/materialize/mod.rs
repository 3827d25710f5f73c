//! Folder materialization: attachments + reference copies + archival copy.
//!
//! One materializer instance serves a whole run. It remembers what it has
//! already placed (real or planned), so several messages resolving to the
//! same folder key compose correctly, and a dry run previews exactly the
//! decisions a real run would make — same code path, gated at the final
//! write.

pub mod plan;

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use crate::model::message::Message;
use crate::model::outcome::{FileDisposition, FileOutcome, OutcomeRecord, OutcomeStatus};
use crate::refs::ReferenceSet;
use crate::sanitize;

use plan::{ContentDigest, Placement};

/// Subfolder for reference copies diverted by a same-named attachment.
const REFS_SUBDIR: &str = "refs";

/// Subfolder for archived original messages.
const ARCHIVE_SUBDIR: &str = "archive";

/// Materializes output folders under one output root.
pub struct Materializer {
    output_root: PathBuf,
    dry_run: bool,
    /// Content digests of files written (or, under dry-run, planned) in
    /// this run, layered over the filesystem for placement decisions.
    overlay: HashMap<PathBuf, ContentDigest>,
    /// Folder keys already materialized in this run.
    seen_keys: HashSet<String>,
}

impl Materializer {
    pub fn new(output_root: impl Into<PathBuf>, dry_run: bool) -> Self {
        Self {
            output_root: output_root.into(),
            dry_run,
            overlay: HashMap::new(),
            seen_keys: HashSet::new(),
        }
    }

    /// Materialize one message into `output_root/key`.
    ///
    /// Never returns an error: individual file failures are captured in the
    /// record (status `WriteError`) and the remaining files still land.
    pub fn materialize(
        &mut self,
        key: &str,
        message: &Message,
        refs: &ReferenceSet,
    ) -> OutcomeRecord {
        let target = self.output_root.join(key);
        let existed = target.is_dir() || self.seen_keys.contains(key);
        self.seen_keys.insert(key.to_string());

        let mut files = Vec::new();

        // Attachments, under the standard collision policy.
        for attachment in &message.attachments {
            let name = sanitize::filename(&attachment.filename);
            let digest = plan::digest(&attachment.content);
            let placement = self.place_in(&target, &name, digest);
            let rel = PathBuf::from(placement.name());
            self.apply(&target, rel, &attachment.content, digest, &placement, &mut files);
        }

        // Reference copies. Never suffixed at the top level: a same-named
        // entry with different content diverts the copy into refs/ so the
        // reference is never silently lost.
        for reference in &refs.files {
            let name = sanitize::filename(&reference.name);
            let digest = plan::digest(&reference.content);
            match self.entry_digest(&target.join(&name)) {
                None => {
                    let placement = Placement::Write(name.clone());
                    self.apply(
                        &target,
                        PathBuf::from(&name),
                        &reference.content,
                        digest,
                        &placement,
                        &mut files,
                    );
                }
                Some(found) if found == digest => {
                    files.push(FileOutcome {
                        path: PathBuf::from(&name),
                        disposition: FileDisposition::Skipped,
                        bytes: 0,
                    });
                }
                Some(_) => {
                    let placement = self.place_in(&target.join(REFS_SUBDIR), &name, digest);
                    let rel = Path::new(REFS_SUBDIR).join(placement.name());
                    self.apply(&target, rel, &reference.content, digest, &placement, &mut files);
                }
            }
        }

        // Archival copy of the raw message, named from the message's own
        // token so messages sharing a key keep distinct archives.
        let archive_name = format!("{}.eml", sanitize::filename(&message.token));
        let digest = plan::digest(&message.raw);
        let placement = self.place_in(&target.join(ARCHIVE_SUBDIR), &archive_name, digest);
        let rel = Path::new(ARCHIVE_SUBDIR).join(placement.name());
        self.apply(&target, rel, &message.raw, digest, &placement, &mut files);

        let failed: Vec<String> = files
            .iter()
            .filter(|f| matches!(f.disposition, FileDisposition::Failed(_)))
            .map(|f| f.path.display().to_string())
            .collect();

        let status = if !failed.is_empty() {
            OutcomeStatus::WriteError
        } else if existed {
            OutcomeStatus::Updated
        } else {
            OutcomeStatus::Created
        };

        tracing::info!(
            key,
            status = status.label(),
            files = files.len(),
            dry_run = self.dry_run,
            "Materialized folder"
        );

        OutcomeRecord {
            token: message.token.clone(),
            subject: message.subject.clone(),
            status,
            folder_key: Some(key.to_string()),
            files,
            detail: if failed.is_empty() {
                None
            } else {
                Some(format!("failed to write: {}", failed.join(", ")))
            },
        }
    }

    /// Placement decision for `name` inside `dir`, against the filesystem
    /// with this run's overlay on top.
    fn place_in(&self, dir: &Path, name: &str, digest: ContentDigest) -> Placement {
        plan::place(|candidate| self.entry_digest(&dir.join(candidate)), name, digest)
    }

    /// Content digest of an existing entry, or `None` when the path is
    /// free. Unreadable entries (including directories squatting on a file
    /// name) report [`plan::UNREADABLE`] and thus never match.
    fn entry_digest(&self, path: &Path) -> Option<ContentDigest> {
        if let Some(digest) = self.overlay.get(path) {
            return Some(*digest);
        }
        match std::fs::metadata(path) {
            Err(_) => None,
            Ok(meta) if !meta.is_file() => Some(plan::UNREADABLE),
            Ok(_) => match std::fs::read(path) {
                Ok(content) => Some(plan::digest(&content)),
                Err(_) => Some(plan::UNREADABLE),
            },
        }
    }

    /// The single write gate. Skips record as-is; writes go to disk unless
    /// this is a dry run, in which case only the overlay learns about them.
    fn apply(
        &mut self,
        target: &Path,
        rel: PathBuf,
        content: &[u8],
        digest: ContentDigest,
        placement: &Placement,
        files: &mut Vec<FileOutcome>,
    ) {
        if matches!(placement, Placement::Skip(_)) {
            files.push(FileOutcome {
                path: rel,
                disposition: FileDisposition::Skipped,
                bytes: 0,
            });
            return;
        }

        let absolute = target.join(&rel);
        if !self.dry_run {
            if let Err(e) = write_file(&absolute, content) {
                tracing::warn!(
                    path = %absolute.display(),
                    error = %e,
                    "Failed to write file"
                );
                files.push(FileOutcome {
                    path: rel,
                    disposition: FileDisposition::Failed(e.to_string()),
                    bytes: 0,
                });
                return;
            }
        }

        self.overlay.insert(absolute, digest);
        files.push(FileOutcome {
            path: rel,
            disposition: FileDisposition::Written,
            bytes: content.len() as u64,
        });
    }
}

/// Create parent directories and write the file.
fn write_file(path: &Path, content: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::message::Attachment;

    fn message(token: &str, attachments: Vec<Attachment>) -> Message {
        Message {
            token: token.to_string(),
            subject: "Test".to_string(),
            sender: "a@b.com".to_string(),
            received: None,
            attachments,
            raw: format!("raw message {token}").into_bytes(),
        }
    }

    fn refs(files: &[(&str, &[u8])]) -> ReferenceSet {
        ReferenceSet {
            files: files
                .iter()
                .map(|(name, content)| crate::refs::ReferenceFile {
                    name: name.to_string(),
                    content: content.to_vec(),
                })
                .collect(),
        }
    }

    #[test]
    fn test_created_then_updated() {
        let tmp = tempfile::tempdir().unwrap();
        let mut m = Materializer::new(tmp.path(), false);

        let rec = m.materialize("KEY", &message("m1", vec![]), &ReferenceSet::empty());
        assert_eq!(rec.status, OutcomeStatus::Created);

        let rec = m.materialize("KEY", &message("m2", vec![]), &ReferenceSet::empty());
        assert_eq!(rec.status, OutcomeStatus::Updated);
    }

    #[test]
    fn test_attachment_collision_suffix() {
        let tmp = tempfile::tempdir().unwrap();
        let mut m = Materializer::new(tmp.path(), false);

        let msg1 = message("m1", vec![Attachment::new("invoice.pdf", b"one".to_vec())]);
        let msg2 = message("m2", vec![Attachment::new("invoice.pdf", b"two".to_vec())]);
        m.materialize("KEY", &msg1, &ReferenceSet::empty());
        m.materialize("KEY", &msg2, &ReferenceSet::empty());

        assert_eq!(
            std::fs::read(tmp.path().join("KEY/invoice.pdf")).unwrap(),
            b"one"
        );
        assert_eq!(
            std::fs::read(tmp.path().join("KEY/invoice_2.pdf")).unwrap(),
            b"two"
        );
    }

    #[test]
    fn test_identical_attachment_skipped() {
        let tmp = tempfile::tempdir().unwrap();
        let mut m = Materializer::new(tmp.path(), false);

        let msg = message("m1", vec![Attachment::new("invoice.pdf", b"same".to_vec())]);
        m.materialize("KEY", &msg, &ReferenceSet::empty());
        let rec = m.materialize("KEY", &message("m2", vec![Attachment::new("invoice.pdf", b"same".to_vec())]), &ReferenceSet::empty());

        let skip = rec
            .files
            .iter()
            .find(|f| f.path == PathBuf::from("invoice.pdf"))
            .unwrap();
        assert_eq!(skip.disposition, FileDisposition::Skipped);
        assert!(!tmp.path().join("KEY/invoice_2.pdf").exists());
    }

    #[test]
    fn test_reference_diverted_not_suffixed() {
        let tmp = tempfile::tempdir().unwrap();
        let mut m = Materializer::new(tmp.path(), false);

        // Attachment claims checklist.txt with different content first
        let msg = message(
            "m1",
            vec![Attachment::new("checklist.txt", b"attachment".to_vec())],
        );
        m.materialize("KEY", &msg, &refs(&[("checklist.txt", b"reference")]));

        assert_eq!(
            std::fs::read(tmp.path().join("KEY/checklist.txt")).unwrap(),
            b"attachment"
        );
        assert_eq!(
            std::fs::read(tmp.path().join("KEY/refs/checklist.txt")).unwrap(),
            b"reference"
        );
        assert!(!tmp.path().join("KEY/checklist_2.txt").exists());
    }

    #[test]
    fn test_archive_per_message() {
        let tmp = tempfile::tempdir().unwrap();
        let mut m = Materializer::new(tmp.path(), false);

        m.materialize("KEY", &message("msg-a", vec![]), &ReferenceSet::empty());
        m.materialize("KEY", &message("msg-b", vec![]), &ReferenceSet::empty());

        assert_eq!(
            std::fs::read(tmp.path().join("KEY/archive/msg-a.eml")).unwrap(),
            b"raw message msg-a"
        );
        assert_eq!(
            std::fs::read(tmp.path().join("KEY/archive/msg-b.eml")).unwrap(),
            b"raw message msg-b"
        );
    }

    #[test]
    fn test_rerun_is_idempotent() {
        let tmp = tempfile::tempdir().unwrap();
        let msg = message("m1", vec![Attachment::new("a.pdf", b"data".to_vec())]);
        let rf = refs(&[("ref.txt", b"template")]);

        Materializer::new(tmp.path(), false).materialize("KEY", &msg, &rf);
        let listing_before = list_tree(tmp.path());

        // Fresh materializer, as a re-run of the tool would have
        let rec = Materializer::new(tmp.path(), false).materialize("KEY", &msg, &rf);
        let listing_after = list_tree(tmp.path());

        assert_eq!(rec.status, OutcomeStatus::Updated);
        assert_eq!(listing_before, listing_after);
        assert!(rec
            .files
            .iter()
            .all(|f| f.disposition == FileDisposition::Skipped));
    }

    #[test]
    fn test_dry_run_writes_nothing_but_decides_everything() {
        let tmp = tempfile::tempdir().unwrap();
        let msg = message("m1", vec![Attachment::new("a.pdf", b"data".to_vec())]);
        let rf = refs(&[("ref.txt", b"template")]);

        let mut dry = Materializer::new(tmp.path(), true);
        let dry_rec = dry.materialize("KEY", &msg, &rf);

        assert!(!tmp.path().join("KEY").exists());

        let mut real = Materializer::new(tmp.path(), false);
        let real_rec = real.materialize("KEY", &msg, &rf);

        assert_eq!(dry_rec.status, real_rec.status);
        let dry_files: Vec<_> = dry_rec.files.iter().map(|f| (&f.path, &f.disposition)).collect();
        let real_files: Vec<_> = real_rec.files.iter().map(|f| (&f.path, &f.disposition)).collect();
        assert_eq!(dry_files, real_files);
    }

    #[test]
    fn test_dry_run_sees_in_run_collisions() {
        let tmp = tempfile::tempdir().unwrap();
        let mut m = Materializer::new(tmp.path(), true);

        let msg1 = message("m1", vec![Attachment::new("invoice.pdf", b"one".to_vec())]);
        let msg2 = message("m2", vec![Attachment::new("invoice.pdf", b"two".to_vec())]);
        let rec1 = m.materialize("KEY", &msg1, &ReferenceSet::empty());
        let rec2 = m.materialize("KEY", &msg2, &ReferenceSet::empty());

        assert_eq!(rec1.status, OutcomeStatus::Created);
        assert_eq!(rec2.status, OutcomeStatus::Updated);
        assert!(rec2
            .files
            .iter()
            .any(|f| f.path == PathBuf::from("invoice_2.pdf")));
    }

    #[cfg(unix)]
    #[test]
    fn test_write_failure_is_isolated() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = tempfile::tempdir().unwrap();
        let target = tmp.path().join("KEY");
        let archive = target.join("archive");
        std::fs::create_dir_all(&archive).unwrap();
        // Attachments cannot land in the read-only target folder, but the
        // archive subfolder stays writable
        std::fs::set_permissions(&target, std::fs::Permissions::from_mode(0o555)).unwrap();

        let mut m = Materializer::new(tmp.path(), false);
        let msg = message("m1", vec![Attachment::new("a.pdf", b"data".to_vec())]);
        let rec = m.materialize("KEY", &msg, &ReferenceSet::empty());

        std::fs::set_permissions(&target, std::fs::Permissions::from_mode(0o755)).unwrap();

        assert_eq!(rec.status, OutcomeStatus::WriteError);
        let failed = rec.failed_files();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].path, PathBuf::from("a.pdf"));
        assert!(rec.detail.as_deref().unwrap().contains("a.pdf"));
        // The archive copy still landed
        assert!(target.join("archive/m1.eml").exists());
    }

    fn list_tree(root: &Path) -> Vec<(PathBuf, Vec<u8>)> {
        let mut out = Vec::new();
        let mut stack = vec![root.to_path_buf()];
        while let Some(dir) = stack.pop() {
            let mut entries: Vec<_> = std::fs::read_dir(&dir)
                .unwrap()
                .map(|e| e.unwrap().path())
                .collect();
            entries.sort();
            for path in entries {
                if path.is_dir() {
                    stack.push(path);
                } else {
                    let content = std::fs::read(&path).unwrap();
                    out.push((path, content));
                }
            }
        }
        out.sort();
        out
    }
}
