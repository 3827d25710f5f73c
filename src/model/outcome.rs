//! Per-message outcomes and the run summary.
//!
//! These are report-only values: collected during a run, printed, and
//! discarded. Nothing here is persisted.

use std::path::PathBuf;

/// Final status of one message's processing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeStatus {
    /// The target folder did not exist and was created.
    Created,
    /// The target folder already existed and was reused.
    Updated,
    /// Extraction or sanitization produced no usable folder key.
    NoMatch,
    /// At least one file failed to write; the rest of the folder was still
    /// materialized.
    WriteError,
}

impl OutcomeStatus {
    /// Short label for table output.
    pub fn label(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Updated => "updated",
            Self::NoMatch => "no-match",
            Self::WriteError => "write-error",
        }
    }
}

/// What happened (or would happen, under dry-run) to one planned file.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case", tag = "disposition", content = "error")]
pub enum FileDisposition {
    /// Written fresh (possibly under a suffixed or diverted name).
    Written,
    /// Byte-identical content already present; nothing written.
    Skipped,
    /// The write failed; carries the error text.
    Failed(String),
}

/// One file-level decision inside a materialization.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct FileOutcome {
    /// Destination path relative to the target folder.
    pub path: PathBuf,
    #[serde(flatten)]
    pub disposition: FileDisposition,
    /// Bytes written (0 for skips and failures).
    pub bytes: u64,
}

/// The result of processing one message.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct OutcomeRecord {
    /// The message's archival token.
    pub token: String,

    /// Original subject line, for diagnosing unmatched messages.
    pub subject: String,

    pub status: OutcomeStatus,

    /// The sanitized folder key, absent on NoMatch.
    pub folder_key: Option<String>,

    /// File-level decisions, in the order they were made. Empty on NoMatch.
    pub files: Vec<FileOutcome>,

    /// Human-readable explanation: why a message did not match, or which
    /// files failed.
    pub detail: Option<String>,
}

impl OutcomeRecord {
    /// A NoMatch record for a message rejected before materialization.
    pub fn no_match(token: &str, subject: &str, detail: impl Into<String>) -> Self {
        Self {
            token: token.to_string(),
            subject: subject.to_string(),
            status: OutcomeStatus::NoMatch,
            folder_key: None,
            files: Vec::new(),
            detail: Some(detail.into()),
        }
    }

    /// Names of files that failed to write.
    pub fn failed_files(&self) -> Vec<&FileOutcome> {
        self.files
            .iter()
            .filter(|f| matches!(f.disposition, FileDisposition::Failed(_)))
            .collect()
    }
}

/// Aggregated counts for operator display.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct RunSummary {
    pub created: usize,
    pub updated: usize,
    pub no_match: usize,
    pub write_error: usize,
    /// Total bytes actually written (0 under dry-run).
    pub bytes_written: u64,
}

impl RunSummary {
    /// Tally a sequence of records.
    pub fn from_records(records: &[OutcomeRecord]) -> Self {
        let mut summary = Self::default();
        for record in records {
            match record.status {
                OutcomeStatus::Created => summary.created += 1,
                OutcomeStatus::Updated => summary.updated += 1,
                OutcomeStatus::NoMatch => summary.no_match += 1,
                OutcomeStatus::WriteError => summary.write_error += 1,
            }
            summary.bytes_written += record
                .files
                .iter()
                .filter(|f| f.disposition == FileDisposition::Written)
                .map(|f| f.bytes)
                .sum::<u64>();
        }
        summary
    }

    pub fn total(&self) -> usize {
        self.created + self.updated + self.no_match + self.write_error
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(status: OutcomeStatus) -> OutcomeRecord {
        OutcomeRecord {
            token: "m1".into(),
            subject: "s".into(),
            status,
            folder_key: None,
            files: Vec::new(),
            detail: None,
        }
    }

    #[test]
    fn test_summary_counts() {
        let records = vec![
            record(OutcomeStatus::Created),
            record(OutcomeStatus::Created),
            record(OutcomeStatus::Updated),
            record(OutcomeStatus::NoMatch),
            record(OutcomeStatus::WriteError),
        ];
        let summary = RunSummary::from_records(&records);
        assert_eq!(summary.created, 2);
        assert_eq!(summary.updated, 1);
        assert_eq!(summary.no_match, 1);
        assert_eq!(summary.write_error, 1);
        assert_eq!(summary.total(), 5);
    }

    #[test]
    fn test_summary_bytes_counts_written_only() {
        let mut rec = record(OutcomeStatus::Created);
        rec.files = vec![
            FileOutcome {
                path: PathBuf::from("a.pdf"),
                disposition: FileDisposition::Written,
                bytes: 100,
            },
            FileOutcome {
                path: PathBuf::from("b.pdf"),
                disposition: FileDisposition::Skipped,
                bytes: 0,
            },
            FileOutcome {
                path: PathBuf::from("c.pdf"),
                disposition: FileDisposition::Failed("denied".into()),
                bytes: 0,
            },
        ];
        let summary = RunSummary::from_records(&[rec]);
        assert_eq!(summary.bytes_written, 100);
    }

    #[test]
    fn test_failed_files() {
        let mut rec = record(OutcomeStatus::WriteError);
        rec.files = vec![
            FileOutcome {
                path: PathBuf::from("ok.pdf"),
                disposition: FileDisposition::Written,
                bytes: 10,
            },
            FileOutcome {
                path: PathBuf::from("bad.pdf"),
                disposition: FileDisposition::Failed("disk full".into()),
                bytes: 0,
            },
        ];
        let failed = rec.failed_files();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].path, PathBuf::from("bad.pdf"));
    }
}
