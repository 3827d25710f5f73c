//! Decoded message types.
//!
//! A [`Message`] is fully decoded at fetch time — subject and attachments
//! are ready to use, no lazy MIME access. Email volume is human-scale, so
//! holding a batch in memory is fine.

use chrono::{DateTime, Utc};

/// A decoded attachment: original filename plus its binary payload.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Attachment {
    /// Filename as declared in the MIME part. Generated if missing.
    pub filename: String,

    /// Decoded binary content.
    #[serde(skip)]
    pub content: Vec<u8>,
}

impl Attachment {
    pub fn new(filename: impl Into<String>, content: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            content,
        }
    }
}

/// A single fetched email message, immutable for the duration of a run.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Message {
    /// Opaque identifier used for archival naming — distinct per message,
    /// even when several messages resolve to the same folder key. The drop
    /// connector uses the source file stem.
    pub token: String,

    /// Decoded subject line (RFC 2047 encoded-words resolved).
    pub subject: String,

    /// Sender, formatted as `Display Name <address>` or a bare address.
    pub sender: String,

    /// Parsed `Date:` header, when present.
    pub received: Option<DateTime<Utc>>,

    /// Decoded attachments in MIME part order.
    pub attachments: Vec<Attachment>,

    /// The raw message bytes, archived verbatim.
    #[serde(skip)]
    pub raw: Vec<u8>,
}

impl Message {
    /// Total decoded attachment payload in bytes.
    pub fn attachment_bytes(&self) -> u64 {
        self.attachments.iter().map(|a| a.content.len() as u64).sum()
    }
}
