//! Decoder for `.eml` files (bare RFC 5322 messages).
//!
//! Everything is decoded eagerly: subject, sender, date, and attachment
//! payloads. A run holds one human inbox's worth of messages, so there is
//! no lazy MIME access here.

use std::path::Path;

use chrono::{DateTime, Utc};
use mail_parser::{MessageParser, MimeHeaders};

use crate::error::{Result, StowError};
use crate::model::message::{Attachment, Message};

/// Decode a single `.eml` file.
///
/// The archival token is the source file's stem (`invoice-7781.eml` →
/// `invoice-7781`), which is unique within a drop folder.
pub fn decode_file(path: impl AsRef<Path>) -> Result<Message> {
    let path = path.as_ref();
    let raw = std::fs::read(path).map_err(|e| StowError::io(path, e))?;

    let token = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "message".to_string());

    decode_bytes(raw, &token).map_err(|e| match e {
        StowError::Decode { reason, .. } => StowError::Decode {
            path: path.to_path_buf(),
            reason,
        },
        other => other,
    })
}

/// Decode raw RFC 5322 bytes into a [`Message`].
pub fn decode_bytes(raw: Vec<u8>, token: &str) -> Result<Message> {
    let parsed = MessageParser::default().parse(&raw).ok_or_else(|| StowError::Decode {
        path: Path::new(token).to_path_buf(),
        reason: "not a parseable RFC 5322 message".to_string(),
    })?;

    let subject = parsed.subject().unwrap_or_default().to_string();
    let sender = format_sender(&parsed);
    let received = parsed
        .date()
        .and_then(|d| DateTime::<Utc>::from_timestamp(d.to_timestamp(), 0));

    let attachments = parsed
        .attachments()
        .enumerate()
        .map(|(idx, part)| {
            let filename = part
                .attachment_name()
                .map(String::from)
                .unwrap_or_else(|| format!("attachment_{idx}"));
            Attachment::new(filename, part.contents().to_vec())
        })
        .collect();

    Ok(Message {
        token: token.to_string(),
        subject,
        sender,
        received,
        attachments,
        raw,
    })
}

/// Format the first `From:` mailbox as `Display Name <address>`,
/// a bare address, or an empty string when the header is absent.
fn format_sender(parsed: &mail_parser::Message<'_>) -> String {
    let Some(from) = parsed.from().and_then(|a| a.first()) else {
        return String::new();
    };
    let name = from.name.as_deref().unwrap_or_default();
    let address = from.address.as_deref().unwrap_or_default();
    match (name.is_empty(), address.is_empty()) {
        (false, false) => format!("{name} <{address}>"),
        (true, false) => address.to_string(),
        (false, true) => name.to_string(),
        (true, true) => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SIMPLE: &str = "From: Ann Example <ann@example.com>\r\n\
        To: desk@example.com\r\n\
        Subject: Invoice: INV-2024-001\r\n\
        Date: Thu, 04 Jan 2024 10:00:00 +0000\r\n\
        MIME-Version: 1.0\r\n\
        Content-Type: text/plain\r\n\
        \r\n\
        See attached.\r\n";

    const WITH_ATTACHMENT: &str = "From: ann@example.com\r\n\
        Subject: Case #42\r\n\
        MIME-Version: 1.0\r\n\
        Content-Type: multipart/mixed; boundary=\"b1\"\r\n\
        \r\n\
        --b1\r\n\
        Content-Type: text/plain\r\n\
        \r\n\
        body\r\n\
        --b1\r\n\
        Content-Type: application/pdf; name=\"invoice.pdf\"\r\n\
        Content-Disposition: attachment; filename=\"invoice.pdf\"\r\n\
        Content-Transfer-Encoding: base64\r\n\
        \r\n\
        JVBERi0xLjQK\r\n\
        --b1--\r\n";

    #[test]
    fn test_decode_simple_message() {
        let msg = decode_bytes(SIMPLE.as_bytes().to_vec(), "m1").unwrap();
        assert_eq!(msg.subject, "Invoice: INV-2024-001");
        assert_eq!(msg.sender, "Ann Example <ann@example.com>");
        assert_eq!(msg.token, "m1");
        assert!(msg.received.is_some());
        assert!(msg.attachments.is_empty());
        assert_eq!(msg.raw, SIMPLE.as_bytes());
    }

    #[test]
    fn test_decode_attachment_payload() {
        let msg = decode_bytes(WITH_ATTACHMENT.as_bytes().to_vec(), "m2").unwrap();
        assert_eq!(msg.attachments.len(), 1);
        assert_eq!(msg.attachments[0].filename, "invoice.pdf");
        // "JVBERi0xLjQK" is base64 for "%PDF-1.4\n"
        assert_eq!(msg.attachments[0].content, b"%PDF-1.4\n");
    }

    #[test]
    fn test_decode_missing_headers() {
        let msg = decode_bytes(b"Subject: bare\r\n\r\nhi\r\n".to_vec(), "m3").unwrap();
        assert_eq!(msg.subject, "bare");
        assert_eq!(msg.sender, "");
        assert!(msg.received.is_none());
    }

    #[test]
    fn test_decode_file_missing() {
        let err = decode_file("/nonexistent/nope.eml").unwrap_err();
        assert!(matches!(err, StowError::Io { .. }));
    }
}
