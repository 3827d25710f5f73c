//! Message sources.
//!
//! A source delivers a batch of fully decoded messages, in a stable order,
//! before any extraction starts. The shipped implementation scans a local
//! drop folder; a remote provider connector would implement the same trait.

pub mod drop;

pub use drop::DropDir;

use crate::error::Result;
use crate::model::message::Message;

/// A connector that fetches one batch of messages per run.
pub trait MessageSource {
    /// Fetch and decode every available message. Failing to reach the
    /// source at all is a run-fatal error; individual undecodable messages
    /// are skipped with a warning.
    fn fetch(&self) -> Result<Vec<Message>>;

    /// Human-readable description for logs and reports.
    fn describe(&self) -> String;
}

/// Narrow a fetched batch by sender and/or subject substring,
/// case-insensitively. Mirrors the keyword filtering a provider-side fetch
/// would apply.
#[derive(Debug, Clone, Default)]
pub struct MessageFilter {
    pub sender_contains: Option<String>,
    pub subject_contains: Option<String>,
}

impl MessageFilter {
    pub fn is_empty(&self) -> bool {
        self.sender_contains.is_none() && self.subject_contains.is_none()
    }

    pub fn matches(&self, message: &Message) -> bool {
        let contains = |haystack: &str, needle: &str| {
            haystack.to_lowercase().contains(&needle.to_lowercase())
        };
        if let Some(needle) = &self.sender_contains {
            if !contains(&message.sender, needle) {
                return false;
            }
        }
        if let Some(needle) = &self.subject_contains {
            if !contains(&message.subject, needle) {
                return false;
            }
        }
        true
    }

    /// Apply the filter, preserving order.
    pub fn apply(&self, messages: Vec<Message>) -> Vec<Message> {
        if self.is_empty() {
            return messages;
        }
        messages.into_iter().filter(|m| self.matches(m)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(subject: &str, sender: &str) -> Message {
        Message {
            token: "t".into(),
            subject: subject.into(),
            sender: sender.into(),
            received: None,
            attachments: vec![],
            raw: vec![],
        }
    }

    #[test]
    fn test_empty_filter_passes_all() {
        let filter = MessageFilter::default();
        assert!(filter.matches(&message("anything", "anyone@example.com")));
    }

    #[test]
    fn test_sender_filter_case_insensitive() {
        let filter = MessageFilter {
            sender_contains: Some("ACME.com".into()),
            subject_contains: None,
        };
        assert!(filter.matches(&message("x", "Billing <billing@acme.com>")));
        assert!(!filter.matches(&message("x", "other@example.com")));
    }

    #[test]
    fn test_subject_filter() {
        let filter = MessageFilter {
            sender_contains: None,
            subject_contains: Some("invoice".into()),
        };
        assert!(filter.matches(&message("Invoice: INV-1", "a@b.com")));
        assert!(!filter.matches(&message("Lunch", "a@b.com")));
    }

    #[test]
    fn test_apply_preserves_order() {
        let filter = MessageFilter {
            sender_contains: None,
            subject_contains: Some("keep".into()),
        };
        let batch = vec![
            message("keep 1", "a"),
            message("drop", "a"),
            message("keep 2", "a"),
        ];
        let kept = filter.apply(batch);
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].subject, "keep 1");
        assert_eq!(kept[1].subject, "keep 2");
    }
}
