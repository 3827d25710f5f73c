//! Key extraction: subject line + variant → raw folder key.
//!
//! Matching is case-insensitive on anchors and case-preserving on captures.
//! Extraction never fails loudly — malformed or garbage subjects report
//! no-match (`None`) and the caller decides what that means.

mod variant;

pub use variant::Variant;

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

/// Reply/forward prefixes stripped before any matching: `Re:`, `Fwd:`,
/// `Fw:`, `AW:`, `SV:`.
static REPLY_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(?:re|fwd?|aw|sv)\s*:\s*").expect("prefix pattern compiles"));

/// Compiled rules for every named variant, built once per process.
static RULES: LazyLock<HashMap<Variant, Regex>> = LazyLock::new(|| {
    Variant::ALL
        .iter()
        .filter_map(|v| {
            v.pattern()
                .map(|p| (*v, Regex::new(p).expect("variant pattern compiles")))
        })
        .collect()
});

/// Policy for a named variant that reports no match.
///
/// An explicit per-run choice: the permissive default and the strict named
/// variants disagree about rejection, so the caller has to pick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FallbackPolicy {
    /// Report the message as NoMatch and skip it.
    Reject,
    /// Retry with the permissive [`Variant::WholeSubject`] rule.
    WholeSubject,
}

impl FallbackPolicy {
    pub fn name(self) -> &'static str {
        match self {
            Self::Reject => "reject",
            Self::WholeSubject => "whole-subject",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "reject" => Some(Self::Reject),
            "whole-subject" | "whole_subject" => Some(Self::WholeSubject),
            _ => None,
        }
    }
}

/// Extract a raw (unsanitized) folder key from a subject line.
///
/// Returns `None` when the variant finds no usable identifier. The default
/// [`Variant::WholeSubject`] only does so for empty or whitespace subjects.
pub fn extract(subject: &str, variant: Variant) -> Option<String> {
    let subject = REPLY_PREFIX.replace(subject.trim(), "");
    let subject = subject.trim();
    if subject.is_empty() {
        return None;
    }

    let key = match variant {
        Variant::WholeSubject => before_first_delimiter(subject).to_string(),
        named => {
            let rule = &RULES[&named];
            rule.captures(subject)?
                .iter()
                .skip(1)
                .flatten()
                .last()?
                .as_str()
                .to_string()
        }
    };

    let key = key.trim();
    if key.is_empty() {
        None
    } else {
        Some(key.to_string())
    }
}

/// Split on the first delimiter, checked in priority order: `" - "` wins
/// over `": "`, which wins over `" #"`. No delimiter → the whole subject.
fn before_first_delimiter(subject: &str) -> &str {
    for delimiter in [" - ", ": ", " #"] {
        if let Some(pos) = subject.find(delimiter) {
            return &subject[..pos];
        }
    }
    subject
}
