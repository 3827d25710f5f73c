//! The extraction variant registry.
//!
//! Each variant is one tagged case carrying its own matching rule, so adding
//! a rule touches exactly one place. The registry is fixed at compile time;
//! which variant is active is a run-scoped choice passed in by the caller,
//! never ambient state.

use crate::error::StowError;

/// A named subject-line extraction rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Variant {
    /// Permissive default: the subject up to the first delimiter
    /// (`" - "`, `": "`, `" #"`, in that priority order), or the whole
    /// subject when none is present.
    WholeSubject,
    /// Identifier after `invoice`/`inv`.
    Invoice,
    /// Identifier after `project`/`proj`.
    Project,
    /// Name after `client`/`customer`, up to the next `-`/`:` or end.
    Client,
    /// Identifier after `case`/`ticket`.
    Case,
    /// Identifier after `order`/`po`.
    Order,
    /// Identifier after `contract`/`agreement`.
    Contract,
    /// Identifier after `quote`/`rfq`.
    Quote,
    /// Identifier after `proposal`/`rfp`.
    Proposal,
    /// A standalone 10-character code starting with a digit, anywhere in
    /// the subject.
    AerospaceCode,
}

impl Variant {
    /// Every registered variant, in display order.
    pub const ALL: &'static [Variant] = &[
        Variant::WholeSubject,
        Variant::Invoice,
        Variant::Project,
        Variant::Client,
        Variant::Case,
        Variant::Order,
        Variant::Contract,
        Variant::Quote,
        Variant::Proposal,
        Variant::AerospaceCode,
    ];

    /// The configuration name of this variant.
    pub fn name(self) -> &'static str {
        match self {
            Variant::WholeSubject => "whole_subject",
            Variant::Invoice => "invoice",
            Variant::Project => "project",
            Variant::Client => "client",
            Variant::Case => "case",
            Variant::Order => "order",
            Variant::Contract => "contract",
            Variant::Quote => "quote",
            Variant::Proposal => "proposal",
            Variant::AerospaceCode => "aerospace_code",
        }
    }

    /// Look up a variant by its configuration name.
    pub fn from_name(name: &str) -> Result<Variant, StowError> {
        Variant::ALL
            .iter()
            .copied()
            .find(|v| v.name() == name)
            .ok_or_else(|| StowError::UnknownVariant(name.to_string()))
    }

    /// The regex rule for a named variant; `None` for the delimiter-based
    /// default, which is plain string logic.
    ///
    /// Anchors are word-bounded on both sides: `invoice` matches as a word,
    /// and an anchor with nothing after it fails outright instead of
    /// capturing its own tail.
    pub(super) fn pattern(self) -> Option<&'static str> {
        match self {
            Variant::WholeSubject => None,
            Variant::Invoice => Some(r"(?i)\b(?:invoice|inv)\b[\s:#-]*([A-Za-z0-9-]+)"),
            Variant::Project => Some(r"(?i)\b(?:project|proj)\b[\s:#-]*([A-Za-z0-9-]+)"),
            Variant::Client => {
                Some(r"(?i)\b(?:client|customer)\b[\s:#-]*([A-Za-z0-9][A-Za-z0-9 ]*?)\s*(?:[-:]|$)")
            }
            Variant::Case => Some(r"(?i)\b(?:case|ticket)\b[\s:#-]*([A-Za-z0-9-]+)"),
            Variant::Order => Some(r"(?i)\b(?:order|po)\b[\s:#-]*([A-Za-z0-9-]+)"),
            Variant::Contract => Some(r"(?i)\b(?:contract|agreement)\b[\s:#-]*([A-Za-z0-9-]+)"),
            Variant::Quote => Some(r"(?i)\b(?:quote|rfq)\b[\s:#-]*([A-Za-z0-9-]+)"),
            Variant::Proposal => Some(r"(?i)\b(?:proposal|rfp)\b[\s:#-]*([A-Za-z0-9-]+)"),
            // Standalone token, delimited by non-alphanumerics (the regex
            // crate has no look-around, so the delimiters are matched and
            // the code itself captured).
            Variant::AerospaceCode => {
                Some(r"(?:^|[^A-Za-z0-9])([0-9][A-Za-z0-9]{9})(?:[^A-Za-z0-9]|$)")
            }
        }
    }

    /// One-line description for `mailstow variants`.
    pub fn description(self) -> &'static str {
        match self {
            Variant::WholeSubject => "subject up to the first ' - ', ': ' or ' #' delimiter",
            Variant::Invoice => "identifier after 'invoice' or 'inv'",
            Variant::Project => "identifier after 'project' or 'proj'",
            Variant::Client => "name after 'client' or 'customer'",
            Variant::Case => "identifier after 'case' or 'ticket'",
            Variant::Order => "identifier after 'order' or 'po'",
            Variant::Contract => "identifier after 'contract' or 'agreement'",
            Variant::Quote => "identifier after 'quote' or 'rfq'",
            Variant::Proposal => "identifier after 'proposal' or 'rfp'",
            Variant::AerospaceCode => "standalone 10-char code starting with a digit",
        }
    }

    /// Example subject → key, for `mailstow variants`.
    pub fn example(self) -> (&'static str, &'static str) {
        match self {
            Variant::WholeSubject => ("Acme Corp - Review", "Acme Corp"),
            Variant::Invoice => ("Invoice: INV-2024-001", "INV-2024-001"),
            Variant::Project => ("Project ALPHA-7 kickoff", "ALPHA-7"),
            Variant::Client => ("Client: Acme Corp - contract draft", "Acme Corp"),
            Variant::Case => ("Case #88421 escalation", "88421"),
            Variant::Order => ("PO 2024-778", "2024-778"),
            Variant::Contract => ("Contract C-2291 signature", "C-2291"),
            Variant::Quote => ("RFQ Q-1042", "Q-1042"),
            Variant::Proposal => ("Proposal: RFP-19", "RFP-19"),
            Variant::AerospaceCode => ("Parts list 3AB88C21D0 rev 2", "3AB88C21D0"),
        }
    }
}

impl std::fmt::Display for Variant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
