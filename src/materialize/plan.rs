//! Pure collision and idempotence decisions.
//!
//! Placement is decided against a content lookup, never against the
//! filesystem directly, so the same function drives real writes, dry-run
//! previews, and unit tests.

use sha2::{Digest as _, Sha256};

/// SHA-256 of a file's content, used for byte-identity checks.
pub type ContentDigest = [u8; 32];

/// Digest of known-unreadable content. Never equals a real digest, so a
/// collision against it always diverts to a suffixed name.
pub const UNREADABLE: ContentDigest = [0u8; 32];

/// Hash a payload.
pub fn digest(content: &[u8]) -> ContentDigest {
    Sha256::digest(content).into()
}

/// Where a file should land, and whether anything needs writing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Placement {
    /// No entry with this content exists; write under the carried name.
    Write(String),
    /// Byte-identical content already present under the carried name.
    Skip(String),
}

impl Placement {
    /// The resolved filename, whichever way the decision went.
    pub fn name(&self) -> &str {
        match self {
            Placement::Write(n) | Placement::Skip(n) => n,
        }
    }
}

/// Decide where `name` with content `content` lands in a folder.
///
/// `existing` reports the content digest of a directory entry, or `None`
/// when the name is free. Identical content skips the write; different
/// content moves to `name_2.ext`, `name_3.ext`, … until a free or
/// identical slot is found.
pub fn place(
    existing: impl Fn(&str) -> Option<ContentDigest>,
    name: &str,
    content: ContentDigest,
) -> Placement {
    let mut candidate = name.to_string();
    let mut counter = 2;
    loop {
        match existing(&candidate) {
            None => return Placement::Write(candidate),
            Some(found) if found == content => return Placement::Skip(candidate),
            Some(_) => {
                candidate = suffixed(name, counter);
                counter += 1;
            }
        }
    }
}

/// `invoice.pdf` + 2 → `invoice_2.pdf`; extensionless names get a plain
/// `_2` suffix. Only the final extension moves.
fn suffixed(name: &str, counter: u32) -> String {
    match name.rfind('.').filter(|&pos| pos > 0) {
        Some(pos) => format!("{}_{}{}", &name[..pos], counter, &name[pos..]),
        None => format!("{name}_{counter}"),
    }
}
