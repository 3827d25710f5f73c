//! `mailstow` — file saved emails into per-project folders.
//!
//! This crate provides the core library: subject-line key extraction,
//! folder-name sanitization, and idempotent folder materialization
//! (attachments + reference copies + archival copy), plus the drop-folder
//! connector and run coordinator that tie them together.

pub mod config;
pub mod error;
pub mod extract;
pub mod materialize;
pub mod model;
pub mod parser;
pub mod refs;
pub mod run;
pub mod sanitize;
pub mod source;
