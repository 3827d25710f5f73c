//! The run coordinator.
//!
//! Drives extract → sanitize → materialize over a fetched batch, in source
//! order, isolating per-message failures. One bad message never aborts the
//! run; run-level problems (output root unusable) abort before anything is
//! materialized.

use std::path::PathBuf;

use crate::error::{Result, StowError};
use crate::extract::{self, FallbackPolicy, Variant};
use crate::materialize::Materializer;
use crate::model::message::Message;
use crate::model::outcome::OutcomeRecord;
use crate::refs::ReferenceSet;
use crate::sanitize;

/// Run-scoped configuration for one coordinator invocation.
///
/// The active variant travels here, never in process-global state, so runs
/// and tests with different variants cannot interfere.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub variant: Variant,
    pub fallback: FallbackPolicy,
    pub output_root: PathBuf,
    pub dry_run: bool,
}

/// Process a batch of messages and report one record per message, in order.
///
/// `progress` receives `(processed, total)` after each message.
pub fn run(
    messages: &[Message],
    refs: &ReferenceSet,
    options: &RunOptions,
    progress: Option<&dyn Fn(usize, usize)>,
) -> Result<Vec<OutcomeRecord>> {
    if !options.dry_run {
        std::fs::create_dir_all(&options.output_root).map_err(|e| StowError::OutputRoot {
            path: options.output_root.clone(),
            source: e,
        })?;
    }

    let mut materializer = Materializer::new(&options.output_root, options.dry_run);
    let mut records = Vec::with_capacity(messages.len());
    let total = messages.len();

    for (i, message) in messages.iter().enumerate() {
        records.push(process_message(message, refs, &mut materializer, options));
        if let Some(report) = progress {
            report(i + 1, total);
        }
    }

    Ok(records)
}

/// One message through the pipeline. Infallible by design: every failure
/// mode folds into the returned record.
fn process_message(
    message: &Message,
    refs: &ReferenceSet,
    materializer: &mut Materializer,
    options: &RunOptions,
) -> OutcomeRecord {
    let raw_key = match extract_with_fallback(&message.subject, options) {
        Some(key) => key,
        None => {
            tracing::debug!(
                token = %message.token,
                subject = %message.subject,
                variant = %options.variant,
                "No key extracted"
            );
            return OutcomeRecord::no_match(
                &message.token,
                &message.subject,
                format!("no identifier for variant '{}'", options.variant),
            );
        }
    };

    let Some(key) = sanitize::folder_key(&raw_key) else {
        return OutcomeRecord::no_match(
            &message.token,
            &message.subject,
            format!("key '{raw_key}' sanitized to nothing"),
        );
    };

    materializer.materialize(&key, message, refs)
}

/// Apply the active variant, then the configured fallback policy when a
/// named variant reports no match.
fn extract_with_fallback(subject: &str, options: &RunOptions) -> Option<String> {
    extract::extract(subject, options.variant).or_else(|| {
        match (options.fallback, options.variant) {
            (FallbackPolicy::WholeSubject, v) if v != Variant::WholeSubject => {
                extract::extract(subject, Variant::WholeSubject)
            }
            _ => None,
        }
    })
}
