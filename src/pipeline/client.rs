//! Translation client: one chunk through the translator, with retries.
//!
//! This is the only pipeline stage with network I/O. Every call is wrapped in
//! the configured per-call timeout and driven by a [`RetryPolicy`]; the policy
//! gives up early on [`TranslateError::Permanent`].
//!
//! Translation services trim whitespace at the edges of what they return.
//! Reassembly is plain concatenation, so a chunk that ended in `". "` or
//! `"\n"` would otherwise glue onto the next one. The edges are cut off before
//! the call and put back afterwards.

use crate::config::Language;
use crate::error::{ChunkError, TranslateError};
use crate::retry::RetryPolicy;
use crate::translator::Translator;
use std::time::Duration;
use tokio::time::timeout;
use tracing::debug;

/// Translate one chunk.
///
/// Whitespace-only chunks are returned unchanged without calling the
/// translator. On failure the error of the last attempt is returned with the
/// number of attempts made.
pub async fn translate_chunk(
    translator: &dyn Translator,
    text: &str,
    source: Language,
    target: Language,
    policy: &RetryPolicy,
    call_timeout: Option<Duration>,
) -> Result<String, ChunkError> {
    let (lead, core, trail) = split_edges(text);
    if core.is_empty() {
        return Ok(text.to_string());
    }

    let translated = policy
        .run(|attempt| {
            debug!(
                "{} {}→{}: attempt {} ({} chars)",
                translator.name(),
                source,
                target,
                attempt,
                core.chars().count()
            );
            call_once(translator, core, source, target, call_timeout)
        })
        .await
        .map_err(|e| ChunkError {
            attempts: e.attempts,
            source: e.last,
        })?;

    Ok(format!("{lead}{}{trail}", translated.trim()))
}

async fn call_once(
    translator: &dyn Translator,
    text: &str,
    source: Language,
    target: Language,
    call_timeout: Option<Duration>,
) -> Result<String, TranslateError> {
    let result = match call_timeout {
        Some(limit) => timeout(limit, translator.translate(text, source, target))
            .await
            .map_err(|_| TranslateError::Timeout {
                secs: limit.as_secs(),
            })?,
        None => translator.translate(text, source, target).await,
    }?;

    if result.trim().is_empty() {
        return Err(TranslateError::Transient(
            "translator returned empty text for non-empty input".into(),
        ));
    }
    Ok(result)
}

/// `(leading whitespace, core, trailing whitespace)`; `core` is empty for
/// whitespace-only input.
fn split_edges(text: &str) -> (&str, &str, &str) {
    let start = text.len() - text.trim_start().len();
    let core = text[start..].trim_end();
    let end = start + core.len();
    (&text[..start], core, &text[end..])
}
