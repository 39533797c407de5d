//! Round trip for one intermediate language.
//!
//! ```text
//! text ─▶ encode ─▶ segment ─▶ translate ×N (src→mid) ─▶ concat
//!                               │
//!      decode ◀─ concat ◀─ translate ×M (mid→src) ◀─ segment
//! ```
//!
//! The reverse pass re-segments the forward result: translation changes text
//! length, so the forward chunk boundaries mean nothing on the way back.
//! Chunks are sent strictly in order with a pacing pause between requests.
//! The first chunk that exhausts its retries abandons the language.

use crate::config::{AugmentConfig, Language};
use crate::error::RoundTripError;
use crate::pipeline::{cleanup, client, markup, segment};
use crate::progress::{AugmentProgressCallback, NoopProgressCallback};
use crate::translator::Translator;
use tokio::time::sleep;
use tracing::{debug, info};

/// Back-translate `text` through `intermediate` and return the decoded
/// Markdown variant.
pub async fn round_trip(
    translator: &dyn Translator,
    text: &str,
    intermediate: Language,
    config: &AugmentConfig,
) -> Result<String, RoundTripError> {
    let source = config.source_language;
    let encoded = markup::encode(text);

    let forward = translate_pass(translator, &encoded, source, intermediate, config).await?;
    let back = translate_pass(translator, &forward, intermediate, source, config).await?;

    let decoded = cleanup::decode(&back, config.line_merge);
    info!(
        "{}: round trip via '{}' produced {} chars",
        translator.name(),
        intermediate,
        decoded.chars().count()
    );
    Ok(decoded)
}

/// Translate `text` from `from` to `to` chunk by chunk and concatenate the
/// results in order.
pub async fn translate_pass(
    translator: &dyn Translator,
    text: &str,
    from: Language,
    to: Language,
    config: &AugmentConfig,
) -> Result<String, RoundTripError> {
    let noop = NoopProgressCallback;
    let progress: &dyn AugmentProgressCallback = match &config.progress_callback {
        Some(cb) => cb.as_ref(),
        None => &noop,
    };

    let chunks = segment::segment(text, config.chunk_size);
    let total = chunks.len();
    let policy = config.retry_policy();
    let pacing = config.pacing();

    debug!("{}→{}: {} chunk(s)", from, to, total);
    progress.on_pass_start(from, to, total);

    let mut out = String::with_capacity(text.len());
    for (i, chunk) in chunks.into_iter().enumerate() {
        if i > 0 && !pacing.is_zero() {
            sleep(pacing).await;
        }

        let translated = client::translate_chunk(
            translator,
            chunk,
            from,
            to,
            &policy,
            config.api_timeout(),
        )
        .await
        .map_err(|e| RoundTripError::ChunkFailed {
            from: from.to_string(),
            to: to.to_string(),
            chunk: i + 1,
            chunks: total,
            attempts: e.attempts,
            detail: e.source.to_string(),
        })?;

        debug!(
            "{}→{}: chunk {}/{} ({} → {} chars)",
            from,
            to,
            i + 1,
            total,
            chunk.chars().count(),
            translated.chars().count()
        );
        out.push_str(&translated);
        progress.on_chunk_complete(from, to, i + 1, total);
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TranslateError;
    use crate::translator::IdentityTranslator;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;
    use tokio::time::Instant;

    /// Echoes its input and records `(target, text)` for every request.
    #[derive(Default)]
    struct Recording {
        requests: Mutex<Vec<(String, String)>>,
    }

    #[async_trait]
    impl Translator for Recording {
        async fn translate(
            &self,
            text: &str,
            _source: Language,
            target: Language,
        ) -> Result<String, TranslateError> {
            self.requests
                .lock()
                .unwrap()
                .push((target.to_string(), text.to_string()));
            Ok(text.to_string())
        }

        fn name(&self) -> &str {
            "recording"
        }
    }

    struct FailsOnChunk {
        calls: AtomicUsize,
        fail_at: usize,
    }

    #[async_trait]
    impl Translator for FailsOnChunk {
        async fn translate(&self, text: &str, _: Language, _: Language) -> Result<String, TranslateError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if n + 1 == self.fail_at {
                Err(TranslateError::Permanent("unsupported".into()))
            } else {
                Ok(text.to_string())
            }
        }

        fn name(&self) -> &str {
            "fails"
        }
    }

    fn config(chunk_size: usize) -> AugmentConfig {
        AugmentConfig::builder()
            .chunk_size(chunk_size)
            .pacing_ms(0)
            .api_timeout_secs(0)
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn identity_round_trip_restores_markdown() {
        let text = "# Title\n\nSome **bold** text with `code`.\n\n- one\n- two\n\n1. first\n2. second\n\nSee [docs](https://example.com).";
        let out = round_trip(&IdentityTranslator, text, Language::SPANISH, &config(4000))
            .await
            .unwrap();
        assert_eq!(out, text);
    }

    #[tokio::test]
    async fn plain_text_is_unchanged() {
        let text = "Uma frase simples. Outra frase.";
        let out = round_trip(&IdentityTranslator, text, Language::ITALIAN, &config(12))
            .await
            .unwrap();
        assert_eq!(out, text);
    }

    #[tokio::test]
    async fn both_directions_are_sent_in_order() {
        let t = Recording::default();
        let text = "Primeira frase. Segunda frase. Terceira frase.";
        round_trip(&t, text, Language::SPANISH, &config(20)).await.unwrap();

        let requests = t.requests.lock().unwrap();
        let forward: Vec<&str> = requests
            .iter()
            .filter(|(to, _)| to == "es")
            .map(|(_, s)| s.as_str())
            .collect();
        let back: Vec<&str> = requests
            .iter()
            .filter(|(to, _)| to == "pt")
            .map(|(_, s)| s.as_str())
            .collect();
        assert_eq!(forward, vec!["Primeira frase.", "Segunda frase.", "Terceira frase."]);
        assert_eq!(forward, back);
        // All forward requests come before the first reverse request.
        assert!(requests[..3].iter().all(|(to, _)| to == "es"));
    }

    #[tokio::test]
    async fn failing_chunk_reports_position() {
        let t = FailsOnChunk {
            calls: AtomicUsize::new(0),
            fail_at: 2,
        };
        let err = round_trip(&t, "Um. Do. Tr.", Language::SPANISH, &config(4))
            .await
            .unwrap_err();
        let RoundTripError::ChunkFailed {
            from,
            to,
            chunk,
            chunks,
            attempts,
            ..
        } = err;
        assert_eq!((from.as_str(), to.as_str()), ("pt", "es"));
        assert_eq!(chunk, 2);
        assert_eq!(chunks, 3);
        assert_eq!(attempts, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn pacing_between_chunks_only() {
        let cfg = AugmentConfig::builder()
            .chunk_size(4)
            .pacing_ms(500)
            .build()
            .unwrap();
        let start = Instant::now();
        translate_pass(&IdentityTranslator, "Um. Do. Tr.", Language::PORTUGUESE, Language::SPANISH, &cfg)
            .await
            .unwrap();
        // Three chunks, two pauses.
        assert_eq!(start.elapsed(), Duration::from_millis(1000));
    }

    #[tokio::test]
    async fn empty_text_sends_nothing() {
        let t = Recording::default();
        let out = round_trip(&t, "", Language::SPANISH, &config(10)).await.unwrap();
        assert!(out.is_empty());
        assert!(t.requests.lock().unwrap().is_empty());
    }
}
