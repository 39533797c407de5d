//! Progress-callback trait for per-language and per-chunk events.
//!
//! Inject an [`Arc<dyn AugmentProgressCallback>`] via
//! [`crate::config::AugmentConfigBuilder::progress_callback`] to follow a run
//! as it happens. The library never prints anything itself; the CLI turns
//! these events into a progress bar.
//!
//! # Example
//!
//! ```rust
//! use md_backtranslate::{AugmentConfig, AugmentProgressCallback, Language};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct ChunkCounter {
//!     chunks: AtomicUsize,
//! }
//!
//! impl AugmentProgressCallback for ChunkCounter {
//!     fn on_chunk_complete(&self, _from: Language, _to: Language, _chunk: usize, _chunks: usize) {
//!         self.chunks.fetch_add(1, Ordering::SeqCst);
//!     }
//! }
//!
//! let counter = Arc::new(ChunkCounter { chunks: AtomicUsize::new(0) });
//! let config = AugmentConfig::builder()
//!     .progress_callback(counter as Arc<dyn AugmentProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use crate::config::Language;
use std::sync::Arc;

/// Called by the augmentation runner as it works through each language.
///
/// All methods have no-op defaults. With `concurrency > 1` events for
/// different languages interleave and may arrive from different threads, so
/// shared state needs `Mutex` or atomics.
pub trait AugmentProgressCallback: Send + Sync {
    /// Called once, before the first language starts.
    fn on_run_start(&self, languages: &[Language]) {
        let _ = languages;
    }

    fn on_language_start(&self, language: Language) {
        let _ = language;
    }

    /// Called before the first chunk of one direction is sent.
    ///
    /// # Arguments
    /// * `from`, `to`: direction of this pass
    /// * `chunks`: number of chunks the pass will send
    fn on_pass_start(&self, from: Language, to: Language, chunks: usize) {
        let _ = (from, to, chunks);
    }

    /// Called after each chunk is translated. `chunk` is 1-indexed.
    fn on_chunk_complete(&self, from: Language, to: Language, chunk: usize, chunks: usize) {
        let _ = (from, to, chunk, chunks);
    }

    /// Called when a variant is ready.
    ///
    /// # Arguments
    /// * `language`: the intermediate language
    /// * `chars`: character count of the decoded variant
    fn on_language_complete(&self, language: Language, chars: usize) {
        let _ = (language, chars);
    }

    /// Called when a language is abandoned; `error` is human-readable.
    fn on_language_error(&self, language: Language, error: &str) {
        let _ = (language, error);
    }

    /// Called once, after every language has been attempted.
    fn on_run_complete(&self, requested: usize, succeeded: usize) {
        let _ = (requested, succeeded);
    }
}

/// Default when no callback is configured.
pub struct NoopProgressCallback;

impl AugmentProgressCallback for NoopProgressCallback {}

/// Type stored in [`crate::config::AugmentConfig`].
pub type ProgressCallback = Arc<dyn AugmentProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        chunks: AtomicUsize,
        errors: Mutex<Vec<String>>,
        succeeded: AtomicUsize,
    }

    impl AugmentProgressCallback for Recorder {
        fn on_chunk_complete(&self, _from: Language, _to: Language, _chunk: usize, _chunks: usize) {
            self.chunks.fetch_add(1, Ordering::SeqCst);
        }

        fn on_language_error(&self, language: Language, error: &str) {
            self.errors
                .lock()
                .unwrap()
                .push(format!("{language}: {error}"));
        }

        fn on_run_complete(&self, _requested: usize, succeeded: usize) {
            self.succeeded.store(succeeded, Ordering::SeqCst);
        }
    }

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        cb.on_run_start(&[Language::SPANISH]);
        cb.on_language_start(Language::SPANISH);
        cb.on_pass_start(Language::PORTUGUESE, Language::SPANISH, 3);
        cb.on_chunk_complete(Language::PORTUGUESE, Language::SPANISH, 1, 3);
        cb.on_language_complete(Language::SPANISH, 120);
        cb.on_language_error(Language::ITALIAN, "HTTP 503");
        cb.on_run_complete(2, 1);
    }

    #[test]
    fn recorder_receives_events() {
        let rec = Arc::new(Recorder::default());
        let cb: ProgressCallback = rec.clone();

        cb.on_chunk_complete(Language::PORTUGUESE, Language::SPANISH, 1, 2);
        cb.on_chunk_complete(Language::PORTUGUESE, Language::SPANISH, 2, 2);
        cb.on_language_error(Language::ITALIAN, "timeout");
        cb.on_run_complete(2, 1);

        assert_eq!(rec.chunks.load(Ordering::SeqCst), 2);
        assert_eq!(*rec.errors.lock().unwrap(), vec!["it: timeout".to_string()]);
        assert_eq!(rec.succeeded.load(Ordering::SeqCst), 1);
    }
}
