//! # md-backtranslate
//!
//! Augment Markdown documents for retrieval-augmented generation by
//! back-translation, without losing their structure.
//!
//! ## Why this crate?
//!
//! Translating a document into another language and back yields a
//! paraphrase: same facts, different wording. Indexing those paraphrases
//! next to the original makes retrieval more robust to how users phrase
//! their questions. The catch is that translation services mangle Markdown:
//! `**bold**` loses its asterisks, `## headings` lose their hashes, link
//! targets get translated. This crate swaps every construct for a bracketed
//! pseudo-tag (`[B]…[/B]`, `[H2]…[/H2]`) that services pass through verbatim,
//! and swaps it back afterwards.
//!
//! ## Pipeline Overview
//!
//! ```text
//! Document
//!  │
//!  ├─ 1. Source     Markdown file (or PDF with the `pdf` feature)
//!  ├─ 2. Encode     Markdown → pseudo-tags
//!  ├─ 3. Segment    ≤ chunk_size chars, cut after ". " or "\n"
//!  ├─ 4. Translate  pt → es, chunk by chunk, retry with backoff
//!  ├─ 5. Segment    again, on the translated text
//!  ├─ 6. Translate  es → pt
//!  ├─ 7. Decode     pseudo-tags → Markdown, artefact cleanup
//!  └─ 8. Output     original + one variant per language (+ metadata.json)
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use md_backtranslate::{augment, AugmentConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Google Translate; set GOOGLE_TRANSLATE_API_KEY to use the Cloud API.
//!     let config = AugmentConfig::builder()
//!         .source_language("pt")
//!         .languages(["es", "it"])
//!         .build()?;
//!     let output = augment("# Relatório\n\nO sistema **falhou** ontem.", &config).await?;
//!     println!("{}", output.set.get("spanish_augmented").unwrap_or("(failed)"));
//!     for failure in &output.failures {
//!         eprintln!("{}: {}", failure.language, failure.error);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `backtranslate` binary (clap + anyhow + tracing-subscriber + indicatif) |
//! | `pdf`   | off     | Accept PDF input, converted to Markdown by `edgequake-pdf2md` |
//!
//! ## Choosing a Translator
//!
//! | Provider | Setup | Notes |
//! |----------|-------|-------|
//! | `google` (default) | none, or `GOOGLE_TRANSLATE_API_KEY` | keyless endpoint is rate limited |
//! | `openai`, `anthropic`, `gemini`, `ollama`… | provider API key | slower, follows the tag rules well |
//! | `identity` | none | no translation; checks the markup plumbing |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod augment;
pub mod config;
pub mod error;
pub mod output;
pub mod persist;
pub mod pipeline;
pub mod progress;
pub mod prompts;
pub mod retry;
pub mod translator;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use augment::{augment, augment_document, augment_sync, augment_to_dir, augment_with, resolve_translator};
pub use config::{AugmentConfig, AugmentConfigBuilder, Language, LineMerge};
pub use error::{AugmentError, ChunkError, RoundTripError, TranslateError};
pub use output::{AugmentationOutput, AugmentationSet, AugmentationStats, LanguageFailure, Variant, ORIGINAL};
pub use persist::{create_output_directory, save_variants, Manifest};
pub use pipeline::cleanup::decode;
pub use pipeline::markup::encode;
pub use pipeline::segment::segment;
pub use progress::{AugmentProgressCallback, NoopProgressCallback, ProgressCallback};
pub use retry::{Exhausted, RetryPolicy, Retryable};
pub use translator::{GoogleTranslator, IdentityTranslator, LlmTranslator, Translator};
