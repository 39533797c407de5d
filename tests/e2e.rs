//! End-to-end tests against live translation services.
//!
//! These tests translate the Markdown files in `./test_cases/` through real
//! APIs. They are gated behind the `E2E_ENABLED` environment variable so they
//! do not run in CI unless explicitly requested.
//!
//! Run with:
//!   E2E_ENABLED=1 cargo test --test e2e -- --nocapture
//!
//! The LLM test additionally needs `OPENAI_API_KEY` (or
//! `EDGEQUAKE_LLM_PROVIDER` + `EDGEQUAKE_MODEL`).

use md_backtranslate::{
    augment_document, augment_to_dir, AugmentConfig, AugmentationOutput,
};
use std::path::PathBuf;

// ── Test helpers ─────────────────────────────────────────────────────────────

fn test_cases_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("test_cases")
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("md_backtranslate=info")),
        )
        .with_test_writer()
        .try_init();
}

fn output_dir() -> PathBuf {
    let d = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("test_cases/output");
    std::fs::create_dir_all(&d).ok();
    d
}

/// Skip this test if E2E_ENABLED is not set *or* no file at `path`.
macro_rules! e2e_skip_unless_ready {
    ($path:expr) => {{
        if std::env::var("E2E_ENABLED").is_err() {
            println!("SKIP — set E2E_ENABLED=1 to run e2e tests");
            return;
        }
        let p: PathBuf = $path;
        if !p.exists() {
            println!("SKIP — test file not found: {}", p.display());
            return;
        }
        init_tracing();
        p
    }};
}

/// Structural checks every variant must pass.
fn assert_structure_preserved(output: &AugmentationOutput) {
    let original = output.set.original();
    let count = |text: &str, prefix: &str| text.lines().filter(|l| l.starts_with(prefix)).count();

    for variant in output.set.iter().skip(1) {
        let text = &variant.text;
        let name = &variant.name;
        assert!(!text.trim().is_empty(), "[{name}] variant is empty");

        assert_eq!(count(text, "# "), count(original, "# "), "[{name}] H1 count");
        assert_eq!(count(text, "## "), count(original, "## "), "[{name}] H2 count");
        assert_eq!(count(text, "- "), count(original, "- "), "[{name}] bullet count");

        assert!(text.contains("**"), "[{name}] bold lost");
        assert!(text.contains('`'), "[{name}] inline code lost");
        assert!(
            text.contains("](https://example.com/changelog)"),
            "[{name}] link target lost"
        );

        for tag in ["[PARA]", "[H1]", "[/B]", "[UL]", "[/LINK]"] {
            assert!(!text.contains(tag), "[{name}] leftover pseudo-tag {tag}");
        }
    }
}

fn print_failures(output: &AugmentationOutput) {
    for f in &output.failures {
        println!("[{}] FAILED: {}", f.language, f.error);
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────

/// Google Translate (Cloud API if GOOGLE_TRANSLATE_API_KEY is set).
#[tokio::test]
async fn test_google_round_trip() {
    let path = e2e_skip_unless_ready!(test_cases_dir().join("relatorio_pt.md"));

    let config = AugmentConfig::builder()
        .provider_name("google")
        .languages(["es", "it"])
        .build()
        .expect("valid config");

    let output = augment_document(&path, &config)
        .await
        .expect("augmentation should run");
    print_failures(&output);

    assert!(output.is_complete(), "every language should succeed");
    assert_eq!(output.set.len(), 3);
    assert_structure_preserved(&output);

    for variant in &output.set {
        println!("--- {} ---\n{}\n", variant.name, variant.text);
    }
}

/// Small chunks force many requests and cuts inside the document.
#[tokio::test]
async fn test_google_small_chunks() {
    let path = e2e_skip_unless_ready!(test_cases_dir().join("relatorio_pt.md"));

    let config = AugmentConfig::builder()
        .provider_name("google")
        .languages(["es"])
        .chunk_size(120)
        .build()
        .expect("valid config");

    let output = augment_document(&path, &config)
        .await
        .expect("augmentation should run");
    print_failures(&output);

    assert!(output.is_complete());
    assert_structure_preserved(&output);
}

/// Full run to disk, kept for human inspection.
#[tokio::test]
async fn test_google_to_dir() {
    let path = e2e_skip_unless_ready!(test_cases_dir().join("relatorio_pt.md"));

    let config = AugmentConfig::builder()
        .provider_name("google")
        .build()
        .expect("valid config");

    let (dir, manifest) = augment_to_dir(&path, output_dir(), &config)
        .await
        .expect("augmentation should run");

    assert!(manifest.file_count >= 1);
    assert!(dir.join("metadata.json").is_file());
    println!("Saved {} file(s) to {}", manifest.file_count, dir.display());
}

/// LLM-backed translation.
#[tokio::test]
async fn test_llm_round_trip() {
    let path = e2e_skip_unless_ready!(test_cases_dir().join("relatorio_pt.md"));
    if std::env::var("OPENAI_API_KEY").is_err() && std::env::var("EDGEQUAKE_LLM_PROVIDER").is_err() {
        println!("SKIP — no LLM provider configured");
        return;
    }

    let config = AugmentConfig::builder()
        .provider_name("llm")
        .languages(["en"])
        .pacing_ms(0)
        .build()
        .expect("valid config");

    let output = augment_document(&path, &config)
        .await
        .expect("augmentation should run");
    print_failures(&output);

    assert!(output.is_complete());
    assert_structure_preserved(&output);
}
