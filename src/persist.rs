//! Writing an augmentation set to disk.
//!
//! Layout of one run:
//!
//! ```text
//! <root>/augmentation_20240131_142501/
//! ├── metadata.json
//! └── markdown/
//!     ├── original.md
//!     ├── spanish_augmented.md
//!     └── italian_augmented.md
//! ```
//!
//! Every file is written to a temp file in the same directory and renamed
//! into place, so a crash never leaves a half-written variant behind.

use crate::error::AugmentError;
use crate::output::AugmentationSet;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const MANIFEST_FILE: &str = "metadata.json";
pub const MARKDOWN_DIR: &str = "markdown";

/// Contents of `metadata.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    /// RFC 3339, local time.
    pub timestamp: String,
    pub file_count: usize,
    /// Variant name → written path, in set order.
    pub files: serde_json::Map<String, serde_json::Value>,
}

impl Manifest {
    /// Path written for `variant`, if any.
    pub fn path_of(&self, variant: &str) -> Option<&str> {
        self.files.get(variant).and_then(|v| v.as_str())
    }
}

/// Create `root/augmentation_YYYYMMDD_HHMMSS/markdown/` and return the run
/// directory (the parent of `markdown/`).
///
/// Two runs started within the same second get `_2`, `_3`… suffixes.
pub fn create_output_directory(root: impl AsRef<Path>) -> Result<PathBuf, AugmentError> {
    create_output_directory_at(root.as_ref(), Local::now())
}

fn create_output_directory_at(root: &Path, now: DateTime<Local>) -> Result<PathBuf, AugmentError> {
    let base = format!("augmentation_{}", now.format("%Y%m%d_%H%M%S"));

    std::fs::create_dir_all(root).map_err(|e| AugmentError::OutputWriteFailed {
        path: root.to_path_buf(),
        source: e,
    })?;

    let mut n = 1;
    loop {
        let name = if n == 1 {
            base.clone()
        } else {
            format!("{base}_{n}")
        };
        let dir = root.join(name);
        match std::fs::create_dir(&dir) {
            Ok(()) => {
                let markdown = dir.join(MARKDOWN_DIR);
                std::fs::create_dir(&markdown).map_err(|e| AugmentError::OutputWriteFailed {
                    path: markdown.clone(),
                    source: e,
                })?;
                debug!("Created output directory {}", dir.display());
                return Ok(dir);
            }
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => n += 1,
            Err(e) => {
                return Err(AugmentError::OutputWriteFailed {
                    path: dir,
                    source: e,
                })
            }
        }
    }
}

/// Write one `<variant>.md` per entry of `set` under `dir/markdown/` and the
/// manifest at `dir/metadata.json`.
pub fn save_variants(set: &AugmentationSet, dir: impl AsRef<Path>) -> Result<Manifest, AugmentError> {
    let dir = dir.as_ref();
    let markdown_dir = dir.join(MARKDOWN_DIR);
    std::fs::create_dir_all(&markdown_dir).map_err(|e| AugmentError::OutputWriteFailed {
        path: markdown_dir.clone(),
        source: e,
    })?;

    let mut files = serde_json::Map::new();
    for variant in set {
        let path = markdown_dir.join(format!("{}.md", variant.name));
        write_atomic(&path, variant.text.as_bytes())?;
        files.insert(
            variant.name.clone(),
            serde_json::Value::String(path.to_string_lossy().into_owned()),
        );
    }

    let manifest = Manifest {
        timestamp: Local::now().to_rfc3339(),
        file_count: files.len(),
        files,
    };
    let json = serde_json::to_vec_pretty(&manifest)?;
    write_atomic(&dir.join(MANIFEST_FILE), &json)?;

    info!(
        "Saved {} variant(s) to {}",
        manifest.file_count,
        dir.display()
    );
    Ok(manifest)
}

fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), AugmentError> {
    let write_err = |e: std::io::Error| AugmentError::OutputWriteFailed {
        path: path.to_path_buf(),
        source: e,
    };
    let parent = path.parent().unwrap_or_else(|| Path::new("."));

    let mut tmp = tempfile::NamedTempFile::new_in(parent).map_err(write_err)?;
    tmp.write_all(bytes).map_err(write_err)?;
    tmp.flush().map_err(write_err)?;
    tmp.persist(path).map_err(|e| write_err(e.error))?;
    Ok(())
}
