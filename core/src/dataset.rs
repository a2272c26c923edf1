//! Dataset location and integrity checks

use crate::error::{QuranSearchError, Result};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};

pub const DATASET_FILE_NAME: &str = "quran.json";
const APP_DIR_NAME: &str = "quran-search";

/// Resolve where the dataset lives when no explicit path is configured.
///
/// Checks the working directory's `data/` (and the two parents, for runs from
/// a crate directory), then the directory next to the executable, then the
/// platform data directory. Falls back to `data/quran.json`.
pub fn default_dataset_path() -> PathBuf {
    let local_candidates = [
        PathBuf::from("data"),
        PathBuf::from("../data"),
        PathBuf::from("../../data"),
    ];
    for dir in &local_candidates {
        let candidate = dir.join(DATASET_FILE_NAME);
        if candidate.exists() {
            return candidate.canonicalize().unwrap_or(candidate);
        }
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            let candidate = exe_dir.join("data").join(DATASET_FILE_NAME);
            if candidate.exists() {
                return candidate;
            }
        }
    }

    if let Some(data_dir) = dirs::data_dir() {
        let candidate = data_dir.join(APP_DIR_NAME).join(DATASET_FILE_NAME);
        if candidate.exists() {
            return candidate;
        }
    }

    PathBuf::from("data").join(DATASET_FILE_NAME)
}

/// Hex SHA-256 of the file at `path`.
pub fn file_sha256(path: &Path) -> Result<String> {
    let mut file = fs::File::open(path).map_err(|e| {
        QuranSearchError::CorpusLoad(format!("failed to open {}: {}", path.display(), e))
    })?;
    let mut hasher = Sha256::new();
    std::io::copy(&mut file, &mut hasher)?;
    Ok(hex::encode(hasher.finalize()))
}

/// Compare the dataset digest against `expected_hash` (optionally `sha256:`-prefixed).
pub fn verify_file_hash(path: &Path, expected_hash: &str) -> Result<()> {
    let expected = expected_hash
        .trim()
        .strip_prefix("sha256:")
        .unwrap_or(expected_hash.trim())
        .to_ascii_lowercase();
    let actual = file_sha256(path)?;

    if actual != expected {
        tracing::error!(path = %path.display(), %expected, %actual, "dataset checksum mismatch");
        return Err(QuranSearchError::ChecksumMismatch { expected, actual });
    }
    Ok(())
}
