use crate::error::Result;
use crate::formula::FormulaIndex;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tracing::warn;

const CACHE_TTL: Duration = Duration::from_secs(24 * 60 * 60); // 24 hours

/// Get the cache directory (~/.cache/brewkit/ or equivalent)
pub fn cache_dir() -> PathBuf {
    if let Some(cache_home) = std::env::var_os("XDG_CACHE_HOME") {
        PathBuf::from(cache_home).join("brewkit")
    } else if let Some(home) = std::env::var_os("HOME") {
        PathBuf::from(home).join(".cache/brewkit")
    } else {
        PathBuf::from(".cache/brewkit")
    }
}

/// Where the formula index is read from: `explicit` if given, else the
/// cached `formulae.json`.
pub fn index_path(explicit: Option<&Path>) -> PathBuf {
    match explicit {
        Some(path) => path.to_path_buf(),
        None => cache_dir().join("formulae.json"),
    }
}

/// Check if a cached file is still fresh (less than TTL old)
pub fn is_cache_fresh(path: &Path) -> bool {
    let Ok(metadata) = std::fs::metadata(path) else {
        return false;
    };

    let Ok(modified) = metadata.modified() else {
        return false;
    };

    match SystemTime::now().duration_since(modified) {
        Ok(age) => age < CACHE_TTL,
        // Modified in the future; treat as fresh.
        Err(_) => true,
    }
}

/// Load the formula index, warning when the file is older than a day.
pub fn load_index(path: &Path) -> Result<FormulaIndex> {
    if path.exists() && !is_cache_fresh(path) {
        warn!(
            path = %path.display(),
            "formula index is more than 24 hours old; versions may be stale"
        );
    }
    FormulaIndex::load(path)
}
