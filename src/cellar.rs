//! Homebrew Cellar management - reading installed kegs

use crate::error::Result;
use crate::formula::FormulaIndex;
use crate::version::PkgVersion;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Detect the Homebrew prefix on this system
pub fn detect_prefix() -> PathBuf {
    if let Ok(prefix) = std::env::var("HOMEBREW_PREFIX") {
        return PathBuf::from(prefix);
    }

    #[cfg(target_arch = "aarch64")]
    {
        PathBuf::from("/opt/homebrew")
    }
    #[cfg(not(target_arch = "aarch64"))]
    {
        PathBuf::from("/usr/local")
    }
}

/// Get the Cellar directory path
pub fn cellar_path() -> PathBuf {
    match std::env::var_os("HOMEBREW_CELLAR") {
        Some(cellar) => PathBuf::from(cellar),
        None => detect_prefix().join("Cellar"),
    }
}

/// One installed version of a formula: `<cellar>/<name>/<pkg_version>`
#[derive(Debug, Clone, Serialize)]
pub struct Keg {
    pub name: String,
    pub pkg_version: PkgVersion,
    pub path: PathBuf,
}

impl Keg {
    pub fn is_head(&self) -> bool {
        self.pkg_version.is_head()
    }
}

/// An installed formula with a newer version in the index
#[derive(Debug, Clone, Serialize)]
pub struct OutdatedKeg {
    pub name: String,
    pub installed: PkgVersion,
    pub current: PkgVersion,
}

fn visible_dirs(path: &Path) -> Result<Vec<(String, PathBuf)>> {
    let mut dirs = Vec::new();
    for entry in fs::read_dir(path)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().to_string();
        if name.starts_with('.') || !entry.path().is_dir() {
            continue;
        }
        dirs.push((name, entry.path()));
    }
    Ok(dirs)
}

/// All kegs of `name`, newest first.
pub fn installed_kegs(cellar: &Path, name: &str) -> Result<Vec<Keg>> {
    let rack = cellar.join(name);
    if !rack.is_dir() {
        return Ok(vec![]);
    }

    let mut kegs: Vec<Keg> = visible_dirs(&rack)?
        .into_iter()
        .map(|(version, path)| Keg {
            name: name.to_string(),
            pkg_version: PkgVersion::parse(&version),
            path,
        })
        .collect();

    // [0] is always the newest keg
    kegs.sort_by(|a, b| b.pkg_version.total_cmp(&a.pkg_version));
    Ok(kegs)
}

/// Every keg in the Cellar, grouped by formula name.
pub fn list_installed(cellar: &Path) -> Result<Vec<Keg>> {
    if !cellar.is_dir() {
        debug!(cellar = %cellar.display(), "no Cellar");
        return Ok(vec![]);
    }

    let mut racks = visible_dirs(cellar)?;
    racks.sort();

    let mut kegs = Vec::new();
    for (name, _) in racks {
        kegs.extend(installed_kegs(cellar, &name)?);
    }
    Ok(kegs)
}

/// Installed formulae whose newest keg is older than the index version.
///
/// HEAD kegs are never outdated. Formulae the index does not know are
/// skipped.
pub fn outdated(cellar: &Path, index: &FormulaIndex) -> Result<Vec<OutdatedKeg>> {
    let mut result = Vec::new();
    let mut seen: Option<String> = None;

    for keg in list_installed(cellar)? {
        // Kegs arrive newest first per formula; only the first one counts.
        if seen.as_deref() == Some(keg.name.as_str()) {
            continue;
        }
        seen = Some(keg.name.clone());

        if keg.is_head() {
            debug!(formula = %keg.name, "HEAD keg, not outdated");
            continue;
        }

        let Some(formula) = index.get(&keg.name) else {
            warn!(formula = %keg.name, "installed formula not in index, skipping");
            continue;
        };

        let current = formula.pkg_version();
        if current.version().is_null() {
            debug!(formula = %keg.name, "index has no usable version");
            continue;
        }

        if keg.pkg_version < current {
            result.push(OutdatedKeg {
                name: keg.name,
                installed: keg.pkg_version,
                current,
            });
        }
    }

    Ok(result)
}
