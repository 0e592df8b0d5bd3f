//! Formula metadata from the Homebrew JSON API and a name index over it.
//!
//! [`FormulaIndex`] loads the `formula.json` array published at
//! `https://formulae.brew.sh/api/formula.json` and implements
//! [`Resolver`], so any formula in it can be expanded with
//! [`expand`](crate::expand::expand).
//!
//! # Examples
//!
//! ```
//! use brewkit::expand::expand;
//! use brewkit::formula::FormulaIndex;
//!
//! # fn main() -> brewkit::Result<()> {
//! let index = FormulaIndex::from_json_str(r#"[
//!     {"name": "wget", "versions": {"stable": "1.24.5"},
//!      "dependencies": ["openssl@3"], "build_dependencies": ["pkgconf"]},
//!     {"name": "openssl@3", "versions": {"stable": "3.3.1"},
//!      "dependencies": ["ca-certificates"]},
//!     {"name": "ca-certificates", "versions": {"stable": "2024-07-02"}},
//!     {"name": "pkgconf", "versions": {"stable": "2.2.0"}}
//! ]"#)?;
//!
//! let wget = index.get("wget").unwrap();
//! let order: Vec<_> = expand(wget, &index)?
//!     .iter()
//!     .map(|dep| dep.name().to_string())
//!     .collect();
//! assert_eq!(order, ["ca-certificates", "openssl@3", "pkgconf"]);
//! # Ok(())
//! # }
//! ```

use crate::dependency::{Dependencies, Dependency, Tag};
use crate::error::{BrewError, Result};
use crate::expand::{Action, Dependent, Resolver, expand_with};
use crate::options::BuildOptions;
use crate::version::{PkgVersion, Version};
use moka::sync::Cache;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, OnceLock};
use tracing::{debug, trace};

/// Resolved nodes kept per index (name + requested options).
const RESOLVE_CACHE_CAPACITY: u64 = 2000;

/// Minimum Jaro-Winkler similarity for a "did you mean" suggestion.
const SUGGESTION_THRESHOLD: f64 = 0.85;

/// Homebrew formula metadata from the JSON API
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Formula {
    pub name: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub desc: Option<String>,
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default)]
    pub oldnames: Vec<String>,
    #[serde(default)]
    pub versions: Versions,
    #[serde(default)]
    pub revision: u32,
    #[serde(default)]
    pub urls: Urls,
    #[serde(default)]
    pub dependencies: Vec<String>,
    #[serde(default)]
    pub build_dependencies: Vec<String>,
    #[serde(default)]
    pub test_dependencies: Vec<String>,
    #[serde(default)]
    pub recommended_dependencies: Vec<String>,
    #[serde(default)]
    pub optional_dependencies: Vec<String>,
    #[serde(default)]
    pub options: Vec<FormulaOption>,
    #[serde(skip)]
    deps: OnceLock<Dependencies>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Versions {
    #[serde(default)]
    pub stable: Option<String>,
    #[serde(default)]
    pub head: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Urls {
    #[serde(default)]
    pub stable: Option<SourceUrl>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceUrl {
    pub url: String,
    #[serde(default)]
    pub tag: Option<String>,
}

/// A build option the formula declares (`--with-foo`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormulaOption {
    pub option: String,
    #[serde(default)]
    pub description: String,
}

impl Formula {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            full_name: name.clone(),
            name,
            ..Default::default()
        }
    }

    /// Dependency edges declared by the formula, built on first use from the
    /// API lists: runtime, then build, test, recommended and optional.
    pub fn deps(&self) -> &Dependencies {
        self.deps.get_or_init(|| {
            let tagged: [(&[String], Option<Tag>); 5] = [
                (&self.dependencies, None),
                (&self.build_dependencies, Some(Tag::Build)),
                (&self.test_dependencies, Some(Tag::Test)),
                (&self.recommended_dependencies, Some(Tag::Recommended)),
                (&self.optional_dependencies, Some(Tag::Optional)),
            ];

            tagged
                .into_iter()
                .flat_map(|(names, tag)| {
                    names
                        .iter()
                        .map(move |name| Dependency::with_tags(name.as_str(), tag.clone()))
                })
                .collect()
        })
    }

    /// The stable version, detected from the stable URL when the API omits it.
    pub fn version(&self) -> Version {
        match (&self.versions.stable, &self.urls.stable) {
            (Some(stable), _) => Version::parse(stable),
            (None, Some(source)) => Version::detect(&source.url, source.tag.as_deref()),
            (None, None) => Version::NULL,
        }
    }

    /// The installed-keg form of [`Formula::version`], including the revision.
    pub fn pkg_version(&self) -> PkgVersion {
        PkgVersion::new(self.version(), self.revision)
    }

    pub fn has_head(&self) -> bool {
        self.versions.head.is_some()
    }
}

impl Dependent for Formula {
    fn name(&self) -> &str {
        &self.name
    }

    fn deps(&self) -> &[Dependency] {
        Formula::deps(self).as_slice()
    }
}

/// A formula reached through a dependency edge, carrying the options the
/// edge requested for it.
#[derive(Debug, Clone)]
pub struct FormulaNode {
    formula: Arc<Formula>,
    options: BuildOptions,
}

impl FormulaNode {
    pub fn formula(&self) -> &Formula {
        &self.formula
    }
}

impl Dependent for FormulaNode {
    fn name(&self) -> &str {
        &self.formula.name
    }

    fn deps(&self) -> &[Dependency] {
        Formula::deps(&self.formula).as_slice()
    }

    fn build_options(&self) -> BuildOptions {
        self.options.clone()
    }
}

/// All known formulae, addressable by name, full name, alias or old name.
#[derive(Debug)]
pub struct FormulaIndex {
    formulae: Vec<Arc<Formula>>,
    by_name: HashMap<String, usize>,
    cache: Cache<String, Arc<FormulaNode>>,
}

impl FormulaIndex {
    pub fn new(formulae: Vec<Formula>) -> Self {
        let mut formulae: Vec<Arc<Formula>> = formulae.into_iter().map(Arc::new).collect();
        formulae.sort_by(|a, b| a.name.cmp(&b.name));

        let mut by_name = HashMap::new();
        // Canonical names win over aliases and old names.
        for (i, formula) in formulae.iter().enumerate() {
            for alias in formula.aliases.iter().chain(&formula.oldnames) {
                by_name.insert(alias.clone(), i);
            }
        }
        for (i, formula) in formulae.iter().enumerate() {
            if !formula.full_name.is_empty() {
                by_name.insert(formula.full_name.clone(), i);
            }
            by_name.insert(formula.name.clone(), i);
        }

        Self {
            formulae,
            by_name,
            cache: Cache::new(RESOLVE_CACHE_CAPACITY),
        }
    }

    /// Parse a JSON array of formulae.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let formulae: Vec<Formula> = serde_json::from_str(json)?;
        Ok(Self::new(formulae))
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!(path = %path.display(), "loading formula index");
        let json = std::fs::read_to_string(path)?;
        let index = Self::from_json_str(&json)?;
        debug!(count = index.len(), "formula index loaded");
        Ok(index)
    }

    pub fn get(&self, name: &str) -> Option<&Formula> {
        self.by_name.get(name).map(|&i| self.formulae[i].as_ref())
    }

    /// Like [`FormulaIndex::get`], but a miss is a `FormulaUnavailable`
    /// error with a spelling suggestion.
    pub fn lookup(&self, name: &str, dependent: Option<&str>) -> Result<&Arc<Formula>> {
        match self.by_name.get(name) {
            Some(&i) => Ok(&self.formulae[i]),
            None => Err(BrewError::FormulaUnavailable {
                name: name.to_string(),
                dependent: dependent.map(str::to_string),
                suggestion: self.suggest(name),
            }),
        }
    }

    /// The closest known formula name, if any is close enough.
    pub fn suggest(&self, name: &str) -> Option<String> {
        self.formulae
            .iter()
            .map(|f| (strsim::jaro_winkler(name, &f.name), &f.name))
            .filter(|(score, _)| *score > SUGGESTION_THRESHOLD)
            .max_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(_, name)| name.clone())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Formula> {
        self.formulae.iter().map(Arc::as_ref)
    }

    pub fn len(&self) -> usize {
        self.formulae.len()
    }

    pub fn is_empty(&self) -> bool {
        self.formulae.is_empty()
    }

    /// Names of every formula whose expansion includes `name`, sorted.
    ///
    /// Formulae whose own dependencies cannot be resolved are left out.
    pub fn uses<P>(&self, name: &str, policy: P) -> Result<Vec<String>>
    where
        P: Fn(&dyn Dependent, &Dependency) -> Action + Sync,
    {
        let target = self.lookup(name, None)?.name.clone();

        let found = self
            .formulae
            .par_iter()
            .filter(|formula| formula.name != target)
            .map(|formula| match expand_with(&**formula, self, &policy) {
                Ok(deps) => Ok(deps
                    .iter()
                    .any(|dep| dep.name() == target)
                    .then(|| formula.name.clone())),
                Err(e) if e.is_unavailable() => {
                    debug!(formula = %formula.name, error = %e, "skipping");
                    Ok(None)
                }
                Err(e) => Err(e),
            })
            .collect::<Result<Vec<Option<String>>>>()?;

        Ok(found.into_iter().flatten().collect())
    }
}

impl Resolver for FormulaIndex {
    type Node = Arc<FormulaNode>;

    fn resolve(&self, dep: &Dependency, dependent: &str) -> Result<Self::Node> {
        let options = BuildOptions::from_tags(dep);
        let key = format!("{} {}", dep.name(), options);

        if let Some(node) = self.cache.get(&key) {
            trace!(dep = dep.name(), "resolve cache hit");
            return Ok(node);
        }

        let formula = self.lookup(dep.name(), Some(dependent))?;
        let node = Arc::new(FormulaNode {
            formula: Arc::clone(formula),
            options,
        });
        self.cache.insert(key, Arc::clone(&node));
        Ok(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expand::{default_action, expand};

    const FIXTURE: &str = r#"[
        {
            "name": "curl",
            "full_name": "curl",
            "aliases": ["curl-openssl"],
            "versions": {"stable": "8.9.1", "head": "HEAD"},
            "revision": 1,
            "urls": {"stable": {"url": "https://curl.se/download/curl-8.9.1.tar.bz2"}},
            "dependencies": ["openssl@3", "libssh2"],
            "build_dependencies": ["pkgconf"],
            "optional_dependencies": ["rtmpdump"],
            "options": [{"option": "--with-rtmpdump", "description": "RTMP support"}]
        },
        {"name": "openssl@3", "full_name": "openssl@3", "versions": {"stable": "3.3.1"},
         "oldnames": ["openssl"], "dependencies": ["ca-certificates"]},
        {"name": "libssh2", "versions": {"stable": "1.11.0"}, "dependencies": ["openssl@3"]},
        {"name": "ca-certificates", "versions": {"stable": "2024-07-02"}},
        {"name": "pkgconf", "versions": {"stable": "2.2.0"}},
        {"name": "rtmpdump", "versions": {"stable": "2.4"}, "dependencies": ["openssl"]},
        {"name": "nover", "urls": {"stable": {"url": "https://example.com/nover-0.9.2.tar.gz"}}}
    ]"#;

    fn index() -> FormulaIndex {
        FormulaIndex::from_json_str(FIXTURE).unwrap()
    }

    fn names(deps: &[Dependency]) -> Vec<&str> {
        deps.iter().map(|d| d.name()).collect()
    }

    #[test]
    fn test_deps_carry_api_tags() {
        let index = index();
        let curl = index.get("curl").unwrap();
        let deps = curl.deps();
        assert_eq!(
            names(deps.as_slice()),
            vec!["openssl@3", "libssh2", "pkgconf", "rtmpdump"]
        );
        assert!(deps.get("openssl@3").unwrap().is_required());
        assert!(deps.get("pkgconf").unwrap().is_build());
        assert!(deps.get("rtmpdump").unwrap().is_optional());
    }

    #[test]
    fn test_versions() {
        let index = index();
        let curl = index.get("curl").unwrap();
        assert_eq!(curl.version(), Version::parse("8.9.1"));
        assert_eq!(curl.pkg_version().to_string(), "8.9.1_1");
        assert!(curl.has_head());

        let nover = index.get("nover").unwrap();
        assert_eq!(nover.version(), "0.9.2");
        assert!(nover.version().is_detected());

        assert!(Formula::new("bare").version().is_null());
    }

    #[test]
    fn test_lookup_by_alias_and_oldname() {
        let index = index();
        assert_eq!(index.get("curl-openssl").unwrap().name, "curl");
        assert_eq!(index.get("openssl").unwrap().name, "openssl@3");
        assert_eq!(index.len(), 7);
    }

    #[test]
    fn test_expand_default_filter() {
        let index = index();
        let curl = index.get("curl").unwrap();
        let result = expand(curl, &index).unwrap();
        assert_eq!(
            names(&result),
            vec!["ca-certificates", "openssl@3", "libssh2", "pkgconf"]
        );
    }

    #[test]
    fn test_old_name_resolves_to_canonical() {
        let index = index();
        let rtmp = index.get("rtmpdump").unwrap();
        let result = expand(rtmp, &index).unwrap();
        assert_eq!(names(&result), vec!["ca-certificates", "openssl@3"]);
    }

    #[test]
    fn test_unavailable_suggests_close_name() {
        let index = index();
        let err = index.lookup("libsh2", Some("curl")).unwrap_err();
        assert_eq!(
            err.to_string(),
            "No available formula with the name \"libsh2\" (dependency of curl). Did you mean libssh2?"
        );
        assert!(index.suggest("zzzzzz").is_none());
    }

    #[test]
    fn test_resolve_is_cached() {
        let index = index();
        let dep = Dependency::new("libssh2");
        let a = index.resolve(&dep, "curl").unwrap();
        let b = index.resolve(&dep, "curl").unwrap();
        assert!(Arc::ptr_eq(&a, &b));

        let with_opt = Dependency::with_tags("libssh2", ["with-libressl"]);
        let c = index.resolve(&with_opt, "curl").unwrap();
        assert!(!Arc::ptr_eq(&a, &c));
        assert!(c.build_options().contains("with-libressl"));
    }

    #[test]
    fn test_uses() {
        let index = index();
        let users = index.uses("openssl@3", default_action).unwrap();
        assert_eq!(users, vec!["curl", "libssh2", "rtmpdump"]);

        let users = index.uses("pkgconf", |_, dep| {
            if dep.is_build() { Action::Prune } else { Action::Continue }
        });
        assert!(users.unwrap().is_empty());

        assert!(index.uses("nope", default_action).unwrap_err().is_unavailable());
    }
}
