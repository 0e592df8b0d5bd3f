//! Build options requested for a formula (`--with-foo`, `--without-bar`).

use crate::dependency::Dependency;
use serde::{Deserialize, Serialize};
use std::fmt;

/// An ordered set of option flags, stored without leading dashes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BuildOptions {
    flags: Vec<String>,
}

impl BuildOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build options passed down an edge: the option tags of `dep`
    /// (`depends_on "x" => "with-y"` hands `with-y` to `x`).
    pub fn from_tags(dep: &Dependency) -> Self {
        dep.option_tags().collect()
    }

    pub fn insert(&mut self, flag: impl AsRef<str>) -> bool {
        let flag = normalize(flag.as_ref());
        if flag.is_empty() || self.flags.iter().any(|f| f == flag) {
            return false;
        }
        self.flags.push(flag.to_string());
        true
    }

    pub fn contains(&self, flag: &str) -> bool {
        let flag = normalize(flag);
        self.flags.iter().any(|f| f == flag)
    }

    /// Whether `with-<name>` was requested.
    pub fn with(&self, name: &str) -> bool {
        self.contains(&format!("with-{}", normalize(name)))
    }

    /// Whether `without-<name>` was requested.
    pub fn without(&self, name: &str) -> bool {
        self.contains(&format!("without-{}", normalize(name)))
    }

    /// True when any of the edge's option names was requested with `with-`.
    pub fn with_dependency(&self, dep: &Dependency) -> bool {
        dep.get_option_names().iter().any(|name| self.with(name))
    }

    /// True when any of the edge's option names was rejected with `without-`.
    pub fn without_dependency(&self, dep: &Dependency) -> bool {
        dep.get_option_names().iter().any(|name| self.without(name))
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.flags.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.flags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }
}

fn normalize(flag: &str) -> &str {
    flag.trim().trim_start_matches('-')
}

impl<S: AsRef<str>> FromIterator<S> for BuildOptions {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut options = BuildOptions::new();
        for flag in iter {
            options.insert(flag);
        }
        options
    }
}

impl fmt::Display for BuildOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let flags: Vec<String> = self.flags.iter().map(|flag| format!("--{flag}")).collect();
        f.write_str(&flags.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_and_without() {
        let opts: BuildOptions = ["--with-ssl", "without-docs", "universal"].into_iter().collect();
        assert!(opts.with("ssl"));
        assert!(!opts.with("docs"));
        assert!(opts.without("docs"));
        assert!(opts.contains("universal"));
        assert!(opts.contains("--universal"));
        assert_eq!(opts.to_string(), "--with-ssl --without-docs --universal");
    }

    #[test]
    fn test_insert_is_deduplicated() {
        let mut opts = BuildOptions::new();
        assert!(opts.insert("with-x"));
        assert!(!opts.insert("--with-x"));
        assert!(!opts.insert("--"));
        assert_eq!(opts.len(), 1);
    }

    #[test]
    fn test_dependency_option_names() {
        let dep = Dependency::with_tags("libfoo", ["optional"]).option_names(["libfoo", "foo"]);
        let opts: BuildOptions = ["with-foo"].into_iter().collect();
        assert!(opts.with_dependency(&dep));
        assert!(!opts.without_dependency(&dep));

        let opts: BuildOptions = ["without-libfoo"].into_iter().collect();
        assert!(opts.without_dependency(&dep));
        assert!(!opts.with_dependency(&dep));
    }

    #[test]
    fn test_from_tags_takes_option_tags_only() {
        let dep = Dependency::with_tags("x", ["build", "with-y", "universal"]);
        let opts = BuildOptions::from_tags(&dep);
        assert_eq!(opts.iter().collect::<Vec<_>>(), vec!["universal", "with-y"]);
    }
}
