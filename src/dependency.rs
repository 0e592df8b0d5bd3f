//! Dependency edges and their tags.
//!
//! A [`Dependency`] is a named edge from a formula to something it needs,
//! annotated with [`Tag`]s:
//!
//! - **necessity**: required (no tag), `recommended`, or `optional`
//! - **temporality**: `build` (build-time only) or `run`
//! - **option tags**: build options to pass down to the dependency
//!   (`depends_on "foo" => "with-bar"`)
//!
//! Two edges are equal when their names and tag sets are equal. Option names
//! and environment callbacks are provenance; they are combined by
//! [`merge_repeats`] but never compared.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

/// Environment variables handed to a dependency's environment callback.
pub type BuildEnv = BTreeMap<String, String>;

/// Callback that adjusts the build environment when a dependency is used.
pub type EnvProc = Arc<dyn Fn(&mut BuildEnv) + Send + Sync>;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Tag {
    Build,
    Run,
    Optional,
    Recommended,
    Test,
    /// Any other tag is a build option for the dependency.
    Option(String),
}

impl Tag {
    pub fn is_option(&self) -> bool {
        matches!(self, Tag::Option(_))
    }
}

impl From<&str> for Tag {
    fn from(s: &str) -> Self {
        let s = s.trim().trim_start_matches(':');
        match s {
            "build" => Tag::Build,
            "run" => Tag::Run,
            "optional" => Tag::Optional,
            "recommended" => Tag::Recommended,
            "test" => Tag::Test,
            other => Tag::Option(other.to_string()),
        }
    }
}

impl From<String> for Tag {
    fn from(s: String) -> Self {
        Tag::from(s.as_str())
    }
}

impl From<Tag> for String {
    fn from(tag: Tag) -> Self {
        tag.to_string()
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tag::Build => f.write_str("build"),
            Tag::Run => f.write_str("run"),
            Tag::Optional => f.write_str("optional"),
            Tag::Recommended => f.write_str("recommended"),
            Tag::Test => f.write_str("test"),
            Tag::Option(name) => f.write_str(name),
        }
    }
}

/// A named dependency edge.
#[derive(Clone)]
pub struct Dependency {
    name: String,
    tags: BTreeSet<Tag>,
    env_proc: Option<EnvProc>,
    option_names: Vec<String>,
}

impl Dependency {
    /// A required, runtime dependency with no tags.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_tags(name, std::iter::empty::<Tag>())
    }

    pub fn with_tags<I, T>(name: impl Into<String>, tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Tag>,
    {
        let name = name.into();
        Self {
            option_names: vec![name.clone()],
            name,
            tags: tags.into_iter().map(Into::into).collect(),
            env_proc: None,
        }
    }

    pub fn env_proc(mut self, env_proc: impl Fn(&mut BuildEnv) + Send + Sync + 'static) -> Self {
        self.env_proc = Some(Arc::new(env_proc));
        self
    }

    /// Replace the option spellings that request this edge (`--with-<name>`).
    pub fn option_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.option_names = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The same edge pointing at `name`, e.g. after an alias was resolved.
    pub fn renamed(&self, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..self.clone()
        }
    }

    pub fn tags(&self) -> &BTreeSet<Tag> {
        &self.tags
    }

    pub fn get_option_names(&self) -> &[String] {
        &self.option_names
    }

    pub fn has_env_proc(&self) -> bool {
        self.env_proc.is_some()
    }

    pub fn is_build(&self) -> bool {
        self.tags.contains(&Tag::Build)
    }

    pub fn is_run(&self) -> bool {
        self.tags.contains(&Tag::Run)
    }

    pub fn is_optional(&self) -> bool {
        self.tags.contains(&Tag::Optional)
    }

    pub fn is_recommended(&self) -> bool {
        self.tags.contains(&Tag::Recommended)
    }

    pub fn is_test(&self) -> bool {
        self.tags.contains(&Tag::Test)
    }

    /// Required means no necessity tag; temporality does not matter.
    pub fn is_required(&self) -> bool {
        !self.is_optional() && !self.is_recommended()
    }

    /// Tags that are build options rather than reserved classifications.
    pub fn option_tags(&self) -> impl Iterator<Item = &str> {
        self.tags.iter().filter_map(|tag| match tag {
            Tag::Option(name) => Some(name.as_str()),
            _ => None,
        })
    }

    /// Run the environment callback, if any.
    pub fn modify_build_environment(&self, env: &mut BuildEnv) {
        if let Some(env_proc) = &self.env_proc {
            env_proc(env);
        }
    }
}

impl PartialEq for Dependency {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.tags == other.tags
    }
}

impl Eq for Dependency {}

impl std::hash::Hash for Dependency {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.tags.hash(state);
    }
}

impl fmt::Debug for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dependency")
            .field("name", &self.name)
            .field("tags", &self.tags)
            .field("option_names", &self.option_names)
            .field("env_proc", &self.env_proc.is_some())
            .finish()
    }
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Collapse edges with the same name into one, keeping first-seen order.
///
/// - necessity: required beats recommended beats optional
/// - temporality: `build` only if every duplicate is build, `run` only if
///   every duplicate is run, otherwise neither
/// - option tags, `test`, and option names are unioned
/// - the first environment callback found is kept
pub fn merge_repeats(all: &[Dependency]) -> Vec<Dependency> {
    let mut order: Vec<&str> = Vec::new();
    let mut grouped: BTreeMap<&str, Vec<&Dependency>> = BTreeMap::new();

    for dep in all {
        let group = grouped.entry(dep.name()).or_default();
        if group.is_empty() {
            order.push(dep.name());
        }
        group.push(dep);
    }

    order
        .into_iter()
        .filter_map(|name| grouped.get(name))
        .map(|deps| merge_group(deps))
        .collect()
}

fn merge_group(deps: &[&Dependency]) -> Dependency {
    let first = deps[0];
    if deps.len() == 1 {
        return first.clone();
    }

    let mut tags = BTreeSet::new();

    if deps.iter().any(|d| d.is_required()) {
        // required carries no necessity tag
    } else if deps.iter().any(|d| d.is_recommended()) {
        tags.insert(Tag::Recommended);
    } else {
        tags.insert(Tag::Optional);
    }

    // Mixed temporality leaves neither flag set.
    if deps.iter().all(|d| d.is_build()) {
        tags.insert(Tag::Build);
    } else if deps.iter().all(|d| d.is_run()) {
        tags.insert(Tag::Run);
    }

    if deps.iter().any(|d| d.is_test()) {
        tags.insert(Tag::Test);
    }
    tags.extend(
        deps.iter()
            .flat_map(|d| d.tags.iter().filter(|t| t.is_option()).cloned()),
    );

    let mut option_names: Vec<String> = Vec::new();
    for name in deps.iter().flat_map(|d| d.option_names.iter()) {
        if !option_names.contains(name) {
            option_names.push(name.clone());
        }
    }

    Dependency {
        name: first.name.clone(),
        tags,
        env_proc: deps.iter().find_map(|d| d.env_proc.clone()),
        option_names,
    }
}

/// An ordered collection of dependencies that ignores exact duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dependencies {
    deps: Vec<Dependency>,
}

impl Dependencies {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an edge unless an equal one (same name and tags) is present.
    /// Returns whether the edge was added.
    pub fn push(&mut self, dep: Dependency) -> bool {
        if self.deps.contains(&dep) {
            return false;
        }
        self.deps.push(dep);
        true
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Dependency> {
        self.deps.iter()
    }

    pub fn as_slice(&self) -> &[Dependency] {
        &self.deps
    }

    pub fn len(&self) -> usize {
        self.deps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.deps.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Dependency> {
        self.deps.iter().find(|d| d.name() == name)
    }

    fn filtered(&self, keep: impl Fn(&Dependency) -> bool) -> Vec<&Dependency> {
        self.deps.iter().filter(|d| keep(d)).collect()
    }

    pub fn required(&self) -> Vec<&Dependency> {
        self.filtered(Dependency::is_required)
    }

    pub fn recommended(&self) -> Vec<&Dependency> {
        self.filtered(Dependency::is_recommended)
    }

    pub fn optional(&self) -> Vec<&Dependency> {
        self.filtered(Dependency::is_optional)
    }

    pub fn build(&self) -> Vec<&Dependency> {
        self.filtered(Dependency::is_build)
    }

    /// Everything installed by default: required, recommended and build
    /// dependencies.
    pub fn default_deps(&self) -> Vec<&Dependency> {
        self.filtered(|d| !d.is_optional())
    }

    /// Collapse same-name edges; see [`merge_repeats`].
    pub fn merge_repeats(&self) -> Dependencies {
        Dependencies {
            deps: merge_repeats(&self.deps),
        }
    }
}

impl FromIterator<Dependency> for Dependencies {
    fn from_iter<I: IntoIterator<Item = Dependency>>(iter: I) -> Self {
        let mut deps = Dependencies::new();
        for dep in iter {
            deps.push(dep);
        }
        deps
    }
}

impl<'a> IntoIterator for &'a Dependencies {
    type Item = &'a Dependency;
    type IntoIter = std::slice::Iter<'a, Dependency>;

    fn into_iter(self) -> Self::IntoIter {
        self.deps.iter()
    }
}

impl IntoIterator for Dependencies {
    type Item = Dependency;
    type IntoIter = std::vec::IntoIter<Dependency>;

    fn into_iter(self) -> Self::IntoIter {
        self.deps.into_iter()
    }
}
