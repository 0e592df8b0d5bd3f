//! Recursive dependency expansion.
//!
//! [`expand`] flattens the graph below a root into a build order: each
//! dependency's own dependencies come before it, siblings keep their declared
//! order, and repeated names are merged with [`merge_repeats`].
//!
//! A policy can steer the walk per edge by returning an [`Action`]. Without a
//! policy, [`default_action`] drops optional dependencies that were not
//! requested with `--with-<name>` and recommended dependencies that were
//! rejected with `--without-<name>`.
//!
//! Traversal state lives in the call, so independent expansions can run on
//! separate threads.
//!
//! # Examples
//!
//! ```no_run
//! use brewkit::expand::{expand_with, Action};
//! use brewkit::formula::FormulaIndex;
//!
//! # fn main() -> brewkit::Result<()> {
//! let index = FormulaIndex::load("formulae.json")?;
//! let wget = index.get("wget").expect("wget is in the index");
//! let runtime = expand_with(wget, &index, |_, dep| {
//!     if dep.is_build() { Action::Prune } else { Action::Continue }
//! })?;
//! # Ok(())
//! # }
//! ```

use crate::dependency::{Dependency, merge_repeats};
use crate::error::Result;
use crate::options::BuildOptions;
use std::ops::ControlFlow;
use std::sync::Arc;
use tracing::{debug, trace};

/// Something that declares dependencies.
pub trait Dependent {
    fn name(&self) -> &str;

    fn deps(&self) -> &[Dependency];

    /// Options this dependent was requested with.
    fn build_options(&self) -> BuildOptions {
        BuildOptions::default()
    }
}

impl<T: Dependent + ?Sized> Dependent for &T {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn deps(&self) -> &[Dependency] {
        (**self).deps()
    }

    fn build_options(&self) -> BuildOptions {
        (**self).build_options()
    }
}

impl<T: Dependent + ?Sized> Dependent for Arc<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn deps(&self) -> &[Dependency] {
        (**self).deps()
    }

    fn build_options(&self) -> BuildOptions {
        (**self).build_options()
    }
}

/// Turns a dependency edge into the node it points at.
pub trait Resolver {
    type Node: Dependent;

    /// Fails with [`BrewError::FormulaUnavailable`](crate::BrewError::FormulaUnavailable)
    /// when nothing named `dep.name()` exists.
    fn resolve(&self, dep: &Dependency, dependent: &str) -> Result<Self::Node>;
}

impl<R: Resolver + ?Sized> Resolver for &R {
    type Node = R::Node;

    fn resolve(&self, dep: &Dependency, dependent: &str) -> Result<Self::Node> {
        (**self).resolve(dep, dependent)
    }
}

/// What to do with an edge during expansion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Action {
    /// Keep the edge and expand its dependencies.
    #[default]
    Continue,
    /// Drop the edge and everything below it.
    Prune,
    /// Drop the edge but still expand its dependencies.
    Skip,
    /// Keep the edge without expanding its dependencies.
    KeepButPruneRecursiveDeps,
    /// Stop the whole expansion; the result is empty.
    PruneAll,
}

/// Filter applied when the caller supplies no policy.
pub fn default_action(dependent: &dyn Dependent, dep: &Dependency) -> Action {
    if dep.is_optional() && !dependent.build_options().with_dependency(dep) {
        return Action::Prune;
    }
    if dep.is_recommended() && dependent.build_options().without_dependency(dep) {
        return Action::Prune;
    }
    Action::Continue
}

/// Expand all of `root`'s dependencies with [`default_action`].
pub fn expand<D, R>(root: &D, resolver: &R) -> Result<Vec<Dependency>>
where
    D: Dependent,
    R: Resolver,
{
    expand_deps(root, root.deps(), resolver, default_action)
}

/// Expand all of `root`'s dependencies, asking `policy` about every edge.
///
/// The policy replaces [`default_action`]; call it from the policy to keep
/// the default filtering.
pub fn expand_with<D, R, P>(root: &D, resolver: &R, policy: P) -> Result<Vec<Dependency>>
where
    D: Dependent,
    R: Resolver,
    P: FnMut(&dyn Dependent, &Dependency) -> Action,
{
    expand_deps(root, root.deps(), resolver, policy)
}

/// Expand only `selected`, a subset of `root`'s direct edges.
pub fn expand_deps<D, R, P>(
    root: &D,
    selected: &[Dependency],
    resolver: &R,
    policy: P,
) -> Result<Vec<Dependency>>
where
    D: Dependent,
    R: Resolver,
    P: FnMut(&dyn Dependent, &Dependency) -> Action,
{
    let mut expansion = Expansion {
        resolver,
        policy,
        stack: Vec::new(),
    };

    match expansion.expand(root, selected)? {
        ControlFlow::Continue(deps) => Ok(deps),
        ControlFlow::Break(()) => {
            debug!(root = root.name(), "expansion pruned entirely");
            Ok(Vec::new())
        }
    }
}

struct Expansion<'r, R, P> {
    resolver: &'r R,
    policy: P,
    /// Names of the dependents currently being expanded.
    stack: Vec<String>,
}

type Flow = ControlFlow<(), Vec<Dependency>>;

impl<R, P> Expansion<'_, R, P>
where
    R: Resolver,
    P: FnMut(&dyn Dependent, &Dependency) -> Action,
{
    fn expand(&mut self, dependent: &dyn Dependent, deps: &[Dependency]) -> Result<Flow> {
        self.stack.push(dependent.name().to_string());
        let result = self.expand_edges(dependent, deps);
        self.stack.pop();
        result
    }

    fn expand_edges(&mut self, dependent: &dyn Dependent, deps: &[Dependency]) -> Result<Flow> {
        let mut expanded = Vec::new();

        for dep in deps {
            if dep.name() == dependent.name() {
                continue;
            }

            let action = (self.policy)(dependent, dep);
            trace!(dependent = dependent.name(), dep = dep.name(), ?action, "edge");

            match action {
                Action::PruneAll => return Ok(ControlFlow::Break(())),
                Action::Prune => {
                    debug!(dependent = dependent.name(), dep = dep.name(), "pruned");
                }
                Action::KeepButPruneRecursiveDeps => expanded.push(dep.clone()),
                Action::Continue | Action::Skip => {
                    if self.on_stack(dep.name()) {
                        debug!(
                            dependent = dependent.name(),
                            dep = dep.name(),
                            "cycle, not descending"
                        );
                        continue;
                    }

                    let node = self.resolver.resolve(dep, dependent.name())?;
                    debug!(dep = dep.name(), resolved = node.name(), "resolved");

                    match self.expand(&node, node.deps())? {
                        ControlFlow::Break(()) => return Ok(ControlFlow::Break(())),
                        ControlFlow::Continue(children) => expanded.extend(children),
                    }

                    if action == Action::Continue {
                        if node.name() == dep.name() {
                            expanded.push(dep.clone());
                        } else {
                            expanded.push(dep.renamed(node.name()));
                        }
                    }
                }
            }
        }

        Ok(ControlFlow::Continue(merge_repeats(&expanded)))
    }

    fn on_stack(&self, name: &str) -> bool {
        self.stack.iter().any(|n| n == name)
    }
}
