//! Library interface for brewkit
//!
//! Homebrew's version ordering and recursive dependency expansion, usable
//! without a Homebrew installation:
//!
//! - [`version`]: tokenized [`Version`] parsing and comparison, URL version
//!   detection, and keg [`PkgVersion`]s
//! - [`dependency`] and [`options`]: tagged dependency edges and build options
//! - [`mod@expand`]: the expansion engine, generic over a [`Resolver`]
//! - [`formula`]: a [`FormulaIndex`] over Homebrew's JSON API that resolves
//!   dependency names
//! - [`cellar`]: installed kegs and outdated detection

pub mod cache;
pub mod cellar;
pub mod dependency;
pub mod error;
pub mod expand;
pub mod formula;
pub mod options;
pub mod version;

// Re-export commonly used types
pub use dependency::{BuildEnv, Dependencies, Dependency, Tag};
pub use error::{BrewError, Result};
pub use expand::{Action, Dependent, Resolver, default_action, expand, expand_deps, expand_with};
pub use formula::{Formula, FormulaIndex};
pub use options::BuildOptions;
pub use version::{PkgVersion, Version};
