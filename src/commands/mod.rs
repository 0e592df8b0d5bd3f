//! Command implementations for the brewkit CLI
//!
//! - **deps**: Expanded dependency list or tree for a formula
//! - **uses**: Formulae whose expansion includes a formula
//! - **version**: Version comparison and URL version detection
//! - **outdated**: Installed kegs behind the formula index
//! - **utils**: Shared helpers (internal)

pub mod deps;
pub mod outdated;
pub mod uses;
pub mod version;
pub(crate) mod utils;

pub use deps::{DepsFilter, deps};
pub use outdated::outdated;
pub use uses::uses;
pub use version::{compare, detect};
