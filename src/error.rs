use thiserror::Error;

#[derive(Error, Debug)]
pub enum BrewError {
    #[error(
        "No available formula with the name \"{name}\"{}{}",
        dependent_note(.dependent),
        suggestion_note(.suggestion)
    )]
    FormulaUnavailable {
        name: String,
        dependent: Option<String>,
        suggestion: Option<String>,
    },

    #[error("comparison of Version with {found} failed")]
    InvalidComparison { found: String },

    #[error("Failed to parse JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Error: {0}")]
    Other(#[from] anyhow::Error),
}

impl BrewError {
    pub fn unavailable(name: impl Into<String>) -> Self {
        BrewError::FormulaUnavailable {
            name: name.into(),
            dependent: None,
            suggestion: None,
        }
    }

    /// Whether this error means a formula could not be located.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, BrewError::FormulaUnavailable { .. })
    }
}

fn dependent_note(dependent: &Option<String>) -> String {
    dependent
        .as_ref()
        .map(|d| format!(" (dependency of {d})"))
        .unwrap_or_default()
}

fn suggestion_note(suggestion: &Option<String>) -> String {
    suggestion
        .as_ref()
        .map(|s| format!(". Did you mean {s}?"))
        .unwrap_or_default()
}

pub type Result<T> = std::result::Result<T, BrewError>;
