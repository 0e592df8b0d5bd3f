//! Shared utility functions for command implementations

use brewkit::cache;
use brewkit::error::Result;
use brewkit::formula::FormulaIndex;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;

pub(super) fn is_tty() -> bool {
    std::io::IsTerminal::is_terminal(&std::io::stdout())
}

/// A cyan spinner on a terminal, a hidden bar otherwise
pub(super) fn spinner(message: String) -> ProgressBar {
    if !is_tty() {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(message);
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

/// Load the formula index behind a spinner
pub(crate) fn load_index(path: &Path) -> Result<FormulaIndex> {
    let spinner = spinner(format!("Loading formula index from {}...", path.display()));
    let index = cache::load_index(path);
    spinner.finish_and_clear();
    index
}
