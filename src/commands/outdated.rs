use super::utils::is_tty;
use brewkit::cellar;
use brewkit::error::Result;
use brewkit::formula::FormulaIndex;
use colored::Colorize;
use std::path::Path;

pub fn outdated(index: &FormulaIndex, cellar: &Path, json: bool) -> Result<()> {
    let outdated = cellar::outdated(cellar, index)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&outdated)?);
        return Ok(());
    }

    let is_tty = is_tty();

    if outdated.is_empty() {
        if is_tty {
            println!("{} All packages are up to date", "✓".green());
        }
        return Ok(());
    }

    if is_tty {
        println!(
            "{} Found {} outdated packages:\n",
            "⚠".yellow(),
            outdated.len().to_string().bold()
        );
    }

    for keg in outdated {
        if is_tty {
            println!(
                "{} {} {}",
                keg.name.bold().yellow(),
                keg.installed.to_string().dimmed(),
                format!("→ {}", keg.current).cyan()
            );
        } else {
            println!("{} ({}) < {}", keg.name, keg.installed, keg.current);
        }
    }

    Ok(())
}
