use super::deps::DepsFilter;
use super::utils::{is_tty, spinner};
use brewkit::error::Result;
use brewkit::formula::FormulaIndex;
use colored::Colorize;

pub fn uses(index: &FormulaIndex, formula: &str, filter: DepsFilter) -> Result<()> {
    let is_tty = is_tty();

    let spinner = spinner(format!("Finding formulae that depend on {}...", formula));
    let users = index.uses(formula, |dependent, dep| filter.action(dependent, dep));
    spinner.finish_and_clear();
    let users = users?;

    if users.is_empty() {
        if is_tty {
            println!("{} No formulae depend on '{}'", "✓".green(), formula);
        }
        return Ok(());
    }

    if is_tty {
        println!(
            "{} Found {} formulae that depend on {}:",
            "✓".green(),
            users.len().to_string().bold(),
            formula.cyan()
        );
    }

    for name in users {
        if !is_tty {
            println!("{}", name);
            continue;
        }

        print!("{}", name.bold());
        if let Some(desc) = index
            .get(&name)
            .and_then(|f| f.desc.as_deref())
            .filter(|d| !d.is_empty())
        {
            print!(" {}", format!("({})", desc).dimmed());
        }
        println!();
    }

    Ok(())
}
