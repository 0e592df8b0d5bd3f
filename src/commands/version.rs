use super::utils::is_tty;
use brewkit::Version;
use brewkit::error::Result;
use colored::Colorize;
use std::cmp::Ordering;

pub fn compare(left: &str, right: &str) -> Result<()> {
    let l = Version::parse(left);
    let r = Version::parse(right);

    let symbol = match l.compare(&r) {
        Some(Ordering::Less) => "<",
        Some(Ordering::Equal) => "==",
        Some(Ordering::Greater) => ">",
        None => "<=>",
    };

    if is_tty() {
        println!("{} {} {}", describe(&l, left), symbol.bold(), describe(&r, right));
        if l.compare(&r).is_none() {
            println!("{} versions are not comparable", "⚠".yellow());
        }
    } else {
        println!("{left} {symbol} {right}");
    }

    Ok(())
}

fn describe(version: &Version, raw: &str) -> String {
    if version.is_null() {
        format!("{} {}", raw.red(), "(null)".dimmed())
    } else if version.is_head() {
        raw.magenta().to_string()
    } else {
        raw.cyan().to_string()
    }
}

pub fn detect(url: &str, tag: Option<&str>) -> Result<()> {
    let version = Version::detect(url, tag);

    if version.is_null() {
        return Err(anyhow::anyhow!("Could not detect a version from {}", url).into());
    }

    if is_tty() {
        println!("{} {}", "✓".green(), version.to_string().bold());
    } else {
        println!("{version}");
    }

    Ok(())
}
