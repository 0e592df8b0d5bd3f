use super::utils::is_tty;
use brewkit::dependency::Dependency;
use brewkit::error::Result;
use brewkit::expand::{Action, Dependent, Resolver, expand_with};
use brewkit::formula::FormulaIndex;
use colored::Colorize;

/// Which kinds of edges `deps` and `uses` follow
#[derive(Debug, Clone, Copy, Default)]
pub struct DepsFilter {
    pub include_build: bool,
    pub include_optional: bool,
    pub include_test: bool,
    pub skip_recommended: bool,
}

impl DepsFilter {
    pub fn action(&self, dependent: &dyn Dependent, dep: &Dependency) -> Action {
        let options = dependent.build_options();

        if dep.is_build() && !self.include_build {
            return Action::Prune;
        }
        if dep.is_test() && !self.include_test {
            return Action::Prune;
        }
        if dep.is_optional() && !self.include_optional && !options.with_dependency(dep) {
            return Action::Prune;
        }
        if dep.is_recommended() && (self.skip_recommended || options.without_dependency(dep)) {
            return Action::Prune;
        }
        Action::Continue
    }
}

pub fn deps(index: &FormulaIndex, formula: &str, filter: DepsFilter, tree: bool) -> Result<()> {
    let root = index.lookup(formula, None)?;
    let is_tty = is_tty();

    if tree {
        if is_tty {
            println!("{}", root.name.bold());
        } else {
            println!("{}", root.name);
        }
        let mut stack = vec![root.name.clone()];
        return print_tree(index, &**root, filter, "", &mut stack, is_tty);
    }

    let expanded = expand_with(&**root, index, |dependent, dep| filter.action(dependent, dep))?;

    if expanded.is_empty() {
        if is_tty {
            println!("{} No dependencies", "✓".green());
        }
        return Ok(());
    }

    for dep in &expanded {
        if is_tty {
            println!("{}", dep.name().cyan());
        } else {
            println!("{}", dep.name());
        }
    }

    Ok(())
}

fn print_tree(
    index: &FormulaIndex,
    node: &dyn Dependent,
    filter: DepsFilter,
    prefix: &str,
    stack: &mut Vec<String>,
    is_tty: bool,
) -> Result<()> {
    let children: Vec<&Dependency> = node
        .deps()
        .iter()
        .filter(|dep| dep.name() != node.name())
        .filter(|dep| filter.action(node, dep) == Action::Continue)
        .collect();

    let len = children.len();
    for (i, dep) in children.into_iter().enumerate() {
        let last = i == len - 1;
        let branch = if last { "└── " } else { "├── " };
        let child = index.resolve(dep, node.name())?;
        let cycle = stack.iter().any(|name| name == child.name());

        let label = match (is_tty, cycle) {
            (true, true) => format!("{} {}", child.name().cyan(), "(cycle)".dimmed()),
            (true, false) => child.name().cyan().to_string(),
            (false, true) => format!("{} (cycle)", child.name()),
            (false, false) => child.name().to_string(),
        };
        println!("{prefix}{branch}{label}");

        if cycle {
            continue;
        }

        let next = format!("{prefix}{}", if last { "    " } else { "│   " });
        stack.push(child.name().to_string());
        let result = print_tree(index, &child, filter, &next, stack, is_tty);
        stack.pop();
        result?;
    }

    Ok(())
}
