//! `docgraph init` command implementation.

use std::path::Path;

use colored::Colorize;
use docgraph::{Config, DocGraph};

use super::default_config_path;

/// Run the init command.
pub fn run(config: &Config, path: Option<&Path>, force: bool) -> Result<(), docgraph::Error> {
    let default_path = default_config_path();
    let path = path.unwrap_or(default_path.as_path());

    if path.exists() && !force {
        return Err(docgraph::Error::Config(format!(
            "{} already exists (use --force to overwrite)",
            path.display()
        )));
    }

    config.validate()?;
    config.save(path)?;
    let graph = DocGraph::open(config)?;

    println!("{} {}", "Wrote".green().bold(), path.display());
    println!(
        "{} {}",
        "Database".green().bold(),
        graph.db_path().display()
    );
    Ok(())
}
