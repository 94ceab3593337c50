//! `docgraph clear` command implementation.

use colored::Colorize;
use docgraph::{Config, DocGraph};

/// Run the clear command. Refuses to run without `--yes`.
pub fn run(config: &Config, yes: bool) -> Result<(), docgraph::Error> {
    if !yes {
        return Err(docgraph::Error::Validation(
            "clear deletes every indexed row; pass --yes to confirm".to_string(),
        ));
    }

    let graph = DocGraph::open(config)?;
    let before = graph.stats()?;
    graph.clear()?;

    println!(
        "{} {} methods and {} calls from {}",
        "Cleared".green().bold(),
        before.methods,
        before.method_calls,
        graph.db_path().display()
    );
    Ok(())
}
