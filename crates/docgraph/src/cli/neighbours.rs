//! `docgraph callees` and `docgraph callers` command implementations.

use colored::Colorize;
use docgraph::{Config, DocGraph, MethodId};

use super::Output;
use super::display::{print_json, print_method_refs};

/// Run the callees command.
pub fn callees(config: &Config, id: MethodId, output: Output) -> Result<(), docgraph::Error> {
    let graph = DocGraph::open(config)?;
    let used = graph.used_methods(id)?;

    if output.json {
        return print_json(&used);
    }

    println!("Methods used by {}:", format!("#{id}").cyan().bold());
    print_method_refs(&used.used_methods, "none");
    Ok(())
}

/// Run the callers command.
pub fn callers(config: &Config, id: MethodId, output: Output) -> Result<(), docgraph::Error> {
    let graph = DocGraph::open(config)?;
    let related = graph.related_methods(id)?;

    if output.json {
        return print_json(&related);
    }

    println!("Callers of {}:", format!("#{id}").cyan().bold());
    print_method_refs(&related.related_methods, "none");
    Ok(())
}
