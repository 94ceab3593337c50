//! `docgraph method` and `docgraph show` command implementations.

use colored::Colorize;
use docgraph::{Config, DocGraph, MethodId};

use super::Output;
use super::display::{print_json, print_source};

/// Run the method command: resolve by signature within a document.
pub fn by_signature(
    config: &Config,
    signature: &str,
    document: &str,
    output: Output,
) -> Result<(), docgraph::Error> {
    let graph = DocGraph::open(config)?;
    let source = graph.method_by_signature(signature, document)?;

    if output.json {
        return print_json(&source);
    }

    println!(
        "{} {}",
        format!("#{}", source.method_id).cyan().bold(),
        document.dimmed()
    );
    print_source(&source.method);
    Ok(())
}

/// Run the show command: resolve by id.
pub fn by_id(config: &Config, id: MethodId, output: Output) -> Result<(), docgraph::Error> {
    let graph = DocGraph::open(config)?;
    let detail = graph.method_by_id(id)?;

    if output.json {
        return print_json(&detail);
    }

    println!(
        "{} {}",
        format!("#{}", detail.method_id).cyan().bold(),
        detail.method_signature.white().bold()
    );
    print_source(&detail.method_body);
    Ok(())
}
