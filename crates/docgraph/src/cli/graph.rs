//! `docgraph graph` command implementation.

use colored::Colorize;
use docgraph::{Config, DocGraph};

use super::Output;
use super::display::{print_edges, print_json};

/// Run the graph command.
pub fn run(config: &Config, output: Output) -> Result<(), docgraph::Error> {
    let graph = DocGraph::open(config)?;
    let data = graph.graph()?;

    if output.json {
        return print_json(&data);
    }

    if data.data.is_empty() {
        println!("{}", "No methods indexed".dimmed());
        return Ok(());
    }

    let mut document: Option<&str> = None;
    for row in &data.data {
        if document != Some(row.document_path.as_str()) {
            println!(
                "{} {}",
                row.document_path.white().bold(),
                format!("({})", row.project_name).dimmed()
            );
            document = Some(row.document_path.as_str());
        }
        println!(
            "  {} {}",
            row.method_signature.cyan(),
            format!("#{}", row.method_id).dimmed()
        );
        print_edges("calls", &row.callees);
        print_edges("called by", &row.callers);
    }

    println!();
    println!("{}: {} methods", "Total".dimmed(), data.data.len());
    Ok(())
}
