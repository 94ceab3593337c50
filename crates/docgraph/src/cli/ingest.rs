//! `docgraph ingest` command implementation.

use std::io::Read;
use std::path::Path;

use colored::Colorize;
use docgraph::{BatchOutcome, Config, DocGraph, IngestReport};

use super::Output;
use super::display::print_json;

/// Run the ingest command.
///
/// `-` reads the batch JSON from stdin.
pub fn run(config: &Config, file: &Path, output: Output) -> Result<(), docgraph::Error> {
    let input = if file == Path::new("-") {
        let mut input = String::new();
        std::io::stdin().read_to_string(&mut input)?;
        input
    } else {
        std::fs::read_to_string(file)?
    };

    let graph = DocGraph::open(config)?;
    let reports = graph.ingest_json(&input)?;

    if output.json {
        let outcomes: Vec<BatchOutcome> = reports.iter().map(IngestReport::outcome).collect();
        return print_json(&outcomes);
    }

    let mut skipped_total = 0;
    for report in &reports {
        println!(
            "{} project #{}: {} classes, {} methods inserted, {} updated, {} calls",
            "Ingested".green().bold(),
            report.outcome().id,
            report.classes,
            report.methods_inserted.to_string().green(),
            report.methods_updated,
            report.calls_inserted.to_string().green()
        );
        for item in &report.skipped {
            println!("    {} {item}", "skipped".yellow());
        }
        skipped_total += report.skipped.len();
    }

    println!();
    println!(
        "{}: {} batches, {} skipped references",
        "Summary".dimmed(),
        reports.len(),
        skipped_total
    );
    Ok(())
}
