//! Common display utilities for CLI commands.

use colored::Colorize;
use docgraph::{EdgeRef, MethodRef};
use serde::Serialize;

const MAX_DISPLAY_ITEMS: usize = 10;

/// Print `value` as pretty JSON on stdout.
pub fn print_json<T: Serialize>(value: &T) -> Result<(), docgraph::Error> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print neighbouring methods grouped under their document.
///
/// Shows `empty_message` when there are none.
pub fn print_method_refs(refs: &[MethodRef], empty_message: &str) {
    if refs.is_empty() {
        println!("  {}", empty_message.dimmed());
        return;
    }

    let mut sorted: Vec<_> = refs.iter().collect();
    sorted.sort_by(|a, b| {
        a.document_path
            .cmp(&b.document_path)
            .then_with(|| a.method_id.cmp(&b.method_id))
    });

    let mut current: Option<&str> = None;
    for method in sorted {
        if current != Some(method.document_path.as_str()) {
            println!("  {}:", method.document_path.white().bold());
            current = Some(method.document_path.as_str());
        }
        println!(
            "    {} {} {}",
            "•".dimmed(),
            method.method_signature,
            format!("#{}", method.method_id).dimmed()
        );
    }
}

/// Print one edge list of the full graph, truncated after a few items.
pub fn print_edges(label: &str, edges: &[EdgeRef]) {
    if edges.is_empty() {
        println!("    {}: {}", label.dimmed(), "none".dimmed());
        return;
    }

    println!("    {}:", label.dimmed());
    for edge in edges.iter().take(MAX_DISPLAY_ITEMS) {
        println!(
            "      {} {} {}",
            "•".dimmed(),
            edge.signature,
            format!("#{}", edge.id).dimmed()
        );
    }

    if edges.len() > MAX_DISPLAY_ITEMS {
        println!(
            "      {} ... and {} more",
            "•".dimmed(),
            edges.len() - MAX_DISPLAY_ITEMS
        );
    }
}

/// Print a block of source text with a dimmed gutter.
pub fn print_source(text: &str) {
    for line in text.lines() {
        println!("  {} {line}", "│".dimmed());
    }
}
