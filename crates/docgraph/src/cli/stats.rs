//! `docgraph stats` command implementation.

use colored::Colorize;
use docgraph::{Config, DocGraph};

use super::Output;
use super::display::print_json;

/// Run the stats command.
pub fn run(config: &Config, output: Output) -> Result<(), docgraph::Error> {
    let graph = DocGraph::open(config)?;
    let stats = graph.stats()?;

    if output.json {
        return print_json(&stats);
    }

    // Get database size
    let db_path = graph.db_path();
    let db_size_str = match std::fs::metadata(db_path) {
        Ok(meta) => format_size(meta.len()),
        Err(e) => {
            tracing::debug!(error = %e, "Failed to get database file size");
            "size unknown".to_string()
        }
    };

    println!("{}", "Docgraph Index Statistics".cyan().bold());
    println!();
    println!(
        "  {}: {} ({})",
        "Database".white().bold(),
        db_path.display(),
        db_size_str
    );
    println!();

    for (label, count) in [
        ("Projects", stats.projects),
        ("Documents", stats.documents),
        ("Classes", stats.classes),
        ("Methods", stats.methods),
        ("Calls", stats.method_calls),
    ] {
        println!("  {}: {}", label.white().bold(), count.to_string().green());
    }
    Ok(())
}

#[allow(clippy::cast_precision_loss)]
fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{bytes} B")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_size_picks_unit() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(2048), "2.0 KB");
        assert_eq!(format_size(3 * 1024 * 1024), "3.0 MB");
    }
}
