//! `docgraph list` command implementation.

use clap::ValueEnum;
use colored::Colorize;
use docgraph::{Class, Config, DocGraph, Document, Method, MethodCall, Project};

use super::Output;
use super::display::print_json;

/// Table selectable by `docgraph list`.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Table {
    Projects,
    Documents,
    Classes,
    Methods,
    Calls,
}

/// Run the list command.
pub fn run(config: &Config, table: Table, output: Output) -> Result<(), docgraph::Error> {
    let graph = DocGraph::open(config)?;
    let store = graph.store();

    let lines: Vec<String> = match table {
        Table::Projects => {
            let rows = store.list_projects()?;
            if output.json {
                return print_json(&rows);
            }
            rows.iter().map(project_line).collect()
        }
        Table::Documents => {
            let rows = store.list_documents()?;
            if output.json {
                return print_json(&rows);
            }
            rows.iter().map(document_line).collect()
        }
        Table::Classes => {
            let rows = store.list_classes()?;
            if output.json {
                return print_json(&rows);
            }
            rows.iter().map(class_line).collect()
        }
        Table::Methods => {
            let rows = store.list_methods()?;
            if output.json {
                return print_json(&rows);
            }
            rows.iter().map(method_line).collect()
        }
        Table::Calls => {
            let rows = store.list_method_calls()?;
            if output.json {
                return print_json(&rows);
            }
            rows.iter().map(call_line).collect()
        }
    };

    if lines.is_empty() {
        println!("{}", "none".dimmed());
        return Ok(());
    }
    for line in &lines {
        println!("{line}");
    }
    println!();
    println!("{}: {} rows", "Total".dimmed(), lines.len());
    Ok(())
}

fn project_line(project: &Project) -> String {
    let id = project.id.as_i64();
    format!("{id:>6}  {}", project.name)
}

fn document_line(doc: &Document) -> String {
    let id = doc.id.as_i64();
    format!("{id:>6}  {}  project={}", doc.path, doc.project_id)
}

fn class_line(class: &Class) -> String {
    let id = class.id.as_i64();
    format!("{id:>6}  {}  document={}", class.name, class.document_id)
}

fn method_line(method: &Method) -> String {
    let id = method.id.as_i64();
    let mut line = format!("{id:>6}  {}  class={}", method.signature, method.class_id);
    if let (Some(start), Some(end)) = (method.start_line, method.end_line) {
        line.push_str(&format!("  lines={start}-{end}"));
    }
    line
}

fn call_line(call: &MethodCall) -> String {
    let id = call.id.as_i64();
    format!("{id:>6}  {} -> {}", call.caller_id, call.callee_id)
}
