//! `docgraph context`, `docgraph related` and `docgraph prompt` command
//! implementations.

use colored::Colorize;
use docgraph::{Config, DocGraph, PromptKind};

use super::Output;
use super::display::{print_json, print_method_refs, print_source};

/// Run the context command.
pub fn usage(
    config: &Config,
    signature: &str,
    document: &str,
    output: Output,
) -> Result<(), docgraph::Error> {
    let graph = DocGraph::open(config)?;
    let context = graph.usage_context(signature, document)?;

    if output.json {
        return print_json(&context);
    }

    println!("{}", signature.cyan().bold());
    print_source(&context.method.method);
    println!();
    println!("{}:", "Uses".white().bold());
    print_method_refs(&context.used_methods, "none");
    if context.has_used_methods() {
        println!();
        print_source(&context.auxiliary);
    }
    Ok(())
}

/// Run the related command.
pub fn related(
    config: &Config,
    signature: &str,
    document: &str,
    output: Output,
) -> Result<(), docgraph::Error> {
    let graph = DocGraph::open(config)?;
    let context = graph.related_usage(signature, document)?;

    if output.json {
        return print_json(&context);
    }

    println!("{}", signature.cyan().bold());
    print_source(&context.method.method);
    println!();

    if context.related.is_empty() {
        println!("{}: {}", "Called from".white().bold(), "none".dimmed());
        return Ok(());
    }

    println!("{}:", "Called from".white().bold());
    for usage in &context.related {
        println!();
        println!(
            "  {} {}",
            usage.document_path.white().bold(),
            format!("#{}", usage.method_id).dimmed()
        );
        print_source(&usage.method_body);
    }
    Ok(())
}

/// Run the prompt command.
pub fn prompt(
    config: &Config,
    kind: PromptKind,
    signature: &str,
    document: &str,
    output: Output,
) -> Result<(), docgraph::Error> {
    let graph = DocGraph::open(config)?;
    let prompts = graph.prompts(kind, signature, document)?;

    if output.json {
        return print_json(&prompts);
    }

    println!("{}", "System".white().bold());
    println!("{}", prompts.system);
    println!();
    println!("{}", "User".white().bold());
    println!("{}", prompts.user);
    Ok(())
}
