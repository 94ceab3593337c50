//! Docgraph CLI - Call-graph index from the command line.
//!
//! Docgraph ingests parser output into a `SQLite` call graph and answers
//! callee, caller and context queries used for documentation generation.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use docgraph::{BatchFailure, Config, PromptKind};
use tracing_subscriber::EnvFilter;

mod cli;

/// Docgraph: Call-graph index and context assembly.
#[derive(Parser)]
#[command(name = "docgraph")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Configuration file (defaults to built-in settings)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Database file, overriding the configured path
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Emit JSON response shapes instead of formatted text
    #[arg(long, global = true)]
    json: bool,

    /// Verbose output (can be repeated: -v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default configuration file and create the database
    Init {
        /// Overwrite an existing configuration file
        #[arg(long)]
        force: bool,
    },

    /// Ingest parser output (one batch or an array of batches)
    Ingest {
        /// JSON file to read, or "-" for stdin
        file: PathBuf,
    },

    /// Show the methods a method calls
    Callees {
        /// Method id
        id: i64,
    },

    /// Show the methods that call a method
    Callers {
        /// Method id
        id: i64,
    },

    /// Dump every method with its callees and callers
    Graph,

    /// Resolve a method by signature within a document
    Method {
        /// Fully-qualified signature (e.g., "`Project.Class.Foo(int)`")
        signature: String,

        /// Document path the method belongs to
        document: String,
    },

    /// Show a method by id
    Show {
        /// Method id
        id: i64,
    },

    /// Show a method together with the source of the methods it uses
    Context {
        /// Fully-qualified signature
        signature: String,

        /// Document path the method belongs to
        document: String,
    },

    /// Show a method together with the source of its callers
    Related {
        /// Fully-qualified signature
        signature: String,

        /// Document path the method belongs to
        document: String,
    },

    /// Print the system/user prompt pair for a generation request
    Prompt {
        /// Fully-qualified signature
        signature: String,

        /// Document path the method belongs to
        document: String,

        /// Kind of request
        #[arg(short, long, value_enum, default_value = "docstring")]
        kind: PromptKindArg,
    },

    /// List raw rows of one table
    List {
        /// Table to list
        #[arg(value_enum)]
        table: cli::list::Table,
    },

    /// Show index statistics
    Stats,

    /// Delete every row from the index
    Clear {
        /// Confirm deletion
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum PromptKindArg {
    Docstring,
    Explain,
    Related,
}

impl From<PromptKindArg> for PromptKind {
    fn from(kind: PromptKindArg) -> Self {
        match kind {
            PromptKindArg::Docstring => Self::Docstring,
            PromptKindArg::Explain => Self::Explain,
            PromptKindArg::Related => Self::Related,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let json = cli.json;
    let creating = matches!(cli.command, Commands::Init { .. });
    let result = load_config(cli.config.as_deref(), cli.db, creating).and_then(|config| {
        let output = cli::Output { json };
        match cli.command {
            Commands::Init { force } => cli::init::run(&config, cli.config.as_deref(), force),
            Commands::Ingest { file } => cli::ingest::run(&config, &file, output),
            Commands::Callees { id } => cli::neighbours::callees(&config, id.into(), output),
            Commands::Callers { id } => cli::neighbours::callers(&config, id.into(), output),
            Commands::Graph => cli::graph::run(&config, output),
            Commands::Method {
                signature,
                document,
            } => cli::method::by_signature(&config, &signature, &document, output),
            Commands::Show { id } => cli::method::by_id(&config, id.into(), output),
            Commands::Context {
                signature,
                document,
            } => cli::context::usage(&config, &signature, &document, output),
            Commands::Related {
                signature,
                document,
            } => cli::context::related(&config, &signature, &document, output),
            Commands::Prompt {
                signature,
                document,
                kind,
            } => cli::context::prompt(&config, kind.into(), &signature, &document, output),
            Commands::List { table } => cli::list::run(&config, table, output),
            Commands::Stats => cli::stats::run(&config, output),
            Commands::Clear { yes } => cli::clear::run(&config, yes),
        }
    });

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if json {
                let failure = BatchFailure {
                    error: e.to_string(),
                };
                if let Ok(text) = serde_json::to_string(&failure) {
                    println!("{text}");
                }
            }
            eprintln!("{}: {e}", "error".red().bold());
            // Show cause chain for nested errors
            let mut source = std::error::Error::source(&e);
            while let Some(cause) = source {
                eprintln!("  {}: {cause}", "caused by".dimmed());
                source = std::error::Error::source(cause);
            }
            ExitCode::FAILURE
        }
    }
}

/// Resolve configuration, then apply the `--db` override.
///
/// Without `--config`, `.docgraph/config.yaml` is used when present. With
/// `creating` set, a named file that does not exist yet yields defaults.
fn load_config(
    path: Option<&Path>,
    db: Option<PathBuf>,
    creating: bool,
) -> Result<Config, docgraph::Error> {
    let default_path = cli::default_config_path();
    let path = path.or_else(|| default_path.exists().then_some(default_path.as_path()));
    let mut config = match path {
        Some(path) if creating && !path.exists() => Config::default(),
        path => Config::load_or_default(path)?,
    };
    if let Some(db) = db {
        config.database.path = db;
    }
    Ok(config)
}
