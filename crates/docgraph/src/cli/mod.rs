//! CLI command implementations.

mod display;

pub mod clear;
pub mod context;
pub mod graph;
pub mod ingest;
pub mod init;
pub mod list;
pub mod method;
pub mod neighbours;
pub mod stats;

use std::path::PathBuf;

use docgraph::{CONFIG_FILE_NAME, DOCGRAPH_DIR_NAME};

/// Output mode shared by every command.
#[derive(Debug, Clone, Copy)]
pub struct Output {
    /// Emit JSON response shapes instead of formatted text
    pub json: bool,
}

/// Configuration file used when `--config` is not given.
pub fn default_config_path() -> PathBuf {
    PathBuf::from(DOCGRAPH_DIR_NAME).join(CONFIG_FILE_NAME)
}
