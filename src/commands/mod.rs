//! CLI command definitions and dispatch.

pub mod cache;
pub mod config;
pub mod render;

use clap::{Parser, Subcommand};

use crate::output::OutputFormat;
use foldview_core::config::AppConfig;
use foldview_core::error::AppError;

/// Foldview: per-user folder tree rendering
#[derive(Debug, Parser)]
#[command(name = "foldview", version, about, long_about = None)]
pub struct Cli {
    /// Base configuration file, without extension
    #[arg(short, long, default_value = "config/default")]
    pub config: String,

    /// Environment overlay loaded from `config/{env}`
    #[arg(short, long, default_value = "development")]
    pub env: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Render a user's folder tree
    Render(render::RenderArgs),
    /// Cached tree management
    Cache(cache::CacheArgs),
    /// Configuration management
    Config(config::ConfigArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self, config: AppConfig) -> Result<(), AppError> {
        match &self.command {
            Commands::Render(args) => render::execute(args, &config, self.format).await,
            Commands::Cache(args) => cache::execute(args, &config).await,
            Commands::Config(args) => config::execute(args, &config, self.format),
        }
    }
}
