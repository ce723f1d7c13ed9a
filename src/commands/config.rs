//! Configuration management CLI commands.

use clap::{Args, Subcommand};

use crate::output::{self, OutputFormat};
use foldview_core::config::AppConfig;
use foldview_core::error::AppError;
use foldview_store::postgres::connection::mask_password;

/// Arguments for config commands
#[derive(Debug, Args)]
pub struct ConfigArgs {
    /// Config subcommand
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Config subcommands
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show the effective configuration
    Show,
    /// Validate the effective configuration
    Validate,
}

/// Execute config commands
pub fn execute(args: &ConfigArgs, config: &AppConfig, format: OutputFormat) -> Result<(), AppError> {
    match &args.command {
        ConfigCommand::Show => {
            let mut shown = config.clone();
            shown.database.url = mask_password(&shown.database.url);
            output::print_item(&shown, format);
        }
        ConfigCommand::Validate => {
            validate(config)?;
            output::print_success("Configuration is valid");
            output::print_kv("Database", &mask_password(&config.database.url));
            output::print_kv("Cache", &config.cache.provider);
            output::print_kv("Max nodes", &config.tree.max_nodes.to_string());
            output::print_kv("Max depth", &config.tree.max_depth.to_string());
        }
    }

    Ok(())
}

/// Reject settings the tree service cannot run with.
fn validate(config: &AppConfig) -> Result<(), AppError> {
    if !matches!(config.cache.provider.as_str(), "memory" | "redis") {
        return Err(AppError::validation(format!(
            "Unknown cache provider '{}'",
            config.cache.provider
        )));
    }
    if config.tree.max_nodes == 0 {
        return Err(AppError::validation("tree.max_nodes must be positive"));
    }
    if config.tree.max_depth < 1 {
        return Err(AppError::validation("tree.max_depth must be at least 1"));
    }
    if config.tree.session_ttl_seconds == 0 {
        return Err(AppError::validation("tree.session_ttl_seconds must be positive"));
    }
    if !matches!(config.logging.format.as_str(), "json" | "pretty") {
        return Err(AppError::validation(format!(
            "Unknown log format '{}'",
            config.logging.format
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(validate(&AppConfig::default()).is_ok());
    }

    #[test]
    fn test_zero_depth_is_rejected() {
        let mut config = AppConfig::default();
        config.tree.max_depth = 0;
        assert!(validate(&config).is_err());
    }
}
