//! Cached tree management CLI commands.

use std::sync::Arc;

use clap::{Args, Subcommand};

use crate::output;
use foldview_cache::CacheManager;
use foldview_core::config::AppConfig;
use foldview_core::error::AppError;
use foldview_core::traits::CacheProvider;
use foldview_service::TreeCache;

/// Arguments for cache commands
#[derive(Debug, Args)]
pub struct CacheArgs {
    /// Cache subcommand
    #[command(subcommand)]
    pub command: CacheCommand,
}

/// Cache subcommands
#[derive(Debug, Subcommand)]
pub enum CacheCommand {
    /// Drop every cached tree of a session
    Invalidate {
        /// Session key
        #[arg(long)]
        session_id: String,
    },
    /// Check that the cache backend is reachable
    Ping,
}

/// Execute cache commands
pub async fn execute(args: &CacheArgs, config: &AppConfig) -> Result<(), AppError> {
    let cache = CacheManager::new(&config.cache).await?;

    match &args.command {
        CacheCommand::Invalidate { session_id } => {
            let removed = TreeCache::new(Arc::new(cache), &config.tree)
                .invalidate_session(session_id)
                .await?;
            output::print_success(&format!(
                "Removed {removed} cached tree(s) for session '{session_id}'"
            ));
        }
        CacheCommand::Ping => {
            if cache.health_check().await? {
                output::print_success(&format!("Cache '{}' is reachable", config.cache.provider));
            } else {
                return Err(AppError::service_unavailable("Cache did not answer"));
            }
        }
    }

    Ok(())
}
