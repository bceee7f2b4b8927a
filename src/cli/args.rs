//! Shared CLI argument types

use clap::{Args, ValueEnum};

use super::Cli;

/// Output format for command results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    #[default]
    Table,
    /// Machine-readable JSON with metadata
    Json,
}

/// Global options passed to every command handler.
///
/// Captured once from the parsed CLI so handler signatures stay small.
#[derive(Debug, Clone)]
pub struct GlobalOptions {
    /// Explicit output format; `None` defers to the config preference
    pub format: Option<OutputFormat>,
    /// Shop domain override (bypasses the configured shop)
    pub shop: Option<String>,
    /// Custom config file path (defaults to ~/.fitsearch/config.yaml)
    pub config: Option<String>,
    /// Bypass the response cache
    pub no_cache: bool,
}

impl GlobalOptions {
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            format: cli.format,
            shop: cli.shop.clone(),
            config: cli.config.clone(),
            no_cache: cli.no_cache,
        }
    }

    pub fn shop_ref(&self) -> Option<&str> {
        self.shop.as_deref()
    }

    pub fn config_ref(&self) -> Option<&str> {
        self.config.as_deref()
    }
}

/// Pagination arguments for product listings
#[derive(Debug, Clone, Args, Default)]
pub struct PaginationArgs {
    /// Page to fetch (1-based)
    #[arg(long, default_value_t = 1)]
    pub page: usize,

    /// Results per page (defaults to the configured page size)
    #[arg(long)]
    pub limit: Option<usize>,
}
