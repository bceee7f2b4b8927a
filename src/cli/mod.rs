//! CLI command definitions and handlers

use clap::{Parser, Subcommand};
pub use clap_complete::Shell;

pub mod args;
pub mod context;
pub mod fitment;
pub mod init;
pub mod products;
pub mod status;
pub mod vehicle;

pub use args::{GlobalOptions, OutputFormat, PaginationArgs};
pub use context::CommandContext;

/// FitSearch CLI - vehicle fitment companion for Shopify YMM stores
#[derive(Parser, Debug)]
#[command(name = "fitsearch")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Output format (table, json); defaults to the configured preference
    #[arg(
        long,
        global = true,
        env = "FITSEARCH_FORMAT",
        hide_env = true,
        hide_possible_values = true
    )]
    pub format: Option<OutputFormat>,

    /// Override the configured shop domain
    #[arg(long, global = true, env = "FITSEARCH_SHOP", hide_env = true)]
    pub shop: Option<String>,

    /// Override config file location
    #[arg(long, global = true, env = "FITSEARCH_CONFIG", hide_env = true)]
    pub config: Option<String>,

    /// Enable debug logging
    #[arg(long, global = true, env = "FITSEARCH_DEBUG", hide_env = true)]
    pub debug: bool,

    /// Bypass cache, fetch fresh data from API
    #[arg(long, global = true, env = "FITSEARCH_NO_CACHE", hide_env = true)]
    pub no_cache: bool,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize FitSearch configuration
    Init,

    /// Show configuration and saved-vehicle status
    Status,

    /// Select and manage the active vehicle
    #[command(subcommand)]
    Vehicle(VehicleCommands),

    /// Check product fitment against the selected vehicle
    #[command(subcommand)]
    Fitment(FitmentCommands),

    /// Browse products for the selected vehicle
    #[command(subcommand)]
    Products(ProductsCommands),

    /// Generate shell completions
    #[command(after_help = "\
Examples:
  bash:   fitsearch completion bash > /etc/bash_completion.d/fitsearch
  zsh:    fitsearch completion zsh > \"${fpath[1]}/_fitsearch\"
  fish:   fitsearch completion fish > ~/.config/fish/completions/fitsearch.fish")]
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Vehicle selection subcommands
#[derive(Subcommand, Debug)]
pub enum VehicleCommands {
    /// Pick a vehicle interactively (make, model, year, submodel)
    Select,

    /// Show the currently saved vehicle
    Show,

    /// Forget the saved vehicle
    Clear,
}

/// Fitment subcommands
#[derive(Subcommand, Debug)]
pub enum FitmentCommands {
    /// Check whether one product fits the selected vehicle
    #[command(after_help = "\
Examples:
  fitsearch fitment check roof-rack          # By product handle
  fitsearch fitment check p_123 --id         # By internal product id
  fitsearch fitment check roof-rack --format json")]
    Check {
        /// Product handle (or id with --id)
        product: String,

        /// Treat the product argument as an internal id instead of a handle
        #[arg(long)]
        id: bool,
    },
}

/// Product browsing subcommands
#[derive(Subcommand, Debug)]
pub enum ProductsCommands {
    /// List products compatible with the selected vehicle
    #[command(after_help = "\
Examples:
  fitsearch products compatible              # First page
  fitsearch products compatible --page 2
  fitsearch products compatible --all        # Every page, fetched in parallel
  fitsearch products compatible --format json | jq '.data[].handle'")]
    Compatible {
        #[command(flatten)]
        pagination: PaginationArgs,

        /// Fetch every page, not just one
        #[arg(long, conflicts_with = "page")]
        all: bool,
    },
}
