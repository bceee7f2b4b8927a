//! FitSearch CLI - vehicle fitment companion for Shopify YMM stores

use clap::{CommandFactory, Parser};

mod cache;
mod cli;
mod client;
mod config;
mod context;
mod error;
mod fitment;
mod orchestrator;
mod output;
mod selection;
mod store;

use cli::{Cli, Commands, FitmentCommands, GlobalOptions, ProductsCommands, VehicleCommands};
use error::Result;

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.debug { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let opts = GlobalOptions::from_cli(&cli);

    match cli.command {
        Commands::Init => cli::init::run(&opts).await,
        Commands::Status => cli::status::run(&opts),
        Commands::Vehicle(cmd) => match cmd {
            VehicleCommands::Select => cli::vehicle::select(&opts).await,
            VehicleCommands::Show => cli::vehicle::show(&opts),
            VehicleCommands::Clear => cli::vehicle::clear(&opts),
        },
        Commands::Fitment(cmd) => match cmd {
            FitmentCommands::Check { product, id } => {
                cli::fitment::check(product, id, &opts).await
            }
        },
        Commands::Products(cmd) => match cmd {
            ProductsCommands::Compatible { pagination, all } => {
                cli::products::compatible(&pagination, all, &opts).await
            }
        },
        Commands::Completion { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "fitsearch", &mut std::io::stdout());
            Ok(())
        }
    }
}
