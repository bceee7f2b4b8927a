//! Status command implementation

use colored::Colorize;

use crate::cli::args::GlobalOptions;
use crate::config::Config;
use crate::context::ContextKind;
use crate::error::Result;
use crate::store::VehicleStore;

/// Run the status command to display configuration and saved vehicle
pub fn run(opts: &GlobalOptions) -> Result<()> {
    println!("{}\n", "FitSearch Status".bold());

    let config = match Config::load_at(opts.config_ref()) {
        Ok(config) => config,
        Err(_) => {
            println!("{} Configuration not found", "✗".red());
            println!();
            println!(
                "Run {} to create a configuration file.",
                "fitsearch init".cyan()
            );
            return Ok(());
        }
    };

    let config_path = Config::resolve_path(opts.config_ref())?;
    println!("Config file: {}", config_path.display().to_string().cyan());
    println!();

    match &config.shop {
        Some(shop) => println!("{} Shop: {}", "✓".green(), shop.bold()),
        None => {
            println!("{} No shop configured", "✗".red());
            println!("  → Run 'fitsearch init' or pass --shop");
        }
    }

    let kind = match config.context {
        ContextKind::Admin => "admin (bearer session token)",
        ContextKind::Dev => "dev (local app server)",
        ContextKind::Storefront => "storefront (app proxy)",
    };
    println!("{} Context: {}", "✓".green(), kind);

    if let Some(url) = &config.app_url {
        println!("{} App backend: {}", "○".dimmed(), url.cyan());
    }

    if config.context == ContextKind::Admin {
        match config.token_expiry() {
            Some(expires_at) if !config.is_token_expired() => {
                let remaining = expires_at.signed_duration_since(chrono::Utc::now());
                println!(
                    "{} Admin token valid (expires in {}m)",
                    "✓".green(),
                    remaining.num_minutes()
                );
            }
            Some(_) => println!("{} Admin token expired", "⚠".yellow()),
            None => println!("{} Admin token missing or not a session JWT", "⚠".yellow()),
        }
    }

    match &config.session_id {
        Some(id) => println!("{} Analytics session: {}", "○".dimmed(), id.dimmed()),
        None => println!(
            "{} Analytics session id will be generated on first use",
            "○".dimmed()
        ),
    }

    println!();

    let store = VehicleStore::new(Config::data_dir(opts.config_ref())?);
    match store.load() {
        Some(vehicle) => {
            println!("{} Saved vehicle: {}", "✓".green(), vehicle.display().bold());
        }
        None => {
            println!("{} No saved vehicle", "○".dimmed());
            println!("  → Run 'fitsearch vehicle select' to pick one");
        }
    }
    println!();

    Ok(())
}
