//! Init command implementation

use colored::Colorize;
use dialoguer::{theme::ColorfulTheme, Confirm, Input, Password, Select};
use indicatif::{ProgressBar, ProgressStyle};

use crate::cli::args::GlobalOptions;
use crate::client::{FitmentClient, VehicleApi};
use crate::config::Config;
use crate::context::{ContextKind, ExecutionContext};
use crate::error::Result;

/// Run the init command: interactive setup plus a verification fetch
pub async fn run(opts: &GlobalOptions) -> Result<()> {
    println!("{}", "Welcome to FitSearch!".bold().green());
    println!("Let's connect to your store's vehicle search backend.\n");

    let mut config = Config::load_at(opts.config_ref()).unwrap_or_default();

    let shop: String = Input::with_theme(&ColorfulTheme::default())
        .with_prompt("Shop domain (e.g. my-store.myshopify.com)")
        .with_initial_text(config.shop.clone().unwrap_or_default())
        .validate_with(|input: &String| {
            if input.contains('.') {
                Ok(())
            } else {
                Err("Enter a full domain, like my-store.myshopify.com")
            }
        })
        .interact_text()?;

    let kinds = [ContextKind::Storefront, ContextKind::Dev, ContextKind::Admin];
    let kind_labels = [
        "Storefront (public app-proxy URLs)",
        "Dev (local app server, no auth)",
        "Admin (embedded admin, session token)",
    ];
    let kind_idx = Select::with_theme(&ColorfulTheme::default())
        .with_prompt("How should requests be made?")
        .items(&kind_labels)
        .default(0)
        .interact()?;
    let kind = kinds[kind_idx];

    let proxy_subpath: String = Input::with_theme(&ColorfulTheme::default())
        .with_prompt("App-proxy subpath")
        .default(config.proxy_subpath.clone())
        .interact_text()?;

    let app_url = if kind == ContextKind::Storefront {
        None
    } else {
        let url: String = Input::with_theme(&ColorfulTheme::default())
            .with_prompt("App backend URL")
            .default("http://localhost:3000".to_string())
            .interact_text()?;
        Some(url)
    };

    let admin_token = if kind == ContextKind::Admin {
        let token: String = Password::with_theme(&ColorfulTheme::default())
            .with_prompt("Admin session token (leave empty to skip)")
            .allow_empty_password(true)
            .interact()?;
        (!token.is_empty()).then_some(token)
    } else {
        None
    };

    config.shop = Some(shop.clone());
    config.context = kind;
    config.proxy_subpath = proxy_subpath;
    config.app_url = app_url.clone();
    config.admin_token = admin_token;
    config.ensure_session_id();

    // Verification fetch before saving
    let spinner = spinner("Verifying connection...");
    let mut context = ExecutionContext::new(kind, Some(shop.clone()), config.proxy_subpath.clone());
    if let Some(url) = &app_url {
        context = context.with_base(url.trim_end_matches('/').to_string());
    }
    let client = FitmentClient::new(context, config.admin_token.clone())?;
    let verification = client.list_makes().await;
    spinner.finish_and_clear();

    match verification {
        Ok(makes) => {
            println!(
                "{} Connected. Catalog has {} make(s).",
                "✓".green(),
                makes.len()
            );
        }
        Err(e) => {
            println!("{} Verification failed: {}", "✗".red(), e);
            let save_anyway = Confirm::with_theme(&ColorfulTheme::default())
                .with_prompt("Save this configuration anyway?")
                .default(false)
                .interact()?;
            if !save_anyway {
                println!("Configuration not saved.");
                return Ok(());
            }
        }
    }

    config.save_at(opts.config_ref())?;
    let config_path = Config::resolve_path(opts.config_ref())?;
    println!(
        "\n{} Configuration saved to: {}",
        "✓".green(),
        config_path.display()
    );

    println!("\n{}", "You're all set! Try running:".bold());
    println!(
        "  {} - Pick your vehicle",
        "fitsearch vehicle select".cyan()
    );
    println!(
        "  {} - Browse matching products",
        "fitsearch products compatible".cyan()
    );

    Ok(())
}

pub(crate) fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(80));
    pb
}
