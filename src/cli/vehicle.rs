//! Vehicle selection commands

use colored::Colorize;
use dialoguer::{theme::ColorfulTheme, Select};

use crate::cli::args::{GlobalOptions, OutputFormat};
use crate::cli::context::CommandContext;
use crate::cli::init::spinner;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::orchestrator::{Orchestrator, Snapshot};
use crate::output::format_json;
use crate::store::VehicleStore;

/// Interactive cascade: make, model, year, optional submodel
pub async fn select(opts: &GlobalOptions) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    let orch = Orchestrator::new(ctx.client.clone(), Some(ctx.store));

    let sp = spinner("Loading vehicle catalog...");
    orch.activate().await;
    sp.finish_and_clear();
    let snap = checked(orch.snapshot().await)?;

    if snap.makes.is_empty() {
        println!("{} The catalog has no makes yet.", "○".dimmed());
        return Ok(());
    }
    if snap.vehicle.make.is_some() {
        println!("Current vehicle: {}", snap.vehicle.display().dimmed());
    }

    let make = pick("Make", &snap.makes, |m| m.name.clone())?;
    let sp = spinner("Loading models...");
    orch.select_make(Some(make)).await;
    sp.finish_and_clear();
    let snap = checked(orch.snapshot().await)?;

    if snap.models.is_empty() {
        println!("{} No models found for that make.", "○".dimmed());
        return Ok(());
    }
    let model = pick("Model", &snap.models, |m| m.name.clone())?;
    let sp = spinner("Loading years...");
    orch.select_model(Some(model)).await;
    sp.finish_and_clear();
    let snap = checked(orch.snapshot().await)?;

    if snap.years.is_empty() {
        println!("{} No years found for that model.", "○".dimmed());
        return Ok(());
    }
    let year = pick("Year", &snap.years, |y| y.value.to_string())?;
    let sp = spinner("Loading submodels...");
    orch.select_year(Some(year)).await;
    sp.finish_and_clear();
    let snap = checked(orch.snapshot().await)?;

    if !snap.submodels.is_empty() {
        let mut labels = vec!["All submodels".to_string()];
        labels.extend(snap.submodels.iter().map(|s| s.name.clone()));
        let idx = Select::with_theme(&ColorfulTheme::default())
            .with_prompt("Submodel")
            .items(&labels)
            .default(0)
            .interact()?;
        let submodel = (idx > 0).then(|| snap.submodels[idx - 1].clone());
        orch.select_submodel(submodel).await;
    }

    let snap = orch.snapshot().await;
    println!(
        "\n{} Vehicle saved: {}",
        "✓".green(),
        snap.vehicle.display().bold()
    );
    Ok(())
}

/// Print the saved vehicle without touching the network
pub fn show(opts: &GlobalOptions) -> Result<()> {
    let store = VehicleStore::new(Config::data_dir(opts.config_ref())?);

    match store.load() {
        Some(vehicle) => match opts.format.unwrap_or_default() {
            OutputFormat::Json => {
                println!("{}", format_json(&vehicle)?);
            }
            OutputFormat::Table => {
                println!("{}", vehicle.display().bold());
                if vehicle.submodel.is_none() {
                    println!("{}", "(all submodels)".dimmed());
                }
            }
        },
        None => {
            println!("{} No saved vehicle", "○".dimmed());
            println!("  → Run 'fitsearch vehicle select' to pick one");
        }
    }
    Ok(())
}

/// Forget the saved vehicle
pub fn clear(opts: &GlobalOptions) -> Result<()> {
    let store = VehicleStore::new(Config::data_dir(opts.config_ref())?);
    store.save(None);
    println!("{} Saved vehicle cleared.", "✓".green());
    Ok(())
}

fn checked(snap: Snapshot) -> Result<Snapshot> {
    match &snap.error {
        Some(message) => Err(Error::Other(message.clone())),
        None => Ok(snap),
    }
}

fn pick<T: Clone>(prompt: &str, items: &[T], label: impl Fn(&T) -> String) -> Result<T> {
    let labels: Vec<String> = items.iter().map(label).collect();
    let idx = Select::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt)
        .items(&labels)
        .default(0)
        .interact()?;
    Ok(items[idx].clone())
}
