//! Fitment check command

use colored::Colorize;
use tabled::Tabled;

use crate::cli::args::{GlobalOptions, OutputFormat};
use crate::cli::context::CommandContext;
use crate::cli::init::spinner;
use crate::client::models::ProductRef;
use crate::error::{Error, Result};
use crate::fitment::{fitment_matches, CompatibilityChecker};
use crate::output::{fit_marker, format_json, format_table};

#[derive(Tabled)]
struct FitmentRow {
    #[tabled(rename = "YEAR")]
    year: String,
    #[tabled(rename = "SUBMODEL")]
    submodel: String,
    #[tabled(rename = "NOTES")]
    notes: String,
    #[tabled(rename = "MATCH")]
    matches: String,
}

/// Check one product against the saved vehicle
pub async fn check(product: String, by_id: bool, opts: &GlobalOptions) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    let vehicle = ctx.store.load().ok_or_else(|| {
        Error::Other("No vehicle selected. Run `fitsearch vehicle select` first.".to_string())
    })?;

    let product_ref = if by_id {
        ProductRef::Id(product)
    } else {
        ProductRef::Handle(product)
    };

    let checker = CompatibilityChecker::new(&ctx.client, ctx.session_id());
    let sp = spinner("Checking fitment...");
    let result = checker.check(&product_ref, &vehicle).await;
    sp.finish_and_clear();
    let check = result?;

    match ctx.format {
        OutputFormat::Json => {
            println!("{}", format_json(&check)?);
        }
        OutputFormat::Table => {
            let year_id = vehicle.year.as_ref().map(|y| y.id.as_str()).unwrap_or("");
            let submodel_id = vehicle.submodel.as_ref().map(|s| s.id.as_str());

            println!("Vehicle: {}", vehicle.display().bold());
            println!(
                "Product: {} ({})",
                check.product.title.bold(),
                check.product.handle
            );
            println!("Result:  {}\n", fit_marker(check.is_fitment));

            if !check.product.fitments.is_empty() {
                let rows: Vec<FitmentRow> = check
                    .product
                    .fitments
                    .iter()
                    .map(|f| FitmentRow {
                        year: f.year_id.clone(),
                        submodel: f.submodel_id.clone().unwrap_or_else(|| "-".to_string()),
                        notes: f.notes.clone().unwrap_or_default(),
                        matches: fit_marker(fitment_matches(f, year_id, submodel_id)),
                    })
                    .collect();
                println!("{}", format_table(&rows));
            }
        }
    }

    Ok(())
}
