//! Compatible products command

use colored::Colorize;
use tabled::Tabled;

use crate::cli::args::{GlobalOptions, OutputFormat, PaginationArgs};
use crate::cli::context::CommandContext;
use crate::cli::init::spinner;
use crate::client::models::Product;
use crate::client::{fetch_remaining_pages, VehicleApi};
use crate::error::{Error, Result};
use crate::fitment::CompatibilityChecker;
use crate::output::{format_json, format_table};

/// Concurrency cap for --all page fetches
const MAX_PARALLEL_PAGES: usize = 8;

#[derive(Tabled)]
struct ProductRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "TITLE")]
    title: String,
    #[tabled(rename = "HANDLE")]
    handle: String,
}

/// List products compatible with the saved vehicle
pub async fn compatible(pagination: &PaginationArgs, all: bool, opts: &GlobalOptions) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    let vehicle = ctx.store.load().ok_or_else(|| {
        Error::Other("No vehicle selected. Run `fitsearch vehicle select` first.".to_string())
    })?;

    let query = CompatibilityChecker::new(&ctx.client, ctx.session_id()).query_for(&vehicle)?;
    let limit = ctx.page_size(pagination.limit);
    let first_page = if all { 1 } else { pagination.page };

    let sp = spinner("Searching products...");
    let first = ctx
        .client
        .compatible_products(&query, first_page, limit)
        .await;
    let first = match first {
        Ok(first) => first,
        Err(e) => {
            sp.finish_and_clear();
            return Err(e);
        }
    };

    let mut products = first.products;
    if all {
        let remaining = first.pagination.remaining_pages();
        if !remaining.is_empty() {
            sp.set_message(format!(
                "Fetching {} more page(s)...",
                remaining.len()
            ));
            let client = ctx.client.clone();
            let query = query.clone();
            let rest = fetch_remaining_pages(
                remaining,
                move |page| {
                    let client = client.clone();
                    let query = query.clone();
                    async move {
                        client
                            .compatible_products(&query, page, limit)
                            .await
                            .map(|r| r.products)
                    }
                },
                MAX_PARALLEL_PAGES,
            )
            .await?;
            products.extend(rest);
        }
    }
    sp.finish_and_clear();

    match ctx.format {
        OutputFormat::Json => {
            println!("{}", format_json(&products)?);
        }
        OutputFormat::Table => {
            let rows: Vec<ProductRow> = products
                .iter()
                .map(|p: &Product| ProductRow {
                    id: p.id.clone(),
                    title: p.title.clone(),
                    handle: p.handle.clone(),
                })
                .collect();
            println!("{}", format_table(&rows));

            let summary = if all {
                format!(
                    "{} product(s) for {}",
                    first.pagination.total_items,
                    vehicle.display()
                )
            } else {
                format!(
                    "Page {}/{} · {} product(s) for {}",
                    first.pagination.page,
                    first.pagination.total_pages,
                    first.pagination.total_items,
                    vehicle.display()
                )
            };
            println!("{}", summary.dimmed());
        }
    }

    Ok(())
}
