// crates/catalog/examples/browse_catalog.rs
//! Browses a running catalog server.
//!
//! Run with `cargo run -p libris-catalog --example browse_catalog -- dune`.
//! The server URL comes from the config file or `LIBRIS_API_BASE_URL`.

use anyhow::Context;
use libris_catalog::{CatalogController, CollectionView};
use libris_config::{Config, ConfigManager};
use libris_core::{SortField, ELLIPSIS};
use std::time::Duration;

fn print_view(label: &str, view: &CollectionView) {
    println!("== {} ({} matching)", label, view.total);
    if let Some(error) = &view.error {
        println!("   ! {}", error);
    }
    for book in &view.items {
        println!(
            "   #{:<4} {:<40} {:<24} {}",
            book.id, book.title, book.author, book.published_year
        );
    }

    let pages: Vec<String> = view
        .page_numbers()
        .into_iter()
        .map(|page| match page {
            ELLIPSIS => "...".to_string(),
            p if p == view.query.page() => format!("[{}]", p),
            p => p.to_string(),
        })
        .collect();
    println!("   pages: {}", pages.join(" "));
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = match ConfigManager::new() {
        Ok(manager) => manager
            .load_with_env_overrides()
            .context("Failed to load configuration")?,
        Err(_) => Config::default(),
    };

    env_logger::Builder::new()
        .filter_level(config.app.effective_log_level().as_filter())
        .parse_default_env()
        .init();

    let controller =
        CatalogController::from_config(&config).context("Failed to build catalog client")?;

    controller.load().await;
    print_view("All books", &controller.snapshot());

    if let Some(term) = std::env::args().nth(1) {
        controller.set_search_term(&term);
        tokio::time::sleep(controller.config().search_debounce + Duration::from_millis(50)).await;

        let mut updates = controller.subscribe();
        while updates.borrow_and_update().loading {
            updates.changed().await?;
        }
        print_view(&format!("Titles matching '{}'", term), &controller.snapshot());
    }

    controller.set_sort(SortField::Year, Some(true)).await;
    print_view("Newest first", &controller.snapshot());

    controller.shutdown();
    Ok(())
}
