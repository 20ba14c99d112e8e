use std::io::Read;

use crate::app::App;
use crate::error::{Context, Result};
use crate::portfolio::view::format_amount;
use crate::ui::{run_holdings_table, run_refresh_progress};

pub async fn show(app: &mut App) -> Result<()> {
    if app.store.is_empty() {
        println!("Portfolio is empty. Add a holding with `add SYMBOL QUANTITY`.");
        return Ok(());
    }

    let progress = app.store.progress();
    let handle = app.store.spawn_refresh();
    let report = run_refresh_progress(progress, handle).await?;

    for failure in &report.failures {
        log::warn!("{}: {}", failure.symbol, failure.error);
    }

    let holdings = app.store.holdings().to_vec();
    let cache = app.store.quotes();
    let summary = app.store.summary();
    run_holdings_table(&holdings, &cache, &summary)
}

pub fn list(app: &App) {
    if app.store.is_empty() {
        println!("Portfolio is empty.");
        return;
    }

    let cache = app.store.quotes();
    println!("{:<8} {:>8} {:>10} {:>14} {:>9}", "Symbol", "Qty", "Price", "Value", "Change");
    for holding in app.store.holdings() {
        let quote = cache.get(&holding.symbol);
        let price = quote.and_then(|q| q.price);
        println!(
            "{:<8} {:>8} {:>10} {:>14} {:>9}",
            holding.symbol,
            holding.quantity,
            price.map_or_else(|| "-".to_string(), |p| format!("{p:.2}")),
            price.map_or_else(
                || "-".to_string(),
                |p| format_amount(p * holding.quantity as f64)
            ),
            quote.map_or_else(|| "-".to_string(), |q| format!("{:+.2}%", q.change_percent)),
        );
    }

    let summary = app.store.summary();
    if summary.total_valuation != 0.0 {
        println!(
            "Total: {} ({:+.2}%)",
            format_amount(summary.total_valuation),
            summary.total_change_percent
        );
    }
}

pub async fn add(app: &mut App, symbol: &str, quantity: u32) -> Result<()> {
    if app.store.add(symbol, quantity).await? {
        let symbol = symbol.to_uppercase();
        match app.store.quotes().get(&symbol) {
            Some(quote) => println!(
                "Added {} x{} ({}, {:.2}, {:+.2}%)",
                symbol,
                quantity,
                quote.name,
                quote.price.unwrap_or_default(),
                quote.change_percent
            ),
            None => println!("Added {symbol} x{quantity} (quote unavailable right now)"),
        }
    } else {
        println!("{} is already in the portfolio.", symbol.to_uppercase());
    }
    Ok(())
}

pub fn remove(app: &mut App, symbol: &str) -> Result<()> {
    if app.store.remove(symbol)? {
        println!("Removed {}.", symbol.to_uppercase());
    } else {
        println!("{} is not in the portfolio.", symbol.to_uppercase());
    }
    Ok(())
}

pub fn set(app: &mut App, symbol: &str, quantity: f64) -> Result<()> {
    if app.store.set_quantity(symbol, quantity)? {
        let symbol = symbol.to_uppercase();
        let adopted = app
            .store
            .holdings()
            .iter()
            .find(|h| h.symbol == symbol)
            .map(|h| h.quantity)
            .unwrap_or_default();
        println!("Set {symbol} quantity to {adopted}.");
    } else {
        println!("{} is not in the portfolio.", symbol.to_uppercase());
    }
    Ok(())
}

pub async fn refresh(app: &mut App) -> Result<()> {
    if app.store.is_empty() {
        println!("Portfolio is empty; nothing to refresh.");
        return Ok(());
    }

    let progress = app.store.progress();
    let handle = app.store.spawn_refresh();
    let report = run_refresh_progress(progress, handle).await?;

    println!(
        "Refreshed {} symbols, {} failed.",
        report.completed,
        report.failures.len()
    );
    for failure in &report.failures {
        println!("  {}: {}", failure.symbol, failure.error);
    }
    Ok(())
}

pub async fn import(app: &mut App, file: &str) -> Result<()> {
    let text = if file == "-" {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read CSV from stdin")?;
        buffer
    } else {
        std::fs::read_to_string(file).with_context(|| format!("Failed to read {file}"))?
    };

    let report = app.store.import_csv(&text).await?;
    println!(
        "Imported {} holdings; refreshed {} symbols, {} failed.",
        app.store.holdings().len(),
        report.completed,
        report.failures.len()
    );
    Ok(())
}

pub fn export(app: &App, file: Option<&str>) -> Result<()> {
    let text = app.store.export_csv()?;
    match file {
        Some(path) => {
            std::fs::write(path, &text).with_context(|| format!("Failed to write {path}"))?;
            println!("Exported {} holdings to {path}.", app.store.holdings().len());
        }
        None => print!("{text}"),
    }
    Ok(())
}

pub fn link(app: &App) {
    println!("{}", app.store.share_url(&app.config.share_origin));
}

pub fn open(app: &mut App, link: &str) -> Result<()> {
    let uri = normalize_inbound_link(link, &app.config.base_path);
    match app.store.open(&uri)? {
        Some(count) => println!("Loaded {count} holdings from the link."),
        None => println!("The link carried no usable portfolio state."),
    }
    Ok(())
}

/// Turn whatever the user pasted into a path-plus-query the location can
/// hold: a full URL is cut down to its path, a bare token or `?p=` form is
/// anchored at the base path, and an absolute path passes through.
fn normalize_inbound_link(link: &str, base_path: &str) -> String {
    let link = link.trim();

    if link.starts_with("http://") || link.starts_with("https://") {
        if let Some(index) = link.find(base_path) {
            return link[index..].to_string();
        }
        // Unknown origin layout; keep everything after the host.
        if let Some(scheme_end) = link.find("://") {
            let rest = &link[scheme_end + 3..];
            if let Some(slash) = rest.find('/') {
                return rest[slash..].to_string();
            }
        }
        return base_path.to_string();
    }

    if link.starts_with('/') {
        return link.to_string();
    }
    if link.starts_with('?') {
        return format!("{base_path}{link}");
    }
    format!("{base_path}{link}")
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "/portfolio-treemap/";

    #[test]
    fn full_urls_are_cut_to_their_path() {
        assert_eq!(
            normalize_inbound_link("https://example.github.io/portfolio-treemap/abc", BASE),
            "/portfolio-treemap/abc"
        );
        assert_eq!(
            normalize_inbound_link("https://example.github.io/portfolio-treemap/?p=abc", BASE),
            "/portfolio-treemap/?p=abc"
        );
    }

    #[test]
    fn foreign_origins_keep_their_path() {
        assert_eq!(
            normalize_inbound_link("https://other.example/x/y", BASE),
            "/x/y"
        );
        assert_eq!(normalize_inbound_link("https://other.example", BASE), BASE);
    }

    #[test]
    fn bare_tokens_and_query_forms_are_anchored_at_the_base() {
        assert_eq!(
            normalize_inbound_link("abc123", BASE),
            "/portfolio-treemap/abc123"
        );
        assert_eq!(
            normalize_inbound_link("?p=abc123", BASE),
            "/portfolio-treemap/?p=abc123"
        );
    }

    #[test]
    fn absolute_paths_pass_through() {
        assert_eq!(
            normalize_inbound_link("/portfolio-treemap/abc", BASE),
            "/portfolio-treemap/abc"
        );
    }
}
