use std::collections::HashSet;

use crate::error::Result;
use crate::portfolio::rules::normalize_quantity;
use crate::portfolio::Holding;

/// Parse headerless `symbol,quantity` CSV text into a holdings list.
///
/// Rows without two usable fields are skipped, symbols are trimmed and
/// uppercased, quantities are normalized to integers ≥ 1, and when a symbol
/// repeats the first occurrence wins so the list invariants hold.
pub fn parse_holdings_csv(text: &str) -> Result<Vec<Holding>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let mut seen = HashSet::new();
    let mut holdings = Vec::new();

    for record in reader.records() {
        let record = record?;
        let Some(symbol_raw) = record.get(0) else {
            continue;
        };
        let Some(quantity_raw) = record.get(1) else {
            continue;
        };

        let symbol = symbol_raw.to_uppercase();
        if symbol.is_empty() {
            continue;
        }
        let Ok(quantity) = quantity_raw.parse::<f64>() else {
            continue;
        };
        if quantity.is_nan() {
            continue;
        }

        if seen.insert(symbol.clone()) {
            holdings.push(Holding::new(symbol, normalize_quantity(quantity)));
        }
    }

    Ok(holdings)
}

/// Emit the same headerless `symbol,quantity` shape the parser accepts.
pub fn to_holdings_csv(holdings: &[Holding]) -> Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());

    for holding in holdings {
        writer.write_record([holding.symbol.as_str(), &holding.quantity.to_string()])?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|err| crate::error::AppError::message(err.to_string()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
