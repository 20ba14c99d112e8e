use crate::portfolio::{Holding, QuoteCache};

/// Portfolio-wide valuation summary.
///
/// Yesterday's valuation is back-computed from each quote's change percent
/// (`price / (1 + change/100)`), so the totals stay consistent with the
/// per-row change figures the source reported.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Summary {
    pub total_valuation: f64,
    pub total_change_amount: f64,
    pub total_change_percent: f64,
}

/// One renderable row: a holding joined with its cached, priced quote.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayRow {
    pub symbol: String,
    pub name: String,
    pub quantity: u32,
    pub price: f64,
    pub valuation: f64,
    pub change_percent: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeClass {
    Up,
    Down,
    Flat,
}

impl ChangeClass {
    pub fn of(change_percent: f64) -> Self {
        if change_percent > 0.0 {
            ChangeClass::Up
        } else if change_percent < 0.0 {
            ChangeClass::Down
        } else {
            ChangeClass::Flat
        }
    }
}

pub fn calculate_summary(holdings: &[Holding], cache: &QuoteCache) -> Summary {
    let mut total_valuation = 0.0;
    let mut total_yesterday = 0.0;

    for holding in holdings {
        let Some(quote) = cache.get(&holding.symbol) else {
            continue;
        };
        let Some(price) = quote.price else {
            continue;
        };

        let quantity = holding.quantity as f64;
        total_valuation += price * quantity;

        let yesterday_price = price / (1.0 + quote.change_percent / 100.0);
        total_yesterday += yesterday_price * quantity;
    }

    let total_change_amount = total_valuation - total_yesterday;
    let total_change_percent = if total_yesterday != 0.0 {
        (total_change_amount / total_yesterday) * 100.0
    } else {
        0.0
    };

    Summary {
        total_valuation,
        total_change_amount,
        total_change_percent,
    }
}

/// Rows for holdings that have a cached, priced quote, in holdings order.
pub fn build_display_rows(holdings: &[Holding], cache: &QuoteCache) -> Vec<DisplayRow> {
    holdings
        .iter()
        .filter_map(|holding| {
            let quote = cache.get(&holding.symbol)?;
            let price = quote.price?;
            Some(DisplayRow {
                symbol: holding.symbol.clone(),
                name: quote.name.clone(),
                quantity: holding.quantity,
                price,
                valuation: price * holding.quantity as f64,
                change_percent: quote.change_percent,
            })
        })
        .collect()
}

pub fn valuation(holding: &Holding, cache: &QuoteCache) -> Option<f64> {
    let quote = cache.get(&holding.symbol)?;
    let price = quote.price?;
    Some(price * holding.quantity as f64)
}

/// Round to the nearest whole unit and group digits with commas.
pub fn format_amount(amount: f64) -> String {
    let rounded = amount.round() as i64;
    let negative = rounded < 0;
    let digits = rounded.unsigned_abs().to_string();

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if negative {
        format!("-{grouped}")
    } else {
        grouped
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::portfolio::Quote;

    fn cache_with(entries: &[(&str, f64, f64)]) -> QuoteCache {
        entries
            .iter()
            .map(|(symbol, price, change)| {
                (
                    symbol.to_string(),
                    Quote {
                        symbol: symbol.to_string(),
                        name: format!("{symbol} Inc."),
                        price: Some(*price),
                        change_percent: *change,
                        updated_at: Utc::now(),
                    },
                )
            })
            .collect()
    }

    #[test]
    fn summary_back_computes_yesterday_valuation() {
        let holdings = vec![Holding::new("AAPL", 10)];
        // Up 2% from 100: yesterday's valuation was 1000.
        let cache = cache_with(&[("AAPL", 102.0, 2.0)]);

        let summary = calculate_summary(&holdings, &cache);
        assert!((summary.total_valuation - 1020.0).abs() < 1e-9);
        assert!((summary.total_change_amount - 20.0).abs() < 1e-9);
        assert!((summary.total_change_percent - 2.0).abs() < 1e-9);
    }

    #[test]
    fn summary_skips_unquoted_holdings() {
        let holdings = vec![Holding::new("AAPL", 10), Holding::new("MSFT", 5)];
        let cache = cache_with(&[("AAPL", 100.0, 0.0)]);

        let summary = calculate_summary(&holdings, &cache);
        assert_eq!(summary.total_valuation, 1000.0);
        assert_eq!(summary.total_change_amount, 0.0);
        assert_eq!(summary.total_change_percent, 0.0);
    }

    #[test]
    fn empty_portfolio_summary_is_all_zero() {
        let summary = calculate_summary(&[], &QuoteCache::new());
        assert_eq!(summary, Summary::default());
    }

    #[test]
    fn display_rows_keep_holdings_order_and_drop_unpriced() {
        let holdings = vec![
            Holding::new("MSFT", 2),
            Holding::new("GOOG", 1),
            Holding::new("AAPL", 3),
        ];
        // GOOG never fetched; the other two are priced.
        let cache = cache_with(&[("AAPL", 100.0, 1.0), ("MSFT", 400.0, -0.5)]);

        let rows = build_display_rows(&holdings, &cache);
        let symbols: Vec<_> = rows.iter().map(|r| r.symbol.as_str()).collect();
        assert_eq!(symbols, ["MSFT", "AAPL"]);
        assert_eq!(rows[0].valuation, 800.0);
        assert_eq!(rows[1].quantity, 3);
    }

    #[test]
    fn valuation_is_none_without_a_priced_quote() {
        let holding = Holding::new("AAPL", 4);
        assert_eq!(valuation(&holding, &QuoteCache::new()), None);

        let cache = cache_with(&[("AAPL", 50.0, 0.0)]);
        assert_eq!(valuation(&holding, &cache), Some(200.0));
    }

    #[test]
    fn amounts_are_rounded_and_grouped() {
        assert_eq!(format_amount(0.0), "0");
        assert_eq!(format_amount(999.4), "999");
        assert_eq!(format_amount(999.5), "1,000");
        assert_eq!(format_amount(1234567.0), "1,234,567");
        assert_eq!(format_amount(-1234.0), "-1,234");
    }

    #[test]
    fn change_class_follows_the_sign() {
        assert_eq!(ChangeClass::of(0.3), ChangeClass::Up);
        assert_eq!(ChangeClass::of(-0.3), ChangeClass::Down);
        assert_eq!(ChangeClass::of(0.0), ChangeClass::Flat);
    }
}
