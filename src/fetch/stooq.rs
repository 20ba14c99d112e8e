use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;

use crate::fetch::{FetchFailure, QuoteSource};
use crate::portfolio::Quote;

/// Live quote source backed by the Stooq CSV quote endpoint.
///
/// One request per symbol, no retries; any HTTP or parse problem becomes a
/// `FetchFailure` for that symbol alone.
pub struct StooqSource {
    client: Client,
    endpoint: String,
}

impl StooqSource {
    pub fn new<E: Into<String>>(client: Client, endpoint: E) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }

    async fn fetch(&self, symbol: &str) -> Result<Quote, FetchFailure> {
        let url = format!(
            "{endpoint}?s={stooq}&f=snd2t2ohlcpv&h&e=csv",
            endpoint = self.endpoint,
            stooq = map_symbol(symbol)
        );

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|err| FetchFailure::new(symbol, err.to_string()))?;

        if !response.status().is_success() {
            return Err(FetchFailure::new(
                symbol,
                format!("quote request failed with status {}", response.status()),
            ));
        }

        let body = response
            .text()
            .await
            .map_err(|err| FetchFailure::new(symbol, err.to_string()))?;

        parse_quote_csv(symbol, &body)
    }
}

#[async_trait]
impl QuoteSource for StooqSource {
    async fn fetch_quote(&self, symbol: &str) -> Result<Quote, FetchFailure> {
        self.fetch(symbol).await
    }
}

/// Map a portfolio symbol onto Stooq's naming: Japanese `NNNN.[TFNS]` codes
/// become `nnnn.jp`, plain letter tickers become `ticker.us`, anything else
/// passes through lowercased.
fn map_symbol(symbol: &str) -> String {
    if let Some((code, suffix)) = symbol.split_once('.') {
        let japanese = (4..=5).contains(&code.len())
            && code.chars().all(|c| c.is_ascii_digit())
            && matches!(suffix, "T" | "F" | "N" | "S");
        if japanese {
            return format!("{code}.jp");
        }
    } else if !symbol.is_empty()
        && symbol.len() <= 5
        && symbol.chars().all(|c| c.is_ascii_alphabetic())
    {
        return format!("{}.us", symbol.to_lowercase());
    }
    symbol.to_lowercase()
}

/// Parse the two-line Stooq CSV payload. Field order follows the request's
/// `f=snd2t2ohlcpv` format string: symbol, name, date, time, open, high,
/// low, close, previous close, volume.
fn parse_quote_csv(symbol: &str, body: &str) -> Result<Quote, FetchFailure> {
    let mut lines = body.lines();
    let _header = lines.next();
    let Some(data_line) = lines.next() else {
        return Err(FetchFailure::new(symbol, "no quote data returned"));
    };

    let fields: Vec<&str> = data_line.split(',').collect();
    if fields.len() < 10 {
        return Err(FetchFailure::new(symbol, "unexpected quote format"));
    }

    let close = parse_number(symbol, fields[7])?;
    let prev_close = parse_number(symbol, fields[8])?;

    let change_percent = if prev_close.abs() > f64::EPSILON {
        ((close - prev_close) / prev_close) * 100.0
    } else {
        0.0
    };

    let name = fields[1].trim();
    let name = if name.is_empty() || name == "-" {
        symbol.to_string()
    } else {
        name.to_string()
    };

    Ok(Quote {
        symbol: symbol.to_string(),
        name,
        price: Some(close),
        change_percent,
        updated_at: Utc::now(),
    })
}

fn parse_number(symbol: &str, value: &str) -> Result<f64, FetchFailure> {
    value
        .trim()
        .parse::<f64>()
        .map_err(|_| FetchFailure::new(symbol, format!("unparseable numeric value: {value}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "Symbol,Name,Date,Time,Open,High,Low,Close,Previous Close,Volume";

    #[test]
    fn maps_symbols_onto_stooq_names() {
        assert_eq!(map_symbol("7203.T"), "7203.jp");
        assert_eq!(map_symbol("9984.S"), "9984.jp");
        assert_eq!(map_symbol("AAPL"), "aapl.us");
        assert_eq!(map_symbol("V"), "v.us");
        assert_eq!(map_symbol("BRK.B"), "brk.b");
        assert_eq!(map_symbol("^SPX"), "^spx");
    }

    #[test]
    fn parses_a_quote_line() {
        let body = format!(
            "{HEADER}\n7203.JP,TOYOTA MOTOR,2026-08-28,15:00:00,2500,2560,2480,2550,2500,1200000"
        );
        let quote = parse_quote_csv("7203.T", &body).expect("quote");

        assert_eq!(quote.symbol, "7203.T");
        assert_eq!(quote.name, "TOYOTA MOTOR");
        assert_eq!(quote.price, Some(2550.0));
        assert!((quote.change_percent - 2.0).abs() < 1e-9);
    }

    #[test]
    fn zero_previous_close_gives_zero_change() {
        let body = format!("{HEADER}\nX.US,X,2026-08-28,15:00:00,1,1,1,1,0,10");
        let quote = parse_quote_csv("X", &body).expect("quote");
        assert_eq!(quote.change_percent, 0.0);
    }

    #[test]
    fn missing_name_falls_back_to_the_symbol() {
        let body = format!("{HEADER}\naapl.us,-,2026-08-28,15:00:00,180,181,179,180.5,179,900");
        let quote = parse_quote_csv("AAPL", &body).expect("quote");
        assert_eq!(quote.name, "AAPL");
    }

    #[test]
    fn unknown_symbol_placeholder_is_a_failure() {
        let body = format!("{HEADER}\nZZZZ.US,ZZZZ,N/D,N/D,N/D,N/D,N/D,N/D,N/D,N/D");
        let failure = parse_quote_csv("ZZZZ", &body).expect_err("failure");
        assert_eq!(failure.symbol, "ZZZZ");
        assert!(failure.error.contains("unparseable"));
    }

    #[test]
    fn truncated_payload_is_a_failure() {
        assert!(parse_quote_csv("AAPL", HEADER).is_err());
        assert!(parse_quote_csv("AAPL", "").is_err());
        assert!(parse_quote_csv("AAPL", &format!("{HEADER}\nshort,line")).is_err());
    }
}
