use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One portfolio line: a ticker symbol plus how many units are held.
///
/// Symbols are unique within a holdings list, order is significant, and both
/// survive the encode/decode round trip unchanged. The serialized field order
/// is the canonical token payload shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Holding {
    pub symbol: String,
    pub quantity: u32,
}

impl Holding {
    pub fn new<S: Into<String>>(symbol: S, quantity: u32) -> Self {
        Self {
            symbol: symbol.into(),
            quantity,
        }
    }
}

/// Market data for a single symbol as returned by a successful fetch.
#[derive(Debug, Clone, PartialEq)]
pub struct Quote {
    pub symbol: String,
    pub name: String,
    pub price: Option<f64>,
    pub change_percent: f64,
    pub updated_at: DateTime<Utc>,
}

/// Most recent successful quote per symbol.
///
/// A symbol held in the portfolio may be absent here (never fetched, or the
/// last fetch failed); that is expected steady state, not an error. Entries
/// are written only by successful fetches and never proactively evicted.
pub type QuoteCache = HashMap<String, Quote>;
