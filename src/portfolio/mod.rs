use std::sync::{Arc, Mutex, PoisonError};

use tokio::task::JoinHandle;

use crate::error::{AppError, Result};
use crate::fetch::{RefreshPool, RefreshProgress, RefreshReport};
use crate::share::{Location, UrlState};

pub mod csv;
pub mod model;
pub mod rules;
pub mod view;

pub use model::{Holding, Quote, QuoteCache};
pub use view::{ChangeClass, DisplayRow, Summary};

/// Owns the holdings list and quote cache, and is the sole caller of the URL
/// persistence layer and the refresh pool.
///
/// Holding mutations never touch the cache; cache entries are written only by
/// successful fetches inside the pool and are never proactively evicted.
pub struct PortfolioStore<L: Location> {
    holdings: Vec<Holding>,
    cache: Arc<Mutex<QuoteCache>>,
    url_state: UrlState<L>,
    pool: Arc<RefreshPool>,
}

impl<L: Location> PortfolioStore<L> {
    pub fn new(url_state: UrlState<L>, pool: Arc<RefreshPool>) -> Self {
        Self {
            holdings: Vec::new(),
            cache: Arc::new(Mutex::new(QuoteCache::new())),
            url_state,
            pool,
        }
    }

    /// Populate holdings from the persisted address. An address that carries
    /// no usable state leaves the portfolio empty.
    pub fn load(&mut self) -> Result<()> {
        self.holdings = self.url_state.read()?.unwrap_or_default();
        Ok(())
    }

    pub fn holdings(&self) -> &[Holding] {
        &self.holdings
    }

    pub fn is_empty(&self) -> bool {
        self.holdings.is_empty()
    }

    /// Snapshot of the quote cache for rendering.
    pub fn quotes(&self) -> QuoteCache {
        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn progress(&self) -> Arc<RefreshProgress> {
        self.pool.progress()
    }

    /// Add a holding and fetch its quote. Returns `false` when the symbol is
    /// already held (the list is left as-is, but still persisted).
    pub async fn add(&mut self, symbol: &str, quantity: u32) -> Result<bool> {
        let symbol = symbol.to_uppercase();
        if !rules::is_valid_symbol(&symbol) {
            return Err(AppError::message(format!("Invalid symbol: {symbol}")));
        }
        if quantity < 1 {
            return Err(AppError::message("Quantity must be an integer of 1 or more"));
        }

        let added = if self.holdings.iter().any(|h| h.symbol == symbol) {
            false
        } else {
            self.holdings.push(Holding::new(symbol.clone(), quantity));
            self.pool
                .refresh(vec![symbol], Arc::clone(&self.cache))
                .await;
            true
        };

        self.persist()?;
        Ok(added)
    }

    /// Remove a holding by symbol. The cache entry, if any, stays behind.
    pub fn remove(&mut self, symbol: &str) -> Result<bool> {
        let symbol = symbol.to_uppercase();
        let before = self.holdings.len();
        self.holdings.retain(|h| h.symbol != symbol);
        let removed = self.holdings.len() != before;
        if removed {
            self.persist()?;
        }
        Ok(removed)
    }

    /// Set a holding's quantity from raw numeric input, normalizing it to a
    /// legal value first.
    pub fn set_quantity(&mut self, symbol: &str, raw: f64) -> Result<bool> {
        let symbol = symbol.to_uppercase();
        let Some(holding) = self.holdings.iter_mut().find(|h| h.symbol == symbol) else {
            return Ok(false);
        };
        holding.quantity = rules::normalize_quantity(raw);
        self.persist()?;
        Ok(true)
    }

    /// Replace the holdings with a parsed CSV list, persist, then refresh
    /// everything.
    pub async fn import_csv(&mut self, text: &str) -> Result<RefreshReport> {
        self.holdings = csv::parse_holdings_csv(text)?;
        self.persist()?;
        Ok(self.refresh().await)
    }

    pub fn export_csv(&self) -> Result<String> {
        csv::to_holdings_csv(&self.holdings)
    }

    /// Refresh quotes for every held symbol through the capped pool.
    pub async fn refresh(&mut self) -> RefreshReport {
        let symbols = self.symbols();
        self.pool.refresh(symbols, Arc::clone(&self.cache)).await
    }

    /// Run the refresh on its own task so a UI can poll progress meanwhile.
    /// Taking `&mut self` keeps store callers from overlapping cycles.
    pub fn spawn_refresh(&mut self) -> JoinHandle<RefreshReport> {
        let pool = Arc::clone(&self.pool);
        let cache = Arc::clone(&self.cache);
        let symbols = self.symbols();
        tokio::spawn(async move { pool.refresh(symbols, cache).await })
    }

    /// Point the address at an inbound link and re-read the state it carries.
    /// Returns the adopted holdings count, or `None` when the link carried no
    /// usable state (the current holdings are then kept).
    pub fn open(&mut self, uri: &str) -> Result<Option<usize>> {
        let previous = self.url_state.current_location();
        self.url_state.replace_location(uri)?;
        match self.url_state.read()? {
            Some(holdings) => {
                let count = holdings.len();
                self.holdings = holdings;
                Ok(Some(count))
            }
            None => {
                // Roll the address back so a bad link does not clobber state.
                match previous {
                    Some(prev) => self.url_state.replace_location(&prev)?,
                    None => self.persist()?,
                }
                Ok(None)
            }
        }
    }

    pub fn share_url(&self, origin: &str) -> String {
        self.url_state.share_url(origin)
    }

    pub fn summary(&self) -> Summary {
        view::calculate_summary(&self.holdings, &self.quotes())
    }

    pub fn display_rows(&self) -> Vec<DisplayRow> {
        view::build_display_rows(&self.holdings, &self.quotes())
    }

    fn symbols(&self) -> Vec<String> {
        self.holdings.iter().map(|h| h.symbol.clone()).collect()
    }

    fn persist(&mut self) -> Result<()> {
        self.url_state.write(&self.holdings)
    }
}
