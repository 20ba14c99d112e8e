use std::sync::Arc;

use reqwest::Client;

use crate::config::Config;
use crate::error::Result;
use crate::fetch::{RefreshPool, StooqSource};
use crate::portfolio::PortfolioStore;
use crate::share::{FileLocation, UrlState};

pub mod commands;

/// Wired-up application: settings plus the store that owns everything else.
pub struct App {
    pub config: Config,
    pub store: PortfolioStore<FileLocation>,
}

impl App {
    /// Build the stack: config, file-backed location, URL state, quote
    /// source, refresh pool, store; then load the persisted holdings.
    pub fn bootstrap(config_path: Option<&str>) -> Result<Self> {
        let config = match config_path {
            Some(path) => Config::load(path)?,
            None => Config::builtin(),
        };

        let location = FileLocation::new(&config.location_file);
        let url_state = UrlState::new(location, config.base_path.clone(), config.state_param.clone());

        let source = Arc::new(StooqSource::new(
            Client::new(),
            config.quote_endpoint.clone(),
        ));
        let pool = Arc::new(RefreshPool::new(source, config.max_concurrent_requests));

        let mut store = PortfolioStore::new(url_state, pool);
        store.load()?;

        Ok(Self { config, store })
    }
}
