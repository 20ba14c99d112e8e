use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use futures::future::join_all;

use crate::fetch::{ensure_concurrency_limit, FetchFailure, QuoteSource};
use crate::portfolio::QuoteCache;

/// Shared refresh progress, polled by the UI while a refresh runs.
#[derive(Debug, Default)]
pub struct RefreshProgress {
    completed: AtomicUsize,
    total: AtomicUsize,
    busy: AtomicBool,
}

impl RefreshProgress {
    /// Symbols settled so far in the current cycle, success or failure.
    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }

    pub fn total(&self) -> usize {
        self.total.load(Ordering::SeqCst)
    }

    /// True for the whole duration of a non-empty refresh.
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    pub fn ratio(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            0.0
        } else {
            (self.completed() as f64 / total as f64).clamp(0.0, 1.0)
        }
    }

    fn start(&self, total: usize) {
        self.completed.store(0, Ordering::SeqCst);
        self.total.store(total, Ordering::SeqCst);
        self.busy.store(total > 0, Ordering::SeqCst);
    }

    fn finish(&self) {
        self.busy.store(false, Ordering::SeqCst);
    }
}

/// Outcome of one refresh cycle. The cycle itself cannot fail; only
/// individual symbols can, and those are listed here.
#[derive(Debug, Default)]
pub struct RefreshReport {
    pub completed: usize,
    pub failures: Vec<FetchFailure>,
}

/// Capped worker pool that refreshes a symbol list through a `QuoteSource`.
///
/// Workers claim symbols from a single shared cursor via atomic
/// fetch-and-add, so each symbol is fetched exactly once per cycle and no
/// two workers within a cycle ever write the same cache key. Overlapping
/// `refresh` calls on the same cache are not guarded against; callers are
/// expected to serialize cycles.
pub struct RefreshPool {
    source: Arc<dyn QuoteSource>,
    concurrency_limit: usize,
    progress: Arc<RefreshProgress>,
}

impl RefreshPool {
    pub fn new(source: Arc<dyn QuoteSource>, concurrency_limit: usize) -> Self {
        Self {
            source,
            concurrency_limit: ensure_concurrency_limit(concurrency_limit),
            progress: Arc::new(RefreshProgress::default()),
        }
    }

    /// Handle the UI polls while a refresh runs on another task.
    pub fn progress(&self) -> Arc<RefreshProgress> {
        Arc::clone(&self.progress)
    }

    /// Fetch every symbol exactly once, merging successful quotes into the
    /// cache. Failed symbols leave their cache entries untouched
    /// (stale-if-error). An empty symbol list resolves immediately without
    /// ever flagging the pool busy.
    pub async fn refresh(&self, symbols: Vec<String>, cache: Arc<Mutex<QuoteCache>>) -> RefreshReport {
        self.progress.start(symbols.len());
        if symbols.is_empty() {
            return RefreshReport::default();
        }

        let worker_count = self.concurrency_limit.min(symbols.len());
        let symbols = Arc::new(symbols);
        let cursor = Arc::new(AtomicUsize::new(0));
        let failures = Arc::new(Mutex::new(Vec::new()));

        let handles: Vec<_> = (0..worker_count)
            .map(|_| {
                let source = Arc::clone(&self.source);
                let symbols = Arc::clone(&symbols);
                let cursor = Arc::clone(&cursor);
                let cache = Arc::clone(&cache);
                let failures = Arc::clone(&failures);
                let progress = Arc::clone(&self.progress);

                tokio::spawn(async move {
                    loop {
                        // Claim the next unprocessed index; the cursor advances
                        // exactly once per claim.
                        let index = cursor.fetch_add(1, Ordering::SeqCst);
                        if index >= symbols.len() {
                            break;
                        }
                        let symbol = &symbols[index];

                        match source.fetch_quote(symbol).await {
                            Ok(quote) if quote.price.is_some() => {
                                cache
                                    .lock()
                                    .unwrap_or_else(PoisonError::into_inner)
                                    .insert(symbol.clone(), quote);
                            }
                            Ok(_) => {
                                failures
                                    .lock()
                                    .unwrap_or_else(PoisonError::into_inner)
                                    .push(FetchFailure::new(symbol.clone(), "quote carried no price"));
                            }
                            Err(failure) => {
                                log::warn!("fetch failed for {}: {}", failure.symbol, failure.error);
                                failures
                                    .lock()
                                    .unwrap_or_else(PoisonError::into_inner)
                                    .push(failure);
                            }
                        }

                        progress.completed.fetch_add(1, Ordering::SeqCst);
                    }
                })
            })
            .collect();

        for joined in join_all(handles).await {
            if let Err(err) = joined {
                log::warn!("refresh worker task failed: {err}");
            }
        }

        self.progress.finish();

        let failures = std::mem::take(
            &mut *failures.lock().unwrap_or_else(PoisonError::into_inner),
        );
        RefreshReport {
            completed: self.progress.completed(),
            failures,
        }
    }
}
