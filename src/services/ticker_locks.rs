use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::debug;

/// Registry of per-ticker async mutexes serializing read-modify-write
/// sequences against the same position.
#[derive(Clone, Default)]
pub struct TickerLocks {
    locks: Arc<DashMap<String, Arc<Mutex<()>>>>,
}

impl TickerLocks {
    pub fn new() -> Self {
        Self::default()
    }

    fn register(&self, ticker_symbol: &str) -> Registration {
        // Clone the Arc out so the shard lock is released before awaiting
        let handle = self
            .locks
            .entry(ticker_symbol.to_string())
            .or_default()
            .value()
            .clone();
        Registration {
            locks: self.locks.clone(),
            ticker_symbol: ticker_symbol.to_string(),
            handle,
        }
    }

    /// Waits for exclusive access to `ticker_symbol`; released on drop.
    pub async fn lock(&self, ticker_symbol: &str) -> TickerGuard {
        debug!("Acquiring lock for {}", ticker_symbol);
        let registration = self.register(ticker_symbol);
        let guard = registration.handle.clone().lock_owned().await;
        TickerGuard {
            _guard: guard,
            _registration: registration,
        }
    }

    /// Locks several tickers at once. Locks are taken in sorted order with
    /// duplicates removed, so two callers can never wait on each other.
    pub async fn lock_many(&self, ticker_symbols: &[&str]) -> Vec<TickerGuard> {
        let mut ordered: Vec<&str> = ticker_symbols.to_vec();
        ordered.sort_unstable();
        ordered.dedup();

        let mut guards = Vec::with_capacity(ordered.len());
        for ticker_symbol in ordered {
            guards.push(self.lock(ticker_symbol).await);
        }
        guards
    }

    /// Number of tickers currently locked or waited on.
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}

/// Interest in one ticker's mutex. The registry entry is removed when the
/// last interested caller goes away, including callers cancelled mid-wait.
struct Registration {
    locks: Arc<DashMap<String, Arc<Mutex<()>>>>,
    ticker_symbol: String,
    handle: Arc<Mutex<()>>,
}

impl Drop for Registration {
    fn drop(&mut self) {
        // Only the map and this registration still hold the mutex
        self.locks.remove_if(&self.ticker_symbol, |_, mutex| {
            Arc::ptr_eq(mutex, &self.handle) && Arc::strong_count(mutex) == 2
        });
    }
}

/// Exclusive access to one ticker, released on drop.
pub struct TickerGuard {
    // Field order matters: the mutex guard must release its Arc before the
    // registration checks the reference count.
    _guard: OwnedMutexGuard<()>,
    _registration: Registration,
}
