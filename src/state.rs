use std::sync::Arc;
use crate::services::ticker_locks::TickerLocks;
use crate::store::PositionStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn PositionStore>,
    pub locks: TickerLocks,
}

impl AppState {
    pub fn new(store: Arc<dyn PositionStore>) -> Self {
        Self {
            store,
            locks: TickerLocks::new(),
        }
    }
}
