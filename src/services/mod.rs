pub mod position_service;
pub mod ticker_locks;
