mod position;
mod response;
mod trade;

pub use position::{
    CreatePosition, InitializeSummary, Position, PositionPatch, PositionSummary, RecordsAffected,
    UpdatePosition,
};
pub use response::{ApiResponse, Status};
pub use trade::{Side, TickerParams, Trade, TradeParams};
