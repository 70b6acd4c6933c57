pub mod config;
pub mod config_loader;
pub mod position;
pub mod signal;
pub mod sizing;
pub mod stats;
pub mod traits;

pub use config::{
    AppConfig, BybitConfig, EngineConfig, TelegramConfig, TradingConfig, TradingHours,
};
pub use config_loader::ConfigLoader;
pub use position::{ExchangePosition, InstrumentInfo, OrderResult, TrackedPosition};
pub use signal::{Direction, OrderSide, PositionIdx, PositionMode, Signal, SignalDetails};
pub use sizing::{compute_sizing, PositionSizing, SizingError, SizingParams};
pub use stats::RunningStatistics;
pub use traits::{ExchangeGateway, Notifier};
