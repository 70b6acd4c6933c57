pub mod commands;
pub mod engine;
pub mod handle;
pub mod report;
pub mod tracker;

pub use commands::{EngineCommand, EngineStatus};
pub use engine::TradingEngine;
pub use handle::EngineHandle;
pub use tracker::{PositionTracker, ReconciledClose};
