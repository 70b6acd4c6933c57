pub mod client;
pub mod execution;
pub mod paper;
pub mod types;

pub use client::{BybitApiError, BybitClient};
pub use execution::BybitGateway;
pub use paper::PaperGateway;
