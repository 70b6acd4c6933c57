use sigtrade_core::{RunningStatistics, TrackedPosition};
use tokio::sync::oneshot;

/// Messages accepted by the engine task.
///
/// Everything the engine does, including reconciliation ticks and report
/// timers, is processed on the one task that receives these, so no two
/// operations ever run concurrently.
#[derive(Debug)]
pub enum EngineCommand {
    /// Raw message text from the signal transport.
    Message(String),
    /// Enables the periodic reconciliation pass.
    StartMonitoring,
    /// Disables the periodic reconciliation pass.
    StopMonitoring,
    /// Requests a snapshot of engine state.
    GetStatus(oneshot::Sender<EngineStatus>),
    /// Stops the engine loop.
    Shutdown,
}

/// Snapshot of the engine returned by `GetStatus`.
#[derive(Debug, Clone)]
pub struct EngineStatus {
    pub monitoring: bool,
    pub open_positions: Vec<TrackedPosition>,
    pub statistics: RunningStatistics,
}
