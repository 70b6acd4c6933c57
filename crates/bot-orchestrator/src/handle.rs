use crate::commands::{EngineCommand, EngineStatus};
use anyhow::Result;
use tokio::sync::{mpsc, oneshot};

/// Cloneable front door to the engine task.
#[derive(Clone)]
pub struct EngineHandle {
    tx: mpsc::Sender<EngineCommand>,
}

impl EngineHandle {
    #[must_use]
    pub const fn new(tx: mpsc::Sender<EngineCommand>) -> Self {
        Self { tx }
    }

    /// Forwards raw signal text to the engine.
    ///
    /// # Errors
    /// Returns an error if the engine task has stopped.
    pub async fn message(&self, text: String) -> Result<()> {
        self.tx.send(EngineCommand::Message(text)).await?;
        Ok(())
    }

    /// Enables periodic position reconciliation.
    ///
    /// # Errors
    /// Returns an error if the engine task has stopped.
    pub async fn start_monitoring(&self) -> Result<()> {
        self.tx.send(EngineCommand::StartMonitoring).await?;
        Ok(())
    }

    /// Disables periodic position reconciliation.
    ///
    /// # Errors
    /// Returns an error if the engine task has stopped.
    pub async fn stop_monitoring(&self) -> Result<()> {
        self.tx.send(EngineCommand::StopMonitoring).await?;
        Ok(())
    }

    /// Gets a snapshot of engine state.
    ///
    /// # Errors
    /// Returns an error if the command cannot be sent or the response cannot
    /// be received.
    pub async fn get_status(&self) -> Result<EngineStatus> {
        let (tx, rx) = oneshot::channel();
        self.tx.send(EngineCommand::GetStatus(tx)).await?;
        let status = rx.await?;
        Ok(status)
    }

    /// Stops the engine loop.
    ///
    /// # Errors
    /// Returns an error if the engine task has already stopped.
    pub async fn shutdown(&self) -> Result<()> {
        self.tx.send(EngineCommand::Shutdown).await?;
        Ok(())
    }
}
