//! Log-only sink for per-task dispatch errors
//!
//! Tasks report here instead of returning errors, so a failing item can never
//! abort its siblings, the batch, or the finalize step.

use tokio::sync::mpsc;
use tracing::{error, warn};
use uuid::Uuid;

/// Default channel capacity
pub const DEFAULT_SINK_BUFFER: usize = 1024;

/// One error raised inside a dispatch task
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskError {
    pub job_id: Uuid,
    /// `None` when the task panicked and its detail is unknown
    pub detail_id: Option<Uuid>,
    pub message: String,
}

impl TaskError {
    pub fn new(job_id: Uuid, detail_id: Option<Uuid>, message: impl Into<String>) -> Self {
        Self {
            job_id,
            detail_id,
            message: message.into(),
        }
    }
}

/// Sender half of the error channel
#[derive(Debug, Clone)]
pub struct ErrorSink {
    sender: mpsc::Sender<TaskError>,
}

impl ErrorSink {
    /// Create a sink drained by a background task that logs every entry
    pub fn spawn(buffer_size: usize) -> Self {
        let (sink, mut receiver) = Self::channel(buffer_size);

        tokio::spawn(async move {
            while let Some(entry) = receiver.recv().await {
                Self::log(&entry);
            }
        });

        sink
    }

    /// Create a sink and hand back the receiver
    pub fn channel(buffer_size: usize) -> (Self, mpsc::Receiver<TaskError>) {
        let (sender, receiver) = mpsc::channel(buffer_size.max(1));
        (Self { sender }, receiver)
    }

    /// Report an error; never blocks and never fails
    pub fn report(&self, entry: TaskError) {
        match self.sender.try_send(entry) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(entry)) => {
                warn!("Dispatch error sink full, logging inline");
                Self::log(&entry);
            }
            Err(mpsc::error::TrySendError::Closed(entry)) => {
                Self::log(&entry);
            }
        }
    }

    fn log(entry: &TaskError) {
        error!(
            job_id = %entry.job_id,
            detail_id = ?entry.detail_id,
            "Dispatch task error: {}",
            entry.message
        );
    }
}
