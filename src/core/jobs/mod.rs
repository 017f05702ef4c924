//! Bulk verification jobs
//!
//! A submission becomes one `Job` plus one `JobDetail` per item. The `Dispatcher`
//! fans the details out to a `VerificationProvider`, the `ResultUpdater` writes each
//! outcome, and the `JobManager` finalizes the job once dispatch has drained.

pub mod dispatcher;
pub mod export;
pub mod import;
pub mod manager;
pub mod service;
pub mod sink;
pub mod store;
pub mod types;
pub mod updater;

pub use dispatcher::{DispatchReport, Dispatcher};
pub use export::{CsvExport, CsvStream, Exporter};
pub use manager::{DetailFilter, JobDetailsPage, JobFilter, JobManager, JobsSummary};
pub use service::{BatchAcknowledgement, SingleVerification, VerificationService};
pub use sink::{ErrorSink, TaskError};
pub use store::JobStore;
pub use types::*;
pub use updater::ResultUpdater;
