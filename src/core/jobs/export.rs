//! CSV export of job details
//!
//! A single job is rendered in one piece. A date range can cover any number of jobs,
//! so it is read from the store a page at a time and handed out as a stream of chunks.

use super::store::JobStore;
use super::types::{DateRange, JobDetail, RequestContext};
use crate::utils::error::{GatewayError, Result};
use actix_web::web::Bytes;
use chrono::{DateTime, SecondsFormat, Utc};
use std::io::Write;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, warn};
use uuid::Uuid;

/// Details read from the store per chunk of a range export
pub const EXPORT_PAGE_SIZE: u64 = 500;

/// Rendered chunks buffered ahead of a slow reader
const EXPORT_BUFFER: usize = 4;

/// Fixed column set, in order
pub const EXPORT_COLUMNS: [&str; 11] = [
    "job_id",
    "sequence",
    "item",
    "status",
    "message",
    "primary_status",
    "secondary_status",
    "pricing_strategy",
    "transaction_id",
    "provider_datetime",
    "created_at",
];

/// A rendered CSV document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvExport {
    pub filename: String,
    pub body: Vec<u8>,
    pub rows: usize,
}

/// A range export delivered chunk by chunk
///
/// The first chunk holds the header row. Dropping the stream stops the reads.
pub struct CsvStream {
    pub filename: String,
    chunks: mpsc::Receiver<Result<Bytes>>,
}

impl CsvStream {
    /// Body stream for an HTTP response
    pub fn into_stream(self) -> ReceiverStream<Result<Bytes>> {
        ReceiverStream::new(self.chunks)
    }

    /// Wait for every chunk and join them
    pub async fn collect_body(mut self) -> Result<Vec<u8>> {
        let mut body = Vec::new();
        while let Some(chunk) = self.chunks.recv().await {
            body.extend_from_slice(&chunk?);
        }
        Ok(body)
    }
}

/// Read-side CSV rendering of details
pub struct Exporter {
    store: Arc<dyn JobStore>,
    page_size: u64,
}

impl Exporter {
    pub fn new(store: Arc<dyn JobStore>) -> Self {
        Self {
            store,
            page_size: EXPORT_PAGE_SIZE,
        }
    }

    pub fn with_page_size(mut self, page_size: u64) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Every detail of one visible job
    pub async fn export_job(&self, ctx: &RequestContext, job_id: Uuid) -> Result<CsvExport> {
        let job = self
            .store
            .find_job(job_id)
            .await?
            .filter(|job| ctx.visibility().allows(job))
            .ok_or_else(|| GatewayError::not_found(format!("job {}", job_id)))?;

        let details = self.store.details_for_job(job.id).await?;
        let body = render(&details)?;
        debug!(job_id = %job_id, rows = details.len(), "Exported job details");

        Ok(CsvExport {
            filename: format!("job-{}.csv", job.id),
            body,
            rows: details.len(),
        })
    }

    /// Details of every visible job created within `range`, one page per chunk
    ///
    /// The first page is read before returning, so a failing store surfaces as an error
    /// here rather than as a truncated stream.
    pub async fn export_range(&self, ctx: &RequestContext, range: DateRange) -> Result<CsvStream> {
        let visibility = ctx.visibility();
        let page_size = self.page_size;
        let first = self
            .store
            .details_in_range(&visibility, &range, 0, page_size)
            .await?;
        let head = render_chunk(&first, true)?;

        let (sender, chunks) = mpsc::channel(EXPORT_BUFFER);
        let store = self.store.clone();
        tokio::spawn(async move {
            let mut rows = first.len() as u64;
            let mut more = rows == page_size;
            if sender.send(Ok(head)).await.is_err() {
                return;
            }

            while more {
                let page = match store
                    .details_in_range(&visibility, &range, rows, page_size)
                    .await
                {
                    Ok(page) => page,
                    Err(err) => {
                        warn!(rows, "Range export stopped: {}", err);
                        let _ = sender.send(Err(err)).await;
                        return;
                    }
                };
                rows += page.len() as u64;
                more = page.len() as u64 == page_size;
                if page.is_empty() {
                    break;
                }

                let chunk = render_chunk(&page, false);
                let failed = chunk.is_err();
                if sender.send(chunk).await.is_err() {
                    debug!(rows, "Range export reader went away");
                    return;
                }
                if failed {
                    return;
                }
            }
            debug!(rows, "Streamed range export");
        });

        Ok(CsvStream {
            filename: range_filename(&range),
            chunks,
        })
    }
}

/// Stream details as CSV rows into `writer`
pub fn write_details<W: Write>(writer: W, details: &[JobDetail]) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(EXPORT_COLUMNS)?;
    write_rows(&mut csv_writer, details)?;
    csv_writer.flush()?;
    Ok(())
}

fn write_rows<W: Write>(csv_writer: &mut csv::Writer<W>, details: &[JobDetail]) -> Result<()> {
    for detail in details {
        let job_id = detail.job_id.to_string();
        let sequence = detail.sequence.to_string();
        let created_at = detail.created_at.to_rfc3339_opts(SecondsFormat::Secs, true);
        csv_writer.write_record([
            job_id.as_str(),
            sequence.as_str(),
            detail.item.as_str(),
            detail.status.as_str(),
            detail.message.as_deref().unwrap_or_default(),
            detail.primary_status.as_deref().unwrap_or_default(),
            detail.secondary_status.as_deref().unwrap_or_default(),
            detail.pricing_strategy.as_deref().unwrap_or_default(),
            detail.transaction_id.as_deref().unwrap_or_default(),
            detail.provider_datetime.as_deref().unwrap_or_default(),
            created_at.as_str(),
        ])?;
    }
    Ok(())
}

fn render(details: &[JobDetail]) -> Result<Vec<u8>> {
    let mut body = Vec::new();
    write_details(&mut body, details)?;
    Ok(body)
}

fn render_chunk(details: &[JobDetail], with_header: bool) -> Result<Bytes> {
    let mut csv_writer = csv::Writer::from_writer(Vec::new());
    if with_header {
        csv_writer.write_record(EXPORT_COLUMNS)?;
    }
    write_rows(&mut csv_writer, details)?;
    let body = csv_writer
        .into_inner()
        .map_err(|err| GatewayError::Io(err.into_error()))?;
    Ok(Bytes::from(body))
}

fn range_filename(range: &DateRange) -> String {
    let day = |at: Option<DateTime<Utc>>, fallback: &str| {
        at.map(|at| at.format("%Y%m%d").to_string())
            .unwrap_or_else(|| fallback.to_string())
    };
    format!(
        "details-{}-{}.csv",
        day(range.from, "start"),
        day(range.to, "now")
    )
}
