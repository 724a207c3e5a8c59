//! Asynchronous CSV reader with batch interface
//!
//! Streams request records from a CSV source in batches for the concurrent
//! replay strategy.
//!
//! # Architecture
//!
//! ```text
//! CSV Reader → AsyncReader → Batches of Requests
//!                  ↓
//!           csv_format module
//!           (RequestRecord, convert_request_record)
//! ```

use crate::io::csv_format::{convert_request_record, RequestRecord};
use crate::types::Request;
use csv_async::AsyncReaderBuilder;
use futures::io::AsyncRead;
use futures::stream::StreamExt;
use tracing::warn;

/// Asynchronous request reader
///
/// Maintains streaming behavior with constant memory usage.
pub struct AsyncReader<R: AsyncRead + Unpin> {
    csv_reader: csv_async::AsyncDeserializer<R>,
}

impl<R: AsyncRead + Unpin + Send + 'static> AsyncReader<R> {
    pub fn new(reader: R) -> Self {
        let csv_reader = AsyncReaderBuilder::new()
            .flexible(true)
            .trim(csv_async::Trim::All)
            .create_deserializer(reader);

        Self { csv_reader }
    }

    /// Read up to `batch_size` requests
    ///
    /// Invalid records are logged and skipped. Returns an empty vector once
    /// the end of the input is reached.
    pub async fn read_batch(&mut self, batch_size: usize) -> Vec<Request> {
        let mut batch = Vec::with_capacity(batch_size);
        let mut records = self.csv_reader.deserialize::<RequestRecord>();

        while batch.len() < batch_size {
            match records.next().await {
                Some(Ok(record)) => match convert_request_record(record) {
                    Ok(request) => batch.push(request),
                    Err(e) => warn!(error = %e, "Skipping request record"),
                },
                Some(Err(e)) => warn!(error = %e, "CSV parse error"),
                None => break,
            }
        }

        batch
    }
}
