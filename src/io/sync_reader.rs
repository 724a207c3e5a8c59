//! Synchronous CSV readers
//!
//! Provides a streaming iterator over request records and a loader for the
//! catalog file. Delegates CSV format concerns to the csv_format module.
//!
//! # Iterator Interface
//!
//! `SyncReader` implements the Iterator trait, yielding
//! `Result<Request, BookstoreError>` for each CSV row:
//!
//! ```no_run
//! use bookstore_entitlements::io::sync_reader::SyncReader;
//! use std::path::Path;
//!
//! let reader = SyncReader::new(Path::new("requests.csv")).unwrap();
//! for result in reader {
//!     match result {
//!         Ok(request) => println!("Replaying request: {:?}", request),
//!         Err(e) => eprintln!("Error: {}", e),
//!     }
//! }
//! ```
//!
//! # Error Handling
//!
//! - Fatal errors (file not found, I/O errors) are returned from `new()`
//! - Individual record errors are yielded as Err variants with line numbers

use crate::io::csv_format::{
    convert_catalog_record, convert_request_record, CatalogRecord, RequestRecord,
};
use crate::types::{Book, BookstoreError, Price, Request};
use csv::{ReaderBuilder, Trim};
use std::fs::File;
use std::io;
use std::path::Path;
use tracing::warn;

/// Open a file, reporting a missing file as `FileNotFound`
pub fn open_file(path: &Path) -> Result<File, BookstoreError> {
    File::open(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => BookstoreError::FileNotFound {
            path: path.display().to_string(),
        },
        _ => BookstoreError::from(e),
    })
}

fn csv_reader(file: File) -> csv::Reader<File> {
    ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .buffer_capacity(8 * 1024)
        .from_reader(file)
}

/// Synchronous request reader
///
/// Streams requests one at a time with constant memory usage.
#[derive(Debug)]
pub struct SyncReader {
    reader: csv::Reader<File>,
    line_num: u64,
}

impl SyncReader {
    /// Open a request log for streaming
    ///
    /// # Errors
    ///
    /// - `FileNotFound` if the file does not exist
    /// - `IoError` if it cannot be opened
    pub fn new(path: &Path) -> Result<Self, BookstoreError> {
        Ok(Self {
            reader: csv_reader(open_file(path)?),
            line_num: 0,
        })
    }
}

impl Iterator for SyncReader {
    type Item = Result<Request, BookstoreError>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut deserializer = self.reader.deserialize::<RequestRecord>();
        let record = deserializer.next()?;
        self.line_num += 1;

        // +1 for the header row
        let line = self.line_num + 1;
        Some(match record {
            Ok(record) => convert_request_record(record)
                .map_err(|e| BookstoreError::parse_error(Some(line), e)),
            Err(e) => Err(BookstoreError::from(e)),
        })
    }
}

/// Load every valid row of a catalog file
///
/// Malformed rows are logged and skipped.
///
/// # Errors
///
/// - `FileNotFound` if the file does not exist
/// - `IoError` if it cannot be opened
pub fn read_catalog(path: &Path) -> Result<Vec<(Book, Price)>, BookstoreError> {
    let mut reader = csv_reader(open_file(path)?);
    let mut books = Vec::new();

    for (index, record) in reader.deserialize::<CatalogRecord>().enumerate() {
        let line = index as u64 + 2;
        match record
            .map_err(BookstoreError::from)
            .and_then(convert_catalog_record)
        {
            Ok(entry) => books.push(entry),
            Err(e) => warn!(line, error = %e, "Skipping catalog row"),
        }
    }

    Ok(books)
}
