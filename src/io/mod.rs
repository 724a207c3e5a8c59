//! I/O module
//!
//! Handles CSV parsing and output for the replay CLI.
//!
//! # Components
//!
//! - `csv_format` - CSV format handling (record conversion, wallet output)
//! - `sync_reader` - Synchronous request iterator and catalog loader
//! - `async_reader` - Asynchronous request reader with batch interface

pub mod async_reader;
pub mod csv_format;
pub mod sync_reader;

pub use async_reader::AsyncReader;
pub use csv_format::{
    convert_catalog_record, convert_request_record, write_wallets_csv, CatalogRecord,
    RequestRecord,
};
pub use sync_reader::{open_file, read_catalog, SyncReader};
