// Adapters layer: concrete record sources and storage backends.

pub mod csv_reader;
pub mod source;
pub mod storage;

pub use source::{CsvFileSource, HttpCsvSource, OrderSource};
pub use storage::LocalStorage;
