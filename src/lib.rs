pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use crate::adapters::{CsvFileSource, HttpCsvSource, LocalStorage, OrderSource};
pub use crate::config::{CliConfig, TomlConfig};
pub use crate::core::{
    analyzer::{analyze, OrderAnalyzer},
    engine::{AnalysisEngine, RunSummary},
    pipeline::AnalysisPipeline,
};
pub use crate::domain::model::{OrderRecord, Record, ResultBundle, ResultKey, ResultTable, Row, Scalar};
pub use crate::domain::ports::AnalysisSettings;
pub use crate::utils::error::{AnalysisError, Result};
