pub mod analyzer;
pub mod engine;
pub mod output;
pub mod pipeline;

pub use crate::domain::model::{Record, ResultBundle};
pub use crate::domain::ports::{ConfigProvider, Pipeline, RecordSource, Storage};
pub use crate::utils::error::Result;
