use crate::domain::model::{Record, ResultBundle};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// Anything that can hand over a batch of order rows.
pub trait RecordSource: Send + Sync {
    fn load_records(&self) -> impl std::future::Future<Output = Result<Vec<Record>>> + Send;

    /// Human readable description used in logs.
    fn describe(&self) -> String;
}

/// Tunables for the aggregation step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnalysisSettings {
    pub top_restaurants: usize,
    pub high_value_threshold: f64,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            top_restaurants: 3,
            high_value_threshold: 1000.0,
        }
    }
}

pub trait ConfigProvider: Send + Sync {
    fn input_location(&self) -> &str;
    fn delimiter(&self) -> u8;
    fn output_path(&self) -> &str;
    fn output_formats(&self) -> &[String];
    /// ZIP filename when outputs should be archived, `None` for loose files.
    fn archive_filename(&self) -> Option<&str>;
    fn analysis_settings(&self) -> AnalysisSettings;

    fn request_headers(&self) -> HashMap<String, String> {
        HashMap::new()
    }

    fn request_timeout_seconds(&self) -> Option<u64> {
        None
    }
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Vec<Record>>;
    async fn transform(&self, data: Vec<Record>) -> Result<ResultBundle>;
    async fn load(&self, result: ResultBundle) -> Result<String>;
}
