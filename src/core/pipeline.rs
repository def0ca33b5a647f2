use crate::core::analyzer::OrderAnalyzer;
use crate::core::output::{build_archive, parse_formats, render_outputs};
use crate::core::{ConfigProvider, Pipeline, Record, RecordSource, ResultBundle, Storage};
use crate::utils::error::Result;

/// Extract orders from a source, aggregate them, write the tables to storage.
pub struct AnalysisPipeline<R: RecordSource, S: Storage, C: ConfigProvider> {
    source: R,
    storage: S,
    config: C,
}

impl<R: RecordSource, S: Storage, C: ConfigProvider> AnalysisPipeline<R, S, C> {
    pub fn new(source: R, storage: S, config: C) -> Self {
        Self {
            source,
            storage,
            config,
        }
    }
}

#[async_trait::async_trait]
impl<R: RecordSource, S: Storage, C: ConfigProvider> Pipeline for AnalysisPipeline<R, S, C> {
    async fn extract(&self) -> Result<Vec<Record>> {
        tracing::info!("📥 Loading orders from {}", self.source.describe());
        let records = self.source.load_records().await?;

        if records.is_empty() {
            tracing::warn!("Source contained no order rows, all tables will be empty");
        }

        Ok(records)
    }

    async fn transform(&self, data: Vec<Record>) -> Result<ResultBundle> {
        let settings = self.config.analysis_settings();
        tracing::debug!(
            "Analyzing {} records (top_restaurants={}, high_value_threshold={})",
            data.len(),
            settings.top_restaurants,
            settings.high_value_threshold
        );

        OrderAnalyzer::with_settings(settings).analyze(&data)
    }

    async fn load(&self, result: ResultBundle) -> Result<String> {
        let formats = parse_formats(self.config.output_formats())?;
        let files = render_outputs(&result, &formats, chrono::Utc::now())?;

        match self.config.archive_filename() {
            Some(archive_name) => {
                let zip_data = build_archive(&files)?;
                tracing::debug!(
                    "Writing ZIP archive with {} files ({} bytes)",
                    files.len(),
                    zip_data.len()
                );
                self.storage.write_file(archive_name, &zip_data).await?;
                Ok(format!("{}/{}", self.config.output_path(), archive_name))
            }
            None => {
                for file in &files {
                    self.storage.write_file(&file.name, &file.data).await?;
                }
                tracing::debug!("Wrote {} output files", files.len());
                Ok(self.config.output_path().to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::AnalysisSettings;
    use crate::utils::error::AnalysisError;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    #[derive(Clone)]
    struct MockStorage {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    }

    impl MockStorage {
        fn new() -> Self {
            Self {
                files: Arc::new(Mutex::new(HashMap::new())),
            }
        }

        async fn get_file(&self, path: &str) -> Option<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned()
        }

        async fn file_names(&self) -> Vec<String> {
            let files = self.files.lock().await;
            let mut names: Vec<String> = files.keys().cloned().collect();
            names.sort();
            names
        }
    }

    impl Storage for MockStorage {
        async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned().ok_or_else(|| {
                AnalysisError::IoError(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("File not found: {}", path),
                ))
            })
        }

        async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
            let mut files = self.files.lock().await;
            files.insert(path.to_string(), data.to_vec());
            Ok(())
        }
    }

    struct StaticSource {
        records: Vec<Record>,
    }

    impl RecordSource for StaticSource {
        async fn load_records(&self) -> Result<Vec<Record>> {
            Ok(self.records.clone())
        }

        fn describe(&self) -> String {
            "static records".to_string()
        }
    }

    struct MockConfig {
        output_formats: Vec<String>,
        archive: Option<String>,
        settings: AnalysisSettings,
    }

    impl MockConfig {
        fn new(formats: &[&str]) -> Self {
            Self {
                output_formats: formats.iter().map(|f| f.to_string()).collect(),
                archive: None,
                settings: AnalysisSettings::default(),
            }
        }
    }

    impl ConfigProvider for MockConfig {
        fn input_location(&self) -> &str {
            "memory"
        }

        fn delimiter(&self) -> u8 {
            b','
        }

        fn output_path(&self) -> &str {
            "test_output"
        }

        fn output_formats(&self) -> &[String] {
            &self.output_formats
        }

        fn archive_filename(&self) -> Option<&str> {
            self.archive.as_deref()
        }

        fn analysis_settings(&self) -> AnalysisSettings {
            self.settings
        }
    }

    fn order(city: &str, restaurant: &str, user_id: &str, amount: f64) -> Record {
        let mut data = HashMap::new();
        data.insert("city".to_string(), serde_json::json!(city));
        data.insert("cuisine".to_string(), serde_json::json!("Indian"));
        data.insert("restaurant".to_string(), serde_json::json!(restaurant));
        data.insert("user_id".to_string(), serde_json::json!(user_id));
        data.insert("order_amount".to_string(), serde_json::json!(amount));
        data.insert("delivery_time_mins".to_string(), serde_json::json!(30));
        Record::new(data)
    }

    fn pipeline_with(
        records: Vec<Record>,
        config: MockConfig,
    ) -> (AnalysisPipeline<StaticSource, MockStorage, MockConfig>, MockStorage) {
        let storage = MockStorage::new();
        let pipeline = AnalysisPipeline::new(StaticSource { records }, storage.clone(), config);
        (pipeline, storage)
    }

    #[tokio::test]
    async fn test_extract_returns_source_records() {
        let (pipeline, _) = pipeline_with(
            vec![order("Pune", "R1", "u1", 10.0)],
            MockConfig::new(&["json"]),
        );

        let records = pipeline.extract().await.unwrap();
        assert_eq!(records.len(), 1);
    }

    #[tokio::test]
    async fn test_transform_uses_configured_settings() {
        let mut config = MockConfig::new(&["json"]);
        config.settings = AnalysisSettings {
            top_restaurants: 1,
            high_value_threshold: 50.0,
        };
        let (pipeline, _) = pipeline_with(vec![], config);

        let bundle = pipeline
            .transform(vec![
                order("Pune", "R1", "u1", 100.0),
                order("Pune", "R2", "u2", 40.0),
            ])
            .await
            .unwrap();

        assert_eq!(bundle.top_restaurants.len(), 1);
        assert_eq!(bundle.high_value_customers.len(), 1);
    }

    #[tokio::test]
    async fn test_transform_propagates_malformed_record() {
        let (pipeline, _) = pipeline_with(vec![], MockConfig::new(&["json"]));
        let mut bad = order("Pune", "R1", "u1", 10.0);
        bad.data.remove("restaurant");

        let err = pipeline.transform(vec![bad]).await.unwrap_err();
        assert!(matches!(err, AnalysisError::MalformedRecord { .. }));
    }

    #[tokio::test]
    async fn test_load_writes_loose_files() {
        let (pipeline, storage) = pipeline_with(vec![], MockConfig::new(&["json", "html"]));
        let bundle = pipeline
            .transform(vec![order("Pune", "R1", "u1", 10.0)])
            .await
            .unwrap();

        let output = pipeline.load(bundle).await.unwrap();

        assert_eq!(output, "test_output");
        assert_eq!(storage.file_names().await, vec!["analysis.json", "report.html"]);
    }

    #[tokio::test]
    async fn test_load_writes_archive() {
        let mut config = MockConfig::new(&["csv"]);
        config.archive = Some("food_analysis.zip".to_string());
        let (pipeline, storage) = pipeline_with(vec![], config);

        let output = pipeline.load(ResultBundle::default()).await.unwrap();
        assert_eq!(output, "test_output/food_analysis.zip");

        let zip_bytes = storage.get_file("food_analysis.zip").await.unwrap();
        let archive = zip::ZipArchive::new(std::io::Cursor::new(zip_bytes)).unwrap();
        assert_eq!(archive.len(), 7);
        assert_eq!(storage.file_names().await, vec!["food_analysis.zip"]);
    }

    #[tokio::test]
    async fn test_load_rejects_unknown_format() {
        let (pipeline, _) = pipeline_with(vec![], MockConfig::new(&["pdf"]));
        let err = pipeline.load(ResultBundle::default()).await.unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidConfigValueError { .. }));
    }
}
