use crate::domain::ports::{AnalysisSettings, ConfigProvider};
use crate::utils::error::{AnalysisError, Result};
use crate::utils::validation::{
    validate_delimiter, validate_location, validate_non_empty_string, validate_non_negative,
    validate_output_formats, validate_path, validate_positive_number, Validate,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub analysis: AnalysisConfig,
    pub source: SourceConfig,
    pub load: LoadConfig,
    pub monitoring: Option<MonitoringConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    pub name: String,
    pub description: Option<String>,
    pub top_restaurants: Option<usize>,
    pub high_value_threshold: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// File path or http(s) URL.
    pub location: String,
    pub delimiter: Option<String>,
    pub timeout_seconds: Option<u64>,
    pub headers: Option<HashMap<String, String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadConfig {
    pub output_path: String,
    pub output_formats: Vec<String>,
    pub compression: Option<CompressionConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompressionConfig {
    pub enabled: bool,
    pub filename: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub enabled: bool,
    pub log_level: Option<String>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| AnalysisError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${ORDERS_URL})，未設定的變數保留原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| AnalysisError::ConfigValidationError {
            field: "environment".to_string(),
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        validate_non_empty_string("analysis.name", &self.analysis.name)?;
        validate_location("source.location", &self.source.location)?;
        if let Some(delimiter) = &self.source.delimiter {
            validate_delimiter("source.delimiter", delimiter)?;
        }
        if let Some(timeout) = self.source.timeout_seconds {
            validate_positive_number("source.timeout_seconds", timeout as usize, 1)?;
        }
        validate_path("load.output_path", &self.load.output_path)?;
        validate_output_formats("load.output_formats", &self.load.output_formats)?;
        if let Some(compression) = &self.load.compression {
            if compression.enabled {
                validate_path("load.compression.filename", &compression.filename)?;
            }
        }

        let settings = self.analysis_settings();
        validate_positive_number("analysis.top_restaurants", settings.top_restaurants, 1)?;
        validate_non_negative("analysis.high_value_threshold", settings.high_value_threshold)?;

        Ok(())
    }

    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().map(|m| m.enabled).unwrap_or(false)
    }

    pub fn log_level(&self) -> Option<&str> {
        self.monitoring.as_ref().and_then(|m| m.log_level.as_deref())
    }
}

impl ConfigProvider for TomlConfig {
    fn input_location(&self) -> &str {
        &self.source.location
    }

    fn delimiter(&self) -> u8 {
        self.source
            .delimiter
            .as_deref()
            .and_then(|d| validate_delimiter("source.delimiter", d).ok())
            .unwrap_or(b',')
    }

    fn output_path(&self) -> &str {
        &self.load.output_path
    }

    fn output_formats(&self) -> &[String] {
        &self.load.output_formats
    }

    fn archive_filename(&self) -> Option<&str> {
        self.load
            .compression
            .as_ref()
            .filter(|c| c.enabled)
            .map(|c| c.filename.as_str())
    }

    fn analysis_settings(&self) -> AnalysisSettings {
        let defaults = AnalysisSettings::default();
        AnalysisSettings {
            top_restaurants: self
                .analysis
                .top_restaurants
                .unwrap_or(defaults.top_restaurants),
            high_value_threshold: self
                .analysis
                .high_value_threshold
                .unwrap_or(defaults.high_value_threshold),
        }
    }

    fn request_headers(&self) -> HashMap<String, String> {
        self.source.headers.clone().unwrap_or_default()
    }

    fn request_timeout_seconds(&self) -> Option<u64> {
        self.source.timeout_seconds
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
