pub mod toml_config;

use crate::domain::ports::{AnalysisSettings, ConfigProvider};
use crate::utils::error::Result;
use crate::utils::validation::{
    validate_delimiter, validate_location, validate_non_negative, validate_output_formats,
    validate_path, validate_positive_number, Validate,
};
use serde::{Deserialize, Serialize};

pub use toml_config::TomlConfig;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::Parser))]
#[cfg_attr(feature = "cli", command(name = "food-order-stats"))]
#[cfg_attr(
    feature = "cli",
    command(about = "Descriptive statistics over food-delivery orders")
)]
pub struct CliConfig {
    /// CSV file path or http(s) URL of the order data
    #[cfg_attr(feature = "cli", arg(long, default_value = "food_orders.csv"))]
    pub input: String,

    #[cfg_attr(feature = "cli", arg(long, default_value = "./output"))]
    pub output_path: String,

    #[cfg_attr(
        feature = "cli",
        arg(long, value_delimiter = ',', default_value = "json,csv,html")
    )]
    pub formats: Vec<String>,

    #[cfg_attr(feature = "cli", arg(long, default_value = ","))]
    pub delimiter: String,

    #[cfg_attr(feature = "cli", arg(long, default_value = "3"))]
    pub top_restaurants: usize,

    /// Customers must spend strictly more than this to count as high-value
    #[cfg_attr(feature = "cli", arg(long, default_value = "1000"))]
    pub high_value_threshold: f64,

    /// Write everything into this ZIP file instead of loose files
    #[cfg_attr(feature = "cli", arg(long))]
    pub archive: Option<String>,

    #[cfg_attr(feature = "cli", arg(long, help = "Enable verbose output"))]
    pub verbose: bool,

    #[cfg_attr(feature = "cli", arg(long, help = "Emit logs as JSON lines"))]
    pub json_logs: bool,

    #[cfg_attr(feature = "cli", arg(long, help = "Log phase timings and memory usage"))]
    pub monitor: bool,
}

impl CliConfig {
    pub fn delimiter_byte(&self) -> Result<u8> {
        validate_delimiter("delimiter", &self.delimiter)
    }
}

impl ConfigProvider for CliConfig {
    fn input_location(&self) -> &str {
        &self.input
    }

    fn delimiter(&self) -> u8 {
        self.delimiter_byte().unwrap_or(b',')
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn output_formats(&self) -> &[String] {
        &self.formats
    }

    fn archive_filename(&self) -> Option<&str> {
        self.archive.as_deref()
    }

    fn analysis_settings(&self) -> AnalysisSettings {
        AnalysisSettings {
            top_restaurants: self.top_restaurants,
            high_value_threshold: self.high_value_threshold,
        }
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_location("input", &self.input)?;
        validate_path("output_path", &self.output_path)?;
        validate_output_formats("formats", &self.formats)?;
        self.delimiter_byte()?;
        validate_positive_number("top_restaurants", self.top_restaurants, 1)?;
        validate_non_negative("high_value_threshold", self.high_value_threshold)?;
        if let Some(archive) = &self.archive {
            validate_path("archive", archive)?;
        }
        Ok(())
    }
}
