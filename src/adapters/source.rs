use crate::adapters::csv_reader::parse_csv;
use crate::adapters::storage::LocalStorage;
use crate::domain::model::Record;
use crate::domain::ports::{ConfigProvider, RecordSource, Storage};
use crate::utils::error::{AnalysisError, Result};
use reqwest::Client;
use std::collections::HashMap;
use std::time::Duration;

/// Reads an order CSV through a storage backend.
pub struct CsvFileSource<S: Storage> {
    storage: S,
    path: String,
    delimiter: u8,
}

impl<S: Storage> CsvFileSource<S> {
    pub fn new(storage: S, path: impl Into<String>, delimiter: u8) -> Self {
        Self {
            storage,
            path: path.into(),
            delimiter,
        }
    }
}

impl<S: Storage> RecordSource for CsvFileSource<S> {
    async fn load_records(&self) -> Result<Vec<Record>> {
        let bytes = self.storage.read_file(&self.path).await?;
        tracing::debug!("Read {} bytes from {}", bytes.len(), self.path);
        parse_csv(&bytes, self.delimiter)
    }

    fn describe(&self) -> String {
        format!("file {}", self.path)
    }
}

/// Downloads an order CSV over HTTP(S).
pub struct HttpCsvSource {
    client: Client,
    url: String,
    delimiter: u8,
    headers: HashMap<String, String>,
    timeout: Option<Duration>,
}

impl HttpCsvSource {
    pub fn new(url: impl Into<String>, delimiter: u8) -> Self {
        Self {
            client: Client::new(),
            url: url.into(),
            delimiter,
            headers: HashMap::new(),
            timeout: None,
        }
    }

    pub fn with_headers(mut self, headers: HashMap<String, String>) -> Self {
        self.headers = headers;
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}

impl RecordSource for HttpCsvSource {
    async fn load_records(&self) -> Result<Vec<Record>> {
        let mut request = self.client.get(&self.url);

        for (key, value) in &self.headers {
            request = request.header(key, value);
        }

        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }

        tracing::debug!("Requesting order data from: {}", self.url);
        let response = request.send().await?;
        let status = response.status();
        tracing::debug!("Source response status: {}", status);

        if !status.is_success() {
            return Err(AnalysisError::SourceStatusError {
                location: self.url.clone(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await?;
        parse_csv(&body, self.delimiter)
    }

    fn describe(&self) -> String {
        format!("url {}", self.url)
    }
}

/// Source chosen from a location string: http(s) URLs are downloaded, anything else is a file path.
pub enum OrderSource {
    File(CsvFileSource<LocalStorage>),
    Http(HttpCsvSource),
}

impl OrderSource {
    pub fn from_location(location: &str, delimiter: u8) -> Self {
        if is_remote(location) {
            OrderSource::Http(HttpCsvSource::new(location, delimiter))
        } else {
            OrderSource::File(CsvFileSource::new(
                LocalStorage::current_dir(),
                location,
                delimiter,
            ))
        }
    }

    pub fn from_config<C: ConfigProvider>(config: &C) -> Self {
        match Self::from_location(config.input_location(), config.delimiter()) {
            OrderSource::Http(source) => OrderSource::Http(
                source
                    .with_headers(config.request_headers())
                    .with_timeout(config.request_timeout_seconds().map(Duration::from_secs)),
            ),
            file => file,
        }
    }
}

impl RecordSource for OrderSource {
    async fn load_records(&self) -> Result<Vec<Record>> {
        match self {
            OrderSource::File(source) => source.load_records().await,
            OrderSource::Http(source) => source.load_records().await,
        }
    }

    fn describe(&self) -> String {
        match self {
            OrderSource::File(source) => source.describe(),
            OrderSource::Http(source) => source.describe(),
        }
    }
}

pub fn is_remote(location: &str) -> bool {
    let lower = location.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}
