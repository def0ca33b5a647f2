use crate::domain::model::{ResultBundle, ResultTable, Scalar};
use crate::utils::error::{AnalysisError, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::io::Write;
use std::str::FromStr;
use zip::write::{FileOptions, ZipWriter};

pub const JSON_FILENAME: &str = "analysis.json";
pub const HTML_FILENAME: &str = "report.html";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Csv,
    Html,
}

impl OutputFormat {
    pub const NAMES: [&'static str; 3] = ["json", "csv", "html"];
}

impl FromStr for OutputFormat {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            "html" => Ok(OutputFormat::Html),
            other => Err(AnalysisError::InvalidConfigValueError {
                field: "output_formats".to_string(),
                value: other.to_string(),
                reason: format!(
                    "Unsupported format. Valid formats: {}",
                    OutputFormat::NAMES.join(", ")
                ),
            }),
        }
    }
}

pub fn parse_formats(names: &[String]) -> Result<Vec<OutputFormat>> {
    let mut formats = Vec::new();
    for name in names {
        let format = name.parse::<OutputFormat>()?;
        if !formats.contains(&format) {
            formats.push(format);
        }
    }
    Ok(formats)
}

#[derive(Debug, Clone, PartialEq)]
pub struct OutputFile {
    pub name: String,
    pub data: Vec<u8>,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    generated_at: String,
    record_count: usize,
    tables: &'a ResultBundle,
}

/// Renders every requested format into in-memory files.
pub fn render_outputs(
    bundle: &ResultBundle,
    formats: &[OutputFormat],
    generated_at: DateTime<Utc>,
) -> Result<Vec<OutputFile>> {
    let mut files = Vec::new();

    for format in formats {
        match format {
            OutputFormat::Json => files.push(OutputFile {
                name: JSON_FILENAME.to_string(),
                data: render_json(bundle, generated_at)?,
            }),
            OutputFormat::Csv => {
                for (key, table) in bundle.iter() {
                    files.push(OutputFile {
                        name: format!("{}.csv", key),
                        data: render_table_csv(table)?,
                    });
                }
            }
            OutputFormat::Html => files.push(OutputFile {
                name: HTML_FILENAME.to_string(),
                data: render_html(bundle, generated_at).into_bytes(),
            }),
        }
    }

    Ok(files)
}

pub fn render_json(bundle: &ResultBundle, generated_at: DateTime<Utc>) -> Result<Vec<u8>> {
    let report = JsonReport {
        generated_at: generated_at.to_rfc3339(),
        record_count: bundle.record_count(),
        tables: bundle,
    };
    Ok(serde_json::to_vec_pretty(&report)?)
}

pub fn render_table_csv(table: &ResultTable) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    // raw_data 沒有任何輸入時連欄位都沒有
    if !table.columns.is_empty() {
        writer.write_record(&table.columns)?;
        for row in &table.rows {
            writer.write_record(
                table
                    .columns
                    .iter()
                    .map(|c| row.get(c).map(|v| v.to_string()).unwrap_or_default()),
            )?;
        }
    }

    writer.into_inner().map_err(|e| AnalysisError::OutputError {
        message: format!("Failed to flush CSV: {}", e),
    })
}

pub fn render_html(bundle: &ResultBundle, generated_at: DateTime<Utc>) -> String {
    let mut html = String::new();

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<title>Online Food Delivery Analysis</title>\n");
    html.push_str(
        "<style>body{font-family:sans-serif;margin:2em}table{border-collapse:collapse;margin-bottom:2em}\
th,td{border:1px solid #ccc;padding:4px 8px;text-align:left}th{background:#f4f4f4}</style>\n",
    );
    html.push_str("</head>\n<body>\n");
    html.push_str("<h1>Online Food Delivery Analysis</h1>\n");
    html.push_str(&format!(
        "<p>Generated {} from {} orders.</p>\n",
        generated_at.format("%Y-%m-%d %H:%M:%S UTC"),
        bundle.record_count()
    ));

    for (key, table) in bundle.iter() {
        html.push_str(&format!(
            "<section id=\"{}\">\n<h2>{}</h2>\n",
            key,
            key.title()
        ));
        html.push_str(&render_html_table(table));
        html.push_str("</section>\n");
    }

    html.push_str("</body>\n</html>\n");
    html
}

fn render_html_table(table: &ResultTable) -> String {
    if table.is_empty() {
        return "<p>No data.</p>\n".to_string();
    }

    let mut out = String::from("<table>\n<thead><tr>");
    for column in &table.columns {
        out.push_str(&format!("<th>{}</th>", escape_html(column)));
    }
    out.push_str("</tr></thead>\n<tbody>\n");

    for row in &table.rows {
        out.push_str("<tr>");
        for column in &table.columns {
            let cell = row.get(column).map(display_cell).unwrap_or_default();
            out.push_str(&format!("<td>{}</td>", escape_html(&cell)));
        }
        out.push_str("</tr>\n");
    }

    out.push_str("</tbody>\n</table>\n");
    out
}

fn display_cell(value: &Scalar) -> String {
    match value {
        Scalar::Float(f) => format!("{:.2}", f),
        other => other.to_string(),
    }
}

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Packs rendered files into one ZIP.
pub fn build_archive(files: &[OutputFile]) -> Result<Vec<u8>> {
    let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));

    for file in files {
        zip.start_file::<_, ()>(file.name.as_str(), FileOptions::default())?;
        zip.write_all(&file.data)?;
    }

    let cursor = zip.finish()?;
    Ok(cursor.into_inner())
}
