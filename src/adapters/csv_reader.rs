use crate::domain::model::Record;
use crate::utils::error::Result;
use std::collections::HashMap;

/// Parses delimited text with a header row into records.
///
/// Cells are typed the way a header+inferred-schema reader would: canonical
/// integers and finite decimals become numbers, empty cells become null, the
/// rest stays text. The untouched cell text is kept next to the typed value so
/// identifiers never go through a number. Rows with a different field count
/// than the header are rejected.
pub fn parse_csv(bytes: &[u8], delimiter: u8) -> Result<Vec<Record>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(bytes);

    let headers: Vec<String> = reader.headers()?.iter().map(|h| h.to_string()).collect();
    tracing::debug!("CSV header: {}", headers.join(", "));

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row?;
        let mut data = HashMap::with_capacity(headers.len());
        let mut source_text = HashMap::with_capacity(headers.len());
        for (name, cell) in headers.iter().zip(row.iter()) {
            data.insert(name.clone(), infer_value(cell));
            source_text.insert(name.clone(), cell.to_string());
        }
        records.push(Record::with_columns(data, headers.clone()).with_source_text(source_text));
    }

    Ok(records)
}

pub fn infer_value(cell: &str) -> serde_json::Value {
    if cell.is_empty() {
        return serde_json::Value::Null;
    }

    // 純數字只接受標準寫法的 i64，"007" 或超出範圍的識別碼維持文字
    if is_digits(cell) {
        return match cell.parse::<i64>() {
            Ok(i) if i.to_string() == cell => serde_json::Value::Number(i.into()),
            _ => serde_json::Value::String(cell.to_string()),
        };
    }

    if let Ok(f) = cell.parse::<f64>() {
        if let Some(n) = serde_json::Number::from_f64(f) {
            return serde_json::Value::Number(n);
        }
    }

    serde_json::Value::String(cell.to_string())
}

fn is_digits(cell: &str) -> bool {
    let digits = cell.strip_prefix(['-', '+']).unwrap_or(cell);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}
