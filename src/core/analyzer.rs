use crate::domain::model::{
    OrderRecord, Record, ResultBundle, ResultTable, Row, Scalar, REQUIRED_FIELDS,
};
use crate::domain::ports::AnalysisSettings;
use crate::utils::error::{AnalysisError, Result};
use std::collections::BTreeMap;

/// Batch aggregation over order rows. Holds only settings, never data.
#[derive(Debug, Clone, Default)]
pub struct OrderAnalyzer {
    settings: AnalysisSettings,
}

impl OrderAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: AnalysisSettings) -> Self {
        Self { settings }
    }

    /// Builds a fresh bundle from `records`.
    ///
    /// The first malformed row aborts the whole call. Grouped tables without a
    /// ranking are ordered by key; ranked tables order by value descending and
    /// break ties by key ascending.
    pub fn analyze(&self, records: &[Record]) -> Result<ResultBundle> {
        let orders = records
            .iter()
            .enumerate()
            .map(|(position, record)| parse_order(position, record))
            .collect::<Result<Vec<_>>>()?;

        tracing::debug!("Parsed {} order records", orders.len());

        let by_city = group_stats(&orders, |o| &o.city, "order_amount", |o| o.order_amount)?;
        let delivery_by_city = group_stats(
            &orders,
            |o| &o.city,
            "delivery_time_mins",
            |o| o.delivery_time_mins,
        )?;
        let by_cuisine = group_stats(&orders, |o| &o.cuisine, "cuisine", |_| 0.0)?;
        let by_restaurant =
            group_stats(&orders, |o| &o.restaurant, "order_amount", |o| o.order_amount)?;
        let by_user = group_stats(&orders, |o| &o.user_id, "order_amount", |o| o.order_amount)?;

        let bundle = ResultBundle {
            raw_data: raw_data(records),
            orders_per_city: orders_per_city(&by_city),
            avg_amount_city: averages(&by_city, "city", "avg_order_amount"),
            avg_delivery_city: averages(&delivery_by_city, "city", "avg_delivery_time"),
            cuisine_popularity: cuisine_popularity(&by_cuisine),
            top_restaurants: self.top_restaurants(&by_restaurant),
            high_value_customers: self.high_value_customers(&by_user),
        };

        tracing::debug!(
            "Analysis produced {} cities, {} cuisines, {} top restaurants, {} high-value customers",
            bundle.orders_per_city.len(),
            bundle.cuisine_popularity.len(),
            bundle.top_restaurants.len(),
            bundle.high_value_customers.len()
        );

        Ok(bundle)
    }

    fn top_restaurants(&self, groups: &BTreeMap<&str, GroupStats>) -> ResultTable {
        let mut table = ResultTable::new(&["restaurant", "total_revenue"]);
        for (restaurant, revenue) in rank_by_sum(groups)
            .into_iter()
            .take(self.settings.top_restaurants)
        {
            table.push(row([
                ("restaurant", Scalar::from(restaurant)),
                ("total_revenue", Scalar::Float(revenue)),
            ]));
        }
        table
    }

    fn high_value_customers(&self, groups: &BTreeMap<&str, GroupStats>) -> ResultTable {
        let mut table = ResultTable::new(&["user_id", "total_spent"]);
        for (user_id, spent) in rank_by_sum(groups)
            .into_iter()
            .filter(|(_, spent)| *spent > self.settings.high_value_threshold)
        {
            table.push(row([
                ("user_id", Scalar::from(user_id)),
                ("total_spent", Scalar::Float(spent)),
            ]));
        }
        table
    }
}

/// Convenience wrapper with default settings.
pub fn analyze(records: &[Record]) -> Result<ResultBundle> {
    OrderAnalyzer::new().analyze(records)
}

#[derive(Debug, Default, Clone, Copy)]
struct GroupStats {
    count: usize,
    sum: f64,
}

impl GroupStats {
    fn mean(&self) -> f64 {
        self.sum / self.count as f64
    }
}

/// Groups orders by `key`, counting and summing `value`. A running sum that
/// leaves the finite range fails at the order that pushed it over.
fn group_stats<'a>(
    orders: &'a [OrderRecord],
    key: impl Fn(&'a OrderRecord) -> &'a String,
    field: &str,
    value: impl Fn(&OrderRecord) -> f64,
) -> Result<BTreeMap<&'a str, GroupStats>> {
    let mut groups: BTreeMap<&str, GroupStats> = BTreeMap::new();
    for (position, order) in orders.iter().enumerate() {
        let group = key(order).as_str();
        let stats = groups.entry(group).or_default();
        stats.count += 1;
        stats.sum += value(order);
        if !stats.sum.is_finite() {
            return Err(AnalysisError::malformed(
                position,
                order.order_id.clone(),
                field,
                format!("overflows the running total for '{}'", group),
            ));
        }
    }
    Ok(groups)
}

fn rank_by_sum<'a>(groups: &BTreeMap<&'a str, GroupStats>) -> Vec<(&'a str, f64)> {
    let mut ranked: Vec<(&str, f64)> = groups.iter().map(|(k, s)| (*k, s.sum)).collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    ranked
}

fn row<const N: usize>(cells: [(&str, Scalar); N]) -> Row {
    cells
        .into_iter()
        .map(|(name, value)| (name.to_string(), value))
        .collect()
}

fn raw_data(records: &[Record]) -> ResultTable {
    let mut table = ResultTable::default();
    for record in records {
        for column in record.ordered_columns() {
            if !table.columns.contains(&column) {
                table.columns.push(column);
            }
        }
        table.push(
            record
                .data
                .iter()
                .map(|(k, v)| (k.clone(), Scalar::from_json(v)))
                .collect(),
        );
    }
    table
}

fn orders_per_city(groups: &BTreeMap<&str, GroupStats>) -> ResultTable {
    let mut table = ResultTable::new(&["city", "total_orders"]);
    for (city, stats) in groups {
        table.push(row([
            ("city", Scalar::from(*city)),
            ("total_orders", Scalar::Integer(stats.count as i64)),
        ]));
    }
    table
}

fn averages(groups: &BTreeMap<&str, GroupStats>, key_column: &str, value_column: &str) -> ResultTable {
    let mut table = ResultTable::new(&[key_column, value_column]);
    for (key, stats) in groups {
        table.push(row([
            (key_column, Scalar::from(*key)),
            (value_column, Scalar::Float(stats.mean())),
        ]));
    }
    table
}

fn cuisine_popularity(groups: &BTreeMap<&str, GroupStats>) -> ResultTable {
    let mut counts: Vec<(&str, usize)> = groups.iter().map(|(k, s)| (*k, s.count)).collect();
    counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));

    let mut table = ResultTable::new(&["cuisine", "order_count"]);
    for (cuisine, count) in counts {
        table.push(row([
            ("cuisine", Scalar::from(cuisine)),
            ("order_count", Scalar::Integer(count as i64)),
        ]));
    }
    table
}

fn order_id_of(record: &Record) -> Option<String> {
    if let Some(text) = record.source_text("order_id").filter(|t| !t.is_empty()) {
        return Some(text.to_string());
    }
    match record.data.get("order_id") {
        Some(serde_json::Value::String(s)) if !s.is_empty() => Some(s.clone()),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    }
}

/// Reads a grouping key. Typed sources keep the cell text, which is used as is
/// so identifiers like `007` never pass through a number.
fn text_field(position: usize, record: &Record, field: &str) -> Result<String> {
    let order_id = || order_id_of(record);
    let value = record.data.get(field);
    if let (Some(text), Some(v)) = (record.source_text(field), value) {
        if !v.is_null() && !text.trim().is_empty() {
            return Ok(text.to_string());
        }
    }
    match value {
        None | Some(serde_json::Value::Null) => {
            Err(AnalysisError::malformed(position, order_id(), field, "is missing"))
        }
        Some(serde_json::Value::String(s)) if s.trim().is_empty() => {
            Err(AnalysisError::malformed(position, order_id(), field, "is empty"))
        }
        Some(serde_json::Value::String(s)) => Ok(s.clone()),
        Some(serde_json::Value::Number(n)) => Ok(n.to_string()),
        Some(serde_json::Value::Bool(b)) => Ok(b.to_string()),
        Some(_) => Err(AnalysisError::malformed(
            position,
            order_id(),
            field,
            "is not a scalar value",
        )),
    }
}

fn numeric_field(position: usize, record: &Record, field: &str) -> Result<f64> {
    let order_id = || order_id_of(record);
    let value = match record.data.get(field) {
        None | Some(serde_json::Value::Null) => {
            return Err(AnalysisError::malformed(position, order_id(), field, "is missing"))
        }
        Some(serde_json::Value::Number(n)) => n.as_f64(),
        Some(serde_json::Value::String(s)) => s.trim().parse::<f64>().ok(),
        Some(_) => None,
    };

    match value {
        None => Err(AnalysisError::malformed(
            position,
            order_id(),
            field,
            "is not a number",
        )),
        Some(v) if !v.is_finite() => Err(AnalysisError::malformed(
            position,
            order_id(),
            field,
            "is not a finite number",
        )),
        Some(v) if v < 0.0 => Err(AnalysisError::malformed(
            position,
            order_id(),
            field,
            "must not be negative",
        )),
        Some(v) => Ok(v),
    }
}

/// Converts one loosely typed row into an order. `position` is the 0-based row index.
pub fn parse_order(position: usize, record: &Record) -> Result<OrderRecord> {
    if let Some(field) = REQUIRED_FIELDS
        .iter()
        .find(|field| !record.data.contains_key(**field))
    {
        return Err(AnalysisError::malformed(
            position,
            order_id_of(record),
            field,
            "is missing",
        ));
    }

    Ok(OrderRecord {
        order_id: order_id_of(record),
        user_id: text_field(position, record, "user_id")?,
        city: text_field(position, record, "city")?,
        restaurant: text_field(position, record, "restaurant")?,
        cuisine: text_field(position, record, "cuisine")?,
        order_amount: numeric_field(position, record, "order_amount")?,
        delivery_time_mins: numeric_field(position, record, "delivery_time_mins")?,
    })
}
