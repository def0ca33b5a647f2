use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// A loosely typed input row, column name to value, as handed over by a record source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub data: HashMap<String, serde_json::Value>,
    /// Column names in source order. Empty when the source has no notion of column order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub columns: Vec<String>,
    /// Cell text exactly as read, for sources that type their cells. Keys group on this.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub source_text: HashMap<String, String>,
}

impl Record {
    pub fn new(data: HashMap<String, serde_json::Value>) -> Self {
        Self::with_columns(data, Vec::new())
    }

    pub fn with_columns(data: HashMap<String, serde_json::Value>, columns: Vec<String>) -> Self {
        Self {
            data,
            columns,
            source_text: HashMap::new(),
        }
    }

    pub fn with_source_text(mut self, source_text: HashMap<String, String>) -> Self {
        self.source_text = source_text;
        self
    }

    /// The cell as originally written, when the source kept it.
    pub fn source_text(&self, field: &str) -> Option<&str> {
        self.source_text.get(field).map(String::as_str)
    }

    /// Column names in the order they should be displayed.
    pub fn ordered_columns(&self) -> Vec<String> {
        if !self.columns.is_empty() {
            return self.columns.clone();
        }
        let mut keys: Vec<String> = self.data.keys().cloned().collect();
        keys.sort();
        keys
    }
}

/// Columns every order row must carry.
pub const REQUIRED_FIELDS: [&str; 6] = [
    "city",
    "cuisine",
    "restaurant",
    "user_id",
    "order_amount",
    "delivery_time_mins",
];

/// One food order, typed.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderRecord {
    pub order_id: Option<String>,
    pub user_id: String,
    pub city: String,
    pub restaurant: String,
    pub cuisine: String,
    pub order_amount: f64,
    pub delivery_time_mins: f64,
}

/// A flat cell value in a result table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Null,
    Integer(i64),
    Float(f64),
    Text(String),
}

impl Scalar {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Scalar::Integer(i) => Some(*i as f64),
            Scalar::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Flattens a JSON value. Arrays and objects are kept as their JSON text.
    pub fn from_json(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Scalar::Null,
            serde_json::Value::Bool(b) => Scalar::Text(b.to_string()),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Scalar::Integer(i),
                None => n.as_f64().map(Scalar::Float).unwrap_or(Scalar::Null),
            },
            serde_json::Value::String(s) => Scalar::Text(s.clone()),
            other => Scalar::Text(other.to_string()),
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Null => Ok(()),
            Scalar::Integer(i) => write!(f, "{}", i),
            Scalar::Float(v) => write!(f, "{}", v),
            Scalar::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Scalar::Text(value.to_string())
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Scalar::Text(value)
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Scalar::Integer(value)
    }
}

impl From<f64> for Scalar {
    fn from(value: f64) -> Self {
        Scalar::Float(value)
    }
}

pub type Row = BTreeMap<String, Scalar>;

/// An ordered result table. `columns` fixes display order, rows are flat maps.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResultTable {
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
}

impl ResultTable {
    pub fn new(columns: &[&str]) -> Self {
        Self {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    pub fn push(&mut self, row: Row) {
        self.rows.push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Values of one column, in row order. Missing cells come back as `Scalar::Null`.
    pub fn column(&self, name: &str) -> Vec<Scalar> {
        self.rows
            .iter()
            .map(|row| row.get(name).cloned().unwrap_or(Scalar::Null))
            .collect()
    }
}

// 表格序列化成物件陣列，方便模板直接迭代
impl Serialize for ResultTable {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.rows.serialize(serializer)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ResultKey {
    RawData,
    OrdersPerCity,
    AvgAmountCity,
    AvgDeliveryCity,
    CuisinePopularity,
    TopRestaurants,
    HighValueCustomers,
}

impl ResultKey {
    pub const ALL: [ResultKey; 7] = [
        ResultKey::RawData,
        ResultKey::OrdersPerCity,
        ResultKey::AvgAmountCity,
        ResultKey::AvgDeliveryCity,
        ResultKey::CuisinePopularity,
        ResultKey::TopRestaurants,
        ResultKey::HighValueCustomers,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ResultKey::RawData => "raw_data",
            ResultKey::OrdersPerCity => "orders_per_city",
            ResultKey::AvgAmountCity => "avg_amount_city",
            ResultKey::AvgDeliveryCity => "avg_delivery_city",
            ResultKey::CuisinePopularity => "cuisine_popularity",
            ResultKey::TopRestaurants => "top_restaurants",
            ResultKey::HighValueCustomers => "high_value_customers",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            ResultKey::RawData => "Raw Orders",
            ResultKey::OrdersPerCity => "Total Orders per City",
            ResultKey::AvgAmountCity => "Average Order Amount per City",
            ResultKey::AvgDeliveryCity => "Average Delivery Time per City",
            ResultKey::CuisinePopularity => "Cuisine Popularity",
            ResultKey::TopRestaurants => "Top Restaurants by Revenue",
            ResultKey::HighValueCustomers => "High-Value Customers",
        }
    }
}

impl fmt::Display for ResultKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The seven tables produced by one analysis call.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResultBundle {
    pub raw_data: ResultTable,
    pub orders_per_city: ResultTable,
    pub avg_amount_city: ResultTable,
    pub avg_delivery_city: ResultTable,
    pub cuisine_popularity: ResultTable,
    pub top_restaurants: ResultTable,
    pub high_value_customers: ResultTable,
}

impl ResultBundle {
    pub fn get(&self, key: ResultKey) -> &ResultTable {
        match key {
            ResultKey::RawData => &self.raw_data,
            ResultKey::OrdersPerCity => &self.orders_per_city,
            ResultKey::AvgAmountCity => &self.avg_amount_city,
            ResultKey::AvgDeliveryCity => &self.avg_delivery_city,
            ResultKey::CuisinePopularity => &self.cuisine_popularity,
            ResultKey::TopRestaurants => &self.top_restaurants,
            ResultKey::HighValueCustomers => &self.high_value_customers,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (ResultKey, &ResultTable)> {
        ResultKey::ALL.into_iter().map(move |key| (key, self.get(key)))
    }

    pub fn record_count(&self) -> usize {
        self.raw_data.len()
    }
}

impl Serialize for ResultBundle {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;

        let mut map = serializer.serialize_map(Some(ResultKey::ALL.len()))?;
        for (key, table) in self.iter() {
            map.serialize_entry(key.as_str(), table)?;
        }
        map.end()
    }
}
