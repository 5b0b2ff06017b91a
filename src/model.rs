use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::{Map, Value};

/// One search hit: named scalar attributes as they arrived from the search system.
pub type Item = Map<String, Value>;

/// Hits for one (system, query) pair, best first.
pub type RankedList = Vec<Item>;

/// A computed statistic; `None` marks a statistic with no eligible data points.
pub type MetricValue = Option<f64>;

static NULL: Value = Value::Null;

/// Reads an attribute, treating a missing key the same as an explicit null.
pub fn attribute<'a>(item: &'a Item, name: &str) -> &'a Value {
    item.get(name).unwrap_or(&NULL)
}

pub fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// The top `k` hits of a ranked list; `None` or `Some(0)` keeps the whole list.
pub fn top_k(ranked: &[Item], k: Option<usize>) -> &[Item] {
    let depth = match k {
        Some(k) if k > 0 => k.min(ranked.len()),
        _ => ranked.len(),
    };
    &ranked[..depth]
}

/// Ordered metric-name to value mapping produced by a field for one ranked list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Metrics {
    entries: Vec<(String, MetricValue)>,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    /// Inserts a metric, overwriting the value in place if the name already exists.
    pub fn insert(&mut self, name: impl Into<String>, value: MetricValue) {
        let name = name.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    /// `None` when the metric is unknown, `Some(None)` when it is known but undefined.
    pub fn get(&self, name: &str) -> Option<MetricValue> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, value)| *value)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|(existing, _)| existing == name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, MetricValue)> {
        self.entries.iter().map(|(name, value)| (name.as_str(), *value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for Metrics {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}
