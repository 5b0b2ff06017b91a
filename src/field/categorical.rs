use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt;
use std::hash::{Hash, Hasher};

use serde_json::Value;
use tracing::debug;

use super::MetricField;
use crate::corpus::ResultCorpus;
use crate::error::{EvalError, Result};
use crate::model::{Item, Metrics, attribute, top_k, value_kind};

pub const UNIQUE_COUNT: &str = "unique_count";

/// A categorical value. Strings, numbers and booleans are distinct labels even
/// when they print alike, so `1` and `"1"` are counted apart while `1` and
/// `1.0` are the same label.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Label {
    Null,
    Bool(bool),
    Number(LabelNumber),
    Text(String),
}

impl Label {
    /// `None` for arrays and objects, which cannot act as labels.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Null => Some(Self::Null),
            Value::Bool(flag) => Some(Self::Bool(*flag)),
            Value::Number(number) => number.as_f64().map(|number| Self::Number(number.into())),
            Value::String(text) => Some(Self::Text(text.clone())),
            Value::Array(_) | Value::Object(_) => None,
        }
    }

    /// Column name used in summary tables. Non-string labels are wrapped in
    /// angle brackets so they stay apart from text labels that print alike.
    pub fn column_name(&self) -> String {
        match self {
            Self::Null => "<null>".to_string(),
            Self::Bool(flag) => format!("<{flag}>"),
            Self::Number(number) => format!("<{number}>"),
            Self::Text(text) => text.clone(),
        }
    }

    fn is_blank(&self) -> bool {
        match self {
            Self::Null => true,
            Self::Text(text) => text.is_empty(),
            Self::Bool(_) | Self::Number(_) => false,
        }
    }
}

impl From<&str> for Label {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for Label {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<bool> for Label {
    fn from(flag: bool) -> Self {
        Self::Bool(flag)
    }
}

impl From<f64> for Label {
    fn from(number: f64) -> Self {
        Self::Number(number.into())
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.column_name())
    }
}

/// Totally ordered `f64` for numeric labels. Negative zero is folded into zero.
#[derive(Debug, Clone, Copy)]
pub struct LabelNumber(f64);

impl LabelNumber {
    pub fn value(self) -> f64 {
        self.0
    }
}

impl From<f64> for LabelNumber {
    fn from(number: f64) -> Self {
        Self(if number == 0.0 { 0.0 } else { number })
    }
}

impl PartialEq for LabelNumber {
    fn eq(&self, other: &Self) -> bool {
        self.0.to_bits() == other.0.to_bits()
    }
}

impl Eq for LabelNumber {}

impl PartialOrd for LabelNumber {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for LabelNumber {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl Hash for LabelNumber {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.to_bits().hash(state);
    }
}

impl fmt::Display for LabelNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Label frequencies and distinct-label count of a discrete attribute.
///
/// Frequencies are normalised by the number of hits actually counted, so hits
/// whose value falls outside the label set do not dilute them. With
/// `ignore_none` unset, such hits and nulls are pooled under the null label.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoricalField {
    name: String,
    labels: Option<BTreeSet<Label>>,
    ignore_none: bool,
}

impl CategoricalField {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            labels: None,
            ignore_none: true,
        }
    }

    /// Fixes the label set up front, skipping corpus discovery.
    pub fn with_labels<I, L>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = L>,
        L: Into<Label>,
    {
        self.labels = Some(labels.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_ignore_none(mut self, ignore_none: bool) -> Self {
        self.ignore_none = ignore_none;
        self
    }

    pub fn labels(&self) -> Option<&BTreeSet<Label>> {
        self.labels.as_ref()
    }

    pub fn ignore_none(&self) -> bool {
        self.ignore_none
    }

    /// Returns a field whose labels are every non-blank value of this attribute
    /// across the corpus, plus the null label when nulls are not ignored. A field
    /// that already has a non-empty label set is returned unchanged.
    pub fn with_discovered_labels(self, corpus: &ResultCorpus) -> Self {
        if self.labels.as_ref().is_some_and(|labels| !labels.is_empty()) {
            return self;
        }

        let mut labels = BTreeSet::new();
        for item in corpus.items() {
            match Label::from_value(attribute(item, &self.name)) {
                Some(label) if !label.is_blank() => {
                    labels.insert(label);
                }
                _ => {}
            }
        }
        if !self.ignore_none {
            labels.insert(Label::Null);
        }

        debug!(field = %self.name, labels = labels.len(), "discovered categorical labels");
        Self {
            labels: Some(labels),
            ..self
        }
    }

    fn counters(&self) -> Result<BTreeMap<Label, usize>> {
        let mut counters: BTreeMap<Label, usize> = self
            .labels
            .iter()
            .flatten()
            .map(|label| (label.clone(), 0))
            .collect();
        if !self.ignore_none {
            counters.entry(Label::Null).or_insert(0);
        }

        let mut columns = HashSet::with_capacity(counters.len() + 1);
        columns.insert(UNIQUE_COUNT.to_string());
        for label in counters.keys() {
            let column = label.column_name();
            if !columns.insert(column.clone()) {
                return Err(EvalError::config(format!(
                    "label {label:?} of field `{}` collides with column `{column}`",
                    self.name
                )));
            }
        }
        Ok(counters)
    }
}

impl MetricField for CategoricalField {
    fn name(&self) -> &str {
        &self.name
    }

    fn at_k(&self, ranked: &[Item], k: Option<usize>) -> Result<Metrics> {
        let mut counters = self.counters()?;
        let mut metrics = Metrics::with_capacity(counters.len() + 1);

        if ranked.is_empty() {
            for label in counters.keys() {
                metrics.insert(label.column_name(), None);
            }
            metrics.insert(UNIQUE_COUNT, None);
            return Ok(metrics);
        }

        let mut seen = BTreeSet::new();
        let mut counted = 0usize;
        for item in top_k(ranked, k) {
            let value = attribute(item, &self.name);
            let label = Label::from_value(value).ok_or_else(|| {
                EvalError::type_error(format!(
                    "field `{}` expects scalar values, found {}",
                    self.name,
                    value_kind(value)
                ))
            })?;

            let bucket = if counters.contains_key(&label) {
                label
            } else if !self.ignore_none {
                Label::Null
            } else {
                continue;
            };
            if let Some(count) = counters.get_mut(&bucket) {
                *count += 1;
            }
            seen.insert(bucket);
            counted += 1;
        }

        for (label, count) in &counters {
            let frequency = (counted > 0).then(|| *count as f64 / counted as f64);
            metrics.insert(label.column_name(), frequency);
        }
        metrics.insert(UNIQUE_COUNT, Some(seen.len() as f64));
        Ok(metrics)
    }
}
