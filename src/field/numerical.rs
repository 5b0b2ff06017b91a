use serde_json::Value;

use super::MetricField;
use crate::error::{EvalError, Result};
use crate::model::{Item, Metrics, attribute, top_k, value_kind};
use crate::stats::percentile;

pub const DEFAULT_PERCENTILES: [f64; 5] = [1.0, 25.0, 50.0, 75.0, 99.0];

/// Percentiles, total and mean of a continuous attribute.
///
/// Nulls are skipped when `ignore_none` is set; otherwise they enter the sample
/// as `0` and count toward the mean's denominator, but never toward `total`.
#[derive(Debug, Clone, PartialEq)]
pub struct NumericalField {
    name: String,
    percentiles: Vec<f64>,
    ignore_none: bool,
}

impl NumericalField {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            percentiles: DEFAULT_PERCENTILES.to_vec(),
            ignore_none: true,
        }
    }

    /// Replaces the percentile ranks. An empty list restores the defaults.
    pub fn with_percentiles(mut self, percentiles: Vec<f64>) -> Result<Self> {
        if let Some(rank) = percentiles
            .iter()
            .find(|rank| !(0.0..=100.0).contains(*rank))
        {
            return Err(EvalError::value(format!(
                "percentile rank {rank} for field `{}` is outside [0, 100]",
                self.name
            )));
        }
        self.percentiles = if percentiles.is_empty() {
            DEFAULT_PERCENTILES.to_vec()
        } else {
            percentiles
        };
        Ok(self)
    }

    pub fn with_ignore_none(mut self, ignore_none: bool) -> Self {
        self.ignore_none = ignore_none;
        self
    }

    pub fn percentiles(&self) -> &[f64] {
        &self.percentiles
    }

    pub fn ignore_none(&self) -> bool {
        self.ignore_none
    }

    pub fn metric_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .percentiles
            .iter()
            .map(|rank| percentile_metric_name(*rank))
            .collect();
        names.push("total".to_string());
        names.push("mean".to_string());
        names
    }
}

impl MetricField for NumericalField {
    fn name(&self) -> &str {
        &self.name
    }

    fn at_k(&self, ranked: &[Item], k: Option<usize>) -> Result<Metrics> {
        let mut sample = Vec::new();
        let mut total = 0.0;

        for item in top_k(ranked, k) {
            match attribute(item, &self.name) {
                Value::Null => {
                    if !self.ignore_none {
                        sample.push(0.0);
                    }
                }
                Value::Number(number) => {
                    let value = number.as_f64().ok_or_else(|| {
                        EvalError::type_error(format!(
                            "field `{}` holds a number that does not fit in f64: {number}",
                            self.name
                        ))
                    })?;
                    sample.push(value);
                    total += value;
                }
                other => {
                    return Err(EvalError::type_error(format!(
                        "field `{}` expects numeric values, found {}",
                        self.name,
                        value_kind(other)
                    )));
                }
            }
        }

        let mut metrics = Metrics::with_capacity(self.percentiles.len() + 2);
        if sample.is_empty() {
            for name in self.metric_names() {
                metrics.insert(name, None);
            }
            return Ok(metrics);
        }

        let values = percentile(&sample, &self.percentiles);
        for (rank, value) in self.percentiles.iter().zip(values) {
            metrics.insert(percentile_metric_name(*rank), Some(value));
        }
        metrics.insert("total", Some(total));
        metrics.insert("mean", Some(total / sample.len() as f64));
        Ok(metrics)
    }
}

// f64 Display drops the fraction of integral values: 25.0 -> "25".
fn percentile_metric_name(rank: f64) -> String {
    format!("{rank}-percentile")
}
