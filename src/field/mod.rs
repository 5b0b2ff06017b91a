//! Per-attribute metric strategies.
//!
//! A field reads one named attribute from every hit of a ranked list and reduces
//! the top `k` hits to a flat [`Metrics`] mapping. [`MetricField::compute_metrics`]
//! fans that out over every cell of a corpus.

mod categorical;
mod numerical;

use std::fmt;

use tracing::debug;

use crate::corpus::ResultCorpus;
use crate::error::Result;
use crate::model::{Item, Metrics};
use crate::table::SummaryTable;

pub use categorical::{CategoricalField, Label, LabelNumber, UNIQUE_COUNT};
pub use numerical::{DEFAULT_PERCENTILES, NumericalField};

pub trait MetricField {
    /// The item attribute this field reads; also the key of its summary table.
    fn name(&self) -> &str;

    /// Metrics for the top `k` hits (`None` keeps the whole list).
    fn at_k(&self, ranked: &[Item], k: Option<usize>) -> Result<Metrics>;

    /// One summary row per (system, query) cell, systems outer and queries inner.
    fn compute_metrics(&self, corpus: &ResultCorpus, k: Option<usize>) -> Result<SummaryTable> {
        let mut table = SummaryTable::new(self.name());
        for (system, query, ranked) in corpus.cells() {
            table.push_row(system, query, self.at_k(ranked, k)?)?;
        }

        debug!(
            field = %self.name(),
            rows = table.len(),
            columns = table.columns().len(),
            "computed field metrics"
        );
        Ok(table)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Field {
    Numerical(NumericalField),
    Categorical(CategoricalField),
}

impl Field {
    pub fn numerical(name: impl Into<String>) -> Self {
        Self::Numerical(NumericalField::new(name))
    }

    pub fn categorical(name: impl Into<String>) -> Self {
        Self::Categorical(CategoricalField::new(name))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Numerical(_) => "numerical",
            Self::Categorical(_) => "categorical",
        }
    }

    /// Resolves anything the field needs from the whole corpus before per-cell
    /// computation. Only categorical fields without explicit labels change.
    pub fn prepared(self, corpus: &ResultCorpus) -> Self {
        match self {
            Self::Categorical(field) => Self::Categorical(field.with_discovered_labels(corpus)),
            other => other,
        }
    }
}

impl MetricField for Field {
    fn name(&self) -> &str {
        match self {
            Self::Numerical(field) => field.name(),
            Self::Categorical(field) => field.name(),
        }
    }

    fn at_k(&self, ranked: &[Item], k: Option<usize>) -> Result<Metrics> {
        match self {
            Self::Numerical(field) => field.at_k(ranked, k),
            Self::Categorical(field) => field.at_k(ranked, k),
        }
    }
}

impl From<NumericalField> for Field {
    fn from(field: NumericalField) -> Self {
        Self::Numerical(field)
    }
}

impl From<CategoricalField> for Field {
    fn from(field: CategoricalField) -> Self {
        Self::Categorical(field)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
