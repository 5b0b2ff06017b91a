use std::collections::{HashMap, HashSet};

use serde_json::Value;
use tracing::{debug, info};

use crate::corpus::ResultCorpus;
use crate::error::{EvalError, Result};
use crate::field::{Field, MetricField};
use crate::model::{Item, MetricValue};
use crate::rbo::{rbo, validate_persistence};
use crate::table::{Frame, SummaryTable};

pub const DEFAULT_DEPTH: usize = 10;
pub const DEFAULT_PERSISTENCE: f64 = 0.9;
pub const DEFAULT_IDENTIFIER: &str = "id";
pub const RBO_COLUMNS: [&str; 3] = ["rbo_min", "rbo_res", "rbo_ext"];

/// Metrics of every registered field over a corpus, plus reshaped views and
/// rank-biased overlap between systems.
#[derive(Debug, Clone)]
pub struct ResultTable {
    corpus: ResultCorpus,
    fields: Vec<Field>,
    summaries: HashMap<String, SummaryTable>,
    depth: usize,
}

impl ResultTable {
    pub fn new(corpus: ResultCorpus, fields: Vec<Field>, depth: usize) -> Result<Self> {
        let mut table = Self {
            corpus,
            fields: Vec::new(),
            summaries: HashMap::new(),
            depth,
        };
        table.add_fields(fields, depth, false)?;

        info!(
            systems = table.corpus.systems().len(),
            queries = table.corpus.queries().len(),
            fields = table.fields.len(),
            depth,
            "built result table"
        );
        Ok(table)
    }

    /// Builds the corpus from a raw `system -> query -> [item]` JSON document first.
    pub fn from_json(
        results: &Value,
        queries: Option<Vec<String>>,
        fields: Vec<Field>,
        depth: usize,
    ) -> Result<Self> {
        Self::new(ResultCorpus::from_json(results, queries)?, fields, depth)
    }

    /// Registers more fields and computes their summaries at depth `k`.
    ///
    /// A name that is already registered (or repeated in `fields`) is rejected
    /// unless `replace` is set, in which case the newer field wins. Nothing is
    /// registered if any field fails.
    pub fn add_fields(&mut self, fields: Vec<Field>, k: usize, replace: bool) -> Result<()> {
        if !replace {
            let mut incoming = HashSet::with_capacity(fields.len());
            for field in &fields {
                let name = field.name();
                if self.summaries.contains_key(name) || !incoming.insert(name) {
                    return Err(EvalError::config(format!(
                        "field `{name}` already exists; pass replace to override it"
                    )));
                }
            }
        }

        let mut computed = Vec::with_capacity(fields.len());
        for field in fields {
            let field = field.prepared(&self.corpus);
            let summary = field.compute_metrics(&self.corpus, Some(k))?;
            computed.push((field, summary));
        }

        for (field, summary) in computed {
            let name = field.name().to_string();
            match self.fields.iter().position(|existing| existing.name() == name) {
                Some(position) => {
                    debug!(field = %name, "replacing field");
                    self.fields[position] = field;
                }
                None => self.fields.push(field),
            }
            self.summaries.insert(name, summary);
        }
        Ok(())
    }

    pub fn corpus(&self) -> &ResultCorpus {
        &self.corpus
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|field| field.name()).collect()
    }

    /// Depth used for the fields passed at construction.
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn summary(&self, field: &str) -> Result<&SummaryTable> {
        self.summaries
            .get(field)
            .ok_or_else(|| EvalError::lookup(format!("field `{field}` is not in the result table")))
    }

    /// Rows are queries, columns are the field's metrics, for one system.
    pub fn query_metric_frame(&self, field: &str, system: &str) -> Result<Frame> {
        if !self.corpus.has_system(system) {
            return Err(EvalError::lookup(format!(
                "system `{system}` is not in the result table"
            )));
        }
        let summary = self.summary(field)?;

        let (index, data) = summary
            .rows()
            .iter()
            .filter(|row| row.system == system)
            .map(|row| (row.query.clone(), row.values.clone()))
            .unzip();
        Frame::new("query", index, summary.columns().to_vec(), data)
    }

    /// Rows are systems, columns are the field's metrics, for one query.
    pub fn system_metric_frame(&self, field: &str, query: &str) -> Result<Frame> {
        if !self.corpus.has_query(query) {
            return Err(EvalError::lookup(format!(
                "query `{query}` is not in the result table"
            )));
        }
        let summary = self.summary(field)?;

        let (index, data) = summary
            .rows()
            .iter()
            .filter(|row| row.query == query)
            .map(|row| (row.system.clone(), row.values.clone()))
            .unzip();
        Frame::new("system", index, summary.columns().to_vec(), data)
    }

    /// Rows are systems, columns are queries, values are one metric of the field.
    pub fn system_query_frame(&self, field: &str, metric: &str) -> Result<Frame> {
        let summary = self.summary(field)?;
        let column = summary.column_index(metric).ok_or_else(|| {
            EvalError::lookup(format!("metric `{metric}` is not computed for field `{field}`"))
        })?;

        // Summaries are computed system-major over the corpus cells.
        let queries = self.corpus.queries().len();
        let rows = summary.rows();
        if rows.len() != self.corpus.systems().len() * queries {
            return Err(EvalError::state(format!(
                "summary of field `{field}` has {} rows for {} systems and {queries} queries",
                rows.len(),
                self.corpus.systems().len()
            )));
        }
        let data = (0..self.corpus.systems().len())
            .map(|system| {
                rows[system * queries..(system + 1) * queries]
                    .iter()
                    .map(|row| row.values[column])
                    .collect::<Vec<MetricValue>>()
            })
            .collect();
        Frame::new(
            "system",
            self.corpus.systems().to_vec(),
            self.corpus.queries().to_vec(),
            data,
        )
    }

    /// RBO between two systems for every query, as columns `rbo_min, rbo_res, rbo_ext`.
    ///
    /// `systems` names the pair to compare; an empty slice compares the first two
    /// systems of the corpus. A query where either system returned nothing gets
    /// undefined scores.
    pub fn rank_biased_overlap(&self, identifier: &str, systems: &[&str], p: f64) -> Result<Frame> {
        if self.corpus.systems().len() < 2 {
            return Err(EvalError::state(format!(
                "rbo compares 2 systems but the result table has {}",
                self.corpus.systems().len()
            )));
        }

        let (first, second) = match systems {
            [] => (
                self.corpus.systems()[0].as_str(),
                self.corpus.systems()[1].as_str(),
            ),
            [first, second] => (*first, *second),
            other => {
                return Err(EvalError::value(format!(
                    "rbo compares exactly 2 systems, got {}",
                    other.len()
                )));
            }
        };
        validate_persistence(p)?;
        let first_lists = self.corpus.system_lists(first)?;
        let second_lists = self.corpus.system_lists(second)?;

        let mut data = Vec::with_capacity(self.corpus.queries().len());
        let cells = self.corpus.queries().iter().zip(first_lists.iter().zip(second_lists));
        for (query, (first_list, second_list)) in cells {
            let left = identifiers(first_list, identifier, first, query)?;
            let right = identifiers(second_list, identifier, second, query)?;
            if left.is_empty() || right.is_empty() {
                data.push(vec![None; RBO_COLUMNS.len()]);
            } else {
                data.push(rbo(&left, &right, p)?.as_row());
            }
        }

        debug!(first, second, identifier, p, "computed rank-biased overlap");
        Frame::new(
            "query",
            self.corpus.queries().to_vec(),
            RBO_COLUMNS.iter().map(|column| column.to_string()).collect(),
            data,
        )
    }
}

// Compact JSON text keeps "1" and 1 distinct while making identifiers hashable.
fn identifiers(
    ranked: &[Item],
    identifier: &str,
    system: &str,
    query: &str,
) -> Result<Vec<String>> {
    ranked
        .iter()
        .enumerate()
        .map(|(rank, item)| {
            item.get(identifier).map(Value::to_string).ok_or_else(|| {
                EvalError::lookup(format!(
                    "item at rank {} of `{system}` / `{query}` has no `{identifier}` attribute",
                    rank + 1
                ))
            })
        })
        .collect()
}

/// Reads an optional system pair from dynamic input: `null` for the default pair,
/// otherwise an array of system names.
pub fn parse_system_names(value: &Value) -> Result<Vec<String>> {
    match value {
        Value::Null => Ok(Vec::new()),
        Value::Array(entries) => entries
            .iter()
            .map(|entry| {
                entry.as_str().map(str::to_string).ok_or_else(|| {
                    EvalError::type_error("systems must be a list of system names")
                })
            })
            .collect(),
        _ => Err(EvalError::type_error(
            "systems must be a list containing the names of 2 systems",
        )),
    }
}

#[cfg(test)]
mod tests;
