use std::fmt;

use serde::Serialize;

use crate::error::{EvalError, Result};
use crate::model::{MetricValue, Metrics};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryRow {
    pub system: String,
    pub query: String,
    pub values: Vec<MetricValue>,
}

/// Metrics of one field for every (system, query) pair, rows ordered by system then query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryTable {
    field: String,
    columns: Vec<String>,
    rows: Vec<SummaryRow>,
}

impl SummaryTable {
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            columns: Vec::new(),
            rows: Vec::new(),
        }
    }

    /// Appends one cell's metrics. The first row fixes the column set; later rows
    /// must carry the same metric names and are re-ordered to match.
    pub fn push_row(
        &mut self,
        system: impl Into<String>,
        query: impl Into<String>,
        metrics: Metrics,
    ) -> Result<()> {
        let system = system.into();
        let query = query.into();

        if self.rows.is_empty() {
            self.columns = metrics.names().map(str::to_string).collect();
        } else if metrics.len() != self.columns.len()
            || !self.columns.iter().all(|column| metrics.contains(column))
        {
            return Err(EvalError::config(format!(
                "field `{}` produced a different metric set for `{system}` / `{query}`",
                self.field
            )));
        }

        let values = self
            .columns
            .iter()
            .map(|column| metrics.get(column).flatten())
            .collect();
        self.rows.push(SummaryRow {
            system,
            query,
            values,
        });
        Ok(())
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[SummaryRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, metric: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == metric)
    }

    pub fn row(&self, system: &str, query: &str) -> Option<&SummaryRow> {
        self.rows
            .iter()
            .find(|row| row.system == system && row.query == query)
    }

    /// `None` when the cell or metric does not exist, `Some(None)` when it is undefined.
    pub fn value(&self, system: &str, query: &str, metric: &str) -> Option<MetricValue> {
        let column = self.column_index(metric)?;
        self.row(system, query).map(|row| row.values[column])
    }
}

impl fmt::Display for SummaryTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut header = vec!["system".to_string(), "query".to_string()];
        header.extend(self.columns.iter().cloned());

        let body = self
            .rows
            .iter()
            .map(|row| {
                let mut cells = vec![row.system.clone(), row.query.clone()];
                cells.extend(row.values.iter().map(|value| format_cell(*value)));
                cells
            })
            .collect::<Vec<_>>();

        write_grid(f, &header, &body, 2)
    }
}

/// Two-dimensional view over a summary table: labelled rows and columns of metric values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Frame {
    index_name: String,
    index: Vec<String>,
    columns: Vec<String>,
    data: Vec<Vec<MetricValue>>,
}

impl Frame {
    pub fn new(
        index_name: impl Into<String>,
        index: Vec<String>,
        columns: Vec<String>,
        data: Vec<Vec<MetricValue>>,
    ) -> Result<Self> {
        if data.len() != index.len() || data.iter().any(|row| row.len() != columns.len()) {
            return Err(EvalError::value(format!(
                "frame data must be {} rows of {} values",
                index.len(),
                columns.len()
            )));
        }
        Ok(Self {
            index_name: index_name.into(),
            index,
            columns,
            data,
        })
    }

    pub fn index_name(&self) -> &str {
        &self.index_name
    }

    pub fn index(&self) -> &[String] {
        &self.index
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn data(&self) -> &[Vec<MetricValue>] {
        &self.data
    }

    pub fn row(&self, label: &str) -> Option<&[MetricValue]> {
        let position = self.index.iter().position(|name| name == label)?;
        Some(&self.data[position])
    }

    pub fn column(&self, label: &str) -> Option<Vec<MetricValue>> {
        let position = self.columns.iter().position(|name| name == label)?;
        Some(self.data.iter().map(|row| row[position]).collect())
    }

    /// `None` when either label is unknown, `Some(None)` when the cell is undefined.
    pub fn get(&self, row: &str, column: &str) -> Option<MetricValue> {
        let position = self.columns.iter().position(|name| name == column)?;
        self.row(row).map(|values| values[position])
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut header = vec![self.index_name.clone()];
        header.extend(self.columns.iter().cloned());

        let body = self
            .index
            .iter()
            .zip(&self.data)
            .map(|(label, values)| {
                let mut cells = vec![label.clone()];
                cells.extend(values.iter().map(|value| format_cell(*value)));
                cells
            })
            .collect::<Vec<_>>();

        write_grid(f, &header, &body, 1)
    }
}

pub fn format_cell(value: MetricValue) -> String {
    match value {
        None => "-".to_string(),
        Some(value) if value.is_finite() => {
            let text = format!("{value:.6}");
            text.trim_end_matches('0').trim_end_matches('.').to_string()
        }
        Some(value) => value.to_string(),
    }
}

// Label columns are left-aligned, value columns right-aligned.
fn write_grid(
    f: &mut fmt::Formatter<'_>,
    header: &[String],
    body: &[Vec<String>],
    label_columns: usize,
) -> fmt::Result {
    let mut widths: Vec<usize> = header.iter().map(|cell| cell.chars().count()).collect();
    for row in body {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    write_row(f, header, &widths, label_columns)?;
    for row in body {
        write_row(f, row, &widths, label_columns)?;
    }
    Ok(())
}

fn write_row(
    f: &mut fmt::Formatter<'_>,
    cells: &[String],
    widths: &[usize],
    label_columns: usize,
) -> fmt::Result {
    for (position, (cell, width)) in cells.iter().zip(widths).enumerate() {
        let width = *width;
        if position > 0 {
            write!(f, "  ")?;
        }
        if position < label_columns {
            write!(f, "{cell:<width$}")?;
        } else {
            write!(f, "{cell:>width$}")?;
        }
    }
    writeln!(f)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics(entries: &[(&str, MetricValue)]) -> Metrics {
        let mut metrics = Metrics::new();
        for (name, value) in entries {
            metrics.insert(*name, *value);
        }
        metrics
    }

    #[test]
    fn first_row_fixes_columns_and_later_rows_are_reordered() {
        let mut table = SummaryTable::new("price");
        table
            .push_row("A", "q1", metrics(&[("total", Some(3.0)), ("mean", Some(1.5))]))
            .expect("first row should fit");
        table
            .push_row("A", "q2", metrics(&[("mean", None), ("total", None)]))
            .expect("reordered row should fit");

        assert_eq!(table.columns(), ["total", "mean"]);
        assert_eq!(table.value("A", "q1", "mean"), Some(Some(1.5)));
        assert_eq!(table.value("A", "q2", "total"), Some(None));
        assert_eq!(table.value("A", "q3", "total"), None);
    }

    #[test]
    fn rows_with_a_different_metric_set_are_rejected() {
        let mut table = SummaryTable::new("price");
        table
            .push_row("A", "q1", metrics(&[("total", Some(3.0))]))
            .expect("first row should fit");
        let error = table
            .push_row("A", "q2", metrics(&[("mean", Some(1.0))]))
            .expect_err("mismatched row should fail");
        assert_eq!(error.kind(), "config");
    }

    #[test]
    fn frame_rejects_ragged_data() {
        let error = Frame::new(
            "system",
            vec!["A".to_string()],
            vec!["q1".to_string(), "q2".to_string()],
            vec![vec![Some(1.0)]],
        )
        .expect_err("ragged frame should fail");
        assert_eq!(error.kind(), "value");
    }

    #[test]
    fn frame_lookups_by_label() {
        let frame = Frame::new(
            "system",
            vec!["A".to_string(), "B".to_string()],
            vec!["q1".to_string()],
            vec![vec![Some(1.0)], vec![None]],
        )
        .expect("frame should build");

        assert_eq!(frame.get("A", "q1"), Some(Some(1.0)));
        assert_eq!(frame.get("B", "q1"), Some(None));
        assert_eq!(frame.get("C", "q1"), None);
        assert_eq!(frame.column("q1"), Some(vec![Some(1.0), None]));
    }

    #[test]
    fn text_rendering_aligns_columns_and_marks_undefined_cells() {
        let frame = Frame::new(
            "query",
            vec!["fruit".to_string(), "vegetables".to_string()],
            vec!["total".to_string(), "mean".to_string()],
            vec![vec![Some(1.8), Some(0.9)], vec![None, None]],
        )
        .expect("frame should build");

        let rendered = frame.to_string();
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines[0], "query       total  mean");
        assert_eq!(lines[1], "fruit         1.8   0.9");
        assert_eq!(lines[2], "vegetables      -     -");
    }

    #[test]
    fn format_cell_trims_trailing_zeros() {
        assert_eq!(format_cell(Some(2.0)), "2");
        assert_eq!(format_cell(Some(1.0 / 3.0)), "0.333333");
        assert_eq!(format_cell(Some(0.5)), "0.5");
        assert_eq!(format_cell(None), "-");
    }
}
