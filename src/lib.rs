//! Comparative evaluation of ranked search results.
//!
//! A [`ResultCorpus`] holds every system's ranked hits for a shared query set.
//! [`ResultTable`] runs one or more [`Field`]s over it to build per-field
//! summary tables keyed by (system, query), reshapes them into [`Frame`]s, and
//! compares two systems' rankings with rank-biased overlap.
//!
//! ```ignore
//! use evalcat::{Field, ResultTable};
//!
//! let table = ResultTable::from_json(
//!     &results,
//!     None,
//!     vec![Field::numerical("price"), Field::categorical("category")],
//!     10,
//! )?;
//! println!("{}", table.query_metric_frame("price", "new system")?);
//! println!("{}", table.rank_biased_overlap("id", &["old system", "new system"], 0.9)?);
//! ```

pub mod config;
pub mod corpus;
pub mod error;
pub mod field;
pub mod model;
pub mod rbo;
pub mod result_table;
pub mod stats;
pub mod table;

pub use config::{EvalConfig, FieldConfig, RboConfig};
pub use corpus::ResultCorpus;
pub use error::{EvalError, Result};
pub use field::{CategoricalField, Field, Label, LabelNumber, MetricField, NumericalField};
pub use model::{Item, MetricValue, Metrics, RankedList};
pub use rbo::RboScores;
pub use result_table::ResultTable;
pub use table::{Frame, SummaryRow, SummaryTable};
