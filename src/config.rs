use serde::Deserialize;
use serde_json::Value;

use crate::error::{EvalError, Result};
use crate::field::{CategoricalField, Field, Label, NumericalField};
use crate::model::value_kind;
use crate::result_table::{
    DEFAULT_DEPTH, DEFAULT_IDENTIFIER, DEFAULT_PERSISTENCE, parse_system_names,
};

/// Evaluation settings loaded from a JSON document.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EvalConfig {
    pub depth: usize,
    pub queries: Option<Vec<String>>,
    pub fields: Vec<FieldConfig>,
    pub rbo: RboConfig,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            depth: DEFAULT_DEPTH,
            queries: None,
            fields: Vec::new(),
            rbo: RboConfig::default(),
        }
    }
}

impl EvalConfig {
    pub fn build_fields(&self) -> Result<Vec<Field>> {
        self.fields.iter().map(FieldConfig::build).collect()
    }
}

// `name` stays untyped so a non-string name reports as a type error rather
// than a generic parse failure.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldConfig {
    Numerical {
        name: Value,
        #[serde(default)]
        percentiles: Option<Vec<f64>>,
        #[serde(default = "default_ignore_none")]
        ignore_none: bool,
    },
    Categorical {
        name: Value,
        #[serde(default)]
        labels: Option<Vec<Value>>,
        #[serde(default = "default_ignore_none")]
        ignore_none: bool,
    },
}

fn default_ignore_none() -> bool {
    true
}

impl FieldConfig {
    pub fn build(&self) -> Result<Field> {
        match self {
            Self::Numerical {
                name,
                percentiles,
                ignore_none,
            } => {
                let mut field = NumericalField::new(field_name(name)?).with_ignore_none(*ignore_none);
                if let Some(percentiles) = percentiles {
                    field = field.with_percentiles(percentiles.clone())?;
                }
                Ok(field.into())
            }
            Self::Categorical {
                name,
                labels,
                ignore_none,
            } => {
                let name = field_name(name)?;
                let mut field = CategoricalField::new(name.as_str()).with_ignore_none(*ignore_none);
                if let Some(labels) = labels {
                    let labels = labels
                        .iter()
                        .map(|value| {
                            Label::from_value(value).ok_or_else(|| {
                                EvalError::type_error(format!(
                                    "labels of field `{name}` must be scalars, found {}",
                                    value_kind(value)
                                ))
                            })
                        })
                        .collect::<Result<Vec<_>>>()?;
                    field = field.with_labels(labels);
                }
                Ok(field.into())
            }
        }
    }
}

fn field_name(value: &Value) -> Result<String> {
    value.as_str().map(str::to_string).ok_or_else(|| {
        EvalError::type_error(format!(
            "field name must be a string, found {}",
            value_kind(value)
        ))
    })
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RboConfig {
    pub identifier: String,
    pub systems: Value,
    pub p: f64,
}

impl Default for RboConfig {
    fn default() -> Self {
        Self {
            identifier: DEFAULT_IDENTIFIER.to_string(),
            systems: Value::Null,
            p: DEFAULT_PERSISTENCE,
        }
    }
}

impl RboConfig {
    pub fn system_names(&self) -> Result<Vec<String>> {
        parse_system_names(&self.systems)
    }
}
