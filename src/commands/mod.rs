pub mod frame;
pub mod rbo;
pub mod summary;

use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

use evalcat::{EvalConfig, ResultTable};

use crate::cli::InputArgs;
use crate::util::{now_utc_string, parse_json, read_bytes, sha256_hex};

pub const REPORT_VERSION: u32 = 1;

#[derive(Debug, Serialize)]
pub struct EvalReport<'a, T: Serialize> {
    pub report_version: u32,
    pub generated_at: String,
    pub results_path: &'a str,
    pub results_sha256: &'a str,
    pub systems: &'a [String],
    pub queries: &'a [String],
    pub payload: T,
}

/// Results document plus the effective configuration for one invocation.
#[derive(Debug)]
pub struct LoadedInput {
    pub config: EvalConfig,
    pub results: Value,
    pub results_path: String,
    pub results_sha256: String,
}

pub fn load_input(args: &InputArgs) -> Result<LoadedInput> {
    let raw = read_bytes(&args.results)?;
    let results_sha256 = sha256_hex(&raw);
    let results: Value = parse_json(&args.results, &raw)?;

    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => EvalConfig::default(),
    };
    apply_input_overrides(&mut config, args);

    info!(
        results = %args.results.display(),
        sha256 = %results_sha256,
        fields = config.fields.len(),
        "loaded results"
    );

    Ok(LoadedInput {
        config,
        results,
        results_path: args.results.display().to_string(),
        results_sha256,
    })
}

fn load_config(path: &Path) -> Result<EvalConfig> {
    let raw = read_bytes(path)?;
    parse_json(path, &raw)
}

fn apply_input_overrides(config: &mut EvalConfig, args: &InputArgs) {
    if !args.queries.is_empty() {
        config.queries = Some(args.queries.clone());
    }
}

impl LoadedInput {
    pub fn build_table(&self, depth: Option<usize>) -> Result<ResultTable> {
        let depth = depth.unwrap_or(self.config.depth);
        let fields = self
            .config
            .build_fields()
            .context("invalid field configuration")?;
        if fields.is_empty() {
            warn!("no fields configured; only rank-biased overlap is available");
        }

        ResultTable::from_json(&self.results, self.config.queries.clone(), fields, depth)
            .with_context(|| format!("failed to build result table from {}", self.results_path))
    }

    pub fn report<'a, T: Serialize>(
        &'a self,
        table: &'a ResultTable,
        payload: T,
    ) -> EvalReport<'a, T> {
        EvalReport {
            report_version: REPORT_VERSION,
            generated_at: now_utc_string(),
            results_path: &self.results_path,
            results_sha256: &self.results_sha256,
            systems: table.corpus().systems(),
            queries: table.corpus().queries(),
            payload,
        }
    }
}
