use std::io::{self, Write};

use anyhow::{Context, Result};
use tracing::info;

use evalcat::RboConfig;

use crate::cli::RboArgs;
use crate::commands::load_input;
use crate::util::write_json_pretty;

/// RBO settings after CLI flags have been layered over the config file.
#[derive(Debug, Clone, PartialEq)]
struct RboSettings {
    identifier: String,
    systems: Vec<String>,
    p: f64,
}

pub fn run(args: RboArgs) -> Result<()> {
    let input = load_input(&args.input)?;
    let settings = resolve_settings(&args, &input.config.rbo)?;
    let table = input.build_table(None)?;

    let systems: Vec<&str> = settings.systems.iter().map(String::as_str).collect();
    let frame = table
        .rank_biased_overlap(&settings.identifier, &systems, settings.p)
        .context("failed to compute rank-biased overlap")?;

    info!(
        identifier = %settings.identifier,
        p = settings.p,
        queries = frame.index().len(),
        "computed rank-biased overlap"
    );

    let mut output = io::BufWriter::new(io::stdout().lock());
    if args.input.json {
        write_json_pretty(output, &input.report(&table, &frame))
    } else {
        write!(output, "{frame}")?;
        output.flush()?;
        Ok(())
    }
}

fn resolve_settings(args: &RboArgs, config: &RboConfig) -> Result<RboSettings> {
    let systems = if args.systems.is_empty() {
        config
            .system_names()
            .context("invalid rbo systems in config")?
    } else {
        args.systems.clone()
    };

    Ok(RboSettings {
        identifier: args
            .identifier
            .clone()
            .unwrap_or_else(|| config.identifier.clone()),
        systems,
        p: args.p.unwrap_or(config.p),
    })
}
