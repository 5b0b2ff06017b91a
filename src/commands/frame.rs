use std::io::{self, Write};

use anyhow::{Result, bail};
use tracing::info;

use evalcat::{Frame, ResultTable};

use crate::cli::FrameArgs;
use crate::commands::load_input;
use crate::util::write_json_pretty;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slice<'a> {
    System(&'a str),
    Query(&'a str),
    Metric(&'a str),
}

pub fn run(args: FrameArgs) -> Result<()> {
    let input = load_input(&args.input)?;
    let table = input.build_table(args.depth)?;
    let frame = build_frame(&table, &args.field, slice(&args)?)?;

    info!(
        field = %args.field,
        rows = frame.index().len(),
        columns = frame.columns().len(),
        "built frame"
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

fn slice(args: &FrameArgs) -> Result<Slice<'_>> {
    match (&args.system, &args.by_query, &args.metric) {
        (Some(system), None, None) => Ok(Slice::System(system)),
        (None, Some(query), None) => Ok(Slice::Query(query)),
        (None, None, Some(metric)) => Ok(Slice::Metric(metric)),
        _ => bail!("pass exactly one of --system, --query or --metric"),
    }
}

fn build_frame(table: &ResultTable, field: &str, slice: Slice<'_>) -> Result<Frame> {
    let frame = match slice {
        Slice::System(system) => table.query_metric_frame(field, system)?,
        Slice::Query(query) => table.system_metric_frame(field, query)?,
        Slice::Metric(metric) => table.system_query_frame(field, metric)?,
    };
    Ok(frame)
}
