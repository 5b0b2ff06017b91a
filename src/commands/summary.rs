use std::io::{self, Write};

use anyhow::Result;
use tracing::info;

use evalcat::{Field, MetricField, ResultTable, SummaryTable};

use crate::cli::SummaryArgs;
use crate::commands::load_input;
use crate::util::write_json_pretty;

pub fn run(args: SummaryArgs) -> Result<()> {
    let input = load_input(&args.input)?;
    let table = input.build_table(args.depth)?;
    let summaries = field_summaries(&table)?;

    info!(fields = summaries.len(), depth = table.depth(), "summarized fields");

    let output = io::BufWriter::new(io::stdout().lock());
    if args.input.json {
        write_json_pretty(output, &input.report(&table, &summaries))
    } else {
        write_text_summary(output, table.fields(), &summaries)
    }
}

fn field_summaries(table: &ResultTable) -> Result<Vec<&SummaryTable>> {
    Ok(table
        .field_names()
        .into_iter()
        .map(|name| table.summary(name))
        .collect::<evalcat::Result<Vec<_>>>()?)
}

fn write_text_summary<W: Write>(
    mut output: W,
    fields: &[Field],
    summaries: &[&SummaryTable],
) -> Result<()> {
    for (position, (field, summary)) in fields.iter().zip(summaries).enumerate() {
        if position > 0 {
            writeln!(output)?;
        }
        writeln!(output, "Field: {} ({})", field.name(), field.kind())?;
        write!(output, "{summary}")?;
    }
    output.flush()?;
    Ok(())
}
