use std::io::{self, Write as _};

use clap::Args;
use edakit_analysis::describe::{self, ColumnSummary};

use crate::{
    command::{GlobalArg, args::TableArg},
    util::{Output, fmt_opt},
};

#[derive(Debug, Clone, Args)]
pub(crate) struct DescribeArg {
    #[clap(flatten)]
    pub table: TableArg,

    /// Column to summarize [default: all columns]
    #[arg(long)]
    pub column: Option<String>,
}

pub(crate) fn run(global: &GlobalArg, arg: &DescribeArg) -> anyhow::Result<()> {
    let table = arg.table.load()?;
    let summaries = match &arg.column {
        Some(column) => vec![describe::describe_column(&table, column)?],
        None => describe::describe_table(&table),
    };

    let mut output = global.open_output()?;
    output.write_report(global.format, &summaries, |out, summaries| {
        write_text(out, summaries)
    })
}

fn write_text(out: &mut Output, summaries: &[ColumnSummary]) -> io::Result<()> {
    let (numeric, categorical): (Vec<_>, Vec<_>) = summaries
        .iter()
        .partition(|s| matches!(s, ColumnSummary::Numeric { .. }));

    let has_numeric = !numeric.is_empty();
    if has_numeric {
        writeln!(out, "Numeric columns")?;
        writeln!(
            out,
            "  {:<20} {:>6} {:>6} {:>10} {:>10} {:>10} {:>10} {:>10} {:>10} {:>10}",
            "Column", "Count", "Null", "Mean", "Std", "Min", "25%", "50%", "75%", "Max"
        )?;
        writeln!(out, "  {}", "-".repeat(111))?;
        for summary in numeric {
            let ColumnSummary::Numeric {
                name,
                null,
                stats,
                percentiles,
            } = summary
            else {
                continue;
            };
            writeln!(
                out,
                "  {:<20} {:>6} {:>6} {:>10} {:>10} {:>10} {:>10} {:>10} {:>10} {:>10}",
                name,
                stats.as_ref().map_or(0, |s| s.count),
                null,
                fmt_opt(stats.as_ref().map(|s| s.mean), 3),
                fmt_opt(stats.as_ref().map(|s| s.std_dev), 3),
                fmt_opt(stats.as_ref().map(|s| s.min), 3),
                fmt_opt(percentiles.get(25.0), 3),
                fmt_opt(percentiles.get(50.0), 3),
                fmt_opt(percentiles.get(75.0), 3),
                fmt_opt(stats.as_ref().map(|s| s.max), 3),
            )?;
        }
    }

    if !categorical.is_empty() {
        if has_numeric {
            writeln!(out)?;
        }
        writeln!(out, "Categorical columns")?;
        writeln!(
            out,
            "  {:<20} {:>6} {:>6} {:>7} {:<20} {:>6}",
            "Column", "Count", "Null", "Unique", "Top", "Freq"
        )?;
        writeln!(out, "  {}", "-".repeat(70))?;
        for summary in categorical {
            let ColumnSummary::Categorical {
                name,
                null,
                summary,
            } = summary
            else {
                continue;
            };
            writeln!(
                out,
                "  {:<20} {:>6} {:>6} {:>7} {:<20} {:>6}",
                name,
                summary.count,
                null,
                summary.unique,
                summary.top.as_deref().unwrap_or("-"),
                summary.freq,
            )?;
        }
    }
    Ok(())
}
