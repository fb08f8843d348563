use std::io::{self, Write as _};

use clap::Args;
use edakit_analysis::frequency::{self, GofReport};
use edakit_stats::{frequency::FrequencyTable, goodness_of_fit::ChiSquareGofTest};

use crate::{
    command::{
        GlobalArg,
        args::{NullModelArg, TableArg},
    },
    util::Output,
};

#[derive(Debug, Clone, Args)]
pub(crate) struct FrequencyArg {
    #[clap(flatten)]
    pub table: TableArg,

    /// Categorical column to count
    #[arg(long)]
    pub column: String,

    #[clap(flatten)]
    pub null_model: NullModelArg,
}

#[derive(Debug, Clone, Args)]
pub(crate) struct GofArg {
    #[clap(flatten)]
    pub frequency: FrequencyArg,

    /// Significance level
    #[arg(long, default_value_t = 0.05, value_parser = parse_alpha)]
    pub alpha: f64,
}

fn parse_alpha(s: &str) -> Result<f64, String> {
    let alpha = s.parse::<f64>().map_err(|e| e.to_string())?;
    if alpha > 0.0 && alpha < 1.0 {
        Ok(alpha)
    } else {
        Err(format!("significance level must be in (0, 1), got {alpha}"))
    }
}

pub(crate) fn run_frequency(global: &GlobalArg, arg: &FrequencyArg) -> anyhow::Result<()> {
    let table = arg.table.load()?;
    let frequencies = frequency::build_frequencies(
        &table,
        &arg.column,
        &arg.null_model.null_model()?,
        &arg.null_model.missing_policy(),
    )?;

    let mut output = global.open_output()?;
    output.write_report(global.format, &frequencies, |out, frequencies| {
        writeln!(out, "Frequency table: {}", arg.column)?;
        write_frequency_table(out, frequencies)
    })
}

pub(crate) fn run_gof(global: &GlobalArg, arg: &GofArg) -> anyhow::Result<()> {
    let counts = &arg.frequency;
    let table = counts.table.load()?;
    let report = frequency::test_goodness_of_fit(
        &table,
        &counts.column,
        &counts.null_model.null_model()?,
        &counts.null_model.missing_policy(),
        &ChiSquareGofTest::new(arg.alpha),
    )?;

    let mut output = global.open_output()?;
    output.write_report(global.format, &report, write_gof_text)
}

fn write_frequency_table(out: &mut Output, frequencies: &FrequencyTable) -> io::Result<()> {
    writeln!(
        out,
        "  {:<20} {:>10} {:>10} {:>8} {:>8}",
        "Category", "Observed", "Expected", "%", "Cum %"
    )?;
    writeln!(out, "  {}", "-".repeat(60))?;
    for row in frequencies.rows() {
        writeln!(
            out,
            "  {:<20} {:>10} {:>10.2} {:>7.1}% {:>7.1}%",
            row.category, row.observed, row.expected, row.percent, row.cumulative_percent,
        )?;
    }
    writeln!(out, "  {}", "-".repeat(60))?;
    writeln!(
        out,
        "  {:<20} {:>10} {:>10.2}",
        "Total",
        frequencies.total(),
        frequencies.expected().iter().sum::<f64>(),
    )
}

fn write_gof_text(out: &mut Output, report: &GofReport) -> io::Result<()> {
    writeln!(out, "Frequency table: {}", report.column)?;
    write_frequency_table(out, &report.frequencies)?;
    writeln!(out)?;
    writeln!(out, "{}", report.result)
}
