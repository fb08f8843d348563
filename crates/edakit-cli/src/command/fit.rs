use std::io::{self, Write as _};

use clap::Args;
use edakit_analysis::fit::{self, FitReport, SampleReport};
use edakit_stats::distribution::ChiSquareFit;

use crate::{
    command::{
        GlobalArg,
        args::{FitMethodArg, TableArg},
    },
    util::Output,
};

#[derive(Debug, Clone, Args)]
pub(crate) struct FitArg {
    #[clap(flatten)]
    pub table: TableArg,

    /// Numeric column to fit
    #[arg(long)]
    pub column: String,

    /// Parameter estimation method
    #[arg(long, value_enum, default_value_t = FitMethodArg::Moments)]
    pub method: FitMethodArg,

    /// Also run a Kolmogorov-Smirnov test against the fitted distribution
    #[arg(long)]
    pub ks: bool,
}

#[derive(Debug, Clone, Args)]
pub(crate) struct SampleArg {
    #[clap(flatten)]
    pub table: TableArg,

    /// Numeric column whose fitted distribution is sampled
    #[arg(long)]
    pub column: String,

    /// Parameter estimation method
    #[arg(long, value_enum, default_value_t = FitMethodArg::Moments)]
    pub method: FitMethodArg,

    /// Number of values to draw
    #[arg(long, short = 'n')]
    pub count: usize,

    /// Random seed
    #[arg(long, default_value_t = 0)]
    pub seed: u64,
}

pub(crate) fn run_fit(global: &GlobalArg, arg: &FitArg) -> anyhow::Result<()> {
    let table = arg.table.load()?;
    let report = fit::fit_column(&table, &arg.column, arg.method.into(), arg.ks)?;

    let mut output = global.open_output()?;
    output.write_report(global.format, &report, write_fit_text)
}

pub(crate) fn run_sample(global: &GlobalArg, arg: &SampleArg) -> anyhow::Result<()> {
    let table = arg.table.load()?;
    let report = fit::sample_column(
        &table,
        &arg.column,
        arg.method.into(),
        arg.count,
        arg.seed,
    )?;

    let mut output = global.open_output()?;
    output.write_report(global.format, &report, write_sample_text)
}

fn write_params(out: &mut Output, column: &str, fit: &ChiSquareFit) -> io::Result<()> {
    writeln!(out, "Chi-square fit: {column} ({}, N={})", fit.method, fit.n)?;
    writeln!(out, "  df:             {:.4}", fit.law.df)?;
    writeln!(out, "  loc:            {:.4}", fit.law.loc)?;
    writeln!(out, "  scale:          {:.4}", fit.law.scale)?;
    writeln!(out, "  log-likelihood: {:.4}", fit.log_likelihood)?;
    if fit.outside_support > 0 {
        writeln!(
            out,
            "  {} of {} values lie at or below loc (zero density)",
            fit.outside_support, fit.n
        )?;
    }
    Ok(())
}

fn write_fit_text(out: &mut Output, report: &FitReport) -> io::Result<()> {
    write_params(out, &report.column, &report.fit)?;
    if let Some(ks) = &report.ks {
        writeln!(out)?;
        writeln!(out, "Kolmogorov-Smirnov test")?;
        writeln!(out, "  D:       {:.4}", ks.statistic)?;
        writeln!(out, "  p-value: {:.4}", ks.p_value)?;
    }
    Ok(())
}

fn write_sample_text(out: &mut Output, report: &SampleReport) -> io::Result<()> {
    write_params(out, &report.column, &report.fit)?;
    writeln!(out)?;
    writeln!(out, "Sample (seed {}, n={})", report.seed, report.values.len())?;
    for value in &report.values {
        writeln!(out, "  {value:.4}")?;
    }
    Ok(())
}
