use std::{io, path::PathBuf};

use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing_subscriber::{EnvFilter, filter::LevelFilter};

use crate::util::{Output, OutputFormat};

use self::{
    describe::DescribeArg,
    fit::{FitArg, SampleArg},
    frequency::{FrequencyArg, GofArg},
    info::InfoArg,
};

mod args;
mod describe;
mod fit;
mod frequency;
mod info;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    #[clap(flatten)]
    global: GlobalArg,

    /// Analysis to run
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Args)]
pub(crate) struct GlobalArg {
    /// Minimum level of log messages written to stderr (`RUST_LOG` directives are honored)
    #[arg(long, global = true, value_enum, default_value_t = LogLevel::Warn)]
    log_level: LogLevel,

    /// Report format
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Write the report to this file instead of stdout
    #[arg(long, short, global = true)]
    pub output: Option<PathBuf>,
}

impl GlobalArg {
    pub(crate) fn open_output(&self) -> anyhow::Result<Output> {
        Output::create(self.output.as_deref())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => LevelFilter::TRACE,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Error => LevelFilter::ERROR,
        }
    }
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Show the shape of a table and a data quality profile of its columns
    Info(#[clap(flatten)] InfoArg),
    /// Summarize one column, or every column
    Describe(#[clap(flatten)] DescribeArg),
    /// Count the categories of a column with their expected counts
    Frequency(#[clap(flatten)] FrequencyArg),
    /// Run a chi-square goodness-of-fit test on a categorical column
    Gof(#[clap(flatten)] GofArg),
    /// Fit a chi-square distribution to a numeric column
    Fit(#[clap(flatten)] FitArg),
    /// Draw random values from the chi-square law fitted to a numeric column
    Sample(#[clap(flatten)] SampleArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();

    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from(args.global.log_level).into())
        .from_env_lossy();
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .finish();

    tracing::subscriber::with_default(subscriber, || dispatch(&args))
}

fn dispatch(args: &CommandArgs) -> anyhow::Result<()> {
    let global = &args.global;
    match &args.mode {
        Mode::Info(arg) => info::run(global, arg)?,
        Mode::Describe(arg) => describe::run(global, arg)?,
        Mode::Frequency(arg) => frequency::run_frequency(global, arg)?,
        Mode::Gof(arg) => frequency::run_gof(global, arg)?,
        Mode::Fit(arg) => fit::run_fit(global, arg)?,
        Mode::Sample(arg) => fit::run_sample(global, arg)?,
    }
    Ok(())
}
