use std::{
    io::{self, Write as _},
    path::PathBuf,
};

use clap::Args;
use edakit_data::{ColumnProfile, TableOverview};
use serde::Serialize;

use crate::{
    command::{GlobalArg, args::TableArg},
    util::Output,
};

#[derive(Debug, Clone, Args)]
pub(crate) struct InfoArg {
    #[clap(flatten)]
    pub table: TableArg,
}

#[derive(Debug, Serialize)]
struct InfoReport {
    path: PathBuf,
    overview: TableOverview,
    columns: Vec<ColumnProfile>,
}

pub(crate) fn run(global: &GlobalArg, arg: &InfoArg) -> anyhow::Result<()> {
    let table = arg.table.load()?;
    let report = InfoReport {
        path: arg.table.path.clone(),
        overview: table.overview(),
        columns: table.profile(),
    };

    let mut output = global.open_output()?;
    output.write_report(global.format, &report, write_text)
}

fn write_text(out: &mut Output, report: &InfoReport) -> io::Result<()> {
    let overview = &report.overview;
    writeln!(out, "Dataset: {}", report.path.display())?;
    writeln!(out, "  Rows:      {}", overview.rows)?;
    writeln!(out, "  Variables: {}", overview.variables)?;
    writeln!(out, "  Cells:     {}", overview.cells)?;
    writeln!(out)?;

    writeln!(
        out,
        "  {:<24} {:<12} {:>8} {:>8} {:>9} {:>8} {:>9}",
        "Column", "Kind", "Valid", "Null", "Validity", "Unique", "%Unique"
    )?;
    writeln!(out, "  {}", "-".repeat(84))?;
    for profile in &report.columns {
        writeln!(
            out,
            "  {:<24} {:<12} {:>8} {:>8} {:>8.1}% {:>8} {:>8.1}%",
            profile.name,
            profile.kind.to_string(),
            profile.valid,
            profile.null,
            profile.validity * 100.0,
            profile.cardinality,
            profile.percent_unique * 100.0,
        )?;
    }
    Ok(())
}
