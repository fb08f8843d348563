//! Argument groups shared by several subcommands.

use std::{collections::BTreeMap, path::PathBuf};

use anyhow::{Context, bail};
use clap::{Args, ValueEnum};
use edakit_data::{ReadOptions, Table};
use edakit_stats::{
    distribution::FitMethod,
    frequency::{MissingPolicy, NullModel},
};

#[derive(Debug, Clone, Args)]
pub(crate) struct TableArg {
    /// Path to the delimited data file
    pub path: PathBuf,

    /// Column holding row labels (removed from the analyzed columns)
    #[arg(long)]
    pub index_col: Option<String>,

    /// Field delimiter [default: tab for `.tsv` files, comma otherwise]
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,

    /// Columns read as categorical even when all values are numeric (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub categorical: Vec<String>,

    /// Field values treated as missing (comma-separated) [default: "", NA, N/A, NaN, nan, null]
    #[arg(long, value_delimiter = ',')]
    pub na_values: Option<Vec<String>>,
}

impl TableArg {
    pub(crate) fn read_options(&self) -> ReadOptions {
        let is_tsv = self
            .path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("tsv"));
        let defaults = ReadOptions::default();
        ReadOptions {
            delimiter: self
                .delimiter
                .unwrap_or(if is_tsv { b'\t' } else { defaults.delimiter }),
            index_col: self.index_col.clone(),
            categorical: self.categorical.clone(),
            na_values: self.na_values.clone().unwrap_or(defaults.na_values),
            ..defaults
        }
    }

    pub(crate) fn load(&self) -> anyhow::Result<Table> {
        Table::read_csv(&self.path, &self.read_options())
            .with_context(|| format!("Failed to load table: {}", self.path.display()))
    }
}

fn parse_delimiter(s: &str) -> Result<u8, String> {
    match s {
        "\\t" | "tab" => Ok(b'\t'),
        _ => match s.as_bytes() {
            [b] if b.is_ascii() => Ok(*b),
            _ => Err(format!("delimiter must be a single ASCII character, got '{s}'")),
        },
    }
}

#[derive(Debug, Clone, Args)]
pub(crate) struct NullModelArg {
    /// Expected relative frequencies, e.g. `East=0.2,West=0.3` [default: uniform]
    #[arg(
        long,
        value_delimiter = ',',
        value_parser = parse_label_value,
        conflicts_with = "expected_counts"
    )]
    pub expected_proportions: Vec<(String, f64)>,

    /// Expected counts summing to the number of counted rows, e.g. `No=140,Yes=24`
    #[arg(long, value_delimiter = ',', value_parser = parse_label_value)]
    pub expected_counts: Vec<(String, f64)>,

    /// Count missing values as a category with this label instead of ignoring them
    #[arg(long)]
    pub missing_as: Option<String>,
}

impl NullModelArg {
    pub(crate) fn null_model(&self) -> anyhow::Result<NullModel> {
        if !self.expected_proportions.is_empty() {
            Ok(NullModel::Proportions(to_map(&self.expected_proportions)?))
        } else if !self.expected_counts.is_empty() {
            Ok(NullModel::Counts(to_map(&self.expected_counts)?))
        } else {
            Ok(NullModel::Uniform)
        }
    }

    pub(crate) fn missing_policy(&self) -> MissingPolicy {
        self.missing_as
            .clone()
            .map_or(MissingPolicy::Exclude, MissingPolicy::AsCategory)
    }
}

fn to_map(pairs: &[(String, f64)]) -> anyhow::Result<BTreeMap<String, f64>> {
    let mut map = BTreeMap::new();
    for (label, value) in pairs {
        if map.insert(label.clone(), *value).is_some() {
            bail!("Category '{label}' is given more than once");
        }
    }
    Ok(map)
}

fn parse_label_value(s: &str) -> Result<(String, f64), String> {
    let (label, value) = s
        .rsplit_once('=')
        .ok_or_else(|| format!("expected LABEL=VALUE, got '{s}'"))?;
    let value = value
        .trim()
        .parse::<f64>()
        .map_err(|e| format!("invalid value in '{s}': {e}"))?;
    Ok((label.trim().to_owned(), value))
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub(crate) enum FitMethodArg {
    /// Method of moments (df, loc, scale)
    #[default]
    Moments,
    /// Maximum likelihood of the standard form (df only)
    Mle,
}

impl From<FitMethodArg> for FitMethod {
    fn from(arg: FitMethodArg) -> Self {
        match arg {
            FitMethodArg::Moments => FitMethod::Moments,
            FitMethodArg::Mle => FitMethod::MaxLikelihood,
        }
    }
}
