//! Column-level analyses over loaded tables
//!
//! This crate joins [`edakit_data::Table`] to the statistics in
//! [`edakit_stats`]: it selects a column, checks that its kind suits the
//! analysis, extracts the values, and hands them to the statistical routine.
//!
//! # Overview
//!
//! The analysis system supports three workflows:
//!
//! ## Goodness-of-Fit Workflow
//!
//! Test whether a categorical column follows an expected distribution:
//!
//! 1. **Load Table** ([`edakit_data::Table::read_csv`]): Read the dataset
//! 2. **Count Categories** ([`frequency::build_frequencies`]): Observed and expected
//!    counts under a [`NullModel`](edakit_stats::frequency::NullModel)
//! 3. **Evaluate** ([`frequency::test_goodness_of_fit`]): Chi-square statistic,
//!    p-value, and decision at the significance level
//!
//! ## Distribution Fitting Workflow
//!
//! Estimate chi-square parameters for a numeric column:
//!
//! 1. **Fit** ([`fit::fit_column`]): Parameters, log-likelihood, optional KS test
//! 2. **Generate** ([`fit::sample_column`]): Seeded variates from the fitted law
//!
//! ## Description Workflow
//!
//! Summarize columns before testing ([`describe::describe_column`],
//! [`describe::describe_table`]).
//!
//! # Examples
//!
//! ```no_run
//! use edakit_analysis::frequency;
//! use edakit_data::{ReadOptions, Table};
//! use edakit_stats::{
//!     frequency::{MissingPolicy, NullModel},
//!     goodness_of_fit::ChiSquareGofTest,
//! };
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//!
//! let table = Table::read_csv("credit.csv", &ReadOptions::default())?;
//! let report = frequency::test_goodness_of_fit(
//!     &table,
//!     "Region",
//!     &NullModel::Uniform,
//!     &MissingPolicy::Exclude,
//!     &ChiSquareGofTest::default(),
//! )?;
//!
//! println!("{}", report.result.summary);
//! # Ok(())
//! # }
//! ```

use edakit_data::{Column, DataError, Table};
use edakit_stats::StatsError;

pub mod describe;
pub mod fit;
pub mod frequency;

/// Errors raised by the column analyses.
#[derive(Debug, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum AnalysisError {
    #[display("failed to access table data")]
    Data(DataError),
    #[display("statistical analysis failed")]
    Stats(StatsError),
    /// The analysis counts categories but the column is numeric.
    #[display("column '{name}' is numeric; read it as categorical to count its values")]
    #[from(ignore)]
    NotCategorical { name: String },
    /// The analysis needs numbers but the column is categorical.
    #[display("column '{name}' is not numeric")]
    #[from(ignore)]
    NotNumeric { name: String },
}

fn categorical_column<'a>(
    table: &'a Table,
    name: &str,
) -> Result<&'a [Option<String>], AnalysisError> {
    let column = table.column(name)?;
    column
        .as_categorical()
        .ok_or_else(|| AnalysisError::NotCategorical {
            name: name.to_owned(),
        })
}

/// Non-missing values of a numeric column.
fn numeric_values(table: &Table, name: &str) -> Result<Vec<f64>, AnalysisError> {
    let column = table.column(name)?;
    let values = column.as_numeric().ok_or_else(|| AnalysisError::NotNumeric {
        name: name.to_owned(),
    })?;
    let present = values.iter().flatten().copied().collect::<Vec<_>>();
    log_dropped(column, present.len());
    Ok(present)
}

fn log_dropped(column: &Column, kept: usize) {
    let dropped = column.len() - kept;
    if dropped > 0 {
        tracing::debug!(column = column.name(), dropped, "ignored missing values");
    }
}

#[cfg(test)]
fn credit_table() -> Table {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/../../tests/fixtures/credit.csv");
    Table::read_csv(path, &edakit_data::ReadOptions::default()).unwrap()
}
