//! Chi-square distribution fitting for numeric columns.
//!
//! Fitting estimates parameters; it does not test a hypothesis about
//! category counts. See [`crate::frequency`] for that.

use edakit_data::Table;
use edakit_stats::distribution::{self, ChiSquareFit, FitMethod, KsTestResult};
use serde::Serialize;

use crate::{AnalysisError, numeric_values};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FitReport {
    pub column: String,
    #[serde(flatten)]
    pub fit: ChiSquareFit,
    /// Kolmogorov-Smirnov test of the column against the fitted law.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ks: Option<KsTestResult>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SampleReport {
    pub column: String,
    pub fit: ChiSquareFit,
    pub seed: u64,
    pub values: Vec<f64>,
}

/// Fits a chi-square law to the non-missing values of `column`.
///
/// # Errors
///
/// - [`AnalysisError::Data`] if the column does not exist
/// - [`AnalysisError::NotNumeric`] if the column is categorical
/// - [`AnalysisError::Stats`] if the values cannot be fitted
pub fn fit_column(
    table: &Table,
    column: &str,
    method: FitMethod,
    with_ks: bool,
) -> Result<FitReport, AnalysisError> {
    let values = numeric_values(table, column)?;
    let fit = distribution::fit_chi_square(&values, method)?;
    let ks = with_ks
        .then(|| distribution::ks_test(&values, &fit.law))
        .transpose()?;
    tracing::info!(
        column,
        df = fit.law.df,
        loc = fit.law.loc,
        scale = fit.law.scale,
        "fitted column"
    );
    Ok(FitReport {
        column: column.to_owned(),
        fit,
        ks,
    })
}

/// Fits `column` and draws `count` variates from the fitted law.
pub fn sample_column(
    table: &Table,
    column: &str,
    method: FitMethod,
    count: usize,
    seed: u64,
) -> Result<SampleReport, AnalysisError> {
    let values = numeric_values(table, column)?;
    let fit = distribution::fit_chi_square(&values, method)?;
    let values = fit.law.sample(count, seed)?;
    tracing::info!(column, count, seed, "generated variates");
    Ok(SampleReport {
        column: column.to_owned(),
        fit,
        seed,
        values,
    })
}
