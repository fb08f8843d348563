//! Frequency tables and goodness-of-fit tests for categorical columns.

use edakit_data::Table;
use edakit_stats::{
    frequency::{FrequencyTable, MissingPolicy, NullModel},
    goodness_of_fit::{ChiSquareGofResult, ChiSquareGofTest},
};
use serde::Serialize;

use crate::{AnalysisError, categorical_column};

/// Goodness-of-fit test of one column, with the counts it was computed from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GofReport {
    pub column: String,
    pub frequencies: FrequencyTable,
    pub result: ChiSquareGofResult,
}

/// Counts the categories of `column` and derives expected counts under
/// `null_model`.
///
/// # Errors
///
/// - [`AnalysisError::Data`] if the column does not exist
/// - [`AnalysisError::NotCategorical`] if the column is numeric
/// - [`AnalysisError::Stats`] if the counts or the null model are unusable
pub fn build_frequencies(
    table: &Table,
    column: &str,
    null_model: &NullModel,
    missing: &MissingPolicy,
) -> Result<FrequencyTable, AnalysisError> {
    let values = categorical_column(table, column)?;
    let frequencies =
        FrequencyTable::from_labels(values.iter().map(Option::as_deref), null_model, missing)?;
    tracing::info!(
        column,
        categories = frequencies.len(),
        total = frequencies.total(),
        "built frequency table"
    );
    Ok(frequencies)
}

/// Runs a chi-square goodness-of-fit test on the categories of `column`.
pub fn test_goodness_of_fit(
    table: &Table,
    column: &str,
    null_model: &NullModel,
    missing: &MissingPolicy,
    test: &ChiSquareGofTest,
) -> Result<GofReport, AnalysisError> {
    let frequencies = build_frequencies(table, column, null_model, missing)?;
    let result = test.evaluate(&frequencies)?;
    Ok(GofReport {
        column: column.to_owned(),
        frequencies,
        result,
    })
}
