//! Per-column summaries.
//!
//! Numeric columns are summarized by [`DescriptiveStats`] and quartiles,
//! categorical columns by a [`CategoricalSummary`]. Missing values are
//! counted separately and never enter the statistics.

use edakit_data::{Column, ColumnValues, Table};
use edakit_stats::{
    descriptive::DescriptiveStats, frequency::CategoricalSummary, percentiles::Percentiles,
};
use serde::Serialize;

use crate::AnalysisError;

/// Percentile points reported for numeric columns.
pub const QUARTILES: [f64; 3] = [25.0, 50.0, 75.0];

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ColumnSummary {
    Numeric {
        name: String,
        null: usize,
        /// `None` when every value is missing.
        stats: Option<DescriptiveStats>,
        percentiles: Percentiles,
    },
    Categorical {
        name: String,
        null: usize,
        #[serde(flatten)]
        summary: CategoricalSummary,
    },
}

impl ColumnSummary {
    #[must_use]
    pub fn from_column(column: &Column) -> Self {
        let name = column.name().to_owned();
        let null = column.null_count();
        match column.values() {
            ColumnValues::Numeric(values) => {
                let mut present = values.iter().flatten().copied().collect::<Vec<_>>();
                present.sort_by(f64::total_cmp);
                Self::Numeric {
                    name,
                    null,
                    stats: DescriptiveStats::from_sorted(&present),
                    percentiles: Percentiles::from_sorted(&present, &QUARTILES),
                }
            }
            ColumnValues::Categorical(values) => Self::Categorical {
                name,
                null,
                summary: CategoricalSummary::from_labels(values.iter().map(Option::as_deref)),
            },
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Numeric { name, .. } | Self::Categorical { name, .. } => name,
        }
    }
}

/// Summarizes one column.
pub fn describe_column(table: &Table, column: &str) -> Result<ColumnSummary, AnalysisError> {
    let column = table.column(column)?;
    tracing::debug!(column = column.name(), kind = %column.kind(), "describing column");
    Ok(ColumnSummary::from_column(column))
}

/// Summarizes every column, in table order.
#[must_use]
pub fn describe_table(table: &Table) -> Vec<ColumnSummary> {
    table.columns().iter().map(ColumnSummary::from_column).collect()
}
