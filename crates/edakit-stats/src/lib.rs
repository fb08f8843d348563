//! Univariate statistics for exploratory data analysis.
//!
//! This crate provides the statistical building blocks used by the edakit
//! toolkit. It works on plain slices and label iterators and knows nothing
//! about tables or files.
//!
//! - **Frequency tables**: Observed category counts with expected counts under an explicit null model
//! - **Goodness of fit**: Chi-square goodness-of-fit statistic, p-value, and hypothesis-test report
//! - **Distribution fitting**: Chi-square distribution parameters estimated from a numeric sample
//! - **Descriptive statistics**: Count, mean, median, variance, standard deviation, etc.
//! - **Percentiles**: Linearly interpolated percentile values
//!
//! # Modules
//!
//! - [`frequency`]: Frequency tables, null models, and categorical summaries
//! - [`goodness_of_fit`]: Chi-square goodness-of-fit test
//! - [`distribution`]: Chi-square distribution fitting, KS test, and variate generation
//! - [`descriptive`]: Descriptive statistics for summarizing datasets
//! - [`percentiles`]: Percentile computation and storage
//!
//! # Examples
//!
//! ## Testing a categorical variable for uniformity
//!
//! ```
//! use edakit_stats::{
//!     frequency::{FrequencyTable, MissingPolicy, NullModel},
//!     goodness_of_fit::ChiSquareGofTest,
//! };
//!
//! let labels = ["a", "b", "a", "c", "b", "c"].map(Some);
//! let table =
//!     FrequencyTable::from_labels(labels, &NullModel::Uniform, &MissingPolicy::Exclude).unwrap();
//! assert_eq!(table.expected(), [2.0, 2.0, 2.0]);
//!
//! let result = ChiSquareGofTest::default().evaluate(&table).unwrap();
//! assert_eq!(result.statistic, 0.0);
//! assert!(!result.reject);
//! ```
//!
//! ## Computing the chi-square statistic directly
//!
//! ```
//! use edakit_stats::goodness_of_fit::chi_square_fit;
//!
//! let fit = chi_square_fit(&[50.0, 30.0, 20.0], &[40.0, 35.0, 25.0]).unwrap();
//! assert_eq!(fit.dof, 2);
//! assert!((fit.statistic - 4.2143).abs() < 1e-4);
//! assert!((fit.p_value - 0.1216).abs() < 1e-3);
//! ```
//!
//! ## Fitting a chi-square distribution
//!
//! ```
//! use edakit_stats::distribution::{FitMethod, fit_chi_square};
//!
//! let incomes = [14.9, 106.0, 104.6, 148.9, 55.9, 80.2, 21.0, 71.4, 15.1, 71.1];
//! let fit = fit_chi_square(&incomes, FitMethod::Moments).unwrap();
//! assert!(fit.law.df > 0.0);
//! ```

pub mod descriptive;
pub mod distribution;
pub mod frequency;
pub mod goodness_of_fit;
pub mod percentiles;

/// Errors raised by the statistical routines.
#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum StatsError {
    /// Paired vectors differ in length.
    #[display("observed has {observed} entries but expected has {expected}")]
    DimensionMismatch { observed: usize, expected: usize },
    /// The input cannot produce a defined result (zero expected count,
    /// zero variance, too few categories, ...).
    #[display("degenerate input: {reason}")]
    DegenerateInput { reason: String },
    /// Observed categories have no expected frequency in the null model.
    #[display("no expected frequency for categories: {}", categories.join(", "))]
    CategoryMismatch { categories: Vec<String> },
    /// Explicit expected counts do not add up to the observed total.
    #[display("expected counts sum to {expected}, observed counts sum to {observed}")]
    TotalMismatch { observed: f64, expected: f64 },
    /// The label chosen for missing values is already an observed category.
    #[display("missing-value label '{label}' is already an observed category")]
    LabelCollision { label: String },
    /// Not enough values to estimate the requested quantity.
    #[display("at least {required} values required, got {actual}")]
    InsufficientData { required: usize, actual: usize },
}

impl StatsError {
    pub(crate) fn degenerate(reason: impl Into<String>) -> Self {
        Self::DegenerateInput {
            reason: reason.into(),
        }
    }
}
