//! Chi-square goodness-of-fit test.
//!
//! [`chi_square_fit`] computes Pearson's statistic for paired observed and
//! expected counts. [`ChiSquareGofTest`] runs the same computation on a
//! [`FrequencyTable`] and reports the decision at a significance level.

use std::fmt;

use serde::Serialize;
use statrs::distribution::{ChiSquared, ContinuousCDF as _};

use crate::{StatsError, frequency::FrequencyTable};

/// Pearson's chi-square statistic with its right-tail p-value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GoodnessOfFit {
    pub statistic: f64,
    pub p_value: f64,
    /// Degrees of freedom: number of categories minus one.
    pub dof: usize,
}

/// Computes `Σ (O_i - E_i)² / E_i` and its p-value under the chi-square
/// distribution with `k - 1` degrees of freedom.
///
/// # Errors
///
/// - [`StatsError::DimensionMismatch`] if the slices differ in length
/// - [`StatsError::DegenerateInput`] if there are fewer than two categories,
///   or an expected count is zero, negative, or not finite
pub fn chi_square_fit(observed: &[f64], expected: &[f64]) -> Result<GoodnessOfFit, StatsError> {
    if observed.len() != expected.len() {
        return Err(StatsError::DimensionMismatch {
            observed: observed.len(),
            expected: expected.len(),
        });
    }
    if observed.len() < 2 {
        return Err(StatsError::degenerate(
            "at least two categories are required",
        ));
    }
    if let Some(pos) = expected.iter().position(|e| !(e.is_finite() && *e > 0.0)) {
        return Err(StatsError::degenerate(format!(
            "expected count at position {pos} is {}",
            expected[pos]
        )));
    }
    if observed.iter().any(|o| !o.is_finite() || *o < 0.0) {
        return Err(StatsError::degenerate(
            "observed counts must be finite and non-negative",
        ));
    }

    let statistic = observed
        .iter()
        .zip(expected)
        .map(|(o, e)| (o - e).powi(2) / e)
        .sum::<f64>();
    let dof = observed.len() - 1;
    #[expect(clippy::cast_precision_loss)]
    let dist = ChiSquared::new(dof as f64)
        .map_err(|err| StatsError::degenerate(err.to_string()))?;
    let p_value = dist.sf(statistic);

    tracing::debug!(statistic, p_value, dof, "chi-square goodness of fit");
    Ok(GoodnessOfFit {
        statistic,
        p_value,
        dof,
    })
}

/// Chi-square goodness-of-fit hypothesis test.
///
/// H0: the observed frequencies follow the table's expected frequencies.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChiSquareGofTest {
    /// Significance level.
    pub alpha: f64,
}

impl Default for ChiSquareGofTest {
    fn default() -> Self {
        Self { alpha: 0.05 }
    }
}

/// Outcome of [`ChiSquareGofTest::evaluate`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChiSquareGofResult {
    pub statistic: f64,
    pub p_value: f64,
    pub dof: usize,
    /// Number of observations counted.
    pub n: u64,
    pub alpha: f64,
    /// Whether H0 is rejected (`p_value <= alpha`).
    pub reject: bool,
    /// One-line report, e.g. `X²(4, N=164)=1.55, p>0.05`.
    pub summary: String,
    pub inference: String,
}

impl ChiSquareGofTest {
    #[must_use]
    pub fn new(alpha: f64) -> Self {
        Self { alpha }
    }

    /// Tests the observed counts of `table` against its expected counts.
    pub fn evaluate(&self, table: &FrequencyTable) -> Result<ChiSquareGofResult, StatsError> {
        let GoodnessOfFit {
            statistic,
            p_value,
            dof,
        } = chi_square_fit(&table.observed(), &table.expected())?;
        let n = table.total();
        let alpha = self.alpha;
        let reject = p_value <= alpha;

        let (relation, inference) = if reject {
            (
                '<',
                format!(
                    "The p-value {p_value:.2} is less than the significance level {alpha}; \
                     the null hypothesis is rejected. The data do not have the expected frequencies."
                ),
            )
        } else {
            (
                '>',
                format!(
                    "The p-value {p_value:.2} is greater than the significance level {alpha}; \
                     the null hypothesis is not rejected. The data have the expected frequencies."
                ),
            )
        };
        let summary = format!("X\u{b2}({dof}, N={n})={statistic:.2}, p{relation}{alpha}");

        tracing::info!(%summary, reject, "chi-square goodness-of-fit test");
        Ok(ChiSquareGofResult {
            statistic,
            p_value,
            dof,
            n,
            alpha,
            reject,
            summary,
            inference,
        })
    }
}

impl fmt::Display for ChiSquareGofResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Chi-square goodness-of-fit test")?;
        writeln!(f, "  statistic: {:.4}", self.statistic)?;
        writeln!(f, "  dof:       {}", self.dof)?;
        writeln!(f, "  p-value:   {:.4}", self.p_value)?;
        writeln!(f, "  N:         {}", self.n)?;
        writeln!(f, "  alpha:     {}", self.alpha)?;
        writeln!(f, "  result:    {}", self.summary)?;
        write!(f, "{}", self.inference)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frequency::{MissingPolicy, NullModel};

    #[test]
    fn test_known_statistic() {
        // df = 2, statistic = 2.5 + 0.7143 + 1.0
        let fit = chi_square_fit(&[50.0, 30.0, 20.0], &[40.0, 35.0, 25.0]).unwrap();
        assert_eq!(fit.dof, 2);
        assert!((fit.statistic - 4.214_285_714).abs() < 1e-8);
        // sf of chi2(2) is exp(-x/2)
        assert!((fit.p_value - (-fit.statistic / 2.0).exp()).abs() < 1e-9);
    }

    #[test]
    fn test_perfect_fit() {
        let observed = [32.8; 5];
        let fit = chi_square_fit(&observed, &observed).unwrap();
        assert!(fit.statistic.abs() < 1e-12);
        assert!((fit.p_value - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_permutation_symmetry() {
        let observed = [32.0, 36.0, 35.0, 34.0, 27.0];
        let expected = [30.0, 40.0, 30.0, 34.0, 30.0];
        let base = chi_square_fit(&observed, &expected).unwrap();

        let order = [3, 0, 4, 1, 2];
        let observed = order.map(|i| observed[i]);
        let expected = order.map(|i| expected[i]);
        let permuted = chi_square_fit(&observed, &expected).unwrap();

        assert!((base.statistic - permuted.statistic).abs() < 1e-12);
        assert!((base.p_value - permuted.p_value).abs() < 1e-12);
    }

    #[test]
    fn test_dimension_mismatch() {
        let err = chi_square_fit(&[1.0, 2.0, 3.0, 4.0, 5.0], &[1.0, 2.0, 3.0, 4.0]).unwrap_err();
        assert_eq!(
            err,
            StatsError::DimensionMismatch {
                observed: 5,
                expected: 4
            }
        );
    }

    #[test]
    fn test_zero_expected_is_degenerate() {
        let err = chi_square_fit(&[10.0, 0.0, 10.0], &[10.0, 0.0, 10.0]).unwrap_err();
        assert!(matches!(err, StatsError::DegenerateInput { .. }));
    }

    #[test]
    fn test_single_category_is_degenerate() {
        let err = chi_square_fit(&[7.0], &[7.0]).unwrap_err();
        assert!(matches!(err, StatsError::DegenerateInput { .. }));
    }

    #[test]
    fn test_evaluate_region_counts() {
        let labels = [
            ("East", 32),
            ("North", 36),
            ("South", 35),
            ("Upper", 34),
            ("West", 27),
        ]
        .into_iter()
        .flat_map(|(label, n)| std::iter::repeat_n(Some(label), n));
        let table =
            FrequencyTable::from_labels(labels, &NullModel::Uniform, &MissingPolicy::Exclude)
                .unwrap();

        let result = ChiSquareGofTest::default().evaluate(&table).unwrap();
        assert_eq!(result.dof, 4);
        assert_eq!(result.n, 164);
        assert!((result.statistic - 1.548_780_5).abs() < 1e-6);
        assert!(!result.reject);
        assert_eq!(result.summary, "X\u{b2}(4, N=164)=1.55, p>0.05");
        assert!(result.inference.contains("not rejected"));
    }

    #[test]
    fn test_evaluate_rejects_skewed_counts() {
        let labels = [("a", 90), ("b", 10)]
            .into_iter()
            .flat_map(|(label, n)| std::iter::repeat_n(Some(label), n));
        let table =
            FrequencyTable::from_labels(labels, &NullModel::Uniform, &MissingPolicy::Exclude)
                .unwrap();

        let result = ChiSquareGofTest::new(0.01).evaluate(&table).unwrap();
        assert!(result.reject);
        assert!(result.summary.ends_with("p<0.01"), "{}", result.summary);
    }
}
