//! Frequency tables for categorical variables.
//!
//! A [`FrequencyTable`] pairs the observed count of every category with the
//! count expected under a [`NullModel`]. Categories are always ordered by
//! label (byte-wise ascending), never by count, so the same data produces
//! the same table.
//!
//! Every null model conserves mass: the expected counts add up to the
//! observed total.
//!
//! ```
//! use std::collections::BTreeMap;
//!
//! use edakit_stats::frequency::{FrequencyTable, MissingPolicy, NullModel};
//!
//! let labels = [Some("Yes"), Some("No"), Some("No"), None, Some("No")];
//! let proportions = BTreeMap::from([("No".to_owned(), 3.0), ("Yes".to_owned(), 1.0)]);
//! let table = FrequencyTable::from_labels(
//!     labels,
//!     &NullModel::Proportions(proportions),
//!     &MissingPolicy::Exclude,
//! )
//! .unwrap();
//!
//! assert_eq!(table.categories().collect::<Vec<_>>(), ["No", "Yes"]);
//! assert_eq!(table.observed(), [3.0, 1.0]);
//! assert_eq!(table.expected(), [3.0, 1.0]);
//! ```

use std::collections::BTreeMap;

use serde::Serialize;

use crate::StatsError;

/// Relative tolerance used when comparing explicit expected totals.
const TOTAL_TOLERANCE: f64 = 1e-8;

/// How expected counts are derived from the observed counts.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(tag = "kind", content = "values", rename_all = "snake_case")]
pub enum NullModel {
    /// All categories are equally likely: `total / k` each.
    #[default]
    Uniform,
    /// Relative weights per category, normalized to sum to one.
    ///
    /// Categories present here but never observed are included with an
    /// observed count of zero.
    Proportions(BTreeMap<String, f64>),
    /// Explicit expected counts per category; they must sum to the observed
    /// total.
    Counts(BTreeMap<String, f64>),
}

/// Treatment of missing values when counting categories.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum MissingPolicy {
    /// Missing values are not counted.
    #[default]
    Exclude,
    /// Missing values are counted as a category with the given label.
    AsCategory(String),
}

/// One category of a [`FrequencyTable`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrequencyRow {
    pub category: String,
    pub observed: u64,
    pub expected: f64,
    /// Share of the total, in percent.
    pub percent: f64,
    /// Running share of the total in category order, in percent.
    pub cumulative_percent: f64,
}

/// Observed and expected counts per category, ordered by label.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrequencyTable {
    total: u64,
    rows: Vec<FrequencyRow>,
}

/// Summary of a categorical sample: count, distinct values, and the most
/// frequent value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoricalSummary {
    pub count: u64,
    pub unique: usize,
    /// Most frequent category; ties go to the smallest label.
    pub top: Option<String>,
    /// Count of `top`.
    pub freq: u64,
}

impl NullModel {
    /// Computes expected counts for `observed`.
    ///
    /// Categories the model names but `observed` lacks are inserted into
    /// `observed` with a count of zero.
    fn expected_counts(
        &self,
        observed: &mut BTreeMap<String, u64>,
    ) -> Result<Vec<f64>, StatsError> {
        let total = observed.values().sum::<u64>();
        if total == 0 {
            return Err(StatsError::degenerate("no observations to count"));
        }
        #[expect(clippy::cast_precision_loss)]
        let total = total as f64;

        match self {
            Self::Uniform => {
                #[expect(clippy::cast_precision_loss)]
                let k = observed.len() as f64;
                Ok(vec![total / k; observed.len()])
            }
            Self::Proportions(weights) => {
                let weights = align(observed, weights)?;
                if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
                    return Err(StatsError::degenerate(
                        "proportions must be finite and non-negative",
                    ));
                }
                let sum = weights.iter().sum::<f64>();
                if sum <= 0.0 {
                    return Err(StatsError::degenerate("proportions sum to zero"));
                }
                Ok(weights.iter().map(|w| total * w / sum).collect())
            }
            Self::Counts(counts) => {
                let counts = align(observed, counts)?;
                if counts.iter().any(|c| !c.is_finite() || *c < 0.0) {
                    return Err(StatsError::degenerate(
                        "expected counts must be finite and non-negative",
                    ));
                }
                let sum = counts.iter().sum::<f64>();
                if !sum.is_finite() || (sum - total).abs() > TOTAL_TOLERANCE * total.max(sum) {
                    return Err(StatsError::TotalMismatch {
                        observed: total,
                        expected: sum,
                    });
                }
                Ok(counts)
            }
        }
    }
}

/// Orders the model values by the observed categories, adding unobserved
/// model categories to `observed`.
fn align(
    observed: &mut BTreeMap<String, u64>,
    values: &BTreeMap<String, f64>,
) -> Result<Vec<f64>, StatsError> {
    let unmatched = observed
        .keys()
        .filter(|label| !values.contains_key(*label))
        .cloned()
        .collect::<Vec<_>>();
    if !unmatched.is_empty() {
        return Err(StatsError::CategoryMismatch {
            categories: unmatched,
        });
    }
    for label in values.keys() {
        observed.entry(label.clone()).or_insert(0);
    }
    Ok(values.values().copied().collect())
}

impl FrequencyTable {
    /// Counts labels and derives expected counts under `null_model`.
    ///
    /// # Errors
    ///
    /// - [`StatsError::DegenerateInput`] if nothing is counted, or the model
    ///   values are unusable
    /// - [`StatsError::CategoryMismatch`] if an observed category has no
    ///   value in the model
    /// - [`StatsError::TotalMismatch`] if explicit counts do not sum to the
    ///   observed total
    /// - [`StatsError::LabelCollision`] if missing values are counted under a
    ///   label that already occurs
    pub fn from_labels<I, S>(
        labels: I,
        null_model: &NullModel,
        missing: &MissingPolicy,
    ) -> Result<Self, StatsError>
    where
        I: IntoIterator<Item = Option<S>>,
        S: AsRef<str>,
    {
        let mut counts = BTreeMap::<String, u64>::new();
        let mut missing_count = 0;
        for label in labels {
            match label {
                Some(label) => *counts.entry(label.as_ref().to_owned()).or_default() += 1,
                None => missing_count += 1,
            }
        }
        match missing {
            MissingPolicy::Exclude => {
                if missing_count > 0 {
                    tracing::debug!(missing = missing_count, "excluded missing values");
                }
            }
            MissingPolicy::AsCategory(label) => {
                if missing_count > 0 {
                    if counts.contains_key(label) {
                        return Err(StatsError::LabelCollision {
                            label: label.clone(),
                        });
                    }
                    counts.insert(label.clone(), missing_count);
                }
            }
        }
        Self::from_counts(counts, null_model)
    }

    /// Builds a table from precomputed category counts.
    pub fn from_counts(
        mut counts: BTreeMap<String, u64>,
        null_model: &NullModel,
    ) -> Result<Self, StatsError> {
        let expected = null_model.expected_counts(&mut counts)?;
        let total = counts.values().sum::<u64>();
        #[expect(clippy::cast_precision_loss)]
        let percent_of = |count: u64| 100.0 * count as f64 / total as f64;

        let mut running = 0;
        let rows = counts
            .into_iter()
            .zip(expected)
            .map(|((category, observed), expected)| {
                running += observed;
                FrequencyRow {
                    category,
                    observed,
                    expected,
                    percent: percent_of(observed),
                    cumulative_percent: percent_of(running),
                }
            })
            .collect::<Vec<_>>();

        tracing::debug!(total, categories = rows.len(), "built frequency table");
        Ok(Self { total, rows })
    }

    /// Total observed count.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.total
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    #[must_use]
    pub fn rows(&self) -> &[FrequencyRow] {
        &self.rows
    }

    pub fn categories(&self) -> impl Iterator<Item = &str> + '_ {
        self.rows.iter().map(|row| row.category.as_str())
    }

    /// Observed counts as `f64`, in category order.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn observed(&self) -> Vec<f64> {
        self.rows.iter().map(|row| row.observed as f64).collect()
    }

    /// Expected counts, in category order.
    #[must_use]
    pub fn expected(&self) -> Vec<f64> {
        self.rows.iter().map(|row| row.expected).collect()
    }
}

impl CategoricalSummary {
    /// Summarizes labels, ignoring missing values.
    ///
    /// ```
    /// # use edakit_stats::frequency::CategoricalSummary;
    /// let summary = CategoricalSummary::from_labels([Some("No"), None, Some("Yes"), Some("No")]);
    /// assert_eq!(summary.count, 3);
    /// assert_eq!(summary.unique, 2);
    /// assert_eq!(summary.top.as_deref(), Some("No"));
    /// assert_eq!(summary.freq, 2);
    /// ```
    pub fn from_labels<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = Option<S>>,
        S: AsRef<str>,
    {
        let mut counts = BTreeMap::<String, u64>::new();
        for label in labels.into_iter().flatten() {
            *counts.entry(label.as_ref().to_owned()).or_default() += 1;
        }
        let mut top: Option<(&String, u64)> = None;
        for (label, &count) in &counts {
            if top.is_none_or(|(_, freq)| count > freq) {
                top = Some((label, count));
            }
        }
        Self {
            count: counts.values().sum(),
            unique: counts.len(),
            top: top.map(|(label, _)| label.clone()),
            freq: top.map_or(0, |(_, freq)| freq),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uniform(labels: &[Option<&str>]) -> Result<FrequencyTable, StatsError> {
        FrequencyTable::from_labels(
            labels.iter().copied(),
            &NullModel::Uniform,
            &MissingPolicy::Exclude,
        )
    }

    fn labels_with_counts(counts: &[(&str, usize)]) -> Vec<Option<String>> {
        counts
            .iter()
            .flat_map(|(label, n)| std::iter::repeat_n(Some((*label).to_owned()), *n))
            .collect()
    }

    #[test]
    fn test_categories_sorted_by_label() {
        let table = uniform(&[Some("b"), Some("c"), Some("a"), Some("c"), Some("c")]).unwrap();
        assert_eq!(table.categories().collect::<Vec<_>>(), ["a", "b", "c"]);
        assert_eq!(table.observed(), [1.0, 1.0, 3.0]);
    }

    #[test]
    fn test_uniform_expected_conserves_mass() {
        let cases: &[&[(&str, usize)]] = &[
            &[("East", 32), ("North", 36), ("South", 35), ("Upper", 34), ("West", 27)],
            &[("x", 1), ("y", 2)],
            &[("only", 7)],
            &[("a", 3), ("b", 5), ("c", 11), ("d", 1), ("e", 2), ("f", 9), ("g", 4)],
        ];
        for counts in cases {
            let labels = labels_with_counts(counts);
            let n = labels.len();
            let k = counts.len();
            let table = FrequencyTable::from_labels(
                labels,
                &NullModel::Uniform,
                &MissingPolicy::Exclude,
            )
            .unwrap();

            #[expect(clippy::cast_precision_loss)]
            let each = n as f64 / k as f64;
            assert!(table.expected().iter().all(|e| (e - each).abs() < 1e-9));
            let observed_sum = table.observed().iter().sum::<f64>();
            let expected_sum = table.expected().iter().sum::<f64>();
            #[expect(clippy::cast_precision_loss)]
            let n = n as f64;
            assert!((observed_sum - n).abs() < 1e-9);
            assert!((expected_sum - n).abs() < 1e-9);
        }
    }

    #[test]
    fn test_missing_excluded_by_default() {
        let table = uniform(&[Some("a"), None, Some("b"), None]).unwrap();
        assert_eq!(table.total(), 2);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_missing_as_category() {
        let table = FrequencyTable::from_labels(
            [Some("a"), None, Some("b"), None],
            &NullModel::Uniform,
            &MissingPolicy::AsCategory("<missing>".to_owned()),
        )
        .unwrap();
        assert_eq!(
            table.categories().collect::<Vec<_>>(),
            ["<missing>", "a", "b"]
        );
        assert_eq!(table.observed(), [2.0, 1.0, 1.0]);
        assert_eq!(table.total(), 4);
    }

    #[test]
    fn test_missing_label_must_be_new() {
        let err = FrequencyTable::from_labels(
            [Some("No"), Some("Yes"), None, Some("No")],
            &NullModel::Uniform,
            &MissingPolicy::AsCategory("No".to_owned()),
        )
        .unwrap_err();
        assert_eq!(
            err,
            StatsError::LabelCollision {
                label: "No".to_owned()
            }
        );

        // nothing missing, nothing to collide with
        let table = FrequencyTable::from_labels(
            [Some("No"), Some("Yes")],
            &NullModel::Uniform,
            &MissingPolicy::AsCategory("No".to_owned()),
        )
        .unwrap();
        assert_eq!(table.observed(), [1.0, 1.0]);
    }

    #[test]
    fn test_empty_input_is_degenerate() {
        let err = uniform(&[None, None]).unwrap_err();
        assert!(matches!(err, StatsError::DegenerateInput { .. }));
    }

    #[test]
    fn test_proportions_are_normalized() {
        let labels = labels_with_counts(&[("a", 10), ("b", 30)]);
        let model = NullModel::Proportions(BTreeMap::from([
            ("a".to_owned(), 1.0),
            ("b".to_owned(), 1.0),
            ("c".to_owned(), 2.0),
        ]));
        let table = FrequencyTable::from_labels(labels, &model, &MissingPolicy::Exclude).unwrap();
        assert_eq!(table.categories().collect::<Vec<_>>(), ["a", "b", "c"]);
        assert_eq!(table.observed(), [10.0, 30.0, 0.0]);
        assert_eq!(table.expected(), [10.0, 10.0, 20.0]);
    }

    #[test]
    fn test_proportions_missing_category() {
        let labels = labels_with_counts(&[("a", 1), ("b", 1), ("z", 1)]);
        let model = NullModel::Proportions(BTreeMap::from([
            ("a".to_owned(), 0.5),
            ("b".to_owned(), 0.5),
        ]));
        let err = FrequencyTable::from_labels(labels, &model, &MissingPolicy::Exclude).unwrap_err();
        assert_eq!(
            err,
            StatsError::CategoryMismatch {
                categories: vec!["z".to_owned()]
            }
        );
    }

    #[test]
    fn test_negative_proportion() {
        let labels = labels_with_counts(&[("a", 1), ("b", 1)]);
        let model = NullModel::Proportions(BTreeMap::from([
            ("a".to_owned(), 1.5),
            ("b".to_owned(), -0.5),
        ]));
        let err = FrequencyTable::from_labels(labels, &model, &MissingPolicy::Exclude).unwrap_err();
        assert!(matches!(err, StatsError::DegenerateInput { .. }));
    }

    #[test]
    fn test_explicit_counts() {
        let labels = labels_with_counts(&[("a", 6), ("b", 4)]);
        let model = NullModel::Counts(BTreeMap::from([
            ("a".to_owned(), 5.0),
            ("b".to_owned(), 5.0),
        ]));
        let table = FrequencyTable::from_labels(labels, &model, &MissingPolicy::Exclude).unwrap();
        assert_eq!(table.expected(), [5.0, 5.0]);
    }

    #[test]
    fn test_explicit_counts_total_mismatch() {
        let labels = labels_with_counts(&[("a", 6), ("b", 4)]);
        let model = NullModel::Counts(BTreeMap::from([
            ("a".to_owned(), 5.0),
            ("b".to_owned(), 6.0),
        ]));
        let err = FrequencyTable::from_labels(labels, &model, &MissingPolicy::Exclude).unwrap_err();
        assert!(matches!(err, StatsError::TotalMismatch { .. }));
    }

    #[test]
    fn test_negative_explicit_count() {
        let labels = labels_with_counts(&[("a", 6), ("b", 4)]);
        let model = NullModel::Counts(BTreeMap::from([
            ("a".to_owned(), 12.0),
            ("b".to_owned(), -2.0),
        ]));
        let err = FrequencyTable::from_labels(labels, &model, &MissingPolicy::Exclude).unwrap_err();
        assert!(matches!(err, StatsError::DegenerateInput { .. }));
    }

    #[test]
    fn test_percentages() {
        let table = uniform(&[Some("a"), Some("b"), Some("b"), Some("c")]).unwrap();
        let rows = table.rows();
        assert!((rows[0].percent - 25.0).abs() < 1e-12);
        assert!((rows[1].percent - 50.0).abs() < 1e-12);
        assert!((rows[1].cumulative_percent - 75.0).abs() < 1e-12);
        assert!((rows[2].cumulative_percent - 100.0).abs() < 1e-12);
    }

    #[test]
    fn test_summary_breaks_ties_by_label() {
        let labels = ["b", "a", "b", "a", "c"].map(Some);
        let summary = CategoricalSummary::from_labels(labels);
        assert_eq!(summary.count, 5);
        assert_eq!(summary.unique, 3);
        assert_eq!(summary.top.as_deref(), Some("a"));
        assert_eq!(summary.freq, 2);
    }

    #[test]
    fn test_summary_of_missing_only() {
        let summary = CategoricalSummary::from_labels([None::<&str>, None]);
        assert_eq!(summary.count, 0);
        assert_eq!(summary.unique, 0);
        assert_eq!(summary.top, None);
        assert_eq!(summary.freq, 0);
    }
}
