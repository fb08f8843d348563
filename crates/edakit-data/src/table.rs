use std::collections::BTreeSet;

use serde::Serialize;

use crate::DataError;

/// An immutable, column-oriented in-memory table.
///
/// All columns have the same length and rows are aligned by position.
/// A table may carry an index: one label per row, taken from the column
/// designated with [`ReadOptions::index_col`](crate::ReadOptions::index_col).
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    index: Option<Vec<String>>,
    columns: Vec<Column>,
    num_rows: usize,
}

/// A named column of typed values. `None` marks a missing value.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    name: String,
    values: ColumnValues,
}

/// Storage for the values of a [`Column`].
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnValues {
    Numeric(Vec<Option<f64>>),
    Categorical(Vec<Option<String>>),
}

/// The inferred type of a [`Column`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, derive_more::Display)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    #[display("numeric")]
    Numeric,
    #[display("categorical")]
    Categorical,
}

/// Shape and size of a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TableOverview {
    /// Number of observations (rows).
    pub rows: usize,
    /// Number of variables (columns, excluding the index).
    pub variables: usize,
    /// Number of cells (`rows * variables`).
    pub cells: usize,
}

/// Data quality summary of a single column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnProfile {
    pub name: String,
    pub kind: ColumnKind,
    /// Number of non-missing values.
    pub valid: usize,
    /// Number of missing values.
    pub null: usize,
    /// Fraction of rows holding a value (`valid / rows`).
    pub validity: f64,
    /// Number of distinct non-missing values.
    pub cardinality: usize,
    /// Fraction of rows that are distinct values (`cardinality / rows`).
    pub percent_unique: f64,
}

impl Column {
    /// Creates a numeric column.
    ///
    /// ```
    /// # use edakit_data::{Column, ColumnKind};
    /// let column = Column::numeric("Age", [Some(34.0), None, Some(71.0)]);
    /// assert_eq!(column.kind(), ColumnKind::Numeric);
    /// assert_eq!(column.null_count(), 1);
    /// ```
    pub fn numeric<I>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = Option<f64>>,
    {
        Self {
            name: name.into(),
            values: ColumnValues::Numeric(values.into_iter().collect()),
        }
    }

    /// Creates a categorical column.
    pub fn categorical<I, S>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = Option<S>>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            values: ColumnValues::Categorical(
                values.into_iter().map(|v| v.map(Into::into)).collect(),
            ),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn values(&self) -> &ColumnValues {
        &self.values
    }

    #[must_use]
    pub fn kind(&self) -> ColumnKind {
        match &self.values {
            ColumnValues::Numeric(_) => ColumnKind::Numeric,
            ColumnValues::Categorical(_) => ColumnKind::Categorical,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        match &self.values {
            ColumnValues::Numeric(values) => values.len(),
            ColumnValues::Categorical(values) => values.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the numeric values, or `None` for a categorical column.
    #[must_use]
    pub fn as_numeric(&self) -> Option<&[Option<f64>]> {
        match &self.values {
            ColumnValues::Numeric(values) => Some(values),
            ColumnValues::Categorical(_) => None,
        }
    }

    /// Returns the categorical values, or `None` for a numeric column.
    #[must_use]
    pub fn as_categorical(&self) -> Option<&[Option<String>]> {
        match &self.values {
            ColumnValues::Numeric(_) => None,
            ColumnValues::Categorical(values) => Some(values),
        }
    }

    /// Number of missing values.
    #[must_use]
    pub fn null_count(&self) -> usize {
        match &self.values {
            ColumnValues::Numeric(values) => values.iter().filter(|v| v.is_none()).count(),
            ColumnValues::Categorical(values) => values.iter().filter(|v| v.is_none()).count(),
        }
    }

    /// Number of non-missing values.
    #[must_use]
    pub fn valid_count(&self) -> usize {
        self.len() - self.null_count()
    }

    /// Number of distinct non-missing values.
    ///
    /// Numeric values are compared by their bit pattern, with `-0.0`
    /// folded into `0.0`.
    #[must_use]
    pub fn cardinality(&self) -> usize {
        match &self.values {
            // -0.0 + 0.0 == +0.0
            ColumnValues::Numeric(values) => values
                .iter()
                .flatten()
                .map(|v| (v + 0.0).to_bits())
                .collect::<BTreeSet<_>>()
                .len(),
            ColumnValues::Categorical(values) => {
                values.iter().flatten().collect::<BTreeSet<_>>().len()
            }
        }
    }

    fn head(&self, n: usize) -> Self {
        let values = match &self.values {
            ColumnValues::Numeric(values) => {
                ColumnValues::Numeric(values.iter().take(n).copied().collect())
            }
            ColumnValues::Categorical(values) => {
                ColumnValues::Categorical(values.iter().take(n).cloned().collect())
            }
        };
        Self {
            name: self.name.clone(),
            values,
        }
    }
}

impl Table {
    /// Creates a table from columns of equal length.
    ///
    /// # Panics
    ///
    /// Panics if the columns differ in length or two columns share a name.
    #[must_use]
    pub fn new(columns: Vec<Column>) -> Self {
        let num_rows = columns.first().map_or(0, Column::len);
        assert!(
            columns.iter().all(|c| c.len() == num_rows),
            "all columns must have the same length"
        );
        let mut names = BTreeSet::new();
        assert!(
            columns.iter().all(|c| names.insert(c.name())),
            "column names must be unique"
        );
        Self {
            index: None,
            columns,
            num_rows,
        }
    }

    /// Attaches row labels to the table.
    ///
    /// # Panics
    ///
    /// Panics if the number of labels differs from the number of rows.
    #[must_use]
    pub fn with_index(mut self, labels: Vec<String>) -> Self {
        assert_eq!(
            labels.len(),
            self.num_rows,
            "index length must match the number of rows"
        );
        self.index = Some(labels);
        self
    }

    #[must_use]
    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    #[must_use]
    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    /// Returns `(rows, columns)`.
    #[must_use]
    pub fn shape(&self) -> (usize, usize) {
        (self.num_rows, self.columns.len())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.num_rows == 0
    }

    #[must_use]
    pub fn index(&self) -> Option<&[String]> {
        self.index.as_deref()
    }

    #[must_use]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.columns.iter().map(Column::name)
    }

    /// Looks up a column by name.
    ///
    /// ```
    /// # use edakit_data::{Column, Table};
    /// let table = Table::new(vec![Column::numeric("Income", [Some(1.0)])]);
    /// assert!(table.column("Income").is_ok());
    /// assert!(table.column("Balance").unwrap_err().is_column_not_found());
    /// ```
    pub fn column(&self, name: &str) -> Result<&Column, DataError> {
        self.columns
            .iter()
            .find(|c| c.name() == name)
            .ok_or_else(|| DataError::ColumnNotFound {
                name: name.to_owned(),
            })
    }

    /// Returns a table with only the named columns, in table order.
    ///
    /// Names that are not in the table are ignored.
    #[must_use]
    pub fn select(&self, include: &[&str]) -> Self {
        self.project(|name| include.contains(&name))
    }

    /// Returns a table without the named columns.
    ///
    /// Names that are not in the table are ignored.
    #[must_use]
    pub fn drop(&self, exclude: &[&str]) -> Self {
        self.project(|name| !exclude.contains(&name))
    }

    fn project(&self, mut keep: impl FnMut(&str) -> bool) -> Self {
        Self {
            index: self.index.clone(),
            columns: self
                .columns
                .iter()
                .filter(|c| keep(c.name()))
                .cloned()
                .collect(),
            num_rows: self.num_rows,
        }
    }

    /// Returns the first `n` rows.
    #[must_use]
    pub fn head(&self, n: usize) -> Self {
        let n = n.min(self.num_rows);
        Self {
            index: self
                .index
                .as_ref()
                .map(|labels| labels.iter().take(n).cloned().collect()),
            columns: self.columns.iter().map(|c| c.head(n)).collect(),
            num_rows: n,
        }
    }

    #[must_use]
    pub fn overview(&self) -> TableOverview {
        TableOverview {
            rows: self.num_rows,
            variables: self.columns.len(),
            cells: self.num_rows * self.columns.len(),
        }
    }

    /// Computes per-column data quality measures.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn profile(&self) -> Vec<ColumnProfile> {
        let rows = self.num_rows as f64;
        let ratio = |count: usize| {
            if self.num_rows == 0 {
                0.0
            } else {
                count as f64 / rows
            }
        };
        self.columns
            .iter()
            .map(|column| {
                let valid = column.valid_count();
                let cardinality = column.cardinality();
                ColumnProfile {
                    name: column.name().to_owned(),
                    kind: column.kind(),
                    valid,
                    null: column.len() - valid,
                    validity: ratio(valid),
                    cardinality,
                    percent_unique: ratio(cardinality),
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_table() -> Table {
        Table::new(vec![
            Column::numeric("Income", [Some(14.9), Some(106.0), None, Some(14.9)]),
            Column::categorical(
                "Gender",
                [Some("Male"), Some("Female"), Some("Female"), None],
            ),
            Column::categorical("Student", [Some("No"), Some("Yes"), Some("No"), Some("No")]),
        ])
    }

    #[test]
    fn test_shape_and_names() {
        let table = sample_table();
        assert_eq!(table.shape(), (4, 3));
        assert_eq!(
            table.column_names().collect::<Vec<_>>(),
            ["Income", "Gender", "Student"]
        );
        assert!(table.index().is_none());
    }

    #[test]
    fn test_missing_column() {
        let table = sample_table();
        let err = table.column("Balance").unwrap_err();
        assert!(matches!(err, DataError::ColumnNotFound { ref name } if name == "Balance"));
    }

    #[test]
    fn test_profile() {
        let profile = sample_table().profile();
        assert_eq!(profile.len(), 3);

        let income = &profile[0];
        assert_eq!(income.kind, ColumnKind::Numeric);
        assert_eq!(income.valid, 3);
        assert_eq!(income.null, 1);
        assert_eq!(income.cardinality, 2);
        assert!((income.validity - 0.75).abs() < 1e-12);
        assert!((income.percent_unique - 0.5).abs() < 1e-12);

        let gender = &profile[1];
        assert_eq!(gender.kind, ColumnKind::Categorical);
        assert_eq!(gender.cardinality, 2);
        assert_eq!(gender.null, 1);
    }

    #[test]
    fn test_overview() {
        let overview = sample_table().overview();
        assert_eq!(overview.rows, 4);
        assert_eq!(overview.variables, 3);
        assert_eq!(overview.cells, 12);
    }

    #[test]
    fn test_select_and_drop_preserve_order() {
        let table = sample_table();
        let selected = table.select(&["Student", "Income", "Unknown"]);
        assert_eq!(
            selected.column_names().collect::<Vec<_>>(),
            ["Income", "Student"]
        );
        let dropped = table.drop(&["Gender"]);
        assert_eq!(
            dropped.column_names().collect::<Vec<_>>(),
            ["Income", "Student"]
        );
        assert_eq!(dropped.num_rows(), 4);
    }

    #[test]
    fn test_head_keeps_index() {
        let table = sample_table().with_index(vec!["a".into(), "b".into(), "c".into(), "d".into()]);
        let head = table.head(2);
        assert_eq!(head.shape(), (2, 3));
        assert_eq!(head.index(), Some(&["a".to_owned(), "b".to_owned()][..]));
        assert_eq!(
            head.column("Gender").unwrap().as_categorical().unwrap(),
            &[Some("Male".to_owned()), Some("Female".to_owned())]
        );
        assert_eq!(table.head(10).num_rows(), 4);
    }

    #[test]
    fn test_negative_zero_is_not_distinct() {
        let column = Column::numeric("x", [Some(0.0), Some(-0.0), Some(1.0)]);
        assert_eq!(column.cardinality(), 2);
    }

    #[test]
    #[should_panic(expected = "same length")]
    fn test_unequal_columns_panic() {
        let _ = Table::new(vec![
            Column::numeric("a", [Some(1.0)]),
            Column::numeric("b", [Some(1.0), Some(2.0)]),
        ]);
    }
}
