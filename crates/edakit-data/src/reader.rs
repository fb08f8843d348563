//! Delimited text reader with per-column type inference.
//!
//! Every field is read as text first. A column becomes
//! [`ColumnKind::Numeric`](crate::ColumnKind::Numeric) when all of its
//! non-missing fields parse as `f64`, and
//! [`ColumnKind::Categorical`](crate::ColumnKind::Categorical) otherwise.

use std::{
    collections::BTreeSet,
    fs::File,
    io::{self, BufReader},
    path::Path,
};

use crate::{Column, DataError, Table};

/// Settings for [`Table::read_csv`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadOptions {
    /// Field delimiter.
    pub delimiter: u8,
    /// Column whose values become the row index. The column is removed from
    /// the table's columns.
    pub index_col: Option<String>,
    /// Columns always read as categorical, even when every value is numeric.
    pub categorical: Vec<String>,
    /// Field values (after trimming) that denote a missing value.
    ///
    /// In numeric columns, values that parse to NaN or an infinity are
    /// missing as well.
    pub na_values: Vec<String>,
    /// Whether leading and trailing whitespace is removed from every field.
    pub trim: bool,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            index_col: None,
            categorical: vec![],
            na_values: [
                "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND",
                "1.#QNAN", "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
            ]
            .into_iter()
                .map(str::to_owned)
                .collect(),
            trim: true,
        }
    }
}

impl ReadOptions {
    fn is_na(&self, field: &str) -> bool {
        self.na_values.iter().any(|na| na == field)
    }
}

impl Table {
    /// Reads a delimited text file with a header row.
    ///
    /// # Errors
    ///
    /// - [`DataError::FileAccess`] if the file cannot be opened or read
    /// - [`DataError::Parse`] if the header is missing or duplicated, or a
    ///   record has a different number of fields than the header
    /// - [`DataError::ColumnNotFound`] if `index_col` or a `categorical`
    ///   entry names a column that is not in the header
    pub fn read_csv<P>(path: P, options: &ReadOptions) -> Result<Self, DataError>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        tracing::debug!(path = %path.display(), "reading table");
        let file = File::open(path).map_err(|source| DataError::FileAccess {
            path: path.to_owned(),
            source,
        })?;
        read_table(BufReader::new(file), path, options)
    }

    /// Like [`Self::read_csv`], but reads from an in-memory source.
    ///
    /// ```
    /// # use edakit_data::{ColumnKind, ReadOptions, Table};
    /// let data = "Gender,Income\nMale,14.891\nFemale,106.025\n";
    /// let table = Table::read_csv_from(data.as_bytes(), &ReadOptions::default())?;
    /// assert_eq!(table.shape(), (2, 2));
    /// assert_eq!(table.column("Income")?.kind(), ColumnKind::Numeric);
    /// # Ok::<(), edakit_data::DataError>(())
    /// ```
    pub fn read_csv_from<R>(reader: R, options: &ReadOptions) -> Result<Self, DataError>
    where
        R: io::Read,
    {
        read_table(reader, Path::new("<reader>"), options)
    }
}

fn read_table<R>(reader: R, path: &Path, options: &ReadOptions) -> Result<Table, DataError>
where
    R: io::Read,
{
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(options.delimiter)
        .has_headers(true)
        .trim(if options.trim {
            csv::Trim::All
        } else {
            csv::Trim::None
        })
        .from_reader(reader);

    let headers = read_headers(&mut reader, path)?;
    let index_pos = options
        .index_col
        .as_deref()
        .map(|name| find_header(&headers, name))
        .transpose()?;
    let categorical = options
        .categorical
        .iter()
        .map(|name| find_header(&headers, name))
        .collect::<Result<BTreeSet<_>, _>>()?;

    let mut fields = vec![Vec::<Option<String>>::new(); headers.len()];
    let mut index = vec![];
    for result in reader.records() {
        let record = result.map_err(|err| csv_error(path, err))?;
        for (pos, field) in record.iter().enumerate() {
            if Some(pos) == index_pos {
                index.push(field.to_owned());
            } else if options.is_na(field) {
                fields[pos].push(None);
            } else {
                fields[pos].push(Some(field.to_owned()));
            }
        }
    }

    let columns = headers
        .into_iter()
        .zip(fields)
        .enumerate()
        .filter(|(pos, _)| Some(*pos) != index_pos)
        .map(|(pos, (name, values))| infer_column(name, values, categorical.contains(&pos)))
        .collect::<Vec<_>>();
    if columns.is_empty() {
        return Err(DataError::Parse {
            path: path.to_owned(),
            line: 1,
            message: "no columns besides the index".to_owned(),
        });
    }

    let mut table = Table::new(columns);
    if index_pos.is_some() {
        table = table.with_index(index);
    }
    tracing::info!(
        path = %path.display(),
        rows = table.num_rows(),
        columns = table.num_columns(),
        "table loaded"
    );
    Ok(table)
}

fn read_headers<R>(reader: &mut csv::Reader<R>, path: &Path) -> Result<Vec<String>, DataError>
where
    R: io::Read,
{
    let record = reader.headers().map_err(|err| csv_error(path, err))?;
    if record.is_empty() {
        return Err(DataError::Parse {
            path: path.to_owned(),
            line: 1,
            message: "missing header row".to_owned(),
        });
    }

    let mut seen = BTreeSet::new();
    let mut headers = Vec::with_capacity(record.len());
    for (pos, name) in record.iter().enumerate() {
        // Unlabeled columns (typically a written-out index) get a positional name.
        let name = if name.is_empty() {
            format!("Unnamed: {pos}")
        } else {
            name.to_owned()
        };
        if !seen.insert(name.clone()) {
            return Err(DataError::Parse {
                path: path.to_owned(),
                line: 1,
                message: format!("duplicate column name '{name}'"),
            });
        }
        headers.push(name);
    }
    Ok(headers)
}

fn find_header(headers: &[String], name: &str) -> Result<usize, DataError> {
    headers
        .iter()
        .position(|h| h == name)
        .ok_or_else(|| DataError::ColumnNotFound {
            name: name.to_owned(),
        })
}

fn infer_column(name: String, values: Vec<Option<String>>, force_categorical: bool) -> Column {
    if !force_categorical {
        let numeric = values
            .iter()
            .map(|v| v.as_deref().map(str::parse::<f64>).transpose())
            .collect::<Result<Vec<_>, _>>();
        if let Ok(numeric) = numeric {
            let non_finite = numeric.iter().flatten().filter(|x| !x.is_finite()).count();
            if non_finite > 0 {
                tracing::debug!(
                    column = %name,
                    non_finite,
                    "treated non-finite values as missing"
                );
            }
            tracing::debug!(column = %name, kind = "numeric", "inferred column type");
            let finite = numeric.into_iter().map(|x| x.filter(|x| x.is_finite()));
            return Column::numeric(name, finite);
        }
    }
    tracing::debug!(column = %name, kind = "categorical", "inferred column type");
    Column::categorical(name, values)
}

fn csv_error(path: &Path, err: csv::Error) -> DataError {
    let line = err.position().map_or(0, csv::Position::line);
    let message = match err.into_kind() {
        csv::ErrorKind::Io(source) => {
            return DataError::FileAccess {
                path: path.to_owned(),
                source,
            };
        }
        csv::ErrorKind::UnequalLengths {
            expected_len, len, ..
        } => format!("expected {expected_len} fields, found {len}"),
        csv::ErrorKind::Utf8 { err, .. } => format!("invalid UTF-8: {err}"),
        kind => format!("{kind:?}"),
    };
    DataError::Parse {
        path: path.to_owned(),
        line,
        message,
    }
}
