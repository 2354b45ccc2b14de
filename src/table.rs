//! Row-oriented view of a run's `output.csv`.
//!
//! The file is semicolon-delimited without a header row; column names come
//! from the schema registry and are assigned positionally. Values stay text:
//! numeric interpretation is up to the caller.

use crate::error::{Error, Result};

use serde::Serialize;
use std::fs;
use std::path::Path;

/// An immutable table: ordered column names plus rows of text values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl LogTable {
    /// Load `path` with `columns` assigned positionally.
    ///
    /// The physical file interleaves rows of several event types, so the
    /// caller supplies the union (widest) schema of the types it will query:
    /// rows with fewer values are padded with empty strings, rows with more
    /// values than columns fail with [`Error::ColumnArityMismatch`].
    pub fn load(path: &Path, columns: Vec<String>) -> Result<Self> {
        if !path.is_file() {
            return Err(Error::NotFound {
                what: "log file".to_string(),
                path: path.to_path_buf(),
            });
        }
        let text = fs::read_to_string(path)?;

        let mut rows = Vec::new();
        for (lineno, line) in text.lines().enumerate() {
            let line = line.trim_end();
            if line.is_empty() {
                continue;
            }

            let mut values: Vec<String> = line.split(';').map(str::to_string).collect();
            if values.len() > columns.len() {
                return Err(Error::ColumnArityMismatch {
                    path: path.to_path_buf(),
                    line: lineno + 1,
                    expected: columns.len(),
                    found: values.len(),
                });
            }
            values.resize(columns.len(), String::new());
            rows.push(values);
        }

        Ok(Self { columns, rows })
    }

    /// Build a table directly from values; every row must match the column
    /// arity exactly.
    pub fn from_rows(columns: Vec<String>, rows: Vec<Vec<String>>) -> Result<Self> {
        for (i, row) in rows.iter().enumerate() {
            if row.len() != columns.len() {
                return Err(Error::ColumnArityMismatch {
                    path: "<memory>".into(),
                    line: i + 1,
                    expected: columns.len(),
                    found: row.len(),
                });
            }
        }
        Ok(Self { columns, rows })
    }

    /// Position of a column by name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;

    fn cols(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn loads_semicolon_rows_positionally() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("output.csv");
        fs::write(
            &path,
            "VEHICLE_UPDATES;1.0;veh_0;5.2\nVEHICLE_UPDATES;2.0;veh_0;6.1\n",
        )
        .unwrap();

        let table = LogTable::load(&path, cols(&["Event", "Time", "Name", "Speed"])).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows[0], vec!["VEHICLE_UPDATES", "1.0", "veh_0", "5.2"]);
        assert_eq!(table.rows[1][3], "6.1");
    }

    #[test]
    fn short_rows_are_padded_to_the_union_schema() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("output.csv");
        fs::write(
            &path,
            "VEHICLE_UPDATES;1.0;veh_0;5.2\nCELL_HANDOVER;1.5;veh_0\n",
        )
        .unwrap();

        let table = LogTable::load(&path, cols(&["Event", "Time", "Name", "Speed"])).unwrap();
        assert_eq!(table.rows[1], vec!["CELL_HANDOVER", "1.5", "veh_0", ""]);
    }

    #[test]
    fn wide_rows_fail_with_arity_mismatch() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("output.csv");
        fs::write(&path, "VEHICLE_UPDATES;1.0;veh_0;5.2;extra\n").unwrap();

        let err = LogTable::load(&path, cols(&["Event", "Time", "Name", "Speed"])).unwrap_err();
        match err {
            Error::ColumnArityMismatch {
                line,
                expected,
                found,
                ..
            } => {
                assert_eq!((line, expected, found), (1, 4, 5));
            }
            other => panic!("expected arity mismatch, got {other:?}"),
        }
    }

    #[test]
    fn missing_file_is_not_found() {
        let tmp = tempfile::tempdir().unwrap();
        let err = LogTable::load(&tmp.path().join("output.csv"), cols(&["Event"])).unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }), "got {err:?}");
    }

}
