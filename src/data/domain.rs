//! Core tabular types: a small column-oriented numeric frame.
//!
//! All pipeline files are purely numeric, so a frame is a list of named
//! `f64` columns of equal length. Column order is significant; it is the
//! order written to disk and the order features are handed to the model.

use ndarray::Array2;

use crate::common::error::{Error, Result};

/// A named column of values.
#[derive(Clone, Debug, PartialEq)]
pub struct Column {
    pub name: String,
    pub values: Vec<f64>,
}

impl Column {
    pub fn new(name: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }
}

/// Ordered set of equally long numeric columns.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Frame {
    columns: Vec<Column>,
    n_rows: usize,
}

impl Frame {
    /// Build a frame, checking that all columns have the same length.
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        let n_rows = columns.first().map_or(0, |c| c.values.len());
        if let Some(bad) = columns.iter().find(|c| c.values.len() != n_rows) {
            return Err(Error::shape(format!(
                "column '{}' has {} rows, expected {}",
                bad.name,
                bad.values.len(),
                n_rows
            )));
        }
        Ok(Self { columns, n_rows })
    }

    /// Build a frame from a header and row-major records.
    pub fn from_rows(headers: Vec<String>, rows: &[Vec<f64>]) -> Result<Self> {
        let mut columns: Vec<Column> = headers
            .into_iter()
            .map(|name| Column::new(name, Vec::with_capacity(rows.len())))
            .collect();
        for (idx, row) in rows.iter().enumerate() {
            if row.len() != columns.len() {
                return Err(Error::shape(format!(
                    "row {} has {} fields, expected {}",
                    idx,
                    row.len(),
                    columns.len()
                )));
            }
            for (col, value) in columns.iter_mut().zip(row) {
                col.values.push(*value);
            }
        }
        Ok(Self {
            columns,
            n_rows: rows.len(),
        })
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    /// `(rows, cols)`, for logging.
    pub fn shape(&self) -> (usize, usize) {
        (self.n_rows, self.columns.len())
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name == name)
    }

    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.values.as_slice())
    }

    /// Like [`Frame::column`] but a missing column is an error.
    pub fn require(&self, name: &str) -> Result<&[f64]> {
        self.column(name)
            .ok_or_else(|| Error::missing_column(name))
    }

    /// Insert a column, replacing an existing one of the same name in place.
    /// New columns are appended at the end.
    pub fn insert(&mut self, column: Column) -> Result<()> {
        if !self.columns.is_empty() && column.values.len() != self.n_rows {
            return Err(Error::shape(format!(
                "column '{}' has {} rows, expected {}",
                column.name,
                column.values.len(),
                self.n_rows
            )));
        }
        if self.columns.is_empty() {
            self.n_rows = column.values.len();
        }
        match self.columns.iter_mut().find(|c| c.name == column.name) {
            Some(existing) => existing.values = column.values,
            None => self.columns.push(column),
        }
        Ok(())
    }

    /// Drop the named columns. Names that are not present are ignored.
    pub fn drop_columns(&mut self, names: &[&str]) {
        self.columns.retain(|c| !names.contains(&c.name.as_str()));
    }

    /// New frame with exactly `names`, in that order.
    pub fn select(&self, names: &[&str]) -> Result<Frame> {
        let columns = names
            .iter()
            .map(|name| {
                self.columns
                    .iter()
                    .find(|c| c.name == *name)
                    .cloned()
                    .ok_or_else(|| Error::missing_column(*name))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Frame {
            columns,
            n_rows: self.n_rows,
        })
    }

    /// Remove and return one column, leaving the rest in order.
    pub fn split_off(&mut self, name: &str) -> Result<Column> {
        let idx = self
            .columns
            .iter()
            .position(|c| c.name == name)
            .ok_or_else(|| Error::missing_column(name))?;
        Ok(self.columns.remove(idx))
    }

    /// New frame holding the given rows, in the given order.
    pub fn take_rows(&self, indices: &[usize]) -> Result<Frame> {
        if let Some(&bad) = indices.iter().find(|&&i| i >= self.n_rows) {
            return Err(Error::shape(format!(
                "row index {bad} out of bounds for {} rows",
                self.n_rows
            )));
        }
        let columns = self
            .columns
            .iter()
            .map(|c| Column::new(c.name.clone(), indices.iter().map(|&i| c.values[i]).collect()))
            .collect();
        Ok(Frame {
            columns,
            n_rows: indices.len(),
        })
    }

    /// Values of row `idx` in column order.
    pub fn row(&self, idx: usize) -> Vec<f64> {
        self.columns.iter().map(|c| c.values[idx]).collect()
    }

    /// Row-major feature matrix in column order.
    pub fn to_matrix(&self) -> Array2<f64> {
        Array2::from_shape_fn((self.n_rows, self.columns.len()), |(r, c)| {
            self.columns[c].values[r]
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Frame {
        Frame::new(vec![
            Column::new("a", vec![1.0, 2.0, 3.0]),
            Column::new("b", vec![10.0, 20.0, 30.0]),
            Column::new("c", vec![0.5, 0.25, 0.125]),
        ])
        .unwrap()
    }

    #[test]
    fn rejects_ragged_columns() {
        let err = Frame::new(vec![
            Column::new("a", vec![1.0, 2.0]),
            Column::new("b", vec![1.0]),
        ])
        .unwrap_err();
        assert!(matches!(err, Error::Shape(_)));
    }

    #[test]
    fn select_reorders_and_reports_missing() {
        let frame = sample();
        let picked = frame.select(&["c", "a"]).unwrap();
        assert_eq!(picked.column_names(), vec!["c", "a"]);
        assert_eq!(picked.row(1), vec![0.25, 2.0]);

        let err = frame.select(&["a", "zzz"]).unwrap_err();
        assert!(matches!(err, Error::MissingColumn { ref column } if column == "zzz"));
    }

    #[test]
    fn drop_is_lenient() {
        let mut frame = sample();
        frame.drop_columns(&["b", "not-there"]);
        assert_eq!(frame.column_names(), vec!["a", "c"]);
        frame.drop_columns(&["b"]);
        assert_eq!(frame.n_cols(), 2);
    }

    #[test]
    fn insert_replaces_in_place() {
        let mut frame = sample();
        frame.insert(Column::new("b", vec![0.0, 0.0, 0.0])).unwrap();
        assert_eq!(frame.column_names(), vec!["a", "b", "c"]);
        assert_eq!(frame.column("b").unwrap(), &[0.0, 0.0, 0.0]);

        frame.insert(Column::new("d", vec![1.0, 1.0, 1.0])).unwrap();
        assert_eq!(frame.column_names(), vec!["a", "b", "c", "d"]);
        assert!(frame.insert(Column::new("e", vec![1.0])).is_err());
    }

    #[test]
    fn take_rows_and_matrix() {
        let frame = sample();
        let sub = frame.take_rows(&[2, 0]).unwrap();
        assert_eq!(sub.n_rows(), 2);
        let m = sub.to_matrix();
        assert_eq!(m.dim(), (2, 3));
        assert_eq!(m[[0, 1]], 30.0);
        assert_eq!(m[[1, 0]], 1.0);
        assert!(frame.take_rows(&[3]).is_err());
    }

    #[test]
    fn split_off_keeps_remaining_order() {
        let mut frame = sample();
        let b = frame.split_off("b").unwrap();
        assert_eq!(b.values, vec![10.0, 20.0, 30.0]);
        assert_eq!(frame.column_names(), vec!["a", "c"]);
        assert!(frame.split_off("b").is_err());
    }
}
