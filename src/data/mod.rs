use ndarray::{Array1, Array2, ArrayView1, ArrayViewMut1, ArrayViewMut2, Axis};

use crate::error::{Error, Result};

/// Row-addressable storage that can be rearranged in place.
///
/// Indices passed to these methods must be below `height()`.
pub trait RowTable {
    type Row;

    fn height(&self) -> usize;

    /// Copy of every part of row `index`.
    fn copy_row(&self, index: usize) -> Self::Row;

    /// Overwrite row `index` with `row`.
    fn put_row(&mut self, index: usize, row: Self::Row);

    /// Make row `to` hold what row `from` holds. Afterwards the content of `from` is
    /// unspecified, so callers must overwrite it before relying on it again.
    fn move_row(&mut self, from: usize, to: usize);
}

impl<T: Clone> RowTable for Vec<T> {
    type Row = T;

    fn height(&self) -> usize {
        self.len()
    }

    fn copy_row(&self, index: usize) -> T {
        self[index].clone()
    }

    fn put_row(&mut self, index: usize, row: T) {
        self[index] = row;
    }

    fn move_row(&mut self, from: usize, to: usize) {
        self.swap(from, to);
    }
}

const TEXT_ROWS: &str = "text row count";

/// One row of a [`DataSet`], detached from the set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataRow {
    pub vector: Option<f64>,
    pub matrix: Option<Array1<f64>>,
    pub text: Vec<String>,
    pub weight: Option<f64>,
    pub name: Option<String>,
}

/// A table whose rows carry a numeric matrix part, a grid of text and optionally a single
/// auxiliary value (the vector), a weight and a row name.
///
/// Every part that is present has the same number of rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataSet {
    vector: Option<Array1<f64>>,
    matrix: Option<Array2<f64>>,
    text: Array2<String>,
    weights: Option<Array1<f64>>,
    row_names: Vec<String>,
}

impl DataSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_vector(vector: Array1<f64>) -> Self {
        DataSet {
            vector: Some(vector),
            ..Default::default()
        }
    }

    pub fn from_matrix(matrix: Array2<f64>) -> Self {
        DataSet {
            matrix: Some(matrix),
            ..Default::default()
        }
    }

    pub fn from_text(text: Array2<String>) -> Self {
        DataSet {
            text,
            ..Default::default()
        }
    }

    pub fn with_vector(mut self, vector: Array1<f64>) -> Result<Self> {
        self.vector = Some(vector);
        self.validate()?;
        Ok(self)
    }

    pub fn with_matrix(mut self, matrix: Array2<f64>) -> Result<Self> {
        self.matrix = Some(matrix);
        self.validate()?;
        Ok(self)
    }

    pub fn with_text(mut self, text: Array2<String>) -> Result<Self> {
        self.text = text;
        self.validate()?;
        Ok(self)
    }

    pub fn with_weights(mut self, weights: Array1<f64>) -> Result<Self> {
        self.weights = Some(weights);
        self.validate()?;
        Ok(self)
    }

    pub fn with_row_names<S: Into<String>>(
        mut self,
        names: impl IntoIterator<Item = S>,
    ) -> Result<Self> {
        self.row_names = names.into_iter().map(Into::into).collect();
        self.validate()?;
        Ok(self)
    }

    fn part_heights(&self) -> Vec<(&'static str, usize)> {
        let mut heights = Vec::with_capacity(5);
        if let Some(v) = &self.vector {
            heights.push(("vector length", v.len()));
        }
        if let Some(m) = &self.matrix {
            heights.push(("matrix row count", m.nrows()));
        }
        if self.has_text() {
            heights.push((TEXT_ROWS, self.text.nrows()));
        }
        if let Some(w) = &self.weights {
            heights.push(("weights length", w.len()));
        }
        if !self.row_names.is_empty() {
            heights.push(("row name count", self.row_names.len()));
        }
        heights
    }

    fn validate(&self) -> Result<()> {
        let heights = self.part_heights();
        if let Some(&(_, expected)) = heights.first() {
            for &(context, found) in &heights[1..] {
                if found != expected {
                    return Err(Error::DimensionMismatch {
                        context,
                        expected,
                        found,
                    });
                }
            }
        }
        Ok(())
    }

    /// Number of rows shared by the parts that are present; zero for an empty set.
    pub fn height(&self) -> usize {
        self.part_heights().first().map_or(0, |&(_, h)| h)
    }

    pub fn is_empty(&self) -> bool {
        self.height() == 0
    }

    pub fn has_text(&self) -> bool {
        self.text.nrows() > 0
    }

    pub fn vector(&self) -> Option<&Array1<f64>> {
        self.vector.as_ref()
    }

    pub fn vector_mut(&mut self) -> Option<ArrayViewMut1<'_, f64>> {
        self.vector.as_mut().map(|v| v.view_mut())
    }

    pub fn matrix(&self) -> Option<&Array2<f64>> {
        self.matrix.as_ref()
    }

    pub fn matrix_mut(&mut self) -> Option<ArrayViewMut2<'_, f64>> {
        self.matrix.as_mut().map(|m| m.view_mut())
    }

    pub fn text(&self) -> &Array2<String> {
        &self.text
    }

    pub fn weights(&self) -> Option<&Array1<f64>> {
        self.weights.as_ref()
    }

    pub fn row_names(&self) -> &[String] {
        &self.row_names
    }

    /// Column `index` of the matrix part.
    pub fn column(&self, index: usize) -> Option<ArrayView1<'_, f64>> {
        self.matrix
            .as_ref()
            .filter(|m| index < m.ncols())
            .map(|m| m.column(index))
    }

    pub fn set_text(&mut self, row: usize, col: usize, value: impl Into<String>) -> Result<()> {
        let (rows, cols) = self.text.dim();
        let cell = self.text.get_mut((row, col)).ok_or_else(|| {
            Error::invalid(format!(
                "text cell ({}, {}) is outside a {}x{} text grid",
                row, col, rows, cols
            ))
        })?;
        *cell = value.into();
        Ok(())
    }

    /// Resize the text grid to `rows` x `cols`, keeping the cells that still fit and
    /// filling new cells with empty strings.
    pub fn text_alloc(&mut self, rows: usize, cols: usize) -> Result<()> {
        if rows > 0 {
            let other = self
                .part_heights()
                .into_iter()
                .find(|&(context, _)| context != TEXT_ROWS);
            if let Some((context, expected)) = other {
                if expected != rows {
                    return Err(Error::DimensionMismatch {
                        context,
                        expected,
                        found: rows,
                    });
                }
            }
        }
        let mut old = std::mem::take(&mut self.text);
        let (old_rows, old_cols) = old.dim();
        self.text = Array2::from_shape_fn((rows, cols), |(i, j)| {
            if i < old_rows && j < old_cols {
                std::mem::take(&mut old[[i, j]])
            } else {
                String::new()
            }
        });
        Ok(())
    }

    fn check_row_index(&self, index: usize) -> Result<()> {
        let height = self.height();
        if index >= height {
            return Err(Error::invalid(format!(
                "row {} requested from a data set with {} rows",
                index, height
            )));
        }
        Ok(())
    }

    /// Copy of row `index`.
    pub fn row(&self, index: usize) -> Result<DataRow> {
        self.check_row_index(index)?;
        Ok(self.copy_row(index))
    }

    /// Overwrite row `index` with `row`, which must have the same layout as this set.
    pub fn set_row(&mut self, index: usize, row: &DataRow) -> Result<()> {
        self.check_row_index(index)?;
        if self.vector.is_some() != row.vector.is_some() {
            return Err(Error::invalid("row and data set disagree on the vector part"));
        }
        match (&self.matrix, &row.matrix) {
            (Some(m), Some(r)) if m.ncols() != r.len() => {
                return Err(Error::DimensionMismatch {
                    context: "matrix row width",
                    expected: m.ncols(),
                    found: r.len(),
                })
            }
            (Some(_), None) | (None, Some(_)) => {
                return Err(Error::invalid("row and data set disagree on the matrix part"))
            }
            _ => {}
        }
        if self.has_text() && self.text.ncols() != row.text.len() {
            return Err(Error::DimensionMismatch {
                context: "text row width",
                expected: self.text.ncols(),
                found: row.text.len(),
            });
        }
        if self.weights.is_some() != row.weight.is_some() {
            return Err(Error::invalid("row and data set disagree on the weights part"));
        }
        if !self.row_names.is_empty() && row.name.is_none() {
            return Err(Error::invalid("row carries no name for a named data set"));
        }
        self.put_row(index, row.clone());
        Ok(())
    }
}

impl RowTable for DataSet {
    type Row = DataRow;

    fn height(&self) -> usize {
        DataSet::height(self)
    }

    fn copy_row(&self, index: usize) -> DataRow {
        DataRow {
            vector: self.vector.as_ref().map(|v| v[index]),
            matrix: self.matrix.as_ref().map(|m| m.row(index).to_owned()),
            text: if self.has_text() {
                self.text.row(index).to_vec()
            } else {
                Vec::new()
            },
            weight: self.weights.as_ref().map(|w| w[index]),
            name: self.row_names.get(index).cloned(),
        }
    }

    fn put_row(&mut self, index: usize, row: DataRow) {
        if let (Some(v), Some(value)) = (self.vector.as_mut(), row.vector) {
            v[index] = value;
        }
        if let (Some(m), Some(values)) = (self.matrix.as_mut(), row.matrix) {
            m.row_mut(index).assign(&values);
        }
        if self.has_text() {
            for (cell, value) in self.text.row_mut(index).iter_mut().zip(row.text) {
                *cell = value;
            }
        }
        if let (Some(w), Some(value)) = (self.weights.as_mut(), row.weight) {
            w[index] = value;
        }
        if let (Some(slot), Some(name)) = (self.row_names.get_mut(index), row.name) {
            *slot = name;
        }
    }

    fn move_row(&mut self, from: usize, to: usize) {
        if from == to {
            return;
        }
        if let Some(v) = self.vector.as_mut() {
            v.swap(from, to);
        }
        if let Some(m) = self.matrix.as_mut() {
            for j in 0..m.len_of(Axis(1)) {
                m.swap([from, j], [to, j]);
            }
        }
        if self.has_text() {
            for j in 0..self.text.ncols() {
                self.text.swap([from, j], [to, j]);
            }
        }
        if let Some(w) = self.weights.as_mut() {
            w.swap(from, to);
        }
        if !self.row_names.is_empty() {
            self.row_names.swap(from, to);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn text_grid(rows: &[&[&str]]) -> Array2<String> {
        let cols = rows.first().map_or(0, |r| r.len());
        Array2::from_shape_fn((rows.len(), cols), |(i, j)| rows[i][j].to_string())
    }

    fn create_test_set() -> DataSet {
        DataSet::from_matrix(array![[3.0, 30.0], [1.0, 10.0], [2.0, 20.0]])
            .with_vector(array![0.3, 0.1, 0.2])
            .unwrap()
            .with_text(text_grid(&[&["A", "a"], &["B", "b"], &["C", "c"]]))
            .unwrap()
            .with_row_names(["r0", "r1", "r2"])
            .unwrap()
    }

    #[test]
    fn test_height_of_parts() {
        assert_eq!(DataSet::new().height(), 0);
        assert!(DataSet::new().is_empty());
        assert_eq!(DataSet::from_vector(array![1.0, 2.0]).height(), 2);
        assert_eq!(create_test_set().height(), 3);
    }

    #[test]
    fn test_mismatched_parts_rejected() {
        let err = DataSet::from_matrix(Array2::zeros((3, 2)))
            .with_vector(array![1.0, 2.0])
            .unwrap_err();
        assert!(matches!(
            err,
            Error::DimensionMismatch {
                expected: 2,
                found: 3,
                ..
            }
        ));

        assert!(DataSet::from_vector(array![1.0])
            .with_row_names(["a", "b"])
            .is_err());
    }

    #[test]
    fn test_row_copy_and_set() {
        let mut data = create_test_set();
        let row = data.row(1).unwrap();
        assert_eq!(row.vector, Some(0.1));
        assert_eq!(row.matrix, Some(array![1.0, 10.0]));
        assert_eq!(row.text, vec!["B".to_string(), "b".to_string()]);
        assert_eq!(row.name.as_deref(), Some("r1"));

        data.set_row(0, &row).unwrap();
        assert_eq!(data.row(0).unwrap(), row);
        assert!(data.row(3).is_err());
    }

    #[test]
    fn test_set_row_layout_checked() {
        let mut data = create_test_set();
        let mut row = data.row(0).unwrap();
        row.text.pop();
        assert!(data.set_row(1, &row).is_err());

        let mut row = data.row(0).unwrap();
        row.matrix = None;
        assert!(data.set_row(1, &row).is_err());
    }

    #[test]
    fn test_move_row_swaps_every_part() {
        let mut data = create_test_set();
        data.move_row(2, 0);
        assert_eq!(data.vector().unwrap()[0], 0.2);
        assert_eq!(data.matrix().unwrap()[[0, 1]], 20.0);
        assert_eq!(data.text()[[0, 0]], "C");
        assert_eq!(data.row_names()[0], "r2");
    }

    #[test]
    fn test_text_alloc_keeps_existing_cells() {
        let mut data = DataSet::from_text(text_grid(&[&["x", "y"]]));
        data.text_alloc(2, 3).unwrap();
        assert_eq!(data.text().dim(), (2, 3));
        assert_eq!(data.text()[[0, 1]], "y");
        assert_eq!(data.text()[[1, 2]], "");

        data.set_text(1, 2, "z").unwrap();
        assert_eq!(data.text()[[1, 2]], "z");
        assert!(data.set_text(5, 0, "nope").is_err());
    }

    #[test]
    fn test_text_alloc_respects_height() {
        let mut data = DataSet::from_vector(array![1.0, 2.0]);
        assert!(data.text_alloc(2, 1).is_ok());
        assert!(data.text_alloc(3, 1).is_err());
    }

    #[test]
    fn test_column_access() {
        let data = create_test_set();
        assert_eq!(data.column(1).unwrap().to_vec(), vec![30.0, 10.0, 20.0]);
        assert!(data.column(2).is_none());
        assert!(DataSet::from_vector(array![1.0]).column(0).is_none());
    }

    #[test]
    fn test_vec_row_table() {
        let mut rows = vec!["a", "b", "c"];
        let saved = rows.copy_row(0);
        rows.move_row(1, 0);
        rows.put_row(1, saved);
        assert_eq!(rows, vec!["b", "a", "c"]);
        assert_eq!(RowTable::height(&rows), 3);
    }
}
