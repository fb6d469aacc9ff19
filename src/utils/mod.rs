use nalgebra::DMatrix;
use ndarray::{Array2, ArrayView2};

/// Axis along which an operation is carried out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    ROW,
    COLUMN,
}

impl Direction {
    pub fn is_row(&self) -> bool {
        matches!(self, Direction::ROW)
    }
}

pub(crate) fn to_nalgebra(x: ArrayView2<f64>) -> DMatrix<f64> {
    let (rows, cols) = x.dim();
    DMatrix::from_fn(rows, cols, |i, j| x[[i, j]])
}

pub(crate) fn to_ndarray(m: &DMatrix<f64>) -> Array2<f64> {
    Array2::from_shape_fn((m.nrows(), m.ncols()), |(i, j)| m[(i, j)])
}
