use anyhow::bail;
use ndarray::{concatenate, s, Array1, Array2, ArrayView1, ArrayView2, Axis};

use crate::svd::SVD;
use crate::utils::{to_nalgebra, to_ndarray};
use crate::Direction;

fn check_square(m: &ArrayView2<f64>) -> anyhow::Result<usize> {
    let (rows, cols) = m.dim();
    if rows != cols {
        bail!("Matrix must be square, but it is {}x{}", rows, cols);
    }
    Ok(rows)
}

/// Determinant via LU decomposition. The input is not modified.
pub fn determinant(m: ArrayView2<f64>) -> anyhow::Result<f64> {
    check_square(&m)?;
    Ok(to_nalgebra(m).lu().determinant())
}

pub fn inverse(m: ArrayView2<f64>) -> anyhow::Result<Array2<f64>> {
    Ok(det_and_inv(m)?.1)
}

/// Determinant and inverse from a single LU decomposition.
pub fn det_and_inv(m: ArrayView2<f64>) -> anyhow::Result<(f64, Array2<f64>)> {
    check_square(&m)?;
    let lu = to_nalgebra(m).lu();
    let det = lu.determinant();
    let inv = lu
        .try_inverse()
        .ok_or_else(|| anyhow::anyhow!("Matrix is singular and cannot be inverted"))?;
    Ok((det, to_ndarray(&inv)))
}

/// The quadratic form x' Σ x.
pub fn x_prime_sigma_x(x: ArrayView1<f64>, sigma: ArrayView2<f64>) -> anyhow::Result<f64> {
    let n = check_square(&sigma)?;
    if x.len() != n {
        bail!(
            "Length of x ({}) does not match the dimension of sigma ({})",
            x.len(),
            n
        );
    }
    Ok(x.dot(&sigma.dot(&x)))
}

/// Subtract each column's mean from that column and return the means.
pub fn center_columns(m: &mut Array2<f64>) -> anyhow::Result<Array1<f64>> {
    let means = m
        .mean_axis(Axis(0))
        .ok_or_else(|| anyhow::anyhow!("Cannot take column means of a matrix with no rows"))?;
    for mut row in m.rows_mut() {
        row -= &means;
    }
    Ok(means)
}

/// Sample variance/covariance matrix of the columns of `m` (rows are observations).
pub fn covariance_matrix(m: ArrayView2<f64>) -> anyhow::Result<Array2<f64>> {
    let mut centered = m.to_owned();
    covariance_matrix_in_place(&mut centered)
}

/// Like [`covariance_matrix`], but centres `m` itself instead of a copy.
pub fn covariance_matrix_in_place(m: &mut Array2<f64>) -> anyhow::Result<Array2<f64>> {
    let n = m.nrows();
    if n < 2 {
        bail!("Covariance needs at least two observations, got {}", n);
    }
    center_columns(m)?;
    let centered: &Array2<f64> = m;
    Ok(centered.t().dot(centered) / (n - 1) as f64)
}

/// Scale rows and columns of a cross-product matrix by `1/sqrt(diag)` so its diagonal
/// becomes one. Zero diagonal entries leave their row and column unscaled.
pub fn normalize_for_svd(m: &mut Array2<f64>) -> anyhow::Result<()> {
    check_square(&m.view())?;
    let scale = m
        .diag()
        .mapv(|d| if d > 0.0 { 1.0 / d.sqrt() } else { 1.0 });
    for ((i, j), val) in m.indexed_iter_mut() {
        *val *= scale[i] * scale[j];
    }
    Ok(())
}

/// Leading eigenvectors of the normalised X'X and their share of the eigenvalue total.
#[derive(Debug, Clone)]
pub struct PrincipalComponents {
    /// One column per component, ordered by decreasing eigenvalue.
    pub pc_space: Array2<f64>,
    pub explained: Array1<f64>,
}

pub fn sv_decomposition(
    data: ArrayView2<f64>,
    dimensions: usize,
) -> anyhow::Result<PrincipalComponents> {
    let n_features = data.ncols();
    if dimensions == 0 || dimensions > n_features {
        bail!(
            "Requested {} dimensions from data with {} columns",
            dimensions,
            n_features
        );
    }
    let mut square = data.t().dot(&data);
    normalize_for_svd(&mut square)?;

    let mut svd = SVD::new();
    svd.compute(square.view())?;
    let (u, singular) = match (svd.u(), svd.s()) {
        (Some(u), Some(singular)) => (u, singular),
        _ => bail!("SVD did not produce singular vectors"),
    };
    let total = singular.sum();
    if total <= 0.0 {
        bail!("All eigenvalues are zero; nothing is explained");
    }

    Ok(PrincipalComponents {
        pc_space: u.slice(s![.., ..dimensions]).to_owned(),
        explained: singular.slice(s![..dimensions]).mapv(|x| x / total),
    })
}

/// Join two matrices: `Direction::ROW` puts `m2` below `m1`, `Direction::COLUMN` puts it
/// to the right. A new matrix is allocated.
pub fn matrix_stack<'a>(
    m1: ArrayView2<'a, f64>,
    m2: ArrayView2<'a, f64>,
    direction: &Direction,
) -> anyhow::Result<Array2<f64>> {
    match direction {
        Direction::ROW => {
            if m1.ncols() != m2.ncols() {
                bail!(
                    "Stacking matrices vertically needs equal column counts ({} vs {})",
                    m1.ncols(),
                    m2.ncols()
                );
            }
            Ok(concatenate(Axis(0), &[m1, m2])?)
        }
        Direction::COLUMN => {
            if m1.nrows() != m2.nrows() {
                bail!(
                    "Stacking matrices side by side needs equal row counts ({} vs {})",
                    m1.nrows(),
                    m2.nrows()
                );
            }
            Ok(concatenate(Axis(1), &[m1, m2])?)
        }
    }
}

/// Copy of `m` without the columns whose `keep` flag is false.
pub fn matrix_rm_columns(m: ArrayView2<f64>, keep: &[bool]) -> anyhow::Result<Array2<f64>> {
    if keep.len() != m.ncols() {
        bail!(
            "Length of keep ({}) does not match number of columns ({})",
            keep.len(),
            m.ncols()
        );
    }
    let columns: Vec<usize> = keep
        .iter()
        .enumerate()
        .filter(|(_, k)| **k)
        .map(|(i, _)| i)
        .collect();
    Ok(Array2::from_shape_fn((m.nrows(), columns.len()), |(i, j)| {
        m[[i, columns[j]]]
    }))
}
