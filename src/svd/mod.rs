use anyhow::anyhow;
use ndarray::{Array1, Array2, ArrayView2};

use crate::utils::{to_nalgebra, to_ndarray};

/// Thin singular value decomposition `X = U diag(s) V'`, singular values in decreasing
/// order.
pub struct SVD {
    u: Option<Array2<f64>>,
    s: Option<Array1<f64>>,
    vt: Option<Array2<f64>>,
}

impl SVD {
    pub fn new() -> Self {
        SVD {
            u: None,
            s: None,
            vt: None,
        }
    }

    pub fn compute(&mut self, x: ArrayView2<f64>) -> anyhow::Result<()> {
        let matrix = to_nalgebra(x);

        let svd = nalgebra::linalg::SVD::try_new(matrix, true, true, f64::EPSILON, 0)
            .ok_or_else(|| anyhow!("SVD failed to converge"))?;
        let u = svd
            .u
            .as_ref()
            .ok_or_else(|| anyhow!("SVD did not compute U"))?;
        let vt = svd
            .v_t
            .as_ref()
            .ok_or_else(|| anyhow!("SVD did not compute V'"))?;

        self.u = Some(to_ndarray(u));
        self.s = Some(Array1::from(svd.singular_values.as_slice().to_vec()));
        self.vt = Some(to_ndarray(vt));

        Ok(())
    }

    pub fn u(&self) -> Option<&Array2<f64>> {
        self.u.as_ref()
    }

    pub fn s(&self) -> Option<&Array1<f64>> {
        self.s.as_ref()
    }

    pub fn vt(&self) -> Option<&Array2<f64>> {
        self.vt.as_ref()
    }

    // Reconstruct the original matrix
    pub fn reconstruct(&self) -> Option<Array2<f64>> {
        match (self.u(), self.s(), self.vt()) {
            (Some(u), Some(s), Some(vt)) => {
                let s_diag = Array2::from_diag(s);
                Some(u.dot(&s_diag).dot(vt))
            }
            _ => None,
        }
    }
}

impl Default for SVD {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    use super::*;

    #[test]
    fn test_simple_svd() {
        let a = array![[1.0, 2.0], [3.0, 4.0]];
        let mut svd = SVD::new();
        assert!(svd.reconstruct().is_none());
        svd.compute(a.view()).unwrap();
        let s = svd.s().unwrap();
        let vt = svd.vt().unwrap();
        let u = svd.u().unwrap();
        assert_eq!(u.shape(), &[2, 2]);
        assert_eq!(s.len(), 2);
        assert_eq!(vt.shape(), &[2, 2]);

        assert_abs_diff_eq!(s[0], 5.4649857, epsilon = 1e-6);
        assert_abs_diff_eq!(s[1], 0.3659662, epsilon = 1e-6);

        let reconstructed = svd.reconstruct().unwrap();
        for i in 0..2 {
            for j in 0..2 {
                assert_abs_diff_eq!(reconstructed[[i, j]], a[[i, j]], epsilon = 1e-6);
            }
        }
    }

    #[test]
    fn test_rectangular_svd_is_thin() {
        let a = array![[1.0, 0.0], [0.0, 2.0], [0.0, 0.0]];
        let mut svd = SVD::default();
        svd.compute(a.view()).unwrap();
        assert_eq!(svd.u().unwrap().dim(), (3, 2));
        assert_eq!(svd.vt().unwrap().dim(), (2, 2));
        let s = svd.s().unwrap();
        assert_abs_diff_eq!(s[0], 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(s[1], 1.0, epsilon = 1e-12);
    }
}
