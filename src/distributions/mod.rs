use anyhow::{anyhow, bail};
use nalgebra::{DMatrix, DVector};
use ndarray::{s, Array1, Array2, ArrayView1, ArrayView2, Axis};
use rand::Rng;
use rand_distr::{Distribution, Gamma, Poisson, StandardNormal};

use crate::dense::{covariance_matrix, determinant, inverse, x_prime_sigma_x};
use crate::error::Error;
use crate::utils::to_nalgebra;

/// A model that can produce random draws of a fixed width.
pub trait Draw {
    /// Number of values in one draw.
    fn dsize(&self) -> usize;

    /// Fill `out` (of length `dsize()`) with one draw.
    fn draw_into<R: Rng + ?Sized>(&self, rng: &mut R, out: &mut [f64]) -> anyhow::Result<()>;
}

/// `count` draws from `model`, one per row.
pub fn model_draws<M, R>(model: &M, count: usize, rng: &mut R) -> anyhow::Result<Array2<f64>>
where
    M: Draw + ?Sized,
    R: Rng + ?Sized,
{
    let d = model.dsize();
    if d == 0 {
        bail!("Model has a draw size of zero, so I don't know the size of matrix to allocate");
    }
    let mut draws = Array2::zeros((count, d));
    model_draws_into(model, &mut draws, rng)?;
    Ok(draws)
}

/// Fill every row of `draws` with a draw from `model`. Extra columns are left alone.
pub fn model_draws_into<M, R>(model: &M, draws: &mut Array2<f64>, rng: &mut R) -> anyhow::Result<()>
where
    M: Draw + ?Sized,
    R: Rng + ?Sized,
{
    let d = model.dsize();
    if d == 0 {
        bail!("Model has a draw size of zero");
    }
    if draws.ncols() < d {
        bail!(
            "Draw matrix has {} columns, but one draw needs {}",
            draws.ncols(),
            d
        );
    }
    let mut buf = vec![0.0; d];
    for i in 0..draws.nrows() {
        model.draw_into(rng, &mut buf)?;
        draws
            .slice_mut(s![i, ..d])
            .assign(&ArrayView1::from(buf.as_slice()));
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq)]
pub struct MultivariateNormal {
    mean: Array1<f64>,
    covariance: Array2<f64>,
    /// Lower Cholesky factor of the covariance, `None` when it is not positive definite.
    cholesky_l: Option<DMatrix<f64>>,
}

impl MultivariateNormal {
    pub fn new(mean: Array1<f64>, covariance: Array2<f64>) -> anyhow::Result<Self> {
        let (rows, cols) = covariance.dim();
        if rows != cols || rows != mean.len() {
            bail!(
                "Covariance is {}x{} but the mean has {} elements",
                rows,
                cols,
                mean.len()
            );
        }
        let cholesky_l = nalgebra::linalg::Cholesky::new(to_nalgebra(covariance.view()))
            .map(|chol| chol.l());
        Ok(MultivariateNormal {
            mean,
            covariance,
            cholesky_l,
        })
    }

    /// Column means and sample covariance of `data` (rows are observations).
    pub fn estimate(data: ArrayView2<f64>) -> anyhow::Result<Self> {
        let mean = data
            .mean_axis(Axis(0))
            .ok_or_else(|| anyhow!("Cannot estimate from data with no rows"))?;
        let covariance = covariance_matrix(data)?;
        Self::new(mean, covariance)
    }

    pub fn mean(&self) -> &Array1<f64> {
        &self.mean
    }

    pub fn covariance(&self) -> &Array2<f64> {
        &self.covariance
    }

    /// Log density summed over the rows of `x`.
    ///
    /// A covariance with a non-positive determinant gives `-inf`, which steers
    /// maximisers elsewhere.
    pub fn log_likelihood(&self, x: ArrayView2<f64>) -> anyhow::Result<f64> {
        let d = self.mean.len();
        if x.ncols() != d {
            bail!("Data has {} columns, distribution has {} dimensions", x.ncols(), d);
        }
        let det = determinant(self.covariance.view())?;
        if det <= 0.0 {
            log::warn!(
                "The determinant of the covariance is {}; returning negative infinity",
                det
            );
            return Ok(f64::NEG_INFINITY);
        }
        let inv = inverse(self.covariance.view())?;
        let norm = (2.0 * std::f64::consts::PI).ln() * d as f64 / 2.0 + 0.5 * det.ln();

        let mut ll = 0.0;
        for row in x.rows() {
            let diff = &row - &self.mean;
            ll -= x_prime_sigma_x(diff.view(), inv.view())? / 2.0;
            ll -= norm;
        }
        Ok(ll)
    }

    pub fn p(&self, x: ArrayView2<f64>) -> anyhow::Result<f64> {
        Ok(self.log_likelihood(x)?.exp())
    }
}

impl Draw for MultivariateNormal {
    fn dsize(&self) -> usize {
        self.mean.len()
    }

    fn draw_into<R: Rng + ?Sized>(&self, rng: &mut R, out: &mut [f64]) -> anyhow::Result<()> {
        let d = self.dsize();
        if out.len() != d {
            bail!("Output has {} slots, a draw has {} values", out.len(), d);
        }
        let l = self
            .cholesky_l
            .as_ref()
            .ok_or_else(|| anyhow!("Covariance is not positive definite"))?;
        let z: DVector<f64> = DVector::from_fn(d, |_, _| StandardNormal.sample(&mut *rng));
        let dotted = l * z;
        for (i, slot) in out.iter_mut().enumerate() {
            *slot = dotted[i] + self.mean[i];
        }
        Ok(())
    }
}

fn single_slot(out: &mut [f64]) -> anyhow::Result<&mut f64> {
    if out.len() != 1 {
        bail!("Output has {} slots, a draw has 1 value", out.len());
    }
    Ok(&mut out[0])
}

/// Beta distribution on (0, 1).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Beta {
    alpha: f64,
    beta: f64,
}

impl Beta {
    pub fn new(alpha: f64, beta: f64) -> crate::Result<Self> {
        if !(alpha > 0.0 && beta > 0.0) {
            return Err(Error::invalid(format!(
                "beta parameters must be positive, got ({}, {})",
                alpha, beta
            )));
        }
        Ok(Beta { alpha, beta })
    }

    /// The Beta distribution with mean `m` and variance `v`.
    ///
    /// `m` must lie strictly between zero and one, and `v` must be below `m (1 - m)`; the
    /// variance of a Uniform(0, 1) is 1/12 for reference.
    pub fn from_mean_var(m: f64, v: f64) -> crate::Result<Self> {
        if !(m > 0.0 && m < 1.0) {
            return Err(Error::invalid(format!(
                "You asked for a beta distribution with mean {}, but the mean of the beta \
                 will always be strictly between zero and one.",
                m
            )));
        }
        if !(v > 0.0) {
            return Err(Error::invalid(format!("variance must be positive, got {}", v)));
        }
        let k = m * (1.0 - m) / v - 1.0;
        if k <= 0.0 {
            return Err(Error::invalid(format!(
                "variance {} is too large for a beta distribution with mean {}",
                v, m
            )));
        }
        Self::new(m * k, (1.0 - m) * k)
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn beta(&self) -> f64 {
        self.beta
    }

    pub fn mean(&self) -> f64 {
        self.alpha / (self.alpha + self.beta)
    }

    pub fn variance(&self) -> f64 {
        let total = self.alpha + self.beta;
        self.alpha * self.beta / (total * total * (total + 1.0))
    }
}

impl Draw for Beta {
    fn dsize(&self) -> usize {
        1
    }

    fn draw_into<R: Rng + ?Sized>(&self, rng: &mut R, out: &mut [f64]) -> anyhow::Result<()> {
        let dist = rand_distr::Beta::new(self.alpha, self.beta)
            .map_err(|e| anyhow!("Invalid beta parameters: {:?}", e))?;
        *single_slot(out)? = dist.sample(rng);
        Ok(())
    }
}

/// Generalised hypergeometric type B3 variates: `Poisson(G0 * G1 / G2)` where `Gi` is a
/// unit-scale gamma with shape `a[i]`. Used as a building block for e.g. Waring draws.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeneralizedHypergeometricB3 {
    a: [f64; 3],
}

impl GeneralizedHypergeometricB3 {
    pub fn new(a: [f64; 3]) -> crate::Result<Self> {
        if !a.iter().all(|&x| x > 0.0) {
            return Err(Error::invalid(format!("all inputs must be positive, got {:?}", a)));
        }
        Ok(GeneralizedHypergeometricB3 { a })
    }

    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> anyhow::Result<f64> {
        let mut gammas = [0.0; 3];
        for (g, &shape) in gammas.iter_mut().zip(self.a.iter()) {
            let dist = Gamma::new(shape, 1.0).map_err(|e| anyhow!("Invalid gamma shape: {:?}", e))?;
            *g = dist.sample(rng);
        }
        let lambda = gammas[0] * gammas[1] / gammas[2];
        if lambda <= 0.0 {
            return Ok(0.0);
        }
        let poisson = Poisson::new(lambda)
            .map_err(|e| anyhow!("Invalid Poisson rate {}: {:?}", lambda, e))?;
        Ok(poisson.sample(rng))
    }
}

impl Draw for GeneralizedHypergeometricB3 {
    fn dsize(&self) -> usize {
        1
    }

    fn draw_into<R: Rng + ?Sized>(&self, rng: &mut R, out: &mut [f64]) -> anyhow::Result<()> {
        *single_slot(out)? = self.draw(rng)?;
        Ok(())
    }
}
