use ndarray::{Array1, ArrayView1};
use parking_lot::Mutex;

use crate::error::{Error, Result};

/// How a percentile that falls between two observations is resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Rounding {
    /// Use the next higher observation.
    Up,
    /// Use the next lower observation.
    #[default]
    Down,
    /// Mean of the two neighbouring observations.
    Average,
}

/// Percentiles 0 through 100 of `data`.
///
/// Element `k` is the observation at sorted position `k * (n - 1) / 100`; when that
/// position is fractional, `rounding` decides. Element 0 is always the minimum and
/// element 100 always the maximum. The input is copied, not reordered.
pub fn percentiles(data: ArrayView1<f64>, rounding: Rounding) -> Result<[f64; 101]> {
    let n = data.len();
    if n == 0 {
        return Err(Error::invalid("percentiles of an empty sequence"));
    }
    let mut sorted = data.to_vec();
    sorted.sort_by(f64::total_cmp);

    let mut out = [0.0; 101];
    for (k, slot) in out.iter_mut().enumerate() {
        let scaled = k * (n - 1);
        let index = scaled / 100;
        *slot = if scaled % 100 == 0 {
            sorted[index]
        } else {
            match rounding {
                Rounding::Down => sorted[index],
                Rounding::Up => sorted[index + 1],
                Rounding::Average => (sorted[index] + sorted[index + 1]) / 2.0,
            }
        };
    }
    Ok(out)
}

/// Memoised partial sums of the generalised harmonic series `sum_{j=1..N} 1/j^s`.
///
/// One series is kept per exponent and extended when a longer one is requested. The cache
/// is shared behind a mutex, so one instance can serve several threads.
#[derive(Debug, Default)]
pub struct HarmonicCache {
    series: Mutex<Vec<(f64, Vec<f64>)>>,
}

impl HarmonicCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn generalized_harmonic(&self, n: usize, s: f64) -> Result<f64> {
        if n == 0 {
            return Err(Error::invalid("N is 0, but must be greater than 0"));
        }
        let mut series = self.series.lock();
        let position = match series.iter().position(|(exponent, _)| *exponent == s) {
            Some(p) => p,
            None => {
                series.push((s, vec![1.0]));
                series.len() - 1
            }
        };
        let sums = &mut series[position].1;
        for j in sums.len()..n {
            let next = sums[j - 1] + 1.0 / ((j + 1) as f64).powf(s);
            sums.push(next);
        }
        Ok(sums[n - 1])
    }

    /// Number of exponents with a cached series.
    pub fn len(&self) -> usize {
        self.series.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.series.lock().clear();
    }
}

/// Centred moving average.
///
/// Each output element is the mean of `2 * (bandwidth / 2) + 1` consecutive inputs, so
/// the result is shorter than the input by `bandwidth / 2` on each end.
pub fn moving_average(v: ArrayView1<f64>, bandwidth: usize) -> Result<Array1<f64>> {
    if bandwidth == 0 {
        return Err(Error::invalid("bandwidth must be >= 1"));
    }
    let halfspan = bandwidth / 2;
    let span = 2 * halfspan + 1;
    if v.len() < span {
        return Err(Error::invalid(format!(
            "cannot smooth {} elements with a window of {}",
            v.len(),
            span
        )));
    }
    let out = v
        .windows(span)
        .into_iter()
        .map(|w| w.sum() / span as f64)
        .collect::<Vec<_>>();
    Ok(Array1::from(out))
}
