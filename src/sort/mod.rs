//! Sorting of whole data sets by one key, rearranging rows in place.
//!
//! Sorting happens in two steps. First the permutation that orders the key is built
//! ([`build_permutation`]); nothing in the data set is touched while this happens. Then
//! the rows are moved into place by following the cycles of that permutation
//! ([`apply_permutation_in_place`]), which needs room for a single saved row instead of a
//! second copy of the table.
//!
//! NaNs in the key are placed wherever the index sort puts them. The provided sorters
//! order by [`f64::total_cmp`], so positive NaNs end up after `+inf` and negative NaNs
//! before `-inf`; descending order mirrors that placement.

use ndarray::ArrayView1;
use rayon::prelude::*;

use crate::config::Options;
use crate::data::{DataSet, RowTable};
use crate::error::{Error, Result};

/// Which numbers a data set is sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    /// Matrix column 0, or the vector if the set has a vector but no matrix.
    #[default]
    Default,
    Column(usize),
    Vector,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SortOptions {
    pub key: SortKey,
    pub order: SortOrder,
}

impl SortOptions {
    pub fn by_column(column: usize) -> Self {
        SortOptions {
            key: SortKey::Column(column),
            ..Default::default()
        }
    }

    pub fn by_vector() -> Self {
        SortOptions {
            key: SortKey::Vector,
            ..Default::default()
        }
    }

    pub fn descending(mut self) -> Self {
        self.order = SortOrder::Descending;
        self
    }
}

/// Produces the indices that put a sequence into ascending order.
///
/// Implementations must be stable: equal values keep their original relative order.
pub trait IndexSort {
    fn sort_index(&self, values: ArrayView1<f64>) -> Result<Vec<usize>>;
}

/// Single-threaded stable index sort.
#[derive(Debug, Clone, Copy, Default)]
pub struct StableIndexSort;

impl IndexSort for StableIndexSort {
    fn sort_index(&self, values: ArrayView1<f64>) -> Result<Vec<usize>> {
        let mut index: Vec<usize> = (0..values.len()).collect();
        index.sort_by(|&a, &b| values[a].total_cmp(&values[b]));
        Ok(index)
    }
}

/// Stable index sort on the rayon pool, worth it for long keys.
#[derive(Debug, Clone, Copy, Default)]
pub struct ParallelIndexSort;

impl IndexSort for ParallelIndexSort {
    fn sort_index(&self, values: ArrayView1<f64>) -> Result<Vec<usize>> {
        let keys = values.to_vec();
        let mut index: Vec<usize> = (0..keys.len()).collect();
        index.par_sort_by(|&a, &b| keys[a].total_cmp(&keys[b]));
        Ok(index)
    }
}

/// True if `perm` contains each of `0..perm.len()` exactly once.
pub fn is_permutation(perm: &[usize]) -> bool {
    let mut seen = vec![false; perm.len()];
    for &p in perm {
        match seen.get_mut(p) {
            Some(slot) if !*slot => *slot = true,
            _ => return false,
        }
    }
    true
}

/// `inverse[perm[i]] == i`; applying `perm` and then its inverse restores the original
/// order.
pub fn inverse_permutation(perm: &[usize]) -> Result<Vec<usize>> {
    if !is_permutation(perm) {
        return Err(Error::invalid("cannot invert a sequence that is not a permutation"));
    }
    let mut inverse = vec![0; perm.len()];
    for (i, &p) in perm.iter().enumerate() {
        inverse[p] = i;
    }
    Ok(inverse)
}

enum ResolvedKey {
    Column(usize),
    Vector,
}

fn resolve_key(data: &DataSet, key: SortKey) -> ResolvedKey {
    match key {
        SortKey::Default if data.matrix().is_none() && data.vector().is_some() => {
            ResolvedKey::Vector
        }
        SortKey::Default => ResolvedKey::Column(0),
        SortKey::Column(c) => ResolvedKey::Column(c),
        SortKey::Vector => ResolvedKey::Vector,
    }
}

fn key_values(data: &DataSet, key: SortKey) -> Result<ArrayView1<'_, f64>> {
    match resolve_key(data, key) {
        ResolvedKey::Vector => data
            .vector()
            .map(|v| v.view())
            .ok_or_else(|| Error::invalid("sorting by the vector, but the data set has no vector")),
        ResolvedKey::Column(c) => data.column(c).ok_or_else(|| {
            Error::invalid(format!(
                "sorting by matrix column {}, but the data set has {} matrix columns",
                c,
                data.matrix().map_or(0, |m| m.ncols())
            ))
        }),
    }
}

/// The permutation that sorts `data` by `key`: slot `i` of the result names the original
/// row that belongs at position `i`.
///
/// Descending order is the ascending permutation read back to front, so ties come out in
/// reverse original order.
pub fn build_permutation<S: IndexSort + ?Sized>(
    data: &DataSet,
    key: SortKey,
    order: SortOrder,
    sorter: &S,
) -> Result<Vec<usize>> {
    let values = key_values(data, key)?;
    let height = values.len();
    let mut perm = sorter.sort_index(values)?;
    if perm.len() != height {
        return Err(Error::BackendFailure(format!(
            "index sort returned {} indices for {} values",
            perm.len(),
            height
        )));
    }
    if !is_permutation(&perm) {
        return Err(Error::BackendFailure(
            "index sort did not return a permutation".to_string(),
        ));
    }
    if order == SortOrder::Descending {
        for j in 0..height / 2 {
            perm.swap(j, height - 1 - j);
        }
    }
    Ok(perm)
}

fn next_unvisited(visited: &[bool], from: usize) -> Option<usize> {
    (from..visited.len()).find(|&i| !visited[i])
}

/// Rearrange the rows of `table` so that row `i` afterwards holds what row `perm[i]`
/// held before.
///
/// Each cycle of the permutation is walked once: the row at the cycle's start is saved,
/// every other row in the cycle is moved one step, and the saved row closes the cycle.
/// The permutation is checked before any row is touched.
pub fn apply_permutation_in_place<T: RowTable + ?Sized>(
    table: &mut T,
    perm: &[usize],
) -> Result<()> {
    let height = table.height();
    if perm.len() != height {
        return Err(Error::DimensionMismatch {
            context: "permutation length",
            expected: height,
            found: perm.len(),
        });
    }
    if !is_permutation(perm) {
        return Err(Error::invalid("cannot apply a sequence that is not a permutation"));
    }

    let mut visited = vec![false; height];
    let mut start = 0;
    while let Some(found) = next_unvisited(&visited, start) {
        start = found;
        let saved = table.copy_row(start);
        visited[start] = true;
        let mut i = start;
        while perm[i] != start {
            table.move_row(perm[i], i);
            visited[perm[i]] = true;
            i = perm[i];
        }
        table.put_row(i, saved);
    }
    Ok(())
}

/// Sort `data` in place and hand it back.
///
/// A missing data set is reported (warning level) and `Ok(None)` is returned. A sort key
/// that the set does not have is reported and the set comes back unchanged, unless
/// `options.stop_on_warning` is set, in which case both are errors.
pub fn sort_data<'a>(
    data: Option<&'a mut DataSet>,
    sort: &SortOptions,
    options: &Options,
) -> Result<Option<&'a mut DataSet>> {
    sort_data_with(data, sort, options, &StableIndexSort)
}

/// [`sort_data`] with a caller-chosen index sort.
pub fn sort_data_with<'a, S: IndexSort + ?Sized>(
    data: Option<&'a mut DataSet>,
    sort: &SortOptions,
    options: &Options,
    sorter: &S,
) -> Result<Option<&'a mut DataSet>> {
    let Some(data) = data else {
        options.check(1, "You gave me no data to sort. Returning nothing.")?;
        return Ok(None);
    };
    sort_in_place(data, sort, options, sorter)?;
    Ok(Some(data))
}

fn sort_in_place<S: IndexSort + ?Sized>(
    data: &mut DataSet,
    sort: &SortOptions,
    options: &Options,
    sorter: &S,
) -> Result<()> {
    let perm = match build_permutation(data, sort.key, sort.order, sorter) {
        Ok(perm) => perm,
        Err(Error::InvalidInput(msg)) => {
            return options.check(1, format!("{}. Returning the data unsorted.", msg));
        }
        Err(e) => return Err(e),
    };
    apply_permutation_in_place(data, &perm)
}

impl DataSet {
    /// Sort this set in place with the default [`Options`].
    pub fn sort(&mut self, sort: SortOptions) -> Result<&mut Self> {
        sort_in_place(self, &sort, &Options::default(), &StableIndexSort)?;
        Ok(self)
    }
}
