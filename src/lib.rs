pub mod config;
pub mod data;
pub mod dense;
pub mod distributions;
pub mod error;
pub mod sort;
pub mod statistics;
pub mod svd;
pub mod text;
mod utils;

pub use config::{Options, OptionsBuilder};
pub use data::{DataRow, DataSet, RowTable};
pub use error::{Error, Result};
pub use sort::{
    apply_permutation_in_place, build_permutation, sort_data, sort_data_with, IndexSort,
    ParallelIndexSort, SortKey, SortOptions, SortOrder, StableIndexSort,
};
pub use statistics::{percentiles, Rounding};
pub use utils::Direction;
