//! Summary statistics and missing-value handling for raster fields
//!
//! # Organization
//!
//! - [`masking`]: per-source missing-value policies (NaN, fill values, sentinels)
//! - [`operations`]: min/max/mean over the non-missing samples of a field

pub mod masking;
pub mod operations;

pub use masking::{apply_policy, mask_fill_value, mask_sentinel, valid_count, MissingValuePolicy};
pub use operations::{compute_statistics, print_statistics, FieldStatistics};
