//! Missing-value policies
//!
//! Each data source marks "no data" its own way. The policy is chosen by the
//! extraction routine of that source and applied once, right after the read,
//! so everything downstream only has to recognise NaN.

use crate::dataset::RasterField;

/// Default GeoTIFF "no data" threshold: samples above it are not measurements.
pub const DEFAULT_SENTINEL: f32 = 1e10;

/// How a source encodes missing samples
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MissingValuePolicy {
    /// Only NaN is missing
    NanOnly,
    /// NaN and samples equal to the given fill value are missing
    FillValue(f32),
    /// NaN and samples strictly greater than the threshold are missing
    SentinelAbove(f32),
}

impl Default for MissingValuePolicy {
    fn default() -> Self {
        Self::NanOnly
    }
}

impl MissingValuePolicy {
    /// Whether a raw sample, before narrowing to f32, counts as missing
    pub fn is_missing(self, value: f64) -> bool {
        value.is_nan()
            || match self {
                Self::NanOnly => false,
                Self::FillValue(fill) => value == f64::from(fill),
                Self::SentinelAbove(threshold) => value > f64::from(threshold),
            }
    }
}

/// Rewrites every sample the policy classifies as missing to NaN.
///
/// Returns the number of samples that were replaced.
pub fn apply_policy(field: &mut RasterField, policy: MissingValuePolicy) -> usize {
    match policy {
        MissingValuePolicy::NanOnly => 0,
        MissingValuePolicy::FillValue(fill) => mask_fill_value(field, fill),
        MissingValuePolicy::SentinelAbove(threshold) => mask_sentinel(field, threshold),
    }
}

/// Replaces samples greater than `threshold` with NaN; returns how many changed.
pub fn mask_sentinel(field: &mut RasterField, threshold: f32) -> usize {
    let mut replaced = 0;
    field.mapv_inplace(|v| {
        if v > threshold {
            replaced += 1;
            f32::NAN
        } else {
            v
        }
    });
    replaced
}

/// Replaces samples equal to `fill` with NaN; returns how many changed.
pub fn mask_fill_value(field: &mut RasterField, fill: f32) -> usize {
    if fill.is_nan() {
        return 0;
    }
    let mut replaced = 0;
    field.mapv_inplace(|v| {
        if v == fill {
            replaced += 1;
            f32::NAN
        } else {
            v
        }
    });
    replaced
}

/// Number of non-NaN samples
pub fn valid_count(field: &RasterField) -> usize {
    field.iter().filter(|v| !v.is_nan()).count()
}
