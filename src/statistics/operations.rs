//! Min/max/mean over the valid samples of a field

use crate::dataset::{Quantity, RasterField};
use crate::errors::{GlacierVisError, Result};
use std::fmt;

/// Summary of one raster field, NaN samples excluded
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldStatistics {
    pub quantity: Quantity,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    /// Number of samples that contributed
    pub count: usize,
}

/// Computes the statistics of `field`.
///
/// The mean is accumulated in f64 in row-major order, so repeated runs over
/// the same data give bit-identical results.
///
/// # Errors
///
/// [`GlacierVisError::AllMissing`] when no sample is valid.
pub fn compute_statistics(quantity: Quantity, field: &RasterField) -> Result<FieldStatistics> {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    let mut sum = 0.0_f64;
    let mut count = 0_usize;

    for &value in field.iter().filter(|v| !v.is_nan()) {
        let value = f64::from(value);
        min = min.min(value);
        max = max.max(value);
        sum += value;
        count += 1;
    }

    if count == 0 {
        return Err(GlacierVisError::AllMissing {
            field: quantity.as_str().to_string(),
        });
    }

    Ok(FieldStatistics {
        quantity,
        min,
        max,
        mean: sum / count as f64,
        count,
    })
}

impl fmt::Display for FieldStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = capitalize(self.quantity.as_str());
        let unit = self.quantity.unit();
        writeln!(f, "Max {} {} {}", name, self.max, unit)?;
        writeln!(f, "Min {} {} {}", name, self.min, unit)?;
        write!(f, "Avg {} {} {}", name, self.mean, unit)
    }
}

fn capitalize(name: &str) -> String {
    let name = name.replace('_', " ");
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Prints the summary to standard output.
pub fn print_statistics(stats: &FieldStatistics) {
    println!("{stats}");
}
