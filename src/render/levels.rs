//! Contour level selection and tick labels

/// Number of bands aimed for when no explicit levels are given
pub const DEFAULT_BINS: usize = 8;

const NICE_STEPS: [f64; 5] = [1.0, 2.0, 2.5, 5.0, 10.0];

/// Evenly spaced "round" levels covering `[min, max]` with at most `max_bins` bands.
///
/// The step is 1, 2, 2.5 or 5 times a power of ten; the first level is at or
/// below `min`, the last at or above `max`. A zero-width range gets a single
/// band centred on the value.
pub fn nice_levels(min: f64, max: f64, max_bins: usize) -> Vec<f64> {
    if !min.is_finite() || !max.is_finite() || max_bins == 0 {
        return vec![];
    }
    if max <= min {
        let half = if min == 0.0 { 0.5 } else { min.abs() * 0.05 };
        return vec![min - half, min + half];
    }

    let raw_step = (max - min) / max_bins as f64;
    let magnitude = 10f64.powf(raw_step.log10().floor());

    // Outward rounding of both ends can add a bin, so the next decade is tried too.
    for decade in [magnitude, magnitude * 10.0] {
        for multiple in NICE_STEPS {
            let step = multiple * decade;
            let first = (min / step).floor();
            let bins = ((max / step).ceil() - first) as usize;
            if bins <= max_bins {
                let mut levels: Vec<f64> = (0..=bins.max(1))
                    .map(|i| (first + i as f64) * step)
                    .collect();
                // guard against rounding pulling the ends inside the data range
                levels[0] = levels[0].min(min);
                let last = levels.len() - 1;
                levels[last] = levels[last].max(max);
                return levels;
            }
        }
    }

    vec![min, max]
}

/// Tick label text with no trailing zeros
pub fn format_level(value: f64) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    let magnitude = value.abs();
    if !(1e-3..1e6).contains(&magnitude) {
        return format!("{value:.1e}");
    }
    let text = format!("{value:.3}");
    text.trim_end_matches('0').trim_end_matches('.').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nice_levels_velocity_range() {
        let levels = nice_levels(0.3, 812.0, DEFAULT_BINS);
        assert_eq!(levels, vec![0.0, 200.0, 400.0, 600.0, 800.0, 1000.0]);
    }

    #[test]
    fn test_nice_levels_cover_range() {
        for (lo, hi) in [(1.0, 8.0), (-3.2, 4.7), (0.001, 0.0093), (1200.0, 1201.0)] {
            let levels = nice_levels(lo, hi, DEFAULT_BINS);
            assert!(levels.len() >= 2);
            assert!(levels[0] <= lo);
            assert!(*levels.last().unwrap() >= hi);
            assert!(levels.len() - 1 <= DEFAULT_BINS);
        }
    }

    #[test]
    fn test_constant_field_gets_one_band() {
        let levels = nice_levels(5.0, 5.0, DEFAULT_BINS);
        assert_eq!(levels.len(), 2);
        assert!(levels[0] < 5.0 && levels[1] > 5.0);
    }

    #[test]
    fn test_format_level() {
        assert_eq!(format_level(200.0), "200");
        assert_eq!(format_level(2.5), "2.5");
        assert_eq!(format_level(0.0), "0");
        assert_eq!(format_level(-0.125), "-0.125");
    }
}
