//! Named color schemes as piecewise-linear color stops

use std::fmt;
use std::str::FromStr;

/// Sequential or diverging color scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Colormap {
    /// Diverging blue → grey → red
    Coolwarm,
    /// Sequential white → dark blue
    Blues,
    /// Perceptually uniform purple → yellow
    Viridis,
}

const COOLWARM: &[(f64, [u8; 3])] = &[
    (0.0, [59, 76, 192]),
    (0.25, [141, 176, 254]),
    (0.5, [221, 221, 221]),
    (0.75, [244, 152, 122]),
    (1.0, [180, 4, 38]),
];

const BLUES: &[(f64, [u8; 3])] = &[
    (0.0, [247, 251, 255]),
    (0.125, [222, 235, 247]),
    (0.25, [198, 219, 239]),
    (0.375, [158, 202, 225]),
    (0.5, [107, 174, 214]),
    (0.625, [66, 146, 198]),
    (0.75, [33, 113, 181]),
    (0.875, [8, 81, 156]),
    (1.0, [8, 48, 107]),
];

const VIRIDIS: &[(f64, [u8; 3])] = &[
    (0.0, [68, 1, 84]),
    (0.25, [59, 82, 139]),
    (0.5, [33, 145, 140]),
    (0.75, [94, 201, 98]),
    (1.0, [253, 231, 37]),
];

impl Colormap {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Coolwarm => "coolwarm",
            Self::Blues => "Blues",
            Self::Viridis => "viridis",
        }
    }

    fn stops(self) -> &'static [(f64, [u8; 3])] {
        match self {
            Self::Coolwarm => COOLWARM,
            Self::Blues => BLUES,
            Self::Viridis => VIRIDIS,
        }
    }

    /// Color at position `t` in `[0, 1]`; out-of-range positions are clamped.
    pub fn color_at(self, t: f64) -> [u8; 3] {
        let stops = self.stops();
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };

        let upper = stops
            .iter()
            .position(|(pos, _)| *pos >= t)
            .unwrap_or(stops.len() - 1);
        if upper == 0 {
            return stops[0].1;
        }

        let (p0, c0) = stops[upper - 1];
        let (p1, c1) = stops[upper];
        let f = if p1 > p0 { (t - p0) / (p1 - p0) } else { 0.0 };

        let mut rgb = [0u8; 3];
        for (k, channel) in rgb.iter_mut().enumerate() {
            let v = f64::from(c0[k]) * (1.0 - f) + f64::from(c1[k]) * f;
            *channel = v.round() as u8;
        }
        rgb
    }
}

impl fmt::Display for Colormap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Colormap {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "coolwarm" => Ok(Self::Coolwarm),
            "blues" => Ok(Self::Blues),
            "viridis" => Ok(Self::Viridis),
            _ => Err(format!(
                "Unknown colormap '{s}': expected one of coolwarm, Blues, viridis"
            )),
        }
    }
}

/// `#rrggbb`
pub fn to_hex(rgb: [u8; 3]) -> String {
    format!("#{:02x}{:02x}{:02x}", rgb[0], rgb[1], rgb[2])
}
