//! Gridded dataset record shared by every pipeline
//!
//! A [`Dataset`] bundles the coordinate axes, the coordinate mesh built from
//! them, and one raster field per physical [`Quantity`]. It is produced by the
//! extraction step and consumed read-only by statistics and rendering.

use crate::errors::{GlacierVisError, Result};
use ndarray::{Array1, Array2};
use std::collections::BTreeMap;

/// Physical quantity carried by a raster field
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Quantity {
    /// Absolute velocity magnitude
    Velocity,
    /// Velocity along x
    VelocityX,
    /// Velocity along y
    VelocityY,
    /// Error of the velocity magnitude
    VelocityError,
    /// Error (standard deviation) of the x velocity
    VelocityXError,
    /// Error (standard deviation) of the y velocity
    VelocityYError,
    /// Ice thickness
    Thickness,
    /// Ice thickness error
    ThicknessError,
}

impl Quantity {
    /// Short machine name, also used in diagnostics
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Velocity => "velocity",
            Self::VelocityX => "x_velocity",
            Self::VelocityY => "y_velocity",
            Self::VelocityError => "velocity_error",
            Self::VelocityXError => "x_velocity_error",
            Self::VelocityYError => "y_velocity_error",
            Self::Thickness => "thickness",
            Self::ThicknessError => "thickness_error",
        }
    }

    /// Physical unit of the samples
    #[must_use]
    pub const fn unit(self) -> &'static str {
        match self {
            Self::Thickness | Self::ThicknessError => "m",
            _ => "m/yr",
        }
    }

    /// Colorbar label
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Velocity => "Velocity (m/yr)",
            Self::VelocityX => "X - Velocity (m/yr)",
            Self::VelocityY => "Y - Velocity (m/yr)",
            Self::VelocityError => "Velocity error (m/yr)",
            Self::VelocityXError => "X - Velocity error (m/yr)",
            Self::VelocityYError => "Y - Velocity error (m/yr)",
            Self::Thickness => "Thickness (m)",
            Self::ThicknessError => "Thickness error (m)",
        }
    }

    /// Suffix appended to the filename stem of a rendered figure
    #[must_use]
    pub const fn file_suffix(self) -> &'static str {
        match self {
            Self::Velocity => "velocity",
            Self::VelocityX => "Xvelocity",
            Self::VelocityY => "Yvelocity",
            Self::VelocityError => "velocity_error",
            Self::VelocityXError => "Xvelocity_error",
            Self::VelocityYError => "Yvelocity_error",
            Self::Thickness => "thickness",
            Self::ThicknessError => "thickness_error",
        }
    }
}

/// A 2-D grid of samples indexed `[row, column]`; NaN marks a missing sample.
pub type RasterField = Array2<f32>;

/// One-dimensional coordinate axes of a regular grid
#[derive(Debug, Clone, PartialEq)]
pub struct Axes {
    pub x: Array1<f64>,
    pub y: Array1<f64>,
}

impl Axes {
    pub fn new(x: Array1<f64>, y: Array1<f64>) -> Self {
        Self { x, y }
    }

    /// Synthetic axes for a raster of `rows` × `cols` cells spaced `resolution` apart
    pub fn synthesized(resolution: f64, rows: usize, cols: usize) -> Self {
        Self {
            x: synthesize_axis(resolution, cols),
            y: synthesize_axis(resolution, rows),
        }
    }
}

/// `resolution * linspace(0, n, n)`.
///
/// The spacing is `n / (n - 1)` cells, not one cell.
pub fn synthesize_axis(resolution: f64, n: usize) -> Array1<f64> {
    Array1::linspace(0.0, n as f64, n) * resolution
}

/// Cartesian product of two axes, both arrays shaped `(len(y), len(x))`
#[derive(Debug, Clone, PartialEq)]
pub struct CoordinateMesh {
    pub x: Array2<f64>,
    pub y: Array2<f64>,
}

impl CoordinateMesh {
    /// Builds the mesh the way `meshgrid(x, y)` does.
    pub fn from_axes(axes: &Axes) -> Self {
        let (rows, cols) = (axes.y.len(), axes.x.len());
        let x = Array2::from_shape_fn((rows, cols), |(_, j)| axes.x[j]);
        let y = Array2::from_shape_fn((rows, cols), |(i, _)| axes.y[i]);
        Self { x, y }
    }

    /// `(rows, cols)` = `(len(y), len(x))`
    #[must_use]
    pub fn shape(&self) -> (usize, usize) {
        self.x.dim()
    }

    /// Extent as `(x_min, x_max, y_min, y_max)`, ignoring non-finite entries
    pub fn extent(&self) -> Option<(f64, f64, f64, f64)> {
        let (x_min, x_max) = finite_range(self.x.iter().copied())?;
        let (y_min, y_max) = finite_range(self.y.iter().copied())?;
        Some((x_min, x_max, y_min, y_max))
    }
}

fn finite_range(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    values
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

/// Immutable bundle of axes, mesh and raster fields for one input
#[derive(Debug, Clone)]
pub struct Dataset {
    axes: Axes,
    mesh: CoordinateMesh,
    fields: BTreeMap<Quantity, RasterField>,
    stem: String,
}

impl Dataset {
    pub fn axes(&self) -> &Axes {
        &self.axes
    }

    pub fn mesh(&self) -> &CoordinateMesh {
        &self.mesh
    }

    /// Filename stem used to name every output of this dataset
    pub fn stem(&self) -> &str {
        &self.stem
    }

    pub fn field(&self, quantity: Quantity) -> Option<&RasterField> {
        self.fields.get(&quantity)
    }

    /// Like [`Dataset::field`] but absent quantities are an error.
    pub fn require(&self, quantity: Quantity) -> Result<&RasterField> {
        self.field(quantity)
            .ok_or_else(|| GlacierVisError::VariableNotFound {
                var: quantity.as_str().to_string(),
            })
    }

    pub fn quantities(&self) -> impl Iterator<Item = Quantity> + '_ {
        self.fields.keys().copied()
    }
}

/// Collects fields and validates them against the mesh before a [`Dataset`] exists.
#[derive(Debug)]
pub struct DatasetBuilder {
    axes: Axes,
    fields: BTreeMap<Quantity, RasterField>,
    stem: String,
}

impl DatasetBuilder {
    pub fn new(axes: Axes, stem: impl Into<String>) -> Self {
        Self {
            axes,
            fields: BTreeMap::new(),
            stem: stem.into(),
        }
    }

    #[must_use]
    pub fn field(mut self, quantity: Quantity, data: RasterField) -> Self {
        self.fields.insert(quantity, data);
        self
    }

    /// Builds the mesh and checks every field has exactly the mesh shape.
    ///
    /// # Errors
    ///
    /// [`GlacierVisError::ShapeMismatch`] for the first field whose
    /// `(rows, cols)` differs from `(len(y), len(x))`.
    pub fn build(self) -> Result<Dataset> {
        let mesh = CoordinateMesh::from_axes(&self.axes);
        let expected = mesh.shape();

        for (quantity, data) in &self.fields {
            if data.dim() != expected {
                return Err(GlacierVisError::ShapeMismatch {
                    field: quantity.as_str().to_string(),
                    expected,
                    found: data.dim(),
                });
            }
        }

        Ok(Dataset {
            axes: self.axes,
            mesh,
            fields: self.fields,
            stem: self.stem,
        })
    }
}
