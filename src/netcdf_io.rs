//! NetCDF extraction of glacier velocity grids
//!
//! The file must expose the 1-D coordinate variables `x` and `y` and the 2-D
//! velocity variables `v`, `vx`, `vy`, `v_err`, `vx_err`, `vy_err`, each laid
//! out as `(y, x)`.
//!
//! Samples are unpacked the CF way at read time: a raw value equal to the
//! declared `_FillValue` (or `missing_value`) becomes NaN, and everything else
//! becomes `raw * scale_factor + add_offset`. A variable without a declared
//! fill also has the library default fill of `float` and `double` variables
//! masked. Default fills of integer variables are not inferred, since a short
//! grid can legitimately reach -32767.

use crate::dataset::{Axes, Dataset, DatasetBuilder, Quantity, RasterField};
use crate::errors::{GlacierVisError, Result};
use log::{debug, info};
use ndarray::{Array1, Array2};
use netcdf::{AttributeValue, File, Variable};
use std::path::{Path, PathBuf};

/// netCDF default fill of `float` variables, as read back in double precision
const NC_FILL_FLOAT: f64 = 9.969_209_968_386_869e36_f32 as f64;
/// netCDF default fill of `double` variables
const NC_FILL_DOUBLE: f64 = 9.969_209_968_386_869e36;

/// Variables read into the dataset, keyed by the quantity they hold
pub const VELOCITY_VARIABLES: [(&str, Quantity); 6] = [
    ("v", Quantity::Velocity),
    ("vx", Quantity::VelocityX),
    ("vy", Quantity::VelocityY),
    ("v_err", Quantity::VelocityError),
    ("vx_err", Quantity::VelocityXError),
    ("vy_err", Quantity::VelocityYError),
];

/// Location and variable names of a NetCDF velocity product
#[derive(Debug, Clone)]
pub struct NetCdfSource {
    pub path: PathBuf,
    pub x_variable: String,
    pub y_variable: String,
    pub fields: Vec<(String, Quantity)>,
}

impl NetCdfSource {
    /// Source with the standard ITS_LIVE variable names
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            x_variable: "x".to_string(),
            y_variable: "y".to_string(),
            fields: VELOCITY_VARIABLES
                .iter()
                .map(|(name, q)| (name.to_string(), *q))
                .collect(),
        }
    }

    /// Output stem: the file name without its extension
    pub fn stem(&self) -> String {
        file_stem(&self.path)
    }
}

pub(crate) fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string())
}

/// Opens a NetCDF file, reporting a missing path as [`GlacierVisError::SourceNotFound`].
pub fn open_source(path: &Path) -> Result<File> {
    if !path.exists() {
        return Err(GlacierVisError::SourceNotFound {
            path: path.to_path_buf(),
        });
    }
    let file = netcdf::open(path)?;
    info!("Opened NetCDF file: {}", path.display());
    Ok(file)
}

/// Reads every variable named by `source` and assembles a [`Dataset`].
///
/// The file handle is dropped before returning, on success and on error.
///
/// # Errors
///
/// Missing file, missing variable, a field that is not 2-D, or a field whose
/// shape differs from `(len(y), len(x))`.
pub fn extract_netcdf(source: &NetCdfSource) -> Result<Dataset> {
    let file = open_source(&source.path)?;

    let x = read_axis(&file, &source.x_variable)?;
    let y = read_axis(&file, &source.y_variable)?;
    debug!("Axes: {} x values, {} y values", x.len(), y.len());

    let mut builder = DatasetBuilder::new(Axes::new(x, y), source.stem());
    for (name, quantity) in &source.fields {
        let field = read_field(&file, name)?;
        builder = builder.field(*quantity, field);
    }

    builder.build()
}

fn find_variable<'f>(file: &'f File, name: &str) -> Result<Variable<'f>> {
    file.variable(name)
        .ok_or_else(|| GlacierVisError::VariableNotFound {
            var: name.to_string(),
        })
}

/// Reads a 1-D coordinate variable as f64.
pub fn read_axis(file: &File, name: &str) -> Result<Array1<f64>> {
    let var = find_variable(file, name)?;
    let values = var.get_values::<f64, _>(..)?;
    Ok(Array1::from(values))
}

/// Reads a 2-D variable as f32, masked and unpacked.
///
/// Leading singleton dimensions (e.g. a `time` of length 1) are dropped.
pub fn read_field(file: &File, name: &str) -> Result<RasterField> {
    let var = find_variable(file, name)?;

    let shape: Vec<usize> = var
        .dimensions()
        .iter()
        .map(netcdf::Dimension::len)
        .collect();
    let (rows, cols) = grid_shape(name, &shape)?;

    let raw = var.get_values::<f64, _>(..)?;
    debug!("Read '{}' with shape {:?}", name, shape);

    let packing = Packing::of(&var);
    let mut masked = 0usize;
    let values: Vec<f32> = raw
        .into_iter()
        .map(|v| match packing.unpack(v) {
            Some(value) => value,
            None => {
                masked += 1;
                f32::NAN
            }
        })
        .collect();
    debug!("Masked {} missing samples in '{}' ({:?})", masked, name, packing);

    Ok(Array2::from_shape_vec((rows, cols), values)?)
}

/// CF packing attributes of one variable
#[derive(Debug, Clone, Copy, PartialEq)]
struct Packing {
    fill: Option<f64>,
    scale: f64,
    offset: f64,
}

impl Packing {
    fn of(var: &Variable) -> Self {
        Self {
            fill: numeric_attribute(var, "_FillValue")
                .or_else(|| numeric_attribute(var, "missing_value")),
            scale: numeric_attribute(var, "scale_factor").unwrap_or(1.0),
            offset: numeric_attribute(var, "add_offset").unwrap_or(0.0),
        }
    }

    /// Physical value of a raw sample, or `None` when it is missing.
    ///
    /// The fill is compared against the packed value, before any narrowing.
    fn unpack(&self, raw: f64) -> Option<f32> {
        let missing = match self.fill {
            Some(fill) => raw == fill,
            None => raw == NC_FILL_FLOAT || raw == NC_FILL_DOUBLE,
        };
        if raw.is_nan() || missing {
            return None;
        }
        Some((raw * self.scale + self.offset) as f32)
    }
}

fn grid_shape(name: &str, shape: &[usize]) -> Result<(usize, usize)> {
    let significant = match shape.len() {
        0 | 1 => None,
        n if shape[..n - 2].iter().all(|&d| d == 1) => Some((shape[n - 2], shape[n - 1])),
        _ => None,
    };

    match significant {
        Some((rows, cols)) if rows > 0 && cols > 0 => Ok((rows, cols)),
        Some(_) => Err(GlacierVisError::EmptyRaster {
            field: name.to_string(),
        }),
        None => Err(GlacierVisError::SourceUnreadable {
            path: PathBuf::from(name),
            message: format!("variable '{}' with shape {:?} is not a 2-D grid", name, shape),
        }),
    }
}

/// A scalar numeric attribute widened to f64
fn numeric_attribute(var: &Variable, key: &str) -> Option<f64> {
    match var.attribute(key)?.value().ok()? {
        AttributeValue::Double(v) => Some(v),
        AttributeValue::Float(v) => Some(f64::from(v)),
        AttributeValue::Int(v) => Some(f64::from(v)),
        AttributeValue::Uint(v) => Some(f64::from(v)),
        AttributeValue::Short(v) => Some(f64::from(v)),
        AttributeValue::Ushort(v) => Some(f64::from(v)),
        AttributeValue::Schar(v) => Some(f64::from(v)),
        AttributeValue::Uchar(v) => Some(f64::from(v)),
        AttributeValue::Doubles(v) if v.len() == 1 => Some(v[0]),
        AttributeValue::Floats(v) if v.len() == 1 => Some(f64::from(v[0])),
        _ => None,
    }
}
