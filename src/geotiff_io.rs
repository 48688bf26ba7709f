//! GeoTIFF extraction of glacier velocity and thickness bands
//!
//! One physical quantity lives in one single-band GeoTIFF. Velocity products
//! are named `V_`, `VX_`, `VY_`, `STDX_`, `STDY_` + `<stem>.tif` under the
//! velocity directory; thickness products `THICKNESS_` and `ERRTHICKNESS_` +
//! `<stem>.tif` under the thickness directory.
//!
//! The rasters carry no usable coordinates for plotting, so both axes are
//! synthesized from a fixed spatial resolution (see [`crate::dataset::synthesize_axis`]).
//! Samples above the sentinel threshold and samples equal to the GDAL
//! no-data tag, when the file carries one, become NaN.

use crate::dataset::{Axes, Dataset, DatasetBuilder, Quantity, RasterField};
use crate::errors::{GlacierVisError, Result};
use crate::statistics::masking::{MissingValuePolicy, DEFAULT_SENTINEL};
use log::{debug, info};
use ndarray::Array2;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tiff::decoder::{Decoder, DecodingResult, Limits};
use tiff::tags::Tag;

/// GDAL's private ASCII tag holding the no-data value
const GDAL_NODATA_TAG: u16 = 42113;

/// Position of the x-velocity band in [`BANDS`]; it defines the grid
const GRID_BAND: usize = 1;

/// Spatial resolution of the RGI 13-15 products in metres
pub const DEFAULT_RESOLUTION: f64 = 50.0;

/// Which directory a band is stored under
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BandGroup {
    Velocity,
    Thickness,
}

/// Filename prefix, storage group and quantity of every band, in read order
pub const BANDS: [(&str, BandGroup, Quantity); 7] = [
    ("V", BandGroup::Velocity, Quantity::Velocity),
    ("VX", BandGroup::Velocity, Quantity::VelocityX),
    ("VY", BandGroup::Velocity, Quantity::VelocityY),
    ("STDX", BandGroup::Velocity, Quantity::VelocityXError),
    ("STDY", BandGroup::Velocity, Quantity::VelocityYError),
    ("THICKNESS", BandGroup::Thickness, Quantity::Thickness),
    ("ERRTHICKNESS", BandGroup::Thickness, Quantity::ThicknessError),
];

/// Directory and filename convention of one velocity/thickness product pair
#[derive(Debug, Clone)]
pub struct GeoTiffLayout {
    pub velocity_dir: PathBuf,
    pub thickness_dir: PathBuf,
    pub velocity_stem: String,
    pub thickness_stem: String,
    /// Grid spacing in metres
    pub resolution: f64,
    /// Samples strictly above this value are "no data"
    pub sentinel: f32,
}

impl GeoTiffLayout {
    pub fn new(
        velocity_dir: impl Into<PathBuf>,
        thickness_dir: impl Into<PathBuf>,
        velocity_stem: impl Into<String>,
        thickness_stem: impl Into<String>,
    ) -> Self {
        Self {
            velocity_dir: velocity_dir.into(),
            thickness_dir: thickness_dir.into(),
            velocity_stem: velocity_stem.into(),
            thickness_stem: thickness_stem.into(),
            resolution: DEFAULT_RESOLUTION,
            sentinel: DEFAULT_SENTINEL,
        }
    }

    #[must_use]
    pub fn with_resolution(mut self, resolution: f64) -> Self {
        self.resolution = resolution;
        self
    }

    #[must_use]
    pub fn with_sentinel(mut self, sentinel: f32) -> Self {
        self.sentinel = sentinel;
        self
    }

    /// Full path of the band with the given prefix, e.g. `VX` →
    /// `<velocity_dir>/VX_<velocity_stem>.tif`
    pub fn band_path(&self, prefix: &str, group: BandGroup) -> PathBuf {
        let (dir, stem) = match group {
            BandGroup::Velocity => (&self.velocity_dir, &self.velocity_stem),
            BandGroup::Thickness => (&self.thickness_dir, &self.thickness_stem),
        };
        dir.join(format!("{prefix}_{stem}.tif"))
    }
}

/// Reads all seven bands of `layout` into a [`Dataset`] named after the velocity stem.
///
/// # Errors
///
/// Missing or undecodable band, or bands whose shapes disagree.
pub fn extract_geotiff(layout: &GeoTiffLayout) -> Result<Dataset> {
    let mut bands: Vec<(Quantity, RasterField)> = Vec::with_capacity(BANDS.len());
    for (prefix, group, quantity) in BANDS {
        let path = layout.band_path(prefix, group);
        bands.push((quantity, read_band(&path, layout.sentinel)?));
    }

    // Grid dimensions come from the x-velocity band.
    let (rows, cols) = bands[GRID_BAND].1.dim();
    let axes = Axes::synthesized(layout.resolution, rows, cols);

    let builder = bands
        .into_iter()
        .fold(DatasetBuilder::new(axes, layout.velocity_stem.clone()), |b, (q, f)| {
            b.field(q, f)
        });
    builder.build()
}

/// Decodes the first image of a single-band TIFF into a `(height, width)` field.
///
/// Samples above `sentinel`, and samples equal to the GDAL no-data value when
/// the file carries one, become NaN. Both tests run on the decoded sample
/// widened to f64, before it is narrowed to f32. The file handle is released
/// before returning.
pub fn read_band(path: &Path, sentinel: f32) -> Result<RasterField> {
    if !path.exists() {
        return Err(GlacierVisError::SourceNotFound {
            path: path.to_path_buf(),
        });
    }

    let unreadable = |e: tiff::TiffError| GlacierVisError::SourceUnreadable {
        path: path.to_path_buf(),
        message: e.to_string(),
    };

    let file = File::open(path)?;
    let mut decoder = Decoder::new(BufReader::new(file))
        .map_err(unreadable)?
        .with_limits(Limits::unlimited());

    let (width, height) = decoder.dimensions().map_err(unreadable)?;
    if width == 0 || height == 0 {
        return Err(GlacierVisError::EmptyRaster {
            field: path.display().to_string(),
        });
    }

    let nodata = decoder
        .get_tag_ascii_string(Tag::from_u16_exhaustive(GDAL_NODATA_TAG))
        .ok()
        .and_then(|s| s.trim().trim_end_matches('\0').parse::<f64>().ok());

    let samples: Vec<f64> = match decoder.read_image().map_err(unreadable)? {
        DecodingResult::U8(data) => data.into_iter().map(f64::from).collect(),
        DecodingResult::U16(data) => data.into_iter().map(f64::from).collect(),
        DecodingResult::U32(data) => data.into_iter().map(f64::from).collect(),
        DecodingResult::U64(data) => data.into_iter().map(|x| x as f64).collect(),
        DecodingResult::I8(data) => data.into_iter().map(f64::from).collect(),
        DecodingResult::I16(data) => data.into_iter().map(f64::from).collect(),
        DecodingResult::I32(data) => data.into_iter().map(f64::from).collect(),
        DecodingResult::I64(data) => data.into_iter().map(|x| x as f64).collect(),
        DecodingResult::F32(data) => data.into_iter().map(f64::from).collect(),
        DecodingResult::F64(data) => data,
    };

    let (rows, cols) = (height as usize, width as usize);
    if samples.len() != rows * cols {
        return Err(GlacierVisError::SourceUnreadable {
            path: path.to_path_buf(),
            message: format!(
                "expected {} samples for a single-band {}x{} raster, found {}",
                rows * cols,
                cols,
                rows,
                samples.len()
            ),
        });
    }

    let policy = MissingValuePolicy::SentinelAbove(sentinel);
    let mut masked = 0_usize;
    let data: Vec<f32> = samples
        .into_iter()
        .map(|v| {
            if policy.is_missing(v) || nodata == Some(v) {
                masked += 1;
                f32::NAN
            } else {
                v as f32
            }
        })
        .collect();
    debug!(
        "Masked {} samples (sentinel {}, no-data {:?}) in {}",
        masked,
        sentinel,
        nodata,
        path.display()
    );

    let field = Array2::from_shape_vec((rows, cols), data)?;
    info!("Read band {} ({}x{})", path.display(), cols, rows);
    Ok(field)
}
