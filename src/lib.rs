//! glacier_vis: glacier velocity and ice-thickness raster analysis
//!
//! Loads gridded velocity and thickness products (NetCDF mosaics such as
//! ITS_LIVE, or per-quantity single-band GeoTIFFs), prints summary statistics
//! over the valid samples, and renders filled contour plots with a colorbar.
//!
//! ## Module Organization
//!
//! - [`dataset`]: the immutable dataset record, axes and coordinate mesh
//! - [`netcdf_io`]: NetCDF extraction with fill-value masking
//! - [`geotiff_io`]: GeoTIFF band extraction with sentinel masking
//! - [`metadata`]: NetCDF header inspection
//! - [`statistics`]: missing-value policies and min/max/mean
//! - [`render`]: colormaps, contour levels, figure composition and output
//! - [`pipeline`]: the extract → statistics → plot runs
//! - [`errors`]: centralized error handling
//!
//! ## Usage
//!
//! ```rust,no_run
//! use glacier_vis::prelude::*;
//!
//! let layout = GeoTiffLayout::new(
//!     "./RGI-13-15_velocity",
//!     "./RGI-13-15_thickness",
//!     "RGI-13-15.1_2022February09",
//!     "RGI-13-15.1_2022February10",
//! );
//! let dataset = extract_geotiff(&layout).unwrap();
//! let velocity = dataset.require(Quantity::Velocity).unwrap();
//! let stats = compute_statistics(Quantity::Velocity, velocity).unwrap();
//! print_statistics(&stats);
//! ```

pub mod cli;
pub mod dataset;
pub mod errors;
pub mod geotiff_io;
pub mod metadata;
pub mod netcdf_io;
pub mod pipeline;
pub mod render;
pub mod statistics;

pub use errors::{GlacierVisError, Result};

pub mod prelude {
    //! Commonly used imports for convenience
    pub use crate::dataset::{
        Axes, CoordinateMesh, Dataset, DatasetBuilder, Quantity, RasterField,
    };
    pub use crate::errors::{GlacierVisError, Result};
    pub use crate::geotiff_io::{extract_geotiff, GeoTiffLayout};
    pub use crate::netcdf_io::{extract_netcdf, NetCdfSource};
    pub use crate::pipeline::{run_geotiff, run_netcdf, GeoTiffRun, NetCdfRun, RunSummary};
    pub use crate::render::{Colormap, OutputFormat, RenderOptions};
    pub use crate::statistics::{
        compute_statistics, print_statistics, FieldStatistics, MissingValuePolicy,
    };
}
