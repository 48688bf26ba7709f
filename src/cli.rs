//! Defines command-line interface options using `clap` for the glaciervis application.

use crate::dataset::Quantity;
use crate::render::{Colormap, OutputFormat};
use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;

/// A CLI tool for plotting glacier velocity and thickness rasters
#[derive(Parser, Debug)]
#[command(
    version,
    name = "glaciervis",
    about = "Statistics and filled contour plots of glacier velocity and ice-thickness rasters"
)]
pub struct Args {
    /// Enable verbose (debug) logging.
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Plot a velocity variable of a NetCDF velocity mosaic
    Netcdf(NetcdfArgs),
    /// Plot velocity and thickness from single-band GeoTIFF products
    Geotiff(GeotiffArgs),
    /// Print dimensions, variables and attributes of a NetCDF file
    Inspect {
        /// Path to the NetCDF file
        file: PathBuf,
    },
}

/// Output options shared by both plotting commands
#[derive(ClapArgs, Debug, Clone)]
pub struct OutputArgs {
    /// Output document type: pdf, svg or png
    #[arg(long, default_value = "pdf", value_parser = parse_format)]
    pub format: OutputFormat,

    /// Resolution of raster (png) output in dots per inch
    #[arg(long, default_value_t = 600.0)]
    pub dpi: f32,

    /// Directory the figures are written to
    #[arg(short, long, default_value = ".")]
    pub output_dir: PathBuf,
}

#[derive(ClapArgs, Debug)]
pub struct NetcdfArgs {
    /// Path to the NetCDF file
    #[arg(short, long, default_value = "HMA_G0240_2018.nc")]
    pub file: PathBuf,

    /// Variable to summarise and plot: v, vx, vy, v_err, vx_err or vy_err
    #[arg(long, default_value = "v", value_parser = parse_netcdf_variable)]
    pub variable: Quantity,

    /// Color scheme of the filled contours
    #[arg(long, default_value = "Blues", value_parser = parse_colormap)]
    pub cmap: Colormap,

    /// Print the file header before extracting
    #[arg(long)]
    pub header: bool,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(ClapArgs, Debug)]
pub struct GeotiffArgs {
    /// Filename stem of the velocity products (V_<stem>.tif, VX_<stem>.tif, ...)
    #[arg(long, default_value = "RGI-13-15.1_2022February09")]
    pub velocity_stem: String,

    /// Filename stem of the thickness products (THICKNESS_<stem>.tif, ERRTHICKNESS_<stem>.tif)
    #[arg(long, default_value = "RGI-13-15.1_2022February10")]
    pub thickness_stem: String,

    /// Directory holding the velocity products
    #[arg(long, default_value = "./RGI-13-15_velocity")]
    pub velocity_dir: PathBuf,

    /// Directory holding the thickness products
    #[arg(long, default_value = "./RGI-13-15_thickness")]
    pub thickness_dir: PathBuf,

    /// Grid spacing in metres used to synthesize the coordinate axes
    #[arg(long, default_value_t = 50.0)]
    pub resolution: f64,

    /// Samples above this value are treated as missing
    #[arg(long, default_value_t = 1e10)]
    pub sentinel: f32,

    /// Fields to plot, comma separated: velocity, thickness, vx, vy, vx_err, vy_err, thickness_err
    #[arg(
        long,
        value_delimiter = ',',
        default_value = "velocity,thickness",
        value_parser = parse_geotiff_field
    )]
    pub fields: Vec<Quantity>,

    /// Color scheme of the filled contours
    #[arg(long, default_value = "coolwarm", value_parser = parse_colormap)]
    pub cmap: Colormap,

    #[command(flatten)]
    pub output: OutputArgs,
}

fn parse_colormap(s: &str) -> Result<Colormap, String> {
    s.parse()
}

fn parse_format(s: &str) -> Result<OutputFormat, String> {
    s.parse()
}

fn parse_netcdf_variable(s: &str) -> Result<Quantity, String> {
    crate::netcdf_io::VELOCITY_VARIABLES
        .iter()
        .find(|(name, _)| *name == s)
        .map(|(_, q)| *q)
        .ok_or_else(|| {
            "Invalid variable: expected one of v, vx, vy, v_err, vx_err, vy_err.".to_string()
        })
}

fn parse_geotiff_field(s: &str) -> Result<Quantity, String> {
    match s.trim() {
        "velocity" | "v" => Ok(Quantity::Velocity),
        "vx" => Ok(Quantity::VelocityX),
        "vy" => Ok(Quantity::VelocityY),
        "vx_err" => Ok(Quantity::VelocityXError),
        "vy_err" => Ok(Quantity::VelocityYError),
        "thickness" => Ok(Quantity::Thickness),
        "thickness_err" => Ok(Quantity::ThicknessError),
        other => Err(format!("Invalid field '{other}'.")),
    }
}
