//! The two end-to-end runs: extract → statistics → plot
//!
//! Each run processes exactly one dataset. Every requested figure is composed,
//! encoded and its statistics computed before the first file is written, so a
//! field that fails validation or encoding leaves no partial output behind.

use crate::dataset::{Dataset, Quantity};
use crate::errors::Result;
use crate::geotiff_io::{extract_geotiff, GeoTiffLayout};
use crate::metadata::print_metadata;
use crate::netcdf_io::{extract_netcdf, open_source, NetCdfSource};
use crate::render::{encode_figure, render_field, RenderOptions};
use crate::statistics::{compute_statistics, print_statistics, FieldStatistics};
use log::info;
use std::fs;
use std::path::PathBuf;

/// What a run printed and wrote
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub statistics: Vec<FieldStatistics>,
    pub outputs: Vec<PathBuf>,
}

/// NetCDF run: one file, one plotted quantity
#[derive(Debug, Clone)]
pub struct NetCdfRun {
    pub source: NetCdfSource,
    pub quantity: Quantity,
    /// Print the file header before extracting
    pub show_header: bool,
    pub render: RenderOptions,
}

/// GeoTIFF run: one velocity/thickness product pair, several plotted quantities
#[derive(Debug, Clone)]
pub struct GeoTiffRun {
    pub layout: GeoTiffLayout,
    pub quantities: Vec<Quantity>,
    pub render: RenderOptions,
}

pub fn run_netcdf(run: &NetCdfRun) -> Result<RunSummary> {
    if run.show_header {
        let file = open_source(&run.source.path)?;
        print_metadata(&file)?;
    }

    let dataset = extract_netcdf(&run.source)?;
    info!(
        "Extracted '{}' on a {}x{} grid",
        dataset.stem(),
        dataset.mesh().shape().1,
        dataset.mesh().shape().0
    );
    summarize_and_plot(&dataset, &[run.quantity], &run.render)
}

pub fn run_geotiff(run: &GeoTiffRun) -> Result<RunSummary> {
    let dataset = extract_geotiff(&run.layout)?;
    info!(
        "Extracted '{}' on a {}x{} grid at {} m resolution",
        dataset.stem(),
        dataset.mesh().shape().1,
        dataset.mesh().shape().0,
        run.layout.resolution
    );
    summarize_and_plot(&dataset, &run.quantities, &run.render)
}

/// Prints statistics of every quantity and writes one figure per quantity.
pub fn summarize_and_plot(
    dataset: &Dataset,
    quantities: &[Quantity],
    options: &RenderOptions,
) -> Result<RunSummary> {
    let mut statistics = Vec::with_capacity(quantities.len());
    let mut figures = Vec::with_capacity(quantities.len());
    for &quantity in quantities {
        let stats = compute_statistics(quantity, dataset.require(quantity)?)?;
        let svg = render_field(dataset, quantity, options)?;
        let bytes = encode_figure(&svg, options.format, options.dpi)?;
        statistics.push(stats);
        figures.push((quantity, bytes));
    }

    for stats in &statistics {
        print_statistics(stats);
    }

    fs::create_dir_all(&options.output_dir)?;
    let mut outputs = Vec::with_capacity(figures.len());
    for (quantity, bytes) in figures {
        let path = options.output_path(dataset.stem(), quantity);
        fs::write(&path, bytes)?;
        info!("Saved {} plot to {}", quantity.as_str(), path.display());
        outputs.push(path);
    }

    Ok(RunSummary {
        statistics,
        outputs,
    })
}
