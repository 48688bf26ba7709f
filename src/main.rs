//! Entry point for the glaciervis application.
//! Handles CLI parsing and logger setup, then runs one pipeline over one dataset.

use clap::Parser;
use env_logger::Env;
use glacier_vis::cli::{Args, Command, GeotiffArgs, NetcdfArgs, OutputArgs};
use glacier_vis::geotiff_io::GeoTiffLayout;
use glacier_vis::metadata::print_metadata;
use glacier_vis::netcdf_io::{open_source, NetCdfSource};
use glacier_vis::pipeline::{run_geotiff, run_netcdf, GeoTiffRun, NetCdfRun};
use glacier_vis::render::{Colormap, RenderOptions};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command-line arguments
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_level)).init();

    println!(
        r#"
------------------------------------------------------------------
     glaciervis :: glacier velocity & ice-thickness rasters
------------------------------------------------------------------
"#
    );

    match args.command {
        Command::Inspect { file } => {
            let file = open_source(&file)?;
            print_metadata(&file)?;
        }
        Command::Netcdf(nc) => {
            run_netcdf(&netcdf_run(nc))?;
        }
        Command::Geotiff(gt) => {
            run_geotiff(&geotiff_run(gt))?;
        }
    }

    Ok(())
}

fn render_options(colormap: Colormap, output: OutputArgs) -> RenderOptions {
    let mut options = RenderOptions::new(colormap);
    options.format = output.format;
    options.dpi = output.dpi;
    options.output_dir = output.output_dir;
    options
}

fn netcdf_run(args: NetcdfArgs) -> NetCdfRun {
    NetCdfRun {
        source: NetCdfSource::new(args.file),
        quantity: args.variable,
        show_header: args.header,
        render: render_options(args.cmap, args.output),
    }
}

fn geotiff_run(args: GeotiffArgs) -> GeoTiffRun {
    let layout = GeoTiffLayout::new(
        args.velocity_dir,
        args.thickness_dir,
        args.velocity_stem,
        args.thickness_stem,
    )
    .with_resolution(args.resolution)
    .with_sentinel(args.sentinel);

    GeoTiffRun {
        layout,
        quantities: args.fields,
        render: render_options(args.cmap, args.output),
    }
}
