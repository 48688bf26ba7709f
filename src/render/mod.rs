//! Filled contour plots of dataset fields
//!
//! # Organization
//!
//! - [`colormap`]: named color schemes
//! - [`levels`]: automatic contour levels
//! - [`isobands`]: marching-squares outlines of the filled bands
//! - [`figure`]: SVG composition of plot, axes and colorbar
//! - [`output`]: output naming and PDF/SVG/PNG encoding

pub mod colormap;
pub mod figure;
pub mod isobands;
pub mod levels;
pub mod output;

pub use colormap::Colormap;
pub use figure::{compose_svg, FigureLayout, PlotSpec};
pub use output::{encode_figure, output_filename, OutputFormat, DEFAULT_DPI};

use crate::dataset::{Dataset, Quantity};
use crate::errors::Result;
use std::path::PathBuf;

/// Settings shared by every figure of a run
#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub colormap: Colormap,
    pub format: OutputFormat,
    pub dpi: f32,
    pub output_dir: PathBuf,
    pub layout: FigureLayout,
}

impl RenderOptions {
    pub fn new(colormap: Colormap) -> Self {
        Self {
            colormap,
            format: OutputFormat::default(),
            dpi: DEFAULT_DPI,
            output_dir: PathBuf::from("."),
            layout: FigureLayout::default(),
        }
    }

    /// Where the figure of `quantity` for `stem` is written
    pub fn output_path(&self, stem: &str, quantity: Quantity) -> PathBuf {
        self.output_dir
            .join(output_filename(stem, quantity, self.format))
    }
}

/// Composes the figure of one dataset field without writing it.
pub fn render_field(
    dataset: &Dataset,
    quantity: Quantity,
    options: &RenderOptions,
) -> Result<String> {
    let field = dataset.require(quantity)?;
    let mut spec = PlotSpec::new(options.colormap, quantity.label());
    spec.layout = options.layout.clone();
    compose_svg(dataset.axes(), field, &spec)
}

