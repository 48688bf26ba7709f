//! Encoding composed figures as PDF, SVG or PNG

use crate::dataset::Quantity;
use crate::errors::{GlacierVisError, Result};
use log::debug;
use std::fmt;
use std::str::FromStr;
use usvg::fontdb;

/// Resolution used for raster output when none is given
pub const DEFAULT_DPI: f32 = 600.0;

/// SVG user units are points
const POINTS_PER_INCH: f32 = 72.0;

/// Output document type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Vector PDF
    #[default]
    Pdf,
    /// The composed SVG as is
    Svg,
    /// Rasterised PNG
    Png,
}

impl OutputFormat {
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Svg => "svg",
            Self::Png => "png",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pdf" => Ok(Self::Pdf),
            "svg" => Ok(Self::Svg),
            "png" => Ok(Self::Png),
            _ => Err(format!("Unknown output format '{s}': expected pdf, svg or png")),
        }
    }
}

/// `<stem>_<suffix>.<ext>`, e.g. `foo_velocity.pdf`
pub fn output_filename(stem: &str, quantity: Quantity, format: OutputFormat) -> String {
    format!("{}_{}.{}", stem, quantity.file_suffix(), format.extension())
}

/// Encodes a composed figure into the bytes of the requested format.
///
/// `dpi` only affects PNG output. Nothing is written to disk, so a run can
/// encode every figure before creating any file.
///
/// # Errors
///
/// [`GlacierVisError::RenderError`] when the SVG cannot be parsed, when labels
/// would be lost for lack of a usable font, or when the canvas cannot be allocated.
pub fn encode_figure(svg: &str, format: OutputFormat, dpi: f32) -> Result<Vec<u8>> {
    let bytes = match format {
        OutputFormat::Svg => svg.as_bytes().to_vec(),
        OutputFormat::Pdf => {
            let tree = parse_svg(svg)?;
            svg2pdf::to_pdf(
                &tree,
                svg2pdf::ConversionOptions::default(),
                svg2pdf::PageOptions::default(),
            )
        }
        OutputFormat::Png => {
            let tree = parse_svg(svg)?;
            let scale = dpi / POINTS_PER_INCH;
            let size = tree.size();
            let width = (size.width() * scale).ceil() as u32;
            let height = (size.height() * scale).ceil() as u32;
            let mut pixmap = tiny_skia::Pixmap::new(width, height).ok_or_else(|| {
                GlacierVisError::RenderError(format!(
                    "cannot allocate a {width}x{height} pixel canvas"
                ))
            })?;
            resvg::render(
                &tree,
                tiny_skia::Transform::from_scale(scale, scale),
                &mut pixmap.as_mut(),
            );
            pixmap
                .encode_png()
                .map_err(|e| GlacierVisError::RenderError(e.to_string()))?
        }
    };

    debug!("Encoded {} figure ({} bytes)", format, bytes.len());
    Ok(bytes)
}

/// Families tried, in order, for the generic `sans-serif` family
const SANS_SERIF_CANDIDATES: [&str; 6] = [
    "Arial",
    "Helvetica",
    "DejaVu Sans",
    "Liberation Sans",
    "Noto Sans",
    "FreeSans",
];

/// Loads the system fonts and points `sans-serif` at a family that is installed.
fn configure_fonts(fontdb: &mut fontdb::Database) -> Result<()> {
    fontdb.load_system_fonts();

    let installed = |name: &str| {
        let query = fontdb::Query {
            families: &[fontdb::Family::Name(name)],
            ..fontdb::Query::default()
        };
        fontdb.query(&query).is_some()
    };
    let family = SANS_SERIF_CANDIDATES
        .iter()
        .find(|name| installed(name))
        .map(|name| name.to_string())
        .or_else(|| {
            fontdb
                .faces()
                .find_map(|face| face.families.first().map(|(name, _)| name.clone()))
        })
        .ok_or_else(|| {
            GlacierVisError::RenderError(
                "no font is installed; figure labels cannot be drawn".to_string(),
            )
        })?;

    debug!("Using '{}' for sans-serif text ({} faces loaded)", family, fontdb.len());
    fontdb.set_sans_serif_family(family);
    Ok(())
}

fn count_text_nodes(group: &usvg::Group) -> usize {
    group
        .children()
        .iter()
        .map(|node| match node {
            usvg::Node::Group(group) => count_text_nodes(group),
            usvg::Node::Text(_) => 1,
            _ => 0,
        })
        .sum()
}

/// Parses `svg`, failing if any `<text>` element was dropped for lack of a font.
fn parse_svg(svg: &str) -> Result<usvg::Tree> {
    let mut options = usvg::Options::default();
    configure_fonts(options.fontdb_mut())?;
    let tree = usvg::Tree::from_str(svg, &options)
        .map_err(|e| GlacierVisError::RenderError(e.to_string()))?;

    let composed = svg.matches("<text").count();
    let kept = count_text_nodes(tree.root());
    if kept < composed {
        return Err(GlacierVisError::RenderError(format!(
            "only {kept} of {composed} text labels could be laid out with the installed fonts"
        )));
    }
    Ok(tree)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Axes;
    use crate::render::{compose_svg, Colormap, PlotSpec};
    use ndarray::{array, Array1};

    fn sample_svg() -> String {
        let axes = Axes::new(Array1::from(vec![0.0, 50.0, 100.0]), Array1::from(vec![0.0, 50.0]));
        let field = array![[1.0_f32, 2.0, 3.0], [4.0, 5.0, 6.0]];
        let spec = PlotSpec::new(Colormap::Viridis, "Velocity (m/yr)");
        compose_svg(&axes, &field, &spec).unwrap()
    }

    fn contains(haystack: &[u8], needle: &[u8]) -> bool {
        haystack.windows(needle.len()).any(|w| w == needle)
    }

    #[test]
    fn test_parsed_tree_keeps_every_label() {
        let svg = sample_svg();
        assert!(svg.contains(r#"font-family="sans-serif""#));
        let tree = parse_svg(&svg).unwrap();
        assert!(count_text_nodes(tree.root()) > 0);
        assert_eq!(count_text_nodes(tree.root()), svg.matches("<text").count());
    }

    #[test]
    fn test_pdf_carries_fonts_for_labels() {
        let pdf = encode_figure(&sample_svg(), OutputFormat::Pdf, DEFAULT_DPI).unwrap();
        assert!(pdf.starts_with(b"%PDF"));
        assert!(contains(&pdf, b"/Font"));
    }

    #[test]
    fn test_png_pixels_follow_dpi() {
        let svg = sample_svg();
        let size = parse_svg(&svg).unwrap().size();
        let png = encode_figure(&svg, OutputFormat::Png, 36.0).unwrap();
        let pixmap = tiny_skia::Pixmap::decode_png(&png).unwrap();
        assert_eq!(pixmap.width(), (size.width() * 0.5).ceil() as u32);
        assert_eq!(pixmap.height(), (size.height() * 0.5).ceil() as u32);
    }

    #[test]
    fn test_svg_is_passed_through() {
        let svg = sample_svg();
        assert_eq!(encode_figure(&svg, OutputFormat::Svg, DEFAULT_DPI).unwrap(), svg.as_bytes());
    }

    #[test]
    fn test_output_filename_is_stem_plus_suffix() {
        assert_eq!(
            output_filename("foo", Quantity::Velocity, OutputFormat::Pdf),
            "foo_velocity.pdf"
        );
        assert_eq!(
            output_filename(
                "RGI-13-15.1_2022February09",
                Quantity::Thickness,
                OutputFormat::Pdf
            ),
            "RGI-13-15.1_2022February09_thickness.pdf"
        );
        assert_eq!(
            output_filename("foo", Quantity::VelocityX, OutputFormat::Png),
            "foo_Xvelocity.png"
        );
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!("PDF".parse::<OutputFormat>(), Ok(OutputFormat::Pdf));
        assert_eq!("svg".parse::<OutputFormat>(), Ok(OutputFormat::Svg));
        assert!("eps".parse::<OutputFormat>().is_err());
        assert_eq!(OutputFormat::default(), OutputFormat::Pdf);
    }
}
