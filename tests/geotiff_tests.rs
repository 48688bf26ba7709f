//! GeoTIFF extraction and end-to-end runs over synthetic band files

use glacier_vis::{
    dataset::Quantity,
    errors::{GlacierVisError, Result},
    geotiff_io::{extract_geotiff, read_band, BandGroup, GeoTiffLayout, BANDS},
    pipeline::{run_geotiff, GeoTiffRun},
    render::{Colormap, OutputFormat, RenderOptions},
    statistics::masking::DEFAULT_SENTINEL,
};
use std::fs::{self, File};
use std::path::Path;
use tempfile::{tempdir, TempDir};
use tiff::encoder::{colortype, TiffEncoder};
use tiff::tags::Tag;

const WIDTH: u32 = 4;
const HEIGHT: u32 = 3;
const NO_DATA: f32 = 3.4e38;

fn write_f32_band(path: &Path, width: u32, height: u32, data: &[f32]) -> Result<()> {
    let mut encoder = TiffEncoder::new(File::create(path)?)?;
    encoder.write_image::<colortype::Gray32Float>(width, height, data)?;
    Ok(())
}

/// Lays out all seven bands for stems `foo` (velocity) and `bar` (thickness).
fn write_product(dir: &TempDir, thickness: Option<Vec<f32>>) -> Result<GeoTiffLayout> {
    let velocity_dir = dir.path().join("RGI-13-15_velocity");
    let thickness_dir = dir.path().join("RGI-13-15_thickness");
    fs::create_dir_all(&velocity_dir)?;
    fs::create_dir_all(&thickness_dir)?;
    let layout = GeoTiffLayout::new(&velocity_dir, &thickness_dir, "foo", "bar");

    let n = (WIDTH * HEIGHT) as usize;
    for (prefix, group, quantity) in BANDS {
        let data: Vec<f32> = match quantity {
            Quantity::Velocity => {
                let mut v: Vec<f32> = (1..=n).map(|i| i as f32).collect();
                v[0] = NO_DATA;
                v
            }
            Quantity::Thickness => thickness
                .clone()
                .unwrap_or_else(|| (0..n).map(|i| 100.0 + 10.0 * i as f32).collect()),
            _ => vec![0.5; n],
        };
        write_f32_band(&layout.band_path(prefix, group), WIDTH, HEIGHT, &data)?;
    }
    Ok(layout)
}

fn svg_options(dir: &Path) -> RenderOptions {
    let mut options = RenderOptions::new(Colormap::Coolwarm);
    options.format = OutputFormat::Svg;
    options.output_dir = dir.to_path_buf();
    options
}

#[test]
fn test_extract_builds_synthetic_axes() -> Result<()> {
    let dir = tempdir().expect("Failed to create temp dir");
    let layout = write_product(&dir, None)?;

    let dataset = extract_geotiff(&layout)?;
    assert_eq!(dataset.stem(), "foo");
    assert_eq!(dataset.mesh().shape(), (3, 4));
    assert_eq!(dataset.quantities().count(), 7);

    // 50 * linspace(0, 4, 4) and 50 * linspace(0, 3, 3)
    let x = dataset.axes().x.to_vec();
    let y = dataset.axes().y.to_vec();
    assert_eq!(x.len(), 4);
    assert!((x[1] - 200.0 / 3.0).abs() < 1e-9);
    assert!((x[3] - 200.0).abs() < 1e-9);
    assert_eq!(y.len(), 3);
    assert!((y[1] - 75.0).abs() < 1e-9);
    assert!((dataset.mesh().y[[2, 0]] - 150.0).abs() < 1e-9);

    Ok(())
}

#[test]
fn test_sentinel_is_excluded_from_statistics() -> Result<()> {
    let dir = tempdir().expect("Failed to create temp dir");
    let layout = write_product(&dir, None)?;
    let out = dir.path().join("figures");

    let run = GeoTiffRun {
        layout,
        quantities: vec![Quantity::Velocity, Quantity::Thickness],
        render: svg_options(&out),
    };
    let summary = run_geotiff(&run)?;

    let velocity = summary.statistics[0];
    assert_eq!(velocity.quantity, Quantity::Velocity);
    assert_eq!(velocity.count, 11);
    assert_eq!(velocity.min, 2.0);
    assert_eq!(velocity.max, 12.0);
    assert_eq!(velocity.mean, 7.0);

    let thickness = summary.statistics[1];
    assert_eq!(thickness.min, 100.0);
    assert_eq!(thickness.max, 210.0);

    // Outputs are named after the velocity stem, not the thickness stem.
    assert_eq!(
        summary.outputs,
        vec![out.join("foo_velocity.svg"), out.join("foo_thickness.svg")]
    );
    assert!(out.join("foo_velocity.svg").exists());
    assert!(!out.join("bar_thickness.svg").exists());

    Ok(())
}

#[test]
fn test_all_sentinel_thickness_fails_without_partial_output() -> Result<()> {
    let dir = tempdir().expect("Failed to create temp dir");
    let layout = write_product(&dir, Some(vec![1e20; (WIDTH * HEIGHT) as usize]))?;
    let out = dir.path().join("figures");

    let run = GeoTiffRun {
        layout,
        quantities: vec![Quantity::Velocity, Quantity::Thickness],
        render: svg_options(&out),
    };

    match run_geotiff(&run) {
        Err(GlacierVisError::AllMissing { field }) => assert_eq!(field, "thickness"),
        other => panic!("Expected AllMissing, got {:?}", other),
    }
    assert!(!out.join("foo_velocity.svg").exists());
    Ok(())
}

#[test]
fn test_mismatched_band_shape_is_fatal() -> Result<()> {
    let dir = tempdir().expect("Failed to create temp dir");
    let layout = write_product(&dir, None)?;
    let path = layout.band_path("THICKNESS", BandGroup::Thickness);
    write_f32_band(&path, 3, 4, &[1.0; 12])?;

    match extract_geotiff(&layout) {
        Err(GlacierVisError::ShapeMismatch {
            field,
            expected,
            found,
        }) => {
            assert_eq!(field, "thickness");
            assert_eq!(expected, (3, 4));
            assert_eq!(found, (4, 3));
        }
        other => panic!("Expected ShapeMismatch, got {:?}", other),
    }
    Ok(())
}

#[test]
fn test_missing_thickness_band_is_source_not_found() -> Result<()> {
    let dir = tempdir().expect("Failed to create temp dir");
    let layout = write_product(&dir, None)?;
    let path = layout.band_path("ERRTHICKNESS", BandGroup::Thickness);
    fs::remove_file(&path)?;

    match extract_geotiff(&layout) {
        Err(GlacierVisError::SourceNotFound { path: missing }) => assert_eq!(missing, path),
        other => panic!("Expected SourceNotFound, got {:?}", other),
    }
    Ok(())
}

#[test]
fn test_integer_band_is_widened() -> Result<()> {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("V_int.tif");
    {
        let mut encoder = TiffEncoder::new(File::create(&path)?)?;
        encoder.write_image::<colortype::Gray16>(3, 2, &[0u16, 1, 2, 300, 400, 65535])?;
    }

    let band = read_band(&path, DEFAULT_SENTINEL)?;
    assert_eq!(band.dim(), (2, 3));
    assert_eq!(band[[1, 0]], 300.0);
    assert_eq!(band[[1, 2]], 65535.0);
    Ok(())
}

#[test]
fn test_garbage_file_is_unreadable() -> Result<()> {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("V_bad.tif");
    fs::write(&path, b"not a tiff at all")?;

    assert!(matches!(
        read_band(&path, DEFAULT_SENTINEL),
        Err(GlacierVisError::SourceUnreadable { .. })
    ));
    Ok(())
}

#[test]
fn test_gdal_nodata_tag_is_masked() -> Result<()> {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("THICKNESS_nodata.tif");
    {
        let mut encoder = TiffEncoder::new(File::create(&path)?)?;
        let mut image = encoder.new_image::<colortype::Gray32Float>(3, 2)?;
        image
            .encoder()
            .write_tag(Tag::from_u16_exhaustive(42113), "-9999")?;
        image.write_data(&[-9999.0, 120.0, 80.0, 64.5, -9999.0, 0.0])?;
    }

    let band = read_band(&path, DEFAULT_SENTINEL)?;
    assert!(band[[0, 0]].is_nan());
    assert!(band[[1, 1]].is_nan());
    assert_eq!(band[[0, 1]], 120.0);
    assert_eq!(band[[1, 2]], 0.0);
    assert_eq!(band.iter().filter(|v| v.is_nan()).count(), 2);
    Ok(())
}

#[test]
fn test_double_band_sentinel_is_compared_before_narrowing() -> Result<()> {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("V_double.tif");
    {
        let mut encoder = TiffEncoder::new(File::create(&path)?)?;
        encoder.write_image::<colortype::Gray64Float>(2, 1, &[1.0000000001e10, 42.0])?;
    }

    let band = read_band(&path, DEFAULT_SENTINEL)?;
    assert!(band[[0, 0]].is_nan());
    assert_eq!(band[[0, 1]], 42.0);
    Ok(())
}

#[test]
fn test_geotiff_run_writes_pdf_figures() -> Result<()> {
    let dir = tempdir().expect("Failed to create temp dir");
    let layout = write_product(&dir, None)?;
    let out = dir.path().join("figures");

    let mut render = svg_options(&out);
    render.format = OutputFormat::Pdf;
    let run = GeoTiffRun {
        layout,
        quantities: vec![Quantity::Velocity, Quantity::Thickness],
        render,
    };
    let summary = run_geotiff(&run)?;

    assert_eq!(
        summary.outputs,
        vec![out.join("foo_velocity.pdf"), out.join("foo_thickness.pdf")]
    );
    for path in &summary.outputs {
        let bytes = fs::read(path)?;
        assert!(bytes.starts_with(b"%PDF"));
        assert!(bytes.windows(5).any(|w| w == b"/Font"));
    }
    Ok(())
}

#[test]
fn test_encoding_failure_leaves_no_output() -> Result<()> {
    let dir = tempdir().expect("Failed to create temp dir");
    let layout = write_product(&dir, None)?;
    let out = dir.path().join("figures");

    let mut render = svg_options(&out);
    render.format = OutputFormat::Png;
    // far beyond any canvas tiny-skia can allocate
    render.dpi = 1e9;
    let run = GeoTiffRun {
        layout,
        quantities: vec![Quantity::Velocity, Quantity::Thickness],
        render,
    };

    match run_geotiff(&run) {
        Err(GlacierVisError::RenderError(message)) => assert!(message.contains("canvas")),
        other => panic!("Expected RenderError, got {:?}", other),
    }
    assert!(!out.exists());
    Ok(())
}
