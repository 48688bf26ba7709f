//! Creates a small synthetic glacier velocity mosaic for trying out glaciervis.
//!
//! The file mimics the layout of an ITS_LIVE regional mosaic: projected `x`/`y`
//! coordinates, a descending `y` axis, and the six velocity variables with a
//! `_FillValue` marking off-glacier cells.

use ndarray::{Array1, Array2};
use netcdf::create;
use std::path::Path;

const NX: usize = 60;
const NY: usize = 40;
const SPACING: f64 = 240.0;
const FILL: f32 = -32767.0;

/// Flow speed of a valley glacier whose centreline runs along the x axis.
fn speed(row: usize, col: usize) -> Option<f32> {
    let across = (row as f32 - NY as f32 / 2.0) / (NY as f32 / 2.0);
    let along = col as f32 / NX as f32;
    let half_width = 0.35 + 0.25 * along;
    if across.abs() > half_width {
        return None;
    }
    let profile = 1.0 - (across / half_width).powi(4);
    Some(20.0 + 180.0 * profile * (1.0 - 0.6 * along))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let output_path = Path::new("HMA_G0240_2018.nc");

    println!("🔨 Creating synthetic velocity mosaic: {}", output_path.display());

    if output_path.exists() {
        std::fs::remove_file(output_path)?
    }

    let mut file = create(output_path)?;

    file.add_attribute("title", "Synthetic glacier velocity mosaic")?;
    file.add_attribute("projection", "WGS 84 / UTM zone 45N")?;
    file.add_attribute("created_by", "create_test_netcdf.rs")?;

    file.add_dimension("x", NX)?;
    file.add_dimension("y", NY)?;

    {
        let mut x_var = file.add_variable::<f64>("x", &["x"])?;
        x_var.put_attribute("units", "m")?;
        x_var.put_attribute("standard_name", "projection_x_coordinate")?;
        let xs = Array1::from_iter((0..NX).map(|i| 450_000.0 + i as f64 * SPACING));
        x_var.put(xs.view(), ..)?;
    }

    {
        let mut y_var = file.add_variable::<f64>("y", &["y"])?;
        y_var.put_attribute("units", "m")?;
        y_var.put_attribute("standard_name", "projection_y_coordinate")?;
        let ys = Array1::from_iter((0..NY).map(|j| 3_310_000.0 - j as f64 * SPACING));
        y_var.put(ys.view(), ..)?;
    }

    let v = Array2::from_shape_fn((NY, NX), |(r, c)| speed(r, c).unwrap_or(FILL));
    // Flow bends slightly toward the south as it descends
    let vx = v.mapv(|s| if s == FILL { FILL } else { s * 0.97 });
    let vy = v.mapv(|s| if s == FILL { FILL } else { -s * 0.24 });
    let err = v.mapv(|s| if s == FILL { FILL } else { 2.0 + 0.05 * s });

    let variables = [
        ("v", "velocity magnitude", &v),
        ("vx", "velocity component in x direction", &vx),
        ("vy", "velocity component in y direction", &vy),
        ("v_err", "error in v", &err),
        ("vx_err", "error in vx", &err),
        ("vy_err", "error in vy", &err),
    ];

    for (name, long_name, data) in variables {
        let mut var = file.add_variable::<f32>(name, &["y", "x"])?;
        var.put_attribute("units", "m/yr")?;
        var.put_attribute("long_name", long_name)?;
        var.put_attribute("_FillValue", FILL)?;
        var.put(data.view(), ..)?;
    }

    println!("✅ Successfully created mosaic with:");
    println!("   📏 Dimensions: x({}), y({})", NX, NY);
    println!("   📈 Variables: x, y, v, vx, vy, v_err, vx_err, vy_err");
    println!("\n🧪 Try it with:");
    println!("   cargo run -- netcdf --file HMA_G0240_2018.nc --header");

    Ok(())
}
