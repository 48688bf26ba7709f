//! Unit tests for the public glacier_vis API
//!
//! These cover the data-model and statistics guarantees that every pipeline
//! relies on, independently of any file format.

use glacier_vis::{
    dataset::{synthesize_axis, Axes, CoordinateMesh, DatasetBuilder, Quantity},
    errors::{GlacierVisError, Result},
    render::{output_filename, OutputFormat},
    statistics::{
        apply_policy, compute_statistics, mask_sentinel, valid_count, MissingValuePolicy,
    },
};
use ndarray::{array, Array2};
use std::path::PathBuf;

#[test]
fn test_error_types() {
    let missing = GlacierVisError::SourceNotFound {
        path: PathBuf::from("./RGI-13-15_velocity/V_x.tif"),
    };
    assert!(format!("{}", missing).contains("V_x.tif"));

    let shape = GlacierVisError::ShapeMismatch {
        field: "thickness".to_string(),
        expected: (3, 4),
        found: (4, 3),
    };
    assert_eq!(
        format!("{}", shape),
        "Field 'thickness' has shape 4x3 but the coordinate mesh is 3x4"
    );

    let empty = GlacierVisError::AllMissing {
        field: "velocity".to_string(),
    };
    assert!(format!("{}", empty).contains("no valid samples"));

    let var_err = GlacierVisError::VariableNotFound {
        var: "v_err".to_string(),
    };
    assert!(format!("{}", var_err).contains("Variable 'v_err' not found"));
}

#[test]
fn test_three_by_three_with_one_nan() -> Result<()> {
    let field = array![
        [1.0_f32, 2.0, 3.0],
        [4.0, f32::NAN, 5.0],
        [6.0, 7.0, 8.0]
    ];
    let stats = compute_statistics(Quantity::Velocity, &field)?;
    assert_eq!(stats.min, 1.0);
    assert_eq!(stats.max, 8.0);
    assert_eq!(stats.mean, 4.5);
    Ok(())
}

#[test]
fn test_min_le_mean_le_max_over_many_fields() -> Result<()> {
    // Linear congruential generator keeps the data reproducible.
    let mut state: u64 = 0x2545_f491_4f6c_dd1d;
    let mut next = move || {
        state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        ((state >> 33) as f32 / (1u64 << 31) as f32) * 2000.0 - 500.0
    };

    for rows in 1..6 {
        for cols in 1..6 {
            let mut field = Array2::from_shape_fn((rows, cols), |_| next());
            field[[0, 0]] = f32::NAN;
            if valid_count(&field) == 0 {
                continue;
            }
            let stats = compute_statistics(Quantity::Thickness, &field)?;
            assert!(stats.min <= stats.mean, "{:?}", stats);
            assert!(stats.mean <= stats.max, "{:?}", stats);
            assert_eq!(stats.count, rows * cols - 1);
        }
    }
    Ok(())
}

#[test]
fn test_all_sentinel_field_fails_statistics() {
    let mut field = Array2::from_elem((4, 4), 2e10_f32);
    assert_eq!(mask_sentinel(&mut field, 1e10), 16);
    assert_eq!(valid_count(&field), 0);

    match compute_statistics(Quantity::Thickness, &field) {
        Err(GlacierVisError::AllMissing { field }) => assert_eq!(field, "thickness"),
        other => panic!("Expected AllMissing, got {:?}", other),
    }
}

#[test]
fn test_policies_leave_nan_missing() {
    let mut field = array![[f32::NAN, 1.0], [2.0, 3.0]];
    apply_policy(&mut field, MissingValuePolicy::SentinelAbove(1e10));
    apply_policy(&mut field, MissingValuePolicy::FillValue(-9999.0));
    assert_eq!(valid_count(&field), 3);
}

#[test]
fn test_mesh_dimensions_follow_axes() {
    for (rows, cols) in [(1, 1), (2, 7), (9, 3)] {
        let axes = Axes::synthesized(50.0, rows, cols);
        let mesh = CoordinateMesh::from_axes(&axes);
        assert_eq!(mesh.shape(), (axes.y.len(), axes.x.len()));
        assert_eq!(mesh.shape(), (rows, cols));
        assert_eq!(mesh.y.dim(), mesh.x.dim());
    }
}

#[test]
fn test_mismatched_field_never_broadcasts() {
    let axes = Axes::synthesized(50.0, 3, 4);
    // a single row would broadcast in array libraries; here it must fail
    let result = DatasetBuilder::new(axes, "foo")
        .field(Quantity::Velocity, Array2::zeros((3, 4)))
        .field(Quantity::Thickness, Array2::zeros((1, 4)))
        .build();
    assert!(matches!(
        result,
        Err(GlacierVisError::ShapeMismatch { found: (1, 4), .. })
    ));
}

#[test]
fn test_axis_synthesis_scales_linspace() {
    let axis = synthesize_axis(50.0, 5);
    let expected = [0.0, 62.5, 125.0, 187.5, 250.0];
    for (a, e) in axis.iter().zip(expected) {
        assert!((a - e).abs() < 1e-9);
    }
}

#[test]
fn test_output_name_uses_velocity_stem() -> Result<()> {
    let axes = Axes::synthesized(50.0, 2, 2);
    let dataset = DatasetBuilder::new(axes, "foo")
        .field(Quantity::Velocity, Array2::ones((2, 2)))
        .field(Quantity::Thickness, Array2::ones((2, 2)))
        .build()?;

    assert_eq!(
        output_filename(dataset.stem(), Quantity::Velocity, OutputFormat::Pdf),
        "foo_velocity.pdf"
    );
    assert_eq!(
        output_filename(dataset.stem(), Quantity::Thickness, OutputFormat::Pdf),
        "foo_thickness.pdf"
    );
    Ok(())
}
