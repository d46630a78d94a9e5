//! End-to-end measurement tests.

use measure_rs::error::MeasureError;
use measure_rs::image::{GreyImage, LabelImage};
use measure_rs::paint::object_to_measurement;
use measure_rs::testing::assert_slice_approx_eq;
use measure_rs::tool::{CancelToken, MeasureOptions, MeasurementTool};

/// 4x4 label image with three objects: 1 covers 4 pixels, 2 covers 1,
/// 3 covers 6.
fn three_objects() -> LabelImage {
    #[rustfmt::skip]
    let data = vec![
        1, 1, 0, 0,
        1, 1, 0, 2,
        0, 3, 3, 3,
        0, 3, 3, 3,
    ];
    LabelImage::new(vec![4, 4], data)
}

fn ones_like(label: &LabelImage) -> GreyImage {
    GreyImage::new(label.sizes().to_vec(), vec![1.0; label.num_pixels()])
}

fn column(msr: &measure_rs::table::Measurement, name: &str) -> Vec<f64> {
    msr.objects()
        .iter()
        .map(|&id| msr.cell(id, name).unwrap()[0])
        .collect()
}

#[test]
fn size_of_three_objects() {
    let label = three_objects();
    let mut tool = MeasurementTool::new();
    let msr = tool.measure(&label, None, &["Size"], &[]).unwrap();

    assert_eq!(msr.objects(), &[1, 2, 3]);
    assert_eq!(msr.num_features(), 1);
    assert_eq!(column(&msr, "Size"), vec![4.0, 1.0, 6.0]);
}

#[test]
fn mass_needs_a_grey_image() {
    let label = three_objects();
    let grey = ones_like(&label);
    let mut tool = MeasurementTool::new();

    let msr = tool.measure(&label, Some(&grey), &["Mass"], &[]).unwrap();
    assert_eq!(column(&msr, "Mass"), vec![4.0, 1.0, 6.0]);

    assert!(matches!(
        tool.measure(&label, None, &["Mass"], &[]),
        Err(MeasureError::MissingGrey(_))
    ));
}

#[test]
fn composite_closure_orders_columns() {
    let label = three_objects();
    let grey = ones_like(&label);
    let mut tool = MeasurementTool::new();
    let msr = tool.measure(&label, Some(&grey), &["Mean"], &[]).unwrap();

    let names: Vec<_> = msr.features().iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["Size", "Mass", "Mean"]);
    assert_eq!(column(&msr, "Mean"), vec![1.0, 1.0, 1.0]);
}

#[test]
fn requested_features_keep_request_order() {
    let label = three_objects();
    let grey = ones_like(&label);
    let mut tool = MeasurementTool::new();
    let msr = tool
        .measure(&label, Some(&grey), &["Mass", "Size", "Center"], &[])
        .unwrap();
    let names: Vec<_> = msr.features().iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["Mass", "Size", "Center"]);
}

#[test]
fn unknown_object_id_keeps_a_zero_row() {
    #[rustfmt::skip]
    let label = LabelImage::new(vec![3, 1], vec![1, 2, 2]);
    let mut tool = MeasurementTool::new();
    let msr = tool.measure(&label, None, &["Size"], &[1, 2, 99]).unwrap();

    assert_eq!(msr.objects(), &[1, 2, 99]);
    assert_eq!(column(&msr, "Size"), vec![1.0, 2.0, 0.0]);
}

#[test]
fn explicit_object_ids_keep_given_order() {
    let label = three_objects();
    let mut tool = MeasurementTool::new();
    let msr = tool.measure(&label, None, &["Size"], &[3, 1]).unwrap();
    assert_eq!(msr.objects(), &[3, 1]);
    assert_eq!(column(&msr, "Size"), vec![6.0, 4.0]);
}

#[test]
fn unknown_feature_is_rejected() {
    let label = three_objects();
    let mut tool = MeasurementTool::new();
    assert!(matches!(
        tool.measure(&label, None, &["Sparkle"], &[]),
        Err(MeasureError::UnknownFeature(_))
    ));
}

#[test]
fn geometry_mismatch_is_rejected() {
    let label = three_objects();
    let grey = GreyImage::new(vec![4, 5], vec![0.0; 20]);
    let mut tool = MeasurementTool::new();
    assert!(matches!(
        tool.measure(&label, Some(&grey), &["Mass"], &[]),
        Err(MeasureError::GeometryMismatch { .. })
    ));
}

#[test]
fn mismatched_grey_is_ignored_when_unused() {
    let label = three_objects();
    let grey = GreyImage::new(vec![4, 5], vec![0.0; 20]);
    let mut tool = MeasurementTool::new();
    let msr = tool.measure(&label, Some(&grey), &["Size"], &[]).unwrap();
    assert_eq!(column(&msr, "Size"), vec![4.0, 1.0, 6.0]);
}

#[test]
fn empty_label_image_yields_empty_table_error() {
    let label = LabelImage::new(vec![2, 2], vec![0; 4]);
    let mut tool = MeasurementTool::new();
    assert!(matches!(
        tool.measure(&label, None, &["Size"], &[]),
        Err(MeasureError::EmptyTable)
    ));
}

#[test]
fn centroids_and_bounds() {
    let label = three_objects();
    let mut tool = MeasurementTool::new();
    let msr = tool
        .measure(&label, None, &["Center", "Minimum", "Maximum"], &[])
        .unwrap();

    assert_slice_approx_eq(msr.cell(1, "Center").unwrap(), &[0.5, 0.5], 1e-12, "Center 1");
    assert_slice_approx_eq(msr.cell(2, "Center").unwrap(), &[3.0, 1.0], 1e-12, "Center 2");
    assert_eq!(msr.cell(3, "Minimum").unwrap(), &[1.0, 2.0]);
    assert_eq!(msr.cell(3, "Maximum").unwrap(), &[3.0, 3.0]);
}

#[test]
fn gravity_weights_the_centroid() {
    let label = LabelImage::new(vec![3, 1], vec![1, 1, 1]);
    let grey = GreyImage::new(vec![3, 1], vec![1.0, 0.0, 3.0]);
    let mut tool = MeasurementTool::new();
    let msr = tool.measure(&label, Some(&grey), &["Gravity"], &[]).unwrap();
    assert_slice_approx_eq(msr.cell(1, "Gravity").unwrap(), &[1.5, 0.0], 1e-12, "Gravity");
}

#[test]
fn median_intensity() {
    let label = LabelImage::new(vec![5, 1], vec![1, 1, 1, 2, 2]);
    let grey = GreyImage::new(vec![5, 1], vec![5.0, 1.0, 3.0, 2.0, 4.0]);
    let mut tool = MeasurementTool::new();
    let msr = tool.measure(&label, Some(&grey), &["Median"], &[]).unwrap();
    assert_eq!(column(&msr, "Median"), vec![3.0, 3.0]);
}

#[test]
fn boundary_features_on_a_square() {
    #[rustfmt::skip]
    let data = vec![
        0, 0, 0, 0,
        0, 1, 1, 0,
        0, 1, 1, 0,
        0, 0, 0, 0,
    ];
    let label = LabelImage::new(vec![4, 4], data);
    let mut tool = MeasurementTool::new();
    let msr = tool
        .measure(
            &label,
            None,
            &["Perimeter", "ConvexArea", "ConvexPerimeter", "Convexity", "P2A"],
            &[],
        )
        .unwrap();

    assert_eq!(msr.cell(1, "Perimeter").unwrap(), &[4.0]);
    assert_eq!(msr.cell(1, "ConvexArea").unwrap(), &[4.0]);
    assert_eq!(msr.cell(1, "ConvexPerimeter").unwrap(), &[8.0]);
    assert_eq!(msr.cell(1, "Convexity").unwrap(), &[1.0]);
    // 4^2 / (4 pi 4)
    assert_slice_approx_eq(
        msr.cell(1, "P2A").unwrap(),
        &[1.0 / std::f64::consts::PI],
        1e-12,
        "P2A",
    );
}

#[test]
fn connectivity_changes_the_boundary() {
    // A diagonal pair is one 8-connected boundary but splits under
    // connectivity 1.
    #[rustfmt::skip]
    let data = vec![
        1, 0, 0,
        0, 1, 0,
        0, 0, 0,
    ];
    let label = LabelImage::new(vec![3, 3], data);
    let mut tool = MeasurementTool::new();

    let eight = tool.measure(&label, None, &["Perimeter"], &[]).unwrap();
    let options = MeasureOptions::builder().connectivity(1usize).build().unwrap();
    let four = tool
        .measure_with(&label, None, &["Perimeter"], &[], &options)
        .unwrap();

    assert!(eight.cell(1, "Perimeter").unwrap()[0] > 0.0);
    assert_eq!(four.cell(1, "Perimeter").unwrap(), &[0.0]);
}

#[test]
fn chain_code_features_require_2d() {
    let label = LabelImage::new(vec![4], vec![1, 1, 0, 0]);
    let mut tool = MeasurementTool::new();
    assert!(matches!(
        tool.measure(&label, None, &["Perimeter"], &[]),
        Err(MeasureError::InvalidInput(_))
    ));
}

#[test]
fn three_dimensional_line_features() {
    // 2x2x2 cube: object 1 fills the low-z slice.
    #[rustfmt::skip]
    let data = vec![
        1, 1, 1, 1, // z = 0
        0, 0, 0, 2, // z = 1
    ];
    let label = LabelImage::new(vec![2, 2, 2], data);
    let mut tool = MeasurementTool::new();
    let msr = tool.measure(&label, None, &["Size", "Center"], &[]).unwrap();
    assert_eq!(column(&msr, "Size"), vec![4.0, 1.0]);
    assert_slice_approx_eq(
        msr.cell(1, "Center").unwrap(),
        &[0.5, 0.5, 0.0],
        1e-12,
        "Center of the slice",
    );
    assert_eq!(msr.cell(2, "Center").unwrap(), &[1.0, 1.0, 1.0]);
}

#[test]
fn pixel_sizes_come_from_the_label_image() {
    let label = three_objects().with_pixel_size(vec![0.5, 0.5]);
    let mut tool = MeasurementTool::new();
    let msr = tool.measure(&label, None, &["Size", "Center"], &[]).unwrap();
    // 4 pixels at 0.25 area each.
    assert_eq!(msr.cell(1, "Size").unwrap(), &[1.0]);
    assert_slice_approx_eq(msr.cell(1, "Center").unwrap(), &[0.25, 0.25], 1e-12, "Center");
}

#[test]
fn mean_accounts_for_the_pixel_volume() {
    let label = LabelImage::new(vec![2, 1], vec![1, 1]).with_pixel_size(vec![0.5, 0.5]);
    let grey = GreyImage::new(vec![2, 1], vec![3.0, 5.0]);
    let mut tool = MeasurementTool::new();
    let msr = tool.measure(&label, Some(&grey), &["Mean"], &[]).unwrap();
    assert_eq!(msr.cell(1, "Mean").unwrap(), &[4.0]);
}

#[test]
fn painting_size_back_into_an_image() {
    let label = three_objects();
    let mut tool = MeasurementTool::new();
    let msr = tool.measure(&label, None, &["Size"], &[]).unwrap();
    let painted = object_to_measurement(&label, &msr.feature("Size").unwrap());

    assert_eq!(painted.sizes(), label.sizes());
    assert_eq!(painted.channels(), 1);
    assert_eq!(painted.pixel(0), &[4.0]); // object 1
    assert_eq!(painted.pixel(7), &[1.0]); // object 2
    assert_eq!(painted.pixel(9), &[6.0]); // object 3
    assert_eq!(painted.pixel(2), &[0.0]); // background
}

#[test]
fn cancellation_aborts_the_measurement() {
    let label = three_objects();
    let token = CancelToken::new();
    token.cancel();
    let options = MeasureOptions::builder().cancel(token).build().unwrap();
    let mut tool = MeasurementTool::new();
    assert!(matches!(
        tool.measure_with(&label, None, &["Size"], &[], &options),
        Err(MeasureError::Cancelled)
    ));
}

#[test]
fn repeated_measurements_reuse_the_tool() {
    let label = three_objects();
    let mut tool = MeasurementTool::new();
    let first = tool.measure(&label, None, &["Size"], &[]).unwrap();
    let second = tool.measure(&label, None, &["Size"], &[]).unwrap();
    assert_eq!(first.data(), second.data());
}

#[test]
fn default_tool_lists_its_features() {
    let tool = MeasurementTool::new();
    let names: Vec<_> = tool.features().into_iter().map(|d| d.name).collect();
    for expected in [
        "Size",
        "Minimum",
        "Maximum",
        "Center",
        "Mass",
        "Gravity",
        "Median",
        "Perimeter",
        "ConvexArea",
        "ConvexPerimeter",
        "Mean",
        "P2A",
        "Convexity",
    ] {
        assert!(names.contains(&expected.to_string()), "missing {expected}");
    }
}
