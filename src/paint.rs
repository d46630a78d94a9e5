//! Painting measurement values back into an image.

use std::collections::HashMap;

use rayon::prelude::*;

use crate::image::{GreyImage, LabelImage};
use crate::table::FeatureView;

/// Paint each object with its measured feature values.
///
/// Produces an image with the geometry of `label` and one channel per
/// feature value: every pixel carrying object id `L > 0` holds the values
/// measured for `L`. Background pixels and ids unknown to the table are
/// zero-filled.
///
/// The per-pixel work is independent, so pixels are painted in parallel.
///
/// # Example
///
/// ```
/// use measure_rs::image::LabelImage;
/// use measure_rs::paint::object_to_measurement;
/// use measure_rs::tool::MeasurementTool;
///
/// let label = LabelImage::new(vec![3, 1], vec![1, 0, 2]);
/// let mut tool = MeasurementTool::new();
/// let msr = tool.measure(&label, None, &["Size"], &[]).unwrap();
/// let painted = object_to_measurement(&label, &msr.feature("Size").unwrap());
/// assert_eq!(painted.data(), &[1.0, 0.0, 1.0]);
/// ```
pub fn object_to_measurement(label: &LabelImage, feature: &FeatureView<'_>) -> GreyImage {
    let count = feature.value_count();
    let lookup: HashMap<u32, &[f64]> = feature.iter().collect();

    let mut data = vec![0.0; label.num_pixels() * count];
    data.par_chunks_mut(count)
        .zip(label.data().par_iter())
        .for_each(|(pixel, &id)| {
            if id > 0 {
                if let Some(values) = lookup.get(&id) {
                    pixel.copy_from_slice(values);
                }
            }
        });
    GreyImage::with_channels(label.sizes().to_vec(), count, data)
}
