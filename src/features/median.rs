//! The Median feature: median object intensity.

use crate::error::Result;
use crate::features::{
    require_scalar_grey, Feature, FeatureDescription, FeatureKind, ImageBasedFeature,
    ObjectRowMap,
};
use crate::image::{GreyImage, LabelImage};
use crate::table::ColumnViewMut;
use crate::units::{Units, ValueDesc};

/// Median grey value inside each object. Needs a scalar grey-value image.
///
/// Selection needs all samples of an object at once, which is why this is
/// an image-based feature: one gather pass over the whole image, then a
/// per-object select.
#[derive(Debug, Default)]
pub struct Median;

impl Median {
    /// Create the feature.
    pub fn new() -> Self {
        Self
    }
}

impl Feature for Median {
    fn description(&self) -> FeatureDescription {
        FeatureDescription::new(
            "Median",
            "Median intensity of the object",
            true,
            FeatureKind::ImageBased,
        )
    }

    fn initialize(
        &mut self,
        _label: &LabelImage,
        grey: Option<&GreyImage>,
        _n_objects: usize,
    ) -> Result<Vec<ValueDesc>> {
        require_scalar_grey("Median", grey)?;
        Ok(vec![ValueDesc::new("Median", Units::INTENSITY)])
    }
}

impl ImageBasedFeature for Median {
    fn measure(
        &mut self,
        label: &LabelImage,
        grey: Option<&GreyImage>,
        column: &mut ColumnViewMut<'_>,
    ) {
        let Some(grey) = grey else { return };
        let rows: ObjectRowMap = (0..column.num_objects())
            .map(|row| (column.object_id(row), row))
            .collect();

        let mut samples: Vec<Vec<f64>> = vec![Vec::new(); column.num_objects()];
        let mut current = 0u32;
        let mut row: Option<usize> = None;
        for (&id, &value) in label.data().iter().zip(grey.data().iter()) {
            if id == 0 {
                continue;
            }
            if id != current {
                current = id;
                row = rows.get(&id).copied();
            }
            if let Some(r) = row {
                samples[r].push(value);
            }
        }

        for (row, mut values) in samples.into_iter().enumerate() {
            if values.is_empty() {
                continue;
            }
            values.sort_by(f64::total_cmp);
            let n = values.len();
            let median = if n % 2 == 1 {
                values[n / 2]
            } else {
                (values[n / 2 - 1] + values[n / 2]) / 2.0
            };
            column.row_mut(row)[0] = median;
        }
    }
}
