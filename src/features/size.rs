//! The Size feature: object area or volume.

use crate::error::Result;
use crate::features::{
    Feature, FeatureDescription, FeatureKind, LineBasedFeature, ObjectRowMap,
};
use crate::image::{GreyImage, LabelImage};
use crate::units::{Units, ValueDesc};

/// Number of object pixels scaled by the pixel volume.
#[derive(Debug, Default)]
pub struct Size {
    counts: Vec<f64>,
    pixel_volume: f64,
}

impl Size {
    /// Create the feature.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Feature for Size {
    fn description(&self) -> FeatureDescription {
        FeatureDescription::new(
            "Size",
            "Number of object pixels, scaled by the pixel size",
            false,
            FeatureKind::LineBased,
        )
    }

    fn initialize(
        &mut self,
        label: &LabelImage,
        _grey: Option<&GreyImage>,
        n_objects: usize,
    ) -> Result<Vec<ValueDesc>> {
        self.pixel_volume = label.pixel_volume();
        self.counts.clear();
        self.counts.resize(n_objects, 0.0);
        Ok(vec![ValueDesc::new(
            "Size",
            Units::PIXEL.powi(label.dimensionality() as i32),
        )])
    }

    fn cleanup(&mut self) {
        self.counts = Vec::new();
    }
}

impl LineBasedFeature for Size {
    fn scan_line(
        &mut self,
        labels: &[u32],
        _grey: Option<&[f64]>,
        _coords: &[usize],
        _axis: usize,
        rows: &ObjectRowMap,
    ) {
        // The row lookup is refreshed only when the label changes.
        let mut current = 0u32;
        let mut row: Option<usize> = None;
        for &id in labels {
            if id == 0 {
                continue;
            }
            if id != current {
                current = id;
                row = rows.get(&id).copied();
            }
            if let Some(r) = row {
                self.counts[r] += 1.0;
            }
        }
    }

    fn finish(&mut self, row: usize, out: &mut [f64]) {
        out[0] = self.counts[row] * self.pixel_volume;
    }
}
