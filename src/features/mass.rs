//! The Mass feature: summed object intensity.

use crate::error::Result;
use crate::features::{
    require_scalar_grey, Feature, FeatureDescription, FeatureKind, LineBasedFeature, ObjectRowMap,
};
use crate::image::{GreyImage, LabelImage};
use crate::units::{Units, ValueDesc};

/// Sum of the grey values inside each object. Needs a scalar grey-value
/// image.
#[derive(Debug, Default)]
pub struct Mass {
    sums: Vec<f64>,
}

impl Mass {
    /// Create the feature.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Feature for Mass {
    fn description(&self) -> FeatureDescription {
        FeatureDescription::new(
            "Mass",
            "Mass of the object (sum of its intensity)",
            true,
            FeatureKind::LineBased,
        )
    }

    fn initialize(
        &mut self,
        _label: &LabelImage,
        grey: Option<&GreyImage>,
        n_objects: usize,
    ) -> Result<Vec<ValueDesc>> {
        require_scalar_grey("Mass", grey)?;
        self.sums.clear();
        self.sums.resize(n_objects, 0.0);
        Ok(vec![ValueDesc::new("Mass", Units::INTENSITY)])
    }

    fn cleanup(&mut self) {
        self.sums = Vec::new();
    }
}

impl LineBasedFeature for Mass {
    fn scan_line(
        &mut self,
        labels: &[u32],
        grey: Option<&[f64]>,
        _coords: &[usize],
        _axis: usize,
        rows: &ObjectRowMap,
    ) {
        let Some(grey) = grey else { return };
        // The row lookup is refreshed only when the label changes.
        let mut current = 0u32;
        let mut row: Option<usize> = None;
        for (j, &id) in labels.iter().enumerate() {
            if id == 0 {
                continue;
            }
            if id != current {
                current = id;
                row = rows.get(&id).copied();
            }
            if let Some(r) = row {
                self.sums[r] += grey[j];
            }
        }
    }

    fn finish(&mut self, row: usize, out: &mut [f64]) {
        out[0] = self.sums[row];
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sums_intensity_per_object() {
        let label = LabelImage::new(vec![5, 1], vec![1, 1, 0, 2, 1]);
        let grey = GreyImage::new(vec![5, 1], vec![1.0, 2.0, 100.0, 4.0, 8.0]);
        let rows: ObjectRowMap = [(1, 0), (2, 1)].into_iter().collect();

        let mut mass = Mass::new();
        let values = mass.initialize(&label, Some(&grey), 2).unwrap();
        assert_eq!(values[0].units, Units::INTENSITY);

        mass.scan_line(label.data(), Some(grey.data()), &[0, 0], 0, &rows);

        let mut out = [0.0];
        mass.finish(0, &mut out);
        assert_eq!(out, [11.0]);
        mass.finish(1, &mut out);
        assert_eq!(out, [4.0]);
    }

    #[test]
    fn rejects_missing_or_tensor_grey() {
        let label = LabelImage::new(vec![2, 1], vec![1, 1]);
        let mut mass = Mass::new();
        assert!(mass.initialize(&label, None, 1).is_err());
        let tensor = GreyImage::with_channels(vec![2, 1], 2, vec![0.0; 4]);
        assert!(mass.initialize(&label, Some(&tensor), 1).is_err());
    }

    #[test]
    fn cleanup_releases_accumulators() {
        let label = LabelImage::new(vec![1, 1], vec![1]);
        let grey = GreyImage::new(vec![1, 1], vec![1.0]);
        let mut mass = Mass::new();
        mass.initialize(&label, Some(&grey), 1).unwrap();
        mass.cleanup();
        assert!(mass.sums.is_empty());
    }
}
