//! Bounding-box corner features: Minimum and Maximum.

use crate::error::Result;
use crate::features::{
    axis_name, Feature, FeatureDescription, FeatureKind, LineBasedFeature, ObjectRowMap,
};
use crate::image::{GreyImage, LabelImage};
use crate::units::{Units, ValueDesc};

fn coordinate_values(nd: usize) -> Vec<ValueDesc> {
    (0..nd)
        .map(|d| ValueDesc::new(axis_name(d), Units::PIXEL))
        .collect()
}

/// Per-dimension minimum coordinate of each object, pixel-size scaled.
#[derive(Debug, Default)]
pub struct Minimum {
    nd: usize,
    pixel_size: Vec<f64>,
    bounds: Vec<f64>,
}

impl Minimum {
    /// Create the feature.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Feature for Minimum {
    fn description(&self) -> FeatureDescription {
        FeatureDescription::new(
            "Minimum",
            "Minimum coordinates of the object's bounding box",
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
        self.nd = label.dimensionality();
        self.pixel_size = label.pixel_size().to_vec();
        self.bounds.clear();
        self.bounds.resize(n_objects * self.nd, f64::INFINITY);
        Ok(coordinate_values(self.nd))
    }

    fn cleanup(&mut self) {
        self.bounds = Vec::new();
    }
}

impl LineBasedFeature for Minimum {
    fn scan_line(
        &mut self,
        labels: &[u32],
        _grey: Option<&[f64]>,
        coords: &[usize],
        axis: usize,
        rows: &ObjectRowMap,
    ) {
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
            let Some(r) = row else { continue };
            let base = r * self.nd;
            for d in 0..self.nd {
                let c = if d == axis { coords[d] + j } else { coords[d] } as f64;
                if c < self.bounds[base + d] {
                    self.bounds[base + d] = c;
                }
            }
        }
    }

    fn finish(&mut self, row: usize, out: &mut [f64]) {
        let base = row * self.nd;
        for d in 0..self.nd {
            let c = self.bounds[base + d];
            out[d] = if c.is_finite() {
                c * self.pixel_size[d]
            } else {
                0.0
            };
        }
    }
}

/// Per-dimension maximum coordinate of each object, pixel-size scaled.
#[derive(Debug, Default)]
pub struct Maximum {
    nd: usize,
    pixel_size: Vec<f64>,
    bounds: Vec<f64>,
}

impl Maximum {
    /// Create the feature.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Feature for Maximum {
    fn description(&self) -> FeatureDescription {
        FeatureDescription::new(
            "Maximum",
            "Maximum coordinates of the object's bounding box",
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
        self.nd = label.dimensionality();
        self.pixel_size = label.pixel_size().to_vec();
        self.bounds.clear();
        self.bounds.resize(n_objects * self.nd, f64::NEG_INFINITY);
        Ok(coordinate_values(self.nd))
    }

    fn cleanup(&mut self) {
        self.bounds = Vec::new();
    }
}

impl LineBasedFeature for Maximum {
    fn scan_line(
        &mut self,
        labels: &[u32],
        _grey: Option<&[f64]>,
        coords: &[usize],
        axis: usize,
        rows: &ObjectRowMap,
    ) {
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
            let Some(r) = row else { continue };
            let base = r * self.nd;
            for d in 0..self.nd {
                let c = if d == axis { coords[d] + j } else { coords[d] } as f64;
                if c > self.bounds[base + d] {
                    self.bounds[base + d] = c;
                }
            }
        }
    }

    fn finish(&mut self, row: usize, out: &mut [f64]) {
        let base = row * self.nd;
        for d in 0..self.nd {
            let c = self.bounds[base + d];
            out[d] = if c.is_finite() {
                c * self.pixel_size[d]
            } else {
                0.0
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::walk_lines;

    fn run<F: LineBasedFeature>(feature: &mut F, label: &LabelImage, rows: &ObjectRowMap) {
        let line = label.sizes()[0];
        walk_lines::<()>(label.sizes(), |coords, offset| {
            feature.scan_line(&label.data()[offset..offset + line], None, coords, 0, rows);
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn bounding_box_corners() {
        #[rustfmt::skip]
        let data = vec![
            0, 0, 0, 0,
            0, 1, 1, 0,
            0, 0, 1, 0,
        ];
        let label = LabelImage::new(vec![4, 3], data);
        let rows: ObjectRowMap = [(1, 0)].into_iter().collect();

        let mut minimum = Minimum::new();
        minimum.initialize(&label, None, 1).unwrap();
        run(&mut minimum, &label, &rows);
        let mut out = [0.0; 2];
        minimum.finish(0, &mut out);
        assert_eq!(out, [1.0, 1.0]);

        let mut maximum = Maximum::new();
        maximum.initialize(&label, None, 1).unwrap();
        run(&mut maximum, &label, &rows);
        maximum.finish(0, &mut out);
        assert_eq!(out, [2.0, 2.0]);
    }

    #[test]
    fn absent_object_is_zero() {
        let label = LabelImage::new(vec![2, 1], vec![0, 0]);
        let rows: ObjectRowMap = [(1, 0)].into_iter().collect();
        let mut minimum = Minimum::new();
        minimum.initialize(&label, None, 1).unwrap();
        run(&mut minimum, &label, &rows);
        let mut out = [0.0; 2];
        minimum.finish(0, &mut out);
        assert_eq!(out, [0.0, 0.0]);
    }

    #[test]
    fn value_names_follow_axes() {
        let label = LabelImage::new(vec![1, 1, 1], vec![0]);
        let mut minimum = Minimum::new();
        let values = minimum.initialize(&label, None, 0).unwrap();
        let names: Vec<_> = values.iter().map(|v| v.name.as_str()).collect();
        assert_eq!(names, vec!["x", "y", "z"]);
    }
}
