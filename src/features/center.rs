//! Centroid features: geometric Center and grey-weighted Gravity.

use crate::error::Result;
use crate::features::{
    axis_name, require_scalar_grey, Feature, FeatureDescription, FeatureKind, LineBasedFeature,
    ObjectRowMap,
};
use crate::image::{GreyImage, LabelImage};
use crate::units::{Units, ValueDesc};

fn coordinate_values(nd: usize) -> Vec<ValueDesc> {
    (0..nd)
        .map(|d| ValueDesc::new(axis_name(d), Units::PIXEL))
        .collect()
}

/// Per-object accumulator of weighted coordinate sums: `nd` coordinate
/// sums followed by the weight sum, per object row.
#[derive(Debug, Default)]
struct Moments {
    nd: usize,
    sums: Vec<f64>,
}

impl Moments {
    fn reset(&mut self, nd: usize, n_objects: usize) {
        self.nd = nd;
        self.sums.clear();
        self.sums.resize(n_objects * (nd + 1), 0.0);
    }

    fn accumulate(&mut self, row: usize, coords: &[usize], axis: usize, j: usize, weight: f64) {
        let base = row * (self.nd + 1);
        for d in 0..self.nd {
            let c = if d == axis { coords[d] + j } else { coords[d] } as f64;
            self.sums[base + d] += c * weight;
        }
        self.sums[base + self.nd] += weight;
    }

    fn centroid(&self, row: usize, pixel_size: &[f64], out: &mut [f64]) {
        let base = row * (self.nd + 1);
        let total = self.sums[base + self.nd];
        for d in 0..self.nd {
            out[d] = if total > 0.0 {
                self.sums[base + d] / total * pixel_size[d]
            } else {
                0.0
            };
        }
    }

    fn release(&mut self) {
        self.sums = Vec::new();
    }
}

/// Geometric centroid of each object, pixel-size scaled.
#[derive(Debug, Default)]
pub struct Center {
    pixel_size: Vec<f64>,
    moments: Moments,
}

impl Center {
    /// Create the feature.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Feature for Center {
    fn description(&self) -> FeatureDescription {
        FeatureDescription::new(
            "Center",
            "Geometric centroid of the object",
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
        self.pixel_size = label.pixel_size().to_vec();
        self.moments.reset(label.dimensionality(), n_objects);
        Ok(coordinate_values(label.dimensionality()))
    }

    fn cleanup(&mut self) {
        self.moments.release();
    }
}

impl LineBasedFeature for Center {
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
            if let Some(r) = row {
                self.moments.accumulate(r, coords, axis, j, 1.0);
            }
        }
    }

    fn finish(&mut self, row: usize, out: &mut [f64]) {
        self.moments.centroid(row, &self.pixel_size, out);
    }
}

/// Grey-weighted centroid (center of mass) of each object, pixel-size
/// scaled. Needs a scalar grey-value image.
#[derive(Debug, Default)]
pub struct Gravity {
    pixel_size: Vec<f64>,
    moments: Moments,
}

impl Gravity {
    /// Create the feature.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Feature for Gravity {
    fn description(&self) -> FeatureDescription {
        FeatureDescription::new(
            "Gravity",
            "Centroid of the object weighted by its intensity",
            true,
            FeatureKind::LineBased,
        )
    }

    fn initialize(
        &mut self,
        label: &LabelImage,
        grey: Option<&GreyImage>,
        n_objects: usize,
    ) -> Result<Vec<ValueDesc>> {
        require_scalar_grey("Gravity", grey)?;
        self.pixel_size = label.pixel_size().to_vec();
        self.moments.reset(label.dimensionality(), n_objects);
        Ok(coordinate_values(label.dimensionality()))
    }

    fn cleanup(&mut self) {
        self.moments.release();
    }
}

impl LineBasedFeature for Gravity {
    fn scan_line(
        &mut self,
        labels: &[u32],
        grey: Option<&[f64]>,
        coords: &[usize],
        axis: usize,
        rows: &ObjectRowMap,
    ) {
        let Some(grey) = grey else { return };
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
                self.moments.accumulate(r, coords, axis, j, grey[j]);
            }
        }
    }

    fn finish(&mut self, row: usize, out: &mut [f64]) {
        self.moments.centroid(row, &self.pixel_size, out);
    }
}
