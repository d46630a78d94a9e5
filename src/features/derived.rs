//! Composite features derived from other features.

use std::f64::consts::PI;

use crate::error::Result;
use crate::features::{CompositeFeature, Feature, FeatureDescription, FeatureKind};
use crate::image::{GreyImage, LabelImage};
use crate::table::ObjectView;
use crate::units::{Units, ValueDesc};

/// Mean object intensity, derived from Size and Mass.
///
/// Size carries the pixel volume, so the pixel count is recovered as
/// `Size / pixel volume` before dividing.
#[derive(Debug)]
pub struct Mean {
    pixel_volume: f64,
}

impl Mean {
    /// Create the feature.
    pub fn new() -> Self {
        Self { pixel_volume: 1.0 }
    }
}

impl Default for Mean {
    fn default() -> Self {
        Self::new()
    }
}

impl Feature for Mean {
    fn description(&self) -> FeatureDescription {
        FeatureDescription::new(
            "Mean",
            "Mean intensity of the object",
            true,
            FeatureKind::Composite,
        )
    }

    fn initialize(
        &mut self,
        label: &LabelImage,
        _grey: Option<&GreyImage>,
        _n_objects: usize,
    ) -> Result<Vec<ValueDesc>> {
        self.pixel_volume = label.pixel_volume();
        Ok(vec![ValueDesc::new("Mean", Units::INTENSITY)])
    }
}

impl CompositeFeature for Mean {
    fn dependencies(&self) -> Vec<String> {
        vec!["Size".to_string(), "Mass".to_string()]
    }

    fn measure(&mut self, dependencies: &ObjectView<'_>, out: &mut [f64]) {
        let (Some(size), Some(mass)) = (dependencies.get("Size"), dependencies.get("Mass"))
        else {
            return;
        };
        let count = size[0] / self.pixel_volume;
        out[0] = if count > 0.0 { mass[0] / count } else { 0.0 };
    }
}

/// Shape factor `Perimeter^2 / (4 pi Size)`, 1.0 for a disk.
#[derive(Debug, Default)]
pub struct P2A;

impl P2A {
    /// Create the feature.
    pub fn new() -> Self {
        Self
    }
}

impl Feature for P2A {
    fn description(&self) -> FeatureDescription {
        FeatureDescription::new(
            "P2A",
            "Perimeter squared over 4 pi times the area",
            false,
            FeatureKind::Composite,
        )
    }

    fn initialize(
        &mut self,
        _label: &LabelImage,
        _grey: Option<&GreyImage>,
        _n_objects: usize,
    ) -> Result<Vec<ValueDesc>> {
        Ok(vec![ValueDesc::dimensionless("P2A")])
    }
}

impl CompositeFeature for P2A {
    fn dependencies(&self) -> Vec<String> {
        vec!["Perimeter".to_string(), "Size".to_string()]
    }

    fn measure(&mut self, dependencies: &ObjectView<'_>, out: &mut [f64]) {
        let (Some(perimeter), Some(size)) =
            (dependencies.get("Perimeter"), dependencies.get("Size"))
        else {
            return;
        };
        out[0] = if size[0] > 0.0 {
            perimeter[0] * perimeter[0] / (4.0 * PI * size[0])
        } else {
            0.0
        };
    }
}

/// Ratio of the object area to its convex hull area, 1.0 for convex
/// objects.
#[derive(Debug, Default)]
pub struct Convexity;

impl Convexity {
    /// Create the feature.
    pub fn new() -> Self {
        Self
    }
}

impl Feature for Convexity {
    fn description(&self) -> FeatureDescription {
        FeatureDescription::new(
            "Convexity",
            "Object area over convex hull area",
            false,
            FeatureKind::Composite,
        )
    }

    fn initialize(
        &mut self,
        _label: &LabelImage,
        _grey: Option<&GreyImage>,
        _n_objects: usize,
    ) -> Result<Vec<ValueDesc>> {
        Ok(vec![ValueDesc::dimensionless("Convexity")])
    }
}

impl CompositeFeature for Convexity {
    fn dependencies(&self) -> Vec<String> {
        vec!["Size".to_string(), "ConvexArea".to_string()]
    }

    fn measure(&mut self, dependencies: &ObjectView<'_>, out: &mut [f64]) {
        let (Some(size), Some(hull)) = (dependencies.get("Size"), dependencies.get("ConvexArea"))
        else {
            return;
        };
        out[0] = if hull[0] > 0.0 { size[0] / hull[0] } else { 0.0 };
    }
}
