//! Convex-hull features: ConvexArea and ConvexPerimeter.

use crate::error::Result;
use crate::features::{require_2d, ConvexHullFeature, Feature, FeatureDescription, FeatureKind};
use crate::geometry::ConvexHull;
use crate::image::{GreyImage, LabelImage};
use crate::units::{Units, ValueDesc};

/// Area of the object's convex hull. Requires a 2-D image; with
/// anisotropic pixels the value is reported in raw pixel units.
#[derive(Debug, Default)]
pub struct ConvexArea {
    scale: f64,
}

impl ConvexArea {
    /// Create the feature.
    pub fn new() -> Self {
        Self { scale: 1.0 }
    }
}

impl Feature for ConvexArea {
    fn description(&self) -> FeatureDescription {
        FeatureDescription::new(
            "ConvexArea",
            "Area of the object's convex hull",
            false,
            FeatureKind::ConvexHullBased,
        )
    }

    fn initialize(
        &mut self,
        label: &LabelImage,
        _grey: Option<&GreyImage>,
        _n_objects: usize,
    ) -> Result<Vec<ValueDesc>> {
        require_2d("ConvexArea", label)?;
        self.scale = if label.is_isotropic() {
            label.pixel_size()[0] * label.pixel_size()[0]
        } else {
            1.0
        };
        Ok(vec![ValueDesc::new("ConvexArea", Units::PIXEL.powi(2))])
    }
}

impl ConvexHullFeature for ConvexArea {
    fn measure(&mut self, hull: &ConvexHull, out: &mut [f64]) {
        out[0] = hull.area() * self.scale;
    }
}

/// Perimeter of the object's convex hull. Requires a 2-D image; with
/// anisotropic pixels the value is reported in raw pixel units.
#[derive(Debug, Default)]
pub struct ConvexPerimeter {
    scale: f64,
}

impl ConvexPerimeter {
    /// Create the feature.
    pub fn new() -> Self {
        Self { scale: 1.0 }
    }
}

impl Feature for ConvexPerimeter {
    fn description(&self) -> FeatureDescription {
        FeatureDescription::new(
            "ConvexPerimeter",
            "Perimeter of the object's convex hull",
            false,
            FeatureKind::ConvexHullBased,
        )
    }

    fn initialize(
        &mut self,
        label: &LabelImage,
        _grey: Option<&GreyImage>,
        _n_objects: usize,
    ) -> Result<Vec<ValueDesc>> {
        require_2d("ConvexPerimeter", label)?;
        self.scale = if label.is_isotropic() {
            label.pixel_size()[0]
        } else {
            1.0
        };
        Ok(vec![ValueDesc::new("ConvexPerimeter", Units::PIXEL)])
    }
}

impl ConvexHullFeature for ConvexPerimeter {
    fn measure(&mut self, hull: &ConvexHull, out: &mut [f64]) {
        out[0] = hull.perimeter() * self.scale;
    }
}
