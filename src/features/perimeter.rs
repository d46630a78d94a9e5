//! The Perimeter feature: weighted chain-code length.

use crate::error::Result;
use crate::features::{require_2d, ChainCodeFeature, Feature, FeatureDescription, FeatureKind};
use crate::geometry::ChainCode;
use crate::image::{GreyImage, LabelImage};
use crate::units::{Units, ValueDesc};

/// Length of the object's outer boundary, from its chain code.
///
/// Axis-aligned steps count 1 and diagonal steps sqrt(2). Requires a 2-D
/// image and isotropic pixels; with anisotropic pixels the value is
/// reported in raw pixel units.
#[derive(Debug, Default)]
pub struct Perimeter {
    scale: f64,
}

impl Perimeter {
    /// Create the feature.
    pub fn new() -> Self {
        Self { scale: 1.0 }
    }
}

impl Feature for Perimeter {
    fn description(&self) -> FeatureDescription {
        FeatureDescription::new(
            "Perimeter",
            "Length of the object boundary",
            false,
            FeatureKind::ChainCodeBased,
        )
    }

    fn initialize(
        &mut self,
        label: &LabelImage,
        _grey: Option<&GreyImage>,
        _n_objects: usize,
    ) -> Result<Vec<ValueDesc>> {
        require_2d("Perimeter", label)?;
        self.scale = if label.is_isotropic() {
            label.pixel_size()[0]
        } else {
            1.0
        };
        Ok(vec![ValueDesc::new("Perimeter", Units::PIXEL)])
    }
}

impl ChainCodeFeature for Perimeter {
    fn measure(&mut self, chain_code: &ChainCode, out: &mut [f64]) {
        out[0] = chain_code.length() * self.scale;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::extract_chain_codes;

    #[test]
    fn square_perimeter() {
        #[rustfmt::skip]
        let data = vec![
            0, 0, 0, 0,
            0, 1, 1, 0,
            0, 1, 1, 0,
            0, 0, 0, 0,
        ];
        let label = LabelImage::new(vec![4, 4], data);
        let codes = extract_chain_codes(&label, 2).unwrap();
        let mut perimeter = Perimeter::new();
        perimeter.initialize(&label, None, 1).unwrap();
        let mut out = [0.0];
        perimeter.measure(&codes[&1], &mut out);
        assert_eq!(out, [4.0]);
    }

    #[test]
    fn isotropic_pixels_scale_the_length() {
        let label =
            LabelImage::new(vec![2, 2], vec![1, 1, 1, 1]).with_pixel_size(vec![0.5, 0.5]);
        let codes = extract_chain_codes(&label, 2).unwrap();
        let mut perimeter = Perimeter::new();
        perimeter.initialize(&label, None, 1).unwrap();
        let mut out = [0.0];
        perimeter.measure(&codes[&1], &mut out);
        assert_eq!(out, [2.0]);
    }

    #[test]
    fn anisotropic_pixels_fall_back_to_raw_units() {
        let label =
            LabelImage::new(vec![2, 2], vec![1, 1, 1, 1]).with_pixel_size(vec![0.5, 2.0]);
        let codes = extract_chain_codes(&label, 2).unwrap();
        let mut perimeter = Perimeter::new();
        perimeter.initialize(&label, None, 1).unwrap();
        let mut out = [0.0];
        perimeter.measure(&codes[&1], &mut out);
        assert_eq!(out, [4.0]);
    }

    #[test]
    fn requires_2d() {
        let label = LabelImage::new(vec![2], vec![1, 1]);
        let mut perimeter = Perimeter::new();
        assert!(perimeter.initialize(&label, None, 1).is_err());
    }
}
