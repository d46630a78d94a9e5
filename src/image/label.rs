//! Labeled raster images.

use std::collections::BTreeSet;

use super::compute_strides;

/// An n-dimensional label image: every pixel carries a `u32` object id,
/// with 0 denoting background.
///
/// Data is stored contiguously with dimension 0 fastest, so a line along
/// dimension 0 is a contiguous slice. Pixel sizes default to 1.0 per
/// dimension and scale length-valued measurements.
///
/// # Example
///
/// ```
/// use measure_rs::image::LabelImage;
///
/// // 3x2 image, one object with id 5 in the top row
/// let label = LabelImage::new(vec![3, 2], vec![5, 5, 0, 0, 0, 0]);
/// assert_eq!(label.dimensionality(), 2);
/// assert_eq!(label.collect_object_ids(), vec![5]);
/// ```
#[derive(Debug, Clone)]
pub struct LabelImage {
    sizes: Vec<usize>,
    strides: Vec<usize>,
    pixel_size: Vec<f64>,
    data: Vec<u32>,
}

impl LabelImage {
    /// Create a label image from flat data.
    ///
    /// # Panics
    ///
    /// Panics if `sizes` is empty or `data.len()` does not equal the product
    /// of `sizes`.
    pub fn new(sizes: Vec<usize>, data: Vec<u32>) -> Self {
        assert!(!sizes.is_empty(), "An image needs at least one dimension");
        let n: usize = sizes.iter().product();
        assert_eq!(
            data.len(),
            n,
            "Data length {} does not match sizes {:?}",
            data.len(),
            sizes
        );
        let strides = compute_strides(&sizes);
        let pixel_size = vec![1.0; sizes.len()];
        Self {
            sizes,
            strides,
            pixel_size,
            data,
        }
    }

    /// Set the physical pixel size per dimension.
    ///
    /// # Panics
    ///
    /// Panics if the length does not match the dimensionality or any entry
    /// is not a positive finite number.
    pub fn with_pixel_size(mut self, pixel_size: Vec<f64>) -> Self {
        assert_eq!(
            pixel_size.len(),
            self.sizes.len(),
            "Pixel size length {} does not match dimensionality {}",
            pixel_size.len(),
            self.sizes.len()
        );
        assert!(
            pixel_size.iter().all(|&s| s.is_finite() && s > 0.0),
            "Pixel sizes must be positive: {pixel_size:?}"
        );
        self.pixel_size = pixel_size;
        self
    }

    /// Number of dimensions.
    #[inline]
    pub fn dimensionality(&self) -> usize {
        self.sizes.len()
    }

    /// Size per dimension.
    #[inline]
    pub fn sizes(&self) -> &[usize] {
        &self.sizes
    }

    /// Stride per dimension; `strides()[0] == 1`.
    #[inline]
    pub fn strides(&self) -> &[usize] {
        &self.strides
    }

    /// Total number of pixels.
    #[inline]
    pub fn num_pixels(&self) -> usize {
        self.data.len()
    }

    /// Physical size per dimension.
    #[inline]
    pub fn pixel_size(&self) -> &[f64] {
        &self.pixel_size
    }

    /// Product of the per-dimension pixel sizes.
    pub fn pixel_volume(&self) -> f64 {
        self.pixel_size.iter().product()
    }

    /// True if all dimensions share the same pixel size.
    pub fn is_isotropic(&self) -> bool {
        self.pixel_size
            .iter()
            .all(|&s| (s - self.pixel_size[0]).abs() < 1e-12 * self.pixel_size[0].abs())
    }

    /// The flat pixel buffer, dimension 0 fastest.
    #[inline]
    pub fn data(&self) -> &[u32] {
        &self.data
    }

    /// Flat offset of a coordinate vector.
    ///
    /// # Panics
    ///
    /// Panics if `coords` has the wrong length or is out of bounds.
    pub fn offset(&self, coords: &[usize]) -> usize {
        assert_eq!(coords.len(), self.sizes.len(), "Coordinate rank mismatch");
        coords
            .iter()
            .zip(&self.sizes)
            .zip(&self.strides)
            .map(|((&c, &s), &stride)| {
                assert!(c < s, "Coordinate {c} out of bounds for size {s}");
                c * stride
            })
            .sum()
    }

    /// Label at a coordinate vector.
    pub fn get(&self, coords: &[usize]) -> u32 {
        self.data[self.offset(coords)]
    }

    /// Sorted list of the distinct positive object ids present.
    pub fn collect_object_ids(&self) -> Vec<u32> {
        let ids: BTreeSet<u32> = self.data.iter().copied().filter(|&id| id > 0).collect();
        ids.into_iter().collect()
    }
}
