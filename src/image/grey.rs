//! Grey-value (intensity) raster images.

use super::compute_strides;

/// An n-dimensional real-valued image, optionally with multiple tensor
/// channels per pixel.
///
/// Channels are interleaved: the values for one pixel are contiguous. Most
/// measurement features require a scalar image (`channels == 1`); the
/// painter produces multi-channel images, one channel per feature value.
#[derive(Debug, Clone, PartialEq)]
pub struct GreyImage {
    sizes: Vec<usize>,
    strides: Vec<usize>,
    channels: usize,
    data: Vec<f64>,
}

impl GreyImage {
    /// Create a scalar grey-value image from flat data.
    ///
    /// # Panics
    ///
    /// Panics if `sizes` is empty or `data.len()` does not equal the product
    /// of `sizes`.
    pub fn new(sizes: Vec<usize>, data: Vec<f64>) -> Self {
        Self::with_channels(sizes, 1, data)
    }

    /// Create an image with `channels` interleaved values per pixel.
    ///
    /// # Panics
    ///
    /// Panics if `sizes` is empty, `channels` is zero, or `data.len()` does
    /// not equal `channels` times the product of `sizes`.
    pub fn with_channels(sizes: Vec<usize>, channels: usize, data: Vec<f64>) -> Self {
        assert!(!sizes.is_empty(), "An image needs at least one dimension");
        assert!(channels > 0, "An image needs at least one channel");
        let n: usize = sizes.iter().product();
        assert_eq!(
            data.len(),
            n * channels,
            "Data length {} does not match sizes {:?} with {} channel(s)",
            data.len(),
            sizes,
            channels
        );
        let strides = compute_strides(&sizes);
        Self {
            sizes,
            strides,
            channels,
            data,
        }
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

    /// Stride per dimension, in pixels.
    #[inline]
    pub fn strides(&self) -> &[usize] {
        &self.strides
    }

    /// Number of tensor channels per pixel.
    #[inline]
    pub fn channels(&self) -> usize {
        self.channels
    }

    /// True if the image has a single channel.
    #[inline]
    pub fn is_scalar(&self) -> bool {
        self.channels == 1
    }

    /// Total number of pixels (independent of the channel count).
    #[inline]
    pub fn num_pixels(&self) -> usize {
        self.data.len() / self.channels
    }

    /// The flat value buffer: channels interleaved, dimension 0 fastest.
    #[inline]
    pub fn data(&self) -> &[f64] {
        &self.data
    }

    /// The channel values of one pixel by flat pixel offset.
    #[inline]
    pub fn pixel(&self, offset: usize) -> &[f64] {
        let start = offset * self.channels;
        &self.data[start..start + self.channels]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar() {
        let img = GreyImage::new(vec![2, 2], vec![1.0, 2.0, 3.0, 4.0]);
        assert!(img.is_scalar());
        assert_eq!(img.num_pixels(), 4);
        assert_eq!(img.pixel(2), &[3.0]);
    }

    #[test]
    fn tensor() {
        let img = GreyImage::with_channels(vec![2, 1], 3, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        assert!(!img.is_scalar());
        assert_eq!(img.num_pixels(), 2);
        assert_eq!(img.pixel(1), &[4.0, 5.0, 6.0]);
    }

    #[test]
    #[should_panic(expected = "does not match sizes")]
    fn wrong_size_panics() {
        GreyImage::new(vec![3], vec![1.0, 2.0]);
    }
}
