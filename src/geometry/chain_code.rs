//! Chain-code extraction by Moore-neighbor boundary tracing.

use std::collections::HashMap;

use crate::error::{MeasureError, Result};
use crate::image::LabelImage;

/// Unit steps for 8-connected codes; code 0 points along +x, codes rotate
/// towards +y.
const STEPS_8: [(i64, i64); 8] = [
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
    (-1, 0),
    (-1, -1),
    (0, -1),
    (1, -1),
];

/// Unit steps for 4-connected codes.
const STEPS_4: [(i64, i64); 4] = [(1, 0), (0, 1), (-1, 0), (0, -1)];

const SQRT_2: f64 = std::f64::consts::SQRT_2;

/// The outer boundary of one object: a start pixel plus a closed sequence
/// of steps.
///
/// Codes are 8-connected (0..8) when extracted with connectivity 2 and
/// 4-connected (0..4) with connectivity 1. A single-pixel object has an
/// empty code sequence.
#[derive(Debug, Clone)]
pub struct ChainCode {
    object_id: u32,
    start: [usize; 2],
    codes: Vec<u8>,
    connectivity: usize,
}

impl ChainCode {
    /// Id of the object this boundary belongs to.
    #[inline]
    pub fn object_id(&self) -> u32 {
        self.object_id
    }

    /// Coordinates of the starting boundary pixel.
    #[inline]
    pub fn start(&self) -> [usize; 2] {
        self.start
    }

    /// The step codes, in trace order. The sequence is closed: following
    /// all steps returns to the start pixel.
    #[inline]
    pub fn codes(&self) -> &[u8] {
        &self.codes
    }

    /// Connectivity the boundary was traced with (1 or 2).
    #[inline]
    pub fn connectivity(&self) -> usize {
        self.connectivity
    }

    /// Number of steps.
    #[inline]
    pub fn len(&self) -> usize {
        self.codes.len()
    }

    /// True for single-pixel objects.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// The unit step for a code under this chain code's connectivity.
    pub fn step(&self, code: u8) -> (i64, i64) {
        if self.connectivity == 2 {
            STEPS_8[code as usize]
        } else {
            STEPS_4[code as usize]
        }
    }

    /// Boundary pixel coordinates, starting pixel first. The closing
    /// position (equal to the start) is not repeated.
    pub fn pixels(&self) -> Vec<[i64; 2]> {
        let mut pts = Vec::with_capacity(self.codes.len().max(1));
        let (mut x, mut y) = (self.start[0] as i64, self.start[1] as i64);
        pts.push([x, y]);
        for &code in self.codes.iter().take(self.codes.len().saturating_sub(1)) {
            let (dx, dy) = self.step(code);
            x += dx;
            y += dy;
            pts.push([x, y]);
        }
        pts
    }

    /// Length of the boundary polygon through the pixel centers, in pixels.
    ///
    /// Axis-aligned steps measure 1, diagonal steps sqrt(2). Single-pixel
    /// objects measure 0.
    pub fn length(&self) -> f64 {
        if self.connectivity == 1 {
            return self.codes.len() as f64;
        }
        self.codes
            .iter()
            .map(|&c| if c % 2 == 0 { 1.0 } else { SQRT_2 })
            .sum()
    }
}

/// Traces the outer boundary of every object in a 2-D label image.
///
/// `connectivity` 1 produces 4-connected codes, 2 produces 8-connected
/// codes; it should match the connectivity the label image was created
/// with. For an object id spread over several disjoint components, the
/// component whose first pixel comes earliest in raster order is traced.
pub fn extract_chain_codes(
    label: &LabelImage,
    connectivity: usize,
) -> Result<HashMap<u32, ChainCode>> {
    if label.dimensionality() != 2 {
        return Err(MeasureError::InvalidInput(format!(
            "chain codes require a 2-D image, got {} dimensions",
            label.dimensionality()
        )));
    }
    if connectivity != 1 && connectivity != 2 {
        return Err(MeasureError::InvalidInput(format!(
            "connectivity must be 1 or 2, got {connectivity}"
        )));
    }

    let mut out = HashMap::new();
    let (w, h) = (label.sizes()[0], label.sizes()[1]);
    let data = label.data();
    for y in 0..h {
        for x in 0..w {
            let id = data[y * w + x];
            if id > 0 && !out.contains_key(&id) {
                out.insert(id, trace(label, id, x, y, connectivity));
            }
        }
    }
    Ok(out)
}

/// Moore-neighbor trace starting from the object's first raster pixel,
/// which by construction has no object pixels above it or directly to its
/// left. Stops when the walk re-enters the start pixel about to repeat its
/// first step.
fn trace(label: &LabelImage, id: u32, x0: usize, y0: usize, connectivity: usize) -> ChainCode {
    let (w, h) = (label.sizes()[0] as i64, label.sizes()[1] as i64);
    let data = label.data();
    let eight = connectivity == 2;
    let n = if eight { 8 } else { 4 };
    let steps: &[(i64, i64)] = if eight { &STEPS_8 } else { &STEPS_4 };

    let at = |x: i64, y: i64| -> u32 {
        if x < 0 || y < 0 || x >= w || y >= h {
            0
        } else {
            data[(y * w + x) as usize]
        }
    };
    // Probe neighbors rotating +1 from one before the incoming direction.
    let probe = |cx: i64, cy: i64, prev: usize| -> Option<usize> {
        (0..n)
            .map(|k| (prev + n - 1 + k) % n)
            .find(|&d| at(cx + steps[d].0, cy + steps[d].1) == id)
    };

    let init_prev = if eight { 6 } else { 3 };
    let mut codes = Vec::new();
    let first = match probe(x0 as i64, y0 as i64, init_prev) {
        Some(d) => d,
        None => {
            return ChainCode {
                object_id: id,
                start: [x0, y0],
                codes,
                connectivity,
            }
        }
    };
    codes.push(first as u8);
    let mut cx = x0 as i64 + steps[first].0;
    let mut cy = y0 as i64 + steps[first].1;
    let mut prev = first;

    let guard = 4 * n * data.len();
    for _ in 0..guard {
        let Some(dir) = probe(cx, cy, prev) else { break };
        if cx == x0 as i64 && cy == y0 as i64 && dir == first {
            break;
        }
        codes.push(dir as u8);
        cx += steps[dir].0;
        cy += steps[dir].1;
        prev = dir;
    }

    ChainCode {
        object_id: id,
        start: [x0, y0],
        codes,
        connectivity,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square_2x2() -> LabelImage {
        #[rustfmt::skip]
        let data = vec![
            0, 0, 0, 0,
            0, 1, 1, 0,
            0, 1, 1, 0,
            0, 0, 0, 0,
        ];
        LabelImage::new(vec![4, 4], data)
    }

    #[test]
    fn square_eight_connected() {
        let codes = extract_chain_codes(&square_2x2(), 2).unwrap();
        let cc = &codes[&1];
        assert_eq!(cc.start(), [1, 1]);
        assert_eq!(cc.codes(), &[0, 2, 4, 6]);
        assert_eq!(cc.length(), 4.0);
        assert_eq!(
            cc.pixels(),
            vec![[1, 1], [2, 1], [2, 2], [1, 2]]
        );
    }

    #[test]
    fn square_four_connected() {
        let codes = extract_chain_codes(&square_2x2(), 1).unwrap();
        let cc = &codes[&1];
        assert_eq!(cc.codes(), &[0, 1, 2, 3]);
        assert_eq!(cc.length(), 4.0);
    }

    #[test]
    fn single_pixel_is_empty() {
        let label = LabelImage::new(vec![3, 3], vec![0, 0, 0, 0, 9, 0, 0, 0, 0]);
        let codes = extract_chain_codes(&label, 2).unwrap();
        let cc = &codes[&9];
        assert!(cc.is_empty());
        assert_eq!(cc.length(), 0.0);
        assert_eq!(cc.pixels(), vec![[1, 1]]);
    }

    #[test]
    fn domino_doubles_back() {
        let label = LabelImage::new(vec![3, 1], vec![2, 2, 0]);
        let codes = extract_chain_codes(&label, 2).unwrap();
        let cc = &codes[&2];
        assert_eq!(cc.codes(), &[0, 4]);
        assert_eq!(cc.length(), 2.0);
    }

    #[test]
    fn diagonal_pair_eight_connected() {
        #[rustfmt::skip]
        let data = vec![
            3, 0, 0,
            0, 3, 0,
            0, 0, 0,
        ];
        let label = LabelImage::new(vec![3, 3], data);
        let codes = extract_chain_codes(&label, 2).unwrap();
        let cc = &codes[&3];
        assert_eq!(cc.codes(), &[1, 5]);
        assert!((cc.length() - 2.0 * SQRT_2).abs() < 1e-12);
    }

    #[test]
    fn diagonal_pair_four_connected_traces_first_component() {
        // With connectivity 1 the two pixels are separate components; only
        // the first in raster order is traced.
        #[rustfmt::skip]
        let data = vec![
            3, 0, 0,
            0, 3, 0,
            0, 0, 0,
        ];
        let label = LabelImage::new(vec![3, 3], data);
        let codes = extract_chain_codes(&label, 1).unwrap();
        let cc = &codes[&3];
        assert_eq!(cc.start(), [0, 0]);
        assert!(cc.is_empty());
    }

    #[test]
    fn multiple_objects() {
        #[rustfmt::skip]
        let data = vec![
            1, 0, 2, 2,
            1, 0, 2, 2,
        ];
        let label = LabelImage::new(vec![4, 2], data);
        let codes = extract_chain_codes(&label, 2).unwrap();
        assert_eq!(codes.len(), 2);
        assert_eq!(codes[&1].codes(), &[2, 6]);
        assert_eq!(codes[&2].codes(), &[0, 2, 4, 6]);
    }

    #[test]
    fn rejects_non_2d() {
        let label = LabelImage::new(vec![4], vec![1, 1, 0, 0]);
        assert!(matches!(
            extract_chain_codes(&label, 2),
            Err(MeasureError::InvalidInput(_))
        ));
    }

    #[test]
    fn rejects_bad_connectivity() {
        assert!(matches!(
            extract_chain_codes(&square_2x2(), 3),
            Err(MeasureError::InvalidInput(_))
        ));
    }
}
