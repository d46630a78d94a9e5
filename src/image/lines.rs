//! Decomposition of an n-dimensional image into 1-D lines.

/// Calls `visit` once per maximal line along dimension 0, in memory order.
///
/// `visit` receives the coordinates of the first pixel of the line and the
/// flat offset of that pixel; the line occupies `offset..offset + sizes[0]`
/// in the backing buffer. Returning an error from `visit` stops the walk.
///
/// Images with any zero-sized dimension produce no lines.
pub fn walk_lines<E>(
    sizes: &[usize],
    mut visit: impl FnMut(&[usize], usize) -> Result<(), E>,
) -> Result<(), E> {
    if sizes.is_empty() || sizes.iter().any(|&s| s == 0) {
        return Ok(());
    }
    let line_len = sizes[0];
    let mut coords = vec![0usize; sizes.len()];
    let mut offset = 0usize;
    loop {
        visit(&coords, offset)?;
        offset += line_len;
        let mut d = 1;
        loop {
            if d >= sizes.len() {
                return Ok(());
            }
            coords[d] += 1;
            if coords[d] < sizes[d] {
                break;
            }
            coords[d] = 0;
            d += 1;
        }
    }
}
