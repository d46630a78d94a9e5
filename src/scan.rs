//! Line-based scan engine.
//!
//! Decomposes the label (and grey) image into maximal 1-D lines along the
//! fastest axis and feeds every line-based plug-in in closure order. Calls
//! to a single plug-in happen strictly in image line order; between
//! plug-ins, per-line calls are interleaved.

use crate::error::{MeasureError, Result};
use crate::features::{FeaturePlugin, FeatureRegistry, ObjectRowMap};
use crate::image::{walk_lines, GreyImage, LabelImage};
use crate::table::Measurement;
use crate::tool::CancelToken;

/// One pass over the image, scanning every line into each plug-in.
///
/// Lines containing only background are visited too. The grey line is
/// supplied when a scalar grey-value image is present; plug-ins that do not
/// need it ignore it.
pub(crate) fn run_line_based(
    registry: &mut FeatureRegistry,
    names: &[String],
    label: &LabelImage,
    grey: Option<&GreyImage>,
    rows: &ObjectRowMap,
    cancel: Option<&CancelToken>,
) -> Result<()> {
    let line_len = label.sizes()[0];
    let label_data = label.data();
    // A grey image no plug-in asked for may be misshapen; only a scalar
    // image over the label grid yields line slices.
    let grey_data = grey
        .filter(|g| g.is_scalar() && g.sizes() == label.sizes())
        .map(|g| g.data());
    walk_lines(label.sizes(), |coords, offset| {
        if let Some(token) = cancel {
            if token.is_cancelled() {
                return Err(MeasureError::Cancelled);
            }
        }
        let labels = &label_data[offset..offset + line_len];
        let grey_line = grey_data.map(|d| &d[offset..offset + line_len]);
        for name in names {
            if let Some(FeaturePlugin::LineBased(f)) = registry.get_mut(name) {
                f.scan_line(labels, grey_line, coords, 0, rows);
            }
        }
        Ok(())
    })
}

/// After all lines are scanned, move each plug-in's accumulators into the
/// table, one object row at a time.
pub(crate) fn finish_line_based(
    registry: &mut FeatureRegistry,
    names: &[String],
    table: &mut Measurement,
) {
    for name in names {
        let Some(index) = table.feature_column(name) else {
            continue;
        };
        if let Some(FeaturePlugin::LineBased(f)) = registry.get_mut(name) {
            for row in 0..table.num_objects() {
                f.finish(row, table.cell_at_mut(row, index));
            }
        }
    }
}
