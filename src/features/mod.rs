//! Feature plug-in contracts and the feature registry.
//!
//! Every measurement feature implements the shared [`Feature`] contract
//! (metadata, per-image setup, teardown) plus exactly one of five
//! kind-specific contracts that determine how the driver feeds it pixels:
//! line by line, whole image, per chain code, per convex hull, or from
//! already-computed features. [`FeaturePlugin`] is the tagged set of those
//! capabilities; the driver dispatches on its variant.

mod bounds;
mod center;
mod derived;
mod hull;
mod mass;
mod median;
mod perimeter;
mod registry;
mod size;

use std::collections::HashMap;

use crate::error::Result;
use crate::geometry::{ChainCode, ConvexHull};
use crate::image::{GreyImage, LabelImage};
use crate::table::{ColumnViewMut, ObjectView};
use crate::units::ValueDesc;

pub use bounds::{Maximum, Minimum};
pub use center::{Center, Gravity};
pub use derived::{Convexity, Mean, P2A};
pub use hull::{ConvexArea, ConvexPerimeter};
pub use mass::Mass;
pub use median::Median;
pub use perimeter::Perimeter;
pub use registry::FeatureRegistry;
pub use size::Size;

/// The computation strategy of a feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureKind {
    /// Accumulates over 1-D image lines.
    LineBased,
    /// Measures from the whole image in one call.
    ImageBased,
    /// Measures from each object's chain code (2-D only).
    ChainCodeBased,
    /// Measures from each object's convex hull (2-D only).
    ConvexHullBased,
    /// Derived from other, already-computed features.
    Composite,
}

/// Static metadata about a feature.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureDescription {
    /// Name of the feature; the registry key.
    pub name: String,
    /// Human-readable description.
    pub description: String,
    /// Whether the feature needs a grey-value image.
    pub needs_grey: bool,
    /// Computation strategy.
    pub kind: FeatureKind,
}

impl FeatureDescription {
    /// Create a feature description.
    pub fn new(name: &str, description: &str, needs_grey: bool, kind: FeatureKind) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            needs_grey,
            kind,
        }
    }
}

/// Maps object ids to table row indices during a scan.
pub type ObjectRowMap = HashMap<u32, usize>;

/// Shared contract of all measurement features.
pub trait Feature {
    /// Static metadata; `description().name` identifies the feature.
    fn description(&self) -> FeatureDescription;

    /// Validate image properties and prepare per-object accumulators.
    ///
    /// Returns the descriptors of the values this feature will produce; the
    /// returned length fixes the feature's column count in the table.
    /// Unsupported images fail with `InvalidInput`; the driver propagates
    /// such errors verbatim.
    fn initialize(
        &mut self,
        label: &LabelImage,
        grey: Option<&GreyImage>,
        n_objects: usize,
    ) -> Result<Vec<ValueDesc>>;

    /// Release per-image transient state.
    fn cleanup(&mut self) {}
}

/// Features accumulated line by line over the image.
///
/// `scan_line` is called once per 1-D line along the fastest axis and is
/// never called re-entrantly; the driver serializes calls per plug-in.
/// Lines containing only background are still visited.
pub trait LineBasedFeature: Feature {
    /// Accumulate one image line.
    ///
    /// `grey` is present when a scalar grey-value image was supplied and is
    /// synchronized with `labels`. `coords` holds the coordinates of the
    /// first pixel, `axis` the dimension the line runs along, and `rows`
    /// maps object ids to table rows.
    fn scan_line(
        &mut self,
        labels: &[u32],
        grey: Option<&[f64]>,
        coords: &[usize],
        axis: usize,
        rows: &ObjectRowMap,
    );

    /// Move the accumulator for one object row into its table cell.
    fn finish(&mut self, row: usize, out: &mut [f64]);
}

/// Features measured from the whole image in a single call.
pub trait ImageBasedFeature: Feature {
    /// Measure all objects, writing each row through the column view.
    fn measure(&mut self, label: &LabelImage, grey: Option<&GreyImage>, column: &mut ColumnViewMut<'_>);
}

/// Features measured from each object's chain code.
pub trait ChainCodeFeature: Feature {
    /// Measure one object.
    fn measure(&mut self, chain_code: &ChainCode, out: &mut [f64]);
}

/// Features measured from each object's convex hull.
pub trait ConvexHullFeature: Feature {
    /// Measure one object.
    fn measure(&mut self, hull: &ConvexHull, out: &mut [f64]);
}

/// Features derived from other features.
pub trait CompositeFeature: Feature {
    /// Names of the features this one is derived from. Resolved before
    /// initialization, so dependency columns always precede this feature's.
    fn dependencies(&self) -> Vec<String>;

    /// Measure one object from its already-filled dependency values.
    fn measure(&mut self, dependencies: &ObjectView<'_>, out: &mut [f64]);
}

/// A registered feature: one variant per computation strategy.
///
/// The driver dispatches on the variant; each variant exposes only its
/// kind-specific scan method.
pub enum FeaturePlugin {
    /// See [`LineBasedFeature`].
    LineBased(Box<dyn LineBasedFeature + Send>),
    /// See [`ImageBasedFeature`].
    ImageBased(Box<dyn ImageBasedFeature + Send>),
    /// See [`ChainCodeFeature`].
    ChainCode(Box<dyn ChainCodeFeature + Send>),
    /// See [`ConvexHullFeature`].
    ConvexHull(Box<dyn ConvexHullFeature + Send>),
    /// See [`CompositeFeature`].
    Composite(Box<dyn CompositeFeature + Send>),
}

impl FeaturePlugin {
    /// The plug-in's computation strategy.
    pub fn kind(&self) -> FeatureKind {
        match self {
            FeaturePlugin::LineBased(_) => FeatureKind::LineBased,
            FeaturePlugin::ImageBased(_) => FeatureKind::ImageBased,
            FeaturePlugin::ChainCode(_) => FeatureKind::ChainCodeBased,
            FeaturePlugin::ConvexHull(_) => FeatureKind::ConvexHullBased,
            FeaturePlugin::Composite(_) => FeatureKind::Composite,
        }
    }

    /// The plug-in's static metadata.
    pub fn description(&self) -> FeatureDescription {
        match self {
            FeaturePlugin::LineBased(f) => f.description(),
            FeaturePlugin::ImageBased(f) => f.description(),
            FeaturePlugin::ChainCode(f) => f.description(),
            FeaturePlugin::ConvexHull(f) => f.description(),
            FeaturePlugin::Composite(f) => f.description(),
        }
    }

    pub(crate) fn initialize(
        &mut self,
        label: &LabelImage,
        grey: Option<&GreyImage>,
        n_objects: usize,
    ) -> Result<Vec<ValueDesc>> {
        match self {
            FeaturePlugin::LineBased(f) => f.initialize(label, grey, n_objects),
            FeaturePlugin::ImageBased(f) => f.initialize(label, grey, n_objects),
            FeaturePlugin::ChainCode(f) => f.initialize(label, grey, n_objects),
            FeaturePlugin::ConvexHull(f) => f.initialize(label, grey, n_objects),
            FeaturePlugin::Composite(f) => f.initialize(label, grey, n_objects),
        }
    }

    pub(crate) fn cleanup(&mut self) {
        match self {
            FeaturePlugin::LineBased(f) => f.cleanup(),
            FeaturePlugin::ImageBased(f) => f.cleanup(),
            FeaturePlugin::ChainCode(f) => f.cleanup(),
            FeaturePlugin::ConvexHull(f) => f.cleanup(),
            FeaturePlugin::Composite(f) => f.cleanup(),
        }
    }
}

/// Conventional name for a coordinate axis: `x`, `y`, `z`, then `dim3`,
/// `dim4`, ...
pub(crate) fn axis_name(dim: usize) -> String {
    match dim {
        0 => "x".to_string(),
        1 => "y".to_string(),
        2 => "z".to_string(),
        _ => format!("dim{dim}"),
    }
}

/// Shared `initialize` check for features that read grey values: the grey
/// image must be present and scalar.
pub(crate) fn require_scalar_grey(name: &str, grey: Option<&GreyImage>) -> Result<()> {
    use crate::error::MeasureError;
    match grey {
        None => Err(MeasureError::MissingGrey(name.to_string())),
        Some(g) if !g.is_scalar() => Err(MeasureError::InvalidInput(format!(
            "feature '{name}' requires a scalar grey-value image, got {} channels",
            g.channels()
        ))),
        Some(_) => Ok(()),
    }
}

/// Shared `initialize` check for boundary-derived features.
pub(crate) fn require_2d(name: &str, label: &LabelImage) -> Result<()> {
    use crate::error::MeasureError;
    if label.dimensionality() != 2 {
        return Err(MeasureError::InvalidInput(format!(
            "feature '{name}' requires a 2-D image, got {} dimensions",
            label.dimensionality()
        )));
    }
    Ok(())
}
