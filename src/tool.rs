//! The measurement driver.
//!
//! [`MeasurementTool`] owns the feature registry, resolves the transitive
//! closure of the requested features, allocates and forges the measurement
//! table, and runs each feature through the scan strategy of its kind.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use derive_builder::Builder;

use crate::error::{MeasureError, Result};
use crate::features::{
    Center, ConvexArea, ConvexPerimeter, Convexity, FeatureDescription, FeatureKind,
    FeaturePlugin, FeatureRegistry, Gravity, Mass, Maximum, Mean, Median, Minimum, ObjectRowMap,
    Perimeter, Size, P2A,
};
use crate::geometry::{extract_chain_codes, ConvexHull};
use crate::image::{GreyImage, LabelImage};
use crate::scan;
use crate::table::Measurement;

/// Cooperative cancellation for long measurements.
///
/// Cloned tokens share state: `cancel()` makes a running measurement
/// return `Cancelled` at the next line or object boundary.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    /// Create a token in the not-cancelled state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    /// True once `cancel()` has been called on any clone.
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

/// Options for [`MeasurementTool::measure_with`].
///
/// Use [`MeasureOptions::builder()`] for a fluent API, or
/// [`MeasureOptions::default()`] for connectivity 2 and no cancellation.
#[derive(Debug, Clone, Builder)]
#[builder(setter(into), default)]
pub struct MeasureOptions {
    /// Neighbor connectivity used when extracting chain codes: 1 for
    /// 4-connected boundaries, 2 for 8-connected. Should match the value
    /// the label image was created with; ignored by features that are not
    /// boundary-derived.
    #[builder(default = "2")]
    pub connectivity: usize,

    /// Optional cooperative cancellation token.
    #[builder(default)]
    pub cancel: Option<CancelToken>,
}

impl Default for MeasureOptions {
    fn default() -> Self {
        Self {
            connectivity: 2,
            cancel: None,
        }
    }
}

impl MeasureOptions {
    /// A builder with all fields at their defaults.
    pub fn builder() -> MeasureOptionsBuilder {
        MeasureOptionsBuilder::default()
    }
}

/// Knows the registered measurement features and applies them to images.
///
/// # Example
///
/// ```
/// use measure_rs::image::LabelImage;
/// use measure_rs::tool::MeasurementTool;
///
/// #[rustfmt::skip]
/// let label = LabelImage::new(vec![4, 4], vec![
///     1, 1, 0, 0,
///     0, 0, 0, 2,
///     0, 3, 3, 3,
///     0, 3, 3, 3,
/// ]);
/// let mut tool = MeasurementTool::new();
/// let msr = tool.measure(&label, None, &["Size"], &[]).unwrap();
/// assert_eq!(msr.cell(3, "Size").unwrap(), &[6.0]);
/// ```
///
/// The registry lives inside the tool: multiple tools may coexist with
/// disjoint feature sets.
pub struct MeasurementTool {
    registry: FeatureRegistry,
}

impl Default for MeasurementTool {
    fn default() -> Self {
        Self::new()
    }
}

impl MeasurementTool {
    /// A tool with the default feature library registered.
    pub fn new() -> Self {
        let mut registry = FeatureRegistry::new();
        registry.register(FeaturePlugin::LineBased(Box::new(Size::new())));
        registry.register(FeaturePlugin::LineBased(Box::new(Minimum::new())));
        registry.register(FeaturePlugin::LineBased(Box::new(Maximum::new())));
        registry.register(FeaturePlugin::LineBased(Box::new(Center::new())));
        registry.register(FeaturePlugin::LineBased(Box::new(Mass::new())));
        registry.register(FeaturePlugin::LineBased(Box::new(Gravity::new())));
        registry.register(FeaturePlugin::ImageBased(Box::new(Median::new())));
        registry.register(FeaturePlugin::ChainCode(Box::new(Perimeter::new())));
        registry.register(FeaturePlugin::ConvexHull(Box::new(ConvexArea::new())));
        registry.register(FeaturePlugin::ConvexHull(Box::new(ConvexPerimeter::new())));
        registry.register(FeaturePlugin::Composite(Box::new(Mean::new())));
        registry.register(FeaturePlugin::Composite(Box::new(P2A::new())));
        registry.register(FeaturePlugin::Composite(Box::new(Convexity::new())));
        Self { registry }
    }

    /// A tool with no features registered.
    pub fn empty() -> Self {
        Self {
            registry: FeatureRegistry::new(),
        }
    }

    /// Register a feature plug-in. Idempotent: a plug-in whose name is
    /// already registered is dropped and the existing one kept.
    pub fn register(&mut self, feature: FeaturePlugin) {
        self.registry.register(feature);
    }

    /// Descriptions of all registered features, in registration order.
    pub fn features(&self) -> Vec<FeatureDescription> {
        self.registry.list()
    }

    /// Measure features with default options (connectivity 2).
    ///
    /// See [`measure_with`](MeasurementTool::measure_with).
    pub fn measure(
        &mut self,
        label: &LabelImage,
        grey: Option<&GreyImage>,
        feature_names: &[&str],
        object_ids: &[u32],
    ) -> Result<Measurement> {
        self.measure_with(label, grey, feature_names, object_ids, &MeasureOptions::default())
    }

    /// Measure one or more features on one or more objects.
    ///
    /// Composite features pull their dependencies into the measurement, so
    /// the returned table can contain features that were not directly
    /// requested; columns appear in dependency-closure order with
    /// dependencies before their dependents. Rows follow `object_ids`, or
    /// the sorted distinct ids found in `label` when `object_ids` is empty.
    /// Ids absent from the label image keep zeroed rows.
    ///
    /// Length-valued measurements use the pixel sizes of `label`; those of
    /// `grey` are ignored. Features that require isotropic pixels report
    /// raw pixel units when the label is anisotropic.
    pub fn measure_with(
        &mut self,
        label: &LabelImage,
        grey: Option<&GreyImage>,
        feature_names: &[&str],
        object_ids: &[u32],
        options: &MeasureOptions,
    ) -> Result<Measurement> {
        let objects: Vec<u32> = if object_ids.is_empty() {
            label.collect_object_ids()
        } else {
            object_ids.to_vec()
        };

        let closure = self.resolve_closure(feature_names)?;
        self.check_grey(&closure, label, grey)?;

        let mut table = Measurement::new();
        for name in &closure {
            let plugin = self
                .registry
                .get_mut(name)
                .ok_or_else(|| MeasureError::UnknownFeature(name.clone()))?;
            let values = plugin.initialize(label, grey, objects.len())?;
            table.ensure_feature(name, values)?;
        }
        table.add_object_ids(&objects)?;
        table.forge()?;
        let rows: ObjectRowMap = objects.iter().enumerate().map(|(r, &id)| (id, r)).collect();

        let mut line_bucket = Vec::new();
        let mut image_bucket = Vec::new();
        let mut chain_bucket = Vec::new();
        let mut hull_bucket = Vec::new();
        let mut composite_bucket = Vec::new();
        for name in &closure {
            if let Some(plugin) = self.registry.get(name) {
                match plugin.kind() {
                    FeatureKind::LineBased => line_bucket.push(name.clone()),
                    FeatureKind::ImageBased => image_bucket.push(name.clone()),
                    FeatureKind::ChainCodeBased => chain_bucket.push(name.clone()),
                    FeatureKind::ConvexHullBased => hull_bucket.push(name.clone()),
                    FeatureKind::Composite => composite_bucket.push(name.clone()),
                }
            }
        }
        let cancel = options.cancel.as_ref();

        if !line_bucket.is_empty() {
            scan::run_line_based(&mut self.registry, &line_bucket, label, grey, &rows, cancel)?;
            scan::finish_line_based(&mut self.registry, &line_bucket, &mut table);
        }

        for name in &image_bucket {
            check_cancelled(cancel)?;
            let mut column = table
                .column_mut(name)
                .ok_or_else(|| MeasureError::UnknownFeature(name.clone()))?;
            if let Some(FeaturePlugin::ImageBased(f)) = self.registry.get_mut(name) {
                f.measure(label, grey, &mut column);
            }
        }

        if !chain_bucket.is_empty() || !hull_bucket.is_empty() {
            let chain_codes = extract_chain_codes(label, options.connectivity)?;
            for name in &chain_bucket {
                let Some(index) = table.feature_column(name) else { continue };
                for (row, &id) in objects.iter().enumerate() {
                    check_cancelled(cancel)?;
                    let Some(code) = chain_codes.get(&id) else { continue };
                    if let Some(FeaturePlugin::ChainCode(f)) = self.registry.get_mut(name) {
                        f.measure(code, table.cell_at_mut(row, index));
                    }
                }
            }
            if !hull_bucket.is_empty() {
                let hulls: HashMap<u32, ConvexHull> = chain_codes
                    .iter()
                    .map(|(&id, code)| (id, ConvexHull::from_chain_code(code)))
                    .collect();
                for name in &hull_bucket {
                    let Some(index) = table.feature_column(name) else { continue };
                    for (row, &id) in objects.iter().enumerate() {
                        check_cancelled(cancel)?;
                        let Some(hull) = hulls.get(&id) else { continue };
                        if let Some(FeaturePlugin::ConvexHull(f)) = self.registry.get_mut(name) {
                            f.measure(hull, table.cell_at_mut(row, index));
                        }
                    }
                }
            }
        }

        for name in &composite_bucket {
            let Some(index) = table.feature_column(name) else { continue };
            let count = table.features()[index].value_count;
            for row in 0..objects.len() {
                check_cancelled(cancel)?;
                let mut cell = vec![0.0; count];
                {
                    let view = table.object_at(row);
                    if let Some(FeaturePlugin::Composite(f)) = self.registry.get_mut(name) {
                        f.measure(&view, &mut cell);
                    }
                }
                table.cell_at_mut(row, index).copy_from_slice(&cell);
            }
        }

        for name in &closure {
            if let Some(plugin) = self.registry.get_mut(name) {
                plugin.cleanup();
            }
        }
        Ok(table)
    }

    /// Expand the requested features into their transitive dependency
    /// closure, topologically ordered with dependencies first; ties keep
    /// request order.
    fn resolve_closure(&self, requested: &[&str]) -> Result<Vec<String>> {
        let mut order = Vec::new();
        let mut done = HashSet::new();
        let mut visiting = HashSet::new();
        for &name in requested {
            self.visit(name, &mut order, &mut done, &mut visiting)?;
        }
        Ok(order)
    }

    fn visit(
        &self,
        name: &str,
        order: &mut Vec<String>,
        done: &mut HashSet<String>,
        visiting: &mut HashSet<String>,
    ) -> Result<()> {
        if done.contains(name) {
            return Ok(());
        }
        if !visiting.insert(name.to_string()) {
            return Err(MeasureError::CyclicDependency(name.to_string()));
        }
        let plugin = self
            .registry
            .get(name)
            .ok_or_else(|| MeasureError::UnknownFeature(name.to_string()))?;
        if let FeaturePlugin::Composite(f) = plugin {
            for dependency in f.dependencies() {
                self.visit(&dependency, order, done, visiting)?;
            }
        }
        visiting.remove(name);
        done.insert(name.to_string());
        order.push(name.to_string());
        Ok(())
    }

    /// Fail with `MissingGrey` or `GeometryMismatch` when a closure feature
    /// needs intensity data that is absent or misshapen. A grey image that
    /// no feature needs is ignored entirely.
    fn check_grey(
        &self,
        closure: &[String],
        label: &LabelImage,
        grey: Option<&GreyImage>,
    ) -> Result<()> {
        let needs_grey = closure
            .iter()
            .find(|name| {
                self.registry
                    .get(name)
                    .map(|f| f.description().needs_grey)
                    .unwrap_or(false)
            });
        let Some(name) = needs_grey else {
            return Ok(());
        };
        match grey {
            None => Err(MeasureError::MissingGrey(name.to_string())),
            Some(g) if g.sizes() != label.sizes() => Err(MeasureError::GeometryMismatch {
                label: label.sizes().to_vec(),
                grey: g.sizes().to_vec(),
            }),
            Some(_) => Ok(()),
        }
    }
}

fn check_cancelled(cancel: Option<&CancelToken>) -> Result<()> {
    if let Some(token) = cancel {
        if token.is_cancelled() {
            return Err(MeasureError::Cancelled);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::{CompositeFeature, Feature};
    use crate::table::ObjectView;
    use crate::units::ValueDesc;

    struct Cyclic {
        name: &'static str,
        dependency: &'static str,
    }

    impl Feature for Cyclic {
        fn description(&self) -> FeatureDescription {
            FeatureDescription::new(self.name, "test cycle", false, FeatureKind::Composite)
        }

        fn initialize(
            &mut self,
            _label: &LabelImage,
            _grey: Option<&GreyImage>,
            _n_objects: usize,
        ) -> Result<Vec<ValueDesc>> {
            Ok(vec![ValueDesc::dimensionless(self.name)])
        }
    }

    impl CompositeFeature for Cyclic {
        fn dependencies(&self) -> Vec<String> {
            vec![self.dependency.to_string()]
        }

        fn measure(&mut self, _dependencies: &ObjectView<'_>, _out: &mut [f64]) {}
    }

    #[test]
    fn closure_orders_dependencies_first() {
        let tool = MeasurementTool::new();
        let closure = tool.resolve_closure(&["Mean"]).unwrap();
        assert_eq!(closure, vec!["Size", "Mass", "Mean"]);
    }

    #[test]
    fn closure_keeps_request_order_for_ties() {
        let tool = MeasurementTool::new();
        let closure = tool.resolve_closure(&["Perimeter", "Mean", "Size"]).unwrap();
        assert_eq!(closure, vec!["Perimeter", "Size", "Mass", "Mean"]);
    }

    #[test]
    fn cyclic_dependency_is_rejected() {
        let mut tool = MeasurementTool::empty();
        tool.register(FeaturePlugin::Composite(Box::new(Cyclic {
            name: "A",
            dependency: "B",
        })));
        tool.register(FeaturePlugin::Composite(Box::new(Cyclic {
            name: "B",
            dependency: "A",
        })));
        assert!(matches!(
            tool.resolve_closure(&["A"]),
            Err(MeasureError::CyclicDependency(_))
        ));
    }

    #[test]
    fn unknown_feature_is_rejected() {
        let tool = MeasurementTool::new();
        assert!(matches!(
            tool.resolve_closure(&["Fluffiness"]),
            Err(MeasureError::UnknownFeature(_))
        ));
    }

    #[test]
    fn duplicate_registration_keeps_the_first() {
        let mut tool = MeasurementTool::new();
        let before = tool.features().len();
        tool.register(FeaturePlugin::LineBased(Box::new(Size::new())));
        assert_eq!(tool.features().len(), before);
    }

    #[test]
    fn options_builder() {
        let options = MeasureOptions::builder()
            .connectivity(1usize)
            .build()
            .unwrap();
        assert_eq!(options.connectivity, 1);
        assert!(options.cancel.is_none());

        let token = CancelToken::new();
        let options = MeasureOptions::builder()
            .cancel(token.clone())
            .build()
            .unwrap();
        assert!(options.cancel.is_some());
        token.cancel();
        assert!(options.cancel.unwrap().is_cancelled());
    }
}
