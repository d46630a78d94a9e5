//! The measurement table: rows are objects, columns are feature values.

mod views;

use std::collections::HashMap;
use std::fmt;

use crate::error::{MeasureError, Result};
use crate::units::ValueDesc;

pub use views::{ColumnViewMut, FeatureCursor, FeatureView, ObjectCursor, ObjectView};

/// Identifies one feature's column group within a [`Measurement`] table.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureInfo {
    /// Name of the feature.
    pub name: String,
    /// Index of the feature's first value column.
    pub start_column: usize,
    /// Number of value columns the feature occupies.
    pub value_count: usize,
}

/// Measurement results, a forge-once table of `f64` values.
///
/// Rows are objects, identified by positive `u32` ids; columns are feature
/// value groups, identified by name. A feature can produce several values
/// per object, occupying consecutive sub-columns.
///
/// # Lifecycle
///
/// A new table accepts [`add_feature`](Measurement::add_feature) and
/// [`add_object_ids`](Measurement::add_object_ids) in any interleaving.
/// [`forge`](Measurement::forge) then allocates the zero-initialized data
/// buffer and freezes the schema; kernels fill cells in place, and all read
/// access requires a forged table.
///
/// # Memory Layout
///
/// Row-major: all values for one object are contiguous, and the stride
/// between rows equals the total number of value columns.
///
/// ```text
/// data[row * stride() + feature.start_column + value]
/// ```
///
/// # Example
///
/// ```
/// use measure_rs::table::Measurement;
/// use measure_rs::units::{Units, ValueDesc};
///
/// let mut table = Measurement::new();
/// table.add_feature("Size", vec![ValueDesc::new("Size", Units::PIXEL.powi(2))]).unwrap();
/// table.add_object_ids(&[10, 20]).unwrap();
/// table.forge().unwrap();
///
/// table.cell_mut(10, "Size").unwrap()[0] = 42.0;
/// assert_eq!(table.cell(10, "Size").unwrap(), &[42.0]);
/// assert_eq!(table.cell(20, "Size").unwrap(), &[0.0]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Measurement {
    objects: Vec<u32>,
    object_lookup: HashMap<u32, usize>,
    features: Vec<FeatureInfo>,
    feature_lookup: HashMap<String, usize>,
    values: Vec<ValueDesc>,
    data: Vec<f64>,
}

impl Measurement {
    /// Create an empty, unforged table.
    pub fn new() -> Self {
        Self::default()
    }

    /// True once [`forge`](Measurement::forge) has run.
    #[inline]
    pub fn is_forged(&self) -> bool {
        !self.data.is_empty()
    }

    /// Append a feature column group.
    ///
    /// Fails with `DuplicateName` if the name is already present,
    /// `EmptySchema` if `values` is empty, and `TableForged` after forging.
    pub fn add_feature(&mut self, name: &str, values: Vec<ValueDesc>) -> Result<()> {
        if self.is_forged() {
            return Err(MeasureError::TableForged);
        }
        if values.is_empty() {
            return Err(MeasureError::EmptySchema);
        }
        if self.feature_lookup.contains_key(name) {
            return Err(MeasureError::DuplicateName(name.to_string()));
        }
        self.push_feature(name, values);
        Ok(())
    }

    /// Append a feature column group unless the name is already present.
    ///
    /// Used during dependency resolution so a feature requested both
    /// directly and as a dependency does not double-register.
    pub fn ensure_feature(&mut self, name: &str, values: Vec<ValueDesc>) -> Result<()> {
        if self.is_forged() {
            return Err(MeasureError::TableForged);
        }
        if self.feature_lookup.contains_key(name) {
            return Ok(());
        }
        if values.is_empty() {
            return Err(MeasureError::EmptySchema);
        }
        self.push_feature(name, values);
        Ok(())
    }

    fn push_feature(&mut self, name: &str, values: Vec<ValueDesc>) {
        let start_column = self.values.len();
        let value_count = values.len();
        self.values.extend(values);
        self.feature_lookup
            .insert(name.to_string(), self.features.len());
        self.features.push(FeatureInfo {
            name: name.to_string(),
            start_column,
            value_count,
        });
    }

    /// Append object rows, in order.
    ///
    /// Fails with `DuplicateId` at the first colliding id and `TableForged`
    /// after forging.
    pub fn add_object_ids(&mut self, ids: &[u32]) -> Result<()> {
        if self.is_forged() {
            return Err(MeasureError::TableForged);
        }
        for &id in ids {
            if self.object_lookup.contains_key(&id) {
                return Err(MeasureError::DuplicateId(id));
            }
            self.object_lookup.insert(id, self.objects.len());
            self.objects.push(id);
        }
        Ok(())
    }

    /// Allocate the zero-initialized data buffer and freeze the schema.
    ///
    /// Idempotent once forged; fails with `EmptyTable` if there are no
    /// features or no objects.
    pub fn forge(&mut self) -> Result<()> {
        if self.is_forged() {
            return Ok(());
        }
        let n = self.objects.len() * self.values.len();
        if n == 0 {
            return Err(MeasureError::EmptyTable);
        }
        self.data = vec![0.0; n];
        Ok(())
    }

    /// Object ids, in row order.
    #[inline]
    pub fn objects(&self) -> &[u32] {
        &self.objects
    }

    /// Feature column groups, in column order.
    #[inline]
    pub fn features(&self) -> &[FeatureInfo] {
        &self.features
    }

    /// Descriptors of all value columns, in column order.
    #[inline]
    pub fn values(&self) -> &[ValueDesc] {
        &self.values
    }

    /// Number of object rows.
    #[inline]
    pub fn num_objects(&self) -> usize {
        self.objects.len()
    }

    /// Number of feature column groups.
    #[inline]
    pub fn num_features(&self) -> usize {
        self.features.len()
    }

    /// Total number of value columns; also the row stride of the data
    /// buffer.
    #[inline]
    pub fn num_values(&self) -> usize {
        self.values.len()
    }

    /// Stride between consecutive object rows in the data buffer.
    #[inline]
    pub fn stride(&self) -> usize {
        self.values.len()
    }

    /// True if a feature with this name is present.
    pub fn feature_exists(&self, name: &str) -> bool {
        self.feature_lookup.contains_key(name)
    }

    /// True if this object id is present.
    pub fn object_exists(&self, id: u32) -> bool {
        self.object_lookup.contains_key(&id)
    }

    /// Row index of an object id.
    pub fn object_row(&self, id: u32) -> Option<usize> {
        self.object_lookup.get(&id).copied()
    }

    /// Index of a feature into [`features`](Measurement::features).
    pub fn feature_column(&self, name: &str) -> Option<usize> {
        self.feature_lookup.get(name).copied()
    }

    /// Descriptors of one feature's value columns.
    pub fn feature_values(&self, name: &str) -> Option<&[ValueDesc]> {
        let info = &self.features[self.feature_column(name)?];
        Some(&self.values[info.start_column..info.start_column + info.value_count])
    }

    /// View of one feature's column group, or `None` if the name is absent.
    ///
    /// # Panics
    ///
    /// Panics if the table is not forged.
    pub fn feature(&self, name: &str) -> Option<FeatureView<'_>> {
        self.assert_forged();
        Some(self.feature_at(self.feature_column(name)?))
    }

    /// View of the feature at a column-group index.
    ///
    /// # Panics
    ///
    /// Panics if the table is not forged or the index is out of bounds.
    pub fn feature_at(&self, index: usize) -> FeatureView<'_> {
        self.assert_forged();
        assert!(index < self.features.len(), "Feature index out of bounds");
        FeatureView::new(self, index)
    }

    /// View of one object's row, or `None` if the id is absent.
    ///
    /// # Panics
    ///
    /// Panics if the table is not forged.
    pub fn object(&self, id: u32) -> Option<ObjectView<'_>> {
        self.assert_forged();
        Some(self.object_at(self.object_row(id)?))
    }

    /// View of the object at a row index.
    ///
    /// # Panics
    ///
    /// Panics if the table is not forged or the row is out of bounds.
    pub fn object_at(&self, row: usize) -> ObjectView<'_> {
        self.assert_forged();
        assert!(row < self.objects.len(), "Object row out of bounds");
        ObjectView::new(self, row)
    }

    /// The cell of one object and one feature, or `None` if either is
    /// absent.
    ///
    /// # Panics
    ///
    /// Panics if the table is not forged.
    pub fn cell(&self, id: u32, name: &str) -> Option<&[f64]> {
        self.assert_forged();
        let row = self.object_row(id)?;
        let info = &self.features[self.feature_column(name)?];
        let start = row * self.stride() + info.start_column;
        Some(&self.data[start..start + info.value_count])
    }

    /// Mutable cell of one object and one feature.
    ///
    /// # Panics
    ///
    /// Panics if the table is not forged.
    pub fn cell_mut(&mut self, id: u32, name: &str) -> Option<&mut [f64]> {
        self.assert_forged();
        let row = self.object_row(id)?;
        let index = self.feature_column(name)?;
        Some(self.cell_at_mut(row, index))
    }

    /// Mutable cell by row and column-group index.
    pub(crate) fn cell_at_mut(&mut self, row: usize, index: usize) -> &mut [f64] {
        let info = &self.features[index];
        let start = row * self.values.len() + info.start_column;
        &mut self.data[start..start + info.value_count]
    }

    /// Mutable column-group view for a measurement kernel.
    ///
    /// # Panics
    ///
    /// Panics if the table is not forged.
    pub fn column_mut(&mut self, name: &str) -> Option<ColumnViewMut<'_>> {
        self.assert_forged();
        let info = self.features[self.feature_column(name)?].clone();
        let stride = self.values.len();
        Some(ColumnViewMut::new(
            &mut self.data,
            &self.objects,
            stride,
            info.start_column,
            info.value_count,
        ))
    }

    /// The raw data buffer; all values for one object are contiguous.
    ///
    /// # Panics
    ///
    /// Panics if the table is not forged.
    #[inline]
    pub fn data(&self) -> &[f64] {
        self.assert_forged();
        &self.data
    }

    /// The raw data buffer, mutable.
    ///
    /// # Panics
    ///
    /// Panics if the table is not forged.
    #[inline]
    pub fn data_mut(&mut self) -> &mut [f64] {
        self.assert_forged();
        &mut self.data
    }

    pub(crate) fn raw_data(&self) -> &[f64] {
        &self.data
    }

    #[inline]
    fn assert_forged(&self) {
        assert!(self.is_forged(), "Measurement table is not forged");
    }
}

impl fmt::Display for Measurement {
    /// Debug text dump; the format is not contractual.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const WIDTH: usize = 14;
        write!(f, "{:>10} |", "object id")?;
        for info in &self.features {
            let span = WIDTH * info.value_count + info.value_count - 1;
            write!(f, " {:>span$} |", info.name)?;
        }
        writeln!(f)?;
        write!(f, "{:>10} |", "")?;
        for info in &self.features {
            for v in &self.values[info.start_column..info.start_column + info.value_count] {
                let units = v.units.to_string();
                let header = if units.is_empty() {
                    v.name.clone()
                } else {
                    format!("{} ({units})", v.name)
                };
                write!(f, " {header:>WIDTH$}")?;
            }
            write!(f, " |")?;
        }
        writeln!(f)?;
        if !self.is_forged() {
            return writeln!(f, "(not forged)");
        }
        for (row, &id) in self.objects.iter().enumerate() {
            write!(f, "{id:>10} |")?;
            for info in &self.features {
                let start = row * self.stride() + info.start_column;
                for value in &self.data[start..start + info.value_count] {
                    write!(f, " {value:>WIDTH$.4}")?;
                }
                write!(f, " |")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
