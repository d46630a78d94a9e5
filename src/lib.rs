//! measure-rs: per-object feature measurement for labeled raster images.
//!
//! Given a label image (`u32` object ids, 0 denoting background) and an
//! optional grey-value image over the same grid, the
//! [`MeasurementTool`](tool::MeasurementTool) computes a requested set of
//! per-object features and returns a [`Measurement`](table::Measurement)
//! table indexed by object id and feature name. Composite features pull
//! their dependencies into the measurement automatically.
//!
//! ```
//! use measure_rs::image::{GreyImage, LabelImage};
//! use measure_rs::tool::MeasurementTool;
//!
//! #[rustfmt::skip]
//! let label = LabelImage::new(vec![4, 2], vec![
//!     1, 1, 0, 2,
//!     1, 0, 0, 2,
//! ]);
//! let grey = GreyImage::new(vec![4, 2], vec![1.0; 8]);
//!
//! let mut tool = MeasurementTool::new();
//! let msr = tool.measure(&label, Some(&grey), &["Mean"], &[]).unwrap();
//!
//! // Mean pulled in its dependencies Size and Mass.
//! let names: Vec<_> = msr.features().iter().map(|f| f.name.as_str()).collect();
//! assert_eq!(names, vec!["Size", "Mass", "Mean"]);
//! assert_eq!(msr.cell(1, "Size").unwrap(), &[3.0]);
//! assert_eq!(msr.cell(2, "Mean").unwrap(), &[1.0]);
//! ```

pub mod error;
pub mod features;
pub mod geometry;
pub mod image;
pub mod paint;
pub mod table;
pub mod testing;
pub mod tool;
pub mod units;

mod scan;
