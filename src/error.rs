//! Error types for the measurement engine.

/// Errors produced while building a measurement table or running a
/// measurement.
///
/// Any error aborts the current `measure` call; no partial table is
/// returned. Object ids that are absent from the label image are *not*
/// errors — their rows simply stay zero.
#[derive(Debug, thiserror::Error)]
pub enum MeasureError {
    /// An input image does not satisfy a feature's requirements.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A requested feature needs a grey-value image, but none was supplied.
    #[error("feature '{0}' requires a grey-value image")]
    MissingGrey(String),

    /// Label and grey image geometries differ.
    #[error("label and grey image sizes differ: {label:?} vs {grey:?}")]
    GeometryMismatch {
        label: Vec<usize>,
        grey: Vec<usize>,
    },

    /// A feature name is not present in the registry.
    #[error("unknown feature: {0}")]
    UnknownFeature(String),

    /// Composite dependency resolution found a cycle.
    #[error("cyclic dependency involving feature '{0}'")]
    CyclicDependency(String),

    /// A feature with this name is already present in the table.
    #[error("feature already present: {0}")]
    DuplicateName(String),

    /// An object with this id is already present in the table.
    #[error("object already present: {0}")]
    DuplicateId(u32),

    /// Schema mutation was attempted after the table was forged.
    #[error("measurement table is already forged")]
    TableForged,

    /// `forge()` was called with no features or no objects.
    #[error("attempting to forge an empty table")]
    EmptyTable,

    /// A feature declared zero values.
    #[error("a feature needs at least one value")]
    EmptySchema,

    /// The measurement was cancelled through its cancellation token.
    #[error("measurement cancelled")]
    Cancelled,
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, MeasureError>;
