use thiserror::Error;

/// Top-level error type for the patchwork geometry kernel.
#[derive(Debug, Error)]
pub enum PatchworkError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Continuity(#[from] ContinuityError),

    #[error(transparent)]
    Iges(#[from] IgesError),
}

/// Errors related to geometric construction and evaluation.
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("parameter {parameter} = {value} is out of range [{min}, {max}]")]
    ParameterOutOfRange {
        parameter: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("weight {value} at control point {index} must be strictly positive")]
    InvalidWeight { index: usize, value: f64 },

    #[error("invalid knot vector: {0}")]
    InvalidKnots(String),

    #[error("control net shape mismatch: {0}")]
    ShapeMismatch(String),

    #[error("degenerate geometry: {0}")]
    Degenerate(String),

    #[error("zero-length vector")]
    ZeroVector,
}

/// Errors raised while enforcing or verifying continuity between boundaries.
#[derive(Debug, Error)]
pub enum ContinuityError {
    #[error("incompatible edges: target {target_edge} cannot be matched to source {source_edge}")]
    IncompatibleEdge {
        target_edge: String,
        source_edge: String,
    },

    #[error("tension factor must be finite and positive, got {0}")]
    InvalidTension(f64),

    #[error("control rows of {target_edge} overlap those of {source_edge} on the same net")]
    OverlappingRows {
        target_edge: String,
        source_edge: String,
    },

    #[error("weights next to {target_edge} or {source_edge} are not proportional along the edge")]
    NonSeparableWeights {
        target_edge: String,
        source_edge: String,
    },
}

/// Errors related to IGES generation and parsing.
#[derive(Debug, Error)]
pub enum IgesError {
    #[error("unsupported unit: {0:?}")]
    UnsupportedUnit(String),

    #[error("entity of type {entity_type} points at an entity that is not registered in the model")]
    UnresolvedReference { entity_type: u16 },

    #[error("malformed IGES data: {0}")]
    Parse(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for results using [`PatchworkError`].
pub type Result<T> = std::result::Result<T, PatchworkError>;
