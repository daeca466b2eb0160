/// Error types for the math library and scene assembly
use thiserror::Error;

/// Numeric degeneracies reported by the math library.
///
/// These are per-frame conditions: callers log them and skip the affected
/// update instead of feeding NaN-filled matrices to the renderer.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MathError {
    #[error("cannot normalize a zero-length vector")]
    ZeroLengthVector,

    #[error("up vector is parallel to the viewing axis")]
    ParallelUpVector,

    #[error("invalid argument `{name}`: {reason}")]
    InvalidArgument {
        name: &'static str,
        reason: &'static str,
    },
}

/// Invalid primitive parameters handed to a geometry provider.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConstructionError {
    #[error("sphere slice count {0} is not divisible by two")]
    OddSliceCount(u32),

    #[error("sphere needs at least 4 slices, got {0}")]
    TooFewSlices(u32),

    #[error("sphere radius must be positive, got {0}")]
    NonPositiveRadius(f32),

    #[error("cube side length must be positive, got {0}")]
    NonPositiveSideLength(f32),

    #[error("{0} vertices do not fit a 16-bit index buffer")]
    TooManyVertices(usize),
}

/// Failure while assembling a scene or its camera.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SceneError {
    #[error(transparent)]
    Construction(#[from] ConstructionError),

    #[error(transparent)]
    Math(#[from] MathError),
}
