use ivp_core::BuildError;
use thiserror::Error;

/// Errors raised before a solve starts.
///
/// An empty result (no functions, disjoint coverage, everything pruned) is not an error; the
/// solver reports it as `Ok(None)`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SolveError {
    #[error("epsilon must be finite and non-negative, got {0}")]
    InvalidEpsilon(f64),

    #[error("{count} functions exceed the configured limit of {max}")]
    TooManyFunctions { count: usize, max: usize },

    #[error("function {function} spans {found} dimensions, the domain has {expected}")]
    DimensionMismatch {
        function: usize,
        expected: usize,
        found: usize,
    },

    #[error(transparent)]
    Build(#[from] BuildError),
}

pub type Result<T> = std::result::Result<T, SolveError>;
