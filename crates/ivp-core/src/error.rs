use thiserror::Error;

/// Errors raised while building domains and piecewise functions.
///
/// These are validation failures of the input handed to the solver. They are never recovered
/// from by guessing a partition; the offending function is rejected as a whole.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BuildError {
    #[error("domain variable `{0}` is already defined")]
    DuplicateVariable(String),

    #[error("invalid domain variable `{name}`: low={low} high={high} points={points}")]
    InvalidVariable {
        name: String,
        low: f64,
        high: f64,
        points: u32,
    },

    #[error("unknown domain variable `{0}`")]
    UnknownVariable(String),

    #[error("dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch { expected: usize, found: usize },

    #[error("domain variable `{0}` differs between the function and the target domain")]
    DomainMismatch(String),

    #[error("region {region} lies outside the domain on dimension {dim}")]
    RegionOutOfDomain { region: usize, dim: usize },

    #[error("region {region} is empty on dimension {dim}")]
    EmptyRegion { region: usize, dim: usize },

    #[error("region {region} carries a non-finite utility coefficient")]
    NonFiniteUtility { region: usize },

    #[error("regions {first} and {second} overlap")]
    OverlappingRegions { first: usize, second: usize },

    #[error("invalid priority weight {0}")]
    InvalidPriority(f64),
}

pub type Result<T> = std::result::Result<T, BuildError>;
