//! Decision domains, box regions, piecewise-defined objective functions and their spatial index.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod bounds;
pub mod domain;
pub mod error;
pub mod function;
pub mod grid;
pub mod region;
pub mod utility;

pub use bounds::{Bounds, Interval};
pub use domain::{Domain, DomainVar, Snap};
pub use error::{BuildError, Result};
pub use function::PiecewiseFunction;
pub use grid::SpatialIndex;
pub use region::Region;
pub use utility::Utility;
