//! Exact maximization of a sum of piecewise-defined objective functions.
//!
//! [`Solver`] runs the box-decomposition search over functions built with `ivp-core`;
//! [`Problem`] wraps it with per-function priority weighting and normalization.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod aggregate;
pub mod config;
pub mod error;
pub mod problem;
pub mod solver;
pub mod trace;

pub use aggregate::{Aggregator, Evaluation, ExactAggregator, Leaf, ScanAggregator};
pub use config::{ProblemConfig, Seeding, SolverConfig};
pub use error::{Result, SolveError};
pub use problem::Problem;
pub use solver::{Solution, SolveStats, Solver};
pub use trace::{NullSolveSink, SolveEvent, SolveSink, VecSolveSink};
