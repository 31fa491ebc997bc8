//! Umbrella crate that re-exports the `ivp-*` building blocks.
//!
//! `core` holds the decision domain and piecewise function model, `solve` the search over sets
//! of those functions.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

#[cfg(feature = "core")]
#[cfg_attr(docsrs, doc(cfg(feature = "core")))]
pub use ivp_core as core;

#[cfg(feature = "solve")]
#[cfg_attr(docsrs, doc(cfg(feature = "solve")))]
pub use ivp_solve as solve;

#[cfg(feature = "solve")]
#[cfg_attr(docsrs, doc(cfg(feature = "solve")))]
pub use ivp_solve::{Problem, Solution, Solver};
