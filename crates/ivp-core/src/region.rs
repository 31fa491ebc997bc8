use crate::{Bounds, Utility};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One piece of a piecewise function: a box plus the utility valid throughout it.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Region {
    pub bounds: Bounds,
    pub utility: Utility,
}

impl Region {
    pub fn new(bounds: impl Into<Bounds>, utility: Utility) -> Self {
        Self {
            bounds: bounds.into(),
            utility,
        }
    }

    pub fn dim(&self) -> usize {
        self.bounds.dim()
    }

    /// Overlap of two regions.
    ///
    /// The result carries the sum of both utilities: the overlap of two (weighted) pieces is
    /// worth both contributions. Neither input is modified.
    pub fn intersect(&self, other: &Region) -> Option<Region> {
        let mut out = Region::default();
        if self.intersect_into(other, &mut out) {
            Some(out)
        } else {
            None
        }
    }

    /// Allocation-free form of [`Region::intersect`]; `out` is left untouched on `false`.
    pub fn intersect_into(&self, other: &Region, out: &mut Region) -> bool {
        if !self.bounds.intersect_into(&other.bounds, &mut out.bounds) {
            return false;
        }
        out.utility.assign_sum(&self.utility, &other.utility);
        true
    }

    pub fn max_value(&self) -> Option<f64> {
        self.utility.max_over(&self.bounds)
    }

    pub fn min_value(&self) -> Option<f64> {
        self.utility.min_over(&self.bounds)
    }

    /// Maximizing point of this region and its value.
    pub fn max_point(&self) -> Option<(Vec<i64>, f64)> {
        let mut point = Vec::with_capacity(self.dim());
        let value = self.utility.argmax_over(&self.bounds, &mut point)?;
        Some((point, value))
    }

    pub fn contains_point(&self, point: &[i64]) -> bool {
        self.bounds.contains_point(point)
    }

    /// Overwrite `self` with a copy of `other`, reusing storage.
    pub fn assign(&mut self, other: &Region) {
        self.bounds.assign(&other.bounds);
        self.utility.assign(&other.utility);
    }
}
