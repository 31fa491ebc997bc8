use core::cmp::Ordering;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A range of point indices along one dimension.
///
/// Each edge is either inclusive (`[`, `]`) or exclusive (`(`, `)`). Because the domain is
/// discrete, an exclusive edge simply moves the effective edge one point inward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Interval {
    pub lo: i64,
    pub hi: i64,
    pub lo_inclusive: bool,
    pub hi_inclusive: bool,
}

impl Interval {
    pub const fn new(lo: i64, hi: i64, lo_inclusive: bool, hi_inclusive: bool) -> Self {
        Self {
            lo,
            hi,
            lo_inclusive,
            hi_inclusive,
        }
    }

    /// `[lo, hi]`
    pub const fn closed(lo: i64, hi: i64) -> Self {
        Self::new(lo, hi, true, true)
    }

    /// `[lo, hi)`
    pub const fn closed_open(lo: i64, hi: i64) -> Self {
        Self::new(lo, hi, true, false)
    }

    /// `[p, p]`
    pub const fn point(p: i64) -> Self {
        Self::closed(p, p)
    }

    /// Covered point indices as `(first, last)`, or `None` when the interval is empty.
    ///
    /// An exclusive edge at the end of the `i64` range covers nothing past it.
    pub fn effective_range(&self) -> Option<(i64, i64)> {
        let lo = if self.lo_inclusive {
            self.lo
        } else {
            self.lo.checked_add(1)?
        };
        let hi = if self.hi_inclusive {
            self.hi
        } else {
            self.hi.checked_sub(1)?
        };
        (lo <= hi).then_some((lo, hi))
    }

    /// First point index actually covered (saturating for empty intervals).
    pub fn effective_lo(&self) -> i64 {
        if self.lo_inclusive {
            self.lo
        } else {
            self.lo.saturating_add(1)
        }
    }

    /// Last point index actually covered (saturating for empty intervals).
    pub fn effective_hi(&self) -> i64 {
        if self.hi_inclusive {
            self.hi
        } else {
            self.hi.saturating_sub(1)
        }
    }

    pub fn is_empty(&self) -> bool {
        self.effective_range().is_none()
    }

    pub fn contains(&self, p: i64) -> bool {
        self.effective_range()
            .is_some_and(|(lo, hi)| p >= lo && p <= hi)
    }

    /// Number of covered points (saturating).
    pub fn len(&self) -> u64 {
        match self.effective_range() {
            Some((lo, hi)) => hi.abs_diff(lo).saturating_add(1),
            None => 0,
        }
    }

    /// Midpoint of the covered points, rounded down.
    pub fn midpoint(&self) -> i64 {
        let lo = self.effective_lo();
        let hi = self.effective_hi().max(lo);
        lo + (hi.abs_diff(lo) / 2) as i64
    }

    pub fn intersect(&self, other: &Interval) -> Option<Interval> {
        let (lo, lo_inclusive) = match self.lo.cmp(&other.lo) {
            Ordering::Greater => (self.lo, self.lo_inclusive),
            Ordering::Less => (other.lo, other.lo_inclusive),
            Ordering::Equal => (self.lo, self.lo_inclusive && other.lo_inclusive),
        };
        let (hi, hi_inclusive) = match self.hi.cmp(&other.hi) {
            Ordering::Less => (self.hi, self.hi_inclusive),
            Ordering::Greater => (other.hi, other.hi_inclusive),
            Ordering::Equal => (self.hi, self.hi_inclusive && other.hi_inclusive),
        };

        let out = Interval::new(lo, hi, lo_inclusive, hi_inclusive);
        if out.is_empty() {
            None
        } else {
            Some(out)
        }
    }

    pub fn overlaps(&self, other: &Interval) -> bool {
        match (self.effective_range(), other.effective_range()) {
            (Some((a_lo, a_hi)), Some((b_lo, b_hi))) => a_lo.max(b_lo) <= a_hi.min(b_hi),
            _ => false,
        }
    }
}

/// An axis-aligned box: one [`Interval`] per decision dimension.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Bounds {
    dims: Vec<Interval>,
}

impl Bounds {
    pub fn new(dims: Vec<Interval>) -> Self {
        Self { dims }
    }

    /// A single-point box.
    pub fn point(point: &[i64]) -> Self {
        Self::new(point.iter().map(|&p| Interval::point(p)).collect())
    }

    pub fn dim(&self) -> usize {
        self.dims.len()
    }

    pub fn intervals(&self) -> &[Interval] {
        &self.dims
    }

    pub fn interval(&self, d: usize) -> &Interval {
        &self.dims[d]
    }

    /// True when any dimension is empty (the canonical "no intersection" shape).
    pub fn is_empty(&self) -> bool {
        self.dims.iter().any(Interval::is_empty)
    }

    pub fn is_point(&self) -> bool {
        !self.dims.is_empty() && self.dims.iter().all(|i| i.len() == 1)
    }

    pub fn contains_point(&self, point: &[i64]) -> bool {
        point.len() == self.dims.len() && self.dims.iter().zip(point).all(|(i, &p)| i.contains(p))
    }

    pub fn overlaps(&self, other: &Bounds) -> bool {
        self.dims.len() == other.dims.len()
            && self.dims.iter().zip(&other.dims).all(|(a, b)| a.overlaps(b))
    }

    /// Number of integer points covered (saturating).
    pub fn point_count(&self) -> u64 {
        self.dims
            .iter()
            .fold(1u64, |acc, i| acc.saturating_mul(i.len()))
    }

    pub fn midpoint(&self) -> Vec<i64> {
        self.dims.iter().map(Interval::midpoint).collect()
    }

    pub fn intersect(&self, other: &Bounds) -> Option<Bounds> {
        let mut out = Bounds::default();
        if self.intersect_into(other, &mut out) {
            Some(out)
        } else {
            None
        }
    }

    /// Write `self ∩ other` into `out`, reusing its storage.
    ///
    /// Returns `false` when the boxes do not intersect (or differ in dimension); `out` is then
    /// left untouched.
    pub fn intersect_into(&self, other: &Bounds, out: &mut Bounds) -> bool {
        if !self.overlaps(other) {
            return false;
        }
        out.dims.clear();
        for (a, b) in self.dims.iter().zip(&other.dims) {
            match a.intersect(b) {
                Some(i) => out.dims.push(i),
                None => return false,
            }
        }
        true
    }

    /// Overwrite `self` with a copy of `other`, reusing storage.
    pub fn assign(&mut self, other: &Bounds) {
        self.dims.clear();
        self.dims.extend_from_slice(&other.dims);
    }
}

impl From<Vec<Interval>> for Bounds {
    fn from(dims: Vec<Interval>) -> Self {
        Self::new(dims)
    }
}
