//! Interior optimization of fully resolved leaves.

use ivp_core::{Bounds, Region, Utility};

/// A fully resolved search leaf: one piece chosen from every function.
///
/// The region's bounds are the intersection of the chosen pieces and its utility is their
/// (already weighted) sum.
#[derive(Debug, Clone, Copy)]
pub struct Leaf<'a> {
    region: &'a Region,
    pieces: &'a [usize],
}

impl<'a> Leaf<'a> {
    pub fn new(region: &'a Region, pieces: &'a [usize]) -> Self {
        Self { region, pieces }
    }

    pub fn region(&self) -> &'a Region {
        self.region
    }

    pub fn bounds(&self) -> &'a Bounds {
        &self.region.bounds
    }

    pub fn utility(&self) -> &'a Utility {
        &self.region.utility
    }

    /// Piece index chosen in each function, in function order.
    pub fn pieces(&self) -> &'a [usize] {
        self.pieces
    }
}

/// Best value inside a leaf and the point where it is attained.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub value: f64,
    pub point: Vec<i64>,
}

/// Strategy for finding the best point of a leaf.
///
/// Implementations are pure: the same leaf always yields the same evaluation.
pub trait Aggregator {
    /// `None` rejects the leaf (degenerate bounds or a non-finite value).
    fn evaluate(&self, leaf: &Leaf<'_>) -> Option<Evaluation>;
}

/// Closed-form evaluation of separable utilities.
///
/// Constants resolve to the midpoint of the leaf, linear terms to the corner picked by slope
/// signs, and quadratic terms to the integer point nearest the vertex when it lies inside.
#[derive(Debug, Default, Clone, Copy)]
pub struct ExactAggregator;

impl Aggregator for ExactAggregator {
    fn evaluate(&self, leaf: &Leaf<'_>) -> Option<Evaluation> {
        let bounds = leaf.bounds();
        let utility = leaf.utility();

        let (value, point) = if utility.degree() == 0 {
            if bounds.is_empty() {
                return None;
            }
            (utility.intercept(), bounds.midpoint())
        } else {
            let mut point = Vec::with_capacity(bounds.dim());
            let value = utility.argmax_over(bounds, &mut point)?;
            (value, point)
        };

        value.is_finite().then_some(Evaluation { value, point })
    }
}

/// Evaluates every integer point of the leaf.
///
/// Only practical for small leaves; serves as a reference for [`ExactAggregator`] and for
/// utilities whose closed form should not be trusted.
#[derive(Debug, Clone, Copy)]
pub struct ScanAggregator {
    /// Leaves with more points than this are rejected.
    pub max_points: u64,
}

impl Default for ScanAggregator {
    fn default() -> Self {
        Self {
            max_points: 1 << 20,
        }
    }
}

impl Aggregator for ScanAggregator {
    fn evaluate(&self, leaf: &Leaf<'_>) -> Option<Evaluation> {
        let bounds = leaf.bounds();
        if bounds.is_empty() || bounds.point_count() > self.max_points {
            return None;
        }

        let intervals = bounds.intervals();
        let mut point: Vec<i64> = intervals.iter().map(|iv| iv.effective_lo()).collect();
        let mut best: Option<Evaluation> = None;

        loop {
            let value = leaf.utility().eval(&point);
            match &best {
                Some(b) if value <= b.value => {}
                _ => {
                    best = Some(Evaluation {
                        value,
                        point: point.clone(),
                    })
                }
            }

            // Odometer, last dimension fastest.
            let mut d = point.len();
            loop {
                if d == 0 {
                    return best.filter(|b| b.value.is_finite());
                }
                d -= 1;
                if point[d] < intervals[d].effective_hi() {
                    point[d] += 1;
                    break;
                }
                point[d] = intervals[d].effective_lo();
            }
        }
    }
}
