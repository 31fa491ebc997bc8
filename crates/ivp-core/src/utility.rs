use crate::{Bounds, Interval};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Utility descriptor carried by a region.
///
/// A separable polynomial in point-index coordinates:
///
/// ```text
/// u(x) = intercept + Σ slopes[d]·x[d] + Σ squares[d]·x[d]²
/// ```
///
/// Empty `slopes` / `squares` stand for all-zero terms, so a constant descriptor carries no
/// per-dimension storage. Separability makes every max/min query exact over the integer points
/// of a box: each dimension is optimized independently.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Utility {
    intercept: f64,
    #[cfg_attr(feature = "serde", serde(default))]
    slopes: Vec<f64>,
    #[cfg_attr(feature = "serde", serde(default))]
    squares: Vec<f64>,
}

impl Utility {
    pub fn constant(value: f64) -> Self {
        Self {
            intercept: value,
            slopes: Vec::new(),
            squares: Vec::new(),
        }
    }

    pub fn linear(slopes: Vec<f64>, intercept: f64) -> Self {
        Self {
            intercept,
            slopes,
            squares: Vec::new(),
        }
    }

    /// `squares` and `slopes` must have the same length (or `slopes` may be empty).
    pub fn quadratic(squares: Vec<f64>, slopes: Vec<f64>, intercept: f64) -> Self {
        Self {
            intercept,
            slopes,
            squares,
        }
    }

    /// 0 (constant), 1 (linear) or 2 (quadratic).
    pub fn degree(&self) -> u8 {
        if !self.squares.is_empty() {
            2
        } else if !self.slopes.is_empty() {
            1
        } else {
            0
        }
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    pub fn slopes(&self) -> &[f64] {
        &self.slopes
    }

    pub fn squares(&self) -> &[f64] {
        &self.squares
    }

    /// Number of dimensions the non-constant terms refer to (0 for constants).
    pub fn term_dim(&self) -> usize {
        self.slopes.len().max(self.squares.len())
    }

    pub fn is_finite(&self) -> bool {
        self.intercept.is_finite()
            && self.slopes.iter().all(|w| w.is_finite())
            && self.squares.iter().all(|w| w.is_finite())
    }

    fn slope(&self, d: usize) -> f64 {
        self.slopes.get(d).copied().unwrap_or(0.0)
    }

    fn square(&self, d: usize) -> f64 {
        self.squares.get(d).copied().unwrap_or(0.0)
    }

    pub fn eval(&self, point: &[i64]) -> f64 {
        let mut value = self.intercept;
        for (d, &p) in point.iter().enumerate() {
            let x = p as f64;
            value += self.slope(d) * x + self.square(d) * x * x;
        }
        value
    }

    /// Maximum over the integer points of `bounds`; `None` for empty bounds.
    pub fn max_over(&self, bounds: &Bounds) -> Option<f64> {
        self.extreme_over(bounds, Extreme::Max, None)
    }

    /// Minimum over the integer points of `bounds`; `None` for empty bounds.
    pub fn min_over(&self, bounds: &Bounds) -> Option<f64> {
        self.extreme_over(bounds, Extreme::Min, None)
    }

    /// Maximum over `bounds`, writing the maximizing point into `point`.
    ///
    /// Ties along a dimension resolve to the lowest index, except that a dimension with no
    /// variation resolves to the midpoint of its interval.
    pub fn argmax_over(&self, bounds: &Bounds, point: &mut Vec<i64>) -> Option<f64> {
        point.clear();
        self.extreme_over(bounds, Extreme::Max, Some(point))
    }

    fn extreme_over(
        &self,
        bounds: &Bounds,
        extreme: Extreme,
        mut point: Option<&mut Vec<i64>>,
    ) -> Option<f64> {
        if bounds.is_empty() || self.term_dim() > bounds.dim() {
            return None;
        }

        let mut value = self.intercept;
        for (d, iv) in bounds.intervals().iter().enumerate() {
            let (x, v) = term_extreme(self.square(d), self.slope(d), iv, extreme);
            value += v;
            if let Some(point) = point.as_deref_mut() {
                point.push(x);
            }
        }
        Some(value)
    }

    pub fn scale(&mut self, weight: f64) {
        self.intercept *= weight;
        self.slopes.iter_mut().for_each(|w| *w *= weight);
        self.squares.iter_mut().for_each(|w| *w *= weight);
    }

    pub fn shift(&mut self, amount: f64) {
        self.intercept += amount;
    }

    /// Overwrite `self` with `a + b`, reusing storage.
    pub fn assign_sum(&mut self, a: &Utility, b: &Utility) {
        self.intercept = a.intercept + b.intercept;
        sum_terms(&mut self.slopes, &a.slopes, &b.slopes);
        sum_terms(&mut self.squares, &a.squares, &b.squares);
    }

    /// Overwrite `self` with a copy of `other`, reusing storage.
    pub fn assign(&mut self, other: &Utility) {
        self.intercept = other.intercept;
        self.slopes.clear();
        self.slopes.extend_from_slice(&other.slopes);
        self.squares.clear();
        self.squares.extend_from_slice(&other.squares);
    }

    /// Re-place per-dimension terms: dimension `d` moves to `placement[d]` in a space of
    /// `new_dim` dimensions. New dimensions get zero coefficients.
    pub fn remap(&self, placement: &[usize], new_dim: usize) -> Utility {
        let remap_terms = |terms: &[f64]| -> Vec<f64> {
            if terms.is_empty() {
                return Vec::new();
            }
            let mut out = vec![0.0; new_dim];
            for (d, &w) in terms.iter().enumerate() {
                out[placement[d]] = w;
            }
            out
        };
        Utility {
            intercept: self.intercept,
            slopes: remap_terms(&self.slopes),
            squares: remap_terms(&self.squares),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Extreme {
    Max,
    Min,
}

fn sum_terms(out: &mut Vec<f64>, a: &[f64], b: &[f64]) {
    out.clear();
    let n = a.len().max(b.len());
    out.extend((0..n).map(|d| {
        a.get(d).copied().unwrap_or(0.0) + b.get(d).copied().unwrap_or(0.0)
    }));
}

/// Extreme of `q·x² + l·x` over the integer points of `iv`.
fn term_extreme(q: f64, l: f64, iv: &Interval, extreme: Extreme) -> (i64, f64) {
    let lo = iv.effective_lo();
    let hi = iv.effective_hi();

    if q == 0.0 && l == 0.0 {
        return (iv.midpoint(), 0.0);
    }

    let f = |x: i64| {
        let x = x as f64;
        q * x * x + l * x
    };
    let better = |a: f64, b: f64| match extreme {
        Extreme::Max => a > b,
        Extreme::Min => a < b,
    };

    let mut best_x = lo;
    let mut best_v = f(lo);
    let mut consider = |x: i64| {
        let v = f(x);
        if better(v, best_v) {
            best_x = x;
            best_v = v;
        }
    };

    // An interior vertex only matters when the parabola opens toward the extreme we want.
    let vertex_counts = match extreme {
        Extreme::Max => q < 0.0,
        Extreme::Min => q > 0.0,
    };
    if vertex_counts {
        let vertex = -l / (2.0 * q);
        if vertex > lo as f64 && vertex < hi as f64 {
            consider(vertex.floor() as i64);
            consider(vertex.ceil() as i64);
        }
    }
    consider(hi);

    (best_x, best_v)
}
