use crate::{Bounds, BuildError, Interval, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One named, uniformly sampled decision variable.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DomainVar {
    pub name: String,
    pub low: f64,
    pub high: f64,
    pub points: u32,
}

impl DomainVar {
    pub fn delta(&self) -> f64 {
        if self.points > 1 {
            (self.high - self.low) / (self.points as f64 - 1.0)
        } else {
            0.0
        }
    }

    /// Highest valid point index.
    pub fn max_index(&self) -> i64 {
        self.points as i64 - 1
    }
}

/// How a continuous value is settled onto the discrete points of a variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Snap {
    Floor,
    Ceil,
    Nearest,
}

/// The decision space: an ordered list of discrete variables.
///
/// Regions and utility descriptors address the domain by point index, so `x = j` on variable
/// `i` stands for the value `low_i + delta_i * j`.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Domain {
    vars: Vec<DomainVar>,
}

impl Domain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`Domain::add_var`].
    pub fn with_var(
        mut self,
        name: impl Into<String>,
        low: f64,
        high: f64,
        points: u32,
    ) -> Result<Self> {
        self.add_var(name, low, high, points)?;
        Ok(self)
    }

    pub fn add_var(
        &mut self,
        name: impl Into<String>,
        low: f64,
        high: f64,
        points: u32,
    ) -> Result<()> {
        let name = name.into();
        if self.index_of(&name).is_some() {
            return Err(BuildError::DuplicateVariable(name));
        }

        // A single point is only meaningful when the variable is pinned to one value.
        let valid = low.is_finite()
            && high.is_finite()
            && low <= high
            && points >= 1
            && (points > 1 || low == high);
        if !valid {
            return Err(BuildError::InvalidVariable {
                name,
                low,
                high,
                points,
            });
        }

        self.vars.push(DomainVar {
            name,
            low,
            high,
            points,
        });
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    pub fn vars(&self) -> &[DomainVar] {
        &self.vars
    }

    pub fn var(&self, i: usize) -> Option<&DomainVar> {
        self.vars.get(i)
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.vars.iter().position(|v| v.name == name)
    }

    pub fn has_var(&self, name: &str) -> bool {
        self.index_of(name).is_some()
    }

    /// Number of points of variable `i` (zero when out of range).
    pub fn points(&self, i: usize) -> u32 {
        self.vars.get(i).map(|v| v.points).unwrap_or(0)
    }

    pub fn total_points(&self) -> f64 {
        self.vars.iter().map(|v| v.points as f64).product()
    }

    /// Value of variable `i` at point index `j`.
    pub fn value_at(&self, i: usize, j: i64) -> Option<f64> {
        let var = self.vars.get(i)?;
        if j < 0 || j > var.max_index() {
            return None;
        }
        Some(var.low + var.delta() * j as f64)
    }

    /// Settle a continuous value onto a point index of variable `i`.
    ///
    /// Values outside the variable's range clamp to the first / last point.
    pub fn discrete_index(&self, i: usize, value: f64, snap: Snap) -> Option<i64> {
        let var = self.vars.get(i)?;
        if value <= var.low {
            return Some(0);
        }
        if value >= var.high {
            return Some(var.max_index());
        }

        let steps = (value - var.low) / var.delta();
        let idx = match snap {
            Snap::Floor => steps.floor(),
            Snap::Ceil => steps.ceil(),
            Snap::Nearest => steps.round(),
        };
        Some((idx as i64).clamp(0, var.max_index()))
    }

    /// Bounds spanning every point of every variable.
    pub fn universe(&self) -> Bounds {
        Bounds::new(
            self.vars
                .iter()
                .map(|v| Interval::closed(0, v.max_index()))
                .collect(),
        )
    }
}
