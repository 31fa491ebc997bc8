use crate::{Bounds, BuildError, Domain, Interval, Region, Result, SpatialIndex};

#[cfg(feature = "serde")]
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// An objective function in box-decomposed form.
///
/// The regions partition (a subset of) the domain: they never overlap, and points outside every
/// region are not covered by the function at all. A spatial index over the regions is built on
/// construction.
///
/// The function is immutable while a solve reads it, so it can be shared between solvers
/// running on different threads.
#[derive(Debug, Clone)]
pub struct PiecewiseFunction {
    domain: Domain,
    regions: Vec<Region>,
    index: SpatialIndex,
    priority: f64,
    label: Option<String>,
}

impl PiecewiseFunction {
    /// Validate the partition and build its spatial index.
    ///
    /// Rejects regions of the wrong dimension, regions that are empty or leave the domain,
    /// non-finite utility coefficients, and overlapping regions. An empty region list is
    /// accepted; such a function simply covers nothing.
    pub fn new(domain: Domain, regions: Vec<Region>) -> Result<Self> {
        let dim = domain.len();
        for (i, region) in regions.iter().enumerate() {
            if region.dim() != dim {
                return Err(BuildError::DimensionMismatch {
                    expected: dim,
                    found: region.dim(),
                });
            }
            if region.utility.term_dim() > dim {
                return Err(BuildError::DimensionMismatch {
                    expected: dim,
                    found: region.utility.term_dim(),
                });
            }
            for (d, (iv, var)) in region.bounds.intervals().iter().zip(domain.vars()).enumerate() {
                if iv.is_empty() {
                    return Err(BuildError::EmptyRegion { region: i, dim: d });
                }
                if iv.effective_lo() < 0 || iv.effective_hi() > var.max_index() {
                    return Err(BuildError::RegionOutOfDomain { region: i, dim: d });
                }
            }
            if !region.utility.is_finite() {
                return Err(BuildError::NonFiniteUtility { region: i });
            }
        }

        let index = SpatialIndex::new(&domain, &regions);

        let mut scratch = Vec::new();
        for (i, region) in regions.iter().enumerate() {
            index.candidates_into(&regions, &region.bounds, &mut scratch);
            if let Some(&j) = scratch.iter().find(|&&j| j > i) {
                return Err(BuildError::OverlappingRegions {
                    first: i,
                    second: j,
                });
            }
        }

        Ok(Self {
            domain,
            regions,
            index,
            priority: 1.0,
            label: None,
        })
    }

    /// Set the priority weight. Negative or non-finite weights are rejected.
    pub fn with_priority(mut self, priority: f64) -> Result<Self> {
        if !priority.is_finite() || priority < 0.0 {
            return Err(BuildError::InvalidPriority(priority));
        }
        self.priority = priority;
        Ok(self)
    }

    /// Attach a label naming the behavior that produced this function.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Rebuild the spatial index with explicit cell widths.
    pub fn with_index_cells(mut self, widths: &[u32]) -> Self {
        self.index = SpatialIndex::with_cell_width(&self.domain, &self.regions, widths);
        self
    }

    pub fn domain(&self) -> &Domain {
        &self.domain
    }

    pub fn dim(&self) -> usize {
        self.domain.len()
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    pub fn region(&self, i: usize) -> Option<&Region> {
        self.regions.get(i)
    }

    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    pub fn index(&self) -> &SpatialIndex {
        &self.index
    }

    pub fn priority(&self) -> f64 {
        self.priority
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Indices of the regions intersecting `query`, ascending. See
    /// [`SpatialIndex::candidates_into`].
    pub fn candidates_into(&self, query: &Bounds, out: &mut Vec<usize>) {
        self.index.candidates_into(&self.regions, query, out);
    }

    pub fn candidates(&self, query: &Bounds) -> Vec<usize> {
        self.index.candidates(&self.regions, query)
    }

    /// Cheap upper bound on this function's value anywhere in `query`.
    pub fn upper_bound(&self, query: &Bounds) -> Option<f64> {
        self.index.upper_bound(query)
    }

    pub fn max_value(&self) -> Option<f64> {
        self.regions
            .iter()
            .filter_map(Region::max_value)
            .reduce(f64::max)
    }

    pub fn min_value(&self) -> Option<f64> {
        self.regions
            .iter()
            .filter_map(Region::min_value)
            .reduce(f64::min)
    }

    /// The function's global maximizing point and value (first region wins ties).
    pub fn max_point(&self) -> Option<(Vec<i64>, f64)> {
        let mut best: Option<(Vec<i64>, f64)> = None;
        for region in &self.regions {
            let Some((point, value)) = region.max_point() else {
                continue;
            };
            match &best {
                Some((_, best_value)) if value <= *best_value => {}
                _ => best = Some((point, value)),
            }
        }
        best
    }

    /// Value at a single point, or `None` when no region covers it.
    pub fn eval_point(&self, point: &[i64]) -> Option<f64> {
        if point.len() != self.dim() {
            return None;
        }
        let query = Bounds::point(point);
        let first = self.candidates(&query).into_iter().next()?;
        Some(self.regions[first].utility.eval(point))
    }

    /// Multiply every region's utility by `weight`.
    pub fn scale(&mut self, weight: f64) {
        for region in self.regions.iter_mut() {
            region.utility.scale(weight);
        }
        self.index.refresh_bounds(&self.regions);
    }

    /// Add `amount` to every region's utility.
    pub fn shift(&mut self, amount: f64) {
        for region in self.regions.iter_mut() {
            region.utility.shift(amount);
        }
        self.index.refresh_bounds(&self.regions);
    }

    /// Affinely map the function's value range onto `[base, base + range]`.
    ///
    /// No-op for empty or flat functions.
    pub fn normalize(&mut self, base: f64, range: f64) {
        let (Some(min), Some(max)) = (self.min_value(), self.max_value()) else {
            return;
        };
        let existing = max - min;
        if existing <= 0.0 {
            return;
        }

        for region in self.regions.iter_mut() {
            region.utility.shift(-min);
            region.utility.scale(range / existing);
            region.utility.shift(base);
        }
        self.index.refresh_bounds(&self.regions);
    }

    /// Re-express this function over a larger domain.
    ///
    /// Every variable of the function must exist, identically defined, in `target`. Dimensions
    /// the function does not mention span their full range, and utility terms follow their
    /// variable by name.
    pub fn align_to(&self, target: &Domain) -> Result<Self> {
        if self.domain == *target {
            return Ok(self.clone());
        }
        if self.domain.len() > target.len() {
            return Err(BuildError::DimensionMismatch {
                expected: target.len(),
                found: self.domain.len(),
            });
        }

        let mut placement = Vec::with_capacity(self.domain.len());
        for var in self.domain.vars() {
            let t = target
                .index_of(&var.name)
                .ok_or_else(|| BuildError::UnknownVariable(var.name.clone()))?;
            if target.vars()[t] != *var {
                return Err(BuildError::DomainMismatch(var.name.clone()));
            }
            placement.push(t);
        }

        let universe = target.universe();
        let regions = self
            .regions
            .iter()
            .map(|region| {
                let mut dims: Vec<Interval> = universe.intervals().to_vec();
                for (d, &t) in placement.iter().enumerate() {
                    dims[t] = *region.bounds.interval(d);
                }
                Region::new(dims, region.utility.remap(&placement, target.len()))
            })
            .collect();

        let mut aligned = PiecewiseFunction::new(target.clone(), regions)?;
        aligned.priority = self.priority;
        aligned.label = self.label.clone();
        Ok(aligned)
    }
}

#[cfg(feature = "serde")]
#[derive(Serialize, Deserialize)]
struct PiecewiseFunctionSerde {
    domain: Domain,
    regions: Vec<Region>,
    priority: f64,
    #[serde(default)]
    label: Option<String>,
}

#[cfg(feature = "serde")]
impl Serialize for PiecewiseFunction {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        PiecewiseFunctionSerde {
            domain: self.domain.clone(),
            regions: self.regions.clone(),
            priority: self.priority,
            label: self.label.clone(),
        }
        .serialize(serializer)
    }
}

#[cfg(feature = "serde")]
impl<'de> Deserialize<'de> for PiecewiseFunction {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let data = PiecewiseFunctionSerde::deserialize(deserializer)?;
        let mut function =
            PiecewiseFunction::new(data.domain, data.regions).map_err(serde::de::Error::custom)?;
        function = function
            .with_priority(data.priority)
            .map_err(serde::de::Error::custom)?;
        function.label = data.label;
        Ok(function)
    }
}
