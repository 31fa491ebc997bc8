use std::mem;

use ivp_core::{Bounds, BuildError, Domain, PiecewiseFunction, Region};
use serde::{Deserialize, Serialize};

use crate::{
    Aggregator, ExactAggregator, Leaf, NullSolveSink, Result, SolveError, SolveEvent, SolveSink,
    SolverConfig,
};

/// The best leaf found by a solve.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Solution {
    /// Intersection of the chosen pieces.
    pub bounds: Bounds,
    /// Aggregate (weighted) value at `point`.
    pub value: f64,
    /// Maximizing point, as point indices per domain variable.
    pub point: Vec<i64>,
    /// Piece index chosen in each function, in function order.
    pub pieces: Vec<usize>,
}

/// Counters from the most recent solve.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolveStats {
    /// Search nodes entered, leaves included.
    pub nodes: u64,
    pub leaves: u64,
    /// Candidate pieces whose intersection with the frontier came out empty.
    pub pruned_empty: u64,
    /// Subtrees skipped because their upper bound could not beat the best.
    pub pruned_bound: u64,
    pub improvements: u64,
}

/// Exhaustive box-decomposition search over a set of piecewise functions.
///
/// Function `d` is resolved at depth `d`: each of its pieces that intersects the current frontier
/// box opens a subtree, and every full-depth leaf is handed to an [`Aggregator`]. With bound
/// pruning on, subtrees that cannot beat the current best are skipped; the result is the same
/// either way.
///
/// A `Solver` owns its frontier arena and scratch buffers and reuses them across solves. It is
/// not shared between threads; run one `Solver` per thread over shared functions instead.
#[derive(Debug, Default)]
pub struct Solver {
    config: SolverConfig,
    frontier: Vec<Region>,
    candidates: Vec<Vec<usize>>,
    pieces: Vec<usize>,
    stats: SolveStats,
}

impl Solver {
    pub fn new(config: SolverConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn with_config(mut self, config: SolverConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Counters from the most recent solve.
    pub fn stats(&self) -> SolveStats {
        self.stats
    }

    /// Solve with the closed-form aggregator and no tracing.
    pub fn solve(
        &mut self,
        domain: &Domain,
        functions: &[PiecewiseFunction],
    ) -> Result<Option<Solution>> {
        self.solve_with(domain, functions, &ExactAggregator, &mut NullSolveSink, None)
    }

    /// Solve with an explicit aggregator, event sink and optional seed point.
    ///
    /// When `hint` is covered by every function, its aggregate value seeds the best solution
    /// before the search starts; a leaf must then beat it by more than `epsilon` to replace it.
    pub fn solve_with(
        &mut self,
        domain: &Domain,
        functions: &[PiecewiseFunction],
        aggregator: &dyn Aggregator,
        sink: &mut dyn SolveSink,
        hint: Option<&[i64]>,
    ) -> Result<Option<Solution>> {
        self.stats = SolveStats::default();
        self.check_inputs(domain, functions)?;

        let pieces: usize = functions.iter().map(PiecewiseFunction::len).sum();
        sink.emit(SolveEvent::Started {
            functions: functions.len(),
            pieces,
        });

        if functions.is_empty() || functions.iter().any(PiecewiseFunction::is_empty) {
            tracing::debug!(functions = functions.len(), "no solution: nothing to search");
            sink.emit(SolveEvent::Finished {
                value: None,
                stats: self.stats,
            });
            return Ok(None);
        }

        let n = functions.len();
        self.frontier.resize_with(n + 1, Region::default);
        self.frontier[0] = Region::new(domain.universe(), Default::default());
        self.candidates.resize_with(n, Vec::new);
        self.pieces.clear();
        self.pieces.resize(n, 0);

        let best = hint.and_then(|point| seed(functions, point));

        let mut search = Search {
            functions,
            aggregator,
            sink: &mut *sink,
            config: &self.config,
            frontier: mem::take(&mut self.frontier),
            candidates: mem::take(&mut self.candidates),
            pieces: mem::take(&mut self.pieces),
            best,
            stats: SolveStats::default(),
        };
        search.descend(0);

        let Search {
            frontier,
            candidates,
            pieces,
            best,
            stats,
            ..
        } = search;
        self.frontier = frontier;
        self.candidates = candidates;
        self.pieces = pieces;
        self.stats = stats;

        match &best {
            Some(solution) => tracing::debug!(
                functions = n,
                leaves = stats.leaves,
                nodes = stats.nodes,
                value = solution.value,
                "solve complete"
            ),
            None => tracing::debug!(
                functions = n,
                leaves = stats.leaves,
                nodes = stats.nodes,
                "no solution: every path pruned"
            ),
        }
        sink.emit(SolveEvent::Finished {
            value: best.as_ref().map(|s| s.value),
            stats,
        });

        Ok(best)
    }

    fn check_inputs(&self, domain: &Domain, functions: &[PiecewiseFunction]) -> Result<()> {
        let epsilon = self.config.epsilon;
        if !epsilon.is_finite() || epsilon < 0.0 {
            return Err(SolveError::InvalidEpsilon(epsilon));
        }
        if functions.len() > self.config.max_functions {
            return Err(SolveError::TooManyFunctions {
                count: functions.len(),
                max: self.config.max_functions,
            });
        }
        for (i, function) in functions.iter().enumerate() {
            if function.dim() != domain.len() {
                return Err(SolveError::DimensionMismatch {
                    function: i,
                    expected: domain.len(),
                    found: function.dim(),
                });
            }
            if let Some((var, _)) = function
                .domain()
                .vars()
                .iter()
                .zip(domain.vars())
                .find(|(a, b)| a != b)
            {
                return Err(BuildError::DomainMismatch(var.name.clone()).into());
            }
        }
        Ok(())
    }
}

/// Aggregate value at `point` if every function covers it.
fn seed(functions: &[PiecewiseFunction], point: &[i64]) -> Option<Solution> {
    let query = Bounds::point(point);
    let mut value = 0.0;
    let mut pieces = Vec::with_capacity(functions.len());
    for function in functions {
        let piece = *function.candidates(&query).first()?;
        value += function.eval_point(point)?;
        pieces.push(piece);
    }
    Some(Solution {
        bounds: query,
        value,
        point: point.to_vec(),
        pieces,
    })
}

/// State of one solve; borrows the solver's arena for its duration.
struct Search<'a> {
    functions: &'a [PiecewiseFunction],
    aggregator: &'a dyn Aggregator,
    sink: &'a mut dyn SolveSink,
    config: &'a SolverConfig,
    /// `frontier[d]` is the intersection of the pieces chosen at depths `< d`.
    frontier: Vec<Region>,
    candidates: Vec<Vec<usize>>,
    pieces: Vec<usize>,
    best: Option<Solution>,
    stats: SolveStats,
}

impl Search<'_> {
    fn descend(&mut self, depth: usize) {
        self.stats.nodes += 1;
        let functions = self.functions;
        if depth == functions.len() {
            self.evaluate_leaf();
            return;
        }
        if self.config.bound_pruning && self.cannot_improve(depth) {
            self.stats.pruned_bound += 1;
            return;
        }

        let function = &functions[depth];
        let mut candidates = mem::take(&mut self.candidates[depth]);
        function.candidates_into(&self.frontier[depth].bounds, &mut candidates);

        for &piece in &candidates {
            let Some(region) = function.region(piece) else {
                continue;
            };
            let (head, tail) = self.frontier.split_at_mut(depth + 1);
            if !head[depth].intersect_into(region, &mut tail[0]) {
                self.stats.pruned_empty += 1;
                continue;
            }
            self.pieces[depth] = piece;
            self.descend(depth + 1);
        }

        self.candidates[depth] = candidates;
    }

    /// True when nothing below `depth` can beat the current best by more than epsilon.
    fn cannot_improve(&self, depth: usize) -> bool {
        let Some(best) = &self.best else {
            return false;
        };
        let node = &self.frontier[depth];
        let Some(mut bound) = node.max_value() else {
            return true;
        };
        for function in &self.functions[depth..] {
            match function.upper_bound(&node.bounds) {
                Some(upper) => bound += upper,
                None => return true,
            }
        }
        // Summed maxima and the leaf's own closed form round differently.
        let slack = bound.abs().max(1.0) * 1e-12;
        bound + slack <= best.value + self.config.epsilon
    }

    fn evaluate_leaf(&mut self) {
        self.stats.leaves += 1;
        let region = &self.frontier[self.functions.len()];
        let leaf = Leaf::new(region, &self.pieces);
        let Some(eval) = self.aggregator.evaluate(&leaf) else {
            return;
        };

        if let Some(best) = &self.best {
            if eval.value <= best.value + self.config.epsilon {
                return;
            }
        }

        self.stats.improvements += 1;
        tracing::trace!(
            value = eval.value,
            leaf = self.stats.leaves,
            pieces = ?self.pieces,
            "improved best solution"
        );
        self.sink.emit(SolveEvent::Improved {
            value: eval.value,
            pieces: self.pieces.clone(),
        });
        self.best = Some(Solution {
            bounds: region.bounds.clone(),
            value: eval.value,
            point: eval.point,
            pieces: self.pieces.clone(),
        });
    }
}
