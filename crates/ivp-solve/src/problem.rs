use ivp_core::{Domain, PiecewiseFunction};

use crate::{
    Aggregator, ExactAggregator, NullSolveSink, ProblemConfig, Result, Seeding, Solution,
    SolveSink, SolveStats, Solver,
};

/// A set of weighted objective functions over one decision domain.
///
/// Functions are prepared as they are added: aligned to the problem domain, normalized when
/// their value range is wider than the configured range, and scaled by their priority. The
/// solver then maximizes the plain sum.
#[derive(Debug)]
pub struct Problem {
    domain: Domain,
    config: ProblemConfig,
    functions: Vec<PiecewiseFunction>,
    solver: Solver,
    solution: Option<Solution>,
}

impl Problem {
    pub fn new(domain: Domain) -> Self {
        let config = ProblemConfig::default();
        Self {
            domain,
            solver: Solver::new(config.solver.clone()),
            config,
            functions: Vec::new(),
            solution: None,
        }
    }

    pub fn with_config(mut self, config: ProblemConfig) -> Self {
        self.solver = Solver::new(config.solver.clone());
        self.config = config;
        self
    }

    pub fn config(&self) -> &ProblemConfig {
        &self.config
    }

    pub fn domain(&self) -> &Domain {
        &self.domain
    }

    pub fn functions(&self) -> &[PiecewiseFunction] {
        &self.functions
    }

    /// Prepare and add one function.
    ///
    /// Returns `Ok(false)` when the function is dropped for a non-positive priority, and an error
    /// when it cannot be aligned to the problem domain.
    pub fn add_function(&mut self, function: PiecewiseFunction) -> Result<bool> {
        let priority = function.priority();
        if priority <= 0.0 {
            tracing::warn!(
                label = function.label().unwrap_or("<unnamed>"),
                priority,
                "dropping function with non-positive priority"
            );
            return Ok(false);
        }

        let mut function = function.align_to(&self.domain)?;

        if let Some(range) = self.config.normalize_range {
            if let (Some(min), Some(max)) = (function.min_value(), function.max_value()) {
                if max - min > range {
                    function.normalize(0.0, range);
                }
            }
        }
        function.scale(priority);

        self.functions.push(function);
        Ok(true)
    }

    /// Solve with the closed-form aggregator.
    pub fn solve(&mut self) -> Result<Option<Solution>> {
        self.solve_with(&ExactAggregator, &mut NullSolveSink, None)
    }

    /// Solve with `point` (point indices) as the seed solution.
    pub fn solve_with_hint(&mut self, point: &[i64]) -> Result<Option<Solution>> {
        self.solve_with(&ExactAggregator, &mut NullSolveSink, Some(point))
    }

    /// Solve with an explicit aggregator and event sink.
    ///
    /// An explicit `hint` takes precedence over the configured [`Seeding`].
    pub fn solve_with(
        &mut self,
        aggregator: &dyn Aggregator,
        sink: &mut dyn SolveSink,
        hint: Option<&[i64]>,
    ) -> Result<Option<Solution>> {
        if self.config.sort_by_priority {
            // Stable: equal priorities keep insertion order.
            self.functions.sort_by(|a, b| b.priority().total_cmp(&a.priority()));
        }

        let seed = match hint {
            Some(point) => Some(point.to_vec()),
            None => self.seed_point(),
        };

        self.solution = None;
        let solution = self.solver.solve_with(
            &self.domain,
            &self.functions,
            aggregator,
            sink,
            seed.as_deref(),
        )?;
        self.solution = solution.clone();
        Ok(solution)
    }

    /// Starting point picked by the configured [`Seeding`] from the functions' maxima.
    fn seed_point(&self) -> Option<Vec<i64>> {
        match self.config.seeding {
            Seeding::None => None,
            Seeding::TopPriority => self.functions.first()?.max_point().map(|(point, _)| point),
            Seeding::EveryFunction => {
                let mut best: Option<(Vec<i64>, f64)> = None;
                for (point, _) in self.functions.iter().filter_map(PiecewiseFunction::max_point) {
                    let Some(value) = self
                        .functions
                        .iter()
                        .map(|f| f.eval_point(&point))
                        .sum::<Option<f64>>()
                    else {
                        continue;
                    };
                    if best.as_ref().is_none_or(|(_, v)| value > *v) {
                        best = Some((point, value));
                    }
                }
                tracing::trace!(seed = ?best, "seeded from function maxima");
                best.map(|(point, _)| point)
            }
        }
    }

    /// The last solution, if the last solve found one.
    pub fn solution(&self) -> Option<&Solution> {
        self.solution.as_ref()
    }

    /// Domain value of the last solution for variable `name`.
    pub fn result_value(&self, name: &str) -> Option<f64> {
        let var = self.domain.index_of(name)?;
        let solution = self.solution.as_ref()?;
        self.domain.value_at(var, *solution.point.get(var)?)
    }

    /// Average number of pieces per function.
    pub fn piece_avg(&self) -> f64 {
        if self.functions.is_empty() {
            return 0.0;
        }
        let total: usize = self.functions.iter().map(PiecewiseFunction::len).sum();
        total as f64 / self.functions.len() as f64
    }

    pub fn last_stats(&self) -> SolveStats {
        self.solver.stats()
    }
}
