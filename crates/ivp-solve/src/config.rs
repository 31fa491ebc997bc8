//! Solver and problem configuration.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Knobs for a single [`crate::Solver`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// A leaf replaces the current best only when it is better by more than this.
    pub epsilon: f64,

    /// Upper limit on the number of functions in one solve (sizes the frontier arena).
    pub max_functions: usize,

    /// Skip subtrees whose upper bound cannot beat the current best.
    pub bound_pruning: bool,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            epsilon: 1e-9,
            max_functions: 64,
            bound_pruning: true,
        }
    }
}

impl SolverConfig {
    /// Reject settings the search cannot honour.
    pub fn validate(&self) -> Result<()> {
        if !self.epsilon.is_finite() || self.epsilon < 0.0 {
            anyhow::bail!(
                "solver.epsilon must be finite and non-negative, got {}",
                self.epsilon
            );
        }
        if self.max_functions == 0 {
            anyhow::bail!("solver.max_functions must be at least 1");
        }
        Ok(())
    }
}

/// Where a [`crate::Problem`] takes the starting solution of a search from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Seeding {
    /// Start with no solution.
    #[default]
    None,
    /// The maximizing point of the highest-priority function.
    TopPriority,
    /// The best maximizing point among all functions, judged by the aggregate value.
    EveryFunction,
}

/// Configuration for a [`crate::Problem`], usually loaded from YAML.
///
/// ```yaml
/// solver:
///   epsilon: 1.0e-6
///   bound_pruning: true
/// normalize_range: 100.0
/// sort_by_priority: true
/// seeding: top_priority
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProblemConfig {
    pub solver: SolverConfig,

    /// Functions whose value range exceeds this are rescaled onto `[0, range]` before their
    /// priority is applied. `None` disables normalization.
    pub normalize_range: Option<f64>,

    /// Order functions by descending priority (stable) before solving.
    pub sort_by_priority: bool,

    /// Starting solution when no explicit hint is given.
    pub seeding: Seeding,
}

impl Default for ProblemConfig {
    fn default() -> Self {
        Self {
            solver: SolverConfig::default(),
            normalize_range: Some(100.0),
            sort_by_priority: true,
            seeding: Seeding::None,
        }
    }
}

impl ProblemConfig {
    /// Load configuration from a YAML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;
        let config: Self = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config from {}", path.display()))?;
        config
            .validate()
            .with_context(|| format!("Invalid config in {}", path.display()))?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.solver.validate()?;
        if let Some(range) = self.normalize_range {
            if !range.is_finite() || range <= 0.0 {
                anyhow::bail!("normalize_range must be finite and positive, got {range}");
            }
        }
        Ok(())
    }

    /// Load from `path` if it exists, otherwise use defaults.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }
}
