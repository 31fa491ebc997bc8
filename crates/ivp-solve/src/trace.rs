use serde::Serialize;

use crate::SolveStats;

/// Progress of a single solve, in emission order.
///
/// `Improved` values are strictly increasing within one solve.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SolveEvent {
    Started {
        functions: usize,
        pieces: usize,
    },
    Improved {
        value: f64,
        /// Piece index chosen in each function.
        pieces: Vec<usize>,
    },
    Finished {
        value: Option<f64>,
        stats: SolveStats,
    },
}

pub trait SolveSink {
    fn emit(&mut self, event: SolveEvent);
}

#[derive(Debug, Default)]
pub struct NullSolveSink;

impl SolveSink for NullSolveSink {
    fn emit(&mut self, _event: SolveEvent) {}
}

#[derive(Debug, Default)]
pub struct VecSolveSink {
    pub events: Vec<SolveEvent>,
}

impl VecSolveSink {
    /// Values of the `Improved` events, in order.
    pub fn improvements(&self) -> Vec<f64> {
        self.events
            .iter()
            .filter_map(|event| match event {
                SolveEvent::Improved { value, .. } => Some(*value),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl SolveSink for VecSolveSink {
    fn emit(&mut self, event: SolveEvent) {
        self.events.push(event);
    }
}
