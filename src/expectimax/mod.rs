//! Expectimax search policy (single-threaded and parallel) for 2048.
//!
//! This module provides two policy implementations:
//! - [`Expectimax`]: single-threaded expectimax.
//! - [`ExpectimaxParallel`]: rayon fan-out over the four root moves.
//!
//! Both variants share the same recursion, configuration and public surface,
//! and return identical scores for the same board.
//!
//! Notes
//! - The search is deterministic; randomness only occurs when applying moves
//!   with `Board::make_move`.
//! - Scores are not normalized. A move that leaves the board unchanged scores
//!   the depth it was tried at (0 at the root).
//!
//! Quick start
//! ```
//! use searchai::engine::{Board, Move};
//! use searchai::expectimax::{Expectimax, ExpectimaxParallel};
//!
//! let b = Board::from_rows([[2, 0, 0, 0], [0; 4], [0; 4], [0; 4]]);
//!
//! let mut ex = Expectimax::new();
//! let m = ex.find_best_move(b).unwrap();
//! assert!(matches!(m, Move::Down | Move::Right));
//!
//! let mut ex_par = ExpectimaxParallel::new();
//! assert_eq!(ex_par.find_best_move(b).unwrap(), m);
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::engine::{Move, Tile};

pub mod heuristic;
mod search;
mod search_par;
mod search_seq;
pub mod simulator;

pub use search::SpawnCandidate;
pub use search_par::ExpectimaxParallel;
pub use search_seq::Expectimax;

/// Score assigned to a board or move. Larger is better.
pub type Score = f64;

/// Errors surfaced by the search.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SearchError {
    #[error("invalid move index {0}, expected 0..=3")]
    InvalidMove(usize),
    #[error("search exceeded its time budget of {budget_ms} ms")]
    DeadlineExceeded { budget_ms: u64 },
}

/// Errors from loading an [`ExpectimaxConfig`].
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(&'static str),
}

/// A tile value the game may spawn after a move and its probability.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpawnOutcome {
    pub value: Tile,
    pub probability: f64,
}

/// Row-major positional weights, largest in the top-left corner.
#[rustfmt::skip]
pub const CORNER_WEIGHTS: [u64; 16] = [
    1000, 900, 700, 500,
    800, 700, 500, 200,
    700, 500, 200, 30,
    500, 200, 30, 0,
];

/// Fixed weights used by the leaf heuristic.
///
/// - `corner`: row-major weights for the corner shockwave dot product.
/// - `first_row`: coefficients for the first-row bonus, left to right.
/// - `first_row_threshold`: a first-row tile counts once it reaches this value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeuristicWeights {
    pub corner: [u64; 16],
    pub first_row: [u64; 4],
    pub first_row_threshold: Tile,
}

impl HeuristicWeights {
    pub const DEFAULT: HeuristicWeights = HeuristicWeights {
        corner: CORNER_WEIGHTS,
        first_row: [10, 3, 2, 1],
        first_row_threshold: 8,
    };
}

impl Default for HeuristicWeights {
    fn default() -> Self { Self::DEFAULT }
}

/// Configurable knobs for Expectimax. Defaults reproduce the stock engine.
///
/// - `weights`: leaf heuristic tables.
/// - `spawns`: tile values the chance layer branches on, with probabilities.
/// - `deep_below_empty`: boards with fewer empty cells than this after the
///   root move are searched to `deep_depth`, others to `shallow_depth`.
/// - `time_budget_ms`: optional per-call deadline.
/// - `par_thresholds`: thresholds used only by the parallel implementation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExpectimaxConfig {
    pub weights: HeuristicWeights,
    pub spawns: Vec<SpawnOutcome>,
    pub deep_below_empty: usize,
    pub shallow_depth: u32,
    pub deep_depth: u32,
    pub time_budget_ms: Option<u64>,
    pub par_thresholds: ParThresholds,
}

impl Default for ExpectimaxConfig {
    fn default() -> Self {
        Self {
            weights: HeuristicWeights::DEFAULT,
            spawns: vec![
                SpawnOutcome { value: 2, probability: 0.9 },
                SpawnOutcome { value: 4, probability: 0.1 },
            ],
            deep_below_empty: 4,
            shallow_depth: 1,
            deep_depth: 2,
            time_budget_ms: None,
            par_thresholds: ParThresholds::default(),
        }
    }
}

impl ExpectimaxConfig {
    /// Parse a JSON config; missing fields keep their defaults.
    ///
    /// ```
    /// use searchai::expectimax::ExpectimaxConfig;
    /// let cfg = ExpectimaxConfig::from_json(r#"{ "deep_depth": 3 }"#).unwrap();
    /// assert_eq!(cfg.deep_depth, 3);
    /// assert_eq!(cfg.shallow_depth, 1);
    /// ```
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let cfg: ExpectimaxConfig = serde_json::from_str(text)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Check the invariants the search relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.spawns.is_empty() {
            return Err(ConfigError::Invalid("spawn table is empty"));
        }
        if self.spawns.iter().any(|s| s.value == 0) {
            return Err(ConfigError::Invalid("spawned tile value must be positive"));
        }
        if self.spawns.iter().any(|s| !(0.0..=1.0).contains(&s.probability)) {
            return Err(ConfigError::Invalid("spawn probability outside [0, 1]"));
        }
        let total: f64 = self.spawns.iter().map(|s| s.probability).sum();
        if (total - 1.0).abs() > 1e-9 {
            return Err(ConfigError::Invalid("spawn probabilities must sum to 1"));
        }
        if self.deep_depth < self.shallow_depth {
            return Err(ConfigError::Invalid("deep_depth is below shallow_depth"));
        }
        Ok(())
    }

    /// Depth limit for a board with `empty` cells after the root move.
    #[inline]
    pub fn depth_limit(&self, empty: usize) -> u32 {
        if empty < self.deep_below_empty { self.deep_depth } else { self.shallow_depth }
    }

    #[inline]
    pub(crate) fn time_budget(&self) -> Option<Duration> { self.time_budget_ms.map(Duration::from_millis) }
}

/// Thresholds used to balance parallel overheads.
///
/// - `par_slots`: the root chance layer fans out across spawn candidates only
///   when there are at least this many of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParThresholds {
    pub par_slots: usize,
}

impl Default for ParThresholds {
    fn default() -> Self { Self { par_slots: 6 } }
}

/// Per-branch score at the root (no normalization).
///
/// - `ev` is the score for taking `dir` from the current board.
/// - `legal` is false when the move is a no-op for the current board.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BranchEval {
    pub dir: Move,
    pub ev: Score,
    pub legal: bool,
}

/// Basic search stats for a single evaluation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStats {
    pub nodes: u64,
    pub peak_nodes: u64,
}

impl SearchStats {
    fn record(&mut self, nodes: u64) {
        self.nodes = nodes;
        self.peak_nodes = self.peak_nodes.max(nodes);
    }
}

/// First branch with the maximum score; ties go to the lowest move index.
fn select_best(branches: &[BranchEval; 4]) -> Move {
    let mut best = branches[0];
    for branch in &branches[1..] {
        if branch.ev > best.ev {
            best = *branch;
        }
    }
    best.dir
}

fn report(branches: &[BranchEval; 4]) {
    for branch in branches {
        log::info!("move: {} score: {:.4}", branch.dir.index(), branch.ev);
    }
}
