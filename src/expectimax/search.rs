use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use rayon::prelude::*;

use crate::engine::{Board, Cell, Move, Rules, Tile};

use super::simulator::MoveSimulator;
use super::{BranchEval, ExpectimaxConfig, Score, SearchError, SpawnOutcome};

/// One outcome of a chance node: `value` lands on the empty `cell` with
/// `probability`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnCandidate {
    pub cell: Cell,
    pub value: Tile,
    pub probability: f64,
}

impl SpawnCandidate {
    /// Every (empty cell, spawn outcome) pair of `board`, cells in row-major
    /// order and outcomes in table order.
    pub fn enumerate(board: Board, spawns: &[SpawnOutcome]) -> Vec<SpawnCandidate> {
        board
            .empty_cells()
            .flat_map(|cell| {
                spawns.iter().map(move |s| SpawnCandidate { cell, value: s.value, probability: s.probability })
            })
            .collect()
    }
}

/// State for one root evaluation: config, successor generator, deadline and
/// node counter. Shared by reference across rayon tasks; boards are passed by
/// value so branches never see each other's placements.
pub(crate) struct Search<'a, R> {
    cfg: &'a ExpectimaxConfig,
    sim: &'a MoveSimulator<R>,
    parallel: bool,
    deadline: Option<(Instant, Duration)>,
    nodes: AtomicU64,
}

impl<'a, R: Rules> Search<'a, R> {
    pub(crate) fn new(cfg: &'a ExpectimaxConfig, sim: &'a MoveSimulator<R>, parallel: bool) -> Self {
        let deadline = cfg.time_budget().map(|budget| (Instant::now() + budget, budget));
        Self { cfg, sim, parallel, deadline, nodes: AtomicU64::new(0) }
    }

    #[inline]
    pub(crate) fn nodes(&self) -> u64 { self.nodes.load(Ordering::Relaxed) }

    /// Score all four root moves, in `Move::ALL` order.
    pub(crate) fn branch_evals(&self, board: Board) -> Result<[BranchEval; 4], SearchError> {
        let eval = |dir: Move| -> Result<BranchEval, SearchError> {
            let moved = self.sim.execute_move(dir, board);
            let ev = self.score_moved(board, moved, 0)?;
            Ok(BranchEval { dir, ev, legal: moved != board })
        };
        let evals: Vec<BranchEval> = if self.parallel {
            Move::ALL.par_iter().map(|&dir| eval(dir)).collect::<Result<_, _>>()?
        } else {
            Move::ALL.iter().map(|&dir| eval(dir)).collect::<Result<_, _>>()?
        };
        Ok([evals[0], evals[1], evals[2], evals[3]])
    }

    /// Expected score of playing `mv` on `board` at search depth `depth`.
    ///
    /// A move that changes nothing scores `depth`. Otherwise the chance layer
    /// branches on every empty cell of the moved board until the depth limit
    /// for that board is reached, and leaves are scored by the heuristic.
    pub(crate) fn score_toplevel_move(&self, mv: Move, board: Board, depth: u32) -> Result<Score, SearchError> {
        self.score_moved(board, self.sim.execute_move(mv, board), depth)
    }

    // `new_board` is `board` after the move being scored.
    fn score_moved(&self, board: Board, new_board: Board, depth: u32) -> Result<Score, SearchError> {
        self.check_deadline()?;
        self.nodes.fetch_add(1, Ordering::Relaxed);

        if new_board == board {
            return Ok(f64::from(depth));
        }
        let empty = new_board.count_empty();
        if depth >= self.cfg.depth_limit(empty) || empty == 0 {
            return Ok(self.cfg.weights.leaf_score(board, new_board));
        }

        let candidates = SpawnCandidate::enumerate(new_board, &self.cfg.spawns);
        let weighted = |c: &SpawnCandidate| -> Result<Score, SearchError> {
            let placed = new_board.with_tile(c.cell, c.value);
            Ok(c.probability * self.best_reply(placed, depth + 1)?)
        };
        let fan_out = self.parallel && depth == 0 && candidates.len() >= self.cfg.par_thresholds.par_slots;
        let scores: Vec<Score> = if fan_out {
            candidates.par_iter().map(weighted).collect::<Result<_, _>>()?
        } else {
            candidates.iter().map(weighted).collect::<Result<_, _>>()?
        };
        // summed in candidate order so both flavors agree bit for bit
        let total: Score = scores.iter().sum();
        Ok(total / empty as f64)
    }

    fn best_reply(&self, board: Board, depth: u32) -> Result<Score, SearchError> {
        let mut best = f64::NEG_INFINITY;
        for mv in Move::ALL {
            best = best.max(self.score_toplevel_move(mv, board, depth)?);
        }
        Ok(best)
    }

    fn check_deadline(&self) -> Result<(), SearchError> {
        match self.deadline {
            Some((at, budget)) if Instant::now() >= at => {
                Err(SearchError::DeadlineExceeded { budget_ms: budget.as_millis() as u64 })
            }
            _ => Ok(()),
        }
    }
}
