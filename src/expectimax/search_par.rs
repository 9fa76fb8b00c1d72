use crate::engine::{Board, Classic, Move, Rules};

use super::search::Search;
use super::simulator::MoveSimulator;
use super::{report, select_best, BranchEval, ExpectimaxConfig, Score, SearchError, SearchStats};

/// Parallel Expectimax using rayon.
///
/// The four root moves run as independent tasks; the root chance layer also
/// fans out once it has at least `par_thresholds.par_slots` spawn candidates.
/// Results are joined in move order before the max is taken, so the chosen
/// move and every score match [`super::Expectimax`] exactly.
pub struct ExpectimaxParallel<R = Classic> {
    cfg: ExpectimaxConfig,
    sim: MoveSimulator<R>,
    stats: SearchStats,
}

impl ExpectimaxParallel {
    pub fn new() -> Self { Self::with_config(ExpectimaxConfig::default()) }

    pub fn with_config(cfg: ExpectimaxConfig) -> Self { Self::with_rules(cfg, Classic) }
}

impl<R: Rules> ExpectimaxParallel<R> {
    pub fn with_rules(cfg: ExpectimaxConfig, rules: R) -> Self {
        Self { cfg, sim: MoveSimulator::new(rules), stats: SearchStats::default() }
    }

    /// Compute the best move using parallel expectimax.
    ///
    /// This is a convenience wrapper around `branch_evals` that picks the first
    /// maximum and logs the per-move scores.
    pub fn find_best_move(&mut self, board: Board) -> Result<Move, SearchError> {
        let (best, _) = self.best_move_with_branches(board)?;
        Ok(best)
    }

    /// Convenience function for runners that want both the move and the scores.
    pub fn best_move_with_branches(&mut self, board: Board) -> Result<(Move, [BranchEval; 4]), SearchError> {
        let branches = self.branch_evals(board)?;
        report(&branches);
        Ok((select_best(&branches), branches))
    }

    /// Core function: score each direction in parallel.
    ///
    /// Returns a fixed array in order: `[Up, Down, Left, Right]` and marks
    /// no-op moves as `legal=false`.
    pub fn branch_evals(&mut self, board: Board) -> Result<[BranchEval; 4], SearchError> {
        let search = Search::new(&self.cfg, &self.sim, true);
        let out = search.branch_evals(board);
        let nodes = search.nodes();
        self.finish(nodes);
        out
    }

    /// Score of playing `mv` on `board` at search depth `depth`.
    pub fn score_toplevel_move(&mut self, mv: Move, board: Board, depth: u32) -> Result<Score, SearchError> {
        let search = Search::new(&self.cfg, &self.sim, true);
        let out = search.score_toplevel_move(mv, board, depth);
        let nodes = search.nodes();
        self.finish(nodes);
        out
    }

    /// Best branch score at the root.
    pub fn state_value(&mut self, board: Board) -> Result<Score, SearchError> {
        let branches = self.branch_evals(board)?;
        Ok(branches.iter().map(|b| b.ev).fold(f64::NEG_INFINITY, f64::max))
    }

    /// Statistics collected from the last search call.
    #[inline]
    pub fn last_stats(&self) -> SearchStats { self.stats }

    /// Reset accumulated stats to zero.
    #[inline]
    pub fn reset_stats(&mut self) { self.stats = SearchStats::default(); }

    fn finish(&mut self, nodes: u64) {
        log::debug!("parallel expectimax visited {} nodes", nodes);
        self.stats.record(nodes);
    }
}

impl Default for ExpectimaxParallel { fn default() -> Self { Self::new() } }
