use crate::engine::{Board, Classic, Move, Rules};

use super::search::Search;
use super::simulator::MoveSimulator;
use super::{report, select_best, BranchEval, ExpectimaxConfig, Score, SearchError, SearchStats};

/// Single-threaded Expectimax search.
///
/// Generic over the rule engine; [`Expectimax::new`] uses the [`Classic`]
/// rules.
pub struct Expectimax<R = Classic> {
    cfg: ExpectimaxConfig,
    sim: MoveSimulator<R>,
    stats: SearchStats,
}

impl Expectimax {
    pub fn new() -> Self { Self::with_config(ExpectimaxConfig::default()) }

    pub fn with_config(cfg: ExpectimaxConfig) -> Self { Self::with_rules(cfg, Classic) }
}

impl<R: Rules> Expectimax<R> {
    pub fn with_rules(cfg: ExpectimaxConfig, rules: R) -> Self {
        Self { cfg, sim: MoveSimulator::new(rules), stats: SearchStats::default() }
    }

    /// Pick the best of the four moves; ties go to the lowest move index.
    ///
    /// Logs one `move: <index> score: <score>` line per move at info level.
    ///
    /// Example
    /// ```
    /// use searchai::engine::{Board, Move};
    /// use searchai::expectimax::Expectimax;
    /// let mut ex = Expectimax::new();
    /// // nothing can move on an empty board, so every score ties at 0
    /// assert_eq!(ex.find_best_move(Board::EMPTY).unwrap(), Move::Up);
    /// ```
    pub fn find_best_move(&mut self, board: Board) -> Result<Move, SearchError> {
        let branches = self.branch_evals(board)?;
        report(&branches);
        Ok(select_best(&branches))
    }

    /// Score every direction.
    ///
    /// Returns a fixed array in order: `[Up, Down, Left, Right]` and marks
    /// no-op moves as `legal=false`.
    pub fn branch_evals(&mut self, board: Board) -> Result<[BranchEval; 4], SearchError> {
        let search = Search::new(&self.cfg, &self.sim, false);
        let out = search.branch_evals(board);
        let nodes = search.nodes();
        self.finish(nodes);
        out
    }

    /// Score of playing `mv` on `board`, treating `board` as reached at
    /// search depth `depth` (0 for the current position).
    pub fn score_toplevel_move(&mut self, mv: Move, board: Board, depth: u32) -> Result<Score, SearchError> {
        let search = Search::new(&self.cfg, &self.sim, false);
        let out = search.score_toplevel_move(mv, board, depth);
        let nodes = search.nodes();
        self.finish(nodes);
        out
    }

    /// [`Self::score_toplevel_move`] at depth 0 for an unchecked move index.
    pub fn score_move_index(&mut self, index: usize, board: Board) -> Result<Score, SearchError> {
        let mv = Move::from_index(index).ok_or(SearchError::InvalidMove(index))?;
        self.score_toplevel_move(mv, board, 0)
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
        log::debug!("expectimax visited {} nodes", nodes);
        self.stats.record(nodes);
    }
}

impl Default for Expectimax { fn default() -> Self { Self::new() } }
