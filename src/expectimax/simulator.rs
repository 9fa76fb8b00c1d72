//! Successor generation for the search.

use crate::engine::{Board, Classic, Move, Rules};

use super::SearchError;

/// Pure adapter from a move to the rule engine's per-direction function.
///
/// Never spawns tiles.
#[derive(Debug, Clone, Copy, Default)]
pub struct MoveSimulator<R = Classic> {
    rules: R,
}

impl<R: Rules> MoveSimulator<R> {
    pub fn new(rules: R) -> Self { Self { rules } }

    #[inline]
    pub fn execute_move(&self, mv: Move, board: Board) -> Board { self.rules.apply(mv, board) }

    /// Like [`Self::execute_move`] for a move index that has not been checked yet.
    ///
    /// ```
    /// use searchai::engine::Board;
    /// use searchai::expectimax::{simulator::MoveSimulator, SearchError};
    /// let sim: MoveSimulator = MoveSimulator::default();
    /// assert_eq!(sim.execute_move_index(7, Board::EMPTY), Err(SearchError::InvalidMove(7)));
    /// ```
    pub fn execute_move_index(&self, index: usize, board: Board) -> Result<Board, SearchError> {
        let mv = Move::from_index(index).ok_or(SearchError::InvalidMove(index))?;
        Ok(self.execute_move(mv, board))
    }
}
