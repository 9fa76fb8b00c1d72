//! Leaf heuristic: monotonicity, first-row bonus and corner shockwave.
//!
//! The free functions score with [`HeuristicWeights::DEFAULT`]; the search
//! calls the methods on its configured weights.

use crate::engine::{Board, SIZE};

use super::{HeuristicWeights, Score};

/// 1 plus one point for every row or column that is sorted descending and one
/// for every row or column that is sorted ascending.
///
/// A constant line (for example an empty one) is sorted both ways and scores
/// twice, so the result lies in `1..=17`.
///
/// ```
/// use searchai::engine::Board;
/// use searchai::expectimax::heuristic::monotonicity;
/// let b = Board::from_rows([[2, 4, 8, 16], [4, 8, 16, 32], [8, 16, 32, 64], [16, 32, 64, 128]]);
/// assert_eq!(monotonicity(b), 9);
/// ```
pub fn monotonicity(board: Board) -> u32 {
    let rows = (0..SIZE).map(|r| board.row(r));
    let cols = (0..SIZE).map(|c| board.column(c));
    1 + rows.chain(cols).map(sorted_directions).sum::<u32>()
}

/// First-row bonus with the default weights; always at least 1.
pub fn first_row_bonus(board: Board) -> u64 { HeuristicWeights::DEFAULT.first_row_bonus(board) }

/// Corner shockwave with the default weights.
pub fn corner_shockwave(board: Board) -> u64 { HeuristicWeights::DEFAULT.corner_shockwave(board) }

impl HeuristicWeights {
    /// Starts at 1. Walking the first row left to right, every tile at or above
    /// the threshold adds the weighted sum of itself and all tiles before it,
    /// so earlier tiles are counted again by each later qualifying tile.
    pub fn first_row_bonus(&self, board: Board) -> u64 {
        let mut factor = 1;
        let mut prefix = 0;
        for (&tile, &coeff) in board.row(0).iter().zip(&self.first_row) {
            prefix += coeff * u64::from(tile);
            if tile >= self.first_row_threshold {
                factor += prefix;
            }
        }
        factor
    }

    /// Dot product of the row-major tile values with the corner weights.
    pub fn corner_shockwave(&self, board: Board) -> u64 {
        board.flatten().iter().zip(&self.corner).map(|(&tile, &w)| u64::from(tile) * w).sum()
    }

    /// Score a search leaf reached by moving from `before` to `after`.
    ///
    /// The positional term for a full board is taken on `before`, the board
    /// the move was played from.
    pub fn leaf_score(&self, before: Board, after: Board) -> Score {
        let shape = f64::from(monotonicity(after)) * self.first_row_bonus(after) as f64;
        match after.count_empty() {
            0 => self.corner_shockwave(before) as f64 + shape,
            empty => empty as f64 * shape,
        }
    }
}

fn sorted_directions(line: [u32; SIZE]) -> u32 {
    let descending = line.windows(2).all(|w| w[0] >= w[1]);
    let ascending = line.windows(2).all(|w| w[0] <= w[1]);
    u32::from(descending) + u32::from(ascending)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Cell;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    fn random_board(rng: &mut StdRng) -> Board {
        Cell::all().fold(Board::EMPTY, |b, cell| {
            let exp = rng.gen_range(0..12);
            b.with_tile(cell, if exp == 0 { 0 } else { 1 << exp })
        })
    }

    fn first_row(row: [u32; 4]) -> Board { Board::from_rows([row, [0; 4], [0; 4], [0; 4]]) }

    #[test]
    fn monotonicity_counts_each_line() {
        assert_eq!(monotonicity(Board::EMPTY), 17);
        let zigzag = Board::from_rows([[2, 8, 4, 2], [8, 2, 8, 4], [2, 8, 2, 8], [8, 2, 8, 2]]);
        assert_eq!(monotonicity(zigzag), 1);
        // row 0 descending, rows 1-3 empty (both ways), every column descending
        let top = first_row([16, 8, 4, 2]);
        assert_eq!(monotonicity(top), 1 + 1 + 3 * 2 + 4);
    }

    #[test]
    fn monotonicity_stays_in_bounds() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..500 {
            let m = monotonicity(random_board(&mut rng));
            assert!((1..=17).contains(&m), "{m}");
        }
    }

    #[test]
    fn first_row_bonus_scenarios() {
        assert_eq!(first_row_bonus(first_row([8, 4, 2, 0])), 81);
        assert_eq!(first_row_bonus(first_row([4, 4, 2, 0])), 1);
        assert_eq!(first_row_bonus(first_row([8, 8, 8, 8])), 1 + 80 + 104 + 120 + 128);
        assert_eq!(first_row_bonus(first_row([16, 8, 0, 8])), 1 + 160 + 184 + 192);
        assert_eq!(first_row_bonus(first_row([0, 0, 0, 8])), 1 + 8);
    }

    #[test]
    fn first_row_bonus_is_at_least_one() {
        let mut rng = StdRng::seed_from_u64(12);
        for _ in 0..500 {
            assert!(first_row_bonus(random_board(&mut rng)) >= 1);
        }
    }

    #[test]
    fn corner_shockwave_is_linear() {
        assert_eq!(corner_shockwave(first_row([2, 0, 0, 0])), 2000);
        assert_eq!(corner_shockwave(Board::EMPTY.with_tile(Cell { row: 3, col: 3 }, 2048)), 0);
        let mut rng = StdRng::seed_from_u64(13);
        for _ in 0..100 {
            let b = random_board(&mut rng);
            assert_eq!(corner_shockwave(b.map_tiles(|v| v * 3)), 3 * corner_shockwave(b));
        }
    }

    #[test]
    fn leaf_score_with_empty_cells_uses_after() {
        let w = HeuristicWeights::DEFAULT;
        let after = first_row([0, 0, 0, 2]);
        let expected = 15.0 * f64::from(monotonicity(after)) * first_row_bonus(after) as f64;
        assert_eq!(w.leaf_score(first_row([2, 0, 0, 0]), after), expected);
    }

    #[test]
    fn leaf_score_on_full_board_takes_corner_from_before() {
        let w = HeuristicWeights::DEFAULT;
        let before = Board::from_rows([[0, 4, 2, 4], [4, 2, 4, 2], [2, 4, 2, 4], [4, 2, 4, 2]]);
        let after = before.with_tile(Cell { row: 0, col: 0 }, 2);
        let expected =
            corner_shockwave(before) as f64 + f64::from(monotonicity(after)) * first_row_bonus(after) as f64;
        assert_eq!(w.leaf_score(before, after), expected);
        assert_ne!(corner_shockwave(before), corner_shockwave(after));
    }
}
