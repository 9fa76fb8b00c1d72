use rand::Rng;
use std::fmt;

/// A direction to move/merge tiles.
///
/// The discriminant order is the move index used by the selector:
/// `Up = 0`, `Down = 1`, `Left = 2`, `Right = 3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Move {
    Up,
    Down,
    Left,
    Right,
}

impl Move {
    /// All moves in index order.
    pub const ALL: [Move; 4] = [Move::Up, Move::Down, Move::Left, Move::Right];

    /// Index of this move in `0..=3`.
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Move::Up => 0,
            Move::Down => 1,
            Move::Left => 2,
            Move::Right => 3,
        }
    }

    /// Inverse of [`Move::index`]; `None` for anything outside `0..=3`.
    #[inline]
    pub fn from_index(idx: usize) -> Option<Move> { Move::ALL.get(idx).copied() }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Move::Up => "up",
            Move::Down => "down",
            Move::Left => "left",
            Move::Right => "right",
        };
        f.write_str(name)
    }
}

/// Side length of the board.
pub const SIZE: usize = 4;

/// Tile value as shown on the board (2, 4, 8, ...); 0 is an empty cell.
pub type Tile = u32;

type Line = [Tile; SIZE];
type Grid = [Line; SIZE];

/// A cell coordinate, `row` and `col` both in `0..4`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cell {
    pub row: usize,
    pub col: usize,
}

impl Cell {
    /// Returns `None` when either coordinate is off the board.
    #[inline]
    pub fn new(row: usize, col: usize) -> Option<Self> {
        (row < SIZE && col < SIZE).then_some(Cell { row, col })
    }

    /// Row-major index in `0..16`.
    #[inline]
    pub fn index(self) -> usize { self.row * SIZE + self.col }

    /// Every cell in row-major order.
    pub fn all() -> impl Iterator<Item = Cell> {
        (0..SIZE).flat_map(|row| (0..SIZE).map(move |col| Cell { row, col }))
    }
}

/// A 4x4 2048 board holding actual tile values.
///
/// `Board` is `Copy`: every transformation returns a new board and the
/// receiver is never observed to change.
///
/// Any `u32` is accepted as a tile. A merge whose result does not fit
/// saturates at `u32::MAX`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Board(Grid);

impl Board {
    /// A constant empty board (all zeros).
    pub const EMPTY: Board = Board([[0; SIZE]; SIZE]);

    /// Construct a `Board` from rows, top to bottom.
    #[inline]
    pub const fn from_rows(rows: Grid) -> Self { Board(rows) }

    /// Consume this `Board`, returning its rows.
    #[inline]
    pub fn into_rows(self) -> Grid { self.0 }

    /// Row `r`, left to right.
    #[inline]
    pub fn row(&self, r: usize) -> Line { self.0[r] }

    /// Column `c`, top to bottom.
    #[inline]
    pub fn column(&self, c: usize) -> Line { [self.0[0][c], self.0[1][c], self.0[2][c], self.0[3][c]] }

    /// Value at `cell` (0 if empty).
    #[inline]
    pub fn get(&self, cell: Cell) -> Tile { self.0[cell.row][cell.col] }

    /// Return a copy of this board with `value` written at `cell`.
    #[inline]
    pub fn with_tile(self, cell: Cell, value: Tile) -> Self {
        let mut grid = self.0;
        grid[cell.row][cell.col] = value;
        Board(grid)
    }

    /// Tile values in row-major order.
    pub fn flatten(self) -> [Tile; SIZE * SIZE] {
        let mut out = [0; SIZE * SIZE];
        for cell in Cell::all() {
            out[cell.index()] = self.get(cell);
        }
        out
    }

    /// Apply `f` to every cell value, including empty ones.
    pub fn map_tiles(self, f: impl Fn(Tile) -> Tile) -> Self {
        Board(self.0.map(|row| row.map(&f)))
    }

    /// Return the board resulting from sliding/merging tiles in `dir` with the
    /// [`Classic`] rules (no random insert).
    ///
    /// Example
    /// ```
    /// use searchai::engine::{Board, Move};
    /// let b = Board::from_rows([[2, 0, 0, 2], [0; 4], [0; 4], [0; 4]]);
    /// assert_eq!(b.shift(Move::Left).row(0), [4, 0, 0, 0]);
    /// ```
    #[inline]
    pub fn shift(self, dir: Move) -> Self { Classic.apply(dir, self) }

    /// Count the number of empty cells on the board.
    #[inline]
    pub fn count_empty(self) -> usize { self.0.iter().flatten().filter(|&&v| v == 0).count() }

    /// Empty cells in row-major order.
    pub fn empty_cells(self) -> impl Iterator<Item = Cell> {
        Cell::all().filter(move |&cell| self.get(cell) == 0)
    }

    /// Insert a random 2 (90%) or 4 (10%) tile into a random empty slot, using
    /// the provided RNG. A full board is returned unchanged.
    ///
    /// ```
    /// use searchai::engine::Board;
    /// use rand::{SeedableRng, rngs::StdRng};
    /// let mut rng = StdRng::seed_from_u64(123);
    /// let b = Board::EMPTY.with_random_tile(&mut rng).with_random_tile(&mut rng);
    /// assert_eq!(b.count_empty(), 14);
    /// ```
    pub fn with_random_tile<R: Rng + ?Sized>(self, rng: &mut R) -> Self {
        let empty = self.count_empty();
        if empty == 0 {
            return self;
        }
        let index = rng.gen_range(0..empty);
        let tile = generate_random_tile(rng);
        match self.empty_cells().nth(index) {
            Some(cell) => self.with_tile(cell, tile),
            None => self,
        }
    }

    /// Perform a move then insert a random tile if the move changed the board,
    /// using the provided RNG.
    #[inline]
    pub fn make_move<R: Rng + ?Sized>(self, direction: Move, rng: &mut R) -> Self {
        let moved = self.shift(direction);
        if moved != self { moved.with_random_tile(rng) } else { self }
    }

    /// Return true if no legal moves remain.
    ///
    /// ```
    /// use searchai::engine::Board;
    /// // No tiles means nothing can slide.
    /// assert!(Board::EMPTY.is_game_over());
    /// ```
    pub fn is_game_over(self) -> bool {
        Move::ALL.iter().all(|&dir| self.shift(dir) == self)
    }

    /// Return the highest tile value present on the board (0 when empty).
    #[inline]
    pub fn highest_tile(self) -> Tile { self.0.iter().flatten().copied().max().unwrap_or(0) }

    /// Sum of all tile values.
    #[inline]
    pub fn tile_sum(self) -> u64 { self.0.iter().flatten().map(|&v| u64::from(v)).sum() }

    fn transpose(self) -> Self {
        let mut grid = [[0; SIZE]; SIZE];
        for (c, row) in grid.iter_mut().enumerate() {
            *row = self.column(c);
        }
        Board(grid)
    }

    fn map_rows(self, f: fn(Line) -> Line) -> Self { Board(self.0.map(f)) }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Board({:?})", self.0)
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cells: Vec<String> = self.flatten().iter().map(format_val).collect();
        for (r, row) in cells.chunks(SIZE).enumerate() {
            if r > 0 {
                writeln!(f, "-------------------------------")?;
            }
            writeln!(f, "{}", row.join("|"))?;
        }
        Ok(())
    }
}

/// The slide/merge rule engine consumed by the search.
///
/// Each method is a pure function from a board to the board produced by
/// sliding and merging in one direction, with no tile spawning.
pub trait Rules: Sync {
    fn merge_up(&self, board: Board) -> Board;
    fn merge_down(&self, board: Board) -> Board;
    fn merge_left(&self, board: Board) -> Board;
    fn merge_right(&self, board: Board) -> Board;

    /// Dispatch on `dir`.
    #[inline]
    fn apply(&self, dir: Move, board: Board) -> Board {
        match dir {
            Move::Up => self.merge_up(board),
            Move::Down => self.merge_down(board),
            Move::Left => self.merge_left(board),
            Move::Right => self.merge_right(board),
        }
    }
}

/// Standard 2048 rules: each tile merges at most once per move, merges
/// resolve from the side being moved towards.
#[derive(Debug, Clone, Copy, Default)]
pub struct Classic;

impl Rules for Classic {
    fn merge_up(&self, board: Board) -> Board { board.transpose().map_rows(shift_line_left).transpose() }

    fn merge_down(&self, board: Board) -> Board { board.transpose().map_rows(shift_line_right).transpose() }

    fn merge_left(&self, board: Board) -> Board { board.map_rows(shift_line_left) }

    fn merge_right(&self, board: Board) -> Board { board.map_rows(shift_line_right) }
}

fn generate_random_tile<R: Rng + ?Sized>(rng: &mut R) -> Tile { if rng.gen_range(0..10) < 9 { 2 } else { 4 } }

fn shift_line_right(mut line: Line) -> Line {
    line.reverse();
    let mut out = shift_line_left(line);
    out.reverse();
    out
}

fn shift_line_left(mut line: Line) -> Line {
    for i in 0..SIZE {
        calculate_left_shift(&mut line[i..]);
    }
    line
}

// Pull the first tile of `slice` to its front, merging with the next equal tile.
fn calculate_left_shift(slice: &mut [Tile]) {
    let mut acc = 0;
    for idx in 0..slice.len() {
        let val = slice[idx];
        if acc != 0 && acc == val {
            slice[idx] = 0;
            acc = acc.saturating_mul(2);
            break;
        } else if acc != 0 && val != 0 && acc != val {
            break;
        } else if acc == 0 && val != 0 {
            slice[idx] = 0;
            acc = val;
        };
    }
    slice[0] = acc;
}

fn format_val(val: &Tile) -> String {
    match val {
        0 => String::from("       "),
        &x => format!("{:^7}", x),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    fn board(rows: Grid) -> Board { Board::from_rows(rows) }

    #[test]
    fn it_shift_line_left() {
        assert_eq!(shift_line_left([0, 0, 0, 0]), [0, 0, 0, 0]);
        assert_eq!(shift_line_left([2, 4, 2, 4]), [2, 4, 2, 4]);
        assert_eq!(shift_line_left([2, 2, 4, 4]), [4, 8, 0, 0]);
        assert_eq!(shift_line_left([2, 0, 0, 2]), [4, 0, 0, 0]);
        assert_eq!(shift_line_left([2, 2, 2, 2]), [4, 4, 0, 0]);
        assert_eq!(shift_line_left([4, 2, 2, 0]), [4, 4, 0, 0]);
    }

    #[test]
    fn merge_of_huge_tiles_saturates() {
        let big = 3_000_000_000;
        assert_eq!(shift_line_left([big, big, 0, 0]), [u32::MAX, 0, 0, 0]);
        assert_eq!(shift_line_right([0, 0, big, big]), [0, 0, 0, u32::MAX]);
        let game = board([[big, 0, 0, 0], [big, 0, 0, 0], [0; 4], [0; 4]]);
        assert_eq!(game.shift(Move::Up).row(0), [u32::MAX, 0, 0, 0]);
        // a saturated tile still merges only with an equal one
        assert_eq!(shift_line_left([u32::MAX, u32::MAX, 2, 2]), [u32::MAX, 4, 0, 0]);
    }

    #[test]
    fn it_shift_line_right() {
        assert_eq!(shift_line_right([0, 0, 0, 0]), [0, 0, 0, 0]);
        assert_eq!(shift_line_right([2, 4, 2, 4]), [2, 4, 2, 4]);
        assert_eq!(shift_line_right([2, 2, 4, 4]), [0, 0, 4, 8]);
        assert_eq!(shift_line_right([32, 0, 0, 32]), [0, 0, 0, 64]);
        assert_eq!(shift_line_right([0, 4, 4, 4]), [0, 0, 4, 8]);
    }

    #[test]
    fn test_move_left() {
        let game = board([[2, 4, 8, 16], [2, 8, 8, 4], [4, 0, 0, 4], [2, 0, 0, 4]]);
        assert_eq!(
            game.shift(Move::Left),
            board([[2, 4, 8, 16], [2, 16, 4, 0], [8, 0, 0, 0], [2, 4, 0, 0]])
        );
    }

    #[test]
    fn test_move_right() {
        let game = board([[2, 4, 8, 16], [2, 8, 8, 4], [4, 0, 0, 4], [2, 0, 0, 4]]);
        assert_eq!(
            game.shift(Move::Right),
            board([[2, 4, 8, 16], [0, 2, 16, 4], [0, 0, 0, 8], [0, 0, 2, 4]])
        );
    }

    #[test]
    fn test_move_up() {
        let game = board([[2, 2, 4, 2], [4, 8, 0, 0], [8, 8, 0, 0], [16, 4, 4, 4]]);
        assert_eq!(
            game.shift(Move::Up),
            board([[2, 2, 8, 2], [4, 16, 0, 4], [8, 4, 0, 0], [16, 0, 0, 0]])
        );
    }

    #[test]
    fn test_move_down() {
        let game = board([[2, 2, 4, 2], [4, 8, 0, 0], [8, 8, 0, 0], [16, 4, 4, 4]]);
        assert_eq!(
            game.shift(Move::Down),
            board([[2, 0, 0, 0], [4, 2, 0, 0], [8, 16, 0, 2], [16, 4, 8, 4]])
        );
    }

    #[test]
    fn shift_does_not_touch_receiver() {
        let game = board([[2, 2, 0, 0], [0; 4], [0; 4], [0; 4]]);
        let moved = game.shift(Move::Right);
        assert_eq!(game.row(0), [2, 2, 0, 0]);
        assert_eq!(moved.row(0), [0, 0, 0, 4]);
    }

    #[test]
    fn settled_direction_is_idempotent() {
        let mut rng = StdRng::seed_from_u64(2016);
        for _ in 0..200 {
            let mut game = Board::EMPTY;
            for _ in 0..rng.gen_range(1..16) {
                game = game.with_random_tile(&mut rng);
            }
            for dir in Move::ALL {
                // a line merges at most three times, so four shifts settle it
                let mut settled = game;
                for _ in 0..4 {
                    settled = settled.shift(dir);
                }
                assert_eq!(settled.shift(dir), settled, "{dir} on {game:?}");
            }
        }
    }

    #[test]
    fn it_insert_random_tile() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut game = Board::EMPTY;
        for _ in 0..16 {
            game = game.with_random_tile(&mut rng);
        }
        assert_eq!(game.count_empty(), 0);
        assert!(game.flatten().iter().all(|&v| v == 2 || v == 4));
        assert_eq!(game.with_random_tile(&mut rng), game);
    }

    #[test]
    fn it_count_empty() {
        let game = board([[2, 2, 2, 2], [0; 4], [2, 2, 2, 2], [0; 4]]);
        assert_eq!(game.count_empty(), 8);
        let game = board([[2, 2, 0, 0], [0; 4], [0; 4], [0; 4]]);
        assert_eq!(game.count_empty(), 14);
        assert_eq!(game.empty_cells().next(), Cell::new(0, 2));
    }

    #[test]
    fn it_game_over() {
        let stuck = board([[2, 4, 2, 4], [4, 2, 4, 2], [2, 4, 2, 4], [4, 2, 4, 2]]);
        assert!(stuck.is_game_over());
        assert!(!stuck.with_tile(Cell { row: 0, col: 1 }, 2).is_game_over());
    }

    #[test]
    fn it_move_index_roundtrip() {
        for (i, dir) in Move::ALL.iter().enumerate() {
            assert_eq!(dir.index(), i);
            assert_eq!(Move::from_index(i), Some(*dir));
        }
        assert_eq!(Move::from_index(4), None);
    }

    #[test]
    fn it_cell_bounds() {
        assert!(Cell::new(3, 3).is_some());
        assert!(Cell::new(4, 0).is_none());
        assert_eq!(Cell::all().count(), 16);
        assert_eq!(Cell::all().last().map(Cell::index), Some(15));
    }
}
