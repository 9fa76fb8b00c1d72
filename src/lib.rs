//! searchai: expectimax move selection for 2048
//!
//! This crate provides:
//! - A value-type `Board` with the classic slide/merge rules behind the
//!   `engine::Rules` trait (`shift`, `make_move`, `is_game_over`, ...)
//! - An Expectimax policy (`expectimax` module) with single-threaded and
//!   parallel variants, scored by a monotonicity / first-row / corner heuristic
//!
//! Quick start:
//! ```
//! use searchai::engine::{Board, Move};
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! // Deterministic board initialization with a seeded RNG
//! let mut rng = StdRng::seed_from_u64(42);
//! let b0 = Board::EMPTY.with_random_tile(&mut rng).with_random_tile(&mut rng);
//! let b1 = b0.shift(Move::Left);
//! assert!(b1.count_empty() >= 14);
//! ```
//!
//! Full loop (simplest possible)
//! ```
//! use searchai::engine::Board;
//! use searchai::expectimax::Expectimax;
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! let mut policy = Expectimax::new();
//! let mut rng = StdRng::seed_from_u64(123);
//!
//! let mut b = Board::EMPTY.with_random_tile(&mut rng).with_random_tile(&mut rng);
//! let mut moves = 0u32;
//!
//! // keep doctests fast
//! while !b.is_game_over() && moves < 4 {
//!     let dir = policy.find_best_move(b).unwrap();
//!     b = b.make_move(dir, &mut rng);
//!     moves += 1;
//! }
//! assert!(b.highest_tile() >= 2);
//! ```
//!
pub mod engine;
pub mod expectimax;
