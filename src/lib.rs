//! A library which models small twisty puzzles as permutation/orientation algebra and learns to
//! solve them with tabular Q-learning.
//!
//! An [`Environment`] holds a puzzle and its current configuration, a [`Trainer`] learns a
//! Q-table for it on a background thread, and [`planner::solve`] turns a table into a move
//! sequence.

#![deny(missing_docs)]

pub mod cube2;
pub mod encoding;
pub mod environment;
pub mod error;
pub mod grid;
pub mod moves;
pub mod planner;
pub mod puzzle;
pub mod qlearning;
pub mod state;

pub use encoding::StateKey;
pub use environment::{Environment, EnvironmentConfig};
pub use error::Error;
pub use planner::{Solution, SolveOutcome};
pub use puzzle::{Puzzle, PuzzleKind, PuzzleMove};
pub use qlearning::{Trainer, TrainingConfig, TrainingHandle, TrainingOutcome, TrainingReport};
