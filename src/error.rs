//! This module defines the error types used throughout the crate.

use thiserror::Error;

use crate::encoding::StateKey;
use crate::puzzle::PuzzleMove;

/// A puzzle configuration or key was malformed. This is fatal for the operation that received
/// it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidStateError {
    /// the state (or key) had the wrong number of entries for this puzzle
    #[error("expected {expected} entries but found {found}")]
    WrongLength {
        /// The length the puzzle requires.
        expected: usize,
        /// The length that was supplied.
        found: usize,
    },
    /// a piece identity was not a slot of the puzzle
    #[error("piece {id} does not exist on a puzzle with {slots} slots")]
    PieceOutOfRange {
        /// The offending identity.
        id: u16,
        /// Number of slots on the puzzle.
        slots: usize,
    },
    /// the same piece identity appeared twice, so the pieces are not a permutation
    #[error("piece {id} appears more than once")]
    DuplicatePiece {
        /// The repeated identity.
        id: u16,
    },
    /// an orientation was not reduced modulo the orientation order
    #[error("slot {slot} has orientation {orientation}, which is not below {order}")]
    OrientationOutOfRange {
        /// Slot holding the bad piece.
        slot: usize,
        /// The orientation found there.
        orientation: u8,
        /// The orientation group order.
        order: u8,
    },
    /// an index key named a slot that does not exist
    #[error("slot {slot} does not exist on a puzzle with {slots} slots")]
    SlotOutOfRange {
        /// The slot named by the key.
        slot: usize,
        /// Number of slots on the puzzle.
        slots: usize,
    },
}

/// A puzzle could not be constructed from the given description.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidPuzzleError {
    /// grid dimensions must lie within the supported range
    #[error("grid dimension {size} is outside {min}..={max}")]
    GridDimension {
        /// The rejected dimension.
        size: usize,
        /// Smallest supported dimension.
        min: usize,
        /// Largest supported dimension.
        max: usize,
    },
    /// the marked goal piece is not a slot of the puzzle
    #[error("goal piece {goal} does not exist on a puzzle with {slots} slots")]
    GoalOutOfRange {
        /// The requested goal identity.
        goal: u16,
        /// Number of slots on the puzzle.
        slots: usize,
    },
    /// only index-encoded puzzles track a single goal piece
    #[error("this puzzle has a fixed solved state and does not take a goal piece")]
    GoalNotSupported,
}

/// A training configuration value was out of range.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// a rate or probability was outside its allowed interval
    #[error("{name} must lie in {range}, got {value}")]
    OutOfRange {
        /// Name of the configuration field.
        name: &'static str,
        /// Human readable description of the allowed interval.
        range: &'static str,
        /// The rejected value.
        value: f64,
    },
    /// a count which must be positive was zero
    #[error("{0} must be positive")]
    Zero(&'static str),
    /// the exploration floor was above the starting exploration rate
    #[error("min_epsilon ({min}) is greater than initial_epsilon ({initial})")]
    EpsilonOrder {
        /// Configured floor.
        min: f64,
        /// Configured starting value.
        initial: f64,
    },
}

/// A training session was requested while another one is still running. The running session
/// is left untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("a training session is already active")]
pub struct TrainingAlreadyActive;

/// The planner reached a state that has no Q-table row. This is not an error: the planner
/// returns the moves it found before reaching that state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmptyPolicyWarning {
    /// The state with no learned values.
    pub key: StateKey,
}

impl std::fmt::Display for EmptyPolicyWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "no Q-values for state {}", self.key)
    }
}

/// Crate level error, wrapping every failure an operation can report.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// See [`InvalidStateError`].
    #[error(transparent)]
    InvalidState(#[from] InvalidStateError),
    /// See [`InvalidPuzzleError`].
    #[error(transparent)]
    InvalidPuzzle(#[from] InvalidPuzzleError),
    /// See [`ConfigError`].
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// See [`TrainingAlreadyActive`].
    #[error(transparent)]
    AlreadyActive(#[from] TrainingAlreadyActive),
    /// the move does not belong to the puzzle it was applied to
    #[error("move {0} is not legal on this puzzle")]
    IllegalMove(PuzzleMove),
}
