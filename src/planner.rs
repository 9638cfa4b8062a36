//! Greedy rollouts of a learned policy.

use std::collections::HashSet;

use tracing::warn;

use crate::error::{EmptyPolicyWarning, InvalidStateError};
use crate::moves::MoveSequence;
use crate::puzzle::{GoalSet, Puzzle, PuzzleMove};
use crate::qlearning::{best_action, QTable};
use crate::state::PuzzleState;

/// Why a rollout stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SolveOutcome {
    /// The moves lead to a goal.
    Solved,
    /// The depth limit was reached first.
    DepthLimit,
    /// A state on the way has no learned values.
    NoPolicy(EmptyPolicyWarning),
    /// The policy led back to a state it had already visited.
    Cycle,
}

/// A planned move sequence and how planning ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Solution {
    /// The moves found, at most the requested depth.
    pub moves: MoveSequence<PuzzleMove>,
    /// Why planning stopped.
    pub outcome: SolveOutcome,
}

impl Solution {
    /// Whether the moves reach a goal.
    pub fn is_solved(&self) -> bool {
        self.outcome == SolveOutcome::Solved
    }
}

/// Follow the highest valued move of each state from `from` until a goal is reached, the
/// sequence is `max_depth` moves long, or a state without a row is met. Ties go to the move
/// listed first by the puzzle, so the result is a pure function of the table and start.
///
/// A greedy policy is deterministic, so revisiting a state means it loops forever; the rollout
/// stops there and reports [`SolveOutcome::Cycle`]. This bounds every rollout by the number of
/// distinct keys even when `max_depth` is `usize::MAX`.
///
/// A table built for a different move set has no policy for any state.
pub fn solve(
    puzzle: &Puzzle,
    goals: &GoalSet,
    table: &QTable,
    from: &PuzzleState,
    max_depth: usize,
) -> Result<Solution, InvalidStateError> {
    if from.len() != puzzle.slots() {
        return Err(InvalidStateError::WrongLength {
            expected: puzzle.slots(),
            found: from.len(),
        });
    }

    let mut moves = MoveSequence::default();
    let mut seen = HashSet::new();
    let mut state = from.clone();
    let outcome = loop {
        let key = puzzle.key(&state);
        if goals.contains(&key) {
            break SolveOutcome::Solved;
        }
        if !seen.insert(key.clone()) {
            break SolveOutcome::Cycle;
        }
        if moves.len() >= max_depth {
            break SolveOutcome::DepthLimit;
        }
        let row = table
            .row(&key)
            .filter(|row| row.len() == puzzle.moves().len());
        let Some(row) = row else {
            let warning = EmptyPolicyWarning { key };
            warn!("Stopping after {} moves: {warning}", moves.len());
            break SolveOutcome::NoPolicy(warning);
        };

        let action = best_action(row);
        state = puzzle.step_index(&state, action)?;
        moves.push(puzzle.moves()[action]);
    };

    Ok(Solution { moves, outcome })
}
