//! The puzzle instance a front end displays and manipulates.

use std::sync::Arc;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::encoding::StateKey;
use crate::error::{Error, InvalidStateError};
use crate::moves::MoveSequence;
use crate::puzzle::{GoalSet, Puzzle, PuzzleKind, PuzzleMove};
use crate::state::PuzzleState;

/// Describes the puzzle an [`Environment`] holds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvironmentConfig {
    /// The puzzle model.
    pub kind: PuzzleKind,
    /// The marked goal piece for index-encoded puzzles.
    pub goal: Option<u16>,
}

/// A puzzle together with its current configuration.
///
/// ```rust
/// use cube_rl::{Environment, EnvironmentConfig};
/// use rand::{rngs::StdRng, SeedableRng};
///
/// let mut env = Environment::new(&EnvironmentConfig::default()).unwrap();
/// assert!(env.is_solved());
///
/// env.scramble(5, &mut StdRng::seed_from_u64(1));
/// assert_eq!(env.history().len(), 5);
/// ```
#[derive(Debug, Clone)]
pub struct Environment {
    puzzle: Arc<Puzzle>,
    goals: Arc<GoalSet>,
    state: PuzzleState,
    history: MoveSequence<PuzzleMove>,
}

impl Environment {
    /// Create an environment in the solved configuration.
    pub fn new(config: &EnvironmentConfig) -> Result<Self, Error> {
        let puzzle = Puzzle::new(config.kind, config.goal)?;
        let goals = puzzle.goal_set();
        debug!(
            "Created {:?} environment with {} slots, {} moves and {} goal keys",
            config.kind,
            puzzle.slots(),
            puzzle.moves().len(),
            goals.len()
        );

        Ok(Self {
            state: puzzle.solved(),
            puzzle: Arc::new(puzzle),
            goals: Arc::new(goals),
            history: MoveSequence::default(),
        })
    }

    /// The puzzle model.
    pub fn puzzle(&self) -> &Arc<Puzzle> {
        &self.puzzle
    }

    /// The keys counted as solved.
    pub fn goals(&self) -> &Arc<GoalSet> {
        &self.goals
    }

    /// The canonical solved key.
    pub fn goal_key(&self) -> &StateKey {
        self.goals.canonical()
    }

    /// The current configuration.
    pub fn current_state(&self) -> &PuzzleState {
        &self.state
    }

    /// The key of the current configuration.
    pub fn current_key(&self) -> StateKey {
        self.puzzle.key(&self.state)
    }

    /// Whether the current configuration is solved.
    pub fn is_solved(&self) -> bool {
        self.goals.contains(&self.current_key())
    }

    /// Moves applied since the environment was created or last reset.
    pub fn history(&self) -> &MoveSequence<PuzzleMove> {
        &self.history
    }

    /// Apply a move to the current configuration and return the new key. The history records
    /// the move as the puzzle lists it.
    pub fn apply_move(&mut self, mv: PuzzleMove) -> Result<StateKey, Error> {
        let index = self.puzzle.move_index(mv).ok_or(Error::IllegalMove(mv))?;
        self.state = self.puzzle.step_index(&self.state, index)?;
        self.history.push(self.puzzle.moves()[index]);
        Ok(self.current_key())
    }

    /// Apply `steps` uniformly random moves and return the new key.
    pub fn scramble<R: Rng + ?Sized>(&mut self, steps: usize, rng: &mut R) -> StateKey {
        for _ in 0..steps {
            let index = rng.gen_range(0..self.puzzle.moves().len());
            // Environment states always have the puzzle's slot count
            if let Ok(next) = self.puzzle.step_index(&self.state, index) {
                self.state = next;
                self.history.push(self.puzzle.moves()[index]);
            }
        }
        self.current_key()
    }

    /// Jump to the configuration described by `key`.
    pub fn set_key(&mut self, key: &StateKey) -> Result<(), InvalidStateError> {
        self.state = self.puzzle.decode(key)?;
        self.history = MoveSequence::default();
        Ok(())
    }

    /// Jump to an unsolved configuration drawn the same way training episodes start.
    pub fn random_start<R: Rng + ?Sized>(&mut self, scramble_depth: usize, rng: &mut R) -> StateKey {
        self.state = self.puzzle.random_start(&self.goals, scramble_depth, rng);
        self.history = MoveSequence::default();
        self.current_key()
    }

    /// Return to the solved configuration.
    pub fn reset(&mut self) {
        self.state = self.puzzle.solved();
        self.history = MoveSequence::default();
    }
}
