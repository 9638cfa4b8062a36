use std::sync::Mutex;

use rand::Rng;

use super::session::CancelToken;
use super::table::{best_action, QTable};
use super::{lock, TrainingConfig};
use crate::error::InvalidStateError;
use crate::puzzle::{GoalSet, Puzzle};

/// Reward of every move.
pub(crate) const STEP_COST: f64 = -1.0;
/// Reward for reaching a goal, reduced by the number of moves it took.
pub(crate) const GOAL_BONUS: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EpisodeEnd {
    Solved,
    Failed,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Episode {
    pub reward: f64,
    pub steps: usize,
    pub end: EpisodeEnd,
    /// Potential of the last state reached minus that of the start.
    pub potential_gain: i64,
}

/// Shaped reward of the move from a state with potential `from` to one with potential `to`.
pub(crate) fn step_reward(from: usize, to: usize, gamma: f64, steps: usize, solved: bool) -> f64 {
    let mut reward = STEP_COST + gamma * to as f64 - from as f64;
    if solved {
        reward += GOAL_BONUS - steps as f64;
    }
    reward
}

/// Everything an episode reads but does not own.
pub(crate) struct Rollout<'a> {
    pub puzzle: &'a Puzzle,
    pub goals: &'a GoalSet,
    pub config: &'a TrainingConfig,
    pub table: &'a Mutex<QTable>,
    pub cancel: &'a CancelToken,
}

impl Rollout<'_> {
    /// Play one epsilon-greedy episode from a random start, updating the table after every
    /// move. A failed episode is worth `-max_steps` regardless of the rewards collected.
    pub fn run<R: Rng + ?Sized>(&self, epsilon: f64, alpha: f64, rng: &mut R) -> Result<Episode, InvalidStateError> {
        let Rollout {
            puzzle,
            goals,
            config,
            table,
            cancel,
        } = *self;
        let gamma = config.gamma;

        let mut state = puzzle.random_start(goals, config.scramble_depth, rng);
        let mut key = puzzle.key(&state);
        let mut potential = puzzle.potential(&key, goals);
        let start = potential as i64;
        let mut total = 0.0;

        for step in 0..config.max_steps {
            if cancel.is_cancelled() {
                return Ok(Episode {
                    reward: total,
                    steps: step,
                    end: EpisodeEnd::Cancelled,
                    potential_gain: potential as i64 - start,
                });
            }

            // selection, row creation and update happen under one lock
            let mut table = lock(table);
            let action = if rng.gen::<f64>() < epsilon {
                rng.gen_range(0..puzzle.moves().len())
            } else {
                best_action(table.row_or_insert(&key))
            };

            let next = puzzle.step_index(&state, action)?;
            let next_key = puzzle.key(&next);
            let next_potential = puzzle.potential(&next_key, goals);
            let solved = goals.contains(&next_key);

            let reward = step_reward(potential, next_potential, gamma, step + 1, solved);
            table.update(&key, action, reward, (!solved).then_some(&next_key), alpha, gamma);
            drop(table);

            total += reward;
            if solved {
                return Ok(Episode {
                    reward: total,
                    steps: step + 1,
                    end: EpisodeEnd::Solved,
                    potential_gain: next_potential as i64 - start,
                });
            }

            state = next;
            key = next_key;
            potential = next_potential;
        }

        Ok(Episode {
            reward: -(config.max_steps as f64),
            steps: config.max_steps,
            end: EpisodeEnd::Failed,
            potential_gain: potential as i64 - start,
        })
    }
}
