//! Tabular Q-learning over a puzzle's move set, run on a background thread.
//!
//! A [`Trainer`] owns the Q-table and the published session counters. Starting it spawns one
//! worker which plays episodes until the reward window reaches its target, the episode budget
//! runs out, or the session is cancelled. Observers may read progress, cancel, or plan with the
//! table at any point while the worker runs.
//!
//! ```rust,no_run
//! use cube_rl::{Environment, EnvironmentConfig, Trainer, TrainingConfig};
//!
//! let env = Environment::new(&EnvironmentConfig::default()).unwrap();
//! let trainer = Trainer::new();
//! let handle = trainer
//!     .start(&env, TrainingConfig { max_episodes: Some(2000), ..Default::default() })
//!     .unwrap();
//! let report = handle.join();
//! println!("{:?} after {} episodes", report.outcome, report.episodes);
//!
//! let solution = trainer.solve(&env, &env.current_key(), 20).unwrap();
//! println!("{}", solution.moves);
//! ```

mod config;
mod episode;
mod session;
mod table;

pub use config::TrainingConfig;
pub use session::{CancelToken, Phase, Progress};
pub use table::{best_action, QTable};

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, error, info, warn};

use crate::encoding::StateKey;
use crate::environment::Environment;
use crate::error::{Error, InvalidStateError, TrainingAlreadyActive};
use crate::planner::{self, Solution};
use crate::puzzle::{GoalSet, Puzzle};
use episode::{EpisodeEnd, Rollout};
use session::{RewardWindow, Session};

// A panic elsewhere never leaves a row half written, so a poisoned table is still usable.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// How a training session ended.
#[derive(Debug, Clone, PartialEq)]
pub enum TrainingOutcome {
    /// The window average reached the target reward.
    Converged,
    /// The session was cancelled.
    Cancelled,
    /// The episode budget ran out first.
    Exhausted,
    /// The simulator rejected a state.
    Aborted(InvalidStateError),
}

/// Final counters of a session, handed to the completion callback and returned by
/// [`TrainingHandle::join`].
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingReport {
    /// How the session ended.
    pub outcome: TrainingOutcome,
    /// Episodes finished.
    pub episodes: u64,
    /// Mean reward of the final window.
    pub average_reward: f64,
    /// Highest mean of a full window.
    pub best_average: f64,
    /// Number of states in the Q-table.
    pub states: usize,
}

/// Clears the trainer's active flag however the worker exits.
struct ActiveGuard(Arc<AtomicBool>);

impl Drop for ActiveGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// A running session.
#[derive(Debug)]
pub struct TrainingHandle {
    thread: JoinHandle<TrainingReport>,
    cancel: CancelToken,
    session: Arc<Session>,
}

impl TrainingHandle {
    /// Ask the session to stop. The table learned so far is kept.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// A token that cancels this session, for handing to another owner.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Current counters.
    pub fn progress(&self) -> Progress {
        self.session.snapshot()
    }

    /// Whether the worker has exited.
    pub fn is_finished(&self) -> bool {
        self.thread.is_finished()
    }

    /// Wait for the session to end.
    pub fn join(self) -> TrainingReport {
        match self.thread.join() {
            Ok(report) => report,
            Err(payload) => std::panic::resume_unwind(payload),
        }
    }
}

/// Owns a Q-table and trains it, one session at a time.
#[derive(Debug)]
pub struct Trainer {
    table: Arc<Mutex<QTable>>,
    session: Arc<Session>,
    active: Arc<AtomicBool>,
    cancel: Mutex<CancelToken>,
}

impl Default for Trainer {
    fn default() -> Self {
        Self {
            table: Arc::new(Mutex::new(QTable::new(0, 0.0))),
            session: Arc::default(),
            active: Arc::default(),
            cancel: Mutex::default(),
        }
    }
}

impl Trainer {
    /// A trainer with an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a session on `env`'s puzzle. See [`start_with`](Self::start_with).
    pub fn start(&self, env: &Environment, config: TrainingConfig) -> Result<TrainingHandle, Error> {
        self.start_with(env, config, |_| {})
    }

    /// Start a session on `env`'s puzzle, calling `on_complete` exactly once when it ends.
    /// The session counts as active until `on_complete` returns.
    ///
    /// The table and counters are reset before this returns. If a session is already running
    /// it is left alone and [`TrainingAlreadyActive`] is returned.
    pub fn start_with<F>(
        &self,
        env: &Environment,
        config: TrainingConfig,
        on_complete: F,
    ) -> Result<TrainingHandle, Error>
    where
        F: FnOnce(&TrainingReport) + Send + 'static,
    {
        config.validate()?;
        if self
            .active
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            warn!("Ignoring training request, a session is already active");
            return Err(TrainingAlreadyActive.into());
        }
        let guard = ActiveGuard(self.active.clone());

        let puzzle = env.puzzle().clone();
        let goals = env.goals().clone();
        *lock(&self.table) = QTable::new(puzzle.moves().len(), config.q_init);
        self.session.reset(config.initial_epsilon, config.alpha);
        self.session.set_phase(Phase::Training);

        let cancel = CancelToken::default();
        *lock(&self.cancel) = cancel.clone();

        debug!(
            "Training {:?} with {} moves, {} goal keys, {:?}",
            puzzle.kind(),
            puzzle.moves().len(),
            goals.len(),
            config
        );

        let worker = Worker {
            puzzle,
            goals,
            config,
            table: self.table.clone(),
            session: self.session.clone(),
            cancel: cancel.clone(),
        };
        let thread = thread::spawn(move || {
            let report = worker.run();
            on_complete(&report);
            drop(guard);
            report
        });

        Ok(TrainingHandle {
            thread,
            cancel,
            session: self.session.clone(),
        })
    }

    /// Cancel the running session, if any.
    pub fn cancel(&self) {
        lock(&self.cancel).cancel();
    }

    /// Whether a session is running.
    pub fn is_training(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Counters of the running or most recent session.
    pub fn progress(&self) -> Progress {
        self.session.snapshot()
    }

    /// Greedily plan from `from` on `env`'s puzzle with a copy of the current table. This may
    /// run while a session is still training and never holds the table lock while planning.
    pub fn solve(&self, env: &Environment, from: &StateKey, max_depth: usize) -> Result<Solution, InvalidStateError> {
        let state = env.puzzle().decode(from)?;
        let table = self.table_snapshot();
        planner::solve(env.puzzle(), env.goals(), &table, &state, max_depth)
    }

    /// A copy of the current table.
    pub fn table_snapshot(&self) -> QTable {
        lock(&self.table).clone()
    }
}

struct Worker {
    puzzle: Arc<Puzzle>,
    goals: Arc<GoalSet>,
    config: TrainingConfig,
    table: Arc<Mutex<QTable>>,
    session: Arc<Session>,
    cancel: CancelToken,
}

impl Worker {
    fn run(self) -> TrainingReport {
        let config = &self.config;
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let rollout = Rollout {
            puzzle: &self.puzzle,
            goals: &self.goals,
            config,
            table: &self.table,
            cancel: &self.cancel,
        };
        info!(
            "Training started: alpha {}, gamma {}, target reward {}",
            config.alpha, config.gamma, config.target_reward
        );

        let mut window = RewardWindow::new(config.window_size);
        let mut episodes = 0u64;
        let outcome = loop {
            if self.cancel.is_cancelled() {
                break TrainingOutcome::Cancelled;
            }
            if config.max_episodes.is_some_and(|max| episodes >= max) {
                break TrainingOutcome::Exhausted;
            }

            let epsilon = config.epsilon_at(episodes);
            let alpha = config.alpha_at(episodes);
            self.session.set_rates(epsilon, alpha);

            let episode = match rollout.run(epsilon, alpha, &mut rng) {
                Ok(episode) => episode,
                Err(e) => {
                    error!("Training aborted on an invalid state: {e}");
                    break TrainingOutcome::Aborted(e);
                }
            };
            if episode.end == EpisodeEnd::Cancelled {
                break TrainingOutcome::Cancelled;
            }

            episodes += 1;
            debug!(
                "Episode {episodes} ended {:?} after {} steps, reward {:.2}, potential gain {}",
                episode.end, episode.steps, episode.reward, episode.potential_gain
            );
            window.push(episode.reward);
            let states = lock(&self.table).len();
            self.session.record(episodes, episode.reward, &window, states);

            if config.log_interval > 0 && episodes % config.log_interval == 0 {
                let mean = lock(&self.table).mean_value();
                info!(
                    "Episode {episodes}: epsilon {epsilon:.4}, alpha {alpha:.4}, window average {:.2}, {states} states, mean Q {mean:.4}",
                    window.mean()
                );
            }

            if window.is_full() && window.mean() >= config.target_reward {
                break TrainingOutcome::Converged;
            }
        };

        let progress = self.session.snapshot();
        let phase = match outcome {
            TrainingOutcome::Converged => Phase::Converged,
            TrainingOutcome::Cancelled => Phase::Cancelled,
            TrainingOutcome::Exhausted => Phase::Exhausted,
            TrainingOutcome::Aborted(_) => Phase::Aborted,
        };
        self.session.set_phase(phase);
        info!(
            "Training finished ({phase:?}) after {episodes} episodes, window average {:.2}",
            window.mean()
        );

        TrainingReport {
            outcome,
            episodes,
            average_reward: window.mean(),
            best_average: progress.best_average,
            states: progress.states,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::EnvironmentConfig;
    use crate::planner::SolveOutcome;
    use crate::puzzle::PuzzleKind;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    fn marked_corner() -> Environment {
        Environment::new(&EnvironmentConfig {
            kind: PuzzleKind::MarkedCorner,
            goal: Some(1),
        })
        .unwrap()
    }

    fn quick_config(seed: u64) -> TrainingConfig {
        TrainingConfig {
            alpha: 0.5,
            gamma: 0.9,
            decay_rate: 0.01,
            target_reward: 98.0,
            max_episodes: Some(3000),
            seed: Some(seed),
            ..Default::default()
        }
    }

    fn unbounded_config() -> TrainingConfig {
        TrainingConfig {
            target_reward: 1000.0,
            max_episodes: None,
            seed: Some(5),
            ..Default::default()
        }
    }

    fn wait_for_episodes(trainer: &Trainer, n: u64) {
        while trainer.progress().episode < n {
            thread::sleep(Duration::from_millis(1));
        }
    }

    #[test]
    fn learns_the_marked_corner() {
        let env = marked_corner();
        let trainer = Trainer::new();
        let report = trainer.start(&env, quick_config(42)).unwrap().join();

        assert!(
            matches!(
                report.outcome,
                TrainingOutcome::Converged | TrainingOutcome::Exhausted
            ),
            "{report:?}"
        );
        assert!(report.average_reward >= 90.0, "{report:?}");
        assert!(!trainer.is_training());
        // the goal slot is terminal, every other slot has been visited
        assert_eq!(report.states, 7);

        // every start is solved greedily
        for slot in [0, 2, 3, 4, 5, 6, 7] {
            let solution = trainer.solve(&env, &StateKey::from(vec![slot]), 10).unwrap();
            assert_eq!(solution.outcome, SolveOutcome::Solved, "from {slot}");
            assert!(solution.moves.len() <= 3);
        }
    }

    #[test]
    fn fresh_trainer_is_idle() {
        let trainer = Trainer::new();
        assert!(trainer.table_snapshot().is_empty());
        assert!(!trainer.is_training());
        assert_eq!(trainer.progress().phase, Phase::Idle);
        assert!(Trainer::default().table_snapshot().is_empty());
    }

    #[test]
    fn completion_runs_before_the_session_ends() {
        let env = marked_corner();
        let trainer = Trainer::new();
        let active = trainer.active.clone();
        let seen_active = Arc::new(AtomicBool::new(false));
        let seen = seen_active.clone();
        let handle = trainer
            .start_with(&env, TrainingConfig { max_episodes: Some(3), ..quick_config(1) }, move |_| {
                seen.store(active.load(Ordering::Acquire), Ordering::SeqCst);
            })
            .unwrap();
        assert_eq!(handle.join().outcome, TrainingOutcome::Exhausted);
        assert!(seen_active.load(Ordering::SeqCst));
        assert!(!trainer.is_training());
    }

    #[test]
    fn unbounded_solve_returns_while_training() {
        let env = marked_corner();
        let trainer = Trainer::new();
        let handle = trainer.start(&env, unbounded_config()).unwrap();
        wait_for_episodes(&trainer, 10);

        // seven unsolved slots, so a greedy rollout either ends or repeats within seven moves
        let solution = trainer.solve(&env, &StateKey::from(vec![4]), usize::MAX).unwrap();
        assert!(solution.moves.len() <= 7);
        assert!(trainer.is_training());

        trainer.cancel();
        assert_eq!(handle.join().outcome, TrainingOutcome::Cancelled);
    }

    #[test]
    fn seeded_sessions_are_reproducible() {
        let env = marked_corner();
        let config = TrainingConfig {
            max_episodes: Some(200),
            ..quick_config(3)
        };
        let a = Trainer::new();
        let b = Trainer::new();
        let ra = a.start(&env, config.clone()).unwrap().join();
        let rb = b.start(&env, config).unwrap().join();
        assert_eq!(ra, rb);
        assert_eq!(a.table_snapshot(), b.table_snapshot());
    }

    #[test]
    fn second_start_is_rejected() {
        let env = marked_corner();
        let trainer = Trainer::new();
        let handle = trainer.start(&env, unbounded_config()).unwrap();
        wait_for_episodes(&trainer, 5);

        assert!(trainer.is_training());
        assert!(matches!(
            trainer.start(&env, unbounded_config()),
            Err(Error::AlreadyActive(TrainingAlreadyActive))
        ));
        // the first session is still the one running
        assert!(!handle.is_finished());

        trainer.cancel();
        assert_eq!(handle.join().outcome, TrainingOutcome::Cancelled);
        assert!(!trainer.is_training());
        assert_eq!(trainer.progress().phase, Phase::Cancelled);
    }

    #[test]
    fn cancel_keeps_a_consistent_table() {
        let env = Environment::new(&EnvironmentConfig {
            kind: PuzzleKind::Corners,
            goal: None,
        })
        .unwrap();
        let trainer = Trainer::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let handle = trainer
            .start_with(&env, unbounded_config(), move |report| {
                assert_eq!(report.outcome, TrainingOutcome::Cancelled);
                counter.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap();
        wait_for_episodes(&trainer, 20);

        // planning while training reads a whole table
        let key = env.current_key();
        assert!(trainer.solve(&env, &key, 5).unwrap().moves.is_empty());

        handle.cancel_token().cancel();
        let report = handle.join();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(report.episodes >= 20);

        let table = trainer.table_snapshot();
        assert!(!table.is_empty());
        assert!(table.iter().all(|(_, row)| row.len() == 12));

        // a new session may start once the old one has ended
        let handle = trainer
            .start(&env, TrainingConfig { max_episodes: Some(1), ..unbounded_config() })
            .unwrap();
        assert_eq!(handle.join().outcome, TrainingOutcome::Exhausted);
    }

    #[test]
    fn invalid_config_is_rejected_before_starting() {
        let trainer = Trainer::new();
        let config = TrainingConfig {
            alpha: 0.0,
            ..Default::default()
        };
        assert!(matches!(
            trainer.start(&marked_corner(), config),
            Err(Error::Config(_))
        ));
        assert!(!trainer.is_training());
        assert_eq!(trainer.progress().phase, Phase::Idle);
    }

    #[test]
    fn solve_is_deterministic_and_bounded() {
        let env = Environment::new(&EnvironmentConfig {
            kind: PuzzleKind::CornerPermutation,
            goal: None,
        })
        .unwrap();
        let trainer = Trainer::new();
        let config = TrainingConfig {
            max_episodes: Some(300),
            scramble_depth: 4,
            seed: Some(8),
            ..Default::default()
        };
        trainer.start(&env, config).unwrap().join();

        let mut scrambled = env.clone();
        scrambled.scramble(6, &mut StdRng::seed_from_u64(2));
        let from = scrambled.current_key();
        for depth in [0, 1, 3, 8] {
            let a = trainer.solve(&env, &from, depth).unwrap();
            let b = trainer.solve(&env, &from, depth).unwrap();
            assert!(a.moves.len() <= depth);
            assert_eq!(a, b);
        }
    }

    #[test]
    fn solve_rejects_malformed_keys() {
        let env = marked_corner();
        let trainer = Trainer::new();
        assert!(trainer.solve(&env, &StateKey::from(vec![9]), 5).is_err());
        assert!(trainer.solve(&env, &StateKey::from(vec![]), 5).is_err());
    }
}
