use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicU8, AtomicUsize, Ordering};
use std::sync::Arc;

use serde::Serialize;

/// Where a trainer is in its lifecycle. The terminal phases all count as idle: a new
/// session may start from any of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Phase {
    /// No session has run yet.
    Idle,
    /// A session is running.
    Training,
    /// The last session reached its target reward.
    Converged,
    /// The last session was cancelled.
    Cancelled,
    /// The last session used up its episode budget.
    Exhausted,
    /// The last session stopped on an invalid state.
    Aborted,
}

impl Phase {
    const ARRAY: [Phase; 6] = [
        Phase::Idle,
        Phase::Training,
        Phase::Converged,
        Phase::Cancelled,
        Phase::Exhausted,
        Phase::Aborted,
    ];
}

/// A cooperative cancellation flag shared between a running session and its observers.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Ask the session to stop after its current step.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Whether cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// A point-in-time copy of a session's counters, for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Progress {
    /// Lifecycle phase.
    pub phase: Phase,
    /// Episodes finished so far.
    pub episode: u64,
    /// Current exploration rate.
    pub epsilon: f64,
    /// Current learning rate.
    pub alpha: f64,
    /// Reward of the latest episode.
    pub last_reward: f64,
    /// Highest episode reward seen.
    pub max_reward: f64,
    /// Mean reward of the current window.
    pub average_reward: f64,
    /// Highest mean of a full window.
    pub best_average: f64,
    /// Number of states in the Q-table.
    pub states: usize,
}

// f64 counters stored as their bit patterns.
#[derive(Debug)]
struct AtomicF64(AtomicU64);

impl AtomicF64 {
    fn new(v: f64) -> Self {
        Self(AtomicU64::new(v.to_bits()))
    }

    fn load(&self) -> f64 {
        f64::from_bits(self.0.load(Ordering::Relaxed))
    }

    fn store(&self, v: f64) {
        self.0.store(v.to_bits(), Ordering::Relaxed)
    }
}

/// Counters published by the training loop. Every field is written by the worker alone and
/// read with relaxed ordering, so a snapshot may mix values from adjacent episodes.
#[derive(Debug)]
pub(crate) struct Session {
    phase: AtomicU8,
    episode: AtomicU64,
    epsilon: AtomicF64,
    alpha: AtomicF64,
    last_reward: AtomicF64,
    max_reward: AtomicF64,
    average_reward: AtomicF64,
    best_average: AtomicF64,
    states: AtomicUsize,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            phase: AtomicU8::new(Phase::Idle as u8),
            episode: AtomicU64::new(0),
            epsilon: AtomicF64::new(0.0),
            alpha: AtomicF64::new(0.0),
            last_reward: AtomicF64::new(0.0),
            max_reward: AtomicF64::new(f64::NEG_INFINITY),
            average_reward: AtomicF64::new(0.0),
            best_average: AtomicF64::new(f64::NEG_INFINITY),
            states: AtomicUsize::new(0),
        }
    }
}

impl Session {
    pub fn reset(&self, epsilon: f64, alpha: f64) {
        self.episode.store(0, Ordering::Relaxed);
        self.epsilon.store(epsilon);
        self.alpha.store(alpha);
        self.last_reward.store(0.0);
        self.max_reward.store(f64::NEG_INFINITY);
        self.average_reward.store(0.0);
        self.best_average.store(f64::NEG_INFINITY);
        self.states.store(0, Ordering::Relaxed);
    }

    pub fn phase(&self) -> Phase {
        Phase::ARRAY[self.phase.load(Ordering::Relaxed) as usize]
    }

    pub fn set_phase(&self, phase: Phase) {
        self.phase.store(phase as u8, Ordering::Relaxed);
    }

    pub fn set_rates(&self, epsilon: f64, alpha: f64) {
        self.epsilon.store(epsilon);
        self.alpha.store(alpha);
    }

    /// Record a finished episode.
    pub fn record(&self, episode: u64, reward: f64, window: &RewardWindow, states: usize) {
        self.episode.store(episode, Ordering::Relaxed);
        self.last_reward.store(reward);
        if reward > self.max_reward.load() {
            self.max_reward.store(reward);
        }
        let average = window.mean();
        self.average_reward.store(average);
        if window.is_full() && average > self.best_average.load() {
            self.best_average.store(average);
        }
        self.states.store(states, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> Progress {
        Progress {
            phase: self.phase(),
            episode: self.episode.load(Ordering::Relaxed),
            epsilon: self.epsilon.load(),
            alpha: self.alpha.load(),
            last_reward: self.last_reward.load(),
            max_reward: self.max_reward.load(),
            average_reward: self.average_reward.load(),
            best_average: self.best_average.load(),
            states: self.states.load(Ordering::Relaxed),
        }
    }
}

/// The most recent episode rewards.
#[derive(Debug, Clone)]
pub(crate) struct RewardWindow {
    rewards: VecDeque<f64>,
    size: usize,
}

impl RewardWindow {
    pub fn new(size: usize) -> Self {
        Self {
            rewards: VecDeque::with_capacity(size),
            size,
        }
    }

    pub fn push(&mut self, reward: f64) {
        if self.rewards.len() == self.size {
            self.rewards.pop_front();
        }
        self.rewards.push_back(reward);
    }

    pub fn is_full(&self) -> bool {
        self.rewards.len() == self.size
    }

    /// Zero while empty.
    pub fn mean(&self) -> f64 {
        if self.rewards.is_empty() {
            return 0.0;
        }
        self.rewards.iter().sum::<f64>() / self.rewards.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_slides() {
        let mut window = RewardWindow::new(3);
        assert_eq!(window.mean(), 0.0);
        for r in [1.0, 2.0, 3.0] {
            assert!(!window.is_full());
            window.push(r);
        }
        assert!(window.is_full());
        assert_eq!(window.mean(), 2.0);
        window.push(10.0);
        assert!(window.is_full());
        assert_eq!(window.mean(), 5.0);
    }

    #[test]
    fn session_counters() {
        let session = Session::default();
        assert_eq!(session.phase(), Phase::Idle);
        session.reset(1.0, 0.5);
        session.set_phase(Phase::Training);

        let mut window = RewardWindow::new(2);
        window.push(-50.0);
        session.record(1, -50.0, &window, 4);
        window.push(90.0);
        session.record(2, 90.0, &window, 6);
        window.push(80.0);
        session.record(3, 80.0, &window, 6);

        let p = session.snapshot();
        assert_eq!(p.phase, Phase::Training);
        assert_eq!(p.episode, 3);
        assert_eq!(p.last_reward, 80.0);
        assert_eq!(p.max_reward, 90.0);
        assert_eq!(p.average_reward, 85.0);
        assert_eq!(p.best_average, 85.0);
        assert_eq!(p.states, 6);
        assert_eq!(p.epsilon, 1.0);

        session.set_phase(Phase::Cancelled);
        assert_eq!(session.snapshot().phase, Phase::Cancelled);
    }

    #[test]
    fn cancel_token_is_shared() {
        let token = CancelToken::default();
        let other = token.clone();
        assert!(!other.is_cancelled());
        token.cancel();
        assert!(other.is_cancelled());
    }
}
