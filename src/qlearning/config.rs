use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Hyperparameters of a training session.
///
/// Missing fields take their default when deserialized, so a config file only needs to name
/// what it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    /// Initial learning rate.
    pub alpha: f64,
    /// Discount factor.
    pub gamma: f64,
    /// Exploration rate of the first episode.
    pub initial_epsilon: f64,
    /// Floor of the exploration rate.
    pub min_epsilon: f64,
    /// Rate of the exponential exploration decay, per episode.
    pub decay_rate: f64,
    /// Moves allowed per episode before it counts as failed.
    pub max_steps: usize,
    /// Number of recent episodes averaged for convergence.
    pub window_size: usize,
    /// Window average at which training stops.
    pub target_reward: f64,
    /// Episode budget. `None` trains until convergence or cancellation.
    pub max_episodes: Option<u64>,
    /// Random moves used to scramble start states of permutation puzzles.
    pub scramble_depth: usize,
    /// Per-episode factor applied to the learning rate.
    pub alpha_decay: f64,
    /// Floor of the learning rate.
    pub min_alpha: f64,
    /// Value every move of a newly visited state starts with.
    pub q_init: f64,
    /// Seed for a reproducible session.
    pub seed: Option<u64>,
    /// Episodes between progress log lines. Zero disables them.
    pub log_interval: u64,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            alpha: 0.1,
            gamma: 0.9,
            initial_epsilon: 1.0,
            min_epsilon: 0.01,
            decay_rate: 1e-5,
            max_steps: 50,
            window_size: 50,
            target_reward: 99.9,
            max_episodes: None,
            scramble_depth: 10,
            alpha_decay: 0.9999,
            min_alpha: 0.001,
            q_init: 0.001,
            seed: None,
            log_interval: 500,
        }
    }
}

fn check(name: &'static str, range: &'static str, value: f64, ok: bool) -> Result<(), ConfigError> {
    if ok {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange { name, range, value })
    }
}

impl TrainingConfig {
    /// Reject configurations that cannot train.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check("alpha", "(0, 1]", self.alpha, self.alpha > 0.0 && self.alpha <= 1.0)?;
        check("gamma", "[0, 1]", self.gamma, (0.0..=1.0).contains(&self.gamma))?;
        check(
            "initial_epsilon",
            "[0, 1]",
            self.initial_epsilon,
            (0.0..=1.0).contains(&self.initial_epsilon),
        )?;
        check(
            "min_epsilon",
            "[0, 1]",
            self.min_epsilon,
            (0.0..=1.0).contains(&self.min_epsilon),
        )?;
        if self.min_epsilon > self.initial_epsilon {
            return Err(ConfigError::EpsilonOrder {
                min: self.min_epsilon,
                initial: self.initial_epsilon,
            });
        }
        check(
            "decay_rate",
            "[0, inf)",
            self.decay_rate,
            self.decay_rate >= 0.0 && self.decay_rate.is_finite(),
        )?;
        check(
            "alpha_decay",
            "(0, 1]",
            self.alpha_decay,
            self.alpha_decay > 0.0 && self.alpha_decay <= 1.0,
        )?;
        check(
            "min_alpha",
            "(0, alpha]",
            self.min_alpha,
            self.min_alpha > 0.0 && self.min_alpha <= self.alpha,
        )?;
        check("target_reward", "finite values", self.target_reward, self.target_reward.is_finite())?;
        check("q_init", "finite values", self.q_init, self.q_init.is_finite())?;
        if self.max_steps == 0 {
            return Err(ConfigError::Zero("max_steps"));
        }
        if self.window_size == 0 {
            return Err(ConfigError::Zero("window_size"));
        }
        if self.max_episodes == Some(0) {
            return Err(ConfigError::Zero("max_episodes"));
        }
        Ok(())
    }

    /// Exploration rate of episode `episode`.
    pub fn epsilon_at(&self, episode: u64) -> f64 {
        (self.initial_epsilon * (-self.decay_rate * episode as f64).exp()).max(self.min_epsilon)
    }

    /// Learning rate of episode `episode`. Never drops below `min_alpha`.
    pub fn alpha_at(&self, episode: u64) -> f64 {
        let exponent = i32::try_from(episode).unwrap_or(i32::MAX);
        (self.alpha * self.alpha_decay.powi(exponent)).max(self.min_alpha)
    }
}
