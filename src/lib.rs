//! Tabular Q-learning pursuers for a grid chase game
//!
//! Two (or more) pursuers share one Q-table over a 27-state encoding of their offset to the
//! target, pick moves epsilon-greedily, and learn with one-step Q-learning from shaped rewards.
//! The table is pretrained on random boards before play and written through to a [`store::Store`]
//! after every live tick.

/// Tabular learner: Q-table, greedy policy, update rule
pub mod algo;

/// Pursuer context object used by the game
pub mod agent;

/// Tunables and TOML loading
pub mod config;

/// Strategies for time-decaying hyperparameters
pub mod decay;

/// The board during a tick
pub mod env;

/// Crate error type
pub mod error;

/// Exploration policies
pub mod exploration;

/// Level layout, lives and score, tick source
pub mod game;

/// Positions, actions and movement rules
pub mod grid;

/// Reward shaping
pub mod reward;

/// One live tick for every pursuer
pub mod runner;

/// State discretization
pub mod state;

/// Persistence backends
pub mod store;

/// Offline pretraining
pub mod trainer;

/// Terminal dashboard
#[cfg(feature = "viz")]
pub mod viz;

mod util;

pub use agent::Agent;
pub use config::Config;
pub use error::{Error, Result};
