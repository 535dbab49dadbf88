//! Deterministic hero simulator and the grid-search policy engine built on it.
//!
//! Everything here is a pure function of its inputs: no I/O, no clock, no
//! randomness. A scenario plus an action log always replays to the same state.

pub mod action;
pub mod constants;
pub mod error;
pub mod geometry;
pub mod grid;
pub mod policy;
pub mod scenario;
pub mod state;
pub mod verify;

pub use action::{replay, Action, ActionLog, ActionRecord, Solution};
pub use error::{ParameterError, VerifyError};
pub use geometry::{MoveRule, Position};
pub use grid::{GridPoint, GridSearch, ParameterSpec};
pub use policy::{evaluate, evaluate_point, Evaluation, PolicyConfig, PolicyParams};
pub use scenario::{HeroTemplate, Monster, Scenario};
pub use state::{HeroStats, RunState, StateSnapshot};
pub use verify::{verify_claimed_score, verify_log, VerificationReport};
