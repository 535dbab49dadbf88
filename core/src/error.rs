use std::fmt;

use crate::geometry::{MoveRule, Position};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum VerifyError {
    TurnBudgetExceeded {
        actions: usize,
        turns: u32,
    },
    TargetOutOfRange {
        action: usize,
        target: usize,
        monsters: usize,
    },
    TargetDefeated {
        action: usize,
        target: usize,
    },
    TargetNotInRange {
        action: usize,
        target: usize,
        distance_squared: i64,
        range: i64,
    },
    MoveOutOfReach {
        action: usize,
        from: Position,
        to: Position,
        speed: i64,
        rule: MoveRule,
    },
    ScoreMismatch {
        claimed: i64,
        computed: i64,
    },
}

impl fmt::Display for VerifyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TurnBudgetExceeded { actions, turns } => {
                write!(f, "{actions} actions exceed the turn budget of {turns}")
            }
            Self::TargetOutOfRange {
                action,
                target,
                monsters,
            } => write!(
                f,
                "action {action}: attack target {target} outside roster of {monsters}"
            ),
            Self::TargetDefeated { action, target } => {
                write!(f, "action {action}: monster {target} is already defeated")
            }
            Self::TargetNotInRange {
                action,
                target,
                distance_squared,
                range,
            } => write!(
                f,
                "action {action}: monster {target} at squared distance {distance_squared} is beyond range {range}"
            ),
            Self::MoveOutOfReach {
                action,
                from,
                to,
                speed,
                rule,
            } => write!(
                f,
                "action {action}: move {from} -> {to} exceeds speed {speed} ({} rule)",
                rule.as_str()
            ),
            Self::ScoreMismatch { claimed, computed } => {
                write!(f, "score mismatch: claimed={claimed}, computed={computed}")
            }
        }
    }
}

impl std::error::Error for VerifyError {}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ParameterError {
    Missing { name: String },
}

impl fmt::Display for ParameterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing { name } => write!(f, "grid point has no value for parameter '{name}'"),
        }
    }
}

impl std::error::Error for ParameterError {}
