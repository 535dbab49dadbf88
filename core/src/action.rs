//! Applied transitions, the replayable log they form, and their wire records.

use serde::{Deserialize, Serialize};

use crate::geometry::Position;
use crate::scenario::Scenario;
use crate::state::{RunState, StateSnapshot};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Action {
    Move {
        to: Position,
        comment: Option<String>,
    },
    Attack {
        target: usize,
        comment: Option<String>,
    },
}

impl Action {
    pub fn move_to(to: Position) -> Self {
        Self::Move { to, comment: None }
    }

    pub fn attack(target: usize) -> Self {
        Self::Attack {
            target,
            comment: None,
        }
    }

    pub fn with_comment(self, text: impl Into<String>) -> Self {
        let text = Some(text.into());
        match self {
            Self::Move { to, .. } => Self::Move { to, comment: text },
            Self::Attack { target, .. } => Self::Attack {
                target,
                comment: text,
            },
        }
    }

    pub fn comment(&self) -> Option<&str> {
        match self {
            Self::Move { comment, .. } | Self::Attack { comment, .. } => comment.as_deref(),
        }
    }

    pub fn apply(&self, state: &mut RunState<'_>) {
        match self {
            Self::Move { to, .. } => state.apply_move(*to),
            Self::Attack { target, .. } => state.apply_attack(*target),
        }
    }

    pub fn to_record(&self) -> ActionRecord {
        match self {
            Self::Move { to, comment } => ActionRecord::Move {
                target_x: to.x,
                target_y: to.y,
                comment: non_empty(comment),
            },
            Self::Attack { target, comment } => ActionRecord::Attack {
                target_id: *target,
                comment: non_empty(comment),
            },
        }
    }
}

fn non_empty(comment: &Option<String>) -> Option<String> {
    comment.as_ref().filter(|text| !text.is_empty()).cloned()
}

impl From<ActionRecord> for Action {
    fn from(record: ActionRecord) -> Self {
        match record {
            ActionRecord::Move {
                target_x,
                target_y,
                comment,
            } => Self::Move {
                to: Position::new(target_x, target_y),
                comment,
            },
            ActionRecord::Attack { target_id, comment } => Self::Attack {
                target: target_id,
                comment,
            },
        }
    }
}

/// One entry of a submitted solution.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ActionRecord {
    Move {
        target_x: i32,
        target_y: i32,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        comment: Option<String>,
    },
    Attack {
        target_id: usize,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        comment: Option<String>,
    },
}

/// Submission document: `{"moves": [...]}`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Solution {
    pub moves: Vec<ActionRecord>,
}

/// Append-only, ordered record of applied actions.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ActionLog {
    actions: Vec<Action>,
}

impl ActionLog {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            actions: Vec::with_capacity(capacity),
        }
    }

    /// Applies `action` to `state` and records it.
    pub fn apply(&mut self, state: &mut RunState<'_>, action: Action) {
        action.apply(state);
        self.actions.push(action);
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Action> {
        self.actions.iter()
    }

    pub fn as_slice(&self) -> &[Action] {
        &self.actions
    }

    /// Re-applies every action to a fresh state.
    pub fn replay(&self, scenario: &Scenario) -> StateSnapshot {
        replay(scenario, &self.actions)
    }

    pub fn count_by_kind(&self) -> (usize, usize) {
        let moves = self
            .actions
            .iter()
            .filter(|action| matches!(action, Action::Move { .. }))
            .count();
        (moves, self.actions.len() - moves)
    }

    pub fn to_solution(&self) -> Solution {
        Solution {
            moves: self.actions.iter().map(Action::to_record).collect(),
        }
    }

    pub fn from_solution(solution: Solution) -> Self {
        solution.moves.into_iter().map(Action::from).collect()
    }
}

impl FromIterator<Action> for ActionLog {
    fn from_iter<I: IntoIterator<Item = Action>>(iter: I) -> Self {
        Self {
            actions: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a ActionLog {
    type Item = &'a Action;
    type IntoIter = std::slice::Iter<'a, Action>;

    fn into_iter(self) -> Self::IntoIter {
        self.actions.iter()
    }
}

/// Applies `actions` in order to a fresh run state. Pure in (scenario, actions).
pub fn replay(scenario: &Scenario, actions: &[Action]) -> StateSnapshot {
    let mut state = RunState::new(scenario);
    for action in actions {
        action.apply(&mut state);
    }
    state.snapshot()
}
