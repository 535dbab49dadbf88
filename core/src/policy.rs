//! Greedy per-turn policy driven by two tunable thresholds.
//!
//! Each turn the hero either attacks the first ranked monster it can hit, or
//! walks toward the first ranked monster worth chasing. Ranking splits the
//! roster by a reward floor: monsters at or above it come first, nearest
//! first; the rest follow by descending reward. The sort is stable, so equal
//! keys keep roster order and the whole run is a pure function of its inputs.

use std::cmp::Ordering;
use serde::{Deserialize, Serialize};

use crate::action::{Action, ActionLog};
use crate::constants::{PARAM_PASS_MONSTER_THRESHOLD, PARAM_PREFER_EXP_THRESHOLD};
use crate::error::ParameterError;
use crate::geometry::MoveRule;
use crate::grid::GridPoint;
use crate::scenario::Scenario;
use crate::state::{RunState, StateSnapshot};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PolicyParams {
    /// Fraction of the turn budget spent chasing experience before gold.
    pub prefer_exp_threshold: f64,
    /// Reward floor as a fraction of the best reward currently on offer.
    pub pass_monster_threshold: f64,
}

impl PolicyParams {
    pub fn from_point(point: &GridPoint) -> Result<Self, ParameterError> {
        let lookup = |name: &str| {
            point.get(name).ok_or_else(|| ParameterError::Missing {
                name: name.to_string(),
            })
        };
        Ok(Self {
            prefer_exp_threshold: lookup(PARAM_PREFER_EXP_THRESHOLD)?,
            pass_monster_threshold: lookup(PARAM_PASS_MONSTER_THRESHOLD)?,
        })
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyConfig {
    pub movement: MoveRule,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Evaluation {
    pub actions: ActionLog,
    pub score: i64,
    pub final_state: StateSnapshot,
}

pub fn evaluate(scenario: &Scenario, params: &PolicyParams, config: &PolicyConfig) -> Evaluation {
    let mut state = RunState::new(scenario);
    let mut actions = ActionLog::with_capacity(scenario.turns as usize);

    // Truncation toward zero, as the thresholds are meant to be fractions.
    let exp_turns = (scenario.turns as f64 * params.prefer_exp_threshold) as i64;
    let mut order: Vec<usize> = (0..scenario.monster_count()).collect();

    for turn in 0..scenario.turns {
        let prefer_exp = (turn as i64) < exp_turns;
        if let Some(action) = choose_action(&state, params, config, prefer_exp, &mut order) {
            actions.apply(&mut state, action);
        }
    }

    let final_state = state.snapshot();
    Evaluation {
        actions,
        score: final_state.gold,
        final_state,
    }
}

/// Resolves the named thresholds from `point` and evaluates once.
pub fn evaluate_point(
    scenario: &Scenario,
    point: &GridPoint,
    config: &PolicyConfig,
) -> Result<Evaluation, ParameterError> {
    let params = PolicyParams::from_point(point)?;
    Ok(evaluate(scenario, &params, config))
}

fn choose_action(
    state: &RunState<'_>,
    params: &PolicyParams,
    config: &PolicyConfig,
    prefer_exp: bool,
    order: &mut Vec<usize>,
) -> Option<Action> {
    let scenario = state.scenario();
    let reward = |idx: usize| {
        let monster = scenario.monster(idx);
        if prefer_exp {
            monster.exp
        } else {
            monster.gold
        }
    };

    let best_reward = (0..scenario.monster_count())
        .filter(|idx| state.is_killable(*idx))
        .map(reward)
        .max()
        .unwrap_or(0)
        .max(0);
    let min_value = (best_reward as f64 * params.pass_monster_threshold) as i64;

    let here = state.position();
    order.clear();
    order.extend(0..scenario.monster_count());
    order.sort_by(|a, b| {
        let (ra, rb) = (reward(*a), reward(*b));
        match (ra >= min_value, rb >= min_value) {
            (true, true) => {
                let da = here.distance_squared(scenario.monster(*a).position);
                let db = here.distance_squared(scenario.monster(*b).position);
                da.cmp(&db)
            }
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
            (false, false) => rb.cmp(&ra),
        }
    });

    let range = state.stats().range;
    let attack = order.iter().copied().find(|idx| {
        state.is_killable(*idx)
            && reward(*idx) >= min_value
            && scenario.monster(*idx).position.in_range(here, range)
    });
    if let Some(target) = attack {
        return Some(Action::attack(target));
    }

    let chase = order.iter().copied().find(|idx| state.is_killable(*idx))?;
    let to = config
        .movement
        .advance(here, scenario.monster(chase).position, state.stats().speed);
    Some(Action::move_to(to))
}
