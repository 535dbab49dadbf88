//! Strict replay of an action log, as a scoring service would run it.
//!
//! `Action::apply` trusts its caller. Verification checks every action
//! against the state it is about to mutate first, so a bad log surfaces as
//! a `VerifyError` rather than a panic or a silently inflated score.

use serde::{Deserialize, Serialize};

use crate::action::Action;
use crate::error::VerifyError;
use crate::geometry::MoveRule;
use crate::scenario::Scenario;
use crate::state::{RunState, StateSnapshot};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationReport {
    pub scenario_id: u32,
    pub actions: usize,
    pub moves: usize,
    pub attacks: usize,
    pub score: i64,
    pub final_state: StateSnapshot,
}

pub fn verify_log(
    scenario: &Scenario,
    actions: &[Action],
    rule: MoveRule,
) -> Result<VerificationReport, VerifyError> {
    if actions.len() > scenario.turns as usize {
        return Err(VerifyError::TurnBudgetExceeded {
            actions: actions.len(),
            turns: scenario.turns,
        });
    }

    let mut state = RunState::new(scenario);
    let mut moves = 0usize;
    for (idx, action) in actions.iter().enumerate() {
        check_action(&state, idx, action, rule)?;
        if matches!(action, Action::Move { .. }) {
            moves += 1;
        }
        action.apply(&mut state);
    }

    let final_state = state.snapshot();
    Ok(VerificationReport {
        scenario_id: scenario.id,
        actions: actions.len(),
        moves,
        attacks: actions.len() - moves,
        score: final_state.gold,
        final_state,
    })
}

/// Replays `actions` and rejects the log unless it earns exactly `claimed`.
pub fn verify_claimed_score(
    scenario: &Scenario,
    actions: &[Action],
    rule: MoveRule,
    claimed: i64,
) -> Result<VerificationReport, VerifyError> {
    let report = verify_log(scenario, actions, rule)?;
    if report.score != claimed {
        return Err(VerifyError::ScoreMismatch {
            claimed,
            computed: report.score,
        });
    }
    Ok(report)
}

fn check_action(
    state: &RunState<'_>,
    idx: usize,
    action: &Action,
    rule: MoveRule,
) -> Result<(), VerifyError> {
    match action {
        Action::Move { to, .. } => {
            let from = state.position();
            let speed = state.stats().speed;
            if !rule.allows(from, *to, speed) {
                return Err(VerifyError::MoveOutOfReach {
                    action: idx,
                    from,
                    to: *to,
                    speed,
                    rule,
                });
            }
        }
        Action::Attack { target, .. } => {
            let monsters = state.scenario().monster_count();
            if *target >= monsters {
                return Err(VerifyError::TargetOutOfRange {
                    action: idx,
                    target: *target,
                    monsters,
                });
            }
            if !state.is_alive(*target) {
                return Err(VerifyError::TargetDefeated {
                    action: idx,
                    target: *target,
                });
            }
            let monster = state.scenario().monster(*target);
            let range = state.stats().range;
            if !monster.position.in_range(state.position(), range) {
                return Err(VerifyError::TargetNotInRange {
                    action: idx,
                    target: *target,
                    distance_squared: monster.position.distance_squared(state.position()),
                    range,
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Position;
    use crate::scenario::{HeroTemplate, Monster};

    fn scenario(turns: u32) -> Scenario {
        let hero = HeroTemplate {
            base_speed: 2,
            base_power: 10,
            base_range: 1,
            speed_coeff: 0,
            power_coeff: 0,
            range_coeff: 0,
        };
        let monsters = [(3, 0, 10, 40), (0, 0, 25, 5)].map(|(x, y, hp, gold)| Monster {
            id: 0,
            position: Position::new(x, y),
            hp,
            gold,
            exp: 0,
            range: 0,
            attack: 0,
        });
        Scenario::new(9, hero, Position::new(0, 0), 10, 10, turns, monsters)
    }

    fn chase_first() -> Vec<Action> {
        vec![
            Action::move_to(Position::new(2, 0)),
            Action::attack(0).with_comment("first blood"),
        ]
    }

    #[test]
    fn accepts_legal_log() {
        let scenario = scenario(5);
        let report = verify_log(&scenario, &chase_first(), MoveRule::Grid).unwrap();

        assert_eq!(report.scenario_id, 9);
        assert_eq!(report.score, 40);
        assert_eq!((report.moves, report.attacks), (1, 1));
        assert_eq!(report.final_state.monsters_alive, 1);
    }

    #[test]
    fn score_claim_must_match_replay() {
        let scenario = scenario(5);
        assert!(verify_claimed_score(&scenario, &chase_first(), MoveRule::Grid, 40).is_ok());

        let err = verify_claimed_score(&scenario, &chase_first(), MoveRule::Grid, 41).unwrap_err();
        assert_eq!(
            err,
            VerifyError::ScoreMismatch {
                claimed: 41,
                computed: 40
            }
        );
    }

    #[test]
    fn rejects_logs_longer_than_budget() {
        let scenario = scenario(1);
        let err = verify_log(&scenario, &chase_first(), MoveRule::Grid).unwrap_err();
        assert!(matches!(
            err,
            VerifyError::TurnBudgetExceeded {
                actions: 2,
                turns: 1
            }
        ));
    }

    #[test]
    fn rejects_bad_targets_without_panicking() {
        let scenario = scenario(5);

        let err = verify_log(&scenario, &[Action::attack(7)], MoveRule::Grid).unwrap_err();
        assert!(matches!(err, VerifyError::TargetOutOfRange { target: 7, .. }));

        let err = verify_log(&scenario, &[Action::attack(0)], MoveRule::Grid).unwrap_err();
        assert!(matches!(
            err,
            VerifyError::TargetNotInRange {
                action: 0,
                target: 0,
                distance_squared: 9,
                range: 1
            }
        ));

        let twice = [Action::attack(1), Action::attack(1), Action::attack(1), Action::attack(1)];
        let err = verify_log(&scenario, &twice, MoveRule::Grid).unwrap_err();
        assert_eq!(err, VerifyError::TargetDefeated { action: 3, target: 1 });
    }

    #[test]
    fn move_legality_depends_on_rule() {
        let scenario = scenario(5);
        let diagonal = [Action::move_to(Position::new(2, 2))];

        assert!(verify_log(&scenario, &diagonal, MoveRule::Grid).is_ok());
        let err = verify_log(&scenario, &diagonal, MoveRule::Euclidean).unwrap_err();
        assert!(matches!(
            err,
            VerifyError::MoveOutOfReach {
                action: 0,
                speed: 2,
                rule: MoveRule::Euclidean,
                ..
            }
        ));
    }
}
