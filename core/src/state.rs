//! Run-time simulation state and its two transitions.
//!
//! A `RunState` borrows its scenario immutably and owns everything that
//! changes during a run, including the monsters' remaining hit points. Both
//! transitions finish by resolving passive damage from every living monster
//! whose attack radius covers the hero's position.

use serde::{Deserialize, Serialize};

use crate::constants::{
    FATIGUE_SCALE, KILLABLE_POWER_FACTOR, LEVEL_BASE_EXP, LEVEL_EXP_STEP, ROUNDING_EPSILON,
};
use crate::geometry::Position;
use crate::scenario::{HeroTemplate, Scenario};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeroStats {
    pub speed: i64,
    pub power: i64,
    pub range: i64,
}

impl HeroStats {
    pub fn at_level(hero: &HeroTemplate, level: u32) -> Self {
        Self {
            speed: derived_stat(hero.base_speed, hero.speed_coeff, level),
            power: derived_stat(hero.base_power, hero.power_coeff, level),
            range: derived_stat(hero.base_range, hero.range_coeff, level),
        }
    }

    fn base(hero: &HeroTemplate) -> Self {
        Self {
            speed: hero.base_speed,
            power: hero.base_power,
            range: hero.base_range,
        }
    }
}

/// Comparable summary of a run state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateSnapshot {
    pub position: Position,
    pub stats: HeroStats,
    pub gold: i64,
    pub exp: i64,
    pub level: u32,
    pub fatigue: i64,
    pub monsters_alive: usize,
}

/// Experience needed to go from `level` to `level + 1`.
#[inline]
pub fn required_exp(level: u32) -> i64 {
    let level = level as i64;
    LEVEL_BASE_EXP + (level + 1) * level * LEVEL_EXP_STEP
}

pub fn derived_stat(base: i64, coeff: i64, level: u32) -> i64 {
    let scale = 1.0 + (level as f64) * (coeff as f64 / 100.0);
    ((base as f64) * scale + ROUNDING_EPSILON).floor() as i64
}

/// Gold paid out for a kill, shrinking as fatigue accumulates.
pub fn kill_reward(gold: i64, fatigue: i64) -> i64 {
    let factor = FATIGUE_SCALE / (FATIGUE_SCALE + fatigue as f64);
    ((gold as f64) * factor + ROUNDING_EPSILON).floor() as i64
}

#[derive(Clone, Debug)]
pub struct RunState<'a> {
    scenario: &'a Scenario,
    position: Position,
    stats: HeroStats,
    gold: i64,
    exp: i64,
    level: u32,
    fatigue: i64,
    monster_hp: Vec<i64>,
}

impl<'a> RunState<'a> {
    pub fn new(scenario: &'a Scenario) -> Self {
        Self {
            scenario,
            position: scenario.start,
            stats: HeroStats::base(&scenario.hero),
            gold: 0,
            exp: 0,
            level: 0,
            fatigue: 0,
            monster_hp: scenario.monsters().iter().map(|m| m.hp).collect(),
        }
    }

    pub fn scenario(&self) -> &'a Scenario {
        self.scenario
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn stats(&self) -> HeroStats {
        self.stats
    }

    pub fn gold(&self) -> i64 {
        self.gold
    }

    pub fn exp(&self) -> i64 {
        self.exp
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn fatigue(&self) -> i64 {
        self.fatigue
    }

    pub fn monster_hp(&self, index: usize) -> i64 {
        self.monster_hp[index]
    }

    #[inline]
    pub fn is_alive(&self, index: usize) -> bool {
        self.monster_hp[index] > 0
    }

    /// Alive and cheap enough to chase at the current power. This is a
    /// budget heuristic, not a one-hit guarantee.
    #[inline]
    pub fn is_killable(&self, index: usize) -> bool {
        let hp = self.monster_hp[index];
        hp > 0 && hp <= self.stats.power * KILLABLE_POWER_FACTOR
    }

    pub fn monsters_alive(&self) -> usize {
        self.monster_hp.iter().filter(|hp| **hp > 0).count()
    }

    pub fn snapshot(&self) -> StateSnapshot {
        StateSnapshot {
            position: self.position,
            stats: self.stats,
            gold: self.gold,
            exp: self.exp,
            level: self.level,
            fatigue: self.fatigue,
            monsters_alive: self.monsters_alive(),
        }
    }

    /// Teleports the hero; reachability is the caller's concern.
    pub fn apply_move(&mut self, to: Position) {
        self.position = to;
        self.resolve_passive_damage();
    }

    /// Hits monster `target` with the hero's current power.
    ///
    /// # Panics
    /// If `target` is not a roster index.
    pub fn apply_attack(&mut self, target: usize) {
        assert!(
            target < self.monster_hp.len(),
            "attack target {target} outside roster of {}",
            self.monster_hp.len()
        );

        if self.monster_hp[target] > 0 {
            self.monster_hp[target] -= self.stats.power;
            if self.monster_hp[target] <= 0 {
                let monster = self.scenario.monster(target);
                self.gold += kill_reward(monster.gold, self.fatigue);
                self.exp += monster.exp;
                self.resolve_level_ups();
            }
        }

        self.resolve_passive_damage();
    }

    fn resolve_level_ups(&mut self) {
        let old_level = self.level;
        loop {
            let needed = required_exp(self.level);
            if self.exp < needed {
                break;
            }
            self.exp -= needed;
            self.level += 1;
        }

        if self.level != old_level {
            self.stats = HeroStats::at_level(&self.scenario.hero, self.level);
        }
    }

    fn resolve_passive_damage(&mut self) {
        for (monster, hp) in self.scenario.monsters().iter().zip(&self.monster_hp) {
            if *hp > 0 && monster.position.in_range(self.position, monster.range) {
                self.fatigue += monster.attack;
            }
        }
    }
}
