//! Immutable problem instances. A `Scenario` is built once by the loader and
//! then shared read-only by every evaluation that runs against it.

use serde::{Deserialize, Serialize};

use crate::geometry::Position;

/// Hero base stats plus per-level growth coefficients (percent per level).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeroTemplate {
    pub base_speed: i64,
    pub base_power: i64,
    pub base_range: i64,
    pub speed_coeff: i64,
    pub power_coeff: i64,
    pub range_coeff: i64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Monster {
    /// 0-based index in the scenario roster. Stable for the scenario lifetime.
    pub id: usize,
    pub position: Position,
    /// Hit points at the start of a run.
    pub hp: i64,
    pub gold: i64,
    pub exp: i64,
    /// Passive attack radius; zero together with `attack` means harmless.
    pub range: i64,
    pub attack: i64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    pub id: u32,
    pub hero: HeroTemplate,
    pub start: Position,
    /// Descriptive only; movement is never clamped to the grid.
    pub width: i32,
    pub height: i32,
    pub turns: u32,
    monsters: Vec<Monster>,
}

impl Scenario {
    /// Builds a scenario, assigning monster ids from roster order.
    pub fn new(
        id: u32,
        hero: HeroTemplate,
        start: Position,
        width: i32,
        height: i32,
        turns: u32,
        monsters: impl IntoIterator<Item = Monster>,
    ) -> Self {
        let monsters = monsters
            .into_iter()
            .enumerate()
            .map(|(id, monster)| Monster { id, ..monster })
            .collect();
        Self {
            id,
            hero,
            start,
            width,
            height,
            turns,
            monsters,
        }
    }

    pub fn monsters(&self) -> &[Monster] {
        &self.monsters
    }

    pub fn monster(&self, index: usize) -> &Monster {
        &self.monsters[index]
    }

    pub fn monster_count(&self) -> usize {
        self.monsters.len()
    }

    pub fn has_passive_attackers(&self) -> bool {
        self.monsters.iter().any(|m| m.attack != 0)
    }
}
