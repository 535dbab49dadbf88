//! Scenario files: `NNN.json`, numbered from `001` with no gaps.

use anyhow::{Context, Result};
use hero_grid_core::{HeroTemplate, Monster, Position, Scenario};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Scenarios up to this id predate monster counter-attacks; their `range` and
/// `attack` fields are ignored even when present.
pub const LAST_PASSIVE_FREE_ID: u32 = 25;

#[derive(Debug, Deserialize)]
struct HeroFile {
    base_speed: i64,
    base_power: i64,
    base_range: i64,
    level_speed_coeff: i64,
    level_power_coeff: i64,
    level_range_coeff: i64,
}

#[derive(Debug, Deserialize)]
struct MonsterFile {
    x: i32,
    y: i32,
    hp: i64,
    gold: i64,
    exp: i64,
    #[serde(default)]
    range: i64,
    #[serde(default)]
    attack: i64,
}

#[derive(Debug, Deserialize)]
struct ScenarioFile {
    hero: HeroFile,
    start_x: i32,
    start_y: i32,
    width: i32,
    height: i32,
    num_turns: u32,
    monsters: Vec<MonsterFile>,
}

pub fn scenario_path(data_dir: &Path, id: u32) -> PathBuf {
    data_dir.join(format!("{id:03}.json"))
}

pub fn parse_scenario(id: u32, bytes: &[u8]) -> Result<Scenario> {
    let raw: ScenarioFile = serde_json::from_slice(bytes)
        .with_context(|| format!("scenario {id} is not valid scenario json"))?;
    let passive = id > LAST_PASSIVE_FREE_ID;

    let hero = HeroTemplate {
        base_speed: raw.hero.base_speed,
        base_power: raw.hero.base_power,
        base_range: raw.hero.base_range,
        speed_coeff: raw.hero.level_speed_coeff,
        power_coeff: raw.hero.level_power_coeff,
        range_coeff: raw.hero.level_range_coeff,
    };
    let monsters = raw.monsters.into_iter().map(|m| Monster {
        id: 0,
        position: Position::new(m.x, m.y),
        hp: m.hp,
        gold: m.gold,
        exp: m.exp,
        range: if passive { m.range } else { 0 },
        attack: if passive { m.attack } else { 0 },
    });

    Ok(Scenario::new(
        id,
        hero,
        Position::new(raw.start_x, raw.start_y),
        raw.width,
        raw.height,
        raw.num_turns,
        monsters,
    ))
}

pub fn load_scenario(data_dir: &Path, id: u32) -> Result<Scenario> {
    let path = scenario_path(data_dir, id);
    let bytes = fs::read(&path).with_context(|| format!("failed reading {}", path.display()))?;
    parse_scenario(id, &bytes).with_context(|| format!("failed parsing {}", path.display()))
}

/// Loads `001.json`, `002.json`, ... until the first missing file.
pub fn load_all(data_dir: &Path) -> Result<Vec<Scenario>> {
    let mut scenarios = Vec::new();
    for id in 1u32.. {
        if !scenario_path(data_dir, id).exists() {
            break;
        }
        scenarios.push(load_scenario(data_dir, id)?);
    }
    tracing::debug!(
        "loaded {} scenarios from {}",
        scenarios.len(),
        data_dir.display()
    );
    Ok(scenarios)
}

/// Reorders `scenarios` to follow `wanted`, dropping everything else.
pub fn take_in_order(scenarios: Vec<Scenario>, wanted: &[u32]) -> Vec<Scenario> {
    let mut pool: Vec<Option<Scenario>> = scenarios.into_iter().map(Some).collect();
    let mut picked = Vec::with_capacity(wanted.len());
    for id in wanted {
        let slot = pool
            .iter_mut()
            .find(|slot| slot.as_ref().is_some_and(|scenario| scenario.id == *id));
        if let Some(scenario) = slot.and_then(Option::take) {
            picked.push(scenario);
        }
    }
    picked
}
