//! Game rule constants shared by the simulator, the evaluator and the scheduler.

/// Tolerance added before flooring reward and stat formulas.
pub const ROUNDING_EPSILON: f64 = 1e-6;

/// Tolerance on the upper bound of a grid-search parameter.
pub const GRID_EPSILON: f64 = 1e-6;

// Gold reward: gold * FATIGUE_SCALE / (FATIGUE_SCALE + fatigue)
pub const FATIGUE_SCALE: f64 = 1000.0;

// Level thresholds: LEVEL_BASE_EXP + (level + 1) * level * LEVEL_EXP_STEP
pub const LEVEL_BASE_EXP: i64 = 1000;
pub const LEVEL_EXP_STEP: i64 = 50;

/// A monster is worth chasing only while `hp <= power * KILLABLE_POWER_FACTOR`.
pub const KILLABLE_POWER_FACTOR: i64 = 100;

/// Grid-search parameter names understood by the evaluator.
pub const PARAM_PREFER_EXP_THRESHOLD: &str = "preferExpThreshold";
pub const PARAM_PASS_MONSTER_THRESHOLD: &str = "passMonsterThreshold";
