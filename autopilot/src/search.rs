use crate::submit::{SolutionSubmitter, SubmitOutcome};
use anyhow::{anyhow, Context, Result};
use hero_grid_core::{
    evaluate_point, Evaluation, GridPoint, GridSearch, MoveRule, ParameterSpec, PolicyConfig,
    Scenario,
};
use rayon::prelude::*;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Instant, SystemTime, UNIX_EPOCH};

pub struct SearchConfig {
    pub scenarios: Vec<Scenario>,
    pub params: Vec<ParameterSpec>,
    pub movement: MoveRule,
    pub jobs: Option<usize>,
    pub out_dir: PathBuf,
    pub submitter: SolutionSubmitter,
}

/// Best grid point found for one scenario.
#[derive(Clone, Debug)]
pub struct ScenarioBest {
    pub point: GridPoint,
    pub evaluation: Evaluation,
    pub points_evaluated: usize,
}

#[derive(Clone, Debug, Serialize)]
pub struct ScenarioResult {
    pub scenario_id: u32,
    pub turns: u32,
    pub monsters: usize,
    pub points_evaluated: usize,
    pub best_point_index: usize,
    pub best_params: Vec<(String, f64)>,
    pub score: i64,
    pub actions: usize,
    pub moves: usize,
    pub attacks: usize,
    pub final_level: u32,
    pub final_fatigue: i64,
    pub elapsed_ms: u64,
    pub submission: SubmitOutcome,
}

#[derive(Clone, Debug, Serialize)]
pub struct SearchReport {
    pub generated_unix_s: u64,
    pub movement: MoveRule,
    pub jobs: Option<usize>,
    pub params: Vec<ParameterSpec>,
    pub grid_points: usize,
    pub scenario_count: usize,
    pub total_score: i64,
    pub results: Vec<ScenarioResult>,
}

/// Walks the whole grid in odometer order; ties keep the earliest point.
pub fn solve_scenario(
    scenario: &Scenario,
    grid: &GridSearch,
    config: &PolicyConfig,
) -> Result<ScenarioBest> {
    let mut best: Option<(GridPoint, Evaluation)> = None;
    let mut points_evaluated = 0usize;

    for point in grid {
        let evaluation = evaluate_point(scenario, &point, config)
            .with_context(|| format!("test {} point {}", scenario.id, point.index))?;
        points_evaluated += 1;

        let improved = match &best {
            Some((_, current)) => evaluation.score > current.score,
            None => true,
        };
        if improved {
            tracing::debug!(
                "[Test {}] point {} ({}) scores {}",
                scenario.id,
                point.index,
                point.describe(),
                evaluation.score
            );
            best = Some((point, evaluation));
        }
    }

    let (point, evaluation) = best.ok_or_else(|| anyhow!("grid produced no points"))?;
    Ok(ScenarioBest {
        point,
        evaluation,
        points_evaluated,
    })
}

pub fn run_search(config: SearchConfig) -> Result<SearchReport> {
    if config.scenarios.is_empty() {
        return Err(anyhow!("search requires at least one scenario"));
    }
    if let Some(jobs) = config.jobs {
        if jobs == 0 {
            return Err(anyhow!("search --jobs must be >= 1 when provided"));
        }
    }
    fs::create_dir_all(&config.out_dir)
        .with_context(|| format!("failed creating {}", config.out_dir.display()))?;

    let grid = GridSearch::from_specs(config.params.iter().cloned());
    let policy = PolicyConfig {
        movement: config.movement,
    };
    let grid_points = grid.point_count();
    tracing::info!(
        "searching {} scenarios over {} grid points ({} movement)",
        config.scenarios.len(),
        grid_points,
        config.movement.as_str()
    );

    let run_one = |scenario: &Scenario| -> Result<ScenarioResult> {
        log_start(scenario);
        let started = Instant::now();
        let best = solve_scenario(scenario, &grid, &policy)?;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        let submission = config
            .submitter
            .submit(scenario, &best.evaluation.actions)
            .with_context(|| format!("submission failed for test {}", scenario.id))?;
        tracing::info!(
            "[Test {}] best score {} at point {} ({}) in {} ms",
            scenario.id,
            best.evaluation.score,
            best.point.index,
            best.point.describe(),
            elapsed_ms
        );

        let (moves, attacks) = best.evaluation.actions.count_by_kind();
        Ok(ScenarioResult {
            scenario_id: scenario.id,
            turns: scenario.turns,
            monsters: scenario.monster_count(),
            points_evaluated: best.points_evaluated,
            best_point_index: best.point.index,
            best_params: best
                .point
                .iter()
                .map(|(name, value)| (name.to_string(), value))
                .collect(),
            score: best.evaluation.score,
            actions: best.evaluation.actions.len(),
            moves,
            attacks,
            final_level: best.evaluation.final_state.level,
            final_fatigue: best.evaluation.final_state.fatigue,
            elapsed_ms,
            submission,
        })
    };

    let outcomes: Vec<Result<ScenarioResult>> = if let Some(jobs) = config.jobs {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(jobs)
            .build()
            .context("failed to build rayon threadpool")?;
        pool.install(|| config.scenarios.par_iter().map(run_one).collect())
    } else {
        config.scenarios.par_iter().map(run_one).collect()
    };

    let mut results = Vec::with_capacity(outcomes.len());
    for outcome in outcomes {
        results.push(outcome?);
    }
    results.sort_by_key(|result| result.scenario_id);

    write_results_csv(&config.out_dir.join("results.csv"), &results)?;

    let report = SearchReport {
        generated_unix_s: SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs(),
        movement: config.movement,
        jobs: config.jobs,
        params: config.params,
        grid_points,
        scenario_count: results.len(),
        total_score: results.iter().map(|result| result.score).sum(),
        results,
    };

    let report_path = config.out_dir.join("summary.json");
    fs::write(
        &report_path,
        serde_json::to_vec_pretty(&report).context("failed to serialize summary json")?,
    )
    .with_context(|| format!("failed writing {}", report_path.display()))?;

    Ok(report)
}

fn log_start(scenario: &Scenario) {
    tracing::info!(
        "[Test {}] starting solve (width: {}, height: {}, turns: {}, monsters: {}, counter-attacks: {})",
        scenario.id,
        scenario.width,
        scenario.height,
        scenario.turns,
        scenario.monster_count(),
        scenario.has_passive_attackers()
    );
}

fn write_results_csv(path: &Path, rows: &[ScenarioResult]) -> Result<()> {
    let mut csv = String::from(
        "scenario_id,turns,monsters,points_evaluated,best_point_index,best_params,score,actions,moves,attacks,final_level,final_fatigue,elapsed_ms,submission\n",
    );
    for row in rows {
        let params = row
            .best_params
            .iter()
            .map(|(name, value)| format!("{name}={value}"))
            .collect::<Vec<_>>()
            .join(";");
        let submission = match &row.submission {
            SubmitOutcome::Submitted { .. } => "submitted",
            SubmitOutcome::NotImproved { .. } => "not_improved",
            SubmitOutcome::Rejected { .. } => "rejected",
        };
        csv.push_str(&format!(
            "{},{},{},{},{},{},{},{},{},{},{},{},{},{}\n",
            row.scenario_id,
            row.turns,
            row.monsters,
            row.points_evaluated,
            row.best_point_index,
            params,
            row.score,
            row.actions,
            row.moves,
            row.attacks,
            row.final_level,
            row.final_fatigue,
            row.elapsed_ms,
            submission
        ));
    }
    fs::write(path, csv).with_context(|| format!("failed writing {}", path.display()))
}
