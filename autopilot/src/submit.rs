use anyhow::{Context, Result};
use hero_grid_core::{verify_log, ActionLog, MoveRule, Scenario, VerifyError};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::scoreboard::{Offer, ScoreBoard};

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SubmitOutcome {
    Submitted {
        previous: Option<i64>,
        score: i64,
        path: String,
    },
    NotImproved {
        best: i64,
        score: i64,
    },
    Rejected {
        reason: String,
    },
}

/// Writes verified solutions that beat the scoreboard to `<out_dir>/<id>.json`.
pub struct SolutionSubmitter {
    out_dir: PathBuf,
    movement: MoveRule,
    board: Arc<dyn ScoreBoard>,
}

impl SolutionSubmitter {
    pub fn new(out_dir: impl Into<PathBuf>, movement: MoveRule, board: Arc<dyn ScoreBoard>) -> Self {
        Self {
            out_dir: out_dir.into(),
            movement,
            board,
        }
    }

    pub fn solution_path(&self, scenario_id: u32) -> PathBuf {
        self.out_dir.join(format!("{scenario_id:03}.json"))
    }

    pub fn submit(&self, scenario: &Scenario, actions: &ActionLog) -> Result<SubmitOutcome> {
        let report = match verify_log(scenario, actions.as_slice(), self.movement) {
            Ok(report) => report,
            Err(err) => return Ok(self.reject(scenario.id, &err)),
        };
        let score = report.score;

        if let Some(best) = self.board.best(scenario.id) {
            if best >= score {
                return Ok(SubmitOutcome::NotImproved { best, score });
            }
        }

        // Compare-and-update first; only the winner writes the file.
        let previous = match self.board.offer(scenario.id, score) {
            Offer::Improved { previous } => previous,
            Offer::Kept { best } => return Ok(SubmitOutcome::NotImproved { best, score }),
        };

        let path = self.solution_path(scenario.id);
        write_solution(&path, actions)?;
        tracing::info!(
            "[Test {}] submitted {} actions: {} -> {}",
            scenario.id,
            actions.len(),
            previous
                .map(|value| value.to_string())
                .unwrap_or_else(|| "no score".to_string()),
            score
        );

        Ok(SubmitOutcome::Submitted {
            previous,
            score,
            path: path.to_string_lossy().into_owned(),
        })
    }

    fn reject(&self, scenario_id: u32, err: &VerifyError) -> SubmitOutcome {
        tracing::warn!("[Test {scenario_id}] invalid solution: {err}");
        SubmitOutcome::Rejected {
            reason: err.to_string(),
        }
    }
}

pub fn write_solution(path: &Path, actions: &ActionLog) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed creating directory {}", parent.display()))?;
    }
    let encoded = serde_json::to_vec_pretty(&actions.to_solution())
        .context("failed to serialize solution")?;
    fs::write(path, encoded).with_context(|| format!("failed writing {}", path.display()))
}

pub fn read_solution(path: &Path) -> Result<ActionLog> {
    let raw = fs::read(path).with_context(|| format!("failed reading {}", path.display()))?;
    let solution = serde_json::from_slice(&raw)
        .with_context(|| format!("failed parsing solution {}", path.display()))?;
    Ok(ActionLog::from_solution(solution))
}
