//! Best known score per scenario, shared by every search task.

use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::Mutex;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Offer {
    Improved { previous: Option<i64> },
    Kept { best: i64 },
}

pub trait ScoreBoard: Send + Sync {
    fn best(&self, scenario_id: u32) -> Option<i64>;

    /// Stores `score` if it strictly beats the current best, atomically.
    fn offer(&self, scenario_id: u32, score: i64) -> Offer;
}

#[derive(Debug, Default)]
pub struct BestScores {
    scores: Mutex<BTreeMap<u32, i64>>,
}

impl BestScores {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_map(scores: BTreeMap<u32, i64>) -> Self {
        Self {
            scores: Mutex::new(scores),
        }
    }

    /// Reads `{"<id>": score}`. A missing file is an empty table.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }
        let raw = fs::read(path).with_context(|| format!("failed reading {}", path.display()))?;
        let scores: BTreeMap<u32, i64> = serde_json::from_slice(&raw)
            .with_context(|| format!("failed parsing {}", path.display()))?;
        Ok(Self::from_map(scores))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed creating directory {}", parent.display()))?;
        }
        let encoded = serde_json::to_vec_pretty(&self.snapshot())
            .context("failed to serialize best scores")?;
        fs::write(path, encoded).with_context(|| format!("failed writing {}", path.display()))
    }

    pub fn snapshot(&self) -> BTreeMap<u32, i64> {
        self.lock().clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<u32, i64>> {
        // A panic elsewhere cannot leave the map half-written; keep using it.
        self.scores
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl ScoreBoard for BestScores {
    fn best(&self, scenario_id: u32) -> Option<i64> {
        self.lock().get(&scenario_id).copied()
    }

    fn offer(&self, scenario_id: u32, score: i64) -> Offer {
        let mut scores = self.lock();
        match scores.get(&scenario_id).copied() {
            Some(best) if best >= score => Offer::Kept { best },
            previous => {
                scores.insert(scenario_id, score);
                Offer::Improved { previous }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_strict_improvements_replace() {
        let board = BestScores::new();
        assert_eq!(board.offer(3, 10), Offer::Improved { previous: None });
        assert_eq!(board.offer(3, 10), Offer::Kept { best: 10 });
        assert_eq!(board.offer(3, 9), Offer::Kept { best: 10 });
        assert_eq!(board.offer(3, 11), Offer::Improved { previous: Some(10) });
        assert_eq!(board.best(3), Some(11));
        assert_eq!(board.best(4), None);
    }

    #[test]
    fn round_trips_through_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/best.json");

        let board = BestScores::load(&path).unwrap();
        board.offer(1, 500);
        board.offer(12, 7);
        board.save(&path).unwrap();

        let reloaded = BestScores::load(&path).unwrap();
        assert_eq!(reloaded.snapshot(), board.snapshot());
    }
}
