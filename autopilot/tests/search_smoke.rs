use anyhow::Result;
use hero_autopilot::loader::load_all;
use hero_autopilot::scoreboard::{BestScores, ScoreBoard};
use hero_autopilot::search::{run_search, SearchConfig};
use hero_autopilot::submit::{read_solution, SolutionSubmitter, SubmitOutcome};
use hero_autopilot::util::parse_param_spec;
use hero_grid_core::{verify_log, Action, MoveRule, Position};
use std::fs;
use std::path::Path;
use std::sync::Arc;

fn scenario_json(monster_x: i32, gold: i64) -> String {
    format!(
        r#"{{
            "hero": {{"base_speed": 1, "base_power": 5, "base_range": 1,
                     "level_speed_coeff": 0, "level_power_coeff": 0, "level_range_coeff": 0}},
            "start_x": 0, "start_y": 0, "width": 10, "height": 10, "num_turns": 3,
            "monsters": [{{"x": {monster_x}, "y": 0, "hp": 5, "gold": {gold}, "exp": 0}}]
        }}"#
    )
}

fn write_data_dir(dir: &Path) -> Result<()> {
    fs::write(dir.join("001.json"), scenario_json(1, 30))?;
    fs::write(dir.join("002.json"), scenario_json(2, 40))?;
    // 003 is missing, so 004 is never reached.
    fs::write(dir.join("004.json"), scenario_json(1, 999))?;
    Ok(())
}

fn config(
    data: &Path,
    out: &Path,
    board: Arc<BestScores>,
    jobs: Option<usize>,
) -> Result<SearchConfig> {
    Ok(SearchConfig {
        scenarios: load_all(data)?,
        params: vec![
            parse_param_spec("preferExpThreshold=0:1:1")?,
            parse_param_spec("passMonsterThreshold=0:1:0.5")?,
        ],
        movement: MoveRule::Grid,
        jobs,
        out_dir: out.to_path_buf(),
        submitter: SolutionSubmitter::new(out, MoveRule::Grid, board),
    })
}

#[test]
fn loader_stops_at_first_gap() -> Result<()> {
    let data = tempfile::tempdir()?;
    write_data_dir(data.path())?;

    let scenarios = load_all(data.path())?;
    assert_eq!(scenarios.len(), 2);
    assert_eq!(scenarios[1].id, 2);
    assert_eq!(scenarios[1].monster(0).position, Position::new(2, 0));
    Ok(())
}

#[test]
fn search_writes_verified_solutions_and_reports() -> Result<()> {
    let data = tempfile::tempdir()?;
    let out = tempfile::tempdir()?;
    write_data_dir(data.path())?;
    let board = Arc::new(BestScores::new());

    let report = run_search(config(data.path(), out.path(), board.clone(), Some(2))?)?;
    assert_eq!(report.grid_points, 6);
    assert_eq!(report.scenario_count, 2);
    assert_eq!(report.total_score, 70);

    let ids: Vec<u32> = report.results.iter().map(|r| r.scenario_id).collect();
    assert_eq!(ids, [1, 2]);
    for result in &report.results {
        assert_eq!(result.points_evaluated, 6);
        // Every point scores the same, so the first one wins.
        assert_eq!(result.best_point_index, 0);
        assert!(matches!(
            result.submission,
            SubmitOutcome::Submitted { previous: None, .. }
        ));
    }
    assert_eq!(board.best(1), Some(30));
    assert_eq!(board.best(2), Some(40));

    let second = read_solution(&out.path().join("002.json"))?;
    assert_eq!(
        second.as_slice(),
        [Action::move_to(Position::new(1, 0)), Action::attack(0)]
    );
    let scenarios = load_all(data.path())?;
    let replayed = verify_log(&scenarios[1], second.as_slice(), MoveRule::Grid)?;
    assert_eq!(replayed.score, 40);

    assert!(out.path().join("summary.json").exists());
    let csv = fs::read_to_string(out.path().join("results.csv"))?;
    assert_eq!(csv.lines().count(), 3);
    assert!(csv.lines().nth(1).is_some_and(|line| line.starts_with("1,3,1,6,0,")));
    Ok(())
}

#[test]
fn repeated_search_keeps_existing_bests() -> Result<()> {
    let data = tempfile::tempdir()?;
    let out = tempfile::tempdir()?;
    write_data_dir(data.path())?;
    let board = Arc::new(BestScores::new());

    run_search(config(data.path(), out.path(), board.clone(), None)?)?;
    let again = run_search(config(data.path(), out.path(), board.clone(), None)?)?;
    for result in &again.results {
        assert!(matches!(result.submission, SubmitOutcome::NotImproved { .. }));
    }

    let scores = out.path().join("best.json");
    board.save(&scores)?;
    assert_eq!(BestScores::load(&scores)?.snapshot(), board.snapshot());
    Ok(())
}

#[test]
fn zero_jobs_is_rejected() -> Result<()> {
    let data = tempfile::tempdir()?;
    let out = tempfile::tempdir()?;
    write_data_dir(data.path())?;

    let board = Arc::new(BestScores::new());
    let result = run_search(config(data.path(), out.path(), board, Some(0))?);
    assert!(result.is_err());
    Ok(())
}
