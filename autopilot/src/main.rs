use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use hero_autopilot::config::{resolve_data_dir, resolve_jobs};
use hero_autopilot::loader::{load_all, load_scenario, take_in_order};
use hero_autopilot::scoreboard::BestScores;
use hero_autopilot::search::{run_search, SearchConfig};
use hero_autopilot::submit::{read_solution, write_solution, SolutionSubmitter};
use hero_autopilot::util::{default_param_specs, parse_param_spec, select_test_ids};
use hero_grid_core::{
    evaluate, verify_claimed_score, verify_log, MoveRule, PolicyConfig, PolicyParams,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Parser, Debug)]
#[command(name = "hero-autopilot")]
#[command(about = "Grid-searched hero policies for turn-limited monster hunting scenarios")]
struct Cli {
    /// Directory holding 001.json, 002.json, ... (falls back to DATA_DIRECTORY)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
    #[arg(long, value_enum, global = true, default_value_t = CliMovement::Grid)]
    movement: CliMovement,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List the scenarios found in the data directory
    List,
    /// Grid-search every selected scenario and keep the best solutions
    Solve {
        /// Test ids such as `3` or `7-9`; none selects every scenario
        ids: Vec<String>,
        /// Search axis as name=min:max:step (repeatable)
        #[arg(long = "param")]
        params: Vec<String>,
        #[arg(long)]
        jobs: Option<usize>,
        #[arg(long)]
        out_dir: Option<PathBuf>,
        /// Best-score table read at start and rewritten at the end
        #[arg(long)]
        scores: Option<PathBuf>,
    },
    /// Run the policy once with fixed thresholds
    Evaluate {
        id: u32,
        #[arg(long)]
        prefer_exp_threshold: f64,
        #[arg(long)]
        pass_monster_threshold: f64,
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Replay a solution document against its scenario
    Verify {
        id: u32,
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        claimed_score: Option<i64>,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum CliMovement {
    Grid,
    Euclidean,
}

impl From<CliMovement> for MoveRule {
    fn from(value: CliMovement) -> Self {
        match value {
            CliMovement::Grid => MoveRule::Grid,
            CliMovement::Euclidean => MoveRule::Euclidean,
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::filter::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let Cli {
        data_dir,
        movement,
        command,
    } = Cli::parse();
    let data_dir = resolve_data_dir(data_dir)?;
    let movement: MoveRule = movement.into();

    match command {
        Commands::List => {
            let scenarios = load_all(&data_dir)?;
            for scenario in &scenarios {
                println!(
                    "{:03}  {}x{}  turns={}  monsters={}",
                    scenario.id,
                    scenario.width,
                    scenario.height,
                    scenario.turns,
                    scenario.monster_count()
                );
            }
            println!("scenarios={}", scenarios.len());
        }
        Commands::Solve {
            ids,
            params,
            jobs,
            out_dir,
            scores,
        } => {
            let jobs = resolve_jobs(jobs)?;
            let params = if params.is_empty() {
                default_param_specs()
            } else {
                params
                    .iter()
                    .map(|raw| parse_param_spec(raw))
                    .collect::<Result<Vec<_>>>()?
            };

            let mut scenarios = load_all(&data_dir)?;
            if !ids.is_empty() {
                let wanted = select_test_ids(&ids, scenarios.len());
                if wanted.is_empty() {
                    return Err(anyhow!("no valid test ids selected"));
                }
                scenarios = take_in_order(scenarios, &wanted);
            }
            if scenarios.is_empty() {
                return Err(anyhow!("no scenarios found in {}", data_dir.display()));
            }

            let out_dir = out_dir.unwrap_or_else(|| {
                PathBuf::from(format!("solutions/{}-{}", movement.as_str(), timestamp_suffix()))
            });
            let board = Arc::new(match &scores {
                Some(path) => BestScores::load(path)?,
                None => BestScores::new(),
            });
            let submitter = SolutionSubmitter::new(&out_dir, movement, board.clone());

            let report = run_search(SearchConfig {
                scenarios,
                params,
                movement,
                jobs,
                out_dir: out_dir.clone(),
                submitter,
            })?;
            if let Some(path) = &scores {
                board.save(path)?;
            }

            println!("movement={}", movement.as_str());
            println!("scenarios={}", report.scenario_count);
            println!("grid_points={}", report.grid_points);
            println!(
                "jobs={}",
                report
                    .jobs
                    .map(|value| value.to_string())
                    .unwrap_or_else(|| "auto".to_string())
            );
            println!("total_score={}", report.total_score);
            println!("out_dir={}", out_dir.display());
            for result in &report.results {
                println!(
                    "  [{:03}] score={} point={} actions={} level={}",
                    result.scenario_id,
                    result.score,
                    result.best_point_index,
                    result.actions,
                    result.final_level
                );
            }
        }
        Commands::Evaluate {
            id,
            prefer_exp_threshold,
            pass_monster_threshold,
            output,
        } => {
            let scenario = load_scenario(&data_dir, id)?;
            let params = PolicyParams {
                prefer_exp_threshold,
                pass_monster_threshold,
            };
            let evaluation = evaluate(&scenario, &params, &PolicyConfig { movement });
            let output = output.unwrap_or_else(|| {
                PathBuf::from(format!("solutions/{id:03}-score{}.json", evaluation.score))
            });
            write_solution(&output, &evaluation.actions)?;

            let (moves, attacks) = evaluation.actions.count_by_kind();
            println!("test={id}");
            println!("movement={}", movement.as_str());
            println!("score={}", evaluation.score);
            println!("actions={}", evaluation.actions.len());
            println!("moves={moves}");
            println!("attacks={attacks}");
            println!("level={}", evaluation.final_state.level);
            println!("fatigue={}", evaluation.final_state.fatigue);
            println!("output={}", output.display());
        }
        Commands::Verify {
            id,
            input,
            claimed_score,
        } => {
            let scenario = load_scenario(&data_dir, id)?;
            let log = read_solution(&input)?;
            let report = match claimed_score {
                Some(claimed) => verify_claimed_score(&scenario, log.as_slice(), movement, claimed),
                None => verify_log(&scenario, log.as_slice(), movement),
            }
            .with_context(|| format!("{} failed verification", input.display()))?;

            println!("input={}", input.display());
            println!("test={}", report.scenario_id);
            println!("actions={}", report.actions);
            println!("moves={}", report.moves);
            println!("attacks={}", report.attacks);
            println!("score={}", report.score);
            println!("position={}", report.final_state.position);
            println!("level={}", report.final_state.level);
            println!("monsters_alive={}", report.final_state.monsters_alive);
        }
    }

    Ok(())
}

fn timestamp_suffix() -> String {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|duration| duration.as_secs())
        .unwrap_or_default();
    now.to_string()
}
