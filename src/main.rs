//! Infinite Climber headless runner
//!
//! Drives the simulation at a fixed 60 Hz frame rate without rendering,
//! optionally with the built-in autopilot, and prints a JSON run summary.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::{SystemTime, UNIX_EPOCH};

use clap::Parser;
use serde::Serialize;

use infinite_climber::leaderboard::DEFAULT_TOP_LIMIT;
use infinite_climber::sim::{EventBus, GameEvent, GameState, RunSummary, TickInput, autopilot};
use infinite_climber::{
    ConfigError, JsonFileLeaderboard, Leaderboard, MemoryLeaderboard, ScoreSubmission, Tuning,
    UnavailableLeaderboard, logging, submit_safely,
};

/// Frame length fed to the simulation
const FRAME_DT: f32 = 1.0 / 60.0;

/// Run the climber simulation headless
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// RNG seed for the run
    #[arg(long, default_value_t = 1)]
    seed: u64,

    /// Number of frames to simulate
    #[arg(long, default_value_t = 3600)]
    frames: u32,

    /// JSON file with tuning overrides
    #[arg(long)]
    tuning: Option<PathBuf>,

    /// JSON leaderboard file to submit the final score to
    #[arg(long)]
    leaderboard: Option<PathBuf>,

    /// Player id for the leaderboard submission
    #[arg(long, default_value = "local")]
    player: String,

    /// Let the built-in bot climb instead of standing still
    #[arg(long)]
    autoplay: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Serialize)]
struct Report {
    #[serde(flatten)]
    summary: RunSummary,
    events_published: usize,
    score_recorded: bool,
    rank: Option<usize>,
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

fn open_leaderboard(path: Option<PathBuf>) -> Box<dyn Leaderboard> {
    match path {
        Some(path) => match JsonFileLeaderboard::open(&path) {
            Ok(board) => Box::new(board),
            Err(e) => {
                log::warn!("Leaderboard disabled: {}", e);
                Box::new(UnavailableLeaderboard::new(e.to_string()))
            }
        },
        None => Box::new(MemoryLeaderboard::new()),
    }
}

fn run(args: Args) -> Result<Report, ConfigError> {
    let tuning = match &args.tuning {
        Some(path) => Tuning::load(path)?,
        None => Tuning::default(),
    };
    let mut board = open_leaderboard(args.leaderboard);

    let mut events = EventBus::new();
    let mut state = GameState::new(args.seed, tuning, &mut events);
    let mut events_published = 0;
    let mut score_recorded = false;
    let mut last_tier = i32::MIN;

    for _ in 0..args.frames {
        let input = if args.autoplay {
            autopilot(&state)
        } else {
            TickInput::default()
        };
        state.update(FRAME_DT, &input, &mut events);

        for event in events.drain() {
            events_published += 1;
            match event {
                GameEvent::LevelChange(tier) => {
                    if tier > last_tier {
                        log::debug!("Reached tier {}", tier);
                        last_tier = tier;
                    }
                }
                GameEvent::GameOver(score) => {
                    let submission = ScoreSubmission {
                        player_id: args.player.clone(),
                        display_name: args.player.clone(),
                        avatar_ref: None,
                        score,
                        tier_reached: u32::try_from(last_tier).unwrap_or(0),
                        timestamp_ms: now_ms(),
                    };
                    score_recorded = submit_safely(board.as_mut(), &submission);
                }
                other => log::debug!("{:?}", other),
            }
        }

        if state.is_over() {
            break;
        }
    }

    let rank = board.rank(&args.player).ok().flatten();
    if let Ok(top) = board.top(DEFAULT_TOP_LIMIT) {
        for (i, entry) in top.iter().enumerate() {
            log::info!("#{} {} {}", i + 1, entry.display_name, entry.score);
        }
    }

    Ok(Report {
        summary: state.summary(),
        events_published,
        score_recorded,
        rank,
    })
}

fn main() -> ExitCode {
    let args = Args::parse();
    logging::init(args.verbose);

    match run(args) {
        Ok(report) => match serde_json::to_string_pretty(&report) {
            Ok(json) => {
                println!("{}", json);
                ExitCode::SUCCESS
            }
            Err(e) => {
                log::error!("Could not encode run summary: {}", e);
                ExitCode::FAILURE
            }
        },
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
