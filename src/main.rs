#![forbid(unsafe_code)]
#![deny(clippy::all, clippy::cargo)]
#![warn(
    clippy::nursery,
    clippy::pedantic,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(clippy::module_name_repetitions)]

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use glob::GlobError;
use itertools::Itertools;
use rayon::prelude::*;
use tracing::{debug, error, info, Level};
use tracing_subscriber::FmtSubscriber;

use pbp_replay::event_file::batch::{replay_games, GameInput};
use pbp_replay::{parse, ReplayOptions};

const ABOUT: &str = "Parses play-by-play notation and replays baseball games.";

#[derive(Parser, Debug)]
#[command(name = "pbp-replay", about = ABOUT)]
struct Opt {
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print each play as parsed JSON. Reads stdin when no plays are given.
    Parse { plays: Vec<String> },
    /// Replay every game in the JSON files matching a glob.
    Replay {
        #[arg(short, long)]
        input: String,

        #[arg(long)]
        skip_bad_plays: bool,
    },
}

fn parse_plays(plays: Vec<String>) -> Result<()> {
    let plays = if plays.is_empty() {
        std::io::stdin()
            .lock()
            .lines()
            .collect::<Result<Vec<String>, _>>()
            .context("Failed to read plays from stdin")?
    } else {
        plays
    };
    for play in plays.iter().map(|p| p.trim()).filter(|p| !p.is_empty()) {
        match parse(play) {
            Ok(event) => println!("{}", serde_json::to_string(&event)?),
            Err(e) => error!("{}", e),
        }
    }
    Ok(())
}

fn read_games(path: &Path) -> Result<Vec<GameInput>> {
    debug!("Reading {}", path.display());
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to read games from {}", path.display()))
}

fn replay_files(input: &str, skip_bad_plays: bool) -> Result<()> {
    let files = glob::glob(input)
        .with_context(|| format!("Invalid input pattern {input}"))?
        .collect::<Result<Vec<PathBuf>, GlobError>>()?
        .into_iter()
        .sorted()
        .collect_vec();
    info!("Found {} input files", files.len());

    let games = files
        .par_iter()
        .map(|p| read_games(p))
        .collect::<Result<Vec<Vec<GameInput>>>>()?
        .into_iter()
        .flatten()
        .collect_vec();

    let options = if skip_bad_plays {
        ReplayOptions::skipping_bad_plays()
    } else {
        ReplayOptions::default()
    };
    let results = replay_games(&games, options);
    let failures = results.iter().filter(|r| r.is_err()).count();
    for state in results.into_iter().flatten() {
        println!("{}", serde_json::to_string(&state.summary())?);
    }
    info!("Replayed {} games, {} failed", games.len(), failures);
    Ok(())
}

#[allow(clippy::expect_used)]
fn main() {
    let opt: Opt = Opt::parse();
    let level = if opt.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("Failed to initialize trace");

    let start = Instant::now();
    match opt.command {
        Command::Parse { plays } => parse_plays(plays),
        Command::Replay {
            input,
            skip_bad_plays,
        } => replay_files(&input, skip_bad_plays),
    }
    .expect("Error occurred while processing input");

    info!("Elapsed: {:?}", start.elapsed());
}
