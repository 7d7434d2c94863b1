//! Lane Runner entry point
//!
//! Headless runner: plays one run with the autopilot, records the result on
//! the leaderboard and prints the board.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use lane_runner::highscores::{HighScoreEntry, Leaderboard, format_date, placeholder_location};
use lane_runner::persistence::FileStore;
use lane_runner::sim::{GameMode, Simulation, TickDriver, autopilot};
use lane_runner::{Settings, now_millis};

#[derive(Parser, Debug)]
#[command(name = "lane-runner", about = "Dodge obstacles, grab coins, chase the top 10")]
struct Args {
    /// Settings file
    #[arg(long, default_value = "lane_runner_settings.json")]
    settings: PathBuf,
    /// Mode tag: button_slow, button_fast or sensor
    #[arg(long)]
    mode: Option<String>,
    /// Seed for a reproducible run
    #[arg(long)]
    seed: Option<u64>,
    /// Name recorded on the leaderboard
    #[arg(long)]
    player: Option<String>,
    /// Tick at the configured period instead of as fast as possible
    #[arg(long)]
    realtime: bool,
    /// Stop the run after this many ticks (the result is not recorded)
    #[arg(long)]
    max_ticks: Option<u64>,
    /// Print the leaderboard and exit
    #[arg(long)]
    show_scores: bool,
    /// Clear the leaderboard and exit
    #[arg(long)]
    clear_scores: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut settings = Settings::load(&args.settings);
    if let Some(mode) = &args.mode {
        settings.mode = GameMode::from_tag(mode);
    }
    if let Some(player) = args.player {
        settings.player_name = player;
    }
    let seed = args.seed.or(settings.seed).unwrap_or_else(now_millis);

    let board = Leaderboard::new(FileStore::new(&settings.leaderboard_path));

    if args.clear_scores {
        board.clear().context("clearing the leaderboard")?;
        println!("Leaderboard cleared.");
        return Ok(());
    }
    if args.show_scores {
        print_board(&board.entries());
        return Ok(());
    }

    log::info!(
        "Lane Runner starting: mode={}, seed={}, player={}",
        settings.mode,
        seed,
        settings.player_name
    );

    let sim = Simulation::new(settings.tuning.clone(), settings.mode, seed);
    let mut driver = TickDriver::new(sim, settings.driver_config(args.realtime));
    let summary = driver.run(autopilot, args.max_ticks);

    println!(
        "Run over after {} ticks: distance {}, coins {}",
        summary.ticks, summary.score, summary.coins
    );

    if !summary.game_over {
        log::info!("Run stopped before game over, not recording a score");
        return Ok(());
    }

    let location = placeholder_location(board.entries().len());
    let entry = summary.into_entry(settings.player_name.clone(), now_millis(), Some(location));
    match board.submit(entry).context("saving the high score")? {
        Some(rank) => println!("New high score! Rank #{rank}"),
        None => println!("No high score this time."),
    }
    print_board(&board.entries());
    Ok(())
}

fn print_board(entries: &[HighScoreEntry]) {
    if entries.is_empty() {
        println!("No high scores yet.");
        return;
    }
    let now = now_millis();
    println!("{:>3}  {:<12} {:>8} {:>6}  {:<12} {}", "#", "Player", "Score", "Coins", "Mode", "When");
    for (i, e) in entries.iter().enumerate() {
        println!(
            "{:>3}  {:<12} {:>8} {:>6}  {:<12} {}",
            i + 1,
            e.player_name,
            e.score,
            e.coins,
            e.game_mode,
            format_date(e.timestamp, now)
        );
    }
}
