//! `bulwark`: run a headless session of the simulation.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use bulwark_app::autopilot::Autopilot;
use bulwark_app::highscores::{FileReporter, HighScores};
use bulwark_app::state::AppState;
use bulwark_core::enums::Theme;
use bulwark_sim::{ProgressReporter, SimConfig};

/// How often the host polls the latest snapshot.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Gameplay seed. Overrides the config file.
    #[arg(long)]
    seed: Option<u64>,

    /// Map to play: meadow, desert or tundra. Overrides the config file.
    #[arg(long, value_name = "NAME")]
    map: Option<MapArg>,

    /// Wall-clock seconds to run before stopping.
    #[arg(long, value_name = "SECONDS", default_value_t = 120)]
    seconds: u64,

    /// JSON file with a `SimConfig`.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// High score file updated when the run ends.
    #[arg(long, value_name = "PATH", default_value = "bulwark-scores.json")]
    scores: PathBuf,

    /// Leave the board alone instead of letting the scripted player build.
    #[arg(long)]
    no_autopilot: bool,
}

#[derive(Debug, Clone, Copy)]
struct MapArg(Theme);

impl FromStr for MapArg {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "meadow" => Ok(Self(Theme::Meadow)),
            "desert" => Ok(Self(Theme::Desert)),
            "tundra" => Ok(Self(Theme::Tundra)),
            other => Err(format!("unknown map {other:?}")),
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

fn load_config(args: &Args) -> Result<SimConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            serde_json::from_str(&json)
                .with_context(|| format!("parsing config {}", path.display()))?
        }
        None => SimConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if let Some(MapArg(theme)) = args.map {
        config.theme = theme;
    }
    Ok(config)
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();
    let config = load_config(&args)?;
    info!(seed = config.seed, theme = ?config.theme, seconds = args.seconds, "starting session");

    let reporter: Box<dyn ProgressReporter> =
        Box::new(FileReporter::new(&args.scores, config.seed, config.theme));
    let app = AppState::new();
    app.start(config, Some(reporter))
        .context("starting game loop")?;

    let mut autopilot = (!args.no_autopilot).then(Autopilot::new);
    let deadline = Instant::now() + Duration::from_secs(args.seconds);
    let mut last_wave = 0;

    while Instant::now() < deadline {
        std::thread::sleep(POLL_INTERVAL);
        let Some(snapshot) = app.latest() else {
            continue;
        };

        if snapshot.progress.wave != last_wave {
            last_wave = snapshot.progress.wave;
            info!(
                wave = last_wave,
                money = snapshot.progress.money,
                lives = snapshot.progress.lives,
                towers = snapshot.towers.len(),
                "progress"
            );
        }
        if snapshot.progress.is_game_over {
            break;
        }
        if let Some(pilot) = autopilot.as_mut() {
            for command in pilot.decide(&snapshot) {
                app.send(command).context("sending command")?;
            }
        }
    }

    app.shutdown().context("stopping game loop")?;

    if let Some(snapshot) = app.latest() {
        info!(
            wave = snapshot.progress.wave,
            lives = snapshot.progress.lives,
            game_over = snapshot.progress.is_game_over,
            "session ended"
        );
    }
    let scores = HighScores::load(&args.scores)
        .with_context(|| format!("reading {}", args.scores.display()))?;
    if let Some(best) = scores.top_wave() {
        info!(best, entries = scores.entries.len(), "high scores");
    }
    Ok(())
}
