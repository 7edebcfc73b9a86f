//! Dog Courier headless driver
//!
//! Loads a world configuration, optionally restores a saved state, then
//! advances the simulation in fixed steps. Bots can be joined to exercise
//! the world without a transport layer.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::{Duration, Instant};

use clap::Parser;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use dog_courier::config::{GameSettings, load_game};
use dog_courier::sim::{Direction, Token};
use dog_courier::Application;

const BOT_DIRECTIONS: [Direction; 4] = [
    Direction::North,
    Direction::South,
    Direction::West,
    Direction::East,
];

#[derive(Parser)]
#[command(name = "dog-courier", about = "Run the Dog Courier simulation headless")]
struct Cli {
    /// World configuration file
    #[arg(short = 'c', long = "config-file")]
    config: PathBuf,
    /// Milliseconds per tick
    #[arg(short = 't', long = "tick-period", default_value_t = 50)]
    tick_period: u64,
    /// Number of ticks to run
    #[arg(long, default_value_t = 1200)]
    ticks: u64,
    /// Sleep between ticks instead of running as fast as possible
    #[arg(long)]
    realtime: bool,
    /// Spawn dogs at random road points
    #[arg(long)]
    randomize_spawn_points: bool,
    /// Snapshot file to restore from and save to
    #[arg(long)]
    state_file: Option<PathBuf>,
    /// Autosave period in milliseconds of simulated time
    #[arg(long)]
    save_state_period: Option<u64>,
    /// Fixed seed for reproducible runs
    #[arg(long)]
    seed: Option<u64>,
    /// Join this many wandering bots on the first map
    #[arg(long, default_value_t = 0)]
    bots: usize,
}

impl Cli {
    fn settings(&self) -> GameSettings {
        GameSettings {
            tick_period_ms: Some(self.tick_period),
            randomize_spawn_points: self.randomize_spawn_points,
            state_file: self.state_file.clone(),
            save_state_period_ms: self.save_state_period,
            seed: self.seed,
        }
    }
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let settings = cli.settings();
    let game = load_game(&cli.config, settings.seed)?;
    let mut app = Application::new(game, settings);
    if app.restore_state()? {
        log::info!("Resuming at {:.0} ms", app.game().game_time_ms());
    }

    let mut rng = match cli.seed {
        Some(seed) => Pcg32::seed_from_u64(seed ^ 0xb07),
        None => Pcg32::from_os_rng(),
    };
    let bots = join_bots(&mut app, cli.bots)?;

    log::info!(
        "Running {} ticks of {} ms with {} bots",
        cli.ticks,
        cli.tick_period,
        bots.len()
    );
    let period = Duration::from_millis(cli.tick_period);
    for _ in 0..cli.ticks {
        let started = Instant::now();
        steer_bots(&mut app, &bots, &mut rng)?;
        app.tick(cli.tick_period as f64)?;
        if cli.realtime {
            std::thread::sleep(period.saturating_sub(started.elapsed()));
        }
    }

    app.save_state()?;
    let top = app.leaderboard(0, 10)?;
    println!("{}", serde_json::to_string_pretty(&top)?);
    Ok(())
}

fn join_bots(app: &mut Application, count: usize) -> Result<Vec<Token>, Box<dyn std::error::Error>> {
    let Some(map_id) = app.list_maps().first().map(|m| m.id.clone()) else {
        if count > 0 {
            log::warn!("No maps loaded; skipping bots");
        }
        return Ok(Vec::new());
    };
    let mut tokens = Vec::with_capacity(count);
    for i in 0..count {
        let joined = app.join(&format!("bot-{i}"), &map_id)?;
        tokens.push(joined.auth_token);
    }
    Ok(tokens)
}

/// Pick a new heading for every bot that has come to a stop
fn steer_bots(app: &mut Application, bots: &[Token], rng: &mut Pcg32) -> Result<(), Box<dyn std::error::Error>> {
    for token in bots {
        let stopped = match app.find_player(token) {
            Ok(player) => app
                .game()
                .player_dog(player)
                .is_some_and(|dog| dog.is_stationary()),
            // Retired
            Err(_) => continue,
        };
        if stopped {
            let direction = BOT_DIRECTIONS[rng.random_range(0..BOT_DIRECTIONS.len())];
            app.set_action(token, &direction.code().to_string())?;
        }
    }
    Ok(())
}
