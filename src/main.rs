//! Shape Evolution - headless console front-end
//!
//! Reads one command per line from stdin and prints the engine's replies.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use clap::Parser;
use shape_evolution::console::{Command, HELP, describe, execute};
use shape_evolution::hud::{GAME_TITLE, Splash, find_splash};
use shape_evolution::sim::Game;
use shape_evolution::{Difficulty, Settings};

#[derive(Parser)]
#[command(name = "shape-evolution")]
#[command(about = "Drag, rotate and scale polygons onto their ghost targets")]
struct Args {
    /// Settings JSON (missing fields use defaults)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Resume from a saved snapshot
    #[arg(long)]
    load: Option<PathBuf>,

    /// easy, normal or hard
    #[arg(long)]
    difficulty: Option<String>,

    /// Player name
    #[arg(long)]
    name: Option<String>,

    /// Fixed RNG seed for a reproducible layout
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> io::Result<()> {
    env_logger::init();
    let args = Args::parse();
    log::info!("{} starting...", GAME_TITLE);

    let mut settings = match &args.config {
        Some(path) => Settings::load_or_default(path),
        None => Settings::default(),
    };
    if let Some(name) = &args.difficulty {
        settings.difficulty = Difficulty::parse(name);
    }
    if let Some(name) = &args.name {
        settings.player_name = name.clone();
    }

    let mut game = match args.seed {
        Some(seed) => {
            log::info!("Game initialized with seed: {}", seed);
            Game::seeded(settings, seed)
        }
        None => Game::new(settings),
    };

    let mut stdout = io::stdout().lock();
    let cwd = std::env::current_dir().unwrap_or_default();
    match find_splash(&[cwd]) {
        Splash::Image(path) => writeln!(stdout, "[logo: {}]", path.display())?,
        Splash::Text(title) => writeln!(stdout, "{title}")?,
    }
    writeln!(stdout, "{GAME_TITLE}\n")?;

    let resumed = match &args.load {
        Some(path) => match game.load_from(path) {
            Ok(()) => true,
            Err(e) => {
                log::warn!("Could not load {}: {}", path.display(), e);
                writeln!(stdout, "Load failed: {e}")?;
                false
            }
        },
        None => false,
    };
    if !resumed {
        game.reset();
    }
    writeln!(stdout, "{HELP}\n")?;
    write!(stdout, "{}", describe(&game))?;

    for line in io::stdin().lock().lines() {
        let line = line?;
        let command = match Command::parse(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                writeln!(stdout, "{e}")?;
                continue;
            }
        };
        if command == Command::Quit {
            break;
        }
        let reply = execute(&mut game, &command);
        if !reply.is_empty() {
            writeln!(stdout, "{}", reply.trim_end())?;
        }
        stdout.flush()?;
    }

    log::info!("{} exiting at level {}", GAME_TITLE, game.level());
    Ok(())
}
