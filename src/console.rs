//! Line commands for the headless front-end
//!
//! Each line maps to one engine event, mirroring the desktop bindings:
//! pointer down/drag/up, `a`/`d` rotate by 2° (`A`/`D` by 10°), `+`/`-` wheel
//! zoom, check, next, reset, save and load.

use std::fmt::Write as _;
use std::path::PathBuf;

use glam::DVec2;
use rand::RngCore;
use thiserror::Error;

use crate::hud::{Hud, stats_table};
use crate::settings::Difficulty;
use crate::sim::{Alignment, Game};

/// Fine and coarse rotation steps in degrees
pub const ROTATE_STEP: f64 = 2.0;
pub const ROTATE_STEP_COARSE: f64 = 10.0;
/// Scale factors of one mouse wheel notch
pub const WHEEL_ZOOM_IN: f64 = 1.04;
pub const WHEEL_ZOOM_OUT: f64 = 0.96;

/// One parsed input line
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Down(DVec2),
    Drag(DVec2),
    Up(DVec2),
    Rotate(f64),
    Scale(f64),
    /// Real canvas size reported by the front-end
    Canvas(u32, u32),
    Check,
    Next,
    Reset,
    SetDifficulty(Difficulty),
    Name(String),
    Save(PathBuf),
    Load(PathBuf),
    Show,
    Stats,
    Help,
    Quit,
}

#[derive(Debug, Error, PartialEq)]
pub enum CommandError {
    #[error("unknown command '{0}' (try 'help')")]
    Unknown(String),

    #[error("usage: {0}")]
    Usage(&'static str),
}

pub const HELP: &str = "\
down X Y | drag X Y | up X Y   pointer events
rot DEG | a | d | A | D        rotate selection (a/d: 2 deg, A/D: 10 deg)
scale F | + | -                scale selection (+/-: one wheel notch)
check                          check the selected batch
next                           go to the next level once cleared
reset                          start over at level 1
difficulty easy|normal|hard    change tolerance profile
canvas W H                     report the window size for placement
name NAME                      set player name
save PATH | load PATH          snapshot file
show | stats | help | quit";

fn parse_f64(arg: Option<&str>, usage: &'static str) -> Result<f64, CommandError> {
    arg.and_then(|s| s.parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .ok_or(CommandError::Usage(usage))
}

fn parse_extent(arg: Option<&str>) -> Result<u32, CommandError> {
    arg.and_then(|s| s.parse::<u32>().ok())
        .filter(|&v| v > 0)
        .ok_or(CommandError::Usage("canvas W H"))
}

fn parse_point<'a>(
    mut args: impl Iterator<Item = &'a str>,
    usage: &'static str,
) -> Result<DVec2, CommandError> {
    let x = parse_f64(args.next(), usage)?;
    let y = parse_f64(args.next(), usage)?;
    Ok(DVec2::new(x, y))
}

impl Command {
    /// Parse one line; blank lines and `#` comments yield `None`
    pub fn parse(line: &str) -> Result<Option<Self>, CommandError> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(None);
        }
        let mut parts = line.split_whitespace();
        let Some(word) = parts.next() else {
            return Ok(None);
        };
        let rest = line[word.len()..].trim();

        let command = match word {
            "down" => Command::Down(parse_point(parts, "down X Y")?),
            "drag" => Command::Drag(parse_point(parts, "drag X Y")?),
            "up" => Command::Up(parse_point(parts, "up X Y")?),
            "rot" | "rotate" => Command::Rotate(parse_f64(parts.next(), "rot DEG")?),
            "a" => Command::Rotate(-ROTATE_STEP),
            "d" => Command::Rotate(ROTATE_STEP),
            "A" => Command::Rotate(-ROTATE_STEP_COARSE),
            "D" => Command::Rotate(ROTATE_STEP_COARSE),
            "scale" => Command::Scale(parse_f64(parts.next(), "scale F")?),
            "canvas" => Command::Canvas(parse_extent(parts.next())?, parse_extent(parts.next())?),
            "+" => Command::Scale(WHEEL_ZOOM_IN),
            "-" => Command::Scale(WHEEL_ZOOM_OUT),
            "check" => Command::Check,
            "next" => Command::Next,
            "reset" => Command::Reset,
            "difficulty" => Command::SetDifficulty(
                parts
                    .next()
                    .and_then(Difficulty::from_str)
                    .ok_or(CommandError::Usage("difficulty easy|normal|hard"))?,
            ),
            "name" if !rest.is_empty() => Command::Name(rest.to_string()),
            "name" => return Err(CommandError::Usage("name NAME")),
            "save" if !rest.is_empty() => Command::Save(PathBuf::from(rest)),
            "save" => return Err(CommandError::Usage("save PATH")),
            "load" if !rest.is_empty() => Command::Load(PathBuf::from(rest)),
            "load" => return Err(CommandError::Usage("load PATH")),
            "show" => Command::Show,
            "stats" => Command::Stats,
            "help" | "?" => Command::Help,
            "quit" | "exit" => Command::Quit,
            other => return Err(CommandError::Unknown(other.to_string())),
        };
        Ok(Some(command))
    }
}

/// Board listing: HUD header plus each pair's current error
pub fn describe<R: RngCore>(game: &Game<R>) -> String {
    let hud = Hud::from_game(game);
    let mut out = format!(
        "{}  {}  {}  [{}]  {:?}\n",
        hud.player,
        hud.level,
        hud.hearts,
        hud.progress,
        game.phase()
    );
    let highlighted = game.highlighted_indices();
    for (i, (active, target)) in game
        .active_shapes()
        .iter()
        .zip(game.target_shapes())
        .enumerate()
    {
        let error = Alignment::measure(active, target);
        let mark = if game.selected_indices().contains(&i) {
            '*'
        } else if highlighted.contains(&i) {
            '>'
        } else {
            ' '
        };
        let _ = writeln!(
            out,
            "{mark}#{i} {}-gon at ({:.0}, {:.0}) size {} rot {:.0}  ->  target ({:.0}, {:.0}) size {} rot {:.0}  | off {:.0}px {:.0}° {:.0}%",
            active.sides,
            active.cx,
            active.cy,
            active.size,
            active.rotation,
            target.cx,
            target.cy,
            target.size,
            target.rotation,
            error.position,
            error.rotation,
            error.scale * 100.0
        );
    }
    if let Some(banner) = hud.banner {
        out.push_str(&banner);
        out.push('\n');
    }
    out
}

/// Apply a command and return the text to show; `Quit` is left to the caller
pub fn execute<R: RngCore>(game: &mut Game<R>, command: &Command) -> String {
    match command {
        Command::Down(p) => match game.pointer_down(*p) {
            Some(i) => format!(
                "Grabbed #{i} (selected {}/{})",
                game.selected_indices().len(),
                game.required_batch()
            ),
            None => "Nothing there.".to_string(),
        },
        Command::Drag(p) => {
            game.drag_to(*p);
            String::new()
        }
        Command::Up(p) => {
            game.pointer_up(*p);
            String::new()
        }
        Command::Rotate(deg) => {
            game.rotate_active(*deg);
            String::new()
        }
        Command::Scale(factor) => {
            game.scale_active(*factor);
            String::new()
        }
        Command::Canvas(width, height) => {
            game.set_canvas_size(*width, *height);
            format!("Canvas {width}x{height}")
        }
        Command::Check => game.check_alignment_batch().message,
        Command::Next => {
            if !game.is_level_cleared() {
                "Finish this level first.".to_string()
            } else if game.next_level() {
                Hud::from_game(game).level
            } else {
                Hud::from_game(game).banner.unwrap_or_default()
            }
        }
        Command::Reset => {
            game.reset();
            describe(game)
        }
        Command::SetDifficulty(difficulty) => {
            game.set_difficulty(*difficulty);
            format!("Difficulty: {}", difficulty.as_str())
        }
        Command::Name(name) => {
            game.set_player_name(name);
            Hud::from_game(game).player
        }
        Command::Save(path) => match game.save_to(path) {
            Ok(()) => format!("Saved {}", path.display()),
            Err(e) => format!("Save failed: {e}"),
        },
        Command::Load(path) => match game.load_from(path) {
            Ok(()) => format!("Loaded {}\n{}", path.display(), describe(game)),
            Err(e) => {
                log::warn!("Load of {} rejected: {}", path.display(), e);
                format!("Load failed: {e}")
            }
        },
        Command::Show => describe(game),
        Command::Stats => stats_table(game),
        Command::Help => HELP.to_string(),
        Command::Quit => String::new(),
    }
}
