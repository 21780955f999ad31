//! Text the presentation layer shows around the canvas
//!
//! Header labels, the progress badge and the optional splash logo.

use std::path::{Path, PathBuf};

use rand::RngCore;

use crate::consts::STARTING_LIVES;
use crate::sim::{Game, GamePhase};

/// Splash placeholder when no logo image is found
pub const SPLASH_TITLE: &str = "LP Games";
/// Title shown after the splash logo
pub const GAME_TITLE: &str = "Shape Evolution";

const LOGO_NAMES: [&str; 4] = ["logo.png", "Logo.png", "logo.PNG", "Logo.PNG"];

/// Splash screen content
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Splash {
    Image(PathBuf),
    Text(&'static str),
}

/// Look for a logo in each directory and its `assets/` folder; a missing
/// image silently falls back to the text title
pub fn find_splash<P: AsRef<Path>>(search_dirs: &[P]) -> Splash {
    for dir in search_dirs {
        for base in [dir.as_ref().to_path_buf(), dir.as_ref().join("assets")] {
            for name in LOGO_NAMES {
                let path = base.join(name);
                if path.is_file() {
                    return Splash::Image(path);
                }
            }
        }
    }
    Splash::Text(SPLASH_TITLE)
}

/// Header and status strings for one frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hud {
    /// "Level: 2/5"
    pub level: String,
    /// One heart per remaining life
    pub hearts: String,
    /// Cleared levels badge, "1/5"
    pub progress: String,
    pub player: String,
    /// End-of-run banner, if any
    pub banner: Option<String>,
}

impl Hud {
    pub fn from_game<R: RngCore>(game: &Game<R>) -> Self {
        let cleared = match game.phase() {
            GamePhase::LevelClearing | GamePhase::Completed => game.level(),
            _ => game.level().saturating_sub(1),
        };
        let banner = match game.phase() {
            GamePhase::Completed => Some(format!(
                "{}/{} - Well done, {}!",
                game.level_count(),
                game.level_count(),
                game.player_name()
            )),
            GamePhase::GameOver => Some("Out of lives. Game over.".to_string()),
            _ => None,
        };
        Self {
            level: format!("Level: {}/{}", game.level(), game.level_count()),
            hearts: "❤".repeat(game.lives().clamp(0, STARTING_LIVES) as usize),
            progress: format!("{}/{}", cleared, game.level_count()),
            player: format!("Playing: {}", game.player_name()),
            banner,
        }
    }
}

/// Plain-text stats table: one row per level with time and attempts
pub fn stats_table<R: RngCore>(game: &Game<R>) -> String {
    let stats = game.stats();
    let attempts = stats.attempt_counts();
    let mut out = String::from("Level  Time (s)  Attempts\n");
    for ((level, secs), tries) in stats.chart_rows().into_iter().zip(attempts) {
        out.push_str(&format!("{level:>5}  {secs:>8.1}  {tries:>8}\n"));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;

    #[test]
    fn test_hud_for_fresh_run() {
        let mut game = Game::seeded(Settings::default(), 3);
        game.set_player_name("Ada");
        game.reset();
        let hud = Hud::from_game(&game);
        assert_eq!(hud.level, "Level: 1/5");
        assert_eq!(hud.hearts, "❤❤❤");
        assert_eq!(hud.progress, "0/5");
        assert_eq!(hud.player, "Playing: Ada");
        assert_eq!(hud.banner, None);
    }

    #[test]
    fn test_hearts_capped_at_starting_lives() {
        let mut game = Game::seeded(Settings::default(), 3);
        game.reset();
        game.lives = i32::MAX;
        assert_eq!(Hud::from_game(&game).hearts, "❤❤❤");
        game.lives = -2;
        assert_eq!(Hud::from_game(&game).hearts, "");
    }

    #[test]
    fn test_hud_banners() {
        let mut game = Game::seeded(
            Settings {
                level_count: 1,
                ..Default::default()
            },
            3,
        );
        game.reset();
        game.active.clear();
        game.target.clear();
        game.phase = GamePhase::LevelClearing;
        assert!(!game.next_level());
        let hud = Hud::from_game(&game);
        assert_eq!(hud.progress, "1/1");
        assert!(hud.banner.unwrap().starts_with("1/1 - Well done"));
    }

    #[test]
    fn test_stats_table_rows() {
        let mut game = Game::seeded(Settings::default(), 3);
        game.reset();
        game.reset();
        let table = stats_table(&game);
        assert_eq!(table.lines().count(), 6);
        assert!(table.lines().nth(1).unwrap().trim_end().ends_with('2'));
    }

    #[test]
    fn test_splash_falls_back_to_text() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(find_splash(&[dir.path()]), Splash::Text(SPLASH_TITLE));

        let assets = dir.path().join("assets");
        std::fs::create_dir(&assets).unwrap();
        std::fs::write(assets.join("logo.png"), b"png").unwrap();
        assert_eq!(
            find_splash(&[dir.path()]),
            Splash::Image(assets.join("logo.png"))
        );
    }
}
