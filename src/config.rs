/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD).
/// Falls back to sensible defaults if the file is missing or incomplete.
///
/// The logger is not running yet while the config loads (its target comes
/// from the config), so problems are collected in `GameConfig::issues` and
/// logged by the caller once logging is up.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::domain::layout::{self, LayoutCounts};

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub grid: GridConfig,
    pub layout: LayoutConfig,
    pub player: PlayerConfig,
    pub scoring: ScoringConfig,
    pub logging: LoggingConfig,
    pub tick_rate_ms: u64,
    /// Share link to start with instead of a random layout.
    pub start_link: Option<String>,
    /// Where the config was read from, if anywhere.
    pub source: Option<PathBuf>,
    /// Problems found while loading; defaults were used instead.
    pub issues: Vec<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GridConfig {
    pub width: usize,
    pub height: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LayoutConfig {
    pub counts: LayoutCounts,
    pub seed: Option<u64>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlayerConfig {
    pub arrows: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScoringConfig {
    pub gold_reward: u32,
    pub wumpus_reward: u32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoggingConfig {
    pub level: log::LevelFilter,
    /// None = logging disabled (the terminal is busy with the game).
    pub file: Option<PathBuf>,
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    grid: TomlGrid,
    #[serde(default)]
    layout: TomlLayout,
    #[serde(default)]
    player: TomlPlayer,
    #[serde(default)]
    scoring: TomlScoring,
    #[serde(default)]
    general: TomlGeneral,
    #[serde(default)]
    logging: TomlLogging,
}

#[derive(Deserialize, Debug)]
struct TomlGrid {
    #[serde(default = "default_width")]
    width: usize,
    #[serde(default = "default_height")]
    height: usize,
}

#[derive(Deserialize, Debug)]
struct TomlLayout {
    #[serde(default = "default_holes")]
    holes: usize,
    #[serde(default = "default_wumpus")]
    wumpus: usize,
    #[serde(default = "default_golds")]
    golds: usize,
    #[serde(default)]
    seed: Option<u64>,
}

#[derive(Deserialize, Debug)]
struct TomlPlayer {
    #[serde(default = "default_arrows")]
    arrows: u32,
}

#[derive(Deserialize, Debug)]
struct TomlScoring {
    #[serde(default = "default_reward")]
    gold_reward: u32,
    #[serde(default = "default_reward")]
    wumpus_reward: u32,
}

#[derive(Deserialize, Debug)]
struct TomlGeneral {
    #[serde(default = "default_tick_rate")]
    tick_rate_ms: u64,
    #[serde(default)]
    layout: Option<String>,
}

#[derive(Deserialize, Debug)]
struct TomlLogging {
    #[serde(default = "default_log_level")]
    level: String,
    #[serde(default = "default_log_file")]
    file: String,
}

// ── Defaults ──

const MIN_SIDE: usize = 2;
const MAX_SIDE: usize = 64;

fn default_width() -> usize { 15 }
fn default_height() -> usize { 8 }
fn default_holes() -> usize { 10 }
fn default_wumpus() -> usize { 4 }
fn default_golds() -> usize { 3 }
fn default_arrows() -> u32 { 3 }
fn default_reward() -> u32 { 1000 }
fn default_tick_rate() -> u64 { 75 }
fn default_log_level() -> String { "info".into() }
fn default_log_file() -> String { "wumpus-world.log".into() }

impl Default for TomlGrid {
    fn default() -> Self {
        TomlGrid { width: default_width(), height: default_height() }
    }
}

impl Default for TomlLayout {
    fn default() -> Self {
        TomlLayout {
            holes: default_holes(),
            wumpus: default_wumpus(),
            golds: default_golds(),
            seed: None,
        }
    }
}

impl Default for TomlPlayer {
    fn default() -> Self {
        TomlPlayer { arrows: default_arrows() }
    }
}

impl Default for TomlScoring {
    fn default() -> Self {
        TomlScoring { gold_reward: default_reward(), wumpus_reward: default_reward() }
    }
}

impl Default for TomlGeneral {
    fn default() -> Self {
        TomlGeneral { tick_rate_ms: default_tick_rate(), layout: None }
    }
}

impl Default for TomlLogging {
    fn default() -> Self {
        TomlLogging { level: default_log_level(), file: default_log_file() }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig::from_toml(TomlConfig::default(), None, vec![])
    }
}

// ── Loading ──

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory,
    /// (3) ~/.local/share/wumpus-world.
    /// Missing file or missing keys gracefully fall back to defaults.
    pub fn load() -> Self {
        let search_dirs = candidate_dirs();
        for dir in &search_dirs {
            let path = dir.join("config.toml");
            if path.exists() {
                return GameConfig::load_file(&path);
            }
        }
        GameConfig::default()
    }

    fn load_file(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(text) => {
                let mut cfg = GameConfig::from_toml_str(&text);
                cfg.source = Some(path.to_path_buf());
                cfg
            }
            Err(e) => {
                let issue = format!("could not read {}: {e}", path.display());
                GameConfig::from_toml(TomlConfig::default(), None, vec![issue])
            }
        }
    }

    /// Parse config text. A parse error yields all defaults plus an issue.
    pub fn from_toml_str(text: &str) -> Self {
        match toml::from_str::<TomlConfig>(text) {
            Ok(cfg) => GameConfig::from_toml(cfg, None, vec![]),
            Err(e) => {
                let issue = format!("config.toml parse error, using defaults: {e}");
                GameConfig::from_toml(TomlConfig::default(), None, vec![issue])
            }
        }
    }

    fn from_toml(t: TomlConfig, source: Option<PathBuf>, mut issues: Vec<String>) -> Self {
        let mut grid = GridConfig { width: t.grid.width, height: t.grid.height };
        let side_ok = |s: usize| (MIN_SIDE..=MAX_SIDE).contains(&s);
        if !side_ok(grid.width) || !side_ok(grid.height) {
            issues.push(format!(
                "grid {}x{} is out of range ({MIN_SIDE}..={MAX_SIDE} per side), using {}x{}",
                grid.width, grid.height, default_width(), default_height(),
            ));
            grid = GridConfig { width: default_width(), height: default_height() };
        }

        let mut counts = LayoutCounts {
            holes: t.layout.holes,
            wumpus: t.layout.wumpus,
            golds: t.layout.golds,
        };
        if counts.golds == 0 {
            issues.push("layout.golds must be at least 1, using 1".into());
            counts.golds = 1;
        }
        let available = layout::free_cells(grid.width, grid.height);
        if counts.total() > available {
            issues.push(format!(
                "{} entities do not fit the {}x{} grid ({available} free cells), using 1 hole, 1 wumpus, 1 gold",
                counts.total(), grid.width, grid.height,
            ));
            counts = LayoutCounts { holes: 1, wumpus: 1, golds: 1 };
            if counts.total() > available {
                grid = GridConfig { width: default_width(), height: default_height() };
            }
        }

        let level = match t.logging.level.parse::<log::LevelFilter>() {
            Ok(l) => l,
            Err(_) => {
                issues.push(format!("unknown logging.level {:?}, using info", t.logging.level));
                log::LevelFilter::Info
            }
        };
        let file = if t.logging.file.trim().is_empty() {
            None
        } else {
            Some(PathBuf::from(t.logging.file.trim()))
        };

        let start_link = t.general.layout
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        GameConfig {
            grid,
            layout: LayoutConfig { counts, seed: t.layout.seed },
            player: PlayerConfig { arrows: t.player.arrows },
            scoring: ScoringConfig {
                gold_reward: t.scoring.gold_reward,
                wumpus_reward: t.scoring.wumpus_reward,
            },
            logging: LoggingConfig { level, file },
            tick_rate_ms: t.general.tick_rate_ms.max(1),
            start_link,
            source,
            issues,
        }
    }
}

/// Candidate directories to search: exe dir + CWD + XDG data dir (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    if let Ok(home) = std::env::var("HOME") {
        let xdg = PathBuf::from(&home).join(".local/share/wumpus-world");
        if xdg.is_dir() && !dirs.iter().any(|d| d == &xdg) {
            dirs.push(xdg);
        }
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}
