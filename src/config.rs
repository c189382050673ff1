/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD).
/// Falls back to sensible defaults if the file is missing or incomplete.

use serde::Deserialize;
use std::path::PathBuf;

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub speed: SpeedConfig,
    pub rules: RulesConfig,
    pub highscore_file: PathBuf,
    /// Fixed RNG seed; `None` seeds from OS entropy.
    pub seed: Option<u64>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SpeedConfig {
    pub base_interval_ms: u64,
    pub level_decrement_ms: u64,
    pub min_interval_ms: u64,
    pub hold_boost: bool,        // halve the interval while a direction key is held
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RulesConfig {
    pub obstacle_batch: usize,
    pub points_per_level: u32,
    pub solid_border: bool,      // true: touching the border ring is a wall hit
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    speed: TomlSpeed,
    #[serde(default)]
    rules: TomlRules,
    #[serde(default)]
    general: TomlGeneral,
}

#[derive(Deserialize, Debug)]
struct TomlSpeed {
    #[serde(default = "default_base_interval")]
    base_interval_ms: u64,
    #[serde(default = "default_level_decrement")]
    level_decrement_ms: u64,
    #[serde(default = "default_min_interval")]
    min_interval_ms: u64,
    #[serde(default = "default_hold_boost")]
    hold_boost: bool,
}

#[derive(Deserialize, Debug)]
struct TomlRules {
    #[serde(default = "default_obstacle_batch")]
    obstacle_batch: usize,
    #[serde(default = "default_points_per_level")]
    points_per_level: u32,
    #[serde(default)]
    solid_border: bool,
}

#[derive(Deserialize, Debug)]
struct TomlGeneral {
    #[serde(default = "default_highscore_file")]
    highscore_file: String,
    #[serde(default)]
    seed: Option<u64>,
}

// ── Defaults ──

fn default_base_interval() -> u64 { 120 }
fn default_level_decrement() -> u64 { 10 }
fn default_min_interval() -> u64 { 30 }
fn default_hold_boost() -> bool { true }

fn default_obstacle_batch() -> usize { 5 }
fn default_points_per_level() -> u32 { 2 }

fn default_highscore_file() -> String { "highscore.txt".into() }

impl Default for TomlSpeed {
    fn default() -> Self {
        TomlSpeed {
            base_interval_ms: default_base_interval(),
            level_decrement_ms: default_level_decrement(),
            min_interval_ms: default_min_interval(),
            hold_boost: default_hold_boost(),
        }
    }
}

impl Default for TomlRules {
    fn default() -> Self {
        TomlRules {
            obstacle_batch: default_obstacle_batch(),
            points_per_level: default_points_per_level(),
            solid_border: false,
        }
    }
}

impl Default for TomlGeneral {
    fn default() -> Self {
        TomlGeneral {
            highscore_file: default_highscore_file(),
            seed: None,
        }
    }
}

impl Default for SpeedConfig {
    fn default() -> Self {
        GameConfig::from_toml(TomlConfig::default()).speed
    }
}

impl Default for RulesConfig {
    fn default() -> Self {
        GameConfig::from_toml(TomlConfig::default()).rules
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig::from_toml(TomlConfig::default())
    }
}

// ── Loading ──

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory.
    /// Missing file or missing keys gracefully fall back to defaults.
    pub fn load() -> Self {
        let toml_cfg = load_toml(&candidate_dirs());
        Self::from_toml(toml_cfg)
    }

    /// Parse config text directly. Invalid TOML yields the defaults.
    #[cfg(test)]
    pub fn parse(text: &str) -> Self {
        match toml::from_str::<TomlConfig>(text) {
            Ok(cfg) => Self::from_toml(cfg),
            Err(e) => {
                tracing::warn!("config parse error: {e}; using default settings");
                Self::default()
            }
        }
    }

    fn from_toml(cfg: TomlConfig) -> Self {
        // A zero step would make every score a new level.
        let points_per_level = cfg.rules.points_per_level.max(1);

        GameConfig {
            speed: SpeedConfig {
                base_interval_ms: cfg.speed.base_interval_ms,
                level_decrement_ms: cfg.speed.level_decrement_ms,
                min_interval_ms: cfg.speed.min_interval_ms.max(1),
                hold_boost: cfg.speed.hold_boost,
            },
            rules: RulesConfig {
                obstacle_batch: cfg.rules.obstacle_batch,
                points_per_level,
                solid_border: cfg.rules.solid_border,
            },
            highscore_file: PathBuf::from(cfg.general.highscore_file),
            seed: cfg.general.seed,
        }
    }
}

/// Candidate directories to search: exe dir + CWD (deduplicated).
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

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

/// Search for config.toml in candidate directories.
fn load_toml(search_dirs: &[PathBuf]) -> TomlConfig {
    for dir in search_dirs {
        let path = dir.join("config.toml");
        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(text) => match toml::from_str::<TomlConfig>(&text) {
                    Ok(cfg) => {
                        tracing::info!("loaded config from {}", path.display());
                        return cfg;
                    }
                    Err(e) => {
                        tracing::warn!("config.toml parse error: {e}; using default settings");
                        return TomlConfig::default();
                    }
                },
                Err(e) => {
                    tracing::warn!("could not read {}: {e}", path.display());
                }
            }
        }
    }
    TomlConfig::default()
}
