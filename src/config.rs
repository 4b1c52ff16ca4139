/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD).
/// Falls back to sensible defaults if the file is missing, incomplete,
/// malformed or fails validation.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::domain::player::GameMode;

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub scoring: ScoringConfig,
    pub reveal: RevealConfig,
    pub logging: LoggingConfig,
    pub mode: GameMode,
    pub players_file: Option<PathBuf>,
    pub on_pool_exhausted: ExhaustionPolicy,
    pub seed: Option<u64>,
    pub frame_ms: u64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ScoringConfig {
    pub max_rounds: u32,
    pub time_per_round: u32,     // seconds
    pub base_score: u32,
    pub time_decay_rate: u32,    // points lost per second
    pub wrong_answer_penalty: u32,
    pub min_score: u32,
    pub bonus_rate_per_second: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RevealConfig {
    pub grid_size: usize,
    pub reveal_steps: usize,
    pub interval_ms: u64,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub enabled: bool,
    pub level: String,
    pub file: PathBuf,
}

/// What round initialization does when every player has been used.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExhaustionPolicy {
    /// Clear the exclusion set and pick from the full pool again.
    Reset,
    /// Surface the exhaustion as a fetch failure.
    Fail,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Read {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },
    #[error("failed to parse config: {source}")]
    Parse {
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    scoring: TomlScoring,
    #[serde(default)]
    reveal: TomlReveal,
    #[serde(default)]
    general: TomlGeneral,
    #[serde(default)]
    logging: TomlLogging,
}

#[derive(Deserialize, Debug)]
struct TomlScoring {
    #[serde(default = "default_max_rounds")]
    max_rounds: u32,
    #[serde(default = "default_time_per_round")]
    time_per_round: u32,
    #[serde(default = "default_base_score")]
    base_score: u32,
    #[serde(default = "default_time_decay")]
    time_decay_rate: u32,
    #[serde(default = "default_wrong_penalty")]
    wrong_answer_penalty: u32,
    #[serde(default = "default_min_score")]
    min_score: u32,
    #[serde(default = "default_bonus_rate")]
    bonus_rate_per_second: f64,
}

#[derive(Deserialize, Debug)]
struct TomlReveal {
    #[serde(default = "default_grid_size")]
    grid_size: usize,
    #[serde(default = "default_reveal_steps")]
    reveal_steps: usize,
    #[serde(default = "default_reveal_interval")]
    interval_ms: u64,
}

#[derive(Deserialize, Debug)]
struct TomlGeneral {
    #[serde(default)]
    players_file: Option<String>,
    #[serde(default = "default_mode")]
    mode: GameMode,
    #[serde(default = "default_exhaustion")]
    on_pool_exhausted: ExhaustionPolicy,
    #[serde(default)]
    seed: Option<u64>,
    #[serde(default = "default_frame_ms")]
    frame_ms: u64,
}

#[derive(Deserialize, Debug)]
struct TomlLogging {
    #[serde(default = "default_log_enabled")]
    enabled: bool,
    #[serde(default = "default_log_level")]
    level: String,
    #[serde(default = "default_log_file")]
    file: String,
}

// ── Defaults ──

fn default_max_rounds() -> u32 { 10 }
fn default_time_per_round() -> u32 { 30 }
fn default_base_score() -> u32 { 100 }
fn default_time_decay() -> u32 { 2 }
fn default_wrong_penalty() -> u32 { 15 }
fn default_min_score() -> u32 { 10 }
fn default_bonus_rate() -> f64 { 2.0 }

fn default_grid_size() -> usize { 5 }
fn default_reveal_steps() -> usize { 25 }
fn default_reveal_interval() -> u64 { 1200 }

fn default_mode() -> GameMode { GameMode::Headshot }
fn default_exhaustion() -> ExhaustionPolicy { ExhaustionPolicy::Reset }
fn default_frame_ms() -> u64 { 16 }

fn default_log_enabled() -> bool { true }
fn default_log_level() -> String { "info".into() }
fn default_log_file() -> String { "proguesser.log".into() }

impl Default for TomlScoring {
    fn default() -> Self {
        TomlScoring {
            max_rounds: default_max_rounds(),
            time_per_round: default_time_per_round(),
            base_score: default_base_score(),
            time_decay_rate: default_time_decay(),
            wrong_answer_penalty: default_wrong_penalty(),
            min_score: default_min_score(),
            bonus_rate_per_second: default_bonus_rate(),
        }
    }
}

impl Default for TomlReveal {
    fn default() -> Self {
        TomlReveal {
            grid_size: default_grid_size(),
            reveal_steps: default_reveal_steps(),
            interval_ms: default_reveal_interval(),
        }
    }
}

impl Default for TomlGeneral {
    fn default() -> Self {
        TomlGeneral {
            players_file: None,
            mode: default_mode(),
            on_pool_exhausted: default_exhaustion(),
            seed: None,
            frame_ms: default_frame_ms(),
        }
    }
}

impl Default for TomlLogging {
    fn default() -> Self {
        TomlLogging {
            enabled: default_log_enabled(),
            level: default_log_level(),
            file: default_log_file(),
        }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig::from_toml(TomlConfig::default(), &[])
    }
}

// ── Loading ──

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory,
    /// (3) XDG data home, (4) system data directory.
    /// Missing file or missing keys gracefully fall back to defaults.
    pub fn load() -> Self {
        let search_dirs = candidate_dirs();
        match find_config(&search_dirs) {
            Some(path) => match GameConfig::from_path(&path, &search_dirs) {
                Ok(cfg) => cfg,
                Err(e) => {
                    eprintln!("Warning: {e}");
                    eprintln!("Using default settings.");
                    GameConfig::default()
                }
            },
            None => GameConfig::default(),
        }
    }

    /// Read and validate a specific config file. Relative `players_file`
    /// paths are resolved against `search_dirs`.
    pub fn from_path(path: &Path, search_dirs: &[PathBuf]) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            source,
            path: path.to_path_buf(),
        })?;
        let toml_cfg = parse(&text)?;
        let cfg = GameConfig::from_toml(toml_cfg, search_dirs);
        cfg.validate()?;
        Ok(cfg)
    }

    /// Parse and validate config text. Relative paths are left as written.
    #[cfg(test)]
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let cfg = GameConfig::from_toml(parse(text)?, &[]);
        cfg.validate()?;
        Ok(cfg)
    }

    fn from_toml(toml_cfg: TomlConfig, search_dirs: &[PathBuf]) -> Self {
        let players_file = toml_cfg
            .general
            .players_file
            .as_deref()
            .map(|p| resolve_path(p, search_dirs));

        GameConfig {
            scoring: ScoringConfig {
                max_rounds: toml_cfg.scoring.max_rounds,
                time_per_round: toml_cfg.scoring.time_per_round,
                base_score: toml_cfg.scoring.base_score,
                time_decay_rate: toml_cfg.scoring.time_decay_rate,
                wrong_answer_penalty: toml_cfg.scoring.wrong_answer_penalty,
                min_score: toml_cfg.scoring.min_score,
                bonus_rate_per_second: toml_cfg.scoring.bonus_rate_per_second,
            },
            reveal: RevealConfig {
                grid_size: toml_cfg.reveal.grid_size,
                reveal_steps: toml_cfg.reveal.reveal_steps,
                interval_ms: toml_cfg.reveal.interval_ms,
            },
            logging: LoggingConfig {
                enabled: toml_cfg.logging.enabled,
                level: toml_cfg.logging.level,
                file: PathBuf::from(toml_cfg.logging.file),
            },
            mode: toml_cfg.general.mode,
            players_file,
            on_pool_exhausted: toml_cfg.general.on_pool_exhausted,
            seed: toml_cfg.general.seed,
            frame_ms: toml_cfg.general.frame_ms.max(1),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let s = &self.scoring;
        if s.max_rounds == 0 {
            return Err(ConfigError::Invalid("scoring.max_rounds must be at least 1".into()));
        }
        if s.time_per_round == 0 {
            return Err(ConfigError::Invalid("scoring.time_per_round must be at least 1".into()));
        }
        if s.min_score > s.base_score {
            return Err(ConfigError::Invalid(format!(
                "scoring.min_score ({}) exceeds scoring.base_score ({})",
                s.min_score, s.base_score
            )));
        }
        if !s.bonus_rate_per_second.is_finite() || s.bonus_rate_per_second < 0.0 {
            return Err(ConfigError::Invalid(
                "scoring.bonus_rate_per_second must be a non-negative number".into(),
            ));
        }
        if self.reveal.grid_size == 0 {
            return Err(ConfigError::Invalid("reveal.grid_size must be at least 1".into()));
        }
        if self.reveal.interval_ms == 0 {
            return Err(ConfigError::Invalid("reveal.interval_ms must be at least 1".into()));
        }
        Ok(())
    }
}

fn parse(text: &str) -> Result<TomlConfig, ConfigError> {
    toml::from_str::<TomlConfig>(text).map_err(|source| ConfigError::Parse { source })
}

fn resolve_path(raw: &str, search_dirs: &[PathBuf]) -> PathBuf {
    let path = PathBuf::from(raw);
    if path.is_absolute() {
        return path;
    }
    search_dirs
        .iter()
        .map(|d| d.join(raw))
        .find(|p| p.exists())
        .unwrap_or(path)
}

/// Candidate directories to search: exe dir + CWD + data paths (deduplicated).
pub fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    if let Ok(exe) = std::env::current_exe() {
        // Resolve symlinks so an installed link still finds data next to the real binary.
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
        let xdg = PathBuf::from(&home).join(".local/share/proguesser");
        if xdg.is_dir() && !dirs.iter().any(|d| d == &xdg) {
            dirs.push(xdg);
        }
    }

    let sys = PathBuf::from("/usr/share/proguesser");
    if sys.is_dir() && !dirs.iter().any(|d| d == &sys) {
        dirs.push(sys);
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

fn find_config(search_dirs: &[PathBuf]) -> Option<PathBuf> {
    search_dirs
        .iter()
        .map(|dir| dir.join("config.toml"))
        .find(|path| path.exists())
}
