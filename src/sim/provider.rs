/// Player source: the one external collaborator of the round engine.
///
/// Given the ids already used this match and the mode tag, a provider hands
/// back an unused player, or says why it cannot. What to do on exhaustion is
/// the caller's policy (see `step::begin_round`).
///
/// `RosterProvider` serves a JSON roster, either the embedded default or a
/// file named by `general.players_file`. A file roster is read on the first
/// pick, and again on every pick until it loads, so a missing or malformed
/// file surfaces as a fetch failure the player can retry after fixing it:
///   ```json
///   [ { "id": 1, "name": "ZywOo", "headshot": "zywoo.png",
///       "quote": "...", "images": ["a.jpg", "b.jpg"] } ]
///   ```

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use thiserror::Error;
use tracing::{debug, info};

use crate::domain::player::{GameMode, Player, PlayerId};

const EMBEDDED_ROSTER: &str = include_str!("../../data/players.json");

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("failed to read roster {path:?}: {source}")]
    Read {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },
    #[error("failed to parse roster: {source}")]
    Parse {
        #[source]
        source: serde_json::Error,
    },
    #[error("roster lists player id {0} more than once")]
    DuplicateId(PlayerId),
    #[error("roster is empty")]
    EmptyRoster,
    #[error("all {pool} players have been used")]
    PoolExhausted { pool: usize },
}

pub trait PlayerProvider {
    fn next_player(
        &mut self,
        used: &BTreeSet<PlayerId>,
        mode: GameMode,
    ) -> Result<Player, ProviderError>;
}

pub struct RosterProvider {
    players: Vec<Player>,
    /// Roster file still to be read; `None` once loaded (or when embedded).
    pending: Option<PathBuf>,
    /// Directory relative image references are resolved against.
    base_dir: Option<PathBuf>,
    rng: StdRng,
}

fn seeded(seed: Option<u64>) -> StdRng {
    match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    }
}

fn check_ids(players: &[Player]) -> Result<(), ProviderError> {
    let mut seen = BTreeSet::new();
    for p in players {
        if !seen.insert(p.id) {
            return Err(ProviderError::DuplicateId(p.id));
        }
    }
    Ok(())
}

fn parse_roster(text: &str) -> Result<Vec<Player>, ProviderError> {
    let players: Vec<Player> =
        serde_json::from_str(text).map_err(|source| ProviderError::Parse { source })?;
    check_ids(&players)?;
    Ok(players)
}

impl RosterProvider {
    pub fn new(players: Vec<Player>, seed: Option<u64>) -> Result<Self, ProviderError> {
        check_ids(&players)?;
        Ok(RosterProvider {
            players,
            pending: None,
            base_dir: None,
            rng: seeded(seed),
        })
    }

    pub fn from_json(text: &str, seed: Option<u64>) -> Result<Self, ProviderError> {
        RosterProvider::new(parse_roster(text)?, seed)
    }

    /// Roster backed by a file that is read on first use.
    pub fn from_path(path: &Path, seed: Option<u64>) -> Self {
        RosterProvider {
            players: Vec::new(),
            pending: Some(path.to_path_buf()),
            base_dir: path.parent().map(Path::to_path_buf),
            rng: seeded(seed),
        }
    }

    pub fn embedded(seed: Option<u64>) -> Result<Self, ProviderError> {
        RosterProvider::from_json(EMBEDDED_ROSTER, seed)
    }

    /// Number of players loaded so far (0 for a file not read yet).
    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn base_dir(&self) -> Option<&Path> {
        self.base_dir.as_deref()
    }

    fn ensure_loaded(&mut self) -> Result<(), ProviderError> {
        let Some(path) = &self.pending else {
            return Ok(());
        };
        let text = std::fs::read_to_string(path).map_err(|source| ProviderError::Read {
            source,
            path: path.clone(),
        })?;
        self.players = parse_roster(&text)?;
        info!(path = %path.display(), players = self.players.len(), "roster loaded");
        self.pending = None;
        Ok(())
    }
}

impl PlayerProvider for RosterProvider {
    fn next_player(
        &mut self,
        used: &BTreeSet<PlayerId>,
        mode: GameMode,
    ) -> Result<Player, ProviderError> {
        self.ensure_loaded()?;
        if self.players.is_empty() {
            return Err(ProviderError::EmptyRoster);
        }
        let candidates: Vec<&Player> =
            self.players.iter().filter(|p| !used.contains(&p.id)).collect();
        let pick = candidates
            .choose(&mut self.rng)
            .ok_or(ProviderError::PoolExhausted { pool: self.players.len() })?;
        debug!(id = pick.id, mode = mode.tag(), remaining = candidates.len(), "roster pick");
        Ok((*pick).clone())
    }
}
