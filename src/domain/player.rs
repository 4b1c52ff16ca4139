/// Player reference data and game modes.
///
/// Players are immutable records owned by the player source; the game only
/// reads them. A mode decides which image reference a round shows.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::Deserialize;

pub type PlayerId = u32;

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub headshot: String,
    #[serde(default)]
    pub quote: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GameMode {
    /// Profile headshot.
    Headshot,
    /// A random picture of the player.
    FreeForAll,
}

impl GameMode {
    pub const ALL: [GameMode; 2] = [GameMode::Headshot, GameMode::FreeForAll];

    pub fn tag(self) -> &'static str {
        match self {
            GameMode::Headshot => "headshot",
            GameMode::FreeForAll => "free-for-all",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            GameMode::Headshot => "HEADSHOT",
            GameMode::FreeForAll => "FREE FOR ALL",
        }
    }

    pub fn next(self) -> GameMode {
        match self {
            GameMode::Headshot => GameMode::FreeForAll,
            GameMode::FreeForAll => GameMode::Headshot,
        }
    }
}

impl Player {
    /// Image reference to reveal for this player under `mode`.
    /// Free-for-all falls back to the headshot when no extra images exist.
    pub fn image_for<R: Rng + ?Sized>(&self, mode: GameMode, rng: &mut R) -> String {
        match mode {
            GameMode::Headshot => self.headshot.clone(),
            GameMode::FreeForAll => self
                .images
                .choose(rng)
                .cloned()
                .unwrap_or_else(|| self.headshot.clone()),
        }
    }
}
