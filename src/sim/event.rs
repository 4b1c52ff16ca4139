/// Events emitted by the state-transition functions.
/// The presentation layer consumes these for sound and messages.

use crate::domain::player::PlayerId;
use super::asset::AssetStatus;

#[derive(Clone, Debug, PartialEq)]
pub enum GameEvent {
    RoundStarted { round: u32, player: PlayerId },
    PoolReset { pool: usize },
    FetchFailed { message: String },
    ImageResolved { status: AssetStatus },
    CellRevealed { cell: usize, revealed: usize, target: usize },
    Tick { remaining: u32, score: u32 },
    WrongGuess { attempts: u32, score: u32 },
    CorrectGuess { score: u32, seconds_used: u32 },
    TimeUp,
    MatchComplete { total: u32 },
    Restarted,
}
