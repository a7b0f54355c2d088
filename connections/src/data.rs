use std::future::Future;

use chrono::{DateTime, Utc};

use crate::{agent::ChatMessage, solution::Solution, transcript::ScoreRecord};

mod memory;
mod mongodb;

pub use self::mongodb::MongoDb;
pub use memory::{Memory, MemoryError};

/// Where a score was posted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChannelRef {
    pub guild: Option<u64>,
    pub channel: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Player {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameRecord {
    pub number: u32,
    pub date: DateTime<Utc>,
    pub solution: Option<Solution>,
    pub transcript: Option<Vec<ChatMessage>>,
    pub summary_posted: bool,
}

impl GameRecord {
    pub fn new(number: u32, date: DateTime<Utc>) -> Self {
        Self {
            number,
            date,
            solution: None,
            transcript: None,
            summary_posted: false,
        }
    }
}

/// One player's posted result for one game in one channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreEntry {
    pub game: u32,
    pub player: Player,

    /// Whether the score came from this bot playing the game itself.
    pub bot: bool,
    pub channel: ChannelRef,
    pub message: String,
    pub record: ScoreRecord,
    pub date: DateTime<Utc>,
}

/// A failure reported by a [`ConnectionsData`] store.
pub trait StoreError: std::error::Error + Send {
    /// Whether a create was rejected because the game or score already
    /// exists.
    fn is_duplicate(&self) -> bool;
}

/// Persistence for games and scores.
///
/// A game is unique by number; a score is unique by game, player and
/// channel.
pub trait ConnectionsData {
    type Error: StoreError;

    fn game(
        &self,
        number: u32,
    ) -> impl Future<Output = Result<Option<GameRecord>, Self::Error>> + Send;

    fn create_game(&self, game: &GameRecord) -> impl Future<Output = Result<(), Self::Error>> + Send;

    fn latest_game(&self) -> impl Future<Output = Result<Option<GameRecord>, Self::Error>> + Send;

    fn add_solution(
        &self,
        number: u32,
        solution: &Solution,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;

    fn store_transcript(
        &self,
        number: u32,
        transcript: &[ChatMessage],
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;

    fn mark_summary_posted(&self, number: u32)
        -> impl Future<Output = Result<(), Self::Error>> + Send;

    fn score(
        &self,
        game: u32,
        player: u64,
        channel: ChannelRef,
    ) -> impl Future<Output = Result<Option<ScoreEntry>, Self::Error>> + Send;

    fn create_score(&self, entry: &ScoreEntry)
        -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Replaces the message, record and date of an existing score.
    fn update_score(&self, entry: &ScoreEntry)
        -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Scores posted in `channel` after `since`, oldest first.
    fn scores_since(
        &self,
        channel: ChannelRef,
        since: DateTime<Utc>,
    ) -> impl Future<Output = Result<Vec<ScoreEntry>, Self::Error>> + Send;

    /// Scores for `game` posted in `channel`, oldest first.
    fn scores_for_game(
        &self,
        game: u32,
        channel: ChannelRef,
    ) -> impl Future<Output = Result<Vec<ScoreEntry>, Self::Error>> + Send;

    fn all_scores(&self) -> impl Future<Output = Result<Vec<ScoreEntry>, Self::Error>> + Send;
}
