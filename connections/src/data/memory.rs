use std::{collections::BTreeMap, sync::Arc};

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use super::{ChannelRef, GameRecord, ScoreEntry};
use crate::{agent::ChatMessage, solution::Solution};

/// In-process storage with the same uniqueness rules as [`super::MongoDb`].
/// Used for tests and for running without a database.
#[derive(Debug, Clone, Default)]
pub struct Memory {
    games: Arc<RwLock<BTreeMap<u32, GameRecord>>>,
    scores: Arc<RwLock<Vec<ScoreEntry>>>,
}

impl Memory {
    pub fn new() -> Self {
        Self::default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MemoryError {
    #[error("game {0} already exists")]
    DuplicateGame(u32),

    #[error("user {1} already has a score for game {0} in this channel")]
    DuplicateScore(u32, u64),
}

impl super::StoreError for MemoryError {
    fn is_duplicate(&self) -> bool {
        matches!(self, Self::DuplicateGame(_) | Self::DuplicateScore(..))
    }
}

fn same_score(entry: &ScoreEntry, game: u32, player: u64, channel: ChannelRef) -> bool {
    entry.game == game && entry.player.id == player && entry.channel == channel
}

fn by_date(mut scores: Vec<ScoreEntry>) -> Vec<ScoreEntry> {
    scores.sort_by_key(|entry| entry.date);
    scores
}

impl super::ConnectionsData for Memory {
    type Error = MemoryError;

    async fn game(&self, number: u32) -> Result<Option<GameRecord>, Self::Error> {
        Ok(self.games.read().await.get(&number).cloned())
    }

    async fn create_game(&self, game: &GameRecord) -> Result<(), Self::Error> {
        let mut games = self.games.write().await;

        if games.contains_key(&game.number) {
            return Err(MemoryError::DuplicateGame(game.number));
        }

        games.insert(game.number, game.clone());
        Ok(())
    }

    async fn latest_game(&self) -> Result<Option<GameRecord>, Self::Error> {
        Ok(self.games.read().await.values().next_back().cloned())
    }

    async fn add_solution(&self, number: u32, solution: &Solution) -> Result<(), Self::Error> {
        if let Some(game) = self.games.write().await.get_mut(&number) {
            game.solution = Some(solution.clone());
        }

        Ok(())
    }

    async fn store_transcript(
        &self,
        number: u32,
        transcript: &[ChatMessage],
    ) -> Result<(), Self::Error> {
        if let Some(game) = self.games.write().await.get_mut(&number) {
            game.transcript = Some(transcript.to_vec());
        }

        Ok(())
    }

    async fn mark_summary_posted(&self, number: u32) -> Result<(), Self::Error> {
        if let Some(game) = self.games.write().await.get_mut(&number) {
            game.summary_posted = true;
        }

        Ok(())
    }

    async fn score(
        &self,
        game: u32,
        player: u64,
        channel: ChannelRef,
    ) -> Result<Option<ScoreEntry>, Self::Error> {
        Ok(self
            .scores
            .read()
            .await
            .iter()
            .find(|entry| same_score(entry, game, player, channel))
            .cloned())
    }

    async fn create_score(&self, entry: &ScoreEntry) -> Result<(), Self::Error> {
        let mut scores = self.scores.write().await;

        if scores
            .iter()
            .any(|other| same_score(other, entry.game, entry.player.id, entry.channel))
        {
            return Err(MemoryError::DuplicateScore(entry.game, entry.player.id));
        }

        scores.push(entry.clone());
        Ok(())
    }

    async fn update_score(&self, entry: &ScoreEntry) -> Result<(), Self::Error> {
        if let Some(existing) = self
            .scores
            .write()
            .await
            .iter_mut()
            .find(|other| same_score(other, entry.game, entry.player.id, entry.channel))
        {
            existing.player.name.clone_from(&entry.player.name);
            existing.message.clone_from(&entry.message);
            existing.record = entry.record;
            existing.date = entry.date;
        }

        Ok(())
    }

    async fn scores_since(
        &self,
        channel: ChannelRef,
        since: DateTime<Utc>,
    ) -> Result<Vec<ScoreEntry>, Self::Error> {
        let scores = self.scores.read().await;

        Ok(by_date(
            scores
                .iter()
                .filter(|entry| entry.channel == channel && entry.date > since)
                .cloned()
                .collect(),
        ))
    }

    async fn scores_for_game(
        &self,
        game: u32,
        channel: ChannelRef,
    ) -> Result<Vec<ScoreEntry>, Self::Error> {
        let scores = self.scores.read().await;

        Ok(by_date(
            scores
                .iter()
                .filter(|entry| entry.channel == channel && entry.game == game)
                .cloned()
                .collect(),
        ))
    }

    async fn all_scores(&self) -> Result<Vec<ScoreEntry>, Self::Error> {
        Ok(by_date(self.scores.read().await.clone()))
    }
}
