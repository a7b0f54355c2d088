use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use mongodb::bson::{doc, Document};

use super::{ChannelRef, GameRecord, Player, ScoreEntry};
use crate::{agent::ChatMessage, solution::Solution, transcript::ScoreRecord};

#[derive(Debug, Clone)]
pub struct MongoDb {
    games: mongodb::Collection<GameDocument>,
    scores: mongodb::Collection<ScoreDocument>,
}

impl MongoDb {
    const GAMES_COLLECTION_NAME: &'static str = "connections_games";
    const SCORES_COLLECTION_NAME: &'static str = "connections_scores";

    pub fn from_database(db: &mongodb::Database) -> Self {
        Self {
            games: db.collection(Self::GAMES_COLLECTION_NAME),
            scores: db.collection(Self::SCORES_COLLECTION_NAME),
        }
    }

    /// Creates the unique indexes games and scores are keyed by. Safe to
    /// call on every startup.
    pub async fn ensure_indexes(&self) -> Result<(), mongodb::error::Error> {
        use mongodb::{options::IndexOptions, IndexModel};

        let unique = || IndexOptions::builder().unique(true).build();

        self.games
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "number": 1 })
                    .options(unique())
                    .build(),
                None,
            )
            .await?;

        self.scores
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "game": 1, "user_id": 1, "guild": 1, "channel": 1 })
                    .options(unique())
                    .build(),
                None,
            )
            .await
            .map(|_| ())
    }

    async fn find_scores(
        &self,
        filter: Document,
    ) -> Result<Vec<ScoreEntry>, mongodb::error::Error> {
        use mongodb::options::FindOptions;

        self.scores
            .find(filter, FindOptions::builder().sort(doc! { "date": 1 }).build())
            .await?
            .map_ok(ScoreEntry::from)
            .try_collect()
            .await
    }
}

impl<'a> From<&'a mongodb::Database> for MongoDb {
    fn from(value: &'a mongodb::Database) -> Self {
        Self::from_database(value)
    }
}

// discord snowflakes fit in 63 bits
fn id(value: u64) -> i64 {
    value as i64
}

fn bson_date(date: DateTime<Utc>) -> mongodb::bson::DateTime {
    mongodb::bson::DateTime::from_millis(date.timestamp_millis())
}

fn chrono_date(date: mongodb::bson::DateTime) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(date.timestamp_millis()).unwrap_or_default()
}

fn channel_filter(channel: ChannelRef) -> Document {
    doc! {
        "guild": channel.guild.map(id),
        "channel": id(channel.channel),
    }
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
struct GameDocument {
    number: u32,
    date: mongodb::bson::DateTime,

    #[serde(default)]
    solution: Option<Solution>,

    #[serde(default)]
    transcript: Option<Vec<ChatMessage>>,

    #[serde(default)]
    summary_posted: bool,
}

impl From<&GameRecord> for GameDocument {
    fn from(game: &GameRecord) -> Self {
        Self {
            number: game.number,
            date: bson_date(game.date),
            solution: game.solution.clone(),
            transcript: game.transcript.clone(),
            summary_posted: game.summary_posted,
        }
    }
}

impl From<GameDocument> for GameRecord {
    fn from(document: GameDocument) -> Self {
        Self {
            number: document.number,
            date: chrono_date(document.date),
            solution: document.solution,
            transcript: document.transcript,
            summary_posted: document.summary_posted,
        }
    }
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
struct ScoreDocument {
    game: u32,
    user_id: i64,
    username: String,
    #[serde(default)]
    bot: bool,
    guild: Option<i64>,
    channel: i64,
    message: String,
    plays: u32,
    score: u32,
    completed: [bool; 4],
    date: mongodb::bson::DateTime,
}

impl From<&ScoreEntry> for ScoreDocument {
    fn from(entry: &ScoreEntry) -> Self {
        Self {
            game: entry.game,
            user_id: id(entry.player.id),
            username: entry.player.name.clone(),
            bot: entry.bot,
            guild: entry.channel.guild.map(id),
            channel: id(entry.channel.channel),
            message: entry.message.clone(),
            plays: entry.record.plays,
            score: entry.record.score,
            completed: entry.record.completed,
            date: bson_date(entry.date),
        }
    }
}

impl From<ScoreDocument> for ScoreEntry {
    fn from(document: ScoreDocument) -> Self {
        Self {
            game: document.game,
            player: Player {
                id: document.user_id as u64,
                name: document.username,
            },
            bot: document.bot,
            channel: ChannelRef {
                guild: document.guild.map(|guild| guild as u64),
                channel: document.channel as u64,
            },
            message: document.message,
            record: ScoreRecord {
                plays: document.plays,
                score: document.score,
                completed: document.completed,
            },
            date: chrono_date(document.date),
        }
    }
}

/// Server error code for a write rejected by a unique index.
const DUPLICATE_KEY: i32 = 11000;

impl super::StoreError for mongodb::error::Error {
    fn is_duplicate(&self) -> bool {
        use mongodb::error::{ErrorKind, WriteFailure};

        match self.kind.as_ref() {
            ErrorKind::Write(WriteFailure::WriteError(err)) => err.code == DUPLICATE_KEY,
            ErrorKind::Command(err) => err.code == DUPLICATE_KEY,
            _ => false,
        }
    }
}

impl super::ConnectionsData for MongoDb {
    type Error = mongodb::error::Error;

    async fn game(&self, number: u32) -> Result<Option<GameRecord>, Self::Error> {
        Ok(self
            .games
            .find_one(doc! { "number": number }, None)
            .await?
            .map(GameRecord::from))
    }

    async fn create_game(&self, game: &GameRecord) -> Result<(), Self::Error> {
        self.games
            .insert_one(GameDocument::from(game), None)
            .await
            .map(|_| ())
    }

    async fn latest_game(&self) -> Result<Option<GameRecord>, Self::Error> {
        use mongodb::options::FindOneOptions;

        Ok(self
            .games
            .find_one(
                None,
                FindOneOptions::builder()
                    .sort(doc! { "number": -1 })
                    .build(),
            )
            .await?
            .map(GameRecord::from))
    }

    async fn add_solution(&self, number: u32, solution: &Solution) -> Result<(), Self::Error> {
        use mongodb::bson::ser::to_bson;

        let solution = to_bson(solution)?;

        self.games
            .update_one(
                doc! { "number": number },
                doc! { "$set": { "solution": solution } },
                None,
            )
            .await
            .map(|_| ())
    }

    async fn store_transcript(
        &self,
        number: u32,
        transcript: &[ChatMessage],
    ) -> Result<(), Self::Error> {
        use mongodb::bson::ser::to_bson;

        let transcript = to_bson(transcript)?;

        self.games
            .update_one(
                doc! { "number": number },
                doc! { "$set": { "transcript": transcript } },
                None,
            )
            .await
            .map(|_| ())
    }

    async fn mark_summary_posted(&self, number: u32) -> Result<(), Self::Error> {
        self.games
            .update_one(
                doc! { "number": number },
                doc! { "$set": { "summary_posted": true } },
                None,
            )
            .await
            .map(|_| ())
    }

    async fn score(
        &self,
        game: u32,
        player: u64,
        channel: ChannelRef,
    ) -> Result<Option<ScoreEntry>, Self::Error> {
        let mut filter = channel_filter(channel);
        filter.insert("game", game);
        filter.insert("user_id", id(player));

        Ok(self
            .scores
            .find_one(filter, None)
            .await?
            .map(ScoreEntry::from))
    }

    async fn create_score(&self, entry: &ScoreEntry) -> Result<(), Self::Error> {
        self.scores
            .insert_one(ScoreDocument::from(entry), None)
            .await
            .map(|_| ())
    }

    async fn update_score(&self, entry: &ScoreEntry) -> Result<(), Self::Error> {
        let document = ScoreDocument::from(entry);

        let mut filter = channel_filter(entry.channel);
        filter.insert("game", entry.game);
        filter.insert("user_id", document.user_id);

        self.scores
            .update_one(
                filter,
                doc! { "$set": {
                    "username": document.username,
                    "message": document.message,
                    "plays": document.plays,
                    "score": document.score,
                    "completed": document.completed.to_vec(),
                    "date": document.date,
                } },
                None,
            )
            .await
            .map(|_| ())
    }

    async fn scores_since(
        &self,
        channel: ChannelRef,
        since: DateTime<Utc>,
    ) -> Result<Vec<ScoreEntry>, Self::Error> {
        let mut filter = channel_filter(channel);
        filter.insert("date", doc! { "$gt": bson_date(since) });

        self.find_scores(filter).await
    }

    async fn scores_for_game(
        &self,
        game: u32,
        channel: ChannelRef,
    ) -> Result<Vec<ScoreEntry>, Self::Error> {
        let mut filter = channel_filter(channel);
        filter.insert("game", game);

        self.find_scores(filter).await
    }

    async fn all_scores(&self) -> Result<Vec<ScoreEntry>, Self::Error> {
        self.find_scores(Document::new()).await
    }
}
