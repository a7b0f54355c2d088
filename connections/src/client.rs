use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use tracing::{debug, info, instrument, warn};

use super::{
    agent::{self, ChatMessage, GuessingAgent},
    board::Board,
    data::{self, ChannelRef, ConnectionsData, GameRecord, Player, ScoreEntry, StoreError},
    error::GameRef,
    play::{self, PlayState, Playthrough},
    solution::{self, SolutionSource},
    transcript::{ScoreRecord, Transcript},
    Error,
};

type Result<T, E = Error> = std::result::Result<T, E>;

/// How long after their last posted score a player still counts as active.
pub const ACTIVE_DAYS: i64 = 7;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayOptions {
    /// Start each play from the previous game's stored conversation.
    pub carry_history: bool,
    pub system_prompt: String,
}

impl Default for PlayOptions {
    fn default() -> Self {
        Self {
            carry_history: true,
            system_prompt: agent::SYSTEM_PROMPT.to_owned(),
        }
    }
}

/// A transcript someone posted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScorePost {
    pub player: Player,
    pub bot: bool,
    pub channel: ChannelRef,
    pub transcript: Transcript,
    pub posted: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedScore {
    pub game: u32,
    pub record: ScoreRecord,

    /// `false` if the player had already posted this game here.
    pub new: bool,

    /// Whether the game is the most recent one recorded.
    pub latest: bool,
}

/// Players active in a channel who have not posted the latest game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Remaining {
    pub game: u32,
    pub active: usize,
    pub players: Vec<Player>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub game: u32,
    pub entries: Vec<ScoreEntry>,
}

#[derive(Debug)]
pub struct Connections<Data = data::MongoDb, Agent = agent::Ollama, Source = solution::Nyt> {
    data: Arc<Data>,
    agent: Arc<Agent>,
    source: Arc<Source>,
    options: PlayOptions,
}

impl Connections {
    pub fn from_database(db: &mongodb::Database, agent: agent::Ollama, source: solution::Nyt) -> Self {
        Self::new(data::MongoDb::from_database(db), agent, source)
    }
}

impl<D, A, S> Clone for Connections<D, A, S> {
    fn clone(&self) -> Self {
        Self {
            data: self.data.clone(),
            agent: self.agent.clone(),
            source: self.source.clone(),
            options: self.options.clone(),
        }
    }
}

impl<Data, Agent, Source> Connections<Data, Agent, Source> {
    pub fn new(data: Data, agent: Agent, source: Source) -> Self {
        Self {
            data: Arc::new(data),
            agent: Arc::new(agent),
            source: Arc::new(source),
            options: PlayOptions::default(),
        }
    }

    pub fn with_options(mut self, options: PlayOptions) -> Self {
        self.options = options;
        self
    }

    pub fn data(&self) -> &Data {
        &self.data
    }

    pub fn options(&self) -> &PlayOptions {
        &self.options
    }
}

impl<Data, Agent, Source> Connections<Data, Agent, Source>
where
    Data: ConnectionsData + Sync,
    Agent: GuessingAgent + Sync,
    Source: SolutionSource + Sync,
{
    pub async fn game(&self, number: u32) -> Result<GameRecord> {
        self.data
            .game(number)
            .await
            .map_err(Error::data)?
            .ok_or(Error::unknown_game(GameRef::Number(number)))
    }

    pub async fn latest_game(&self) -> Result<GameRecord> {
        self.data
            .latest_game()
            .await
            .map_err(Error::data)?
            .ok_or(Error::unknown_game(GameRef::Latest))
    }

    /// Stores a posted transcript, creating the game if this is the first
    /// anyone has heard of it. A player's first post for a game in a channel
    /// is the one that counts.
    #[instrument(skip_all, fields(game = post.transcript.number, user.id = post.player.id))]
    pub async fn record_score(&self, post: &ScorePost) -> Result<RecordedScore> {
        let number = post.transcript.number;

        if self.data.game(number).await.map_err(Error::data)?.is_none() {
            match self.data.create_game(&GameRecord::new(number, post.posted)).await {
                Ok(()) => info!("new game"),
                Err(err) if err.is_duplicate() => debug!("game created by another post"),
                Err(err) => return Err(Error::data(err)),
            }
        }

        let existing = self
            .data
            .score(number, post.player.id, post.channel)
            .await
            .map_err(Error::data)?;

        let (record, new) = match existing {
            Some(entry) => {
                debug!("score already recorded");
                (entry.record, false)
            }
            None => {
                let record = post.transcript.record();
                let entry = ScoreEntry {
                    game: number,
                    player: post.player.clone(),
                    bot: post.bot,
                    channel: post.channel,
                    message: post.transcript.text.clone(),
                    record,
                    date: post.posted,
                };

                match self.data.create_score(&entry).await {
                    Ok(()) => {
                        info!(score = record.score, plays = record.plays, "recorded score");
                        (record, true)
                    }
                    Err(err) if err.is_duplicate() => {
                        debug!("score recorded by another post");

                        let existing = self
                            .data
                            .score(number, post.player.id, post.channel)
                            .await
                            .map_err(Error::data)?
                            .ok_or_else(|| Error::data(err))?;

                        (existing.record, false)
                    }
                    Err(err) => return Err(Error::data(err)),
                }
            }
        };

        let latest = self.latest_game().await?.number == number;

        Ok(RecordedScore {
            game: number,
            record,
            new,
            latest,
        })
    }

    pub async fn has_score(&self, game: u32, player: u64, channel: ChannelRef) -> Result<bool> {
        Ok(self
            .data
            .score(game, player, channel)
            .await
            .map_err(Error::data)?
            .is_some())
    }

    /// Humans who posted in `channel` in the [`ACTIVE_DAYS`] before `now` but
    /// have not posted the latest game there.
    #[instrument(skip(self))]
    pub async fn remaining_players(&self, channel: ChannelRef, now: DateTime<Utc>) -> Result<Remaining> {
        let game = self.latest_game().await?.number;

        let recent = self
            .data
            .scores_since(channel, now - Duration::days(ACTIVE_DAYS))
            .await
            .map_err(Error::data)?;

        let mut active: Vec<Player> = Vec::new();
        for entry in recent.into_iter().filter(|entry| !entry.bot) {
            match active.iter_mut().find(|player| player.id == entry.player.id) {
                Some(player) => player.name = entry.player.name,
                None => active.push(entry.player),
            }
        }

        let posted = self
            .data
            .scores_for_game(game, channel)
            .await
            .map_err(Error::data)?;

        let active_count = active.len();
        let players: Vec<Player> = active
            .into_iter()
            .filter(|player| !posted.iter().any(|entry| entry.player.id == player.id))
            .collect();

        debug!(active = active_count, remaining = players.len());

        Ok(Remaining {
            game,
            active: active_count,
            players,
        })
    }

    /// Human scores for the latest game in `channel`, in the order posted.
    pub async fn summary(&self, channel: ChannelRef) -> Result<Summary> {
        let game = self.latest_game().await?.number;

        let entries = self
            .data
            .scores_for_game(game, channel)
            .await
            .map_err(Error::data)?
            .into_iter()
            .filter(|entry| !entry.bot)
            .collect();

        Ok(Summary { game, entries })
    }

    pub async fn mark_summary_posted(&self, number: u32) -> Result<()> {
        self.data
            .mark_summary_posted(number)
            .await
            .map_err(Error::data)
    }

    /// Fetches and stores the solution for the latest game if it has none.
    /// Returns the game number when a new solution was stored.
    ///
    /// A payload naming a different puzzle is logged and not stored.
    #[instrument(skip(self))]
    pub async fn refresh_solution(&self, today: NaiveDate) -> Result<Option<u32>> {
        let latest = self.latest_game().await?;

        if latest.solution.is_some() {
            return Ok(None);
        }

        let solution = self.source.solution(today).await?;
        Board::from_solution(&solution)?;

        if let Some(id) = solution.id.filter(|id| *id != latest.number) {
            warn!(game = latest.number, solution = id, "solution is for another game");
            return Ok(None);
        }

        self.data
            .add_solution(latest.number, &solution)
            .await
            .map_err(Error::data)?;

        info!(game = latest.number, "stored solution");

        Ok(Some(latest.number))
    }

    /// Has the agent play game `number` and, if the game reaches an end,
    /// stores the conversation.
    #[instrument(skip(self))]
    pub async fn play(&self, number: u32) -> Result<Playthrough> {
        let game = self.game(number).await?;
        let solution = game.solution.ok_or(Error::missing_solution(number))?;
        let board = Board::from_solution(&solution)?;

        let history = if self.options.carry_history {
            self.data
                .game(number.saturating_sub(1))
                .await
                .map_err(Error::data)?
                .and_then(|previous| previous.transcript)
        } else {
            None
        };

        let conversation =
            history.unwrap_or_else(|| vec![ChatMessage::system(&self.options.system_prompt)]);

        let playthrough = play::play(&*self.agent, &board, number, conversation).await;

        if playthrough.is_finished() {
            self.data
                .store_transcript(number, &playthrough.conversation)
                .await
                .map_err(Error::data)?;
        } else {
            warn!(state = ?playthrough.state, "play was abandoned");
        }

        Ok(playthrough)
    }

    /// Asks the agent to explain its play of game `number`. `None` if it has
    /// not played that game.
    #[instrument(skip(self))]
    pub async fn explain(&self, number: u32) -> Result<Option<String>> {
        let Some(mut conversation) = self.game(number).await?.transcript else {
            return Ok(None);
        };

        conversation.push(ChatMessage::user(agent::EXPLAIN_PROMPT));
        let reply = self.agent.reply(&conversation).await?;

        Ok(Some(reply.content))
    }

    /// Plays every game from `from` onwards, stopping at the first one
    /// without a stored solution.
    #[instrument(skip(self))]
    pub async fn train(&self, from: u32) -> Result<Vec<(u32, PlayState)>> {
        let mut results = Vec::new();

        for number in from.. {
            match self.play(number).await {
                Ok(playthrough) => {
                    info!(game = number, state = ?playthrough.state, "trained");
                    results.push((number, playthrough.state));
                }
                Err(Error::UnknownGame(_) | Error::MissingSolution(_)) => break,
                Err(err) => return Err(err),
            }
        }

        Ok(results)
    }

    /// Re-derives every stored score from its transcript, rewriting the
    /// ones that changed. Returns how many were rewritten.
    #[instrument(skip(self))]
    pub async fn rescore(&self) -> Result<usize> {
        let mut updated = 0;

        for mut entry in self.data.all_scores().await.map_err(Error::data)? {
            let record = ScoreRecord::parse(&entry.message);

            if record != entry.record {
                debug!(game = entry.game, user.id = entry.player.id, ?record, "rescored");

                entry.record = record;
                self.data.update_score(&entry).await.map_err(Error::data)?;
                updated += 1;
            }
        }

        info!(updated, "rescored");

        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
    use pretty_assertions::assert_eq;
    use tracing_test::traced_test;

    use super::{Connections, PlayOptions, ScorePost};
    use crate::{
        agent::{script::Scripted, ChatMessage, Role},
        data::{ChannelRef, ConnectionsData, GameRecord, Memory, MemoryError, Player, ScoreEntry},
        play::PlayState,
        solution::{test_solution, Solution, SolutionError, SolutionSource},
        transcript::{ScoreRecord, Transcript},
        Error,
    };

    const CHANNEL: ChannelRef = ChannelRef {
        guild: Some(10),
        channel: 20,
    };

    const PERFECT: &str = "Connections\nPuzzle #342\n🟨🟨🟨🟨\n🟩🟩🟩🟩\n🟦🟦🟦🟦\n🟪🟪🟪🟪";

    /// Always serves the fixture solution, or nothing if built with `None`.
    struct Fixed(Option<Solution>);

    impl SolutionSource for Fixed {
        async fn solution(&self, _date: NaiveDate) -> Result<Solution, SolutionError> {
            match &self.0 {
                Some(solution) => Ok(solution.clone()),
                None => Err(SolutionError::Url(url::ParseError::EmptyHost)),
            }
        }
    }

    /// Memory that hands control back to the runtime after each lookup, so
    /// joined posts interleave between checking for a record and creating it.
    #[derive(Default)]
    struct Yielding(Memory);

    impl ConnectionsData for Yielding {
        type Error = MemoryError;

        async fn game(&self, number: u32) -> Result<Option<GameRecord>, MemoryError> {
            let game = self.0.game(number).await;
            tokio::task::yield_now().await;
            game
        }

        async fn create_game(&self, game: &GameRecord) -> Result<(), MemoryError> {
            self.0.create_game(game).await
        }

        async fn latest_game(&self) -> Result<Option<GameRecord>, MemoryError> {
            self.0.latest_game().await
        }

        async fn add_solution(&self, number: u32, solution: &Solution) -> Result<(), MemoryError> {
            self.0.add_solution(number, solution).await
        }

        async fn store_transcript(
            &self,
            number: u32,
            transcript: &[ChatMessage],
        ) -> Result<(), MemoryError> {
            self.0.store_transcript(number, transcript).await
        }

        async fn mark_summary_posted(&self, number: u32) -> Result<(), MemoryError> {
            self.0.mark_summary_posted(number).await
        }

        async fn score(
            &self,
            game: u32,
            player: u64,
            channel: ChannelRef,
        ) -> Result<Option<ScoreEntry>, MemoryError> {
            let score = self.0.score(game, player, channel).await;
            tokio::task::yield_now().await;
            score
        }

        async fn create_score(&self, entry: &ScoreEntry) -> Result<(), MemoryError> {
            self.0.create_score(entry).await
        }

        async fn update_score(&self, entry: &ScoreEntry) -> Result<(), MemoryError> {
            self.0.update_score(entry).await
        }

        async fn scores_since(
            &self,
            channel: ChannelRef,
            since: DateTime<Utc>,
        ) -> Result<Vec<ScoreEntry>, MemoryError> {
            self.0.scores_since(channel, since).await
        }

        async fn scores_for_game(
            &self,
            game: u32,
            channel: ChannelRef,
        ) -> Result<Vec<ScoreEntry>, MemoryError> {
            self.0.scores_for_game(game, channel).await
        }

        async fn all_scores(&self) -> Result<Vec<ScoreEntry>, MemoryError> {
            self.0.all_scores().await
        }
    }

    fn connections(replies: &[&'static str]) -> Connections<Memory, Scripted, Fixed> {
        Connections::new(
            Memory::new(),
            Scripted::new(replies.iter().copied()),
            Fixed(Some(test_solution())),
        )
    }

    fn time(hours: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 16, 0, 0, 0).unwrap() + Duration::hours(hours)
    }

    fn post(player: u64, text: &str, hours: i64) -> ScorePost {
        ScorePost {
            player: Player {
                id: player,
                name: format!("player{player}"),
            },
            bot: false,
            channel: CHANNEL,
            transcript: Transcript::find(text).expect("valid transcript"),
            posted: time(hours),
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 16).expect("valid date")
    }

    #[tokio::test]
    async fn record_score_creates_game_once() {
        let connections = connections(&[]);

        let first = connections.record_score(&post(1, PERFECT, 0)).await.unwrap();
        assert!(first.new);
        assert!(first.latest);
        assert_eq!(first.record.score, 6);

        let again = connections.record_score(&post(1, PERFECT, 1)).await.unwrap();
        assert!(!again.new);

        assert_eq!(connections.latest_game().await.unwrap().number, 342);
        assert_eq!(connections.data().all_scores().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn simultaneous_first_posts_are_both_scored() {
        let connections = Connections::new(Yielding::default(), Scripted::default(), Fixed(None));
        let (first, second) = (post(1, PERFECT, 0), post(2, PERFECT, 0));

        let (first, second) = tokio::join!(
            connections.record_score(&first),
            connections.record_score(&second),
        );

        assert!(first.unwrap().new);
        assert!(second.unwrap().new);
        assert_eq!(connections.latest_game().await.unwrap().number, 342);
        assert_eq!(connections.data().all_scores().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn simultaneous_post_and_edit_keep_one_score() {
        let connections = Connections::new(Yielding::default(), Scripted::default(), Fixed(None));
        let edited = "Connections\nPuzzle #342\n🟨🟩🟨🟨\n🟨🟨🟨🟨\n🟩🟩🟩🟩\n🟦🟦🟦🟦\n🟪🟪🟪🟪";
        let (original, edit) = (post(1, PERFECT, 0), post(1, edited, 1));

        let (original, edit) = tokio::join!(
            connections.record_score(&original),
            connections.record_score(&edit),
        );
        let (original, edit) = (original.unwrap(), edit.unwrap());

        // whichever write lands first counts, the other reports it
        assert!(original.new != edit.new);
        assert_eq!(original.record, edit.record);

        let stored = connections.data().all_scores().await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].record, original.record);
    }

    #[tokio::test]
    async fn older_game_is_not_latest() {
        let connections = connections(&[]);

        connections.record_score(&post(1, PERFECT, 0)).await.unwrap();
        let old = connections
            .record_score(&post(2, "Connections\nPuzzle #341\n🟨🟨🟨🟨", 1))
            .await
            .unwrap();

        assert_eq!(old.game, 341);
        assert!(!old.latest);
    }

    #[tokio::test]
    async fn remaining_players() {
        let connections = connections(&[]);

        connections
            .record_score(&post(1, "Connections\nPuzzle #341\n🟨🟨🟨🟨", 0))
            .await
            .unwrap();
        connections
            .record_score(&post(2, "Connections\nPuzzle #341\n🟨🟨🟨🟨", 1))
            .await
            .unwrap();
        connections.record_score(&post(1, PERFECT, 24)).await.unwrap();

        let mut bot = post(3, PERFECT, 25);
        bot.bot = true;
        connections.record_score(&bot).await.unwrap();

        let remaining = connections
            .remaining_players(CHANNEL, time(30))
            .await
            .unwrap();
        assert_eq!(remaining.game, 342);
        assert_eq!(remaining.active, 2);
        assert_eq!(
            remaining.players.iter().map(|player| player.id).collect::<Vec<_>>(),
            [2]
        );

        // player 2 fell out of the window
        let remaining = connections
            .remaining_players(CHANNEL, time(24 * 8))
            .await
            .unwrap();
        assert!(remaining.players.is_empty());
    }

    #[tokio::test]
    async fn summary_excludes_bot() {
        let connections = connections(&[]);

        connections.record_score(&post(1, PERFECT, 0)).await.unwrap();
        let mut bot = post(3, PERFECT, 1);
        bot.bot = true;
        connections.record_score(&bot).await.unwrap();

        let summary = connections.summary(CHANNEL).await.unwrap();
        assert_eq!(summary.game, 342);
        assert_eq!(summary.entries.len(), 1);
        assert_eq!(summary.entries[0].player.id, 1);
    }

    #[tokio::test]
    async fn refresh_solution_once() {
        let connections = connections(&[]);
        connections.record_score(&post(1, PERFECT, 0)).await.unwrap();

        assert_eq!(connections.refresh_solution(today()).await.unwrap(), Some(342));
        assert_eq!(connections.refresh_solution(today()).await.unwrap(), None);
        assert_eq!(
            connections.game(342).await.unwrap().solution,
            Some(test_solution())
        );
    }

    #[tokio::test]
    #[traced_test]
    async fn refresh_solution_for_another_game() {
        let connections = connections(&[]);
        connections
            .record_score(&post(1, "Connections\nPuzzle #341\n🟨🟨🟨🟨", 0))
            .await
            .unwrap();

        // the fixture is puzzle 342
        assert_eq!(connections.refresh_solution(today()).await.unwrap(), None);
        assert_eq!(connections.game(341).await.unwrap().solution, None);
        assert!(logs_contain("solution is for another game"));
    }

    #[tokio::test]
    async fn refresh_solution_without_id() {
        let mut solution = test_solution();
        solution.id = None;
        let connections = Connections::new(Memory::new(), Scripted::default(), Fixed(Some(solution)));
        connections
            .record_score(&post(1, "Connections\nPuzzle #341\n🟨🟨🟨🟨", 0))
            .await
            .unwrap();

        assert_eq!(connections.refresh_solution(today()).await.unwrap(), Some(341));
    }

    #[tokio::test]
    async fn refresh_solution_rejects_malformed() {
        let mut solution = test_solution();
        solution.categories.truncate(3);
        let connections = Connections::new(Memory::new(), Scripted::default(), Fixed(Some(solution)));
        connections.record_score(&post(1, PERFECT, 0)).await.unwrap();

        assert!(matches!(
            connections.refresh_solution(today()).await,
            Err(Error::MalformedSolution(_))
        ));
        assert_eq!(connections.game(342).await.unwrap().solution, None);
    }

    #[tokio::test]
    async fn refresh_solution_without_games() {
        let connections = connections(&[]);

        assert!(matches!(
            connections.refresh_solution(today()).await,
            Err(Error::UnknownGame(_))
        ));
    }

    #[tokio::test]
    #[traced_test]
    async fn play_stores_transcript() {
        let connections = connections(&[
            "bass--pike--sole--carp",
            "shift--enter--tab--escape",
            "mars--venus--saturn--mercury",
            "foot--basket--snow--eye",
            "good game",
        ]);
        connections.record_score(&post(1, PERFECT, 0)).await.unwrap();
        connections.refresh_solution(today()).await.unwrap();

        let playthrough = connections.play(342).await.unwrap();
        assert_eq!(playthrough.state, PlayState::Won);

        // the posted grid is itself a transcript
        let transcript = Transcript::find(&playthrough.grid).expect("grid is a transcript");
        assert_eq!(
            transcript.record(),
            ScoreRecord {
                plays: 4,
                score: 6,
                completed: [true; 4]
            }
        );

        let stored = connections
            .game(342)
            .await
            .unwrap()
            .transcript
            .expect("transcript should be stored");
        assert_eq!(stored[0].role, Role::System);
        assert_eq!(stored.last().map(|message| message.content.as_str()), Some("good game"));
    }

    #[tokio::test]
    async fn aborted_play_is_not_stored() {
        let connections = connections(&["bass--pike--sole--carp"]);
        connections.record_score(&post(1, PERFECT, 0)).await.unwrap();
        connections.refresh_solution(today()).await.unwrap();

        let playthrough = connections.play(342).await.unwrap();

        assert!(matches!(playthrough.state, PlayState::Aborted(_)));
        assert_eq!(connections.game(342).await.unwrap().transcript, None);
    }

    #[tokio::test]
    async fn play_carries_previous_conversation() {
        let connections = connections(&["foot--basket--snow--eye"]);
        let data = connections.data();

        let mut previous = GameRecord::new(341, time(0));
        previous.transcript = Some(vec![ChatMessage::user("earlier game")]);
        data.create_game(&previous).await.unwrap();

        let mut game = GameRecord::new(342, time(24));
        game.solution = Some(test_solution());
        data.create_game(&game).await.unwrap();

        connections.play(342).await.unwrap();

        let seen = connections
            .agent
            .seen
            .lock()
            .expect("lock should not be poisoned");
        assert_eq!(seen[0][0].content, "earlier game");
        assert_eq!(seen[0][1].role, Role::User);
    }

    #[tokio::test]
    async fn play_without_history_uses_system_prompt() {
        let connections = connections(&[]).with_options(PlayOptions {
            carry_history: false,
            system_prompt: "be brief".to_owned(),
        });
        let data = connections.data();

        let mut previous = GameRecord::new(341, time(0));
        previous.transcript = Some(vec![ChatMessage::user("earlier game")]);
        data.create_game(&previous).await.unwrap();

        let mut game = GameRecord::new(342, time(24));
        game.solution = Some(test_solution());
        data.create_game(&game).await.unwrap();

        connections.play(342).await.unwrap();

        let seen = connections
            .agent
            .seen
            .lock()
            .expect("lock should not be poisoned");
        assert_eq!(seen[0][0], ChatMessage::system("be brief"));
    }

    #[tokio::test]
    async fn play_requires_solution() {
        let connections = connections(&[]);
        connections.record_score(&post(1, PERFECT, 0)).await.unwrap();

        assert!(matches!(
            connections.play(342).await,
            Err(Error::MissingSolution(_))
        ));
        assert!(matches!(
            connections.play(999).await,
            Err(Error::UnknownGame(_))
        ));
    }

    #[tokio::test]
    async fn explain() {
        let connections = connections(&["I matched the fish first."]);
        let data = connections.data();

        assert!(matches!(
            connections.explain(342).await,
            Err(Error::UnknownGame(_))
        ));

        data.create_game(&GameRecord::new(342, time(0))).await.unwrap();
        assert_eq!(connections.explain(342).await.unwrap(), None);

        data.store_transcript(342, &[ChatMessage::user("Play this connections game")])
            .await
            .unwrap();
        assert_eq!(
            connections.explain(342).await.unwrap().as_deref(),
            Some("I matched the fish first.")
        );

        let seen = connections
            .agent
            .seen
            .lock()
            .expect("lock should not be poisoned");
        assert_eq!(seen[0].last(), Some(&ChatMessage::user("Explain your plays.")));
    }

    #[tokio::test]
    async fn train_stops_at_missing_solution() {
        let connections = connections(&[
            "bass--pike--sole--carp",
            "shift--enter--tab--escape",
            "mars--venus--saturn--mercury",
            "foot--basket--snow--eye",
            "good game",
        ]);
        let mut game = GameRecord::new(342, time(0));
        game.solution = Some(test_solution());
        connections.data().create_game(&game).await.unwrap();
        connections
            .data()
            .create_game(&GameRecord::new(343, time(24)))
            .await
            .unwrap();

        assert_eq!(
            connections.train(342).await.unwrap(),
            [(342, PlayState::Won)]
        );
    }

    #[tokio::test]
    async fn rescore_fixes_changed_records() {
        let connections = connections(&[]);
        connections.record_score(&post(1, PERFECT, 0)).await.unwrap();
        connections
            .record_score(&post(2, "Connections\nPuzzle #342\n🟨🟨🟨🟨", 0))
            .await
            .unwrap();

        let mut stale = connections
            .data()
            .score(342, 1, CHANNEL)
            .await
            .unwrap()
            .unwrap();
        stale.record.score = 2;
        connections.data().update_score(&stale).await.unwrap();

        assert_eq!(connections.rescore().await.unwrap(), 1);
        assert_eq!(connections.rescore().await.unwrap(), 0);
        assert_eq!(
            connections
                .data()
                .score(342, 1, CHANNEL)
                .await
                .unwrap()
                .unwrap()
                .record
                .score,
            6
        );
    }
}
