use chrono::Utc;
use connections::{data::Player, transcript::Transcript, RecordedScore, ScorePost};
use poise::serenity_prelude::{Message, ReactionType};
use thisslime::TracingError;
use tracing::{debug, info, instrument, warn};

use super::{MessageWatcher, WatcherContext};
use crate::{
    commands::{connectionsummary, play_connections},
    errors::CommandError,
    utils::serenity::{
        channel::{ChannelIdExt, MessageExt},
        channel_ref,
    },
};

pub const EDIT_IGNORED: &str = "I saw that, Edited Connections Score Ignored.";
pub const EDIT_COUNTED: &str = "I got you, Edited Connections Score Counted.";

/// Keycap for a score from 0 to 6.
pub fn score_reaction(score: u32) -> &'static str {
    match score {
        0 => "0️⃣",
        1 => "1️⃣",
        2 => "2️⃣",
        3 => "3️⃣",
        4 => "4️⃣",
        5 => "5️⃣",
        6 => "6️⃣",
        _ => "⁉️",
    }
}

fn score_post(transcript: Transcript, msg: &Message) -> ScorePost {
    ScorePost {
        player: Player {
            id: msg.author.id.get(),
            name: msg.author.name.clone(),
        },
        bot: msg.author.bot,
        channel: channel_ref(msg.guild_id, msg.channel_id),
        transcript,
        posted: *msg.timestamp,
    }
}

/// Records posted transcripts and follows up once everyone is done.
pub struct ScoreWatcher;

impl MessageWatcher for ScoreWatcher {
    type FilterOutput = Transcript;

    fn filter(msg: &Message) -> Option<Transcript> {
        Transcript::find(&msg.content)
    }

    #[instrument(skip_all, fields(user = %msg.author.name, game = transcript.number))]
    async fn action(
        ctx: WatcherContext<'_>,
        transcript: Transcript,
        msg: &Message,
    ) -> Result<(), CommandError> {
        let recorded = record(ctx, transcript, msg).await?;

        if recorded.new && recorded.latest && !msg.author.bot {
            summarize_if_done(ctx, msg).await?;
        }

        refresh_solution(ctx, msg).await
    }
}

/// Replies to edited transcripts: a player's first post for a game stands.
pub struct EditWatcher;

impl MessageWatcher for EditWatcher {
    type FilterOutput = Transcript;

    fn filter(msg: &Message) -> Option<Transcript> {
        Transcript::find(&msg.content)
    }

    #[instrument(skip_all, fields(user = %msg.author.name, game = transcript.number))]
    async fn action(
        ctx: WatcherContext<'_>,
        transcript: Transcript,
        msg: &Message,
    ) -> Result<(), CommandError> {
        let channel = channel_ref(msg.guild_id, msg.channel_id);

        let scored = ctx
            .data()
            .connections()
            .has_score(transcript.number, msg.author.id.get(), channel)
            .await?;

        if scored {
            debug!("edit ignored");
            msg.reply_ext(ctx.cache_http(), EDIT_IGNORED).await?;
        } else {
            ScoreWatcher::action(ctx, transcript, msg).await?;
            msg.reply_ext(ctx.cache_http(), EDIT_COUNTED).await?;
        }

        Ok(())
    }
}

async fn record(
    ctx: WatcherContext<'_>,
    transcript: Transcript,
    msg: &Message,
) -> Result<RecordedScore, CommandError> {
    let post = score_post(transcript, msg);
    let recorded = ctx.data().connections().record_score(&post).await?;

    let reaction = ReactionType::Unicode(score_reaction(recorded.record.score).to_owned());
    if let Err(err) = msg.react_ext(ctx.cache_http(), reaction).await {
        err.trace();
        warn!("unable to react to message");
    }

    Ok(recorded)
}

async fn summarize_if_done(ctx: WatcherContext<'_>, msg: &Message) -> Result<(), CommandError> {
    let channel = channel_ref(msg.guild_id, msg.channel_id);

    let remaining = ctx
        .data()
        .connections()
        .remaining_players(channel, Utc::now())
        .await?;

    info!(
        remaining = remaining.players.len(),
        active = remaining.active,
        "remaining players"
    );

    if remaining.players.is_empty() {
        let summary = ctx.data().connections().summary(channel).await?;
        let text = connectionsummary::render(&summary, &ctx.data().config().summary);

        msg.channel_id.say_ext(ctx.cache_http(), text).await?;
        ctx.data()
            .connections()
            .mark_summary_posted(summary.game)
            .await?;
    }

    Ok(())
}

/// Fetches today's solution if the latest game has none, then lets the agent
/// play it when configured to.
async fn refresh_solution(ctx: WatcherContext<'_>, msg: &Message) -> Result<(), CommandError> {
    let connections = ctx.data().connections();

    let number = match connections.refresh_solution(Utc::now().date_naive()).await {
        Ok(Some(number)) => number,
        Ok(None) => return Ok(()),
        Err(err) => {
            err.trace();
            warn!("unable to get solution");
            return Ok(());
        }
    };

    if !ctx.data().config().agent.auto_play() {
        debug!(game = number, "auto play disabled");
        return Ok(());
    }

    let text = play_connections::play(connections, number).await;
    msg.channel_id.say_ext(ctx.cache_http(), text).await?;

    Ok(())
}
