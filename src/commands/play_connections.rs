use connections::{play::Playthrough, Connections};
use thisslime::TracingError;
use tracing::{instrument, warn};

use crate::{
    commands::LogCommands,
    utils::{
        poise::{CommandResult, ContextExt},
        Context, Result,
    },
};

/// Makes the bot play the given Connections game or latest.
#[instrument(skip_all)]
#[poise::command(
    slash_command,
    prefix_command,
    required_bot_permissions = "SEND_MESSAGES | VIEW_CHANNEL"
)]
pub async fn play_connections(
    ctx: Context<'_>,
    #[description = "The Connections Game Number to play"] connections_game: Option<u32>,
) -> Result<()> {
    ctx.log_command().await;
    _play_connections(ctx, connections_game).await?;
    Ok(())
}

async fn _play_connections(ctx: Context<'_>, connections_game: Option<u32>) -> CommandResult {
    let connections = ctx.data().connections();

    let number = match connections_game {
        Some(number) => number,
        None => connections.latest_game().await?.number,
    };

    // a full game can take minutes
    ctx.defer().await?;

    ctx.reply_ext(play(connections, number).await).await?;

    Ok(())
}

/// Plays game `number` and returns what to post about it.
pub async fn play(connections: &Connections, number: u32) -> String {
    match connections.play(number).await {
        Ok(playthrough) => result_message(&playthrough),
        Err(err) => {
            err.trace();
            unable_to_play(number)
        }
    }
}

fn result_message(playthrough: &Playthrough) -> String {
    if playthrough.is_finished() {
        playthrough.grid.clone()
    } else {
        warn!(game = playthrough.number, state = ?playthrough.state, "play did not finish");
        unable_to_play(playthrough.number)
    }
}

fn unable_to_play(number: u32) -> String {
    format!("Unable to play Connection Game: {number}")
}
