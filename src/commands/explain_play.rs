use thisslime::TracingError;
use tracing::{instrument, warn};

use crate::{
    commands::LogCommands,
    utils::{
        poise::{CommandResult, ContextExt},
        Context, Result,
    },
};

/// Has the bot explain how it played the given Connections game or latest.
#[instrument(skip_all)]
#[poise::command(
    slash_command,
    prefix_command,
    required_bot_permissions = "SEND_MESSAGES | VIEW_CHANNEL"
)]
pub async fn explain_play(
    ctx: Context<'_>,
    #[description = "The Connections Game Number to explain"] connections_game: Option<u32>,
) -> Result<()> {
    ctx.log_command().await;
    _explain_play(ctx, connections_game).await?;
    Ok(())
}

async fn _explain_play(ctx: Context<'_>, connections_game: Option<u32>) -> CommandResult {
    let connections = ctx.data().connections();

    let number = match connections_game {
        Some(number) => number,
        None => connections.latest_game().await?.number,
    };

    ctx.defer().await?;

    let text = match connections.explain(number).await {
        Ok(Some(explanation)) => spoiler(&explanation),
        Ok(None) => {
            warn!(game = number, "no stored play to explain");
            unable_to_explain(number)
        }
        Err(err) => {
            err.trace();
            unable_to_explain(number)
        }
    };

    ctx.reply_ext(text).await?;

    Ok(())
}

fn spoiler(text: &str) -> String {
    format!("||{}||", text.trim())
}

fn unable_to_explain(number: u32) -> String {
    format!("Unable to explain Connection Game: {number}")
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::{spoiler, unable_to_explain};

    #[test]
    fn spoilered() {
        assert_eq!(spoiler("\nFISH first.\n"), "||FISH first.||");
    }

    #[test]
    fn unable() {
        assert_eq!(unable_to_explain(7), "Unable to explain Connection Game: 7");
    }
}
