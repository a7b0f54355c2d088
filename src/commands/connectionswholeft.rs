use chrono::Utc;
use connections::Remaining;
use poise::{
    serenity_prelude::{Color, CreateEmbed, CreateEmbedFooter},
    CreateReply,
};
use tracing::instrument;

use crate::{
    commands::LogCommands,
    errors::SendMessageError,
    framework::config::SummaryConfig,
    utils::{
        poise::{CommandResult, ContextExt},
        Context, Result,
    },
};

const EMBED_COLOR: Color = Color::new(0x41_69_e1);

/// Lists the players who have not posted the latest game yet.
#[instrument(skip_all)]
#[poise::command(
    slash_command,
    prefix_command,
    discard_spare_arguments,
    required_bot_permissions = "SEND_MESSAGES | VIEW_CHANNEL | EMBED_LINKS"
)]
pub async fn connectionswholeft(ctx: Context<'_>) -> Result<()> {
    ctx.log_command().await;
    _connectionswholeft(ctx).await?;
    Ok(())
}

async fn _connectionswholeft(ctx: Context<'_>) -> CommandResult {
    let remaining = ctx
        .data()
        .connections()
        .remaining_players(ctx.channel_ref(), Utc::now())
        .await?;

    let who_left = WhoLeft::new(&remaining, &ctx.data().config().summary);

    ctx.send(CreateReply::default().embed(who_left.embed()))
        .await
        .map_err(SendMessageError::from)?;

    Ok(())
}

struct WhoLeft {
    title: String,
    description: Option<String>,
    fields: Vec<(String, String)>,
    footer: Option<String>,
}

impl WhoLeft {
    fn new(remaining: &Remaining, config: &SummaryConfig) -> Self {
        let game = remaining.game;

        let title = match remaining.players.len() {
            0 => format!("Everyone is done with {game}"),
            1 => "One player Remaining".to_owned(),
            _ => "People not done".to_owned(),
        };

        let description = remaining
            .players
            .is_empty()
            .then(|| "All done.".to_owned());

        let fields = remaining
            .players
            .iter()
            .map(|player| {
                (
                    config.display_name(&player.name).to_owned(),
                    format!("Has not completed Connections {game}"),
                )
            })
            .collect();

        let footer = (!remaining.players.is_empty())
            .then(|| config.footer().map(str::to_owned))
            .flatten();

        Self {
            title,
            description,
            fields,
            footer,
        }
    }

    fn embed(self) -> CreateEmbed {
        let mut embed = CreateEmbed::default()
            .title(self.title)
            .color(EMBED_COLOR)
            .fields(
                self.fields
                    .into_iter()
                    .map(|(name, value)| (name, value, false)),
            );

        if let Some(description) = self.description {
            embed = embed.description(description);
        }

        if let Some(footer) = self.footer {
            embed = embed.footer(CreateEmbedFooter::new(footer));
        }

        embed
    }
}
