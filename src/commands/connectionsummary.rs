use connections::Summary;
use tracing::instrument;

use crate::{
    commands::LogCommands,
    framework::config::SummaryConfig,
    utils::{
        poise::{CommandResult, ContextExt},
        Context, Result,
    },
};

const TITLE: &str = "Connections Summary";

/// Displays the current summary (message displayed each day)
#[instrument(skip_all)]
#[poise::command(
    slash_command,
    prefix_command,
    discard_spare_arguments,
    required_bot_permissions = "SEND_MESSAGES | VIEW_CHANNEL"
)]
pub async fn connectionsummary(ctx: Context<'_>) -> Result<()> {
    ctx.log_command().await;
    _connectionsummary(ctx).await?;
    Ok(())
}

async fn _connectionsummary(ctx: Context<'_>) -> CommandResult {
    let data = ctx.data();

    let summary = data.connections().summary(ctx.channel_ref()).await?;
    ctx.reply_ext(render(&summary, &data.config().summary))
        .await?;

    data.connections().mark_summary_posted(summary.game).await?;

    Ok(())
}

/// One row per player with a mark for each category they solved, in a code
/// block so the columns line up.
pub fn render(summary: &Summary, config: &SummaryConfig) -> String {
    let names: Vec<&str> = summary
        .entries
        .iter()
        .map(|entry| config.display_name(&entry.player.name))
        .collect();

    let width = names
        .iter()
        .map(|name| name.chars().count())
        .chain(std::iter::once("User".len()))
        .max()
        .unwrap_or_default();

    let mut lines = vec![
        TITLE.to_owned(),
        format!("{:<width$} | 1 | 2 | 3 | 4", "User"),
        format!("{}-+---+---+---+---", "-".repeat(width)),
    ];

    for (name, entry) in names.iter().zip(&summary.entries) {
        let marks: Vec<&str> = entry
            .record
            .completed
            .iter()
            .map(|solved| if *solved { "✅" } else { "🟥" })
            .collect();

        let padding = width - name.chars().count();
        lines.push(format!("{name}{} | {}", " ".repeat(padding), marks.join(" | ")));
    }

    let mut text = format!("```\n{}\n```", lines.join("\n"));

    if let Some(footer) = config.footer() {
        text.push_str(&format!("\n*{footer}*"));
    }

    text
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use connections::{
        data::{ChannelRef, Player, ScoreEntry},
        transcript::ScoreRecord,
        Summary,
    };
    use pretty_assertions::assert_eq;

    use super::render;
    use crate::framework::config::SummaryConfig;

    fn entry(name: &str, completed: [bool; 4]) -> ScoreEntry {
        ScoreEntry {
            game: 342,
            player: Player {
                id: 1,
                name: name.to_owned(),
            },
            bot: false,
            channel: ChannelRef {
                guild: Some(1),
                channel: 2,
            },
            message: String::new(),
            record: ScoreRecord {
                plays: 4,
                score: 0,
                completed,
            },
            date: Utc::now(),
        }
    }

    fn summary_config(toml: &str) -> SummaryConfig {
        ::config::Config::builder()
            .add_source(::config::File::from_str(toml, ::config::FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn table() {
        let summary = Summary {
            game: 342,
            entries: vec![
                entry("jdoe", [true, true, false, true]),
                entry("al", [false; 4]),
            ],
        };
        let config = summary_config("display_names = { jdoe = \"Jane Doe\" }");

        assert_eq!(
            render(&summary, &config),
            "```\n\
             Connections Summary\n\
             User     | 1 | 2 | 3 | 4\n\
             ---------+---+---+---+---\n\
             Jane Doe | ✅ | ✅ | 🟥 | ✅\n\
             al       | 🟥 | 🟥 | 🟥 | 🟥\n\
             ```"
        );
    }

    #[test]
    fn footer() {
        let summary = Summary {
            game: 342,
            entries: Vec::new(),
        };
        let config = summary_config("footer = \"good game\"");

        assert!(render(&summary, &config).ends_with("```\n*good game*"));
    }
}
