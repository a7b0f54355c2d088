use poise::{
    serenity_prelude::{self as serenity, FullEvent},
    BoxFuture, FrameworkContext,
};
use tracing::trace;

use crate::{
    errors::{CommandError, Error},
    watchers::{
        scores::{EditWatcher, ScoreWatcher},
        MessageWatcher, WatcherContext,
    },
    PoiseData,
};

async fn event_handler(
    serenity_ctx: &serenity::Context,
    event: &FullEvent,
    _framework_ctx: FrameworkContext<'_, PoiseData, Error>,
    data: &PoiseData,
) -> Result<(), CommandError> {
    let ctx = WatcherContext::new(serenity_ctx, data);

    match event {
        FullEvent::Message { new_message: msg } => {
            if let Some(transcript) = ScoreWatcher::filter(msg) {
                trace!(?msg.id, "transcript posted");
                ScoreWatcher::action(ctx, transcript, msg).await?;
            }
        }
        FullEvent::MessageUpdate { event, .. } => {
            // embed unfurls also arrive as updates, without an edit timestamp
            let edited_transcript = event.edited_timestamp.is_some()
                && event
                    .content
                    .as_deref()
                    .is_some_and(|content| content.contains("Connections"));

            if edited_transcript {
                let msg = event.channel_id.message(serenity_ctx, event.id).await?;

                if let Some(transcript) = EditWatcher::filter(&msg) {
                    trace!(?msg.id, "transcript edited");
                    EditWatcher::action(ctx, transcript, &msg).await?;
                }
            }
        }
        _ => (),
    }

    Ok(())
}

pub fn poise<'a>(
    serenity_ctx: &'a serenity::Context,
    event: &'a FullEvent,
    framework_ctx: FrameworkContext<'a, PoiseData, Error>,
    data: &'a PoiseData,
) -> BoxFuture<'a, Result<(), Error>> {
    Box::pin(async move {
        event_handler(serenity_ctx, event, framework_ctx, data)
            .await
            .map_err(Error::from)
    })
}
