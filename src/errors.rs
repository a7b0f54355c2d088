use poise::{
    serenity_prelude::{self as serenity, Permissions},
    BoxFuture, FrameworkError,
};

use thiserror::Error as ThisError;
use thisslime::TracingError;
use tracing::{error, error_span, Instrument};
use tracing_unwrap::ResultExt;

use crate::{
    utils::{poise::ContextExt, Context},
    PoiseData,
};

pub fn handle_framework_error(err: FrameworkError<'_, PoiseData, Error>) -> BoxFuture<()> {
    Box::pin(async {
        match err {
            FrameworkError::Command { error, ctx, .. } => {
                let command = ctx.invoked_command_name();
                let span = error_span!("", command);

                handle_error(error, ctx).instrument(span).await;
            }
            FrameworkError::MissingBotPermissions {
                missing_permissions,
                ctx,
                ..
            } => {
                let command = ctx.invoked_command_name();
                let span = error_span!("", command);
                let _enter = span.enter();

                error!(%missing_permissions, "bot is missing permissions");
            }
            FrameworkError::EventHandler { error, event, .. } => {
                let span = error_span!("", event = event.snake_case_name());
                let _enter = span.enter();

                error.trace();
            }
            _ => {
                poise::builtins::on_error(err)
                    .await
                    .expect_or_log("failed to handle framework error");
            }
        };
    })
}

async fn handle_error(err: Error, ctx: Context<'_>) {
    err.trace();

    if let Err(err) = ctx.reply_ext(err.to_string()).await {
        err.trace();
    }
}

#[derive(Debug, ThisError, TracingError)]
#[span(level = WARN)]
pub enum CommandError {
    #[error("input error: {0}")]
    SendMessage(#[from] SendMessageError),

    #[error("other serenity error: {0}")]
    #[event(level = ERROR)]
    Serenity(#[from] serenity::Error),

    #[error(transparent)]
    Connections(#[from] connections::Error),
}

#[derive(Debug, ThisError, TracingError)]
#[span]
pub enum Error {
    #[error(transparent)]
    Command(#[from] CommandError),

    #[error(transparent)]
    Data(#[from] crate::framework::DataError),

    #[error(transparent)]
    Config(#[from] crate::framework::config::Error),
}

#[derive(Debug, thiserror::Error, TracingError)]
#[span(level = ERROR)]
pub enum SendMessageError {
    #[error(transparent)]
    Permissions(#[from] MissingPermissionsError),

    #[error(transparent)]
    MessageTooLong(#[from] MessageTooLongError),

    #[error("couldn't send message: {0}")]
    #[event(level = ERROR)]
    Other(serenity::Error),
}

impl From<serenity::Error> for SendMessageError {
    fn from(value: serenity::Error) -> Self {
        match value {
            serenity::Error::Model(ref model) => match model {
                serenity::ModelError::InvalidPermissions { required, present } => {
                    Self::Permissions(MissingPermissionsError {
                        required: *required,
                        present: *present,
                    })
                }
                serenity::ModelError::MessageTooLong(len) => {
                    Self::MessageTooLong(MessageTooLongError { length: *len })
                }
                _ => Self::Other(value),
            },
            _ => Self::Other(value),
        }
    }
}

#[derive(Debug, ThisError, TracingError)]
#[error("missing permissions: {}", self.missing())]
#[event(level = ERROR)]
pub struct MissingPermissionsError {
    #[field(print = Display)]
    required: Permissions,

    #[field(print = Display)]
    present: Permissions,
}

impl MissingPermissionsError {
    fn missing(&self) -> Permissions {
        self.required.difference(self.present)
    }
}

#[derive(Debug, ThisError, TracingError)]
#[event(level = ERROR)]
#[error("message is too long")]
pub struct MessageTooLongError {
    pub length: usize,
}
