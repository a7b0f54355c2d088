use crate::{errors::SendMessageError, PoiseData};

pub type Context<'a> = poise::Context<'a, PoiseData, crate::errors::Error>;

pub type Error = crate::errors::CommandError;
pub type Command = poise::Command<PoiseData, crate::errors::Error>;
pub type CommandResult = Result<(), Error>;

pub trait ContextExt {
    async fn reply_ext(
        &self,
        text: impl Into<String>,
    ) -> Result<poise::ReplyHandle<'_>, SendMessageError>;

    /// The channel the command was used in, as the engine identifies it.
    fn channel_ref(&self) -> connections::data::ChannelRef;
}

impl ContextExt for Context<'_> {
    async fn reply_ext(
        &self,
        text: impl Into<String>,
    ) -> Result<poise::ReplyHandle<'_>, SendMessageError> {
        self.reply(text).await.map_err(SendMessageError::from)
    }

    fn channel_ref(&self) -> connections::data::ChannelRef {
        super::serenity::channel_ref(self.guild_id(), self.channel_id())
    }
}
