use poise::serenity_prelude::{CacheHttp, ChannelId, Message, ReactionType};

use crate::errors::SendMessageError;

pub trait ChannelIdExt {
    async fn say_ext(
        self,
        cache_http: impl CacheHttp,
        content: impl Into<String>,
    ) -> Result<Message, SendMessageError>;
}

impl ChannelIdExt for ChannelId {
    async fn say_ext(
        self,
        cache_http: impl CacheHttp,
        content: impl Into<String>,
    ) -> Result<Message, SendMessageError> {
        self.say(cache_http, content)
            .await
            .map_err(SendMessageError::from)
    }
}

pub trait MessageExt {
    async fn reply_ext(
        &self,
        cache_http: impl CacheHttp,
        content: impl Into<String>,
    ) -> Result<Message, SendMessageError>;

    async fn react_ext(
        &self,
        cache_http: impl CacheHttp,
        reaction: impl Into<ReactionType>,
    ) -> Result<(), SendMessageError>;
}

impl MessageExt for Message {
    async fn reply_ext(
        &self,
        cache_http: impl CacheHttp,
        content: impl Into<String>,
    ) -> Result<Message, SendMessageError> {
        self.reply(cache_http, content)
            .await
            .map_err(SendMessageError::from)
    }

    async fn react_ext(
        &self,
        cache_http: impl CacheHttp,
        reaction: impl Into<ReactionType>,
    ) -> Result<(), SendMessageError> {
        self.react(cache_http, reaction)
            .await
            .map(|_| ())
            .map_err(SendMessageError::from)
    }
}
