use poise::serenity_prelude::{self as serenity, CacheHttp, Message};

use crate::{errors::CommandError, PoiseData};

pub mod scores;

pub trait MessageWatcher {
    type FilterOutput;

    fn filter(msg: &Message) -> Option<Self::FilterOutput>;

    async fn action(
        ctx: WatcherContext<'_>,
        filter: Self::FilterOutput,
        msg: &Message,
    ) -> Result<(), CommandError>;
}

#[derive(Copy, Clone)]
pub struct WatcherContext<'a> {
    serenity_ctx: &'a serenity::Context,
    data: &'a PoiseData,
}

impl<'a> WatcherContext<'a> {
    pub fn new(serenity_ctx: &'a serenity::Context, data: &'a PoiseData) -> Self {
        Self { serenity_ctx, data }
    }

    pub fn data(self) -> &'a PoiseData {
        self.data
    }

    pub fn cache_http(self) -> &'a impl CacheHttp {
        self.serenity_ctx
    }
}
