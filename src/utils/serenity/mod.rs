use connections::data::ChannelRef;
use poise::serenity_prelude::{ChannelId, GuildId};

pub mod channel;

pub fn channel_ref(guild: Option<GuildId>, channel: ChannelId) -> ChannelRef {
    ChannelRef {
        guild: guild.map(GuildId::get),
        channel: channel.get(),
    }
}
