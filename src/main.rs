#![warn(clippy::perf)]
#![warn(clippy::unwrap_used)]

use anyhow::Context as _;
use clap::Parser;
use poise::serenity_prelude::{self as serenity, GatewayIntents};
use thisslime::TracingError;
use tracing::info;
use tracing_unwrap::ResultExt;

mod cli;
pub use cli::Cli;

mod commands;

mod errors;

mod framework;
use framework::{config::ConfigSetup, data::PoiseData};

mod utils;

mod watchers;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    framework::logging::init_tracing();

    let config = match ConfigSetup::load(cli.clone()) {
        Ok(config) => config,
        Err(err) => {
            err.trace();
            return Err(err).context("couldn't load configuration");
        }
    };

    match cli.command {
        cli::Command::Start(_) => start(config).await,
        cli::Command::Config => {
            println!("{}", config.app);
            Ok(())
        }
        cli::Command::Train(ref train) => {
            let connections = framework::data::connect(&config).await?;

            for (game, state) in connections.train(train.from()).await? {
                println!("{game}: {state:?}");
            }

            Ok(())
        }
        cli::Command::Rescore => {
            let connections = framework::data::connect(&config).await?;
            let updated = connections.rescore().await?;

            println!("rescored {updated} scores");
            Ok(())
        }
    }
}

async fn start(config: ConfigSetup) -> anyhow::Result<()> {
    if let Some(flavor_text) = config.logs.flavor_text() {
        info!("{flavor_text}")
    }

    let token = config.token().to_owned();
    let framework = framework::poise::build(config);

    let intents = GatewayIntents::non_privileged() | GatewayIntents::MESSAGE_CONTENT;

    let mut client = serenity::Client::builder(token, intents)
        .framework(framework)
        .await
        .expect_or_log("client should be valid");

    client.start().await.context("client returned an error")
}
