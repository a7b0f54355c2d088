use connections::Connections;
use tracing::{info, instrument};

use super::{config::ConfigSetup, Config};

pub mod error;
pub use error::Error as DataError;

pub type Result<T, E = DataError> = std::result::Result<T, E>;

#[derive(Debug, Clone)]
pub struct PoiseData {
    config: Config,
    connections: Connections,
}

impl PoiseData {
    pub(crate) async fn new(config: ConfigSetup) -> Result<Self> {
        let connections = connect(&config).await?;

        Ok(Self {
            config: config.finish(),
            connections,
        })
    }

    pub(crate) fn config(&self) -> &Config {
        &self.config
    }

    pub(crate) fn connections(&self) -> &Connections {
        &self.connections
    }
}

/// Builds the game engine on top of the configured database, agent and
/// solution provider.
#[instrument(skip_all)]
pub(crate) async fn connect(config: &ConfigSetup) -> Result<Connections> {
    let db = mongodb::Client::with_options(config.mongodb())?.database("connectionsbot");

    let agent = config.agent.build()?;
    info!(endpoint = %agent.endpoint(), model = agent.model(), "agent ready");

    let connections = Connections::from_database(&db, agent, config.solution.build())
        .with_options(config.agent.play_options());

    connections.data().ensure_indexes().await?;

    Ok(connections)
}
