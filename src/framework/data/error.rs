#[derive(Debug, thiserror::Error, thisslime::TracingError)]
pub enum Error {
    #[error("error from mongodb: {0}")]
    #[event(level = ERROR)]
    MongoDb(#[from] mongodb::error::Error),

    #[error("couldn't build the agent client: {0}")]
    Agent(#[from] connections::agent::AgentError),
}
