use std::fmt;

#[derive(Debug, thiserror::Error, thisslime::TracingError)]
pub enum ConnectionsError {
    #[error("data error: {0}")]
    #[event]
    Data(String),

    #[error(transparent)]
    MalformedSolution(#[from] crate::board::MalformedSolution),

    #[error(transparent)]
    Agent(#[from] crate::agent::AgentError),

    #[error(transparent)]
    Solution(#[from] crate::solution::SolutionError),

    #[error(transparent)]
    UnknownGame(#[from] UnknownGameError),

    #[error(transparent)]
    MissingSolution(#[from] MissingSolutionError),
}

impl ConnectionsError {
    pub fn data(error: impl std::error::Error) -> Self {
        Self::Data(error.to_string())
    }

    pub fn unknown_game(game: GameRef) -> Self {
        Self::UnknownGame(UnknownGameError { game })
    }

    pub fn missing_solution(number: u32) -> Self {
        Self::MissingSolution(MissingSolutionError { number })
    }
}

/// A game asked for by number, or the most recent one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameRef {
    Latest,
    Number(u32),
}

impl fmt::Display for GameRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Latest => f.write_str("latest game"),
            Self::Number(number) => write!(f, "game {number}"),
        }
    }
}

#[derive(Clone, Debug, thiserror::Error, thisslime::TracingError)]
#[error("{game} has not been recorded")]
#[event(level = WARN)]
pub struct UnknownGameError {
    #[field(print = Display)]
    pub game: GameRef,
}

#[derive(Clone, Debug, thiserror::Error, thisslime::TracingError)]
#[error("game {number} has no stored solution")]
#[event(level = WARN)]
pub struct MissingSolutionError {
    pub number: u32,
}
