//! Connections puzzle engine: the board, guess checking, scoring, and an
//! agent that plays the puzzle, plus the storage and HTTP collaborators the
//! bot wires together.

pub mod agent;
pub mod board;
pub mod data;
pub mod guess;
pub mod play;
pub mod score;
pub mod solution;
pub mod transcript;

mod error;
pub use error::{ConnectionsError as Error, GameRef, MissingSolutionError, UnknownGameError};

mod client;
pub use client::{Connections, PlayOptions, RecordedScore, Remaining, ScorePost, Summary, ACTIVE_DAYS};
