pub mod poise;
pub use poise::Context;

pub mod serenity;

use crate::errors::Error;

pub type Result<T> = std::result::Result<T, Error>;
