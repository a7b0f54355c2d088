use std::future::Future;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use url::Url;

/// A day's answer as published by the puzzle provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Solution {
    /// The puzzle number this answer belongs to, when the provider says.
    #[serde(default)]
    pub id: Option<u32>,

    pub categories: Vec<SolutionCategory>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolutionCategory {
    pub title: String,
    pub cards: Vec<Card>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub content: String,

    /// Slot on the 4x4 board, `0..16`, row by row.
    pub position: usize,
}

impl Solution {
    pub fn category_titles(&self) -> impl Iterator<Item = &str> {
        self.categories.iter().map(|category| category.title.as_str())
    }
}

pub trait SolutionSource {
    fn solution(
        &self,
        date: NaiveDate,
    ) -> impl Future<Output = Result<Solution, SolutionError>> + Send;
}

/// Client for the New York Times connections endpoint.
#[derive(Debug, Clone)]
pub struct Nyt {
    client: reqwest::Client,
    base: Url,
}

impl Nyt {
    pub const DEFAULT_BASE: &'static str = "https://www.nytimes.com/svc/connections/v2/";

    pub fn new(base: Url) -> Self {
        Self {
            client: reqwest::Client::new(),
            base,
        }
    }

    pub fn url_for(&self, date: NaiveDate) -> Result<Url, SolutionError> {
        Ok(self.base.join(&format!("{}.json", date.format("%Y-%m-%d")))?)
    }
}

impl Default for Nyt {
    fn default() -> Self {
        Self::new(Url::parse(Self::DEFAULT_BASE).expect("hard-coded url should be valid"))
    }
}

impl SolutionSource for Nyt {
    #[instrument(skip(self))]
    async fn solution(&self, date: NaiveDate) -> Result<Solution, SolutionError> {
        let url = self.url_for(date)?;
        debug!(%url, "fetching solution");

        let solution = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json::<Solution>()
            .await?;

        Ok(solution)
    }
}

#[derive(Debug, thiserror::Error, thisslime::TracingError)]
pub enum SolutionError {
    #[error("error from reqwest: {0}")]
    #[event(level = ERROR)]
    Reqwest(#[from] reqwest::Error),

    #[error("bad solution url: {0}")]
    #[event(level = ERROR)]
    Url(#[from] url::ParseError),
}

#[cfg(test)]
pub(crate) fn test_solution() -> Solution {
    serde_json::from_str(include_str!("./tests/solution.json")).expect("should be valid json")
}
