use std::{collections::HashMap, time::Duration};

use rand::seq::IteratorRandom;
use serde::{Deserialize, Serialize};
use tracing::warn;
use url::Url;

use connections::{agent, solution, PlayOptions};

mod bot;
pub use bot::BotConfig;

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct AppConfig {
    pub bot: BotConfig,
    #[serde(default)]
    pub logs: LogsConfig,
    pub agent: AgentConfig,
    #[serde(default)]
    pub solution: SolutionConfig,
    #[serde(default)]
    pub summary: SummaryConfig,
}

impl AppConfig {
    pub fn load(path: &str) -> Result<Self, Error> {
        ::config::Config::builder()
            .add_source(::config::File::new(path, ::config::FileFormat::Toml))
            .build()
            .map_err(Error::Read)?
            .try_deserialize()
            .map_err(Error::Parse)
    }
}

impl std::fmt::Display for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = toml::to_string_pretty(self).map_err(|_| std::fmt::Error)?;
        f.write_str(&text)
    }
}

#[derive(Debug, thiserror::Error, thisslime::TracingError)]
pub enum Error {
    #[error("file read error: {0}")]
    #[event(level = ERROR)]
    Read(::config::ConfigError),

    #[error("parsing error: {0}")]
    #[event(level = ERROR)]
    Parse(::config::ConfigError),
}

#[derive(Deserialize, Serialize, Debug, Clone, Default)]
pub struct LogsConfig {
    #[serde(default)]
    flavor_texts: Vec<String>,
}

impl LogsConfig {
    pub fn flavor_text(&self) -> Option<&str> {
        let flavor_text = self
            .flavor_texts
            .iter()
            .choose(&mut rand::thread_rng())
            .map(|s| s.as_str());

        if flavor_text.is_none() {
            warn!("no flavor texts provided in config :(");
        }

        flavor_text
    }
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct AgentConfig {
    #[serde(default = "AgentConfig::default_host")]
    host: Url,
    model: String,
    #[serde(default = "AgentConfig::default_timeout_secs")]
    timeout_secs: u64,
    system_prompt: Option<String>,
    #[serde(default = "enabled")]
    carry_history: bool,
    #[serde(default = "enabled")]
    auto_play: bool,
}

fn enabled() -> bool {
    true
}

impl AgentConfig {
    fn default_host() -> Url {
        Url::parse(agent::Ollama::DEFAULT_HOST).expect("hard-coded url should be valid")
    }

    const fn default_timeout_secs() -> u64 {
        60 * 60
    }

    pub fn host(&self) -> &Url {
        &self.host
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn auto_play(&self) -> bool {
        self.auto_play
    }

    pub fn play_options(&self) -> PlayOptions {
        let mut options = PlayOptions {
            carry_history: self.carry_history,
            ..PlayOptions::default()
        };

        if let Some(prompt) = &self.system_prompt {
            options.system_prompt.clone_from(prompt);
        }

        options
    }

    pub fn build(&self) -> Result<agent::Ollama, agent::AgentError> {
        agent::Ollama::new(&self.host, &self.model, self.timeout())
    }
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct SolutionConfig {
    base: Url,
}

impl SolutionConfig {
    pub fn build(&self) -> solution::Nyt {
        solution::Nyt::new(self.base.clone())
    }
}

impl Default for SolutionConfig {
    fn default() -> Self {
        Self {
            base: Url::parse(solution::Nyt::DEFAULT_BASE).expect("hard-coded url should be valid"),
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Default)]
pub struct SummaryConfig {
    footer: Option<String>,
    #[serde(default)]
    display_names: HashMap<String, String>,
}

impl SummaryConfig {
    pub fn footer(&self) -> Option<&str> {
        self.footer.as_deref().filter(|footer| !footer.is_empty())
    }

    /// The configured display name for a username, or the username itself.
    pub fn display_name<'a>(&'a self, username: &'a str) -> &'a str {
        self.display_names
            .get(&username.to_lowercase())
            .map_or(username, String::as_str)
    }
}
