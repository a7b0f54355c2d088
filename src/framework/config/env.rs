use mongodb::options::ServerAddress;

pub const TOKEN: &str = "CONNECTIONSBOT_TOKEN";
pub const DB_URL: &str = "CONNECTIONSBOT_DB_URL";
pub const CONFIG: &str = "CONNECTIONSBOT_CONFIG";

pub const DEFAULT_CONFIG_FILE: &str = "./connectionsbot.toml";

#[derive(Debug, Clone)]
pub struct EnvConfig {
    token: String,
    db_url: ServerAddress,
    config_file: String,
}

impl EnvConfig {
    /// Reads the environment, loading `.env` first if there is one.
    pub fn load() -> Result<Self, Error> {
        dotenvy::dotenv().ok();

        Self::from_partial(Partial {
            token: std::env::var(TOKEN).ok(),
            db_url: std::env::var(DB_URL).ok(),
            config_file: std::env::var(CONFIG).ok(),
        })
    }

    fn from_partial(partial: Partial) -> Result<Self, Error> {
        let token = partial
            .token
            .filter(|token| !token.is_empty())
            .ok_or(Error {
                key: TOKEN,
                message: "not set",
            })?;

        let db_url = partial
            .db_url
            .ok_or(Error {
                key: DB_URL,
                message: "not set",
            })?
            .parse()
            .map_err(|_| Error {
                key: DB_URL,
                message: "not a valid db url",
            })?;

        Ok(Self {
            token,
            db_url,
            config_file: partial
                .config_file
                .unwrap_or_else(|| DEFAULT_CONFIG_FILE.to_owned()),
        })
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn db_url(&self) -> &ServerAddress {
        &self.db_url
    }

    pub fn config_file(&self) -> &str {
        &self.config_file
    }

    pub fn override_config_file(&mut self, path: String) {
        self.config_file = path;
    }
}

struct Partial {
    token: Option<String>,
    db_url: Option<String>,
    config_file: Option<String>,
}

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
#[error("couldn't load environment variable '{key}': {message}")]
pub struct Error {
    key: &'static str,
    message: &'static str,
}
