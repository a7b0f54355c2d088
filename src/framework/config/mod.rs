use std::ops::Deref;

mod app;
pub use app::{AppConfig as Config, SummaryConfig};

pub mod env;
pub use env::EnvConfig;

#[derive(Debug, thiserror::Error, thisslime::TracingError)]
pub enum Error {
    #[error("problem loading environment: {0}")]
    #[event(level = ERROR)]
    Env(#[from] env::Error),

    #[error("problem loading config file: {0}")]
    App(#[from] app::Error),
}

/// Everything read at startup, before anything connects.
#[derive(Debug, Clone)]
pub struct ConfigSetup {
    pub app: Config,
    pub env: EnvConfig,
    cli: crate::Cli,
}

impl ConfigSetup {
    #[tracing::instrument(skip_all, name = "config")]
    pub fn load(cli: crate::Cli) -> Result<Self, Error> {
        let mut env = EnvConfig::load()?;

        if let Some(path) = cli.config_path.clone() {
            env.override_config_file(path);
        }

        tracing::debug!(path = env.config_file(), "loading config file");
        let app = Config::load(env.config_file())?;
        tracing::info!("config loaded");

        Ok(Self { app, env, cli })
    }

    pub fn mongodb(&self) -> mongodb::options::ClientOptions {
        mongodb::options::ClientOptions::builder()
            .app_name("connectionsbot".to_owned())
            .hosts(vec![self.env.db_url().clone()])
            .build()
    }

    pub fn token(&self) -> &str {
        self.env.token()
    }

    pub fn cli(&self) -> &crate::Cli {
        &self.cli
    }

    pub fn finish(self) -> Config {
        self.app
    }
}

impl Deref for ConfigSetup {
    type Target = Config;

    fn deref(&self) -> &Self::Target {
        &self.app
    }
}
