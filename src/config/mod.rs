use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

mod irc;
pub use irc::Irc;

mod log_level;
pub use log_level::LogLevel;

/// The configuration file used when none is given
pub const CONFIG_FILE: &str = "irctf.toml";

static DEFAULT_CONFIG: &str = include_str!("../../default.toml");

/// Why a configuration couldn't be loaded
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("'{}' was not found", .0.display())]
    NotFound(PathBuf),

    #[error("cannot read '{}'", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration")]
    InvalidSyntax(#[from] toml::de::Error),

    #[error("'{0}' cannot be empty")]
    Missing(&'static str),
}

/// Configuration for the client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// The log level to use for the console output
    pub log_level: LogLevel,
    /// How often, in milliseconds, new messages are fetched
    pub poll_interval_ms: u64,
    /// The irc configuration
    pub irc_config: Irc,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: LogLevel::default(),
            poll_interval_ms: 50,
            irc_config: Irc::default(),
        }
    }
}

impl Config {
    /// Loads the configuration at `path`
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let data = match tokio::fs::read_to_string(path).await {
            Ok(data) => data,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Err(LoadError::NotFound(path.into()))
            }
            Err(source) => {
                return Err(LoadError::Io {
                    path: path.into(),
                    source,
                })
            }
        };
        Self::parse(&data)
    }

    pub fn parse(data: &str) -> Result<Self, LoadError> {
        let this: Self = toml::from_str(data)?;
        this.validate()?;
        Ok(this)
    }

    /// Writes the default configuration to `path`
    pub async fn write_default(path: impl AsRef<Path>) -> anyhow::Result<()> {
        use anyhow::Context as _;
        let path = path.as_ref();
        tokio::fs::write(path, DEFAULT_CONFIG)
            .await
            .with_context(|| format!("cannot write default config to '{}'", path.display()))
    }

    /// Print out the default configuration
    pub fn print_default() {
        println!("{}", DEFAULT_CONFIG)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    fn validate(&self) -> Result<(), LoadError> {
        let Irc {
            host, nick, user, ..
        } = &self.irc_config;

        let required = [
            ("irc_config.host", host),
            ("irc_config.nick", nick),
            ("irc_config.user", user),
        ];
        match required.iter().find(|(_, val)| val.trim().is_empty()) {
            Some((key, _)) => Err(LoadError::Missing(*key)),
            None => Ok(()),
        }
    }
}
