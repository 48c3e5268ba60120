use serde::{Deserialize, Serialize};

/// Which server to use and who to be on it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Irc {
    pub host: String,
    pub port: u16,
    pub nick: String,
    pub user: String,
    pub real: String,
    /// Joined once the server welcomes us
    pub channels: Vec<String>,
}

impl Default for Irc {
    fn default() -> Self {
        Self {
            host: "localhost".into(),
            port: 6667,
            nick: "irctf".into(),
            user: "irctf".into(),
            real: "irctf".into(),
            channels: vec![],
        }
    }
}
