use crate::irc::{Join, Message, Numeric, Part};

/// Something the front-end should send in response to a message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reaction {
    Pong(String),
    Join(String),
    Nick(String),
}

/// What the front-end knows about its own session
///
/// The client doesn't track our nick, so self joins and parts are recognized here
#[derive(Debug, Clone)]
pub struct State {
    nick: String,
    autojoin: Vec<String>,
    channels: Vec<String>,
    current: Option<String>,
}

impl State {
    pub fn new(nick: impl Into<String>, autojoin: Vec<String>) -> Self {
        Self {
            nick: nick.into(),
            autojoin,
            channels: vec![],
            current: None,
        }
    }

    pub fn nick(&self) -> &str {
        &self.nick
    }

    pub fn set_nick(&mut self, nick: impl Into<String>) {
        self.nick = nick.into();
    }

    pub fn channels(&self) -> &[String] {
        &self.channels
    }

    /// The channel plain text is sent to
    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }

    /// Makes `channel` current, if we're in it
    pub fn switch(&mut self, channel: &str) -> bool {
        match self.channels.iter().find(|c| same(c, channel)) {
            Some(channel) => {
                self.current.replace(channel.clone());
                true
            }
            None => false,
        }
    }

    pub fn is_self(&self, nick: &str) -> bool {
        same(&self.nick, nick)
    }

    /// Updates what we know from `msg`, returning anything that has to be sent back
    pub fn observe(&mut self, msg: &Message) -> Vec<Reaction> {
        match msg {
            Message::Ping(ping) => vec![Reaction::Pong(ping.code.clone())],

            // the server tells us which nick we ended up with
            Message::Numeric(Numeric { code: 1, tokens }) => {
                if let Some(nick) = tokens.get(2).filter(|s| !s.is_empty()) {
                    self.nick = nick.to_string();
                }
                self.autojoin.iter().cloned().map(Reaction::Join).collect()
            }

            Message::Numeric(Numeric { code: 433, tokens }) => {
                let taken = tokens.get(3).unwrap_or(&self.nick);
                let nick = format!("{}_", taken);
                log::info!("our nickname is taken, changing to: {}", nick);
                self.nick = nick.clone();
                vec![Reaction::Nick(nick)]
            }

            Message::Join(Join { channel, nick, .. }) if self.is_self(nick) => {
                log::debug!("joined {}", channel);
                if !self.channels.iter().any(|c| same(c, channel)) {
                    self.channels.push(channel.clone());
                }
                self.current.replace(channel.clone());
                vec![]
            }

            Message::Part(Part { channel, nick, .. }) if self.is_self(nick) => {
                log::debug!("left {}", channel);
                self.channels.retain(|c| !same(c, channel));
                if self.current.as_deref().map_or(false, |c| same(c, channel)) {
                    self.current = self.channels.last().cloned();
                }
                vec![]
            }

            Message::Numeric(..)
            | Message::Join(..)
            | Message::Part(..)
            | Message::Privmsg(..)
            | Message::Generic(..) => vec![],
        }
    }
}

// nicks and channels are case-insensitive
fn same(left: &str, right: &str) -> bool {
    left.eq_ignore_ascii_case(right)
}
