use super::{numeric, parser, Command, ParseError};
use std::fmt;

/// A line split on single spaces
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Tokens(Vec<String>);

impl Tokens {
    pub fn split(line: &str) -> Self {
        Self(line.split(' ').map(ToString::to_string).collect())
    }

    pub fn get(&self, nth: usize) -> Option<&str> {
        self.0.get(nth).map(|s| s.as_str())
    }

    /// Rejoins everything from `from` onward, dropping a single leading `:`
    pub fn trailing(&self, from: usize) -> Option<String> {
        let (head, rest) = self.0.get(from..)?.split_first()?;
        let head = head.strip_prefix(':').unwrap_or(head);
        Some(rest.iter().fold(head.to_string(), |mut acc, token| {
            acc.push(' ');
            acc.push_str(token);
            acc
        }))
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<String>> for Tokens {
    fn from(tokens: Vec<String>) -> Self {
        Self(tokens)
    }
}

impl fmt::Display for Tokens {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join(" "))
    }
}

/// Where a private message should be answered
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Target<'a> {
    Channel(&'a str),
    Private(&'a str),
}

/// A classified line from the server
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Message {
    Numeric(Numeric),
    Join(Join),
    Part(Part),
    Ping(Ping),
    Privmsg(Privmsg),
    Generic(Generic),
}

impl Message {
    /// Classifies a single line, without its `\r\n`
    pub fn parse(line: &str) -> Result<Self, ParseError> {
        parser::classify(line)
    }

    pub fn tokens(&self) -> &Tokens {
        match self {
            Self::Numeric(msg) => &msg.tokens,
            Self::Join(msg) => &msg.tokens,
            Self::Part(msg) => &msg.tokens,
            Self::Ping(msg) => &msg.tokens,
            Self::Privmsg(msg) => &msg.tokens,
            Self::Generic(msg) => &msg.tokens,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Numeric(..) => "numeric",
            Self::Join(..) => "join",
            Self::Part(..) => "part",
            Self::Ping(..) => "ping",
            Self::Privmsg(..) => "privmsg",
            Self::Generic(..) => "generic",
        }
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.tokens(), f)
    }
}

/// A numeric reply, e.g. `:irc.example.net 001 museun :Welcome`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Numeric {
    pub code: u16,
    pub tokens: Tokens,
}

impl Numeric {
    /// The symbolic name of this reply, if it is a well-known one
    pub fn name(&self) -> Option<&'static str> {
        numeric::name(self.code)
    }

    pub fn is_error(&self) -> bool {
        numeric::is_error(self.code)
    }
}

/// Someone joined a channel
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Join {
    pub channel: String,
    pub nick: String,
    pub tokens: Tokens,
}

/// Someone left a channel
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Part {
    pub channel: String,
    pub nick: String,
    pub message: Option<String>,
    pub tokens: Tokens,
}

/// The server is checking the connection
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ping {
    pub code: String,
    pub tokens: Tokens,
}

impl Ping {
    /// The reply the server expects for this ping
    pub fn pong(&self) -> Command<'_> {
        Command::Pong(&self.code)
    }
}

/// A message sent to a channel or directly to us
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Privmsg {
    pub nick: String,
    pub target: String,
    pub message: String,
    pub tokens: Tokens,
}

impl Privmsg {
    pub fn is_channel(&self) -> bool {
        self.target.starts_with(&['#', '&'][..])
    }

    /// Where a reply to this message should go
    ///
    /// Channel messages are answered in the channel, private ones to the sender
    pub fn reply_target(&self) -> Target<'_> {
        if self.is_channel() {
            Target::Channel(&self.target)
        } else {
            Target::Private(&self.nick)
        }
    }
}

/// Any line we don't have a special shape for
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Generic {
    pub tokens: Tokens,
}

impl Generic {
    /// The command token, skipping the prefix when there is one
    pub fn command(&self) -> Option<&str> {
        match self.tokens.get(0) {
            Some(head) if head.starts_with(':') => self.tokens.get(1),
            head => head,
        }
    }
}
