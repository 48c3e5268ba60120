/// The origin of a line relayed by the server
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Prefix {
    User {
        nick: String,
        user: String,
        host: String,
    },
    Server {
        host: String,
    },
}

impl Prefix {
    /// Parses a `:nick!user@host` or `:server` token
    ///
    /// Returns None when the leading `:` is missing, or when the token starts
    /// out as a user prefix (has a `!`) but doesn't complete the shape.
    pub fn parse(input: &str) -> Option<Self> {
        let input = input.strip_prefix(':').filter(|s| !s.is_empty())?;

        let bang = match input.find('!') {
            Some(bang) => bang,
            None => {
                return Some(Self::Server {
                    host: input.to_string(),
                })
            }
        };

        let (nick, rest) = (&input[..bang], &input[bang + 1..]);
        let at = rest.find('@')?;
        let (user, host) = (&rest[..at], &rest[at + 1..]);
        if nick.is_empty() || user.is_empty() || host.is_empty() {
            return None;
        }

        Some(Self::User {
            nick: nick.to_string(),
            user: user.to_string(),
            host: host.to_string(),
        })
    }

    pub fn nick(&self) -> Option<&str> {
        match self {
            Self::User { nick, .. } => Some(nick),
            Self::Server { .. } => None,
        }
    }
}
