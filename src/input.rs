/// What the user asked for by typing a line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    /// Plain text, sent to the current channel
    Say(String),
    Join(String),
    Part {
        channel: Option<String>,
        message: Option<String>,
    },
    Msg {
        target: String,
        message: String,
    },
    Nick(String),
    Quit(Option<String>),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InputError {
    #[error("nothing to send")]
    Empty,

    #[error("unknown command: /{0}")]
    Unknown(String),

    #[error("usage: {0}")]
    Usage(&'static str),
}

impl Intent {
    /// Parses a typed line
    ///
    /// Lines starting with `/` are commands, `//` escapes a leading slash
    pub fn parse(line: &str) -> Result<Self, InputError> {
        let line = line.trim_end_matches(&['\r', '\n'][..]);
        if line.trim().is_empty() {
            return Err(InputError::Empty);
        }

        let command = match line.strip_prefix('/') {
            Some(rest) if rest.starts_with('/') => return Ok(Self::Say(rest.to_string())),
            Some(rest) => rest,
            None => return Ok(Self::Say(line.to_string())),
        };

        let (head, tail) = split_head(command);
        let intent = match head {
            "join" | "j" => match split_head(tail.ok_or(InputError::Usage("/join <channel>"))?) {
                (channel, None) => Self::Join(channel.to_string()),
                _ => return Err(InputError::Usage("/join <channel>")),
            },

            "part" => match tail.map(split_head) {
                None => Self::Part {
                    channel: None,
                    message: None,
                },
                Some((channel, message)) if is_channel(channel) => Self::Part {
                    channel: Some(channel.to_string()),
                    message: message.map(ToString::to_string),
                },
                Some(..) => Self::Part {
                    channel: None,
                    message: tail.map(ToString::to_string),
                },
            },

            "msg" => match tail.map(split_head) {
                Some((target, Some(message))) => Self::Msg {
                    target: target.to_string(),
                    message: message.to_string(),
                },
                _ => return Err(InputError::Usage("/msg <target> <message>")),
            },

            "nick" => match tail.map(split_head) {
                Some((nick, None)) => Self::Nick(nick.to_string()),
                _ => return Err(InputError::Usage("/nick <name>")),
            },

            "quit" | "q" => Self::Quit(tail.map(ToString::to_string)),

            unknown => return Err(InputError::Unknown(unknown.to_string())),
        };
        Ok(intent)
    }
}

// splits off the first word, the rest is None when it is blank
fn split_head(input: &str) -> (&str, Option<&str>) {
    let input = input.trim();
    let mut iter = input.splitn(2, ' ');
    let head = iter.next().unwrap_or_default();
    let tail = iter.next().map(str::trim).filter(|s| !s.is_empty());
    (head, tail)
}

fn is_channel(input: &str) -> bool {
    input.starts_with(&['#', '&'][..])
}
