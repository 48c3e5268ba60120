use super::{Generic, Join, Message, Numeric, ParseError, Part, Ping, Prefix, Privmsg, Tokens};

/// Commands with a dedicated shape
#[derive(Copy, Clone, Debug, PartialEq)]
enum Kind {
    Join,
    Part,
    Privmsg,
}

impl Kind {
    fn lookup(command: &str) -> Option<Self> {
        let kind = match command {
            "JOIN" => Self::Join,
            "PART" => Self::Part,
            "PRIVMSG" => Self::Privmsg,
            _ => return None,
        };
        Some(kind)
    }
}

/// Classifies a line, first match wins:
///
/// 1. a numeric reply code
/// 2. a bare `PING`
/// 3. a known command at position 1
/// 4. anything else is `Generic`
///
/// A `PING` or known command whose line ends with a space is malformed
pub fn classify(line: &str) -> Result<Message, ParseError> {
    let tokens = Tokens::split(line);

    if let Some(code) = numeric_code(&tokens) {
        return Ok(Message::Numeric(Numeric { code, tokens }));
    }

    if tokens.get(0) == Some("PING") {
        return no_trailing_space(tokens)
            .and_then(ping)
            .map(Message::Ping);
    }

    let kind = match tokens.get(1).and_then(Kind::lookup) {
        Some(kind) => kind,
        None => return Ok(Message::Generic(Generic { tokens })),
    };

    let tokens = no_trailing_space(tokens)?;
    match kind {
        Kind::Join => join(tokens).map(Message::Join),
        Kind::Part => part(tokens).map(Message::Part),
        Kind::Privmsg => privmsg(tokens).map(Message::Privmsg),
    }
}

fn no_trailing_space(tokens: Tokens) -> Result<Tokens, ParseError> {
    let ends_with_space = tokens.as_slice().last().map_or(false, String::is_empty);
    if ends_with_space {
        return Err(ParseError::new("line ends with a space", tokens));
    }
    Ok(tokens)
}

fn numeric_code(tokens: &Tokens) -> Option<u16> {
    if let Some(code) = tokens.get(2).and_then(parse_code) {
        return Some(code);
    }

    // `:<server> <code> <target> ...`
    match (tokens.get(0), tokens.get(1)) {
        (Some(prefix), Some(code)) if prefix.starts_with(':') && code.len() == 3 => {
            parse_code(code)
        }
        _ => None,
    }
}

fn parse_code(input: &str) -> Option<u16> {
    if input.is_empty() || !input.bytes().all(|c| c.is_ascii_digit()) {
        return None;
    }
    input.parse().ok().filter(|&code| code <= 999)
}

fn ping(tokens: Tokens) -> Result<Ping, ParseError> {
    match param(&tokens, 1) {
        Some(code) => Ok(Ping { code, tokens }),
        None => Err(ParseError::new("PING does not contain a code", tokens)),
    }
}

fn join(tokens: Tokens) -> Result<Join, ParseError> {
    match (user_nick(&tokens), param(&tokens, 2)) {
        (Some(nick), Some(channel)) => Ok(Join {
            channel,
            nick,
            tokens,
        }),
        (None, _) => Err(ParseError::new("malformed JOIN prefix", tokens)),
        (_, None) => Err(ParseError::new("JOIN does not contain a channel", tokens)),
    }
}

fn part(tokens: Tokens) -> Result<Part, ParseError> {
    match (user_nick(&tokens), param(&tokens, 2)) {
        (Some(nick), Some(channel)) => Ok(Part {
            channel,
            nick,
            message: tokens.trailing(3).filter(|s| !s.is_empty()),
            tokens,
        }),
        (None, _) => Err(ParseError::new("malformed PART prefix", tokens)),
        (_, None) => Err(ParseError::new("PART does not contain a channel", tokens)),
    }
}

fn privmsg(tokens: Tokens) -> Result<Privmsg, ParseError> {
    let target = tokens
        .get(2)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string);

    match (user_nick(&tokens), target, tokens.trailing(3)) {
        (Some(nick), Some(target), Some(message)) => Ok(Privmsg {
            nick,
            target,
            message,
            tokens,
        }),
        (None, ..) => Err(ParseError::new("malformed PRIVMSG prefix", tokens)),
        (_, None, _) => Err(ParseError::new("PRIVMSG does not contain a target", tokens)),
        (.., None) => Err(ParseError::new("PRIVMSG does not contain a message", tokens)),
    }
}

fn user_nick(tokens: &Tokens) -> Option<String> {
    match tokens.get(0).and_then(Prefix::parse)? {
        Prefix::User { nick, .. } => Some(nick),
        Prefix::Server { .. } => None,
    }
}

// a single parameter, which may be sent in trailing form: `JOIN :#channel`
fn param(tokens: &Tokens, nth: usize) -> Option<String> {
    tokens
        .get(nth)
        .map(|s| s.strip_prefix(':').unwrap_or(s))
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}
