use crate::irc::{Join, Message, Part, Privmsg};

/// Renders a message as a line for the log, if it is worth showing
pub fn describe(msg: &Message) -> Option<String> {
    let line = match msg {
        Message::Privmsg(Privmsg {
            nick,
            target,
            message,
            ..
        }) => format!("[{}] <{}> {}", target, nick, message),

        Message::Join(Join { channel, nick, .. }) => format!("[{}] --> {} joined", channel, nick),

        Message::Part(Part {
            channel,
            nick,
            message: Some(message),
            ..
        }) => format!("[{}] <-- {} left ({})", channel, nick, message),

        Message::Part(Part { channel, nick, .. }) => format!("[{}] <-- {} left", channel, nick),

        Message::Numeric(numeric) => {
            let text = numeric.tokens.trailing(3).unwrap_or_default();
            match numeric.name() {
                Some(name) => format!("({}) {}", name, text),
                None => format!("({:03}) {}", numeric.code, text),
            }
        }

        Message::Generic(generic) if generic.tokens.to_string().trim().is_empty() => return None,
        Message::Generic(generic) => generic.tokens.to_string(),

        Message::Ping(..) => return None,
    };
    Some(line)
}

/// Whether a numeric reply should be shown as a warning
pub fn is_alarming(msg: &Message) -> bool {
    matches!(msg, Message::Numeric(numeric) if numeric.is_error())
}
