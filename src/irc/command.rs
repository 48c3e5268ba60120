use std::fmt;

/// An outbound command
///
/// `Display` renders the line without its `\r\n`, [`Command::encode`] adds it
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command<'a> {
    Nick(&'a str),
    User { username: &'a str, realname: &'a str },
    Join(&'a str),
    Part { channel: &'a str, message: Option<&'a str> },
    Privmsg { target: &'a str, message: &'a str },
    Pong(&'a str),
    Quit(Option<&'a str>),
}

impl<'a> Command<'a> {
    /// The bytes to put on the wire, including the trailing `\r\n`
    pub fn encode(&self) -> Vec<u8> {
        let mut line = self.to_string();
        line.push_str("\r\n");
        line.into_bytes()
    }
}

impl<'a> fmt::Display for Command<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nick(nick) => write!(f, "NICK {}", nick),
            Self::User { username, realname } => write!(f, "USER {} 0 * :{}", username, realname),
            Self::Join(channel) => write!(f, "JOIN {}", channel),
            Self::Part {
                channel,
                message: Some(message),
            } => write!(f, "PART {} :{}", channel, message),
            Self::Part {
                channel,
                message: None,
            } => write!(f, "PART {}", channel),
            Self::Privmsg { target, message } => write!(f, "PRIVMSG {} :{}", target, message),
            Self::Pong(code) => write!(f, "PONG {}", code),
            Self::Quit(Some(message)) => write!(f, "QUIT :{}", message),
            Self::Quit(None) => f.write_str("QUIT"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode() {
        let tests: &[(Command<'_>, &str)] = &[
            (Command::Nick("irctf"), "NICK irctf\r\n"),
            (
                Command::User {
                    username: "irctf",
                    realname: "irc test framework",
                },
                "USER irctf 0 * :irc test framework\r\n",
            ),
            (Command::Join("#test"), "JOIN #test\r\n"),
            (
                Command::Part {
                    channel: "#test",
                    message: None,
                },
                "PART #test\r\n",
            ),
            (
                Command::Part {
                    channel: "#test",
                    message: Some("gone fishing"),
                },
                "PART #test :gone fishing\r\n",
            ),
            (
                Command::Privmsg {
                    target: "#test",
                    message: "hello there world",
                },
                "PRIVMSG #test :hello there world\r\n",
            ),
            (Command::Pong("abc123"), "PONG abc123\r\n"),
            (Command::Quit(None), "QUIT\r\n"),
            (Command::Quit(Some("bye all")), "QUIT :bye all\r\n"),
        ];

        for (command, expected) in tests {
            assert_eq!(
                command.encode(),
                expected.as_bytes(),
                "{}",
                expected.escape_debug()
            );
        }
    }

    #[test]
    fn pong_from_ping() {
        let msg = crate::irc::Message::parse("PING :abc123").unwrap();
        match msg {
            crate::irc::Message::Ping(ping) => {
                assert_eq!(ping.pong().encode(), b"PONG abc123\r\n".to_vec());
            }
            msg => panic!("expected ping, got {:?}", msg),
        }
    }
}
