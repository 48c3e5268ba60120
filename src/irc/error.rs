use super::Tokens;

/// A failure of the underlying connection
///
/// These are fatal: the session that produced one is over.
#[derive(Debug, thiserror::Error)]
pub enum ConnectionError {
    /// The host could not be resolved to any address
    #[error("cannot resolve '{host}:{port}'")]
    Resolve {
        host: String,
        port: u16,
        #[source]
        source: std::io::Error,
    },

    /// Every resolved address refused the connection
    #[error("cannot connect to '{host}:{port}'")]
    Connect {
        host: String,
        port: u16,
        #[source]
        source: std::io::Error,
    },

    /// Reading from the stream failed
    #[error("cannot read from the connection")]
    Read(#[source] std::io::Error),

    /// Writing to the stream failed
    #[error("cannot write to the connection")]
    Write(#[source] std::io::Error),
}

/// A line that looked like a known command but was missing something
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{reason} : {{ {} }}", .tokens.as_slice().join(", "))]
pub struct ParseError {
    pub reason: &'static str,
    pub tokens: Tokens,
}

impl ParseError {
    pub(super) fn new(reason: &'static str, tokens: Tokens) -> Self {
        Self { reason, tokens }
    }
}

/// Errors returned by the [`Client`](./struct.Client.html)
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Connection(#[from] ConnectionError),

    #[error("not connected")]
    NotConnected,
}
