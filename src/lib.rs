/*!
irctf. an irc client

The [`irc`](./irc/index.html) module holds the client: a background task reads
and classifies lines, [`Client::fetch`](./irc/struct.Client.html#method.fetch)
hands them over in batches.
*/

/// Configuration
pub mod config;
pub use config::Config;

/// IRC client and types
pub mod irc;

/// Formatting utilities
pub mod format;

/// Typed user input
pub mod input;

/// Front-end session state
pub mod state;
