mod client;
pub use client::{Client, Status};

mod command;
pub use command::Command;

mod connection;
pub use connection::{Connection, Reader, Writer};

mod error;
pub use error::{ConnectionError, Error, ParseError};

mod framer;
pub use framer::{Framer, Lines};

mod message;
pub use message::{Generic, Join, Message, Numeric, Part, Ping, Privmsg, Target, Tokens};

pub mod numeric;

mod parser;

mod prefix;
pub use prefix::Prefix;

mod queue;
pub use queue::Queue;
