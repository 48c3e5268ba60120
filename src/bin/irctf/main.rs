use anyhow::Context as _;
use irctf::{
    config::{self, Config, LoadError},
    format,
    input::{InputError, Intent},
    irc::{Client, ConnectionError, Message, Status},
    state::{Reaction, State},
};
use std::path::PathBuf;
use tokio::{io::AsyncBufReadExt, sync::mpsc};

const USAGE: &str = r##"
usage:
    irctf [run] [config]  -- connect using the configuration (default: irctf.toml)

    irctf help            -- show this help message

    irctf default-config  -- prints out the default configuration
                             you can redirect this to a file with:
                             irctf default-config > irctf.toml

once connected:
    /join <channel>            -- join, or switch to, a channel
    /part [channel] [message]  -- leave a channel (default: the current one)
    /msg <target> <message>    -- send a message to a nick or channel
    /nick <name>               -- change your nick
    /quit [message]            -- disconnect and exit
    anything else is sent to the current channel
"##;

enum Command {
    Run(PathBuf),
    DefaultConfig,
    Help,
}

impl Command {
    fn parse() -> Command {
        let mut args = std::env::args().skip(1);
        match args.next().as_deref() {
            None => Command::Run(config::CONFIG_FILE.into()),
            Some("run") => Command::Run(
                args.next()
                    .unwrap_or_else(|| config::CONFIG_FILE.into())
                    .into(),
            ),
            Some("default-config") => Command::DefaultConfig,
            Some("help") | Some("-h") | Some("--help") => Command::Help,
            Some(path) => Command::Run(path.into()),
        }
    }
}

fn init_logger(level: config::LogLevel) -> anyhow::Result<()> {
    if std::env::var_os("RUST_LOG").is_none() {
        std::env::set_var("RUST_LOG", format!("irctf={}", level));
    }

    let opts = alto_logger::Options::default()
        .with_time(alto_logger::options::TimeConfig::date_time_format("%c"));
    let file = alto_logger::FileLogger::timestamp(opts.clone(), "irctf.log")?;

    let logger = alto_logger::MultiLogger::new()
        .with(alto_logger::TermLogger::new(opts)?)
        .with(file);
    alto_logger::init(logger).map_err(|err| anyhow::anyhow!("cannot init logger: {:?}", err))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let path = match Command::parse() {
        Command::Run(path) => path,
        Command::DefaultConfig => {
            Config::print_default();
            return Ok(());
        }
        Command::Help => {
            println!("{}", USAGE);
            return Ok(());
        }
    };

    let config = match Config::load(&path).await {
        Ok(config) => config,
        Err(LoadError::NotFound(path)) => {
            Config::write_default(&path).await?;
            eprintln!(
                "{} wasn't found. created a new one. edit it and re-run",
                path.display()
            );
            std::process::exit(1);
        }
        Err(err) => {
            return Err(err).with_context(|| format!("cannot load '{}'", path.display()));
        }
    };

    init_logger(config.log_level)?;

    // stdin is read on a blocking thread that can't be cancelled, so don't wait for the runtime
    match run(config).await {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            log::error!("{:#}", err);
            std::process::exit(1);
        }
    }
}

// returns the exit code
async fn run(config: Config) -> anyhow::Result<i32> {
    let irc = &config.irc_config;

    let mut client = Client::new();
    client
        .connect(&irc.host, irc.port)
        .await
        .with_context(|| format!("cannot connect to {}:{}", irc.host, irc.port))?;
    client.nick(&irc.nick).await?;
    client.auth(&irc.user, &irc.real).await?;

    let mut state = State::new(irc.nick.as_str(), irc.channels.clone());
    let mut input = read_stdin();
    let mut poll = tokio::time::interval(config.poll_interval());

    loop {
        tokio::select! {
            _ = poll.tick() => {
                // everything read before the reader stopped is still queued
                let status = client.status();
                for msg in client.fetch() {
                    handle(&mut client, &mut state, msg).await;
                }

                if status == Status::Disconnected {
                    return Ok(exit_code(client.take_error()));
                }
            }

            Some(line) = input.recv() => match Intent::parse(&line) {
                Ok(intent) => {
                    if !perform(&mut client, &mut state, intent).await {
                        return Ok(0);
                    }
                }
                Err(InputError::Empty) => {}
                Err(err) => log::warn!("{}", err),
            },
        }
    }
}

// the client has already logged the error that ended the connection
fn exit_code(err: Option<ConnectionError>) -> i32 {
    match err {
        Some(err) => {
            log::debug!("exiting after: {:?}", err);
            1
        }
        None => {
            log::info!("disconnected");
            0
        }
    }
}

async fn handle(client: &mut Client, state: &mut State, msg: Message) {
    log::trace!("{}: {:?}", msg.kind(), msg);

    for reaction in state.observe(&msg) {
        let result = match &reaction {
            Reaction::Pong(code) => client.pong(code).await,
            Reaction::Join(channel) => client.join(channel).await,
            Reaction::Nick(nick) => client.nick(nick).await,
        };
        if let Err(err) = result {
            log::error!("cannot send {:?}: {}", reaction, err);
        }
    }

    if let Some(line) = format::describe(&msg) {
        if format::is_alarming(&msg) {
            log::warn!("{}", line)
        } else {
            log::info!("{}", line)
        }
    }
}

// returns false once we should stop
async fn perform(client: &mut Client, state: &mut State, intent: Intent) -> bool {
    let result = match intent {
        Intent::Say(text) => match state.current() {
            Some(channel) => {
                // the server doesn't echo our own messages
                log::info!("[{}] <{}> {}", channel, state.nick(), text);
                client.privmsg(channel, &text).await
            }
            None => {
                log::warn!("not in a channel, /join one first");
                return true;
            }
        },

        Intent::Join(channel) => {
            if state.switch(&channel) {
                log::info!("switched to {}", channel);
                return true;
            }
            client.join(&channel).await
        }

        Intent::Part { channel, message } => {
            let channel = match channel.as_deref().or_else(|| state.current()) {
                Some(channel) => channel.to_string(),
                None => {
                    log::warn!("not in a channel");
                    return true;
                }
            };
            match message {
                Some(message) => client.part_with_message(&channel, &message).await,
                None => client.part(&channel).await,
            }
        }

        Intent::Msg { target, message } => {
            log::info!("[{}] <{}> {}", target, state.nick(), message);
            client.privmsg(&target, &message).await
        }

        Intent::Nick(nick) => {
            let result = client.nick(&nick).await;
            if result.is_ok() {
                state.set_nick(nick);
            }
            result
        }

        Intent::Quit(message) => {
            let result = match message {
                Some(message) => client.quit_with_message(&message).await,
                None => client.quit().await,
            };
            if let Err(err) = result {
                log::error!("cannot quit cleanly: {}", err);
            }
            return false;
        }
    };

    if let Err(err) = result {
        log::error!("{}", err);
    }
    true
}

fn read_stdin() -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel(16);
    tokio::spawn(async move {
        let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    if tx.send(line).await.is_err() {
                        break;
                    }
                }
                Ok(None) => break,
                Err(err) => {
                    log::error!("cannot read stdin: {}", err);
                    break;
                }
            }
        }
    });
    rx
}
