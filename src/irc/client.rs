use super::*;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::io::{AsyncRead, AsyncWrite, WriteHalf};
use tokio::net::TcpStream;
use tokio::sync::Notify;
use tokio::task::JoinHandle;

/// Where the client is in its connection lifecycle
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Status {
    Disconnected,
    Connecting,
    Connected,
    Disconnecting,
}

impl Default for Status {
    fn default() -> Self {
        Self::Disconnected
    }
}

#[derive(Debug, Default)]
struct Shared {
    queue: Queue,
    status: Mutex<Status>,
    error: Mutex<Option<ConnectionError>>,
}

impl Shared {
    fn status(&self) -> Status {
        *lock(&self.status)
    }

    fn set_status(&self, status: Status) {
        log::debug!("status: {:?}", status);
        *lock(&self.status) = status
    }

    /// Called by the reader when it stops on its own
    fn finished(&self) {
        let mut status = lock(&self.status);
        // a local quit owns the rest of the transition
        if let Status::Connecting | Status::Connected = *status {
            log::debug!("status: {:?}", Status::Disconnected);
            *status = Status::Disconnected;
        }
    }

    fn failed(&self, err: ConnectionError) {
        log::error!("connection lost: {}", err);
        lock(&self.error).replace(err);
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

struct Session {
    quit: Arc<Notify>,
    reader: JoinHandle<()>,
}

impl Session {
    async fn stop(self) {
        self.quit.notify_one();
        if let Err(err) = self.reader.await {
            log::error!("reader task failed: {}", err);
        }
    }
}

/// An IRC client
///
/// Lines are read and classified on a background task. Use
/// [`fetch`](#method.fetch) to take whatever has arrived so far.
///
/// ```no_run
/// # async fn demo() -> Result<(), irctf::irc::Error> {
/// use irctf::irc::{Client, Message};
///
/// let mut client = Client::new();
/// client.connect("localhost", 6667).await?;
/// client.nick("irctf").await?;
/// client.auth("irctf", "irc test framework").await?;
///
/// for msg in client.fetch() {
///     if let Message::Ping(ping) = msg {
///         client.pong(&ping.code).await?;
///     }
/// }
/// # Ok(())
/// # }
/// ```
pub struct Client<T = TcpStream> {
    shared: Arc<Shared>,
    writer: Option<Writer<WriteHalf<T>>>,
    session: Option<Session>,
}

impl<T> Default for Client<T> {
    fn default() -> Self {
        Self {
            shared: Arc::default(),
            writer: None,
            session: None,
        }
    }
}

impl Client<TcpStream> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Connects to `host:port` and starts reading from it
    ///
    /// Does nothing if the client is already connected
    pub async fn connect(&mut self, host: &str, port: u16) -> Result<(), Error> {
        if !self.begin().await {
            return Ok(());
        }

        log::info!("connecting to {}:{}", host, port);
        match Connection::establish(host, port).await {
            Ok(conn) => {
                self.start(conn);
                Ok(())
            }
            Err(err) => {
                self.shared.set_status(Status::Disconnected);
                Err(err.into())
            }
        }
    }
}

impl<T> Client<T>
where
    T: AsyncRead + AsyncWrite + Send + 'static,
{
    /// Starts a session on an already open stream
    ///
    /// Does nothing if the client is already connected
    pub async fn attach(&mut self, stream: T) -> Result<(), Error> {
        if self.begin().await {
            self.start(Connection::from_read_write(stream));
        }
        Ok(())
    }

    pub async fn nick(&mut self, name: &str) -> Result<(), Error> {
        self.send(Command::Nick(name)).await
    }

    pub async fn auth(&mut self, username: &str, realname: &str) -> Result<(), Error> {
        self.send(Command::User { username, realname }).await
    }

    pub async fn join(&mut self, channel: &str) -> Result<(), Error> {
        self.send(Command::Join(channel)).await
    }

    pub async fn part(&mut self, channel: &str) -> Result<(), Error> {
        self.send(Command::Part {
            channel,
            message: None,
        })
        .await
    }

    pub async fn part_with_message(&mut self, channel: &str, message: &str) -> Result<(), Error> {
        self.send(Command::Part {
            channel,
            message: Some(message),
        })
        .await
    }

    pub async fn privmsg(&mut self, target: &str, message: &str) -> Result<(), Error> {
        self.send(Command::Privmsg { target, message }).await
    }

    pub async fn pong(&mut self, code: &str) -> Result<(), Error> {
        self.send(Command::Pong(code)).await
    }

    pub async fn quit(&mut self) -> Result<(), Error> {
        self.disconnect(None).await
    }

    pub async fn quit_with_message(&mut self, message: &str) -> Result<(), Error> {
        self.disconnect(Some(message)).await
    }

    /// Sends any command
    ///
    /// A failed write ends the connection
    pub async fn send(&mut self, command: Command<'_>) -> Result<(), Error> {
        if let Command::Quit(message) = command {
            return self.disconnect(message).await;
        }

        let writer = match (self.status(), self.writer.as_mut()) {
            (Status::Connected, Some(writer)) => writer,
            _ => return Err(Error::NotConnected),
        };

        let result = writer.send_command(&command).await;
        if let Err(err) = result {
            log::error!("cannot send '{}': {}", command, err);
            self.teardown().await;
            return Err(err.into());
        }
        Ok(())
    }

    /// Takes every message received since the last call
    pub fn fetch(&self) -> Vec<Message> {
        self.shared.queue.fetch()
    }

    pub fn status(&self) -> Status {
        self.shared.status()
    }

    /// Takes the error that ended the last connection, if there was one
    pub fn take_error(&self) -> Option<ConnectionError> {
        lock(&self.shared.error).take()
    }

    // returns whether a new session should be started
    async fn begin(&mut self) -> bool {
        match self.status() {
            Status::Disconnected => {}
            status => {
                log::debug!("not connecting, client is {:?}", status);
                return false;
            }
        }

        // the reader of the last session has already stopped by now
        self.writer.take();
        if let Some(session) = self.session.take() {
            session.stop().await;
        }

        lock(&self.shared.error).take();
        self.shared.set_status(Status::Connecting);
        true
    }

    fn start(&mut self, conn: Connection<T>) {
        let (reader, writer) = conn.split();
        let quit = Arc::new(Notify::new());

        // the reader may finish immediately, so this has to be visible first
        self.shared.set_status(Status::Connected);

        let reader = tokio::spawn(read_loop(
            reader,
            Arc::clone(&self.shared),
            Arc::clone(&quit),
        ));
        self.writer.replace(writer);
        self.session.replace(Session { quit, reader });
    }

    async fn disconnect(&mut self, message: Option<&str>) -> Result<(), Error> {
        if self.status() != Status::Connected {
            return Err(Error::NotConnected);
        }
        self.shared.set_status(Status::Disconnecting);

        let mut result = Ok(());
        if let Some(writer) = self.writer.as_mut() {
            result = writer.send_command(&Command::Quit(message)).await;
            if let Err(err) = writer.shutdown().await {
                log::debug!("cannot shutdown the connection: {}", err);
            }
        }

        self.teardown().await;
        result.map_err(Into::into)
    }

    async fn teardown(&mut self) {
        self.writer.take();
        if let Some(session) = self.session.take() {
            session.stop().await;
        }
        self.shared.set_status(Status::Disconnected);
    }
}

impl<T> Drop for Client<T> {
    fn drop(&mut self) {
        if let Some(session) = &self.session {
            session.quit.notify_one();
        }
    }
}

async fn read_loop<R>(mut reader: Reader<R>, shared: Arc<Shared>, quit: Arc<Notify>)
where
    R: AsyncRead + Unpin,
{
    let mut framer = Framer::new();
    loop {
        let chunk = tokio::select! {
            biased;
            _ = quit.notified() => {
                log::debug!("reader was told to stop");
                return;
            }
            chunk = reader.receive_chunk() => chunk,
        };

        let chunk = match chunk {
            Ok(chunk) if chunk.is_empty() => {
                log::info!("connection closed by the server");
                break;
            }
            Ok(chunk) => chunk,
            Err(err) => {
                shared.failed(err);
                break;
            }
        };

        for line in framer.feed(chunk) {
            log::trace!("<- {}", line.escape_debug());
            match Message::parse(&line) {
                Ok(msg) => shared.queue.push(msg),
                Err(err) => log::warn!("dropping line: {}", err),
            }
        }
    }

    shared.finished();
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::pin::Pin;
    use std::task::{Context, Poll};
    use std::time::Duration;
    use tokio::io::{AsyncReadExt, AsyncWriteExt, DuplexStream, ReadBuf};

    const TIMEOUT: Duration = Duration::from_secs(5);

    async fn fetch_n<T>(client: &Client<T>, n: usize) -> Vec<Message>
    where
        T: AsyncRead + AsyncWrite + Send + 'static,
    {
        let mut out = vec![];
        tokio::time::timeout(TIMEOUT, async {
            while out.len() < n {
                out.extend(client.fetch());
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("timed out waiting for messages");
        out
    }

    async fn wait_for<T>(client: &Client<T>, status: Status)
    where
        T: AsyncRead + AsyncWrite + Send + 'static,
    {
        tokio::time::timeout(TIMEOUT, async {
            while client.status() != status {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("timed out waiting for status")
    }

    async fn read_exactly(remote: &mut DuplexStream, expected: &str) {
        let mut buf = vec![0; expected.len()];
        remote.read_exact(&mut buf).await.unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), expected);
    }

    async fn attached() -> (Client<DuplexStream>, DuplexStream) {
        let (local, remote) = tokio::io::duplex(4096);
        let mut client = Client::default();
        client.attach(local).await.unwrap();
        assert_eq!(client.status(), Status::Connected);
        (client, remote)
    }

    #[tokio::test]
    async fn fetch_classified() {
        let (client, mut remote) = attached().await;

        for chunk in &[
            &b":irc.example.net 001 irctf :Welcome\r\nPI"[..],
            b"NG :abc123\r",
            b"\n:nick!u@h PRIVMSG #chan :hello there world\r\n",
        ] {
            remote.write_all(chunk).await.unwrap();
        }

        let msgs = fetch_n(&client, 3).await;
        assert_eq!(msgs.len(), 3);
        match &msgs[0] {
            Message::Numeric(numeric) => assert_eq!(numeric.code, 1),
            msg => panic!("expected numeric, got {:?}", msg),
        }
        match &msgs[1] {
            Message::Ping(ping) => assert_eq!(ping.code, "abc123"),
            msg => panic!("expected ping, got {:?}", msg),
        }
        match &msgs[2] {
            Message::Privmsg(msg) => {
                assert_eq!(msg.nick, "nick");
                assert_eq!(msg.target, "#chan");
                assert_eq!(msg.message, "hello there world");
            }
            msg => panic!("expected privmsg, got {:?}", msg),
        }
        assert!(client.fetch().is_empty());
    }

    #[tokio::test]
    async fn malformed_line_is_dropped() {
        let (client, mut remote) = attached().await;

        remote
            .write_all(b":museun!~m@localhost JOIN\r\n\r\n:museun!~m@localhost JOIN #test\r\n")
            .await
            .unwrap();

        let msgs = fetch_n(&client, 2).await;
        assert_eq!(msgs.len(), 2);
        match &msgs[0] {
            Message::Generic(generic) => assert_eq!(generic.tokens.to_string(), ""),
            msg => panic!("expected generic, got {:?}", msg),
        }
        match &msgs[1] {
            Message::Join(join) => {
                assert_eq!(join.channel, "#test");
                assert_eq!(join.nick, "museun");
            }
            msg => panic!("expected join, got {:?}", msg),
        }
        assert_eq!(client.status(), Status::Connected);
    }

    #[tokio::test]
    async fn outbound() {
        let (mut client, mut remote) = attached().await;

        client.nick("irctf").await.unwrap();
        read_exactly(&mut remote, "NICK irctf\r\n").await;

        client.auth("irctf", "irc test framework").await.unwrap();
        read_exactly(&mut remote, "USER irctf 0 * :irc test framework\r\n").await;

        client.join("#test").await.unwrap();
        read_exactly(&mut remote, "JOIN #test\r\n").await;

        client.privmsg("#test", "hello there").await.unwrap();
        read_exactly(&mut remote, "PRIVMSG #test :hello there\r\n").await;

        client.part("#test").await.unwrap();
        read_exactly(&mut remote, "PART #test\r\n").await;

        client.part_with_message("#test", "bye now").await.unwrap();
        read_exactly(&mut remote, "PART #test :bye now\r\n").await;

        client.pong("abc123").await.unwrap();
        read_exactly(&mut remote, "PONG abc123\r\n").await;
    }

    #[tokio::test]
    async fn ping_pong() {
        let (mut client, mut remote) = attached().await;
        remote.write_all(b"PING :abc123\r\n").await.unwrap();

        for msg in fetch_n(&client, 1).await {
            match msg {
                Message::Ping(ping) => client.send(ping.pong()).await.unwrap(),
                msg => panic!("expected ping, got {:?}", msg),
            }
        }
        read_exactly(&mut remote, "PONG abc123\r\n").await;
    }

    #[tokio::test]
    async fn not_connected() {
        let mut client = Client::<DuplexStream>::default();
        assert_eq!(client.status(), Status::Disconnected);

        assert!(matches!(client.nick("irctf").await, Err(Error::NotConnected)));
        assert!(matches!(client.join("#test").await, Err(Error::NotConnected)));
        assert!(matches!(client.quit().await, Err(Error::NotConnected)));
        assert!(client.fetch().is_empty());
    }

    #[tokio::test]
    async fn quit() {
        let (mut client, mut remote) = attached().await;

        client.quit_with_message("bye all").await.unwrap();
        assert_eq!(client.status(), Status::Disconnected);

        let mut out = String::new();
        remote.read_to_string(&mut out).await.unwrap();
        assert_eq!(out, "QUIT :bye all\r\n");

        // the reader is gone, nothing else is picked up
        let _ = remote.write_all(b"PING :late\r\n").await;
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(client.fetch().is_empty());

        assert!(matches!(client.nick("irctf").await, Err(Error::NotConnected)));
        assert!(client.take_error().is_none());
    }

    #[tokio::test]
    async fn quit_without_message() {
        let (mut client, mut remote) = attached().await;
        client.send(Command::Quit(None)).await.unwrap();
        assert_eq!(client.status(), Status::Disconnected);

        let mut out = String::new();
        remote.read_to_string(&mut out).await.unwrap();
        assert_eq!(out, "QUIT\r\n");
    }

    #[tokio::test]
    async fn server_closed() {
        let (mut client, mut remote) = attached().await;
        remote.write_all(b"ERROR :Closing link\r\n").await.unwrap();
        drop(remote);

        wait_for(&client, Status::Disconnected).await;
        let msgs = fetch_n(&client, 1).await;
        assert!(matches!(&msgs[0], Message::Generic(..)));

        assert!(client.take_error().is_none());
        assert!(matches!(client.nick("irctf").await, Err(Error::NotConnected)));
    }

    #[tokio::test]
    async fn drop_stops_the_reader() {
        let (client, mut remote) = attached().await;
        drop(client);

        // both halves of the stream are gone once the reader has exited
        let mut out = vec![];
        tokio::time::timeout(TIMEOUT, remote.read_to_end(&mut out))
            .await
            .expect("reader kept the stream open")
            .unwrap();
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn connect_while_connected() {
        let (mut client, mut remote) = attached().await;

        let (other, _other_remote) = tokio::io::duplex(64);
        client.attach(other).await.unwrap();
        assert_eq!(client.status(), Status::Connected);

        client.nick("irctf").await.unwrap();
        read_exactly(&mut remote, "NICK irctf\r\n").await;
    }

    #[tokio::test]
    async fn reconnect() {
        let (mut client, _remote) = attached().await;
        client.quit().await.unwrap();

        let (local, mut remote) = tokio::io::duplex(4096);
        client.attach(local).await.unwrap();
        assert_eq!(client.status(), Status::Connected);

        remote.write_all(b"PING :again\r\n").await.unwrap();
        let msgs = fetch_n(&client, 1).await;
        assert!(matches!(&msgs[0], Message::Ping(ping) if ping.code == "again"));
    }

    struct Broken;

    impl AsyncRead for Broken {
        fn poll_read(
            self: Pin<&mut Self>,
            _: &mut Context<'_>,
            _: &mut ReadBuf<'_>,
        ) -> Poll<std::io::Result<()>> {
            Poll::Ready(Err(std::io::ErrorKind::ConnectionReset.into()))
        }
    }

    impl AsyncWrite for Broken {
        fn poll_write(
            self: Pin<&mut Self>,
            _: &mut Context<'_>,
            _: &[u8],
        ) -> Poll<std::io::Result<usize>> {
            Poll::Ready(Err(std::io::ErrorKind::BrokenPipe.into()))
        }

        fn poll_flush(self: Pin<&mut Self>, _: &mut Context<'_>) -> Poll<std::io::Result<()>> {
            Poll::Ready(Ok(()))
        }

        fn poll_shutdown(self: Pin<&mut Self>, _: &mut Context<'_>) -> Poll<std::io::Result<()>> {
            Poll::Ready(Ok(()))
        }
    }

    #[tokio::test]
    async fn read_failure_is_reported_once() {
        let mut client = Client::default();
        client.attach(Broken).await.unwrap();

        wait_for(&client, Status::Disconnected).await;
        assert!(matches!(
            client.take_error(),
            Some(ConnectionError::Read(err)) if err.kind() == std::io::ErrorKind::ConnectionReset
        ));
        assert!(client.take_error().is_none());
        assert!(matches!(client.nick("irctf").await, Err(Error::NotConnected)));
    }

    #[tokio::test]
    async fn connect_over_tcp() {
        use tokio::io::AsyncBufReadExt;

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let server = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let mut stream = tokio::io::BufReader::new(stream);

            let mut line = String::new();
            stream.read_line(&mut line).await.unwrap();
            assert_eq!(line, "NICK irctf\r\n");

            stream.get_mut().write_all(b"PING :xyz\r\n").await.unwrap();

            line.clear();
            stream.read_line(&mut line).await.unwrap();
            assert_eq!(line, "PONG xyz\r\n");
        });

        let mut client = Client::new();
        client.connect("127.0.0.1", port).await.unwrap();
        client.nick("irctf").await.unwrap();

        for msg in fetch_n(&client, 1).await {
            if let Message::Ping(ping) = msg {
                client.pong(&ping.code).await.unwrap();
            }
        }

        server.await.unwrap();
        wait_for(&client, Status::Disconnected).await;
    }

    #[tokio::test]
    async fn connect_refused() {
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };

        let mut client = Client::new();
        let err = client.connect("127.0.0.1", port).await.unwrap_err();
        assert!(matches!(
            err,
            Error::Connection(ConnectionError::Connect { .. })
        ));
        assert_eq!(client.status(), Status::Disconnected);
    }
}
