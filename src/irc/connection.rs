use super::{Command, ConnectionError};

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, ReadHalf, WriteHalf};
use tokio::net::TcpStream;

const READ_BUF_SIZE: usize = 512;

/// A byte stream to an IRC server, split into its two directions
pub struct Connection<T> {
    reader: Reader<ReadHalf<T>>,
    writer: Writer<WriteHalf<T>>,
}

impl Connection<TcpStream> {
    /// Resolves `host` and connects to the first address that accepts
    pub async fn establish(host: &str, port: u16) -> Result<Self, ConnectionError> {
        let addrs = tokio::net::lookup_host((host, port))
            .await
            .map_err(|source| ConnectionError::Resolve {
                host: host.to_string(),
                port,
                source,
            })?;

        let mut last = None;
        for addr in addrs {
            log::debug!("connecting to {}", addr);
            match TcpStream::connect(addr).await {
                Ok(stream) => return Ok(Self::from_read_write(stream)),
                Err(err) => {
                    log::debug!("cannot connect to {}: {}", addr, err);
                    last.replace(err);
                }
            }
        }

        let err = match last {
            Some(source) => ConnectionError::Connect {
                host: host.to_string(),
                port,
                source,
            },
            None => ConnectionError::Resolve {
                host: host.to_string(),
                port,
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "no addresses found"),
            },
        };
        Err(err)
    }
}

impl<T> Connection<T>
where
    T: AsyncRead + AsyncWrite,
{
    pub fn from_read_write(inner: T) -> Self {
        let (read, write) = tokio::io::split(inner);
        Self {
            reader: Reader::new(read),
            writer: Writer::new(write),
        }
    }

    pub async fn send(&mut self, data: &[u8]) -> Result<(), ConnectionError> {
        self.writer.send(data).await
    }

    pub async fn receive_chunk(&mut self) -> Result<&[u8], ConnectionError> {
        self.reader.receive_chunk().await
    }

    pub fn split(self) -> (Reader<ReadHalf<T>>, Writer<WriteHalf<T>>) {
        (self.reader, self.writer)
    }
}

/// The receiving half of a [`Connection`]
pub struct Reader<R> {
    inner: R,
    buf: Box<[u8]>,
}

impl<R> Reader<R>
where
    R: AsyncRead + Unpin,
{
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            buf: vec![0; READ_BUF_SIZE].into_boxed_slice(),
        }
    }

    /// Reads whatever is available
    ///
    /// An empty chunk means the peer closed the connection
    pub async fn receive_chunk(&mut self) -> Result<&[u8], ConnectionError> {
        let read = self
            .inner
            .read(&mut self.buf)
            .await
            .map_err(ConnectionError::Read)?;
        Ok(&self.buf[..read])
    }
}

/// The sending half of a [`Connection`]
pub struct Writer<W> {
    inner: W,
}

impl<W> Writer<W>
where
    W: AsyncWrite + Unpin,
{
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    pub async fn send(&mut self, data: &[u8]) -> Result<(), ConnectionError> {
        self.inner
            .write_all(data)
            .await
            .map_err(ConnectionError::Write)?;
        self.inner.flush().await.map_err(ConnectionError::Write)
    }

    pub async fn send_command(&mut self, command: &Command<'_>) -> Result<(), ConnectionError> {
        log::trace!("-> {}", command);
        self.send(&command.encode()).await
    }

    /// Closes our side of the stream
    pub async fn shutdown(&mut self) -> Result<(), ConnectionError> {
        self.inner.shutdown().await.map_err(ConnectionError::Write)
    }
}
