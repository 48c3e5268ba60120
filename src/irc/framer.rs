const DELIM: &[u8] = b"\r\n";

/// Reassembles `\r\n`-terminated lines from arbitrarily split chunks
#[derive(Debug, Default)]
pub struct Framer {
    buf: Vec<u8>,
    // bytes of `buf` already known to hold no delimiter
    searched: usize,
}

impl Framer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a chunk and iterates over every line it completed
    ///
    /// Lines not pulled from the iterator stay buffered for the next call
    pub fn feed(&mut self, chunk: &[u8]) -> Lines<'_> {
        self.buf.extend_from_slice(chunk);
        Lines { framer: self }
    }

    /// Takes the next complete line, if there is one
    pub fn next_line(&mut self) -> Option<String> {
        // a `\r` at the end of the last search may pair with a new `\n`
        let start = self.searched.saturating_sub(DELIM.len() - 1);
        let pos = match self.buf[start..]
            .windows(DELIM.len())
            .position(|w| w == DELIM)
        {
            Some(pos) => start + pos,
            None => {
                self.searched = self.buf.len();
                return None;
            }
        };

        let line = String::from_utf8_lossy(&self.buf[..pos]).into_owned();
        self.buf.drain(..pos + DELIM.len());
        self.searched = 0;
        Some(line)
    }

    /// Bytes waiting for their delimiter
    pub fn pending(&self) -> &[u8] {
        &self.buf
    }
}

pub struct Lines<'a> {
    framer: &'a mut Framer,
}

impl<'a> Iterator for Lines<'a> {
    type Item = String;

    fn next(&mut self) -> Option<Self::Item> {
        self.framer.next_line()
    }
}
