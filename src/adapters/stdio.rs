//! Standard-stream serial link for host simulation.
//!
//! A background thread forwards stdin to a channel so [`SerialLink::read`]
//! stays non-blocking; writes go straight to stdout.  Typing `S1500F600`
//! into the terminal drives the simulated generator exactly like the
//! measuring node would.

use std::io::{Read, Write};
use std::sync::mpsc::{self, Receiver, TryRecvError};

use crate::app::ports::SerialLink;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StdioError {
    /// The stdin reader thread could not be started.
    Spawn,
    /// stdout rejected a write.
    Write,
}

impl core::fmt::Display for StdioError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Spawn => write!(f, "stdin reader thread failed to start"),
            Self::Write => write!(f, "stdout write failed"),
        }
    }
}

impl std::error::Error for StdioError {}

pub struct StdioLink {
    rx: Receiver<Vec<u8>>,
    pending: Vec<u8>,
}

impl StdioLink {
    pub fn spawn() -> Result<Self, StdioError> {
        let (tx, rx) = mpsc::channel();
        std::thread::Builder::new()
            .name("stdin".into())
            .spawn(move || {
                let mut stdin = std::io::stdin();
                let mut buf = [0u8; 256];
                loop {
                    match stdin.read(&mut buf) {
                        Ok(0) | Err(_) => break,
                        Ok(n) => {
                            if tx.send(buf[..n].to_vec()).is_err() {
                                break;
                            }
                        }
                    }
                }
            })
            .map_err(|_| StdioError::Spawn)?;
        Ok(Self {
            rx,
            pending: Vec::new(),
        })
    }
}

impl SerialLink for StdioLink {
    type Error = StdioError;

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, StdioError> {
        if self.pending.is_empty() {
            match self.rx.try_recv() {
                Ok(chunk) => self.pending = chunk,
                // Disconnected: stdin hit end of file.  Keep generating.
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => return Ok(0),
            }
        }
        let n = buf.len().min(self.pending.len());
        buf[..n].copy_from_slice(&self.pending[..n]);
        self.pending.drain(..n);
        Ok(n)
    }

    fn write(&mut self, data: &[u8]) -> Result<usize, StdioError> {
        std::io::stdout()
            .write_all(data)
            .map(|()| data.len())
            .map_err(|_| StdioError::Write)
    }

    fn flush(&mut self) -> Result<(), StdioError> {
        std::io::stdout().flush().map_err(|_| StdioError::Write)
    }
}
