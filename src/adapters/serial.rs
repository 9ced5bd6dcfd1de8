//! Linux tty serial adapter for the measuring node.
//!
//! ## Connection model
//!
//! 1. [`TtyPort::open`] opens the device non-blocking without becoming its
//!    controlling terminal and switches it to raw 8N1 at the configured
//!    baud rate.  The descriptor stays non-blocking for reads and writes.
//! 2. [`ReconnectingSerial`] wraps an optional port.  Sends while the port
//!    is closed are dropped; the next open attempt happens once the retry
//!    interval has passed.
//! 3. A report that does not fit into the kernel's output queue because
//!    the peer stopped draining is dropped, not waited for.
//! 4. Any other read or write error closes the port and schedules a reopen.
//!
//! The meter never stops sampling because of the link.

use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Read, Write};
use std::os::fd::AsRawFd;
use std::os::unix::fs::OpenOptionsExt;
use std::time::{Duration, Instant};

use log::{debug, info, warn};

use crate::app::ports::SerialLink;
use crate::error::SerialError;

fn last_errno() -> i32 {
    std::io::Error::last_os_error().raw_os_error().unwrap_or(0)
}

fn errno_of(e: &std::io::Error) -> i32 {
    e.raw_os_error().unwrap_or(0)
}

/// termios speed constant for `baud`.
pub fn baud_constant(baud: u32) -> Result<libc::speed_t, SerialError> {
    Ok(match baud {
        1200 => libc::B1200,
        2400 => libc::B2400,
        4800 => libc::B4800,
        9600 => libc::B9600,
        19200 => libc::B19200,
        38400 => libc::B38400,
        57600 => libc::B57600,
        115_200 => libc::B115200,
        230_400 => libc::B230400,
        460_800 => libc::B460800,
        921_600 => libc::B921600,
        other => return Err(SerialError::UnsupportedBaud(other)),
    })
}

// ───────────────────────────────────────────────────────────────
// TtyPort
// ───────────────────────────────────────────────────────────────

/// An open, raw-mode serial device.
pub struct TtyPort {
    file: File,
}

impl TtyPort {
    pub fn open(path: &str, baud: u32) -> Result<Self, SerialError> {
        let speed = baud_constant(baud)?;
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .custom_flags(libc::O_NOCTTY | libc::O_NONBLOCK)
            .open(path)
            .map_err(|e| SerialError::OpenFailed(errno_of(&e)))?;
        let fd = file.as_raw_fd();

        // SAFETY: `fd` is a valid open descriptor owned by `file` for the
        // duration of these calls; `tio` is fully initialised by tcgetattr.
        unsafe {
            let mut tio: libc::termios = core::mem::zeroed();
            if libc::tcgetattr(fd, &mut tio) != 0 {
                return Err(SerialError::ConfigureFailed(last_errno()));
            }
            libc::cfmakeraw(&mut tio);
            tio.c_cflag |= libc::CLOCAL | libc::CREAD;
            tio.c_cflag &= !(libc::CSTOPB | libc::CRTSCTS);
            tio.c_cc[libc::VMIN] = 0;
            tio.c_cc[libc::VTIME] = 0;
            if libc::cfsetispeed(&mut tio, speed) != 0 || libc::cfsetospeed(&mut tio, speed) != 0 {
                return Err(SerialError::ConfigureFailed(last_errno()));
            }
            if libc::tcsetattr(fd, libc::TCSANOW, &tio) != 0 {
                return Err(SerialError::ConfigureFailed(last_errno()));
            }
            libc::tcflush(fd, libc::TCIOFLUSH);
        }

        Ok(Self { file })
    }
}

impl SerialLink for TtyPort {
    type Error = SerialError;

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, SerialError> {
        match self.file.read(buf) {
            Ok(n) => Ok(n),
            Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::Interrupted) => Ok(0),
            Err(e) => Err(SerialError::ReadFailed(errno_of(&e))),
        }
    }

    /// Write as much of `data` as the output queue accepts without
    /// blocking.  A full queue writes 0 bytes.
    fn write(&mut self, data: &[u8]) -> Result<usize, SerialError> {
        loop {
            match self.file.write(data) {
                Ok(n) => return Ok(n),
                Err(e) if e.kind() == ErrorKind::Interrupted => {}
                Err(e) if e.kind() == ErrorKind::WouldBlock => return Ok(0),
                Err(e) => return Err(SerialError::WriteFailed(errno_of(&e))),
            }
        }
    }

    fn flush(&mut self) -> Result<(), SerialError> {
        self.file
            .flush()
            .map_err(|e| SerialError::WriteFailed(errno_of(&e)))
    }
}

// ───────────────────────────────────────────────────────────────
// ReconnectingSerial
// ───────────────────────────────────────────────────────────────

/// Link state as seen by the main loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    Open,
    Closed,
}

/// A serial port that reopens itself after failures.
pub struct ReconnectingSerial {
    path: String,
    baud: u32,
    retry: Duration,
    port: Option<TtyPort>,
    next_attempt: Instant,
    dropped: u32,
}

impl ReconnectingSerial {
    /// Does not open the port; the first [`poll_connect`] does.
    ///
    /// [`poll_connect`]: Self::poll_connect
    pub fn new(path: impl Into<String>, baud: u32, retry: Duration) -> Self {
        Self {
            path: path.into(),
            baud,
            retry,
            port: None,
            next_attempt: Instant::now(),
            dropped: 0,
        }
    }

    pub fn state(&self) -> LinkState {
        if self.port.is_some() {
            LinkState::Open
        } else {
            LinkState::Closed
        }
    }

    /// Reports dropped since the last reopen, either because the port was
    /// closed or because the peer stopped draining it.
    pub fn dropped(&self) -> u32 {
        self.dropped
    }

    /// Try to open the port if it is closed and the retry interval has
    /// passed.  Returns the resulting state.
    pub fn poll_connect(&mut self) -> LinkState {
        if self.port.is_some() || Instant::now() < self.next_attempt {
            return self.state();
        }
        match TtyPort::open(&self.path, self.baud) {
            Ok(port) => {
                info!("SERIAL | {} open at {} baud", self.path, self.baud);
                if self.dropped > 0 {
                    info!("SERIAL | {} reports dropped while closed", self.dropped);
                }
                self.dropped = 0;
                self.port = Some(port);
            }
            Err(e) => {
                warn!(
                    "SERIAL | {} unavailable ({}), retrying in {} ms",
                    self.path,
                    e,
                    self.retry.as_millis()
                );
                self.next_attempt = Instant::now() + self.retry;
            }
        }
        self.state()
    }

    /// Send `data` if the port is open.  Returns whether all of it was
    /// written.  Never blocks.
    pub fn send(&mut self, data: &[u8]) -> bool {
        self.poll_connect();
        let Some(port) = self.port.as_mut() else {
            self.dropped = self.dropped.saturating_add(1);
            debug!("SERIAL | closed, dropped {} bytes", data.len());
            return false;
        };
        match port.write(data) {
            Ok(n) if n == data.len() => true,
            Ok(n) => {
                // The peer's tail of this line is lost; its line assembler
                // rejects the fragment.
                self.dropped = self.dropped.saturating_add(1);
                debug!("SERIAL | output queue full, wrote {}/{} bytes", n, data.len());
                false
            }
            Err(e) => {
                warn!("SERIAL | {} ({}), closing", e, self.path);
                self.close();
                false
            }
        }
    }

    /// Drain whatever the peer sent.  Returns 0 while closed.
    pub fn receive(&mut self, buf: &mut [u8]) -> usize {
        let Some(port) = self.port.as_mut() else {
            return 0;
        };
        match port.read(buf) {
            Ok(n) => n,
            Err(e) => {
                warn!("SERIAL | read failed: {}, closing", e);
                self.close();
                0
            }
        }
    }

    fn close(&mut self) {
        self.port = None;
        self.next_attempt = Instant::now() + self.retry;
    }
}
