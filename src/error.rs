//! Hardware and link error types for the fuel meter.
//!
//! The library reports failures with these small `Copy` enums so they can be
//! passed out of edge-counting threads and the serial reconnect loop without
//! allocation.  The binaries wrap them in `anyhow` with context.

use core::fmt;

// ---------------------------------------------------------------------------
// Hardware errors
// ---------------------------------------------------------------------------

/// GPIO failures.  Every line-level variant names the consumer label of
/// the line so startup diagnostics say exactly which sensor failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwError {
    /// The GPIO chip device could not be opened.  Affects every line.
    ChipOpen { errno: i32 },
    /// The kernel refused the line request.
    LineRequest { line: &'static str, errno: i32 },
    /// Waiting for or reading edge events failed.
    EdgeWait { line: &'static str, errno: i32 },
    /// Reading the line level failed.
    LevelRead { line: &'static str, errno: i32 },
}

impl HwError {
    /// Consumer label of the line this error refers to, `None` for
    /// chip-wide failures.
    pub const fn line(&self) -> Option<&'static str> {
        match self {
            Self::ChipOpen { .. } => None,
            Self::LineRequest { line, .. }
            | Self::EdgeWait { line, .. }
            | Self::LevelRead { line, .. } => Some(line),
        }
    }
}

impl fmt::Display for HwError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ChipOpen { errno } => write!(f, "GPIO chip open failed (errno={errno})"),
            Self::LineRequest { line, errno } => {
                write!(f, "line request failed for '{line}' (errno={errno})")
            }
            Self::EdgeWait { line, errno } => {
                write!(f, "edge wait failed on '{line}' (errno={errno})")
            }
            Self::LevelRead { line, errno } => {
                write!(f, "level read failed on '{line}' (errno={errno})")
            }
        }
    }
}

impl std::error::Error for HwError {}

impl embedded_hal::digital::Error for HwError {
    fn kind(&self) -> embedded_hal::digital::ErrorKind {
        embedded_hal::digital::ErrorKind::Other
    }
}

// ---------------------------------------------------------------------------
// Serial errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SerialError {
    /// The device node could not be opened.
    OpenFailed(i32),
    /// termios configuration was rejected.
    ConfigureFailed(i32),
    /// The requested baud rate has no termios constant.
    UnsupportedBaud(u32),
    /// A read failed; the port is closed and reopened later.
    ReadFailed(i32),
    /// A write failed; the port is closed and reopened later.
    WriteFailed(i32),
}

impl fmt::Display for SerialError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OpenFailed(errno) => write!(f, "open failed (errno={errno})"),
            Self::ConfigureFailed(errno) => write!(f, "termios config failed (errno={errno})"),
            Self::UnsupportedBaud(baud) => write!(f, "unsupported baud rate {baud}"),
            Self::ReadFailed(errno) => write!(f, "read failed (errno={errno})"),
            Self::WriteFailed(errno) => write!(f, "write failed (errno={errno})"),
        }
    }
}

impl std::error::Error for SerialError {}
