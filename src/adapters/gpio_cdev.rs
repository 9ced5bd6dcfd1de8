//! Linux GPIO character-device adapter (uAPI v2).
//!
//! Lines are requested from `/dev/gpiochipN` with one ioctl each:
//!
//! | Request              | Flags                          | Used for          |
//! |----------------------|--------------------------------|-------------------|
//! | [`EdgeLine`]         | input, rising edge, pull-down  | speed/flow sensor |
//! | [`LevelLine`]        | input, pull-up                 | mode button       |
//!
//! The kernel queues one 48-byte event record per detected edge on the
//! request descriptor.  [`EdgeLine`] reads them in batches and reports how
//! many arrived, which is all the edge counter needs.
//!
//! Every line-level failure names the consumer label of the line it
//! concerns.  Opening the chip is a chip-wide failure.

use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Read};
use std::os::fd::{AsRawFd, FromRawFd, OwnedFd};

use embedded_hal::digital::{ErrorType, InputPin};

use crate::app::ports::EdgeSource;
use crate::error::HwError;

// ───────────────────────────────────────────────────────────────
// Kernel ABI (include/uapi/linux/gpio.h)
// ───────────────────────────────────────────────────────────────

const GPIO_V2_LINES_MAX: usize = 64;
const GPIO_MAX_NAME_SIZE: usize = 32;
const GPIO_V2_LINE_NUM_ATTRS_MAX: usize = 10;

const GPIO_V2_LINE_FLAG_INPUT: u64 = 1 << 2;
const GPIO_V2_LINE_FLAG_EDGE_RISING: u64 = 1 << 4;
const GPIO_V2_LINE_FLAG_BIAS_PULL_UP: u64 = 1 << 8;
const GPIO_V2_LINE_FLAG_BIAS_PULL_DOWN: u64 = 1 << 9;

/// `_IOWR(0xB4, 0x07, struct gpio_v2_line_request)`
const GPIO_V2_GET_LINE_IOCTL: u64 = 0xC250_B407;
/// `_IOWR(0xB4, 0x0E, struct gpio_v2_line_values)`
const GPIO_V2_LINE_GET_VALUES_IOCTL: u64 = 0xC010_B40E;

#[repr(C)]
#[derive(Clone, Copy)]
#[allow(dead_code)]
struct LineAttribute {
    id: u32,
    padding: u32,
    value: u64,
}

#[repr(C)]
#[derive(Clone, Copy)]
#[allow(dead_code)]
struct LineConfigAttribute {
    attr: LineAttribute,
    mask: u64,
}

#[repr(C)]
#[derive(Clone, Copy)]
#[allow(dead_code)]
struct LineConfig {
    flags: u64,
    num_attrs: u32,
    padding: [u32; 5],
    attrs: [LineConfigAttribute; GPIO_V2_LINE_NUM_ATTRS_MAX],
}

#[repr(C)]
#[derive(Clone, Copy)]
#[allow(dead_code)]
struct LineRequest {
    offsets: [u32; GPIO_V2_LINES_MAX],
    consumer: [u8; GPIO_MAX_NAME_SIZE],
    config: LineConfig,
    num_lines: u32,
    event_buffer_size: u32,
    padding: [u32; 5],
    fd: i32,
}

#[repr(C)]
#[derive(Clone, Copy)]
struct LineValues {
    bits: u64,
    mask: u64,
}

#[repr(C)]
#[derive(Clone, Copy)]
#[allow(dead_code)]
struct LineEvent {
    timestamp_ns: u64,
    id: u32,
    offset: u32,
    seqno: u32,
    line_seqno: u32,
    padding: [u32; 6],
}

const _: () = assert!(core::mem::size_of::<LineRequest>() == 592);
const _: () = assert!(core::mem::size_of::<LineValues>() == 16);
const _: () = assert!(core::mem::size_of::<LineEvent>() == 48);

const EVENT_SIZE: usize = core::mem::size_of::<LineEvent>();
/// Events drained per read.
const EVENT_BATCH: usize = 16;

fn errno_of(e: &std::io::Error) -> i32 {
    e.raw_os_error().unwrap_or(0)
}

// ───────────────────────────────────────────────────────────────
// Chip
// ───────────────────────────────────────────────────────────────

/// An open GPIO chip.  Line requests outlive it.
pub struct GpioChip {
    file: File,
}

impl GpioChip {
    pub fn open(path: &str) -> Result<Self, HwError> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(path)
            .map_err(|e| HwError::ChipOpen { errno: errno_of(&e) })?;
        Ok(Self { file })
    }

    fn request(&self, offset: u32, label: &'static str, flags: u64) -> Result<OwnedFd, HwError> {
        // SAFETY: LineRequest is plain old data; all-zero is a valid value.
        let mut req: LineRequest = unsafe { core::mem::zeroed() };
        req.offsets[0] = offset;
        let name = label.as_bytes();
        let n = name.len().min(GPIO_MAX_NAME_SIZE - 1);
        req.consumer[..n].copy_from_slice(&name[..n]);
        req.config.flags = flags;
        req.num_lines = 1;

        // SAFETY: the chip fd is open and `req` matches the kernel layout
        // checked by the size assertions above.
        let rc = unsafe {
            libc::ioctl(
                self.file.as_raw_fd(),
                GPIO_V2_GET_LINE_IOCTL as _,
                &mut req as *mut LineRequest,
            )
        };
        if rc < 0 || req.fd < 0 {
            return Err(HwError::LineRequest {
                line: label,
                errno: std::io::Error::last_os_error().raw_os_error().unwrap_or(0),
            });
        }
        // SAFETY: on success the kernel hands us a fresh descriptor we own.
        Ok(unsafe { OwnedFd::from_raw_fd(req.fd) })
    }

    /// Request `offset` as a rising-edge input with pull-down bias.
    pub fn request_edge_line(&self, offset: u32, label: &'static str) -> Result<EdgeLine, HwError> {
        let fd = self.request(
            offset,
            label,
            GPIO_V2_LINE_FLAG_INPUT | GPIO_V2_LINE_FLAG_EDGE_RISING | GPIO_V2_LINE_FLAG_BIAS_PULL_DOWN,
        )?;
        Ok(EdgeLine {
            file: File::from(fd),
            label,
        })
    }

    /// Request `offset` as a plain input with pull-up bias.
    pub fn request_level_line(&self, offset: u32, label: &'static str) -> Result<LevelLine, HwError> {
        let fd = self.request(
            offset,
            label,
            GPIO_V2_LINE_FLAG_INPUT | GPIO_V2_LINE_FLAG_BIAS_PULL_UP,
        )?;
        Ok(LevelLine { fd, label })
    }
}

// ───────────────────────────────────────────────────────────────
// Edge line
// ───────────────────────────────────────────────────────────────

/// A line delivering rising-edge events.
pub struct EdgeLine {
    file: File,
    label: &'static str,
}

impl EdgeSource for EdgeLine {
    type Error = HwError;

    fn label(&self) -> &'static str {
        self.label
    }

    fn wait_for_edges(&mut self) -> Result<Option<u32>, HwError> {
        let mut buf = [0u8; EVENT_SIZE * EVENT_BATCH];
        match self.file.read(&mut buf) {
            Ok(0) => Ok(None),
            Ok(n) => Ok(Some((n / EVENT_SIZE) as u32)),
            Err(e) if e.kind() == ErrorKind::Interrupted => Ok(Some(0)),
            Err(e) => Err(HwError::EdgeWait {
                line: self.label,
                errno: errno_of(&e),
            }),
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Level line
// ───────────────────────────────────────────────────────────────

/// A polled input line.
pub struct LevelLine {
    fd: OwnedFd,
    label: &'static str,
}

impl ErrorType for LevelLine {
    type Error = HwError;
}

impl InputPin for LevelLine {
    fn is_high(&mut self) -> Result<bool, HwError> {
        let mut values = LineValues { bits: 0, mask: 1 };
        // SAFETY: `fd` is a live line request; `values` matches the kernel
        // layout.
        let rc = unsafe {
            libc::ioctl(
                self.fd.as_raw_fd(),
                GPIO_V2_LINE_GET_VALUES_IOCTL as _,
                &mut values as *mut LineValues,
            )
        };
        if rc < 0 {
            return Err(HwError::LevelRead {
                line: self.label,
                errno: std::io::Error::last_os_error().raw_os_error().unwrap_or(0),
            });
        }
        Ok(values.bits & 1 != 0)
    }

    fn is_low(&mut self) -> Result<bool, HwError> {
        self.is_high().map(|high| !high)
    }
}
