//! Mock hardware adapters for integration tests.
//!
//! Record every pin write, display draw and event so tests can assert on
//! the full history without touching real GPIO.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::convert::Infallible;
use std::rc::Rc;

use embedded_hal::digital::{ErrorType, InputPin, OutputPin};
use fuelmeter::app::events::AppEvent;
use fuelmeter::app::ports::{DisplayPort, EdgeSource, EventSink, SerialLink};

// ── Output pin ────────────────────────────────────────────────

/// Output pin whose write history stays readable after the pin has been
/// moved into a driver.
#[derive(Clone, Default)]
pub struct MockPin {
    writes: Rc<RefCell<Vec<bool>>>,
}

#[allow(dead_code)]
impl MockPin {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_high(&self) -> bool {
        self.writes.borrow().last().copied().unwrap_or(false)
    }

    /// Number of low→high transitions written so far.
    pub fn rises(&self) -> usize {
        let writes = self.writes.borrow();
        let mut prev = false;
        let mut n = 0;
        for &w in writes.iter() {
            if w && !prev {
                n += 1;
            }
            prev = w;
        }
        n
    }
}

impl ErrorType for MockPin {
    type Error = Infallible;
}

impl OutputPin for MockPin {
    fn set_low(&mut self) -> Result<(), Infallible> {
        self.writes.borrow_mut().push(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        self.writes.borrow_mut().push(true);
        Ok(())
    }
}

// ── Input pin ─────────────────────────────────────────────────

/// Button that replays a script of levels, then stays at the last one.
pub struct ScriptedButton {
    levels: VecDeque<bool>,
    last: bool,
}

#[allow(dead_code)]
impl ScriptedButton {
    pub fn new(levels: &[bool]) -> Self {
        Self {
            levels: levels.iter().copied().collect(),
            last: false,
        }
    }
}

impl ErrorType for ScriptedButton {
    type Error = Infallible;
}

impl InputPin for ScriptedButton {
    fn is_high(&mut self) -> Result<bool, Infallible> {
        if let Some(l) = self.levels.pop_front() {
            self.last = l;
        }
        Ok(self.last)
    }

    fn is_low(&mut self) -> Result<bool, Infallible> {
        self.is_high().map(|h| !h)
    }
}

// ── Edge source ───────────────────────────────────────────────

/// Delivers a fixed list of edge bursts, then reports closed.
pub struct ScriptedEdges {
    pub label: &'static str,
    pub bursts: VecDeque<u32>,
}

#[allow(dead_code)]
impl ScriptedEdges {
    pub fn new(label: &'static str, bursts: &[u32]) -> Self {
        Self {
            label,
            bursts: bursts.iter().copied().collect(),
        }
    }
}

impl EdgeSource for ScriptedEdges {
    type Error = &'static str;

    fn label(&self) -> &'static str {
        self.label
    }

    fn wait_for_edges(&mut self) -> Result<Option<u32>, &'static str> {
        Ok(self.bursts.pop_front())
    }
}

// ── Display ───────────────────────────────────────────────────

#[derive(Default)]
pub struct MockDisplay {
    pub draws: Vec<(u8, char, bool)>,
    pub commits: usize,
}

#[allow(dead_code)]
impl MockDisplay {
    /// Text of the last committed frame, dots inline.
    pub fn last_frame(&self) -> String {
        let start = self.draws.len().saturating_sub(4);
        let mut s = String::new();
        for &(_, ch, dot) in &self.draws[start..] {
            s.push(ch);
            if dot {
                s.push('.');
            }
        }
        s
    }
}

impl DisplayPort for MockDisplay {
    fn draw(&mut self, position: u8, ch: char, dot: bool) {
        self.draws.push((position, ch, dot));
    }

    fn commit(&mut self) {
        self.commits += 1;
    }
}

// ── Event recorder ────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn echoes(&self) -> Vec<String> {
        self.events
            .iter()
            .filter_map(|e| e.echo().map(|s| s.as_str().to_owned()))
            .collect()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}

// ── Serial link ───────────────────────────────────────────────

/// In-memory link: tests push inbound bytes and inspect what was written.
#[derive(Default)]
pub struct LoopbackLink {
    pub inbound: VecDeque<u8>,
    pub outbound: Vec<u8>,
}

#[allow(dead_code)]
impl LoopbackLink {
    pub fn push(&mut self, bytes: &[u8]) {
        self.inbound.extend(bytes);
    }

    pub fn written(&self) -> String {
        String::from_utf8_lossy(&self.outbound).into_owned()
    }
}

impl SerialLink for LoopbackLink {
    type Error = Infallible;

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Infallible> {
        let n = buf.len().min(self.inbound.len());
        for (slot, b) in buf.iter_mut().zip(self.inbound.drain(..n)) {
            *slot = b;
        }
        Ok(n)
    }

    fn write(&mut self, data: &[u8]) -> Result<usize, Infallible> {
        self.outbound.extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> Result<(), Infallible> {
        Ok(())
    }
}
