//! Lock-free pulse counter shared between an edge thread and the sampler.
//!
//! The edge thread blocks on its GPIO line and calls [`EdgeCounter::record`]
//! for every rising edge the kernel delivers.  The sampling loop calls
//! [`EdgeCounter::take`], which swaps the count to zero in one atomic
//! operation, so an increment landing between "read" and "clear" can
//! never be lost.  There is no separate read or clear.

use core::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use log::{error, info, warn};

use crate::app::ports::EdgeSource;

/// Pause after a failed edge wait before blocking on the line again.
const EDGE_ERROR_BACKOFF: Duration = Duration::from_millis(100);

/// Errors in a row after which the edge thread logs at error level.
const EDGE_ERROR_ESCALATE: u32 = 10;

/// Pulse count for one sensed channel.
#[derive(Debug, Default)]
pub struct EdgeCounter {
    count: AtomicU32,
}

impl EdgeCounter {
    pub const fn new() -> Self {
        Self {
            count: AtomicU32::new(0),
        }
    }

    /// Add `edges` pulses.  Wraps on overflow, which at any realistic
    /// sensor rate never happens within one sampling window.
    pub fn record(&self, edges: u32) {
        self.count.fetch_add(edges, Ordering::Relaxed);
    }

    /// Read the accumulated count and reset it to zero atomically.
    pub fn take(&self) -> u32 {
        self.count.swap(0, Ordering::Relaxed)
    }
}

/// Block on `source` and feed every delivered edge into `counter`.
///
/// Returns only when the source reports it is closed.  Wait errors are
/// logged and retried after a short back-off; the line stays owned by
/// this thread for the process lifetime.
pub fn count_edges<S: EdgeSource>(source: &mut S, counter: &EdgeCounter) {
    let label = source.label();
    let mut consecutive_errors: u32 = 0;

    loop {
        match source.wait_for_edges() {
            Ok(Some(edges)) => {
                consecutive_errors = 0;
                counter.record(edges);
            }
            Ok(None) => {
                info!("edge[{}]: source closed", label);
                return;
            }
            Err(e) => {
                consecutive_errors = consecutive_errors.saturating_add(1);
                if consecutive_errors >= EDGE_ERROR_ESCALATE {
                    error!("edge[{}]: {} ({} failures in a row)", label, e, consecutive_errors);
                } else {
                    warn!("edge[{}]: {}", label, e);
                }
                thread::sleep(EDGE_ERROR_BACKOFF);
            }
        }
    }
}

/// Spawn a named thread running [`count_edges`].
///
/// The handle may be dropped; edge threads are never joined before exit.
pub fn spawn_edge_thread<S>(mut source: S, counter: Arc<EdgeCounter>) -> std::io::Result<JoinHandle<()>>
where
    S: EdgeSource + Send + 'static,
{
    let name = format!("edge-{}", source.label());
    thread::Builder::new()
        .name(name)
        .spawn(move || count_edges(&mut source, &counter))
}
