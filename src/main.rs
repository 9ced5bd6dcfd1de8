//! Fuel-meter signal generator, main entry point.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                    Adapters (outer ring)                     │
//! │                                                              │
//! │  PinDriver / SimPin   UartLink / StdioLink   LogDisplay      │
//! │  (OutputPin ×3)       (SerialLink)           (DisplayPort)   │
//! │                                                              │
//! │  ─────────────────── Port boundary ─────────────────────     │
//! │                                                              │
//! │  ┌────────────────────────────────────────────────────┐      │
//! │  │        SignalGenerator (pure logic)                │      │
//! │  │  PulseScheduler · TriggerChannel · LineAssembler   │      │
//! │  └────────────────────────────────────────────────────┘      │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! On ESP-IDF the outputs are real GPIOs and the link is UART1.  On a host
//! the pins are simulated and the link is the terminal: type `S1500F600`
//! or `T` and watch the log.
#![deny(unused_must_use)]

use anyhow::Result;
use embedded_hal::digital::OutputPin;
use log::{info, warn};

use fuelmeter::adapters::display::LogDisplay;
use fuelmeter::adapters::log_sink::LogEventSink;
use fuelmeter::adapters::time::MonotonicClock;
use fuelmeter::app::events::AppEvent;
use fuelmeter::app::generator::SignalGenerator;
use fuelmeter::app::ports::{EventSink, SerialLink};
use fuelmeter::config::SimConfig;

/// Interval between status lines (milliseconds).
const STATUS_INTERVAL_MS: u32 = 1_000;

// ── Echo sink ─────────────────────────────────────────────────
//
// Logs every event and mirrors the diagnostic ones back over the link so
// the sender sees what the generator made of its command.

struct EchoSink<'a, L> {
    link: &'a mut L,
    log: LogEventSink,
}

impl<L: SerialLink> EventSink for EchoSink<'_, L> {
    fn emit(&mut self, event: &AppEvent) {
        self.log.emit(event);
        if let Some(line) = event.echo() {
            let sent = self
                .link
                .write(line.as_bytes())
                .and_then(|_| self.link.write(b"\n"))
                .and_then(|_| self.link.flush());
            if let Err(e) = sent {
                warn!("SIM | echo failed: {:?}", e);
            }
        }
    }
}

// ── Main loop ─────────────────────────────────────────────────

/// Run the generator until `keep_running` returns false.
///
/// `on_status` is called about once per [`STATUS_INTERVAL_MS`] with the
/// elapsed milliseconds; `idle` after every pass that received no bytes.
fn run<P, L>(
    generator: &mut SignalGenerator<P>,
    link: &mut L,
    clock: &MonotonicClock,
    keep_running: impl Fn() -> bool,
    mut on_status: impl FnMut(&SignalGenerator<P>, u32),
    mut idle: impl FnMut(),
) -> Result<()>
where
    P: OutputPin,
    P::Error: std::error::Error + Send + Sync + 'static,
    L: SerialLink,
{
    let mut display = LogDisplay::new();
    let mut rx = [0u8; 64];
    let mut last_status_ms = clock.now_ms();

    while keep_running() {
        let n = match link.read(&mut rx) {
            Ok(n) => n,
            Err(e) => {
                warn!("SIM | link read failed: {:?}", e);
                0
            }
        };

        let mut sink = EchoSink {
            link: &mut *link,
            log: LogEventSink::new(),
        };
        let now_ms = clock.now_ms();
        if n > 0 {
            generator.feed(&rx[..n], now_ms, &mut display, &mut sink)?;
        }
        generator.tick(clock.now_us(), now_ms, &mut sink)?;

        let elapsed = now_ms.wrapping_sub(last_status_ms);
        if elapsed >= STATUS_INTERVAL_MS {
            last_status_ms = now_ms;
            on_status(generator, elapsed);
        }
        if n == 0 {
            idle();
        }
    }
    Ok(())
}

// ── Host simulation ───────────────────────────────────────────

#[cfg(not(target_os = "espidf"))]
mod host {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    use anyhow::{Context, Result};
    use clap::Parser;
    use log::info;

    use fuelmeter::adapters::sim_pin::SimPin;
    use fuelmeter::adapters::stdio::StdioLink;
    use fuelmeter::adapters::time::MonotonicClock;
    use fuelmeter::app::generator::SignalGenerator;
    use fuelmeter::config::SimConfig;

    #[derive(Parser, Debug)]
    #[command(name = "fuel-sim", version, about = "Simulated fuel-meter signal generator")]
    pub struct Args {
        /// How long a trigger holds the button line high (ms)
        #[arg(long, default_value_t = SimConfig::default().trigger_hold_ms)]
        pub trigger_hold_ms: u32,

        /// Automatic button press period in ms (0 = off)
        #[arg(long, default_value_t = SimConfig::default().auto_toggle_interval_ms)]
        pub auto_toggle_ms: u32,
    }

    pub fn main() -> Result<()> {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
        let args = Args::parse();

        let config = SimConfig {
            trigger_hold_ms: args.trigger_hold_ms,
            auto_toggle_interval_ms: args.auto_toggle_ms,
            ..SimConfig::default()
        };
        config.validate().context("invalid simulator settings")?;
        super::banner(&config);

        let speed = SimPin::new("speed");
        let flow = SimPin::new("flow");
        let (speed_rises, flow_rises) = (speed.rises(), flow.rises());
        let mut generator = SignalGenerator::new(&config, speed, flow, SimPin::new("trigger"));

        let mut link = StdioLink::spawn()?;
        let clock = MonotonicClock::new();

        let running = Arc::new(AtomicBool::new(true));
        let r = running.clone();
        ctrlc::set_handler(move || {
            r.store(false, Ordering::SeqCst);
        })
        .context("installing SIGINT/SIGTERM handler")?;

        super::run(
            &mut generator,
            &mut link,
            &clock,
            || running.load(Ordering::SeqCst),
            |g, elapsed_ms| {
                let (speed_hz, flow_hz) = g.targets();
                let scale = 1000.0 / f64::from(elapsed_ms.max(1));
                if speed_hz > 0 || flow_hz > 0 {
                    info!(
                        "SIM | target {}/{} Hz | produced {:.0}/{:.0} Hz",
                        speed_hz,
                        flow_hz,
                        f64::from(speed_rises.take()) * scale,
                        f64::from(flow_rises.take()) * scale,
                    );
                } else {
                    speed_rises.take();
                    flow_rises.take();
                }
            },
            std::thread::yield_now,
        )?;

        info!("SIM | shutting down");
        Ok(())
    }
}

// ── ESP-IDF firmware ──────────────────────────────────────────

#[cfg(target_os = "espidf")]
mod firmware {
    use anyhow::Result;
    use esp_idf_hal::gpio::{AnyIOPin, AnyOutputPin, PinDriver};
    use esp_idf_hal::peripherals::Peripherals;
    use esp_idf_hal::uart::{UartDriver, config::Config as UartConfig};
    use esp_idf_hal::units::Hertz;
    use log::info;

    use fuelmeter::adapters::time::MonotonicClock;
    use fuelmeter::adapters::uart::UartLink;
    use fuelmeter::app::generator::SignalGenerator;
    use fuelmeter::config::SimConfig;
    use fuelmeter::drivers::watchdog::LoopWatchdog;
    use fuelmeter::pins;

    /// Must comfortably exceed the status interval the loop feeds it at.
    const WATCHDOG_TIMEOUT_MS: u32 = 5_000;

    pub fn main() -> Result<()> {
        esp_idf_svc::sys::link_patches();
        esp_idf_logger::init()?;

        let config = SimConfig::default();
        super::banner(&config);

        let peripherals = Peripherals::take()?;

        // SAFETY: each GPIO number is claimed exactly once, here.
        let (speed, flow, trigger, tx, rx) = unsafe {
            (
                AnyOutputPin::new(pins::SIM_SPEED_OUT_GPIO),
                AnyOutputPin::new(pins::SIM_FLOW_OUT_GPIO),
                AnyOutputPin::new(pins::SIM_BUTTON_OUT_GPIO),
                AnyIOPin::new(pins::SIM_UART_TX_GPIO),
                AnyIOPin::new(pins::SIM_UART_RX_GPIO),
            )
        };
        let mut generator = SignalGenerator::new(
            &config,
            PinDriver::output(speed)?,
            PinDriver::output(flow)?,
            PinDriver::output(trigger)?,
        );

        let uart = UartDriver::new(
            peripherals.uart1,
            tx,
            rx,
            Option::<AnyIOPin>::None,
            Option::<AnyIOPin>::None,
            &UartConfig::default().baudrate(Hertz(config.baud_rate)),
        )?;
        let mut link = UartLink::new(uart);
        let clock = MonotonicClock::new();
        let watchdog = LoopWatchdog::subscribe(WATCHDOG_TIMEOUT_MS);

        super::run(
            &mut generator,
            &mut link,
            &clock,
            || true,
            |g, _| {
                let (speed_hz, flow_hz) = g.targets();
                info!("SIM | speed={}Hz flow={}Hz", speed_hz, flow_hz);
                watchdog.feed();
            },
            || {},
        )
    }
}

fn banner(config: &SimConfig) {
    info!("╔══════════════════════════════════════╗");
    info!("║  FuelMeter signal generator v{}   ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");
    info!(
        "SIM | trigger hold {} ms, auto toggle every {} ms",
        config.trigger_hold_ms, config.auto_toggle_interval_ms
    );
}

fn main() -> Result<()> {
    #[cfg(target_os = "espidf")]
    return firmware::main();

    #[cfg(not(target_os = "espidf"))]
    host::main()
}
