//! Fuel meter measuring node, main entry point.
//!
//! ```text
//!  speed line ──▶ edge-speed_sensor thread ──▶ EdgeCounter ─┐
//!  flow line  ──▶ edge-flow_sensor  thread ──▶ EdgeCounter ─┤ PulseSampler
//!                                                           ▼
//!  button line ───────────── poll ──────────────────▶ FuelMeter ──▶ serial
//! ```
//!
//! Every sampling window the main thread drains both counters, polls the
//! mode button and sends one report line.  GPIO setup failures are fatal;
//! serial failures are not.
#![deny(unused_must_use)]

#[cfg(target_os = "linux")]
mod meter {
    use std::path::PathBuf;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::{Duration, Instant};

    use anyhow::{Context, Result};
    use clap::Parser;
    use embedded_hal::digital::InputPin;
    use log::{debug, info, warn};

    use fuelmeter::adapters::gpio_cdev::GpioChip;
    use fuelmeter::adapters::log_sink::LogEventSink;
    use fuelmeter::adapters::serial::{LinkState, ReconnectingSerial};
    use fuelmeter::app::meter::FuelMeter;
    use fuelmeter::config::MeterConfig;
    use fuelmeter::control::frequency::{self, FrequencyPlan};
    use fuelmeter::link::line::LineAssembler;
    use fuelmeter::pins;
    use fuelmeter::sensors::PulseSampler;
    use fuelmeter::sensors::edge_counter::{EdgeCounter, spawn_edge_thread};

    #[derive(Parser, Debug)]
    #[command(name = "fuel-meter", version, about = "Pulse-counting fuel consumption meter")]
    pub struct Args {
        /// JSON configuration file (missing fields take defaults)
        #[arg(short, long)]
        pub config: Option<PathBuf>,

        /// Serial device connected to the signal generator
        #[arg(long)]
        pub port: Option<String>,

        /// Drive the generator to emulate this speed (km/h); needs --drive-lph
        #[arg(long, requires = "drive_lph")]
        pub drive_kmh: Option<f64>,

        /// Drive the generator to emulate this fuel flow (L/h); needs --drive-kmh
        #[arg(long, requires = "drive_kmh")]
        pub drive_lph: Option<f64>,

        /// Print the effective configuration as JSON and exit
        #[arg(long)]
        pub print_config: bool,
    }

    fn load_config(args: &Args) -> Result<MeterConfig> {
        let mut config = match &args.config {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("reading {}", path.display()))?;
                MeterConfig::from_json(&text).with_context(|| format!("parsing {}", path.display()))?
            }
            None => MeterConfig::default(),
        };
        if let Some(port) = &args.port {
            config.serial_port.clone_from(port);
        }
        config.validate().context("invalid configuration")?;
        Ok(config)
    }

    fn drive_plan(args: &Args, config: &MeterConfig) -> Option<FrequencyPlan> {
        let (kmh, lph) = (args.drive_kmh?, args.drive_lph?);
        let plan = frequency::plan(
            kmh,
            lph,
            &config.sensor,
            config.sample_window_secs(),
            config.min_pulses_per_sample,
        );
        info!(
            "DRIVE | {:.1} km/h, {:.2} L/h -> {:.3}/{:.3} Hz x{} -> {}",
            kmh,
            lph,
            plan.calc_speed_hz,
            plan.calc_flow_hz,
            plan.scale,
            plan.command()
        );
        Some(plan)
    }

    pub fn main() -> Result<()> {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
        let args = Args::parse();
        let config = load_config(&args)?;

        if args.print_config {
            println!("{}", serde_json::to_string_pretty(&config)?);
            return Ok(());
        }

        info!("╔══════════════════════════════════════╗");
        info!("║  FuelMeter measuring node v{}     ║", env!("CARGO_PKG_VERSION"));
        info!("╚══════════════════════════════════════╝");

        // ── GPIO (fatal on failure) ───────────────────────────
        let chip = GpioChip::open(&config.gpio_chip)
            .with_context(|| format!("opening {}", config.gpio_chip))?;
        let speed_line = chip
            .request_edge_line(config.speed_line, pins::SPEED_LINE_LABEL)
            .context("configuring speed sensor line")?;
        let flow_line = chip
            .request_edge_line(config.flow_line, pins::FLOW_LINE_LABEL)
            .context("configuring flow sensor line")?;
        let mut button = chip
            .request_level_line(config.button_line, pins::BUTTON_LINE_LABEL)
            .context("configuring mode button line")?;
        drop(chip);
        info!(
            "GPIO | {} speed={} flow={} button={}",
            config.gpio_chip, config.speed_line, config.flow_line, config.button_line
        );

        // ── Edge counting ─────────────────────────────────────
        let speed_count = Arc::new(EdgeCounter::new());
        let flow_count = Arc::new(EdgeCounter::new());
        spawn_edge_thread(speed_line, Arc::clone(&speed_count)).context("spawning speed thread")?;
        spawn_edge_thread(flow_line, Arc::clone(&flow_count)).context("spawning flow thread")?;
        let sampler = PulseSampler::new(speed_count, flow_count);

        // ── Link + domain ─────────────────────────────────────
        let mut serial = ReconnectingSerial::new(
            config.serial_port.clone(),
            config.baud_rate,
            Duration::from_millis(u64::from(config.serial_retry_ms)),
        );
        let plan = drive_plan(&args, &config);
        let mut meter = FuelMeter::new(&config);
        let mut sink = LogEventSink::new();
        let mut peer = LineAssembler::new();

        let running = Arc::new(AtomicBool::new(true));
        let r = running.clone();
        ctrlc::set_handler(move || {
            r.store(false, Ordering::SeqCst);
        })
        .context("installing SIGINT/SIGTERM handler")?;

        // ── Sampling loop ─────────────────────────────────────
        let window = Duration::from_millis(u64::from(config.sample_window_ms));
        let mut next = Instant::now() + window;
        let mut link_state = LinkState::Closed;
        let mut rx = [0u8; 64];

        while running.load(Ordering::SeqCst) {
            std::thread::sleep(next.saturating_duration_since(Instant::now()));
            next += window;
            let now = Instant::now();
            if next < now {
                // Fell more than a window behind; resynchronise.
                next = now + window;
            }

            let level = button.is_high().unwrap_or_else(|e| {
                warn!("METER | {}", e);
                false
            });
            let counts = sampler.sample_and_reset();
            let mut line = meter.cycle(level, counts, &mut sink);
            let _ = line.push('\n');

            let state = serial.poll_connect();
            if state == LinkState::Open && link_state == LinkState::Closed {
                if let Some(plan) = &plan {
                    let mut cmd = plan.command();
                    let _ = cmd.push('\n');
                    serial.send(cmd.as_bytes());
                }
            }
            link_state = state;
            serial.send(line.as_bytes());

            let n = serial.receive(&mut rx);
            peer.feed(&rx[..n], |l| debug!("PEER | {}", l));
        }

        info!("METER | shutting down");
        Ok(())
    }
}

#[cfg(target_os = "linux")]
fn main() -> anyhow::Result<()> {
    meter::main()
}

#[cfg(not(target_os = "linux"))]
fn main() -> anyhow::Result<()> {
    anyhow::bail!("fuel-meter needs the Linux GPIO character device interface")
}
