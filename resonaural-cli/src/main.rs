//! Resonaural CLI — real-time binaural player driven by JSON-lines events.
//!
//! Each stdin line is one event:
//!
//! ```text
//! {"type":"resonance","resonance_frequency":0.82,"collective_emotions":{"joy":0.9},"emerging_patterns":["high_resonance"]}
//! {"type":"state","state":"theta","intensity":0.7}
//! {"type":"trigger","kind":"draw"}
//! {"type":"intensity","value":0.4}
//! {"type":"spatial","x":0.5}
//! {"type":"stop"}
//! ```
//!
//! A snapshot line is written to stdout every `--report-ms`.

use std::error::Error;
use std::io::BufRead;
use std::path::PathBuf;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::time::{Duration, Instant};

use clap::Parser;
use resonaural_engine::realtime::{list_output_devices, CpalBackend};
use resonaural_engine::{BinauralEngine, BrainwaveState, EngineConfig, ResonancePayload};
use serde::Deserialize;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Binaural beat player for resonance feeds
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// List output devices and exit
    #[arg(long)]
    list_devices: bool,

    /// Output device name (overrides the config file)
    #[arg(long)]
    device: Option<String>,

    /// Engine configuration (TOML)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Brainwave state to start in
    #[arg(long, default_value = "alpha")]
    state: String,

    /// Beat intensity for the starting state
    #[arg(long, default_value_t = 1.0)]
    intensity: f32,

    /// Target output intensity to fade in to
    #[arg(long, default_value_t = 0.2)]
    level: f32,

    /// Stop after this many seconds
    #[arg(long)]
    duration: Option<u64>,

    /// Snapshot report interval in milliseconds
    #[arg(long, default_value_t = 1000)]
    report_ms: u64,
}

fn default_intensity() -> f32 {
    0.5
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum Event {
    Resonance(ResonancePayload),
    State {
        state: String,
        #[serde(default = "default_intensity")]
        intensity: f32,
    },
    Trigger { kind: String },
    Intensity { value: f32 },
    Spatial { x: f32 },
    Stop,
}

/// Apply one event; returns `false` when playback should end.
fn apply(engine: &BinauralEngine<CpalBackend>, event: Event) -> bool {
    match event {
        Event::Resonance(payload) => {
            if let Some(target) = engine.update_from_resonance(&payload) {
                info!(state = %target.state, intensity = target.intensity, "resonance applied");
            }
        }
        Event::State { state, intensity } => {
            if let Err(e) = engine.set_brainwave_state_named(&state, intensity) {
                warn!("{e}");
            }
        }
        Event::Trigger { kind } => engine.trigger_event(&kind),
        Event::Intensity { value } => engine.set_intensity(value),
        Event::Spatial { x } => engine.set_spatial_position(x),
        Event::Stop => return false,
    }
    true
}

fn spawn_stdin_reader() -> mpsc::Receiver<Event> {
    let (tx, rx) = mpsc::channel();
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            match serde_json::from_str::<Event>(line) {
                Ok(ev) => {
                    if tx.send(ev).is_err() {
                        break;
                    }
                }
                Err(e) => warn!("skipping malformed event: {e}"),
            }
        }
    });
    rx
}

fn report(engine: &BinauralEngine<CpalBackend>) -> Result<(), Box<dyn Error>> {
    println!("{}", serde_json::to_string(&engine.snapshot())?);
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    if args.list_devices {
        println!("Available output devices:");
        for name in list_output_devices()? {
            println!("- {name}");
        }
        return Ok(());
    }

    let mut config = match &args.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };
    if args.device.is_some() {
        config.device = args.device.clone();
    }
    let start_state: BrainwaveState = args.state.parse()?;

    let backend = CpalBackend::new(config.device.clone());
    let mut engine = BinauralEngine::new(backend, config);
    engine.init()?;
    engine.set_brainwave_state(start_state, args.intensity);
    engine.set_intensity(args.level);

    eprintln!("resonaural — binaural resonance player");
    if let Some(d) = args.duration {
        eprintln!("Auto-stop after {d} seconds");
    }
    eprintln!("Reading events from stdin; Ctrl+C to stop…\n");

    let events = spawn_stdin_reader();
    let report_every = Duration::from_millis(args.report_ms.max(10));
    let deadline = args.duration.map(|d| Instant::now() + Duration::from_secs(d));
    let mut next_report = Instant::now();
    let mut stdin_open = true;

    loop {
        if deadline.is_some_and(|d| Instant::now() >= d) {
            break;
        }
        let now = Instant::now();
        if now >= next_report {
            report(&engine)?;
            next_report = now + report_every;
        }
        let wait = next_report.saturating_duration_since(Instant::now());

        if stdin_open {
            match events.recv_timeout(wait) {
                Ok(ev) => {
                    if !apply(&engine, ev) {
                        break;
                    }
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => stdin_open = false,
            }
        } else {
            std::thread::sleep(wait);
        }
    }

    engine.stop();
    report(&engine)?;
    Ok(())
}
