//! shakelock CLI
//!
//! Shake-to-lock gesture detection for pointer-driven hosts.

use clap::{Args, Parser, Subcommand};
use shakelock::{
    collector::{check_permission, is_supported, read_events, Collector, CollectorConfig, PointerEvent},
    config::Config,
    core::{LockController, LockEvent, LockEventKind, ShakeDetectorConfig},
    stats::{create_shared_log_from_store, ACTIVITY_KEY},
    store::{JsonFileStore, KeyValueStore},
    LOCK_COUNT_KEY, VERSION,
};
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "shakelock")]
#[command(version = VERSION)]
#[command(about = "Shake the pointer to lock, click to unlock", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Overrides for the configured detector tuning.
#[derive(Args, Debug, Default)]
struct DetectorArgs {
    /// Direction reversals needed for a shake
    #[arg(long)]
    threshold: Option<u32>,

    /// Rolling history window in milliseconds
    #[arg(long)]
    window_ms: Option<u64>,

    /// Minimum horizontal movement in pixels
    #[arg(long)]
    min_movement: Option<f64>,

    /// Minimum time between shakes in milliseconds
    #[arg(long)]
    cooldown_ms: Option<u64>,
}

impl DetectorArgs {
    fn apply(&self, base: ShakeDetectorConfig) -> ShakeDetectorConfig {
        ShakeDetectorConfig {
            reversal_threshold: self.threshold.unwrap_or(base.reversal_threshold),
            window_ms: self.window_ms.unwrap_or(base.window_ms),
            min_movement_px: self.min_movement.unwrap_or(base.min_movement_px),
            cooldown_ms: self.cooldown_ms.unwrap_or(base.cooldown_ms),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Watch live pointer input and lock on shake
    Watch {
        #[command(flatten)]
        detector: DetectorArgs,

        /// Start with shake-to-lock disarmed
        #[arg(long)]
        no_shake: bool,
    },

    /// Run a recorded JSON Lines pointer trace through the detector
    Replay {
        /// Trace file, or `-` for stdin
        path: PathBuf,

        #[command(flatten)]
        detector: DetectorArgs,

        /// Print lock events as JSON
        #[arg(long)]
        json: bool,
    },

    /// Serve the lock controller over HTTP for a browser page
    #[cfg(feature = "server")]
    Serve {
        /// Port to listen on (0 picks a free port)
        #[arg(long, default_value = "7878")]
        port: u16,

        #[command(flatten)]
        detector: DetectorArgs,
    },

    /// Fetch a lock-screen quote
    #[cfg(feature = "quote")]
    Quote,

    /// Arm shake-to-lock
    Enable,

    /// Disarm shake-to-lock
    Disable,

    /// Show configuration and cumulative statistics
    Status,

    /// Show configuration
    Config,
}

fn main() {
    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Watch { detector, no_shake } => {
            cmd_watch(&detector, no_shake);
        }
        Commands::Replay {
            path,
            detector,
            json,
        } => {
            cmd_replay(&path, &detector, json);
        }
        #[cfg(feature = "server")]
        Commands::Serve { port, detector } => {
            cmd_serve(port, &detector);
        }
        #[cfg(feature = "quote")]
        Commands::Quote => {
            cmd_quote();
        }
        Commands::Enable => {
            cmd_set_enabled(true);
        }
        Commands::Disable => {
            cmd_set_enabled(false);
        }
        Commands::Status => {
            cmd_status();
        }
        Commands::Config => {
            cmd_config();
        }
    }
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("shakelock=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config() -> Config {
    match Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Warning: Could not load config ({e}), using defaults");
            Config::default()
        }
    }
}

fn build_controller(config: &Config, args: &DetectorArgs, shake_enabled: bool) -> LockController {
    match LockController::new(args.apply(config.detector), shake_enabled) {
        Ok(controller) => controller,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}

fn print_event(event: &LockEvent, tz: &chrono_tz::Tz) {
    let time = event.at.with_timezone(tz).format("%H:%M:%S");
    match event.kind {
        LockEventKind::Locked => match event.shake {
            Some(shake) => println!(
                "[{time}] Locked by shake ({} reversals at {:.0}ms)",
                shake.reversals, shake.timestamp_ms
            ),
            None => println!("[{time}] Locked"),
        },
        LockEventKind::Unlocked => println!("[{time}] Unlocked"),
    }
}

fn cmd_watch(args: &DetectorArgs, no_shake: bool) {
    println!("shakelock v{VERSION}");
    println!();

    if !is_supported() {
        eprintln!("Error: Live pointer capture is not available on this platform.");
        eprintln!("Use `shakelock replay` with a recorded trace instead.");
        std::process::exit(1);
    }

    if !check_permission() {
        eprintln!("Error: Input Monitoring permission not granted.");
        eprintln!();
        eprintln!("To grant permission:");
        eprintln!("1. Open System Settings > Privacy & Security");
        eprintln!("2. Select 'Input Monitoring'");
        eprintln!("3. Add this application to the allowed list");
        eprintln!("4. Restart the application");
        std::process::exit(1);
    }

    let config = load_config();
    if let Err(e) = config.ensure_directories() {
        eprintln!("Warning: Could not create directories: {e}");
    }
    let tz = config.tz().unwrap_or(chrono_tz::UTC);

    let mut store = match JsonFileStore::open(config.store_path()) {
        Ok(store) => Some(store),
        Err(e) => {
            eprintln!("Warning: Could not open store: {e}");
            None
        }
    };

    let activity = match &store {
        Some(store) => create_shared_log_from_store(store),
        None => shakelock::stats::create_shared_log(),
    };
    let locks_before = activity.stats().locks;

    let shake_enabled = config.shake_enabled && !no_shake;
    let mut controller =
        build_controller(&config, args, shake_enabled).with_activity_log(activity.clone());

    let detector = controller.detector().config();
    println!("Watching pointer input...");
    println!(
        "  Shake to lock: {}",
        if shake_enabled { "enabled" } else { "disabled" }
    );
    println!(
        "  Reversals: {}, window: {}ms, min movement: {}px, cooldown: {}ms",
        detector.reversal_threshold,
        detector.window_ms,
        detector.min_movement_px,
        detector.cooldown_ms
    );
    println!();
    println!("Click to unlock. Press Ctrl+C to stop");
    println!();

    let running = Arc::new(AtomicBool::new(true));
    ctrlc_handler(running.clone());

    let mut collector = Collector::new(CollectorConfig::default());
    if let Err(e) = collector.start() {
        eprintln!("Error starting collector: {e}");
        std::process::exit(1);
    }

    let receiver = collector.receiver().clone();

    while running.load(Ordering::SeqCst) {
        match receiver.recv_timeout(Duration::from_millis(100)) {
            Ok(PointerEvent::Move { x, timestamp_ms }) => {
                if let Some(event) = controller.pointer_moved(x, timestamp_ms) {
                    print_event(&event, &tz);
                }
            }
            Ok(PointerEvent::Click { .. }) => {
                if let Some(event) = controller.unlock_input() {
                    print_event(&event, &tz);
                }
            }
            Err(crossbeam_channel::RecvTimeoutError::Timeout) => {}
            Err(crossbeam_channel::RecvTimeoutError::Disconnected) => {
                eprintln!("Collector disconnected unexpectedly");
                break;
            }
        }
    }

    println!();
    println!("Stopping...");
    collector.stop();

    let session_locks = activity.stats().locks.saturating_sub(locks_before);

    if let Some(store) = store.as_mut() {
        if let Err(e) = activity.save(store) {
            eprintln!("Warning: Could not save activity stats: {e}");
        }
        if let Err(e) = store.increment(LOCK_COUNT_KEY, session_locks) {
            eprintln!("Warning: Could not save lock counter: {e}");
        }
    }

    println!();
    println!("{}", activity.summary());
}

fn cmd_replay(path: &Path, args: &DetectorArgs, json: bool) {
    let config = load_config();
    let tz = config.tz().unwrap_or(chrono_tz::UTC);

    let events = if path.as_os_str() == "-" {
        read_events(std::io::stdin().lock())
    } else {
        match std::fs::File::open(path) {
            Ok(file) => read_events(BufReader::new(file)),
            Err(e) => {
                eprintln!("Error opening {path:?}: {e}");
                std::process::exit(1);
            }
        }
    };

    let events = match events {
        Ok(events) => events,
        Err(e) => {
            eprintln!("Error reading trace: {e}");
            std::process::exit(1);
        }
    };

    let mut controller = build_controller(&config, args, true);
    let mut transitions = Vec::new();
    for event in &events {
        let outcome = match *event {
            PointerEvent::Move { x, timestamp_ms } => controller.pointer_moved(x, timestamp_ms),
            PointerEvent::Click { .. } => controller.unlock_input(),
        };
        if let Some(event) = outcome {
            if !json {
                print_event(&event, &tz);
            }
            transitions.push(event);
        }
    }

    if json {
        match serde_json::to_string_pretty(&transitions) {
            Ok(out) => println!("{out}"),
            Err(e) => {
                eprintln!("Error serializing events: {e}");
                std::process::exit(1);
            }
        }
        return;
    }

    let detector = controller.detector();
    println!();
    println!("Replayed {} events", events.len());
    println!("  Lock transitions: {}", transitions.len());
    println!("  Shakes suppressed by cooldown: {}", detector.suppressed_shakes());
    println!("  Samples discarded: {}", detector.discarded_samples());
    println!("  Final state: {}", controller.current_state());
}

#[cfg(feature = "server")]
fn cmd_serve(port: u16, args: &DetectorArgs) {
    use shakelock::server::{run, ServerConfig};

    let config = load_config();
    let server_config = ServerConfig::new(port, args.apply(config.detector), config.shake_enabled);

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Error creating runtime: {e}");
            std::process::exit(1);
        }
    };

    let result: anyhow::Result<()> = runtime.block_on(async {
        let (addr, shutdown_tx) = run(server_config).await?;
        println!("Listening on http://{addr}");
        println!("Press Ctrl+C to stop");

        tokio::signal::ctrl_c().await?;
        let _ = shutdown_tx.send(());
        Ok(())
    });

    if let Err(e) = result {
        eprintln!("Server error: {e}");
        std::process::exit(1);
    }
}

#[cfg(feature = "quote")]
fn cmd_quote() {
    match shakelock::quote::BlockingHitokotoClient::new() {
        Ok(client) => println!("{}", client.fetch_or_fallback()),
        Err(e) => {
            eprintln!("Warning: {e}");
            println!("{}", shakelock::quote::Quote::fallback());
        }
    }
}

fn cmd_set_enabled(enabled: bool) {
    let mut config = load_config();
    config.shake_enabled = enabled;
    if let Err(e) = config.save() {
        eprintln!("Error saving config: {e}");
        std::process::exit(1);
    }
    if enabled {
        println!("Shake-to-lock enabled.");
    } else {
        println!("Shake-to-lock disabled. Use 'shakelock enable' to re-arm.");
    }
}

fn cmd_status() {
    let config = load_config();

    println!("shakelock Status");
    println!("================");
    println!();

    println!(
        "Live capture: {}",
        if !is_supported() {
            "Unsupported on this platform"
        } else if check_permission() {
            "Permission granted ✓"
        } else {
            "Permission not granted ✗"
        }
    );
    println!();

    println!("Configuration:");
    println!(
        "  Shake to lock: {}",
        if config.shake_enabled {
            "enabled"
        } else {
            "disabled"
        }
    );
    println!("  Reversal threshold: {}", config.detector.reversal_threshold);
    println!("  Window: {}ms", config.detector.window_ms);
    println!("  Minimum movement: {}px", config.detector.min_movement_px);
    println!("  Cooldown: {}ms", config.detector.cooldown_ms);
    println!();

    let store = match JsonFileStore::open(config.store_path()) {
        Ok(store) => store,
        Err(e) => {
            eprintln!("Warning: Could not open store: {e}");
            return;
        }
    };

    if store.get(ACTIVITY_KEY).is_none() {
        println!("No previous session data found.");
        return;
    }

    let stats = create_shared_log_from_store(&store).stats();
    println!("Cumulative Statistics:");
    println!("  Pointer samples: {}", stats.samples_observed);
    println!("  Samples discarded: {}", stats.samples_discarded);
    println!("  Shakes detected: {}", stats.shakes_detected);
    println!("  Shakes suppressed: {}", stats.shakes_suppressed);
    println!("  Locks: {}", store.get_counter(LOCK_COUNT_KEY));
    println!("  Unlocks: {}", stats.unlocks);
}

fn cmd_config() {
    let config = load_config();

    println!("Configuration");
    println!("=============");
    println!();
    println!("Config file: {:?}", Config::config_path());
    println!();
    println!(
        "{}",
        serde_json::to_string_pretty(&config).unwrap_or_else(|_| "Error".to_string())
    );
}

/// Set up Ctrl+C handler.
fn ctrlc_handler(running: Arc<AtomicBool>) {
    if let Err(e) = ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    }) {
        eprintln!("Warning: Could not set Ctrl+C handler: {e}");
    }
}
