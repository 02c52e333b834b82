//! EmberKV Server Binary
//!
//! Starts the TCP server for EmberKV.

use std::sync::Arc;
use clap::Parser;
use emberkv::{Config, Engine, SnapshotSchedule};
use emberkv::network::Server;
use signal_hook::consts::{SIGINT, SIGTERM};
use signal_hook::iterator::Signals;
use tracing_subscriber::{fmt, EnvFilter};

/// EmberKV Server
#[derive(Parser, Debug)]
#[command(name = "emberkv-server")]
#[command(about = "In-memory Redis-protocol key-value server")]
#[command(version)]
struct Args {
    /// Data directory (holds dump.rdb)
    #[arg(short, long, default_value = "./emberkv_data")]
    data_dir: String,

    /// Listen address (host:port)
    #[arg(short, long, default_value = "127.0.0.1:6379")]
    listen: String,

    /// Milliseconds between snapshots (0 = only on shutdown)
    #[arg(short = 'i', long, default_value = "1000")]
    snapshot_interval_ms: u64,
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,emberkv=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let args = Args::parse();

    tracing::info!("EmberKV Server v{}", emberkv::VERSION);
    tracing::info!("Data directory: {}", args.data_dir);
    tracing::info!("Listen address: {}", args.listen);

    let schedule = match args.snapshot_interval_ms {
        0 => SnapshotSchedule::OnShutdown,
        ms => SnapshotSchedule::Interval { ms },
    };

    // Build config from args
    let config = Config::builder()
        .data_dir(&args.data_dir)
        .listen_addr(&args.listen)
        .snapshot_schedule(schedule)
        .build();

    // Open engine (restores the snapshot before anything is served)
    let engine = match Engine::open(config.clone()) {
        Ok(e) => Arc::new(e),
        Err(e) => {
            tracing::error!("Failed to open engine: {}", e);
            std::process::exit(1);
        }
    };

    tracing::info!("Engine initialized with {} keys", engine.key_count());

    let server = match Server::bind(config, Arc::clone(&engine)) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!("Failed to bind {}: {}", args.listen, e);
            std::process::exit(1);
        }
    };

    // SIGINT/SIGTERM stop the accept loop; the final snapshot is written below
    let mut signals = match Signals::new([SIGINT, SIGTERM]) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!("Failed to register signal handlers: {}", e);
            std::process::exit(1);
        }
    };
    let handle = server.shutdown_handle();
    std::thread::spawn(move || {
        if let Some(sig) = signals.forever().next() {
            tracing::info!("Received signal {}, initiating shutdown...", sig);
            handle.shutdown();
        }
    });

    if let Err(e) = server.run() {
        tracing::error!("Server error: {}", e);
    }

    let code = match engine.shutdown() {
        Ok(_) => 0,
        Err(e) => {
            tracing::error!("Final snapshot failed: {}", e);
            1
        }
    };

    tracing::info!("Server stopped");
    std::process::exit(code);
}
