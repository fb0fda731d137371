use scry::cli::Args;
use scry::config;
use scry::core::client::Client;
use scry::core::runtime::ClientRuntime;
use scry::server::ApiServer;

use anyhow::Context;
use clap::Parser;
use log::{debug, info};
use std::time::Duration;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command-line arguments first (needed for log setup)
    let args = Args::parse();

    // Create path configuration from CLI args and environment
    let path_config = config::PathConfig::from_env_and_cli(args.config_dir.clone());

    // Ensure directories exist
    if let Err(e) = config::ensure_dirs(&path_config) {
        eprintln!("Warning: Failed to create application directories: {}", e);
    }

    // Determine log level based on verbosity flags
    // 0 (default) = warn, 1 (-v) = info, 2 (-vv) = debug, 3+ (-vvv) = trace
    let log_level = match args.verbosity {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    // Initialize logger based on --log flag
    if let Some(log_path_opt) = &args.log_file {
        // File logging with specified verbosity level
        let log_path = log_path_opt
            .as_ref()
            .cloned()
            .unwrap_or_else(|| config::data_file("scry.log", &path_config));

        let file = std::fs::File::create(&log_path)
            .with_context(|| format!("Failed to create log file: {}", log_path.display()))?;

        env_logger::Builder::new()
            .filter_level(log_level)
            .filter_module("tiny_http", log::LevelFilter::Warn) // Suppress per-connection noise
            .format_timestamp_millis()
            .target(env_logger::Target::Pipe(Box::new(file)))
            .init();

        info!(
            "Logging to file: {} (level: {:?})",
            log_path.display(),
            log_level
        );
    } else {
        // Console logging with specified verbosity level (respects RUST_LOG if set)
        let default_level = match args.verbosity {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        };

        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
            .filter_module("tiny_http", log::LevelFilter::Warn) // Suppress per-connection noise
            .format_timestamp_millis()
            .init();
    }

    info!("Scry live-state bridge starting...");
    debug!("Command-line args: {:?}", args);
    info!(
        "Log path: {}",
        config::data_file("scry.log", &path_config).display()
    );

    // The simulated client and its loop. The loop runs on the main thread;
    // everything else talks to it through handles.
    let tick_interval = Duration::from_millis(args.tick_ms.max(1));
    let (runtime, handle) = ClientRuntime::new(Client::new(), tick_interval);
    info!("Simulation tick interval: {:?}", tick_interval);

    // Bind before entering the loop: a busy port is fatal at startup.
    let api_server = ApiServer::start(&args.api_addr(), handle)?;
    info!("Ready: curl http://{}/stats", api_server.addr());

    // Runs until the process is stopped; the API server holds a client
    // handle, so the queue never disconnects on its own.
    runtime.run();

    drop(api_server);
    Ok(())
}
