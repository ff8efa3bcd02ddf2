//! recstream - Streaming Record Iterator
//!
//! Entry point for the CLI application: streams the given identifiers
//! through an engine built from the iterator URI and reports how many
//! records survived.

use anyhow::{Context, Result};
use clap::Parser;
use recstream::config::{CliArgs, RunConfig};
use recstream::progress::{print_header, print_summary, ProgressReporter, RunStats};
use recstream::RecordIterator;
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, error, warn};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    match run() {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Run the stream; Ok(true) means every element was a record
fn run() -> Result<bool> {
    let args = CliArgs::parse();

    setup_logging(args.verbose)?;

    let config = RunConfig::from_args(args).context("Invalid configuration")?;

    let engine = Arc::new(
        RecordIterator::new(config.config.clone()).context("Failed to create iterator")?,
    );

    // Ctrl-C raises the engine's shutdown flag; the stream ends at its
    // next pull.
    let shutdown = engine.shutdown_flag();
    ctrlc::set_handler(move || {
        eprintln!("\nInterrupt received, stopping stream...");
        shutdown.store(true, Ordering::SeqCst);
    })
    .context("Failed to set signal handler")?;

    if !config.quiet {
        print_header(&config.config.reader_uri, config.identifiers.len());
    }

    let yielded = Arc::new(AtomicU64::new(0));
    let errors = Arc::new(AtomicU64::new(0));
    let start = Instant::now();

    // Sampler thread feeding the spinner from the engine's concurrently
    // readable counters.
    let sampler_stop = Arc::new(AtomicBool::new(false));
    let sampler = if config.show_progress {
        let engine = Arc::clone(&engine);
        let yielded = Arc::clone(&yielded);
        let errors = Arc::clone(&errors);
        let stop = Arc::clone(&sampler_stop);

        Some(thread::spawn(move || {
            let reporter = ProgressReporter::new();
            while !stop.load(Ordering::SeqCst) {
                let stats = RunStats {
                    seen: engine.seen(),
                    yielded: yielded.load(Ordering::Relaxed),
                    errors: errors.load(Ordering::Relaxed),
                };
                reporter.update(&stats, start.elapsed());
                thread::sleep(Duration::from_millis(100));
            }
            reporter.finish("done");
        }))
    } else {
        None
    };

    let mut stopped_early = false;

    {
        let stream = engine
            .stream(config.identifiers.clone())
            .context("Failed to start stream")?;

        for result in stream {
            match result {
                Ok(record) => {
                    debug!(path = record.path(), "record");
                    yielded.fetch_add(1, Ordering::Relaxed);
                }
                Err(e) => {
                    warn!("{}", e);
                    if !config.quiet {
                        eprintln!("{}", e);
                    }
                    errors.fetch_add(1, Ordering::Relaxed);
                    if config.fail_fast {
                        stopped_early = true;
                        break;
                    }
                }
            }
        }
    }

    if engine.shutdown_flag().load(Ordering::SeqCst) {
        stopped_early = true;
    }

    sampler_stop.store(true, Ordering::SeqCst);
    if let Some(handle) = sampler {
        let _ = handle.join();
    }

    let stats = RunStats {
        seen: engine.seen(),
        yielded: yielded.load(Ordering::Relaxed),
        errors: errors.load(Ordering::Relaxed),
    };

    if !config.quiet {
        print_summary(&stats, start.elapsed(), stopped_early);
    } else {
        println!("{}", stats.yielded);
    }

    engine.close().context("Failed to close iterator")?;

    Ok(stats.errors == 0)
}

/// Initialize tracing to stderr, honoring RUST_LOG when set
fn setup_logging(verbose: bool) -> Result<()> {
    let default_level = if verbose { "debug" } else { "warn" };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    Ok(())
}
