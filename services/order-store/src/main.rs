//! Order Store driver
//!
//! Thin command-line front end over [`ConcurrentOrderStore`]:
//! - `demo` replays the sample session (insert, aggregate, display, remove)
//! - `stress` hammers the store from many threads and checks the totals

use anyhow::{Result, bail};
use clap::{Parser, Subcommand};
use order_store::{ConcurrentOrderStore, StoreConfig, StoreError};
use std::sync::Barrier;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;
use tracing::{error, info, warn};

/// Sample instruments used by the demo session
const DEMO_SYMBOLS: [&str; 10] = [
    "NESTLEIND",
    "HDFCBANK",
    "RELIANCE",
    "TCS",
    "INFY",
    "SBIN",
    "ICICIBANK",
    "LT",
    "BAJFINANCE",
    "HINDUNILVR",
];

/// Order Store CLI
#[derive(Parser)]
#[clap(name = "order-store")]
#[clap(about = "Concurrent symbol-partitioned order aggregation store")]
struct Cli {
    #[clap(subcommand)]
    command: Option<Commands>,

    /// Path to a JSON store configuration
    #[clap(long, global = true)]
    config: Option<String>,

    /// Enable debug output
    #[clap(long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the sample insert/aggregate/remove session
    Demo,

    /// Concurrent insert and enumerate load
    Stress {
        /// Number of writer threads
        #[clap(long, default_value = "8")]
        threads: usize,

        /// Inserts per writer thread
        #[clap(long, default_value = "10000")]
        inserts: usize,

        /// Number of distinct symbols
        #[clap(long, default_value = "16")]
        symbols: usize,

        /// Number of distinct price levels per symbol
        #[clap(long, default_value = "8")]
        levels: i64,

        /// Lots per insert
        #[clap(long, default_value = "1")]
        lot_size: i64,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_directive = if cli.debug { "order_store=debug" } else { "order_store=info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_directive.parse()?),
        )
        .with_target(false)
        .with_thread_ids(true)
        .with_line_number(true)
        .init();

    let config = match &cli.config {
        Some(path) => StoreConfig::load(path)?,
        None => StoreConfig::default(),
    };
    info!(?config, "store configuration");

    match cli.command.unwrap_or(Commands::Demo) {
        Commands::Demo => run_demo(config),
        Commands::Stress {
            threads,
            inserts,
            symbols,
            levels,
            lot_size,
        } => run_stress(config, threads, inserts, symbols, levels, lot_size),
    }
}

fn run_demo(config: StoreConfig) -> Result<()> {
    let store = ConcurrentOrderStore::with_config(config);

    for symbol in DEMO_SYMBOLS {
        store.insert(symbol, 10, 2)?;
    }

    // Same price aggregates, new price opens a level
    store.insert("NESTLEIND", 20, 2)?;
    store.insert("HDFCBANK", 15, 4)?;

    print!("{}", store.enumerate());

    store.remove("NESTLEIND")?;

    print!("{}", store.enumerate());

    // Missing symbol is reported and the session carries on
    match store.remove("NONEXISTENT") {
        Ok(_) => warn!("NONEXISTENT unexpectedly present"),
        Err(StoreError::SymbolNotFound(symbol)) => eprintln!("Error: Symbol {symbol} not found for removal."),
        Err(e) => return Err(e.into()),
    }

    Ok(())
}

fn run_stress(
    config: StoreConfig,
    threads: usize,
    inserts: usize,
    symbols: usize,
    levels: i64,
    lot_size: i64,
) -> Result<()> {
    if threads == 0 || symbols == 0 || levels <= 0 {
        bail!("threads, symbols and levels must be positive");
    }

    let store = ConcurrentOrderStore::with_config(config);
    let names: Vec<String> = (0..symbols).map(|i| format!("SYM{i:04}")).collect();
    let barrier = Barrier::new(threads + 1);
    let writers_done = AtomicUsize::new(0);
    let started = Instant::now();

    let snapshots_taken = crossbeam::thread::scope(|s| {
        for t in 0..threads {
            let (store, names, barrier, writers_done) = (&store, &names, &barrier, &writers_done);
            s.spawn(move |_| {
                barrier.wait();
                for i in 0..inserts {
                    let symbol = &names[(t + i) % names.len()];
                    let price = (i as i64) % levels;
                    if let Err(e) = store.insert(symbol, lot_size, price) {
                        error!(%symbol, "insert failed: {e}");
                    }
                }
                writers_done.fetch_add(1, Ordering::Release);
            });
        }

        // Reader keeps enumerating while writers run
        let reader = s.spawn(|_| {
            barrier.wait();
            let mut taken = 0usize;
            let mut last_total = 0i128;
            while writers_done.load(Ordering::Acquire) < threads {
                let total = store.enumerate().total_lots();
                if total < last_total {
                    error!(%total, %last_total, "snapshot total went backwards");
                }
                last_total = total;
                taken += 1;
            }
            taken
        });

        reader.join().unwrap_or(0)
    })
    .map_err(|_| anyhow::anyhow!("stress worker panicked"))?;

    let elapsed = started.elapsed();
    let snapshot = store.enumerate();
    let expected = (threads * inserts) as i128 * i128::from(lot_size);
    let metrics = store.metrics();

    info!(
        elapsed_ms = elapsed.as_millis() as u64,
        snapshots_taken,
        symbols = snapshot.len(),
        "stress run complete"
    );
    println!("{}", metrics.format_report());

    if metrics.rejected_orders > 0 {
        bail!("{} of {} inserts rejected", metrics.rejected_orders, threads * inserts);
    }
    if snapshot.total_lots() != expected {
        bail!("lost updates: expected {expected} lots, found {}", snapshot.total_lots());
    }
    println!("OK: {expected} lots across {} symbols", snapshot.len());
    Ok(())
}
