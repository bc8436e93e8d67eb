//! kvferry CLI
//!
//! Copies every key from one Redis instance to another.

use std::sync::Arc;

use clap::Parser;
use kvferry::{CancelToken, Config, MigrateError, Migration, RedisPool};
use tracing_subscriber::{fmt, EnvFilter};

/// Redis key space migration through DUMP/RESTORE
#[derive(Parser, Debug)]
#[command(name = "kvferry")]
#[command(about = "Copy every key of a Redis instance to another, in native DUMP format")]
#[command(version)]
struct Args {
    /// Source URL (redis://host:port/db)
    #[arg(long)]
    from: String,

    /// Target URL (redis://host:port/db)
    #[arg(long)]
    to: String,

    /// Don't log every key
    #[arg(short, long)]
    silent: bool,

    /// Sync key TTLs
    #[arg(long)]
    ttl: bool,

    /// Payloads buffered between reader and writer
    #[arg(long, default_value = "100")]
    bus_capacity: usize,

    /// SCAN COUNT hint
    #[arg(long, default_value = "10")]
    scan_count: usize,

    /// Idle connections kept per pool
    #[arg(long, default_value = "4")]
    pool_size: usize,
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,kvferry=info"));

    fmt().with_env_filter(filter).with_target(false).init();

    let args = Args::parse();

    let config = Config::builder()
        .source_url(&args.from)
        .target_url(&args.to)
        .quiet(args.silent)
        .sync_ttl(args.ttl)
        .bus_capacity(args.bus_capacity)
        .scan_count(args.scan_count)
        .pool_size(args.pool_size)
        .build();

    if let Err(e) = run(config) {
        tracing::error!("{}", e);
        std::process::exit(1);
    }

    tracing::info!("sync done");
}

fn run(config: Config) -> kvferry::Result<()> {
    config.validate()?;

    tracing::info!("kvferry v{}", kvferry::VERSION);
    tracing::info!("{} -> {}", config.source_url, config.target_url);

    let source = open(&config.source_url, config.pool_size)?;
    let target = open(&config.target_url, config.pool_size)?;

    let cancel = CancelToken::new();
    Migration::new(source, target, config).run(&cancel)
}

fn open(url: &str, pool_size: usize) -> kvferry::Result<Arc<RedisPool>> {
    RedisPool::open(url, pool_size)
        .map(Arc::new)
        .map_err(|source| MigrateError::Connect {
            url: url.to_string(),
            source,
        })
}
