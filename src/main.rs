//! TinyKV - An Embedded In-Memory Typed Key-Value Store
//!
//! This is the demo walkthrough for TinyKV. It creates a store, starts the
//! active expirer, and exercises every command, printing what comes back.

use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tinykv::{ActiveExpirer, ExpiryConfig, Store, Ttl};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Demo configuration
struct Config {
    /// Interval between active expiry sweeps
    sweep_interval: Duration,
    /// Pause between demo sections
    pause: Duration,
    /// TTL given to the session key in the expiry demo
    session_ttl: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sweep_interval: ExpiryConfig::default().interval,
            pause: Duration::ZERO,
            session_ttl: Duration::from_secs(3),
        }
    }
}

impl Config {
    /// Parse configuration from command-line arguments
    fn from_args() -> anyhow::Result<Self> {
        let mut config = Config::default();
        let args: Vec<String> = std::env::args().collect();

        let mut i = 1;
        while i < args.len() {
            match args[i].as_str() {
                "--sweep-interval-ms" | "-s" => {
                    config.sweep_interval = parse_millis(&args, i)?;
                    i += 2;
                }
                "--pause-ms" | "-p" => {
                    config.pause = parse_millis(&args, i)?;
                    i += 2;
                }
                "--session-ttl-ms" | "-t" => {
                    config.session_ttl = parse_millis(&args, i)?;
                    i += 2;
                }
                "--help" | "-h" => {
                    print_help();
                    std::process::exit(0);
                }
                "--version" | "-v" => {
                    println!("TinyKV version {}", tinykv::VERSION);
                    std::process::exit(0);
                }
                other => {
                    print_help();
                    anyhow::bail!("unknown argument: {}", other);
                }
            }
        }

        Ok(config)
    }
}

fn parse_millis(args: &[String], i: usize) -> anyhow::Result<Duration> {
    let raw = args
        .get(i + 1)
        .ok_or_else(|| anyhow::anyhow!("{} requires a value", args[i]))?;
    let ms: u64 = raw
        .parse()
        .map_err(|_| anyhow::anyhow!("invalid value for {}: {}", args[i], raw))?;
    Ok(Duration::from_millis(ms))
}

fn print_help() {
    println!(
        r#"
TinyKV - An Embedded In-Memory Typed Key-Value Store

USAGE:
    tinykv [OPTIONS]

OPTIONS:
    -s, --sweep-interval-ms <MS>   Active expiry sweep interval (default: 100)
    -p, --pause-ms <MS>            Pause between demo sections (default: 0)
    -t, --session-ttl-ms <MS>      TTL used in the expiry demo (default: 3000)
    -v, --version                  Print version information
    -h, --help                     Print this help message

LOGGING:
    Set RUST_LOG=debug to see every command the store executes.
"#
    );
}

fn section(title: &str, config: &Config) {
    thread::sleep(config.pause);
    println!();
    println!("═══════════════════════════════════════════════════════════════");
    println!(" {}", title);
    println!("═══════════════════════════════════════════════════════════════");
}

fn main() -> anyhow::Result<()> {
    // Set up logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = Config::from_args()?;

    println!("TinyKV v{} - Embedded In-Memory Key-Value Store", tinykv::VERSION);

    let store = Arc::new(Store::new());
    let mut expirer = ActiveExpirer::start(
        Arc::clone(&store),
        ExpiryConfig::with_interval(config.sweep_interval),
    )?;

    demo_strings(&store, &config)?;
    demo_hashes(&store, &config)?;
    demo_lists(&store, &config)?;
    demo_sets(&store, &config)?;
    demo_expiry(&store, &config)?;
    demo_leaderboard(&store, &config)?;
    demo_type_safety(&store, &config);
    demo_summary(&store, &config);

    expirer.stop();
    info!("Demo complete");
    Ok(())
}

fn demo_strings(store: &Store, config: &Config) -> anyhow::Result<()> {
    section("Strings - The Simplest Data Type", config);

    store.set("user:1000:name", "Alice");
    store.set("user:1000:age", "30");
    store.set("counter", "0");

    match store.get("user:1000:name")? {
        Some(name) => println!("✓ Retrieved: {}", name),
        None => println!("✗ user:1000:name not found"),
    }
    Ok(())
}

fn demo_hashes(store: &Store, config: &Config) -> anyhow::Result<()> {
    section("Hashes - Objects/Structs", config);

    store.hset("user:2000", "name", "Bob")?;
    store.hset("user:2000", "email", "bob@example.com")?;
    store.hset("user:2000", "age", "25")?;

    if let Some(user) = store.hgetall("user:2000")? {
        println!("✓ User object: {:?}", user);
    }
    if let Some(email) = store.hget("user:2000", "email")? {
        println!("✓ Email field: {}", email);
    }
    Ok(())
}

fn demo_lists(store: &Store, config: &Config) -> anyhow::Result<()> {
    section("Lists - Ordered Collections", config);

    let len = store.lpush("queue", ["task1", "task2", "task3"])?;
    println!("Added 3 tasks to queue (length: {})", len);

    println!("Popping tasks from the tail:");
    let mut n = 1;
    while let Some(task) = store.rpop("queue")? {
        println!("  {}. Processing: {}", n, task);
        n += 1;
    }
    println!("Queue exists afterwards: {}", store.exists("queue"));
    Ok(())
}

fn demo_sets(store: &Store, config: &Config) -> anyhow::Result<()> {
    section("Sets - Unique Collections", config);

    let added = store.sadd("tags", ["redis", "database", "cache"])?;
    println!("Added {} tags", added);
    let added = store.sadd("tags", ["redis"])?;
    println!("Re-adding 'redis' added {}", added);

    if let Some(members) = store.smembers("tags")? {
        let mut members: Vec<_> = members.into_iter().collect();
        members.sort();
        println!("✓ Unique tags: {:?}", members);
    }
    Ok(())
}

fn demo_expiry(store: &Store, config: &Config) -> anyhow::Result<()> {
    section("TTL & Expiration", config);

    store.set("session:abc123", "user_data");
    store.expire("session:abc123", config.session_ttl)?;
    println!("Set session with a {:?} TTL", config.session_ttl);

    println!("Watching TTL countdown...");
    let poll = (config.session_ttl / 3).max(Duration::from_millis(10));
    for _ in 0..5 {
        match store.ttl("session:abc123") {
            Ttl::Remaining(left) => println!("  TTL: {}ms remaining", left.as_millis()),
            Ttl::Persistent => println!("  TTL: none"),
            Ttl::Missing => {
                println!("  ⏰ Session expired and deleted!");
                break;
            }
        }
        thread::sleep(poll);
    }
    Ok(())
}

fn demo_leaderboard(store: &Store, config: &Config) -> anyhow::Result<()> {
    section("Real-World Example - Gaming Leaderboard", config);

    for (player, score) in [
        ("player1", "100"),
        ("player2", "95"),
        ("player3", "87"),
        ("player4", "150"),
    ] {
        store.hset("leaderboard:daily", player, score)?;
    }

    if let Some(scores) = store.hgetall("leaderboard:daily")? {
        let mut scores: Vec<(String, u64)> = scores
            .into_iter()
            .filter_map(|(player, score)| score.parse().ok().map(|s| (player, s)))
            .collect();
        scores.sort_by(|a, b| b.1.cmp(&a.1));
        println!("📊 Player Scores:");
        for (player, score) in scores {
            println!("   {}: {} points", player, score);
        }
    }

    store.expire("leaderboard:daily", Duration::from_secs(24 * 60 * 60))?;
    println!(
        "✓ Leaderboard resets in {} seconds",
        store.ttl("leaderboard:daily").as_secs()
    );
    Ok(())
}

fn demo_type_safety(store: &Store, config: &Config) {
    section("Type Safety", config);

    match store.hset("user:1000:name", "first", "Alice") {
        Ok(_) => println!("✗ HSET on a string key unexpectedly succeeded"),
        Err(e) => println!("✓ Rejected: {}", e),
    }
    match store.get("user:1000:name") {
        Ok(value) => println!("✓ Value untouched: {:?}", value),
        Err(e) => println!("✗ {}", e),
    }
    match store.expire("no-such-key", Duration::from_secs(1)) {
        Ok(()) => println!("✗ EXPIRE on a missing key unexpectedly succeeded"),
        Err(e) => println!("✓ Rejected: {}", e),
    }
}

fn demo_summary(store: &Store, config: &Config) {
    section("What's In The Store", config);

    let mut keys = store.keys();
    keys.sort();
    for key in &keys {
        let kind = store
            .key_type(key)
            .map(|k| k.as_str())
            .unwrap_or("none");
        println!("  {:<20} {:<7} ttl={}", key, kind, store.ttl(key).as_secs());
    }
    println!("DBSIZE = {}", store.len());

    let stats = store.stats();
    println!(
        "Stats: {} reads, {} writes, {} deletes, {} expired",
        stats.read_ops, stats.write_ops, stats.del_ops, stats.expired
    );
}
