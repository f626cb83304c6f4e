//! Basic logger usage example
//!
//! Demonstrates the three call styles, child loggers, severity bands and the
//! global logger.
//!
//! Run with: cargo run --example basic_usage

use rust_tee_logger::prelude::*;
use rust_tee_logger::{debug, info};

fn main() -> Result<()> {
    println!("=== Rust Tee Logger - Basic Usage Example ===\n");

    // Console output at debug, coloured levels
    let mut options = Options::new().with_level("debug");
    options.enable_color = true;
    let logger = build_logger(&options)?;

    println!("1. Three call styles:");
    logger.info("server started", &[Field::int("port", 8080)]);
    logger.infof(format_args!("listening on {}:{}", "0.0.0.0", 8080));
    logger.infow("config loaded", &kvs!["path", "/etc/app.json", "entries", 12]);

    println!("\n2. Severity bands (warn and above also go to stderr):");
    debug!(logger, "cache size {}", 512);
    info!(logger, "ready");
    logger.warn("disk usage high", &[Field::float("percent", 91.5)]);
    logger.error("upstream unreachable", &[Field::string("host", "db-1")]);

    println!("\n3. Child loggers:");
    let http = logger.with_name("http").with_values(&kvs!["requestId", "r-42"]);
    http.info("request served", &[Field::uint("status", 200)]);
    http.with_name("auth").warnw("token expiring", &kvs!["inSeconds", 30]);

    println!("\n4. Malformed key/value list (self-logged, never fatal):");
    logger.warnw("slow", &kvs!["elapsedMs", 120, "op"]);

    println!("\n5. Verbosity views:");
    let verbose = logger.v(LogLevel::Debug);
    println!("   debug view enabled: {}", verbose.enabled());
    verbose.info("visible because the logger runs at debug", &[]);

    println!("\n6. Global logger as JSON:");
    global::init(Options::new().with_format(Format::Json));
    global::info("global logger ready", &[Field::string("format", "json")]);
    global::with_name("worker").infow("job done", &kvs!["jobs", 3]);

    logger.flush()?;
    global::flush()?;

    println!("\n=== Example completed successfully! ===");
    Ok(())
}
