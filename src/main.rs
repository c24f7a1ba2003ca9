//! calltrack CLI
//!
//! Issues one HTTP request through a [`Tracker`] and reports the outcome,
//! showing the telemetry the selected sink receives.
//!
//! ```text
//! ┌──────────────┐    ┌──────────────┐    ┌──────────────┐
//! │   reqwest    │───▶│   Tracker    │───▶│     Sink     │
//! │   request    │    │ (track/pass) │    │ (log/mem/prom)│
//! └──────────────┘    └──────────────┘    └──────────────┘
//! ```

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tracing::{error, info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use calltrack::adapters::{InMemoryTelemetrySink, LoggingTelemetrySink, PrometheusTelemetrySink};
use calltrack::{
    CallTracker, CorrelationId, HttpCall, SinkKind, TelemetrySink, Tracker, TrackerConfig,
};

// =============================================================================
// CLI Arguments
// =============================================================================

/// calltrack - Run an HTTP request under dependency tracking
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Request URL
    url: String,

    /// Request method
    #[arg(long, short = 'X', default_value = "GET")]
    method: String,

    /// Correlation token attached to emitted events
    #[arg(long, env = "CALLTRACK_CORRELATION_ID")]
    correlation_id: Option<String>,

    /// Generate a random correlation token when none is given
    #[arg(long)]
    generate_correlation_id: bool,

    /// Telemetry sink (logging, memory, prometheus); overrides CALLTRACK_SINK
    #[arg(long)]
    sink: Option<String>,

    /// Run the request without any tracking; overrides CALLTRACK_ENABLED
    #[arg(long)]
    disable_tracking: bool,

    /// Log telemetry records at info level instead of debug; overrides CALLTRACK_LOG_INFO
    #[arg(long)]
    log_info_level: bool,

    /// Print Prometheus metrics after the request (prometheus sink only)
    #[arg(long)]
    print_metrics: bool,

    /// Request timeout in seconds
    #[arg(long, env = "CALLTRACK_TIMEOUT_SECONDS", default_value = "30")]
    timeout_seconds: u64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Output logs as JSON
    #[arg(long, env = "LOG_JSON")]
    log_json: bool,
}

/// Sink built for this run, kept concrete so results can be inspected.
enum BuiltSink {
    Logging(Arc<LoggingTelemetrySink>),
    Memory(Arc<InMemoryTelemetrySink>),
    Prometheus(Arc<PrometheusTelemetrySink>),
}

impl BuiltSink {
    fn build(config: &TrackerConfig) -> anyhow::Result<Self> {
        Ok(match config.sink {
            SinkKind::Logging if config.log_info_level => {
                BuiltSink::Logging(Arc::new(LoggingTelemetrySink::info_level()))
            }
            SinkKind::Logging => BuiltSink::Logging(Arc::new(LoggingTelemetrySink::debug_level())),
            SinkKind::Memory => BuiltSink::Memory(Arc::new(InMemoryTelemetrySink::new())),
            SinkKind::Prometheus => {
                BuiltSink::Prometheus(Arc::new(PrometheusTelemetrySink::new()?))
            }
        })
    }

    fn as_sink(&self) -> Arc<dyn TelemetrySink> {
        match self {
            BuiltSink::Logging(s) => s.clone(),
            BuiltSink::Memory(s) => s.clone(),
            BuiltSink::Prometheus(s) => s.clone(),
        }
    }
}

// =============================================================================
// Main
// =============================================================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    init_logging(&args);

    let config = TrackerConfig::from_env()?.with_overrides(
        args.disable_tracking,
        args.sink.as_deref(),
        args.log_info_level,
    )?;

    info!("Starting calltrack");
    info!("  Tracking enabled: {}", config.enabled);
    info!("  Sink: {}", config.sink);

    let sink = BuiltSink::build(&config)?;
    let tracker = Tracker::from_config(&config, Some(sink.as_sink()))?;

    let correlation_id = match args.correlation_id.as_deref() {
        Some(id) => Some(CorrelationId::new(id)),
        None if args.generate_correlation_id => Some(CorrelationId::generate()),
        None => None,
    };
    if let Some(id) = &correlation_id {
        info!("  Correlation ID: {}", id);
    }

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(args.timeout_seconds))
        .build()
        .context("failed to build HTTP client")?;

    let method: reqwest::Method = args
        .method
        .trim()
        .to_ascii_uppercase()
        .parse()
        .with_context(|| format!("invalid request method '{}'", args.method))?;
    let request = client
        .request(method, args.url.trim())
        .build()
        .with_context(|| format!("invalid request URL '{}'", args.url))?;
    let call = HttpCall::try_from(&request)?;

    let client = &client;
    let outcome = tracker
        .track_http_call(correlation_id, call, move || client.execute(request))
        .await;

    let response = match outcome {
        Ok(response) => response,
        Err(e) => {
            error!("Request failed: {}", e);
            report(&sink, args.print_metrics)?;
            return Err(e.into());
        }
    };

    println!("{} {}", response.status().as_u16(), response.url());
    report(&sink, args.print_metrics)?;

    Ok(())
}

fn report(sink: &BuiltSink, print_metrics: bool) -> anyhow::Result<()> {
    match sink {
        BuiltSink::Memory(memory) => {
            for record in memory.records() {
                println!("{}", serde_json::to_string(&record)?);
            }
        }
        BuiltSink::Prometheus(prometheus) if print_metrics => {
            print!("{}", prometheus.gather_text()?);
        }
        _ => {}
    }
    Ok(())
}

// =============================================================================
// Logging Setup
// =============================================================================

fn init_logging(args: &Args) {
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let filter = EnvFilter::from_default_env()
        .add_directive(level.into())
        .add_directive("hyper=warn".parse().expect("static directive"))
        .add_directive("reqwest=warn".parse().expect("static directive"));

    if args.log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true))
            .init();
    }
}
