//! Santo MCP Server Entry Point
//!
//! Loads configuration, initializes logging, discovers the enabled tool
//! modules, prints the startup banner and serves the configured transport
//! until it stops or the process receives Ctrl-C.

use anyhow::Result;
use tracing::{Level, info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use santo_mcp_server::core::{Config, McpServer, print_banner};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration from environment
    let config = Config::from_env();

    // Initialize logging
    init_logging(&config.logging.level, config.logging.with_timestamps);

    info!("Starting {} v{}", config.server.name, config.server.version);

    // Discover tool modules and build the server
    let (server, report) = McpServer::bootstrap(config.clone())?;
    let tool_count = server.dispatcher().registry().len();

    for module in report.failed_modules() {
        warn!("Module {} is unavailable for this run", module);
    }
    info!("Server initialized with {} tool(s)", tool_count);

    print_banner(&config, &report, tool_count);

    // Run the configured transport
    tokio::select! {
        result = server.run() => result?,
        _ = tokio::signal::ctrl_c() => info!("Received Ctrl-C"),
    }

    info!("Server shutting down");

    Ok(())
}

/// Initialize the logging subsystem.
///
/// Logs go to stderr so the STDIO transport keeps stdout for protocol traffic.
fn init_logging(level: &str, with_timestamps: bool) {
    let level = match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    let builder = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr);

    if with_timestamps {
        builder.init();
    } else {
        builder.without_time().init();
    }
}
