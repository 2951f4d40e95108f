//! SDD Memory MCP Server
//!
//! Exposes the persistent cross-session memory engine (`sdd_memory_core`)
//! to a spec-driven-development assistant over the Model Context
//! Protocol: the Tool Contract surface on stdio, and optionally over
//! HTTP/SSE behind the `http` feature.

use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, Level};
use tracing_subscriber::EnvFilter;

use sdd_memory_core::{Storage, StoreConfig};

use sdd_memory_mcp::protocol::stdio::StdioTransport;
use sdd_memory_mcp::McpServer;

/// Parse command-line arguments and return the optional data directory
/// path. Returns `None` for the path if no `--data-dir` was specified.
/// Exits the process if `--help` or `--version` is requested.
fn parse_args() -> Option<PathBuf> {
    let args: Vec<String> = std::env::args().collect();
    let mut data_dir: Option<PathBuf> = None;
    let mut i = 1;

    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                println!("sdd-memory-mcp v{}", env!("CARGO_PKG_VERSION"));
                println!();
                println!("Persistent cross-session memory server for a spec-driven-development assistant.");
                println!();
                println!("USAGE:");
                println!("    sdd-memory-mcp [OPTIONS]");
                println!();
                println!("OPTIONS:");
                println!("    -h, --help              Print help information");
                println!("    -V, --version           Print version information");
                println!("    --data-dir <PATH>       Custom data directory");
                println!();
                println!("ENVIRONMENT:");
                println!("    RUST_LOG               Log level filter (e.g., debug, info, warn, error)");
                println!();
                println!("EXAMPLES:");
                println!("    sdd-memory-mcp");
                println!("    sdd-memory-mcp --data-dir /custom/path");
                println!("    RUST_LOG=debug sdd-memory-mcp");
                std::process::exit(0);
            }
            "--version" | "-V" => {
                println!("sdd-memory-mcp {}", env!("CARGO_PKG_VERSION"));
                std::process::exit(0);
            }
            "--data-dir" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --data-dir requires a path argument");
                    eprintln!("Usage: sdd-memory-mcp --data-dir <PATH>");
                    std::process::exit(1);
                }
                data_dir = Some(PathBuf::from(&args[i]));
            }
            arg if arg.starts_with("--data-dir=") => {
                let path = arg.strip_prefix("--data-dir=").unwrap_or("");
                if path.is_empty() {
                    eprintln!("error: --data-dir requires a path argument");
                    eprintln!("Usage: sdd-memory-mcp --data-dir <PATH>");
                    std::process::exit(1);
                }
                data_dir = Some(PathBuf::from(path));
            }
            arg => {
                eprintln!("error: unknown argument '{}'", arg);
                eprintln!("Usage: sdd-memory-mcp [OPTIONS]");
                eprintln!("Try 'sdd-memory-mcp --help' for more information.");
                std::process::exit(1);
            }
        }
        i += 1;
    }

    data_dir
}

#[tokio::main]
async fn main() {
    let data_dir = parse_args();

    // Logging to stderr — stdout is reserved for JSON-RPC.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .with_writer(io::stderr)
        .with_target(false)
        .with_ansi(false)
        .init();

    info!("sdd-memory-mcp v{} starting...", env!("CARGO_PKG_VERSION"));

    let config = StoreConfig { data_dir, ..StoreConfig::default() };
    let storage = match Storage::open(config) {
        Ok(s) => {
            info!("Storage initialized successfully");
            Arc::new(s)
        }
        Err(e) => {
            error!("Failed to initialize storage: {}", e);
            std::process::exit(1);
        }
    };

    #[cfg(feature = "http")]
    {
        let http_storage = Arc::clone(&storage);
        tokio::spawn(async move {
            let default_config = sdd_memory_mcp::protocol::http::HttpTransportConfig::default();
            let config = sdd_memory_mcp::protocol::http::HttpTransportConfig {
                port: std::env::var("SDD_MEMORY_HTTP_PORT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(default_config.port),
                ..default_config
            };
            let transport = sdd_memory_mcp::protocol::http::HttpTransport::new(config);
            if let Err(e) = transport.run(http_storage).await {
                tracing::warn!("HTTP transport failed to start: {}", e);
            }
        });
    }

    let server = McpServer::new(storage);
    let transport = StdioTransport::new();

    info!("Starting MCP server on stdio...");
    if let Err(e) = transport.run(server).await {
        error!("Server error: {}", e);
        std::process::exit(1);
    }

    info!("sdd-memory-mcp shutting down");
}
