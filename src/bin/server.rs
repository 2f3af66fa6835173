//! Sylius MCP Server
//!
//! Run with: sylius-mcp-server [--transport http|stdio]

use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;

use sylius_mcp::catalog::Catalog;
use sylius_mcp::error::{Result, SyliusError};
use sylius_mcp::http::{self, AppState};
use sylius_mcp::logging::init_tracing;
use sylius_mcp::mcp::{Dispatcher, JsonRpcHandler, McpServer};
use sylius_mcp::storage::{seed_demo_catalog, Storage};
use sylius_mcp::types::{StorageConfig, StorageMode, DEFAULT_LOCALE};

#[derive(Parser, Debug)]
#[command(name = "sylius-mcp-server")]
#[command(about = "MCP tool server for a Sylius product catalog")]
#[command(version)]
struct Args {
    /// Database path
    #[arg(
        long,
        env = "SYLIUS_DB_PATH",
        default_value = "~/.local/share/sylius-mcp/catalog.db"
    )]
    db_path: String,

    /// Storage mode (local or cloud-safe)
    #[arg(long, env = "SYLIUS_STORAGE_MODE", default_value = "local")]
    storage_mode: String,

    /// Pooled database connections
    #[arg(long, env = "SYLIUS_POOL_SIZE", default_value = "4")]
    pool_size: usize,

    /// Transport (http or stdio)
    #[arg(long, env = "SYLIUS_TRANSPORT", default_value = "http")]
    transport: String,

    /// HTTP bind address
    #[arg(long, env = "SYLIUS_HOST", default_value = "0.0.0.0")]
    host: String,

    /// HTTP port
    #[arg(long, env = "SYLIUS_PORT", default_value = "8001")]
    port: u16,

    /// Locale used to resolve product names and descriptions
    #[arg(long, env = "SYLIUS_LOCALE", default_value = DEFAULT_LOCALE)]
    locale: String,

    /// Seed the demo catalog on start (skipped if products exist)
    #[arg(long, env = "SYLIUS_SEED")]
    seed: bool,

    /// Emit logs as JSON
    #[arg(long, env = "SYLIUS_LOG_JSON")]
    log_json: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.log_json);

    // Expand ~ in path
    let db_path = shellexpand::tilde(&args.db_path).to_string();
    let storage_mode: StorageMode = args.storage_mode.parse().map_err(SyliusError::Config)?;

    let storage = Storage::open(StorageConfig {
        db_path,
        storage_mode,
        pool_size: args.pool_size,
    })?;

    if let Some(warning) = storage.storage_mode_warning() {
        tracing::warn!("{}", warning);
    }

    if args.seed {
        let report = seed_demo_catalog(&storage)?;
        tracing::info!(?report, "seeding finished");
    }

    let catalog = Catalog::with_locale(storage, args.locale);
    let dispatcher = Arc::new(Dispatcher::new(catalog));

    match args.transport.as_str() {
        "stdio" => {
            tracing::info!("Sylius MCP server starting on stdio...");
            McpServer::new(JsonRpcHandler::new(dispatcher)).run()?;
        }
        "http" => {
            let addr: SocketAddr = format!("{}:{}", args.host, args.port)
                .parse()
                .map_err(|e| SyliusError::Config(format!("invalid bind address: {}", e)))?;

            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(http::serve(AppState::new(dispatcher), addr))?;
        }
        other => {
            return Err(SyliusError::Config(format!("unknown transport: {}", other)));
        }
    }

    Ok(())
}
