//! Sylius MCP CLI
//!
//! Schema setup, demo seeding, and local tool calls without a server.

use clap::{Parser, Subcommand};
use serde_json::Value;

use sylius_mcp::catalog::{resolve_name, resolve_variant_name, Catalog};
use sylius_mcp::error::{Result, SyliusError};
use sylius_mcp::logging::init_tracing;
use sylius_mcp::mcp::{Dispatcher, Envelope};
use sylius_mcp::storage::{queries, seed_demo_catalog, SeedReport, Storage};
use sylius_mcp::types::{StorageConfig, DEFAULT_LOCALE};

#[derive(Parser)]
#[command(name = "sylius-mcp")]
#[command(about = "Sylius catalog tools CLI")]
#[command(version)]
struct Cli {
    /// Database path
    #[arg(
        long,
        env = "SYLIUS_DB_PATH",
        default_value = "~/.local/share/sylius-mcp/catalog.db"
    )]
    db_path: String,

    /// Locale used to resolve product names and descriptions
    #[arg(long, env = "SYLIUS_LOCALE", default_value = DEFAULT_LOCALE)]
    locale: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the schema and seed demo products if the catalog is empty
    InitDb,
    /// List available tools
    Tools,
    /// Call a tool and print its envelope
    Call {
        /// Tool name
        tool: String,
        /// Arguments as a JSON object
        #[arg(short, long, default_value = "{}")]
        args: String,
    },
    /// List enabled products
    Products {
        /// Maximum number to return
        #[arg(short, long, default_value = "10")]
        limit: i64,
        /// Number of products to skip
        #[arg(short, long, default_value = "0")]
        offset: i64,
    },
}

fn main() -> Result<()> {
    init_tracing(false);
    let cli = Cli::parse();

    // Expand ~ in path
    let db_path = shellexpand::tilde(&cli.db_path).to_string();
    let storage = Storage::open(StorageConfig::local(db_path))?;

    match cli.command {
        Commands::InitDb => match seed_demo_catalog(&storage)? {
            SeedReport::Skipped { existing } => {
                println!("Catalog already contains {} products", existing);
            }
            SeedReport::Created { products } => {
                println!("Created {} demo products in {}", products, storage.db_path());
            }
        },
        Commands::Tools => {
            let dispatcher = Dispatcher::new(Catalog::with_locale(storage, cli.locale));
            for descriptor in dispatcher.registry().descriptors() {
                println!("{:<28} {}", descriptor.name, descriptor.description);
            }
        }
        Commands::Call { tool, args } => {
            let arguments: Value = serde_json::from_str(&args)
                .map_err(|e| SyliusError::Config(format!("--args is not valid JSON: {}", e)))?;
            let dispatcher = Dispatcher::new(Catalog::with_locale(storage, cli.locale));
            let result = dispatcher.dispatch(&tool, &arguments);
            if let Ok(output) = &result {
                if output.is_not_found() {
                    tracing::warn!(tool = %tool, "{}", output.to_text());
                }
            }
            let envelope = Envelope::from(result);
            println!("{}", serde_json::to_string_pretty(&envelope)?);
        }
        Commands::Products { limit, offset } => {
            let products =
                storage.with_connection(|conn| queries::list_enabled_products(conn, limit, offset))?;
            for product in &products {
                println!(
                    "{:<6} {:<16} {}",
                    product.id,
                    product.code,
                    resolve_name(product, &cli.locale)
                );
                for variant in product.variants.iter().filter(|v| v.enabled) {
                    println!(
                        "       {:<24} {:<24} on_hand={}",
                        variant.code,
                        resolve_variant_name(variant, &cli.locale),
                        variant.on_hand
                    );
                }
            }
        }
    }

    Ok(())
}
