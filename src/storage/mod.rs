//! Catalog store
//!
//! SQLite schema, pooled connections, and the read queries behind the
//! catalog tools.

mod connection;
mod migrations;
pub mod queries;
pub mod seed;

pub use connection::Storage;
pub use migrations::{run_migrations, SCHEMA_VERSION};
pub use seed::{seed_demo_catalog, SeedReport};
