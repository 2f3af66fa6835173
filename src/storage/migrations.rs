//! Database migrations for the catalog schema

use rusqlite::Connection;

use crate::error::Result;

/// Current schema version
pub const SCHEMA_VERSION: i32 = 2;

/// Run all migrations
pub fn run_migrations(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )",
        [],
    )?;

    let current_version: i32 = conn
        .query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_version",
            [],
            |row| row.get(0),
        )
        .unwrap_or(0);

    if current_version < 1 {
        migrate_v1(conn)?;
    }

    if current_version < SCHEMA_VERSION {
        migrate_v2(conn)?;
    }

    Ok(())
}

/// Products, variants and their translations (v1)
fn migrate_v1(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS sylius_product (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            code TEXT NOT NULL UNIQUE,
            created_at TEXT,
            updated_at TEXT,
            enabled INTEGER NOT NULL DEFAULT 1
        );

        CREATE TABLE IF NOT EXISTS sylius_product_translation (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT,
            description TEXT,
            locale TEXT NOT NULL,
            product_id INTEGER REFERENCES sylius_product(id)
        );

        CREATE TABLE IF NOT EXISTS sylius_product_variant (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            code TEXT NOT NULL UNIQUE,
            position INTEGER NOT NULL DEFAULT 0,
            created_at TEXT,
            updated_at TEXT,
            enabled INTEGER NOT NULL DEFAULT 1,
            tracked INTEGER NOT NULL DEFAULT 0,
            on_hold INTEGER NOT NULL DEFAULT 0,
            on_hand INTEGER NOT NULL DEFAULT 0,
            weight REAL,
            width REAL,
            height REAL,
            depth REAL,
            product_id INTEGER REFERENCES sylius_product(id)
        );

        CREATE TABLE IF NOT EXISTS sylius_product_variant_translation (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT,
            locale TEXT NOT NULL,
            variant_id INTEGER REFERENCES sylius_product_variant(id)
        );

        INSERT OR IGNORE INTO schema_version (version) VALUES (1);
        "#,
    )?;

    Ok(())
}

/// Lookup indexes on foreign keys and the enabled flag (v2)
fn migrate_v2(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE INDEX IF NOT EXISTS idx_product_enabled ON sylius_product(enabled);
        CREATE INDEX IF NOT EXISTS idx_product_translation_product
            ON sylius_product_translation(product_id);
        CREATE INDEX IF NOT EXISTS idx_variant_product
            ON sylius_product_variant(product_id);
        CREATE INDEX IF NOT EXISTS idx_variant_translation_variant
            ON sylius_product_variant_translation(variant_id);

        INSERT OR IGNORE INTO schema_version (version) VALUES (2);
        "#,
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrations_are_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        run_migrations(&conn).unwrap();

        let version: i32 = conn
            .query_row("SELECT MAX(version) FROM schema_version", [], |row| {
                row.get(0)
            })
            .unwrap();
        assert_eq!(version, SCHEMA_VERSION);
    }

    #[test]
    fn test_product_code_is_unique() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        conn.execute("INSERT INTO sylius_product (code) VALUES ('A')", [])
            .unwrap();
        assert!(conn
            .execute("INSERT INTO sylius_product (code) VALUES ('A')", [])
            .is_err());
    }
}
