//! Catalog store queries
//!
//! Products are returned fully hydrated: translations, variants and variant
//! translations are attached in insertion (row id) order.

use chrono::{DateTime, NaiveDateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::error::Result;
use crate::types::*;

const PRODUCT_COLUMNS: &str = "p.id, p.code, p.enabled, p.created_at, p.updated_at";

/// Parse a stored timestamp. Accepts RFC 3339 and SQLite's
/// `CURRENT_TIMESTAMP` format (`YYYY-MM-DD HH:MM:SS`, UTC).
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

fn timestamp_column(row: &Row, column: &str) -> rusqlite::Result<Option<DateTime<Utc>>> {
    let raw: Option<String> = row.get(column)?;
    Ok(raw.as_deref().and_then(parse_timestamp))
}

/// Parse a product from a database row (children not loaded)
pub fn product_from_row(row: &Row) -> rusqlite::Result<Product> {
    Ok(Product {
        id: row.get("id")?,
        code: row.get("code")?,
        enabled: row.get::<_, i64>("enabled")? != 0,
        created_at: timestamp_column(row, "created_at")?,
        updated_at: timestamp_column(row, "updated_at")?,
        translations: vec![],
        variants: vec![],
    })
}

fn variant_from_row(row: &Row) -> rusqlite::Result<ProductVariant> {
    Ok(ProductVariant {
        id: row.get("id")?,
        code: row.get("code")?,
        position: row.get("position")?,
        enabled: row.get::<_, i64>("enabled")? != 0,
        tracked: row.get::<_, i64>("tracked")? != 0,
        on_hand: row.get("on_hand")?,
        on_hold: row.get("on_hold")?,
        weight: row.get("weight")?,
        width: row.get("width")?,
        height: row.get("height")?,
        depth: row.get("depth")?,
        created_at: timestamp_column(row, "created_at")?,
        updated_at: timestamp_column(row, "updated_at")?,
        translations: vec![],
    })
}

/// Load a product's translations in insertion order
pub fn load_product_translations(
    conn: &Connection,
    product_id: i64,
) -> Result<Vec<ProductTranslation>> {
    let mut stmt = conn.prepare_cached(
        "SELECT id, locale, name, description FROM sylius_product_translation
         WHERE product_id = ? ORDER BY id",
    )?;
    let translations = stmt
        .query_map([product_id], |row| {
            Ok(ProductTranslation {
                id: row.get(0)?,
                locale: row.get(1)?,
                name: row.get(2)?,
                description: row.get(3)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(translations)
}

/// Load a variant's translations in insertion order
pub fn load_variant_translations(
    conn: &Connection,
    variant_id: i64,
) -> Result<Vec<VariantTranslation>> {
    let mut stmt = conn.prepare_cached(
        "SELECT id, locale, name FROM sylius_product_variant_translation
         WHERE variant_id = ? ORDER BY id",
    )?;
    let translations = stmt
        .query_map([variant_id], |row| {
            Ok(VariantTranslation {
                id: row.get(0)?,
                locale: row.get(1)?,
                name: row.get(2)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(translations)
}

/// Load all variants of a product (enabled or not), in insertion order
pub fn load_variants(conn: &Connection, product_id: i64) -> Result<Vec<ProductVariant>> {
    let mut stmt = conn.prepare_cached(
        "SELECT id, code, position, enabled, tracked, on_hand, on_hold,
                weight, width, height, depth, created_at, updated_at
         FROM sylius_product_variant WHERE product_id = ? ORDER BY id",
    )?;
    let mut variants = stmt
        .query_map([product_id], variant_from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    for variant in &mut variants {
        variant.translations = load_variant_translations(conn, variant.id)?;
    }
    Ok(variants)
}

fn hydrate(conn: &Connection, mut product: Product) -> Result<Product> {
    product.translations = load_product_translations(conn, product.id)?;
    product.variants = load_variants(conn, product.id)?;
    Ok(product)
}

fn hydrate_all(conn: &Connection, products: Vec<Product>) -> Result<Vec<Product>> {
    products.into_iter().map(|p| hydrate(conn, p)).collect()
}

/// Enabled products in store order, paginated.
///
/// `limit` and `offset` go to SQLite untouched: a negative limit means no
/// limit, a negative offset behaves like zero.
pub fn list_enabled_products(conn: &Connection, limit: i64, offset: i64) -> Result<Vec<Product>> {
    let sql = format!(
        "SELECT {} FROM sylius_product p WHERE p.enabled = 1 ORDER BY p.id LIMIT ? OFFSET ?",
        PRODUCT_COLUMNS
    );
    let mut stmt = conn.prepare_cached(&sql)?;
    let products = stmt
        .query_map(params![limit, offset], product_from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    hydrate_all(conn, products)
}

/// The enabled product with exactly this code (case-sensitive)
pub fn get_enabled_product_by_code(conn: &Connection, code: &str) -> Result<Option<Product>> {
    let sql = format!(
        "SELECT {} FROM sylius_product p WHERE p.code = ? AND p.enabled = 1 LIMIT 1",
        PRODUCT_COLUMNS
    );
    let product = conn
        .query_row(&sql, [code], product_from_row)
        .optional()?;
    product.map(|p| hydrate(conn, p)).transpose()
}

/// Enabled products with any translation whose name or description contains
/// `query`, case-insensitively. Each product appears at most once.
pub fn search_enabled_products(conn: &Connection, query: &str, limit: i64) -> Result<Vec<Product>> {
    let sql = format!(
        "SELECT {} FROM sylius_product p
         WHERE p.enabled = 1
           AND EXISTS (
               SELECT 1 FROM sylius_product_translation t
               WHERE t.product_id = p.id
                 AND (contains_ci(t.name, ?1) OR contains_ci(t.description, ?1))
           )
         ORDER BY p.id LIMIT ?2",
        PRODUCT_COLUMNS
    );
    let mut stmt = conn.prepare_cached(&sql)?;
    let products = stmt
        .query_map(params![query, limit], product_from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    hydrate_all(conn, products)
}

/// Total number of products, enabled or not
pub fn count_products(conn: &Connection) -> Result<i64> {
    let count = conn.query_row("SELECT COUNT(*) FROM sylius_product", [], |row| row.get(0))?;
    Ok(count)
}

/// Input for inserting a product row
#[derive(Debug, Clone)]
pub struct NewProduct<'a> {
    pub code: &'a str,
    pub enabled: bool,
    pub created_at: Option<DateTime<Utc>>,
}

/// Input for inserting a variant row
#[derive(Debug, Clone)]
pub struct NewVariant<'a> {
    pub product_id: i64,
    pub code: &'a str,
    pub position: i64,
    pub enabled: bool,
    pub tracked: bool,
    pub on_hand: i64,
    pub on_hold: i64,
}

pub fn insert_product(conn: &Connection, input: &NewProduct) -> Result<i64> {
    let created_at = input.created_at.map(|dt| dt.to_rfc3339());
    conn.execute(
        "INSERT INTO sylius_product (code, enabled, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?3)",
        params![input.code, input.enabled, created_at],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn insert_product_translation(
    conn: &Connection,
    product_id: i64,
    locale: &str,
    name: &str,
    description: &str,
) -> Result<i64> {
    conn.execute(
        "INSERT INTO sylius_product_translation (product_id, locale, name, description)
         VALUES (?, ?, ?, ?)",
        params![product_id, locale, name, description],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn insert_variant(conn: &Connection, input: &NewVariant) -> Result<i64> {
    let now = Utc::now().to_rfc3339();
    conn.execute(
        "INSERT INTO sylius_product_variant
            (product_id, code, position, enabled, tracked, on_hand, on_hold, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)",
        params![
            input.product_id,
            input.code,
            input.position,
            input.enabled,
            input.tracked,
            input.on_hand,
            input.on_hold,
            now
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn insert_variant_translation(
    conn: &Connection,
    variant_id: i64,
    locale: &str,
    name: &str,
) -> Result<i64> {
    conn.execute(
        "INSERT INTO sylius_product_variant_translation (variant_id, locale, name)
         VALUES (?, ?, ?)",
        params![variant_id, locale, name],
    )?;
    Ok(conn.last_insert_rowid())
}
