//! Demo catalog seeding

use chrono::Utc;
use serde::Serialize;

use super::queries::{
    count_products, insert_product, insert_product_translation, insert_variant,
    insert_variant_translation, NewProduct, NewVariant,
};
use super::Storage;
use crate::error::Result;
use crate::types::DEFAULT_LOCALE;

/// (code, name, description)
pub const DEMO_PRODUCTS: &[(&str, &str, &str)] = &[
    (
        "TSHIRT_RED",
        "T-Shirt Rouge",
        "Un beau t-shirt rouge de qualité supérieure",
    ),
    (
        "JEANS_BLUE",
        "Jean Bleu",
        "Jean bleu classique pour toutes occasions",
    ),
    (
        "SHOES_BLACK",
        "Chaussures Noires",
        "Chaussures élégantes en cuir véritable",
    ),
    (
        "HAT_GREEN",
        "Chapeau Vert",
        "Chapeau vert stylé pour compléter votre look",
    ),
    (
        "BAG_BROWN",
        "Sac Marron",
        "Sac en cuir marron spacieux et durable",
    ),
];

/// Outcome of a seeding run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum SeedReport {
    /// The catalog already held this many products; nothing was written
    Skipped { existing: i64 },
    Created { products: usize },
}

/// Seed the demo catalog unless any product already exists.
///
/// All rows are written in one transaction.
pub fn seed_demo_catalog(storage: &Storage) -> Result<SeedReport> {
    storage.with_transaction(|conn| {
        let existing = count_products(conn)?;
        if existing > 0 {
            tracing::info!(existing, "catalog already seeded");
            return Ok(SeedReport::Skipped { existing });
        }

        for &(code, name, description) in DEMO_PRODUCTS {
            let product_id = insert_product(
                conn,
                &NewProduct {
                    code,
                    enabled: true,
                    created_at: Some(Utc::now()),
                },
            )?;
            insert_product_translation(conn, product_id, DEFAULT_LOCALE, name, description)?;

            let variant_code = format!("{}_DEFAULT", code);
            let variant_id = insert_variant(
                conn,
                &NewVariant {
                    product_id,
                    code: &variant_code,
                    position: 0,
                    enabled: true,
                    tracked: true,
                    on_hand: 100,
                    on_hold: 0,
                },
            )?;
            insert_variant_translation(conn, variant_id, DEFAULT_LOCALE, name)?;
        }

        tracing::info!(products = DEMO_PRODUCTS.len(), "demo catalog seeded");
        Ok(SeedReport::Created {
            products: DEMO_PRODUCTS.len(),
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_is_idempotent() {
        let storage = Storage::open_in_memory().unwrap();
        assert_eq!(
            seed_demo_catalog(&storage).unwrap(),
            SeedReport::Created { products: 5 }
        );
        assert_eq!(
            seed_demo_catalog(&storage).unwrap(),
            SeedReport::Skipped { existing: 5 }
        );
    }

    #[test]
    fn test_seed_creates_one_enabled_variant_per_product() {
        let storage = Storage::open_in_memory().unwrap();
        seed_demo_catalog(&storage).unwrap();

        let variants: i64 = storage
            .with_connection(|conn| {
                Ok(conn.query_row(
                    "SELECT COUNT(*) FROM sylius_product_variant WHERE enabled = 1 AND on_hand = 100",
                    [],
                    |row| row.get(0),
                )?)
            })
            .unwrap();
        assert_eq!(variants, 5);
    }
}
