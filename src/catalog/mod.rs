//! Catalog query layer
//!
//! Turns stored products into locale-resolved [`ProductSummary`] records.
//! Each operation comes in two forms: `try_*` surfaces store failures as
//! [`SyliusError::StoreUnavailable`], while the plain form logs the failure
//! and answers with an empty list or `None`, which is what the tools expose.

pub mod locale;

pub use locale::{resolve_description, resolve_name, resolve_translation, resolve_variant_name};

use crate::error::{Result, SyliusError};
use crate::storage::queries;
use crate::storage::Storage;
use crate::types::{Product, ProductSummary, VariantSummary, DEFAULT_LOCALE};

/// Read-only access to the product catalog
#[derive(Clone)]
pub struct Catalog {
    storage: Storage,
    locale: String,
}

impl Catalog {
    pub fn new(storage: Storage) -> Self {
        Self::with_locale(storage, DEFAULT_LOCALE)
    }

    pub fn with_locale(storage: Storage, locale: impl Into<String>) -> Self {
        Self {
            storage,
            locale: locale.into(),
        }
    }

    /// Locale used for name and description resolution
    pub fn locale(&self) -> &str {
        &self.locale
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    /// Project a stored product into its transport shape
    pub fn summarize(&self, product: &Product) -> ProductSummary {
        summarize(product, &self.locale)
    }

    pub fn try_list_products(&self, limit: i64, offset: i64) -> Result<Vec<ProductSummary>> {
        let products = self
            .storage
            .with_connection(|conn| queries::list_enabled_products(conn, limit, offset))
            .map_err(store_unavailable)?;
        Ok(products.iter().map(|p| self.summarize(p)).collect())
    }

    pub fn try_get_product_by_code(&self, code: &str) -> Result<Option<ProductSummary>> {
        let product = self
            .storage
            .with_connection(|conn| queries::get_enabled_product_by_code(conn, code))
            .map_err(store_unavailable)?;
        Ok(product.as_ref().map(|p| self.summarize(p)))
    }

    pub fn try_search_products(&self, query: &str, limit: i64) -> Result<Vec<ProductSummary>> {
        let products = self
            .storage
            .with_connection(|conn| queries::search_enabled_products(conn, query, limit))
            .map_err(store_unavailable)?;
        Ok(products.iter().map(|p| self.summarize(p)).collect())
    }

    /// Enabled products in store order; empty on store failure
    pub fn list_products(&self, limit: i64, offset: i64) -> Vec<ProductSummary> {
        self.try_list_products(limit, offset)
            .unwrap_or_else(|e| {
                tracing::warn!(limit, offset, error = %e, "listing products failed");
                Vec::new()
            })
    }

    /// The enabled product with this exact code; `None` on store failure
    pub fn get_product_by_code(&self, code: &str) -> Option<ProductSummary> {
        self.try_get_product_by_code(code).unwrap_or_else(|e| {
            tracing::warn!(code, error = %e, "fetching product failed");
            None
        })
    }

    /// Enabled products matching `query` in any translation; empty on store failure
    pub fn search_products(&self, query: &str, limit: i64) -> Vec<ProductSummary> {
        self.try_search_products(query, limit).unwrap_or_else(|e| {
            tracing::warn!(query, limit, error = %e, "searching products failed");
            Vec::new()
        })
    }
}

fn store_unavailable(err: SyliusError) -> SyliusError {
    match err {
        SyliusError::StoreUnavailable(_) => err,
        other => SyliusError::StoreUnavailable(other.to_string()),
    }
}

/// Locale-resolved summary; only enabled variants are kept
pub fn summarize(product: &Product, locale: &str) -> ProductSummary {
    ProductSummary {
        id: product.id,
        code: product.code.clone(),
        name: resolve_name(product, locale),
        description: resolve_description(product, locale),
        enabled: product.enabled,
        created_at: product.created_at.map(|dt| dt.to_rfc3339()),
        variants: product
            .variants
            .iter()
            .filter(|v| v.enabled)
            .map(|v| VariantSummary {
                id: v.id,
                code: v.code.clone(),
                price: v.price(),
                on_hand: v.on_hand,
                tracked: v.tracked,
            })
            .collect(),
    }
}
