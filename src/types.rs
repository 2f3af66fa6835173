//! Core catalog and configuration types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Locale used when no other is configured
pub const DEFAULT_LOCALE: &str = "en_US";

/// Fixed variant price. Pricing tables are not modelled.
pub const STUB_PRICE: f64 = 29.99;

/// A catalog product with its owned translations and variants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    /// Unique business key
    pub code: String,
    pub enabled: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    /// Ordered by insertion
    pub translations: Vec<ProductTranslation>,
    /// Ordered by insertion
    pub variants: Vec<ProductVariant>,
}

/// Per-locale product name and description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductTranslation {
    pub id: i64,
    pub locale: String,
    pub name: Option<String>,
    pub description: Option<String>,
}

/// A purchasable variant of a product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductVariant {
    pub id: i64,
    pub code: String,
    pub position: i64,
    pub enabled: bool,
    /// Whether stock levels are meaningful
    pub tracked: bool,
    pub on_hand: i64,
    pub on_hold: i64,
    pub weight: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub depth: Option<f64>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub translations: Vec<VariantTranslation>,
}

impl ProductVariant {
    /// Price of the variant
    pub fn price(&self) -> f64 {
        STUB_PRICE
    }
}

/// Per-locale variant name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariantTranslation {
    pub id: i64,
    pub locale: String,
    pub name: Option<String>,
}

/// Transport-ready, locale-resolved view of a product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductSummary {
    pub id: i64,
    pub code: String,
    pub name: String,
    pub description: String,
    pub enabled: bool,
    /// ISO-8601, or null when the store holds no timestamp
    pub created_at: Option<String>,
    pub variants: Vec<VariantSummary>,
}

/// Projection of an enabled variant inside a [`ProductSummary`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariantSummary {
    pub id: i64,
    pub code: String,
    pub price: f64,
    pub on_hand: i64,
    pub tracked: bool,
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Path to SQLite database, or `:memory:`
    pub db_path: String,
    /// Storage mode (local or cloud-safe)
    #[serde(default)]
    pub storage_mode: StorageMode,
    /// Number of pooled connections
    #[serde(default = "default_pool_size")]
    pub pool_size: usize,
}

fn default_pool_size() -> usize {
    4
}

impl StorageConfig {
    /// Configuration for a file-backed database in local mode
    pub fn local(db_path: impl Into<String>) -> Self {
        Self {
            db_path: db_path.into(),
            storage_mode: StorageMode::Local,
            pool_size: default_pool_size(),
        }
    }

    pub fn is_in_memory(&self) -> bool {
        self.db_path == ":memory:"
    }
}

/// Journal mode selection for the SQLite file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StorageMode {
    /// WAL journal, best for local disks
    #[default]
    Local,
    /// DELETE journal, safe inside cloud-synced folders
    CloudSafe,
}

impl std::str::FromStr for StorageMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "local" => Ok(StorageMode::Local),
            "cloud-safe" => Ok(StorageMode::CloudSafe),
            other => Err(format!("unknown storage mode: {}", other)),
        }
    }
}
