//! Locale resolution with fallback
//!
//! The rule is the same for every translated collection: exact locale match,
//! else the first translation in insertion order, else a caller-supplied
//! default. Duplicate locales resolve to the earliest row.

use crate::types::{Product, ProductTranslation, ProductVariant, VariantTranslation};

/// Anything carrying a locale tag
pub trait Localized {
    fn locale(&self) -> &str;
}

impl Localized for ProductTranslation {
    fn locale(&self) -> &str {
        &self.locale
    }
}

impl Localized for VariantTranslation {
    fn locale(&self) -> &str {
        &self.locale
    }
}

/// Pick the translation for `locale`, falling back to the first one
pub fn resolve_translation<'a, T: Localized>(translations: &'a [T], locale: &str) -> Option<&'a T> {
    translations
        .iter()
        .find(|t| t.locale() == locale)
        .or_else(|| translations.first())
}

/// Product name in `locale`; the product code when it has no translations.
/// A matched row with a NULL name yields an empty string.
pub fn resolve_name(product: &Product, locale: &str) -> String {
    match resolve_translation(&product.translations, locale) {
        Some(t) => t.name.clone().unwrap_or_default(),
        None => product.code.clone(),
    }
}

/// Product description in `locale`; empty when it has no translations
pub fn resolve_description(product: &Product, locale: &str) -> String {
    resolve_translation(&product.translations, locale)
        .and_then(|t| t.description.clone())
        .unwrap_or_default()
}

/// Variant name in `locale`; the variant code when it has no translations
pub fn resolve_variant_name(variant: &ProductVariant, locale: &str) -> String {
    match resolve_translation(&variant.translations, locale) {
        Some(t) => t.name.clone().unwrap_or_default(),
        None => variant.code.clone(),
    }
}
