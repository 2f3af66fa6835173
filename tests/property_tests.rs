//! Property-based tests for sylius-mcp
//!
//! These tests verify invariants that must hold for all inputs:
//! - Locale resolution never panics and honours the fallback chain
//! - Dispatch never panics on arbitrary tool names and argument values
//! - Pagination stays bounded
//!
//! Run with: cargo test --test property_tests

use proptest::prelude::*;

// ============================================================================
// LOCALE RESOLUTION
// ============================================================================

mod locale_tests {
    use super::*;
    use sylius_mcp::catalog::{resolve_description, resolve_name};
    use sylius_mcp::types::{Product, ProductTranslation};

    fn product(translations: Vec<(String, String)>) -> Product {
        Product {
            id: 1,
            code: "CODE".to_string(),
            enabled: true,
            created_at: None,
            updated_at: None,
            translations: translations
                .into_iter()
                .enumerate()
                .map(|(i, (locale, name))| ProductTranslation {
                    id: i as i64,
                    locale,
                    name: Some(name),
                    description: None,
                })
                .collect(),
            variants: vec![],
        }
    }

    proptest! {
        /// Invariant: an exact match always wins over earlier rows
        #[test]
        fn exact_match_wins(
            others in prop::collection::vec(("[a-z]{2}_[A-Z]{2}", "[a-z]{1,8}"), 0..5),
            wanted in "[a-z]{1,8}",
        ) {
            let mut rows: Vec<_> = others
                .into_iter()
                .filter(|(locale, _)| locale != "xx_XX")
                .collect();
            rows.push(("xx_XX".to_string(), wanted.clone()));
            prop_assert_eq!(resolve_name(&product(rows), "xx_XX"), wanted);
        }

        /// Invariant: without a match the first row is used, else the code
        #[test]
        fn fallback_chain(rows in prop::collection::vec(("[a-z]{2}_[A-Z]{2}", "[a-z]{1,8}"), 0..5)) {
            let rows: Vec<_> = rows.into_iter().filter(|(l, _)| l != "zz_ZZ").collect();
            let expected = rows
                .first()
                .map(|(_, name)| name.clone())
                .unwrap_or_else(|| "CODE".to_string());
            let p = product(rows);
            prop_assert_eq!(resolve_name(&p, "zz_ZZ"), expected);
            prop_assert_eq!(resolve_description(&p, "zz_ZZ"), "");
        }
    }
}

// ============================================================================
// DISPATCH
// ============================================================================

mod dispatch_tests {
    use super::*;
    use once_cell::sync::Lazy;
    use serde_json::{json, Value};
    use sylius_mcp::catalog::Catalog;
    use sylius_mcp::mcp::Dispatcher;
    use sylius_mcp::storage::{seed_demo_catalog, Storage};
    use sylius_mcp::SyliusError;

    static DISPATCHER: Lazy<Dispatcher> = Lazy::new(|| {
        let storage = Storage::open_in_memory().unwrap();
        seed_demo_catalog(&storage).unwrap();
        Dispatcher::new(Catalog::new(storage))
    });

    fn arbitrary_json() -> impl Strategy<Value = Value> {
        prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::from),
            any::<i64>().prop_map(Value::from),
            "\\PC{0,12}".prop_map(Value::from),
        ]
    }

    proptest! {
        /// Invariant: unknown tool names always fail with UnknownTool
        #[test]
        fn unknown_names_rejected(name in "[a-z_]{1,24}") {
            prop_assume!(DISPATCHER.registry().get(&name).is_none());
            let result = DISPATCHER.dispatch(&name, &json!({}));
            prop_assert!(matches!(result, Err(SyliusError::UnknownTool(_))));
        }

        /// Invariant: arbitrary argument values never panic and only fail
        /// with validation errors
        #[test]
        fn arguments_never_escape_taxonomy(
            code in arbitrary_json(),
            limit in arbitrary_json(),
            offset in arbitrary_json(),
        ) {
            let args = json!({"code": code, "query": code, "limit": limit, "offset": offset});
            let tools = [
                "get_sylius_products",
                "get_sylius_product_by_code",
                "search_sylius_products",
            ];
            for tool in tools {
                if let Err(e) = DISPATCHER.dispatch(tool, &args) {
                    prop_assert!(e.is_validation(), "unexpected error: {}", e);
                }
            }
        }

        /// Invariant: listing never returns more than `limit` products
        #[test]
        fn listing_bounded(limit in 0i64..20, offset in 0i64..10) {
            let value = DISPATCHER
                .dispatch("get_sylius_products", &json!({"limit": limit, "offset": offset}))
                .unwrap()
                .into_value();
            let len = value.as_array().unwrap().len() as i64;
            prop_assert!(len <= limit);
            prop_assert_eq!(len, limit.min((5 - offset).max(0)));
        }

        /// Invariant: hello_world echoes any name
        #[test]
        fn hello_echoes(name in "\\PC{1,20}") {
            let text = DISPATCHER
                .dispatch("hello_world", &json!({"name": name}))
                .unwrap()
                .to_text();
            prop_assert_eq!(text, format!("Hello, {}!", name));
        }
    }
}
