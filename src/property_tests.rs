//! Property-based tests for path scoping, the document codec and checkpoint
//! naming.
//!
//! # Tested Invariants
//!
//! - `unscope(scope(p)) == normalize(p)` for every principal and path
//! - Documents, floats included, survive encode then decode unchanged
//! - Encoded documents are pure ASCII
//! - Every checkpoint created for a path is found again by `list_all`
//! - Listing prefixes are idempotent under normalization

use proptest::prelude::*;
use serde_json::{Map, Value};

use crate::checkpoints::CheckpointManager;
use crate::client::{StoreClient, listing_prefix};
use crate::codec::{decode_document, encode_document};
use crate::model::{Content, ContentModel};
use crate::scope::{PathScoper, normalize};
use crate::storage::MemoryBackend;

// ============================================================================
// Test Strategies - Input Generation
// ============================================================================

fn principal_strategy() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,7}"
}

/// Logical paths, with stray leading and trailing slashes.
fn path_strategy() -> impl Strategy<Value = String> {
    (
        "/{0,2}",
        prop::collection::vec("[a-zA-Z0-9_.-]{1,8}", 0..4),
        "/{0,2}",
    )
        .prop_map(|(lead, segments, trail)| format!("{lead}{}{trail}", segments.join("/")))
}

/// File names the backends accept: never `.` or `..`.
fn file_name_strategy() -> impl Strategy<Value = String> {
    ("\\.?", "[a-z0-9_-]{1,8}", "(\\.[a-z]{1,4}){0,2}")
        .prop_map(|(dot, stem, ext)| format!("{dot}{stem}{ext}"))
}

fn checkpoint_id_strategy() -> impl Strategy<Value = String> {
    "[a-z0-9_]{1,10}"
}

/// JSON scalars, including any finite float.
fn json_leaf() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::from),
        any::<u64>().prop_map(Value::from),
        any::<f64>()
            .prop_filter("JSON has no NaN or infinity", |f| f.is_finite())
            .prop_map(Value::from),
        ".{0,16}".prop_map(Value::String),
    ]
}

fn json_value() -> impl Strategy<Value = Value> {
    json_leaf().prop_recursive(3, 32, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
            prop::collection::btree_map(".{0,8}", inner, 0..6)
                .prop_map(|map| Value::Object(map.into_iter().collect())),
        ]
    })
}

fn json_document() -> impl Strategy<Value = Value> {
    prop::collection::btree_map("[a-z_]{1,10}", json_value(), 0..6)
        .prop_map(|map| Value::Object(map.into_iter().collect::<Map<String, Value>>()))
}

// ============================================================================
// Scoping
// ============================================================================

proptest! {
    #[test]
    fn unscope_inverts_scope(principal in principal_strategy(), path in path_strategy()) {
        let scoper = PathScoper::new(principal.as_str());
        prop_assert_eq!(scoper.unscope(&scoper.scope(&path)), normalize(&path));
    }

    #[test]
    fn scoped_keys_stay_in_namespace(principal in principal_strategy(), path in path_strategy()) {
        let scoper = PathScoper::new(principal.as_str());
        let key = scoper.scope(&path);
        let namespace = format!("{principal}/");
        prop_assert!(key.starts_with(&namespace));
    }

    #[test]
    fn listing_prefix_is_idempotent(path in path_strategy()) {
        let once = listing_prefix(&path);
        prop_assert_eq!(listing_prefix(&once), once.clone());
        prop_assert!(once.is_empty() || once.ends_with('/'));
        prop_assert!(!once.starts_with('/'));
    }
}

// ============================================================================
// Document Codec
// ============================================================================

proptest! {
    #[test]
    fn document_round_trip(doc in json_document()) {
        let blob = encode_document(&doc).unwrap();
        prop_assert!(blob.is_ascii());
        prop_assert_eq!(decode_document(&blob).unwrap(), doc);
    }
}

// ============================================================================
// Checkpoint Naming
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn created_checkpoints_are_listed(
        dirs in prop::collection::vec("[a-z0-9_]{1,6}", 0..3),
        name in file_name_strategy(),
        id in checkpoint_id_strategy(),
    ) {
        let mut segments = dirs;
        segments.push(name);
        let path = segments.join("/");

        let checkpoints = CheckpointManager::new(
            StoreClient::custom(MemoryBackend::new()),
            PathScoper::new("alice"),
            "checkpoint",
        )
        .unwrap();
        let model = ContentModel::file(&path, Content::Text("x".into()));
        checkpoints.create(&model, &path, &id).unwrap();

        let listed = checkpoints.list_all(&path).unwrap();
        prop_assert_eq!(listed.len(), 1);
        prop_assert_eq!(&listed[0].id, &id);
        prop_assert_eq!(&listed[0].path, &path);
    }
}
