//! Index Consistency Tests
//!
//! Tests for membership-set maintenance on the write path:
//! - additions ride the same batch as the record write
//! - stale memberships are removed when an indexed value changes
//! - unindexed writes never touch index keys
//! - foreign keys are indexed references

use std::sync::Arc;

use bridgekv::schema::{
    Attributes, FieldDef, FieldType, FieldValue, ModelDef, ModelRegistry, RegistryBuilder,
};
use bridgekv::storage::{MemoryClient, StorageClient};
use bridgekv::store::RecordStore;
use bridgekv::Query;

// =============================================================================
// Helper Functions
// =============================================================================

fn registry() -> Arc<ModelRegistry> {
    let mut builder = RegistryBuilder::new();
    builder
        .define(
            ModelDef::new("Person")
                .with_field("name", FieldDef::of(FieldType::Text))
                .with_field("age", FieldDef::indexed(FieldType::Integer)),
        )
        .unwrap();
    builder.define_foreign_key("Person", "company_id").unwrap();
    Arc::new(builder.build())
}

fn store_over(client: &MemoryClient) -> RecordStore<MemoryClient> {
    RecordStore::new(client.clone(), registry())
}

fn person(name: &str, age: i64) -> Attributes {
    let mut attrs = Attributes::new();
    attrs.insert("name".into(), FieldValue::Text(name.into()));
    attrs.insert("age".into(), FieldValue::Integer(age));
    attrs
}

// =============================================================================
// Membership Additions
// =============================================================================

/// create places the record in the membership list and every indexed
/// field's set within one batch.
#[tokio::test]
async fn test_create_populates_memberships() {
    let client = MemoryClient::new();
    let store = store_over(&client);

    let id = store.create("Person", person("a", 5)).await.unwrap();

    assert_eq!(
        client.set_members("s:Person").await.unwrap(),
        vec![id.to_string()]
    );
    assert_eq!(
        client.set_members("i:Person:age:5").await.unwrap(),
        vec![format!("Person:{}", id)]
    );
}

/// Unindexed fields never materialize index keys.
#[tokio::test]
async fn test_unindexed_fields_create_no_index_keys() {
    let client = MemoryClient::new();
    let store = store_over(&client);

    let mut attrs = Attributes::new();
    attrs.insert("name".into(), FieldValue::Text("a".into()));
    store.create("Person", attrs).await.unwrap();

    // "name" and the implicit id are unindexed; only the membership list
    // exists.
    assert!(client.keys("i:Person:").await.unwrap().is_empty());
}

/// Foreign keys registered at startup are indexed like any other field.
#[tokio::test]
async fn test_foreign_key_maintains_membership() {
    let client = MemoryClient::new();
    let store = store_over(&client);

    let mut attrs = person("a", 5);
    attrs.insert("company_id".into(), FieldValue::Reference("9".into()));
    let id = store.create("Person", attrs).await.unwrap();

    assert_eq!(
        client.set_members("i:Person:company_id:9").await.unwrap(),
        vec![format!("Person:{}", id)]
    );

    // Relation traversal is an indexed text lookup.
    let results = store
        .all("Person", &Query::new().filter_eq("company_id", "9"))
        .await
        .unwrap();
    assert_eq!(results.len(), 1);
}

// =============================================================================
// Stale Membership Removal
// =============================================================================

/// Changing an indexed value moves the membership: the stale set no longer
/// holds the record, the new one does.
#[tokio::test]
async fn test_update_moves_membership() {
    let client = MemoryClient::new();
    let store = store_over(&client);

    let id = store.create("Person", person("a", 5)).await.unwrap();

    let mut update = Attributes::new();
    update.insert("age".into(), FieldValue::Integer(7));
    store.update_attributes("Person", id, update).await.unwrap();

    assert!(client.set_members("i:Person:age:5").await.unwrap().is_empty());
    assert_eq!(
        client.set_members("i:Person:age:7").await.unwrap(),
        vec![format!("Person:{}", id)]
    );
}

/// After the move, a query by the old value finds nothing.
#[tokio::test]
async fn test_query_by_stale_value_is_empty() {
    let client = MemoryClient::new();
    let store = store_over(&client);

    let id = store.create("Person", person("a", 5)).await.unwrap();

    let mut full = person("a", 7);
    full.insert("id".into(), FieldValue::Integer(id as i64));
    store.save("Person", full).await.unwrap();

    let stale = store
        .all("Person", &Query::new().filter_eq("age", "5"))
        .await
        .unwrap();
    assert!(stale.is_empty());

    let current = store
        .all("Person", &Query::new().filter_eq("age", "7"))
        .await
        .unwrap();
    assert_eq!(current.len(), 1);
}

/// Saving an unchanged indexed value leaves the membership untouched.
#[tokio::test]
async fn test_unchanged_value_keeps_membership() {
    let client = MemoryClient::new();
    let store = store_over(&client);

    let id = store.create("Person", person("a", 5)).await.unwrap();

    let mut full = person("a", 5);
    full.insert("id".into(), FieldValue::Integer(id as i64));
    store.save("Person", full).await.unwrap();

    assert_eq!(
        client.set_members("i:Person:age:5").await.unwrap(),
        vec![format!("Person:{}", id)]
    );
}

// =============================================================================
// Write Failure Atomicity
// =============================================================================

/// When the write batch fails, the index state stays exactly as it was.
#[tokio::test]
async fn test_failed_save_keeps_prior_index_state() {
    let client = MemoryClient::new();
    let store = store_over(&client);

    let id = store.create("Person", person("a", 5)).await.unwrap();

    client.fail_writes("storage offline");
    let mut update = Attributes::new();
    update.insert("age".into(), FieldValue::Integer(7));
    let result = store.update_attributes("Person", id, update).await;
    assert!(result.is_err());
    client.restore_writes();

    // The stale removal did not happen without the write.
    assert_eq!(
        client.set_members("i:Person:age:5").await.unwrap(),
        vec![format!("Person:{}", id)]
    );
    assert!(client.set_members("i:Person:age:7").await.unwrap().is_empty());

    let found = store.find("Person", id).await.unwrap().unwrap();
    assert_eq!(found["age"], FieldValue::Integer(5));
}
