// DocAPI
// Copyright 2026 Julio Merino
//
// Licensed under the Apache License, Version 2.0 (the "License"); you may not
// use this file except in compliance with the License.  You may obtain a copy
// of the License at:
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS, WITHOUT
// WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.  See the
// License for the specific language governing permissions and limitations
// under the License.

//! Generic abstraction to access document stores.
//!
//! The facilities in this module provide an abstraction over document stores such as MongoDB.
//! The MongoDB backend is for production use and the in-memory backend is primarily intended to
//! support unit tests.
//!
//! Write operations only accept `ValidatedDocument`s, so nothing reaches a store without having
//! gone through a schema first.  Absent documents are reported as `DbError::NotFound`, which
//! callers are expected to match on.

use crate::model::{ModelError, ResourceId, StoredDocument, ValidatedDocument};
use async_trait::async_trait;
use bson::Document;
use futures::stream::BoxStream;
use std::sync::Arc;

#[cfg(any(test, feature = "memory"))]
pub mod memory;
#[cfg(feature = "mongodb")]
pub mod mongo;

/// Name of the field that holds the document identifier in the store.
pub const ID_FIELD: &str = "_id";

/// Database errors.  Any unexpected errors that come from the database are classified as
/// `BackendError`, but errors we know about have more specific types.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum DbError {
    /// Indicates that a write failed because it would violate a uniqueness constraint.
    #[error("Already exists")]
    AlreadyExists,

    /// Catch-all error type for unexpected database errors.
    #[error("Database error: {0}")]
    BackendError(String),

    /// Indicates a failure processing the data that already exists in the database.
    #[error("Data integrity error: {0}")]
    DataIntegrityError(String),

    /// Indicates that a requested document does not exist.
    #[error("Entity not found")]
    NotFound,

    /// Indicates that the database is not available (maybe because it cannot be reached or
    /// because of too many active concurrent connections).
    #[error("Unavailable")]
    Unavailable,
}

impl From<ModelError> for DbError {
    fn from(e: ModelError) -> Self {
        DbError::DataIntegrityError(e.to_string())
    }
}

/// Result type for this module.
pub type DbResult<T> = Result<T, DbError>;

/// Direction in which to sort listed documents.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum SortDirection {
    /// Smallest values first.
    #[default]
    Ascending,

    /// Largest values first.
    Descending,
}

/// Sorting criteria for a listing.
#[derive(Clone, Debug, PartialEq)]
pub struct Sort {
    /// Name of the stored field to sort by.  Use `ID_FIELD` to sort by identifier.
    pub field: String,

    /// Direction of the sort.
    pub direction: SortDirection,
}

/// Parameters of a listing.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ListQuery {
    /// Equality conditions that returned documents must satisfy, keyed by stored field name.
    pub filter: Document,

    /// Sorting criteria.  Documents come back in insertion order when not set, and ties are
    /// always broken by insertion order.
    pub sort: Option<Sort>,

    /// Number of matching documents to skip.
    pub offset: u64,

    /// Maximum number of documents to return.
    pub limit: Option<u64>,
}

/// Lazy sequence of documents returned by a listing.
pub type DocumentStream = BoxStream<'static, DbResult<StoredDocument>>;

/// Abstraction over the database connection.
///
/// All operations name the collection they act on.  Most code should not use this directly and
/// should go through a `Collection` instead.
#[async_trait]
pub trait Db {
    /// Stores a new document in `collection` and returns the identifier assigned to it.
    async fn insert(&self, collection: &str, doc: ValidatedDocument) -> DbResult<ResourceId>;

    /// Fetches the document `id` from `collection`.
    async fn get(&self, collection: &str, id: ResourceId) -> DbResult<StoredDocument>;

    /// Overwrites the fields present in `patch` in document `id` of `collection`, leaving all
    /// other fields untouched, and returns the merged document.
    async fn update(
        &self,
        collection: &str,
        id: ResourceId,
        patch: ValidatedDocument,
    ) -> DbResult<StoredDocument>;

    /// Removes document `id` from `collection`.
    async fn delete(&self, collection: &str, id: ResourceId) -> DbResult<()>;

    /// Returns the documents of `collection` that match `query`.
    async fn list(&self, collection: &str, query: ListQuery) -> DbResult<DocumentStream>;

    /// Ensures no two documents in `collection` have the same value for `field`.
    async fn ensure_unique(&self, collection: &str, field: &str) -> DbResult<()>;

    /// Checks if the database can serve requests.
    async fn ping(&self) -> DbResult<()>;

    /// Releases all resources held by the connection.
    async fn close(&self);
}

/// A named group of documents bound to a database connection.
#[derive(Clone)]
pub struct Collection {
    /// Name of the collection in the store.
    name: String,

    /// The database that holds the collection.
    db: Arc<dyn Db + Send + Sync>,
}

impl Collection {
    /// Binds the collection `name` of `db`.
    pub fn new<S: Into<String>>(db: Arc<dyn Db + Send + Sync>, name: S) -> Self {
        Self { name: name.into(), db }
    }

    /// Returns the name of the collection in the store.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Stores a new document and returns the identifier assigned to it.
    pub async fn create(&self, doc: ValidatedDocument) -> DbResult<ResourceId> {
        self.db.insert(&self.name, doc).await
    }

    /// Fetches the document `id`.
    pub async fn get(&self, id: ResourceId) -> DbResult<StoredDocument> {
        self.db.get(&self.name, id).await
    }

    /// Merges `patch` into document `id` and returns the result.
    pub async fn update(
        &self,
        id: ResourceId,
        patch: ValidatedDocument,
    ) -> DbResult<StoredDocument> {
        self.db.update(&self.name, id, patch).await
    }

    /// Removes the document `id`.
    pub async fn delete(&self, id: ResourceId) -> DbResult<()> {
        self.db.delete(&self.name, id).await
    }

    /// Returns the documents that match `query`.
    pub async fn list(&self, query: ListQuery) -> DbResult<DocumentStream> {
        self.db.list(&self.name, query).await
    }

    /// Ensures no two documents have the same value for `field`.
    pub async fn ensure_unique(&self, field: &str) -> DbResult<()> {
        self.db.ensure_unique(&self.name, field).await
    }
}

/// Macros to help instantiate tests for multiple database systems.
#[cfg(any(test, feature = "testutils"))]
pub mod testutils {
    pub use paste::paste;

    /// Instantiates the `module::name` test for the database configured by `setup`.
    ///
    /// The `extra` metadata parameter can be used to tag the generated tests.
    #[macro_export]
    macro_rules! generate_one_test [
        ( $name:ident, $setup:expr, $module:path $(, #[$extra:meta] )? ) => {
            #[tokio::test]
            $(#[$extra])?
            async fn $name() {
                $crate::db::testutils::paste! {
                    $module :: [< $name >]($setup).await;
                }
            }
        }
    ];

    pub use generate_one_test;

    /// Instantiates a collection of tests for a specific database system.
    ///
    /// The database implementation to run the tests against is determined by the `setup`
    /// expression, which needs to return a shareable database object.
    ///
    /// The `extra` metadata parameter can be used to tag the generated tests.
    #[macro_export]
    macro_rules! generate_tests [
        ( #[$extra:meta], $setup:expr, $module:path $(, $name:ident)+ ) => {
            $(
                $crate::db::testutils::generate_one_test!($name, $setup, $module, #[$extra]);
            )+
        };

        ( $setup:expr, $module:path $(, $name:ident)+ ) => {
            $(
                $crate::db::testutils::generate_one_test!($name, $setup, $module);
            )+
        };
    ];

    pub use generate_tests;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FieldSpec, FieldType, Schema};
    use bson::{Bson, doc};
    use futures::TryStreamExt;
    use serde_json::json;

    /// Returns a collection with a name that no other test uses.
    fn unique_collection(db: &Arc<dyn Db + Send + Sync>) -> Collection {
        Collection::new(db.clone(), format!("test_{}", ResourceId::generate()))
    }

    /// Returns the schema of the documents used by the tests.
    fn schema() -> Schema {
        Schema::new(vec![
            FieldSpec::required("name", FieldType::String),
            FieldSpec::required("qty", FieldType::Int),
            FieldSpec::optional("tag", FieldType::String),
        ])
    }

    /// Builds a new document with the given field values.
    fn new_doc(name: &str, qty: i64, tag: Option<&str>) -> ValidatedDocument {
        schema().validate(&json!({"name": name, "qty": qty, "tag": tag})).unwrap()
    }

    /// Builds a patch from raw JSON.
    fn patch(raw: serde_json::Value) -> ValidatedDocument {
        schema().validate_patch(&raw).unwrap()
    }

    /// Lists the names of the documents returned by `query`.
    async fn list_names(collection: &Collection, query: ListQuery) -> Vec<String> {
        let docs: Vec<StoredDocument> =
            collection.list(query).await.unwrap().try_collect().await.unwrap();
        docs.iter().map(|d| d.get("name").unwrap().as_str().unwrap().to_owned()).collect()
    }

    pub(super) async fn test_insert_and_get(db: Arc<dyn Db + Send + Sync>) {
        let collection = unique_collection(&db);

        let doc = new_doc("widget", 3, None);
        let id = collection.create(doc.clone()).await.unwrap();

        let stored = collection.get(id).await.unwrap();
        assert_eq!(&id, stored.id());
        assert_eq!(doc.fields(), stored.fields());

        db.close().await;
    }

    pub(super) async fn test_insert_assigns_distinct_ids(db: Arc<dyn Db + Send + Sync>) {
        let collection = unique_collection(&db);

        let id1 = collection.create(new_doc("same", 1, None)).await.unwrap();
        let id2 = collection.create(new_doc("same", 1, None)).await.unwrap();
        assert_ne!(id1, id2);

        db.close().await;
    }

    pub(super) async fn test_get_not_found(db: Arc<dyn Db + Send + Sync>) {
        let collection = unique_collection(&db);

        collection.create(new_doc("widget", 3, None)).await.unwrap();
        assert_eq!(DbError::NotFound, collection.get(ResourceId::generate()).await.unwrap_err());

        db.close().await;
    }

    pub(super) async fn test_update_merges(db: Arc<dyn Db + Send + Sync>) {
        let collection = unique_collection(&db);

        let id = collection.create(new_doc("widget", 3, Some("a"))).await.unwrap();

        let merged = collection.update(id, patch(json!({"qty": 7}))).await.unwrap();
        assert_eq!(&id, merged.id());
        assert_eq!(&doc! {"name": "widget", "qty": 7i64, "tag": "a"}, merged.fields());

        assert_eq!(merged, collection.get(id).await.unwrap());

        db.close().await;
    }

    pub(super) async fn test_update_empty_patch(db: Arc<dyn Db + Send + Sync>) {
        let collection = unique_collection(&db);

        let id = collection.create(new_doc("widget", 3, None)).await.unwrap();
        let before = collection.get(id).await.unwrap();

        assert_eq!(before, collection.update(id, patch(json!({}))).await.unwrap());

        db.close().await;
    }

    pub(super) async fn test_update_not_found(db: Arc<dyn Db + Send + Sync>) {
        let collection = unique_collection(&db);

        assert_eq!(
            DbError::NotFound,
            collection.update(ResourceId::generate(), patch(json!({"qty": 1}))).await.unwrap_err()
        );
        assert_eq!(
            DbError::NotFound,
            collection.update(ResourceId::generate(), patch(json!({}))).await.unwrap_err()
        );

        db.close().await;
    }

    pub(super) async fn test_delete(db: Arc<dyn Db + Send + Sync>) {
        let collection = unique_collection(&db);

        let id1 = collection.create(new_doc("first", 1, None)).await.unwrap();
        let id2 = collection.create(new_doc("second", 2, None)).await.unwrap();

        collection.delete(id1).await.unwrap();
        assert_eq!(DbError::NotFound, collection.get(id1).await.unwrap_err());
        assert_eq!(DbError::NotFound, collection.delete(id1).await.unwrap_err());
        collection.get(id2).await.unwrap();

        db.close().await;
    }

    pub(super) async fn test_list_insertion_order(db: Arc<dyn Db + Send + Sync>) {
        let collection = unique_collection(&db);

        assert!(list_names(&collection, ListQuery::default()).await.is_empty());

        for name in ["c", "a", "b"] {
            collection.create(new_doc(name, 1, None)).await.unwrap();
        }
        assert_eq!(vec!["c", "a", "b"], list_names(&collection, ListQuery::default()).await);

        db.close().await;
    }

    pub(super) async fn test_list_is_restartable(db: Arc<dyn Db + Send + Sync>) {
        let collection = unique_collection(&db);

        for name in ["x", "y"] {
            collection.create(new_doc(name, 1, None)).await.unwrap();
        }
        let first = list_names(&collection, ListQuery::default()).await;
        let second = list_names(&collection, ListQuery::default()).await;
        assert_eq!(first, second);

        db.close().await;
    }

    pub(super) async fn test_list_filter(db: Arc<dyn Db + Send + Sync>) {
        let collection = unique_collection(&db);

        collection.create(new_doc("a", 1, Some("red"))).await.unwrap();
        collection.create(new_doc("b", 2, Some("blue"))).await.unwrap();
        collection.create(new_doc("c", 1, None)).await.unwrap();
        let id = collection.create(new_doc("d", 1, Some("red"))).await.unwrap();

        let query = ListQuery { filter: doc! {"qty": 1i64}, ..Default::default() };
        assert_eq!(vec!["a", "c", "d"], list_names(&collection, query).await);

        let query = ListQuery { filter: doc! {"qty": 1i64, "tag": "red"}, ..Default::default() };
        assert_eq!(vec!["a", "d"], list_names(&collection, query).await);

        let query = ListQuery { filter: doc! {"tag": Bson::Null}, ..Default::default() };
        assert_eq!(vec!["c"], list_names(&collection, query).await);

        let query =
            ListQuery { filter: doc! {ID_FIELD: *id.as_object_id()}, ..Default::default() };
        assert_eq!(vec!["d"], list_names(&collection, query).await);

        let query = ListQuery { filter: doc! {"qty": 100i64}, ..Default::default() };
        assert!(list_names(&collection, query).await.is_empty());

        db.close().await;
    }

    pub(super) async fn test_list_sort(db: Arc<dyn Db + Send + Sync>) {
        let collection = unique_collection(&db);

        collection.create(new_doc("a", 2, None)).await.unwrap();
        collection.create(new_doc("b", 1, None)).await.unwrap();
        collection.create(new_doc("c", 2, None)).await.unwrap();
        collection.create(new_doc("d", 3, None)).await.unwrap();

        let sort = Sort { field: "qty".to_owned(), direction: SortDirection::Ascending };
        let query = ListQuery { sort: Some(sort), ..Default::default() };
        assert_eq!(vec!["b", "a", "c", "d"], list_names(&collection, query).await);

        let sort = Sort { field: "qty".to_owned(), direction: SortDirection::Descending };
        let query = ListQuery { sort: Some(sort), ..Default::default() };
        assert_eq!(vec!["d", "a", "c", "b"], list_names(&collection, query).await);

        let sort = Sort { field: ID_FIELD.to_owned(), direction: SortDirection::Descending };
        let query = ListQuery { sort: Some(sort), ..Default::default() };
        assert_eq!(vec!["d", "c", "b", "a"], list_names(&collection, query).await);

        db.close().await;
    }

    pub(super) async fn test_list_offset_and_limit(db: Arc<dyn Db + Send + Sync>) {
        let collection = unique_collection(&db);

        for name in ["a", "b", "c", "d", "e"] {
            collection.create(new_doc(name, 1, None)).await.unwrap();
        }

        let query = ListQuery { limit: Some(2), ..Default::default() };
        assert_eq!(vec!["a", "b"], list_names(&collection, query).await);

        let query = ListQuery { offset: 2, limit: Some(2), ..Default::default() };
        assert_eq!(vec!["c", "d"], list_names(&collection, query).await);

        let query = ListQuery { offset: 4, limit: Some(2), ..Default::default() };
        assert_eq!(vec!["e"], list_names(&collection, query).await);

        let query = ListQuery { offset: 10, ..Default::default() };
        assert!(list_names(&collection, query).await.is_empty());

        db.close().await;
    }

    pub(super) async fn test_collections_are_isolated(db: Arc<dyn Db + Send + Sync>) {
        let collection1 = unique_collection(&db);
        let collection2 = unique_collection(&db);

        let id = collection1.create(new_doc("a", 1, None)).await.unwrap();

        assert_eq!(DbError::NotFound, collection2.get(id).await.unwrap_err());
        assert_eq!(DbError::NotFound, collection2.delete(id).await.unwrap_err());
        assert!(list_names(&collection2, ListQuery::default()).await.is_empty());

        db.close().await;
    }

    pub(super) async fn test_ensure_unique(db: Arc<dyn Db + Send + Sync>) {
        let collection = unique_collection(&db);

        collection.ensure_unique("name").await.unwrap();
        collection.ensure_unique("name").await.unwrap();

        collection.create(new_doc("a", 1, None)).await.unwrap();
        let id = collection.create(new_doc("b", 1, None)).await.unwrap();

        assert_eq!(
            DbError::AlreadyExists,
            collection.create(new_doc("a", 2, None)).await.unwrap_err()
        );
        assert_eq!(
            DbError::AlreadyExists,
            collection.update(id, patch(json!({"name": "a"}))).await.unwrap_err()
        );

        collection.update(id, patch(json!({"name": "b", "qty": 5}))).await.unwrap();
        assert_eq!(vec!["a", "b"], list_names(&collection, ListQuery::default()).await);

        db.close().await;
    }

    pub(super) async fn test_ping(db: Arc<dyn Db + Send + Sync>) {
        db.ping().await.unwrap();
        db.close().await;
    }

    /// Instantiates the tests that every database backend must pass.
    macro_rules! generate_db_tests [
        ( $setup:expr $(, #[$extra:meta])? ) => {
            $crate::db::testutils::generate_tests!(
                $( #[$extra], )?
                $setup,
                $crate::db::tests,
                test_insert_and_get,
                test_insert_assigns_distinct_ids,
                test_get_not_found,
                test_update_merges,
                test_update_empty_patch,
                test_update_not_found,
                test_delete,
                test_list_insertion_order,
                test_list_is_restartable,
                test_list_filter,
                test_list_sort,
                test_list_offset_and_limit,
                test_collections_are_isolated,
                test_ensure_unique,
                test_ping
            );
        }
    ];

    pub(super) use generate_db_tests;
}
