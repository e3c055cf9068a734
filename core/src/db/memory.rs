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

//! In-memory implementation of the document store.
//!
//! This backend mimics the semantics of the MongoDB backend closely enough to run the business
//! and REST layers against it in tests: documents are kept in insertion order, sorts are stable
//! and use the same cross-type ordering as MongoDB, and unique constraints are enforced.

use crate::db::{Db, DbError, DbResult, DocumentStream, ID_FIELD, ListQuery, SortDirection};
use crate::model::{ResourceId, StoredDocument, ValidatedDocument};
use async_trait::async_trait;
use bson::{Bson, Document};
use futures::StreamExt;
use futures::lock::Mutex;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};

/// Returns the position of a BSON value's type in MongoDB's cross-type sort order.
fn type_rank(value: &Bson) -> u8 {
    match value {
        Bson::MinKey => 0,
        Bson::Null | Bson::Undefined => 1,
        Bson::Int32(_) | Bson::Int64(_) | Bson::Double(_) | Bson::Decimal128(_) => 2,
        Bson::String(_) | Bson::Symbol(_) => 3,
        Bson::Document(_) => 4,
        Bson::Array(_) => 5,
        Bson::Binary(_) => 6,
        Bson::ObjectId(_) => 7,
        Bson::Boolean(_) => 8,
        Bson::DateTime(_) => 9,
        Bson::Timestamp(_) => 10,
        Bson::RegularExpression(_) => 11,
        Bson::MaxKey => 13,
        _ => 12,
    }
}

/// Returns a numeric BSON value as a float for comparison purposes.
fn as_f64(value: &Bson) -> Option<f64> {
    match value {
        Bson::Int32(i) => Some(f64::from(*i)),
        Bson::Int64(i) => Some(*i as f64),
        Bson::Double(f) => Some(*f),
        _ => None,
    }
}

/// Compares two BSON values the way MongoDB does when sorting.
fn compare_bson(a: &Bson, b: &Bson) -> Ordering {
    let by_rank = type_rank(a).cmp(&type_rank(b));
    if by_rank != Ordering::Equal {
        return by_rank;
    }

    match (a, b) {
        (Bson::String(a), Bson::String(b)) => a.cmp(b),
        (Bson::Boolean(a), Bson::Boolean(b)) => a.cmp(b),
        (Bson::DateTime(a), Bson::DateTime(b)) => a.cmp(b),
        (Bson::ObjectId(a), Bson::ObjectId(b)) => a.to_hex().cmp(&b.to_hex()),
        (a, b) => match (as_f64(a), as_f64(b)) {
            (Some(a), Some(b)) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
            _ => Ordering::Equal,
        },
    }
}

/// Gets the value of `field` in `doc`, treating the identifier as a regular field and missing
/// fields as null.
fn field_value(doc: &StoredDocument, field: &str) -> Bson {
    if field == ID_FIELD {
        Bson::ObjectId(*doc.id().as_object_id())
    } else {
        doc.get(field).cloned().unwrap_or(Bson::Null)
    }
}

/// Checks if `doc` satisfies all the equality conditions in `filter`.
fn matches_filter(doc: &StoredDocument, filter: &Document) -> bool {
    filter.iter().all(|(field, expected)| field_value(doc, field) == *expected)
}

/// Contents of a single collection.
#[derive(Default)]
struct MemoryCollection {
    /// Documents in insertion order.
    docs: Vec<StoredDocument>,

    /// Fields that must not hold the same value in two different documents.
    unique: Vec<String>,
}

impl MemoryCollection {
    /// Returns the position of document `id`.
    fn position(&self, id: ResourceId) -> DbResult<usize> {
        self.docs.iter().position(|doc| *doc.id() == id).ok_or(DbError::NotFound)
    }

    /// Ensures that storing `candidate` at position `skip` would not violate unique constraints.
    fn check_unique(&self, candidate: &StoredDocument, skip: Option<usize>) -> DbResult<()> {
        for field in &self.unique {
            let value = field_value(candidate, field);
            let clash = self
                .docs
                .iter()
                .enumerate()
                .any(|(i, doc)| Some(i) != skip && field_value(doc, field) == value);
            if clash {
                return Err(DbError::AlreadyExists);
            }
        }
        Ok(())
    }
}

/// A document store that lives in memory and vanishes when dropped.
#[derive(Default)]
pub struct MemoryDb {
    /// All collections, keyed by name.  Collections are created on first write.
    collections: Mutex<HashMap<String, MemoryCollection>>,

    /// Whether operations should fail as if the store could not be reached.
    unavailable: AtomicBool,

    /// Whether the store has been closed.
    closed: AtomicBool,
}

impl MemoryDb {
    /// Makes all subsequent operations fail with `DbError::Unavailable` if `unavailable` is true,
    /// or work normally otherwise.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, AtomicOrdering::SeqCst);
    }

    /// Returns true if `close` has been called on the store.
    pub fn is_closed(&self) -> bool {
        self.closed.load(AtomicOrdering::SeqCst)
    }

    /// Fails if the store has been marked as unavailable.
    fn check_available(&self) -> DbResult<()> {
        if self.unavailable.load(AtomicOrdering::SeqCst) {
            Err(DbError::Unavailable)
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl Db for MemoryDb {
    async fn insert(&self, collection: &str, doc: ValidatedDocument) -> DbResult<ResourceId> {
        self.check_available()?;
        let mut collections = self.collections.lock().await;
        let collection = collections.entry(collection.to_owned()).or_default();

        let doc = StoredDocument::new(ResourceId::generate(), doc.into_fields());
        collection.check_unique(&doc, None)?;
        let id = *doc.id();
        collection.docs.push(doc);
        Ok(id)
    }

    async fn get(&self, collection: &str, id: ResourceId) -> DbResult<StoredDocument> {
        self.check_available()?;
        let collections = self.collections.lock().await;
        let collection = collections.get(collection).ok_or(DbError::NotFound)?;
        let pos = collection.position(id)?;
        Ok(collection.docs[pos].clone())
    }

    async fn update(
        &self,
        collection: &str,
        id: ResourceId,
        patch: ValidatedDocument,
    ) -> DbResult<StoredDocument> {
        self.check_available()?;
        let mut collections = self.collections.lock().await;
        let collection = collections.get_mut(collection).ok_or(DbError::NotFound)?;
        let pos = collection.position(id)?;

        let mut fields = collection.docs[pos].fields().clone();
        for (name, value) in patch.into_fields() {
            fields.insert(name, value);
        }
        let merged = StoredDocument::new(id, fields);
        collection.check_unique(&merged, Some(pos))?;
        collection.docs[pos] = merged.clone();
        Ok(merged)
    }

    async fn delete(&self, collection: &str, id: ResourceId) -> DbResult<()> {
        self.check_available()?;
        let mut collections = self.collections.lock().await;
        let collection = collections.get_mut(collection).ok_or(DbError::NotFound)?;
        let pos = collection.position(id)?;
        collection.docs.remove(pos);
        Ok(())
    }

    async fn list(&self, collection: &str, query: ListQuery) -> DbResult<DocumentStream> {
        self.check_available()?;
        let collections = self.collections.lock().await;

        let mut docs: Vec<StoredDocument> = match collections.get(collection) {
            Some(collection) => collection
                .docs
                .iter()
                .filter(|doc| matches_filter(doc, &query.filter))
                .cloned()
                .collect(),
            None => vec![],
        };

        if let Some(sort) = query.sort {
            docs.sort_by(|a, b| {
                let order =
                    compare_bson(&field_value(a, &sort.field), &field_value(b, &sort.field));
                // The sort is stable, so ties stay in insertion order in both directions.
                match sort.direction {
                    SortDirection::Ascending => order,
                    SortDirection::Descending => order.reverse(),
                }
            });
        }

        let offset = usize::try_from(query.offset).unwrap_or(usize::MAX);
        let limit = match query.limit {
            Some(limit) => usize::try_from(limit).unwrap_or(usize::MAX),
            None => usize::MAX,
        };
        let docs: Vec<DbResult<StoredDocument>> =
            docs.into_iter().skip(offset).take(limit).map(Ok).collect();
        Ok(futures::stream::iter(docs).boxed())
    }

    async fn ensure_unique(&self, collection: &str, field: &str) -> DbResult<()> {
        self.check_available()?;
        let mut collections = self.collections.lock().await;
        let collection = collections.entry(collection.to_owned()).or_default();
        if collection.unique.iter().any(|f| f == field) {
            return Ok(());
        }

        for (i, doc) in collection.docs.iter().enumerate() {
            let value = field_value(doc, field);
            if collection.docs[i + 1..].iter().any(|other| field_value(other, field) == value) {
                return Err(DbError::AlreadyExists);
            }
        }
        collection.unique.push(field.to_owned());
        Ok(())
    }

    async fn ping(&self) -> DbResult<()> {
        self.check_available()
    }

    async fn close(&self) {
        self.closed.store(true, AtomicOrdering::SeqCst);
    }
}
