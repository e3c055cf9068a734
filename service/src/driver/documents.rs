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

//! Operations on the documents of any resource.

use crate::driver::Driver;
use crate::model::{LINKS, Page};
use docapi_core::db::{ID_FIELD, ListQuery, Sort, SortDirection};
use docapi_core::driver::{DriverError, DriverResult};
use docapi_core::model::{ResourceId, StoredDocument};
use futures::TryStreamExt;
use serde_json::Value;

/// Largest offset that MongoDB accepts as a skip count.
pub(crate) const MAX_OFFSET: u64 = i64::MAX as u64;

/// Client-supplied parameters of a listing.
#[derive(Debug, Default)]
pub(crate) struct ListRequest {
    /// Equality filters as `(field, value)` pairs, with values still in textual form.
    pub(crate) filters: Vec<(String, String)>,

    /// Name of the field to sort by, if any.  `id` sorts by identifier.
    pub(crate) sort: Option<String>,

    /// Direction of the sort.
    pub(crate) direction: SortDirection,

    /// Number of matching documents to skip.
    pub(crate) offset: u64,

    /// Maximum number of documents to return, if the client asked for a limit.
    pub(crate) limit: Option<u64>,
}

impl Driver {
    /// Creates a new document of `resource` from the client-supplied `raw` body.
    pub(crate) async fn create_document(self, resource: &str, raw: Value) -> DriverResult<Value> {
        if resource == LINKS {
            return self.create_link(raw).await;
        }

        let res = self.resource(resource)?;
        let doc = res.schema.validate(&raw)?;
        let fields = doc.fields().clone();
        let id = res.collection.create(doc).await?;
        self.render(resource, &StoredDocument::new(id, fields))
    }

    /// Gets the document `id` of `resource`.
    pub(crate) async fn get_document(self, resource: &str, id: ResourceId) -> DriverResult<Value> {
        let res = self.resource(resource)?;
        let doc = res.collection.get(id).await?;
        self.render(resource, &doc)
    }

    /// Merges the client-supplied `raw` fields into the document `id` of `resource`.
    ///
    /// Fields not present in `raw` keep their current values.
    pub(crate) async fn update_document(
        self,
        resource: &str,
        id: ResourceId,
        raw: Value,
    ) -> DriverResult<Value> {
        let res = self.resource(resource)?;
        let patch = res.schema.validate_patch(&raw)?;
        let doc = res.collection.update(id, patch).await?;
        self.render(resource, &doc)
    }

    /// Deletes the document `id` of `resource`.
    pub(crate) async fn delete_document(self, resource: &str, id: ResourceId) -> DriverResult<()> {
        let res = self.resource(resource)?;
        res.collection.delete(id).await?;
        Ok(())
    }

    /// Lists one page of the documents of `resource` that match `request`.
    pub(crate) async fn list_documents(
        self,
        resource: &str,
        request: ListRequest,
    ) -> DriverResult<Page> {
        let res = self.resource(resource)?;

        let limit = match request.limit {
            None => self.opts.default_page_size,
            Some(limit) if (1..=self.opts.max_page_size).contains(&limit) => limit,
            Some(limit) => {
                return Err(DriverError::InvalidInput(format!(
                    "Limit {} must be between 1 and {}",
                    limit, self.opts.max_page_size
                )));
            }
        };
        if request.offset > MAX_OFFSET {
            return Err(DriverError::InvalidInput(format!(
                "Offset {} must be at most {}",
                request.offset, MAX_OFFSET
            )));
        }

        let sort = match request.sort {
            None => None,
            Some(field) if field == "id" => {
                Some(Sort { field: ID_FIELD.to_owned(), direction: request.direction })
            }
            Some(field) if res.schema.field(&field).is_some() => {
                Some(Sort { field, direction: request.direction })
            }
            Some(field) => {
                return Err(DriverError::InvalidInput(format!(
                    "Cannot sort by unknown field '{}'",
                    field
                )));
            }
        };

        let mut filter = bson::Document::new();
        for (name, value) in request.filters {
            if name == "id" {
                let id = ResourceId::new(&value)
                    .map_err(|e| DriverError::InvalidInput(e.to_string()))?;
                filter.insert(ID_FIELD, *id.as_object_id());
            } else {
                let value = res.schema.parse_filter(&name, &value)?;
                filter.insert(name, value);
            }
        }

        let query = ListQuery { filter, sort, offset: request.offset, limit: Some(limit) };
        let docs: Vec<StoredDocument> = res.collection.list(query).await?.try_collect().await?;

        let next_offset = if docs.len() as u64 == limit {
            Some(request.offset.saturating_add(limit))
        } else {
            None
        };
        let mut items = Vec::with_capacity(docs.len());
        for doc in &docs {
            items.push(self.render(resource, doc)?);
        }
        Ok(Page { items, offset: request.offset, limit, next_offset })
    }
}
