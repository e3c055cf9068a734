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

//! Documents as seen by the persistence layer.

use crate::model::ResourceId;
use bson::{Bson, Document};
use derive_getters::Getters;
use derive_more::Constructor;

/// A document whose fields satisfied the schema of its resource.
///
/// Values of this type can only be obtained from a `Schema`, which makes it impossible for the
/// persistence layer to write unchecked data.
#[derive(Clone, Debug, PartialEq)]
pub struct ValidatedDocument(Document);

impl ValidatedDocument {
    /// Wraps an already-checked set of fields.
    pub(super) fn new(fields: Document) -> Self {
        Self(fields)
    }

    /// Returns a view of the validated fields.
    pub fn fields(&self) -> &Document {
        &self.0
    }

    /// Returns true if there are no fields in this document, which is only possible for patches.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Sets `name` to `value`.  The caller is responsible for type-checking the value.
    pub(super) fn insert(&mut self, name: &str, value: Bson) {
        self.0.insert(name, value);
    }

    /// Consumes the document and returns its fields.
    pub fn into_fields(self) -> Document {
        self.0
    }
}

/// A document as returned by the store, with the identifier the store assigned to it.
#[derive(Clone, Constructor, Debug, Getters, PartialEq)]
pub struct StoredDocument {
    /// Identifier of the document.
    id: ResourceId,

    /// Contents of the document, excluding the identifier.
    fields: Document,
}

impl StoredDocument {
    /// Gets the value of the field `name`, if present.
    pub fn get(&self, name: &str) -> Option<&Bson> {
        self.fields.get(name)
    }
}
