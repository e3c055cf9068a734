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

//! High-level data types.

use docapi_core::model::{FieldSpec, FieldType, ModelError, ModelResult, Schema};
use rand::Rng;
use rand::distr::Alphanumeric;
use serde::Serialize;
#[cfg(test)]
use serde::Deserialize;

/// Name of the resource that holds arbitrary inventory items.
pub(crate) const ITEMS: &str = "items";

/// Name of the resource that holds shortened links.
pub(crate) const LINKS: &str = "links";

/// Returns the schema of the inventory items.
pub(crate) fn items_schema() -> Schema {
    Schema::new(vec![
        FieldSpec::required("name", FieldType::String),
        FieldSpec::required("qty", FieldType::Int),
    ])
}

/// Returns the schema of the shortened links.
///
/// The `short_code` and `created_at` fields are assigned by the server on creation.
pub(crate) fn links_schema() -> Schema {
    Schema::new(vec![
        FieldSpec::required("long_url", FieldType::Url),
        FieldSpec::required("short_code", FieldType::String).read_only(),
        FieldSpec::required("created_at", FieldType::DateTime).read_only(),
        FieldSpec::optional("expires_at", FieldType::DateTime),
        FieldSpec::optional("is_active", FieldType::Bool).with_default(true),
    ])
}

/// Returns all resources served by the app along with their schemas.
pub(crate) fn resources() -> Vec<(&'static str, Schema)> {
    vec![(ITEMS, items_schema()), (LINKS, links_schema())]
}

/// Random key that identifies a shortened link.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct ShortCode(String);

impl ShortCode {
    /// Number of characters in a short code.
    pub(crate) const LENGTH: usize = 7;

    /// Creates a new short code from an untrusted string `s`, making sure it is valid.
    pub(crate) fn new<S: Into<String>>(s: S) -> ModelResult<Self> {
        let s = s.into();
        if s.len() != Self::LENGTH || !s.chars().all(|ch| ch.is_ascii_alphanumeric()) {
            return Err(ModelError(format!("Invalid short code '{}'", s)));
        }
        Ok(Self(s))
    }

    /// Generates a new random short code.
    pub(crate) fn generate() -> Self {
        let code: String =
            rand::rng().sample_iter(&Alphanumeric).take(Self::LENGTH).map(char::from).collect();
        Self(code)
    }

    /// Returns a string view of the short code.
    pub(crate) fn as_str(&self) -> &str {
        &self.0
    }
}

/// One page of documents returned by a listing.
#[derive(Serialize)]
#[cfg_attr(test, derive(Debug, Deserialize, PartialEq))]
pub(crate) struct Page {
    /// The documents in this page, rendered for clients.
    pub(crate) items: Vec<serde_json::Value>,

    /// Number of matching documents that were skipped before this page.
    pub(crate) offset: u64,

    /// Maximum number of documents the page could hold.
    pub(crate) limit: u64,

    /// Offset to request the next page with, if there may be more documents.
    pub(crate) next_offset: Option<u64>,
}
