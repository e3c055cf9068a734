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

//! Generic types shared by all document services.
//!
//! The types in this module describe what a resource looks like (its `Schema`), what a document
//! looks like before it is written (`ValidatedDocument`) and after it has been read back from the
//! store (`StoredDocument`), and how documents are identified (`ResourceId`).

mod document;
pub use document::{StoredDocument, ValidatedDocument};
mod id;
pub use id::ResourceId;
pub mod schema;
pub use schema::{FieldSpec, FieldType, Schema, ValidationError, ValidationReason};

/// Model errors.  These represent malformed data that cannot be turned into one of our types.
#[derive(Debug, PartialEq, thiserror::Error)]
#[error("{0}")]
pub struct ModelError(pub String);

/// Result type for this module.
pub type ModelResult<T> = Result<T, ModelError>;
