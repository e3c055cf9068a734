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

//! The `ResourceId` data type.

use crate::model::{ModelError, ModelResult};
use bson::oid::ObjectId;
use serde::de::Visitor;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// Identifier of a stored document.
///
/// Identifiers are assigned by the store when a document is created and never change afterwards.
/// They travel as 24-character hexadecimal strings in URLs and JSON payloads.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct ResourceId(ObjectId);

impl ResourceId {
    /// Creates a new identifier from an untrusted string `s`, making sure it is valid.
    pub fn new<S: AsRef<str>>(s: S) -> ModelResult<Self> {
        let s = s.as_ref();
        match ObjectId::parse_str(s) {
            Ok(oid) => Ok(Self(oid)),
            Err(_) => Err(ModelError(format!("Invalid document id '{}'", s))),
        }
    }

    /// Generates a fresh identifier.  Identifiers generated by the same process sort in creation
    /// order.
    pub fn generate() -> Self {
        Self(ObjectId::new())
    }

    /// Returns the identifier as the native store type.
    pub fn as_object_id(&self) -> &ObjectId {
        &self.0
    }

    /// Returns the hexadecimal representation of the identifier.
    pub fn to_hex(&self) -> String {
        self.0.to_hex()
    }
}

impl From<ObjectId> for ResourceId {
    fn from(oid: ObjectId) -> Self {
        Self(oid)
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.to_hex())
    }
}

impl Serialize for ResourceId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0.to_hex())
    }
}

/// A deserialization visitor for a `ResourceId`.
struct ResourceIdVisitor;

impl Visitor<'_> for ResourceIdVisitor {
    type Value = ResourceId;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a hexadecimal document id")
    }

    fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        ResourceId::new(v).map_err(|e| E::custom(e.to_string()))
    }
}

impl<'de> Deserialize<'de> for ResourceId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        deserializer.deserialize_str(ResourceIdVisitor)
    }
}
