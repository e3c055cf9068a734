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

//! Resource schemas and the validation boundary.
//!
//! Every resource served by a service is described by a `Schema`: an ordered list of fields, each
//! with a type, an optionality flag, an optional default value and a read-only flag.  Untyped JSON
//! bodies only become documents that the persistence layer accepts after going through one of the
//! `validate*` methods in here.
//!
//! Validation is strict: keys that the schema does not declare are rejected instead of silently
//! dropped.  Only the first problem found is reported, checking declared fields in declaration
//! order before looking for unknown keys.

use crate::model::{ModelError, ModelResult, StoredDocument, ValidatedDocument};
use bson::{Bson, Document};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use url::Url;

/// Converts a timestamp to the representation used by the store, truncating it to milliseconds.
pub fn to_bson_datetime(dt: OffsetDateTime) -> bson::DateTime {
    let millis = dt.unix_timestamp_nanos().div_euclid(1_000_000);
    bson::DateTime::from_millis(i64::try_from(millis).unwrap_or(i64::MAX))
}

/// Converts a timestamp from the representation used by the store.
pub fn from_bson_datetime(dt: bson::DateTime) -> ModelResult<OffsetDateTime> {
    let nanos = i128::from(dt.timestamp_millis()) * 1_000_000;
    OffsetDateTime::from_unix_timestamp_nanos(nanos)
        .map_err(|e| ModelError(format!("Timestamp out of range: {}", e)))
}

/// Parses an RFC 3339 timestamp into the representation used by the store.
fn parse_datetime(s: &str) -> Option<bson::DateTime> {
    OffsetDateTime::parse(s, &Rfc3339).ok().map(to_bson_datetime)
}

/// Formats a timestamp from the store as an RFC 3339 string.
fn format_datetime(dt: bson::DateTime) -> ModelResult<String> {
    from_bson_datetime(dt)?
        .format(&Rfc3339)
        .map_err(|e| ModelError(format!("Cannot format timestamp: {}", e)))
}

/// Returns true if `s` is an absolute HTTP or HTTPS URL.
fn is_http_url(s: &str) -> bool {
    match Url::parse(s) {
        Ok(url) => matches!(url.scheme(), "http" | "https") && url.has_host(),
        Err(_) => false,
    }
}

/// Returns the name of the type of a JSON `value` as reported in validation errors.
fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(n) if n.is_i64() || n.is_u64() => "int",
        Value::Number(_) => "float",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Returns the name of the type of a BSON `value` as reported in validation errors.
fn bson_type_name(value: &Bson) -> &'static str {
    match value {
        Bson::Null => "null",
        Bson::Boolean(_) => "bool",
        Bson::Int32(_) | Bson::Int64(_) => "int",
        Bson::Double(_) => "float",
        Bson::String(_) => "string",
        Bson::DateTime(_) => "datetime",
        Bson::Array(_) => "array",
        Bson::Document(_) => "object",
        _ => "unsupported",
    }
}

/// Converts a stored BSON `value` to its JSON representation for responses.
fn bson_to_json(value: &Bson) -> ModelResult<Value> {
    match value {
        Bson::Null => Ok(Value::Null),
        Bson::Boolean(b) => Ok(Value::Bool(*b)),
        Bson::Int32(i) => Ok(Value::from(*i)),
        Bson::Int64(i) => Ok(Value::from(*i)),
        Bson::Double(f) => Number::from_f64(*f)
            .map(Value::Number)
            .ok_or_else(|| ModelError(format!("Cannot represent {} in JSON", f))),
        Bson::String(s) => Ok(Value::String(s.clone())),
        Bson::DateTime(dt) => Ok(Value::String(format_datetime(*dt)?)),
        Bson::ObjectId(oid) => Ok(Value::String(oid.to_hex())),
        Bson::Array(values) => {
            Ok(Value::Array(values.iter().map(bson_to_json).collect::<ModelResult<_>>()?))
        }
        Bson::Document(doc) => {
            let mut object = Map::new();
            for (key, value) in doc {
                object.insert(key.to_owned(), bson_to_json(value)?);
            }
            Ok(Value::Object(object))
        }
        other => Err(ModelError(format!("Unsupported stored value {:?}", other))),
    }
}

/// The types a field can hold.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FieldType {
    /// A boolean.
    Bool,

    /// A point in time, exchanged as an RFC 3339 string and stored with millisecond precision.
    DateTime,

    /// A 64-bit floating point number.  Integers are accepted and widened.
    Float,

    /// A 64-bit signed integer.  Numbers with a fractional part are rejected.
    Int,

    /// A UTF-8 string.
    String,

    /// An absolute HTTP or HTTPS URL, kept as the string that was supplied.
    Url,
}

impl FieldType {
    /// Returns the name of the type as reported in validation errors.
    pub fn name(self) -> &'static str {
        match self {
            FieldType::Bool => "bool",
            FieldType::DateTime => "datetime",
            FieldType::Float => "float",
            FieldType::Int => "int",
            FieldType::String => "string",
            FieldType::Url => "url",
        }
    }

    /// Converts a non-null JSON `value` to this type, or returns `None` if it does not fit.
    fn convert_json(self, value: &Value) -> Option<Bson> {
        match (self, value) {
            (FieldType::Bool, Value::Bool(b)) => Some(Bson::Boolean(*b)),
            (FieldType::DateTime, Value::String(s)) => parse_datetime(s).map(Bson::DateTime),
            (FieldType::Float, Value::Number(n)) => n.as_f64().map(Bson::Double),
            (FieldType::Int, Value::Number(n)) => n.as_i64().map(Bson::Int64),
            (FieldType::String, Value::String(s)) => Some(Bson::String(s.clone())),
            (FieldType::Url, Value::String(s)) if is_http_url(s) => Some(Bson::String(s.clone())),
            _ => None,
        }
    }

    /// Converts a textual `value`, such as one coming from a query string, to this type.
    fn convert_text(self, value: &str) -> Option<Bson> {
        match self {
            FieldType::Bool => match value {
                "true" => Some(Bson::Boolean(true)),
                "false" => Some(Bson::Boolean(false)),
                _ => None,
            },
            FieldType::DateTime => parse_datetime(value).map(Bson::DateTime),
            FieldType::Float => {
                value.parse::<f64>().ok().filter(|f| f.is_finite()).map(Bson::Double)
            }
            FieldType::Int => value.parse::<i64>().ok().map(Bson::Int64),
            FieldType::String => Some(Bson::String(value.to_owned())),
            FieldType::Url if is_http_url(value) => Some(Bson::String(value.to_owned())),
            FieldType::Url => None,
        }
    }

    /// Checks if a BSON `value` produced by server-side code has this type.
    fn matches(self, value: &Bson) -> bool {
        match (self, value) {
            (FieldType::Bool, Bson::Boolean(_)) => true,
            (FieldType::DateTime, Bson::DateTime(_)) => true,
            (FieldType::Float, Bson::Double(_)) => true,
            (FieldType::Int, Bson::Int32(_) | Bson::Int64(_)) => true,
            (FieldType::String, Bson::String(_)) => true,
            (FieldType::Url, Bson::String(s)) => is_http_url(s),
            _ => false,
        }
    }
}

/// Classification of validation failures.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationReason {
    /// A required field was not supplied.
    Missing,

    /// A field that only the server can set was supplied.
    ReadOnly,

    /// A field was supplied with a value of the wrong type.
    TypeMismatch,

    /// A field that the schema does not declare was supplied.
    UnknownField,
}

/// Details of why some input did not satisfy a schema.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize, thiserror::Error)]
#[error("{}", describe(.field, .reason, .expected, .actual))]
pub struct ValidationError {
    /// Name of the offending field, or `$` when the problem is with the input as a whole.
    pub field: String,

    /// Nature of the problem.
    pub reason: ValidationReason,

    /// Name of the type the field should have had, for type mismatches.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected: Option<String>,

    /// Name of the type the field actually had, for type mismatches.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual: Option<String>,
}

impl ValidationError {
    /// Creates an error for a required `field` that was not supplied.
    pub fn missing<S: Into<String>>(field: S) -> Self {
        Self {
            field: field.into(),
            reason: ValidationReason::Missing,
            expected: None,
            actual: None,
        }
    }

    /// Creates an error for a read-only `field` that was supplied.
    pub fn read_only<S: Into<String>>(field: S) -> Self {
        Self {
            field: field.into(),
            reason: ValidationReason::ReadOnly,
            expected: None,
            actual: None,
        }
    }

    /// Creates an error for a `field` that was supplied with a value of the wrong type.
    pub fn type_mismatch<S: Into<String>>(field: S, expected: &str, actual: &str) -> Self {
        Self {
            field: field.into(),
            reason: ValidationReason::TypeMismatch,
            expected: Some(expected.to_owned()),
            actual: Some(actual.to_owned()),
        }
    }

    /// Creates an error for a `field` that the schema does not declare.
    pub fn unknown_field<S: Into<String>>(field: S) -> Self {
        Self {
            field: field.into(),
            reason: ValidationReason::UnknownField,
            expected: None,
            actual: None,
        }
    }
}

/// Formats the message of a validation error with the given properties.
fn describe(
    field: &str,
    reason: &ValidationReason,
    expected: &Option<String>,
    actual: &Option<String>,
) -> String {
    match reason {
        ValidationReason::Missing => format!("Missing required field '{}'", field),
        ValidationReason::ReadOnly => format!("Field '{}' is read-only", field),
        ValidationReason::TypeMismatch => format!(
            "Field '{}' should be of type {} but got {}",
            field,
            expected.as_deref().unwrap_or("?"),
            actual.as_deref().unwrap_or("?")
        ),
        ValidationReason::UnknownField => format!("Unknown field '{}'", field),
    }
}

/// Declaration of a single field in a schema.
#[derive(Clone, Debug)]
pub struct FieldSpec {
    /// Name of the field.
    name: String,

    /// Type of the values the field accepts.
    field_type: FieldType,

    /// Whether the field must be present and non-null.
    required: bool,

    /// Value to store when an optional field is omitted.
    default: Option<Bson>,

    /// Whether the field can only be set by the server.
    read_only: bool,
}

impl FieldSpec {
    /// Declares a required field called `name` of type `field_type`.
    pub fn required<S: Into<String>>(name: S, field_type: FieldType) -> Self {
        Self { name: name.into(), field_type, required: true, default: None, read_only: false }
    }

    /// Declares an optional field called `name` of type `field_type`.
    pub fn optional<S: Into<String>>(name: S, field_type: FieldType) -> Self {
        Self { name: name.into(), field_type, required: false, default: None, read_only: false }
    }

    /// Sets the value to store when the field is omitted on creation.
    ///
    /// Panics if the default does not match the field's type, as schemas are hardcoded.
    pub fn with_default<V: Into<Bson>>(mut self, default: V) -> Self {
        let default = default.into();
        assert!(
            self.field_type.matches(&default),
            "Default for field {} must be of type {}",
            self.name,
            self.field_type.name()
        );
        self.default = Some(default);
        self
    }

    /// Marks the field as only settable by the server.
    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    /// Returns the name of the field.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the type of the field.
    pub fn field_type(&self) -> FieldType {
        self.field_type
    }

    /// Checks a client-supplied `value` for this field and converts it to its stored form.
    fn check(&self, value: &Value) -> Result<Bson, ValidationError> {
        if value.is_null() {
            if self.required {
                return Err(ValidationError::type_mismatch(
                    &self.name,
                    self.field_type.name(),
                    "null",
                ));
            }
            return Ok(Bson::Null);
        }

        self.field_type.convert_json(value).ok_or_else(|| {
            let actual = match (self.field_type, value) {
                (FieldType::Int, Value::Number(n)) if n.is_u64() && !n.is_i64() => "out_of_range",
                _ => json_type_name(value),
            };
            ValidationError::type_mismatch(&self.name, self.field_type.name(), actual)
        })
    }
}

/// The shape of the documents of a resource.
#[derive(Clone, Debug)]
pub struct Schema {
    /// Fields in declaration order.
    fields: Vec<FieldSpec>,
}

impl Schema {
    /// Creates a new schema with the given `fields`.
    ///
    /// Panics if a field is declared twice or is called `id`, as schemas are hardcoded.
    pub fn new(fields: Vec<FieldSpec>) -> Self {
        for (i, field) in fields.iter().enumerate() {
            assert!(field.name != "id" && field.name != "_id", "id is a reserved field name");
            assert!(
                !fields[i + 1..].iter().any(|other| other.name == field.name),
                "Field {} declared more than once",
                field.name
            );
        }
        Self { fields }
    }

    /// Returns the declared fields.
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// Looks up the declaration of the field `name`.
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Ensures `raw` is a JSON object and returns it.
    fn as_object(raw: &Value) -> Result<&Map<String, Value>, ValidationError> {
        match raw {
            Value::Object(object) => Ok(object),
            other => Err(ValidationError::type_mismatch("$", "object", json_type_name(other))),
        }
    }

    /// Fails if `object` contains any key that is not declared in the schema.
    fn reject_unknown(&self, object: &Map<String, Value>) -> Result<(), ValidationError> {
        match object.keys().find(|key| self.field(key).is_none()) {
            Some(key) => Err(ValidationError::unknown_field(key.as_str())),
            None => Ok(()),
        }
    }

    /// Validates a client-supplied body for the creation of a new document.
    ///
    /// The returned document contains every declared field that is not read-only: supplied
    /// values converted to their stored form, and defaults (or null) for omitted optional fields.
    /// Read-only fields must not be supplied and have to be filled in with `assign`.
    pub fn validate(&self, raw: &Value) -> Result<ValidatedDocument, ValidationError> {
        let object = Schema::as_object(raw)?;

        let mut doc = Document::new();
        for spec in &self.fields {
            match object.get(&spec.name) {
                Some(_) if spec.read_only => return Err(ValidationError::read_only(&spec.name)),
                None if spec.read_only => (),
                Some(value) => {
                    doc.insert(spec.name.clone(), spec.check(value)?);
                }
                None if spec.required => return Err(ValidationError::missing(&spec.name)),
                None => {
                    doc.insert(spec.name.clone(), spec.default.clone().unwrap_or(Bson::Null));
                }
            }
        }
        self.reject_unknown(object)?;

        Ok(ValidatedDocument::new(doc))
    }

    /// Validates a client-supplied body for a partial update of an existing document.
    ///
    /// Only the supplied fields are checked and returned.  No defaults are applied.
    pub fn validate_patch(&self, raw: &Value) -> Result<ValidatedDocument, ValidationError> {
        let object = Schema::as_object(raw)?;

        let mut doc = Document::new();
        for spec in &self.fields {
            if let Some(value) = object.get(&spec.name) {
                if spec.read_only {
                    return Err(ValidationError::read_only(&spec.name));
                }
                doc.insert(spec.name.clone(), spec.check(value)?);
            }
        }
        self.reject_unknown(object)?;

        Ok(ValidatedDocument::new(doc))
    }

    /// Sets the server-computed `value` of field `name` in `doc`, checking it against the schema.
    pub fn assign(
        &self,
        doc: &mut ValidatedDocument,
        name: &str,
        value: Bson,
    ) -> Result<(), ValidationError> {
        let spec = self.field(name).ok_or_else(|| ValidationError::unknown_field(name))?;
        let fits = match value {
            Bson::Null => !spec.required,
            ref value => spec.field_type.matches(value),
        };
        if !fits {
            return Err(ValidationError::type_mismatch(
                name,
                spec.field_type.name(),
                bson_type_name(&value),
            ));
        }
        doc.insert(name, value);
        Ok(())
    }

    /// Converts the textual `value` of a filter on field `name` to the field's stored form.
    pub fn parse_filter(&self, name: &str, value: &str) -> Result<Bson, ValidationError> {
        let spec = self.field(name).ok_or_else(|| ValidationError::unknown_field(name))?;
        spec.field_type
            .convert_text(value)
            .ok_or_else(|| ValidationError::type_mismatch(name, spec.field_type.name(), "string"))
    }

    /// Renders a stored document as the JSON object returned to clients.
    ///
    /// The object has an `id` key plus one key per declared field.  Fields missing from the
    /// stored document are rendered as null, and fields unknown to the schema are omitted.
    pub fn render(&self, doc: &StoredDocument) -> ModelResult<Value> {
        let mut object = Map::new();
        object.insert("id".to_owned(), Value::String(doc.id().to_hex()));
        for spec in &self.fields {
            let value = match doc.get(&spec.name) {
                Some(value) => bson_to_json(value)?,
                None => Value::Null,
            };
            object.insert(spec.name.clone(), value);
        }
        Ok(Value::Object(object))
    }
}
