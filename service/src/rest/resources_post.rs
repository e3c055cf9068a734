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

//! API to create a new document.

use crate::driver::Driver;
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::{Json, http};
use docapi_core::rest::RestError;
use serde_json::Value;

/// POST handler for this API.
pub(crate) async fn handler(
    State(driver): State<Driver>,
    Path(resource): Path<String>,
    Json(raw): Json<Value>,
) -> Result<(http::StatusCode, impl IntoResponse), RestError> {
    let doc = driver.create_document(&resource, raw).await?;
    Ok((http::StatusCode::CREATED, Json(doc)))
}
