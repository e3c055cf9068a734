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

//! API to update an existing document.

use crate::driver::Driver;
use axum::Json;
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use docapi_core::model::ResourceId;
use docapi_core::rest::RestError;
use serde_json::Value;

/// PUT and PATCH handler for this API.
///
/// Both methods merge the supplied fields into the stored document.
pub(crate) async fn handler(
    State(driver): State<Driver>,
    Path((resource, id)): Path<(String, String)>,
    Json(raw): Json<Value>,
) -> Result<impl IntoResponse, RestError> {
    let id = ResourceId::new(&id)?;
    let doc = driver.update_document(&resource, id, raw).await?;
    Ok(Json(doc))
}
