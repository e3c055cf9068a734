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

//! API to list the documents of a resource.

use crate::driver::{Driver, ListRequest};
use axum::Json;
use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use docapi_core::db::SortDirection;
use docapi_core::rest::{EmptyBody, RestError, RestResult};

/// Parses the value of the numeric query parameter `name`.
fn parse_number(name: &str, value: &str) -> RestResult<u64> {
    value
        .parse::<u64>()
        .map_err(|e| RestError::InvalidRequest(format!("Invalid {} '{}': {}", name, value, e)))
}

/// Parses the query parameters of a listing.
///
/// Any parameter that does not control pagination or sorting is an equality filter on the field
/// of the same name.
fn parse_query(query: Vec<(String, String)>) -> RestResult<ListRequest> {
    let mut request = ListRequest::default();
    for (name, value) in query {
        match name.as_str() {
            "limit" => request.limit = Some(parse_number(&name, &value)?),
            "offset" => request.offset = parse_number(&name, &value)?,
            "order" => {
                request.direction = match value.as_str() {
                    "asc" => SortDirection::Ascending,
                    "desc" => SortDirection::Descending,
                    _ => {
                        return Err(RestError::InvalidRequest(format!(
                            "Invalid order '{}'; must be asc or desc",
                            value
                        )));
                    }
                }
            }
            "sort" => request.sort = Some(value),
            _ => request.filters.push((name, value)),
        }
    }
    Ok(request)
}

/// GET handler for this API.
pub(crate) async fn handler(
    State(driver): State<Driver>,
    Path(resource): Path<String>,
    Query(query): Query<Vec<(String, String)>>,
    _: EmptyBody,
) -> Result<impl IntoResponse, RestError> {
    let request = parse_query(query)?;
    let page = driver.list_documents(&resource, request).await?;
    Ok(Json(page))
}
