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

//! API to get an existing document.

use crate::driver::Driver;
use axum::Json;
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use docapi_core::model::ResourceId;
use docapi_core::rest::{EmptyBody, RestError};

/// GET handler for this API.
pub(crate) async fn handler(
    State(driver): State<Driver>,
    Path((resource, id)): Path<(String, String)>,
    _: EmptyBody,
) -> Result<impl IntoResponse, RestError> {
    let id = ResourceId::new(&id)?;
    let doc = driver.get_document(&resource, id).await?;
    Ok(Json(doc))
}

#[cfg(test)]
mod tests {
    use crate::model::ITEMS;
    use crate::rest::testutils::*;
    use axum::http;
    use docapi_core::model::ResourceId;
    use docapi_core::rest::testutils::*;
    use serde_json::{Value, json};

    fn route(resource: &str, id: &str) -> (http::Method, String) {
        (http::Method::GET, format!("/api/v1/{}/{}", resource, id))
    }

    #[tokio::test]
    async fn test_ok() {
        let context = TestContext::setup().await;
        context.insert(ITEMS, json!({"name": "first", "qty": 1})).await;
        let id = context.insert(ITEMS, json!({"name": "second", "qty": 2})).await;

        let response = OneShotBuilder::new(context.into_app(), route(ITEMS, &id.to_hex()))
            .send_empty()
            .await
            .expect_json::<Value>()
            .await;
        assert_eq!(json!({"id": id.to_hex(), "name": "second", "qty": 2}), response);
    }

    #[tokio::test]
    async fn test_missing() {
        let context = TestContext::setup().await;

        OneShotBuilder::new(context.into_app(), route(ITEMS, &ResourceId::generate().to_hex()))
            .send_empty()
            .await
            .expect_status(http::StatusCode::NOT_FOUND)
            .expect_error("not found")
            .await;
    }

    #[tokio::test]
    async fn test_bad_id() {
        let context = TestContext::setup().await;

        OneShotBuilder::new(context.into_app(), route(ITEMS, "not-an-id"))
            .send_empty()
            .await
            .expect_status(http::StatusCode::BAD_REQUEST)
            .expect_error("Invalid document id 'not-an-id'")
            .await;
    }

    #[tokio::test]
    async fn test_unknown_resource() {
        let context = TestContext::setup().await;

        OneShotBuilder::new(context.into_app(), route("users", &ResourceId::generate().to_hex()))
            .send_empty()
            .await
            .expect_status(http::StatusCode::NOT_FOUND)
            .expect_error("Unknown resource 'users'")
            .await;
    }

    test_payload_must_be_empty!(
        TestContext::setup().await.into_app(),
        route(ITEMS, &ResourceId::generate().to_hex())
    );
}
