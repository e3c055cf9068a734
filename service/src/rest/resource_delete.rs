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

//! API to delete an existing document.

use crate::driver::Driver;
use axum::extract::{Path, State};
use axum::http;
use docapi_core::model::ResourceId;
use docapi_core::rest::{EmptyBody, RestError};

/// DELETE handler for this API.
pub(crate) async fn handler(
    State(driver): State<Driver>,
    Path((resource, id)): Path<(String, String)>,
    _: EmptyBody,
) -> Result<http::StatusCode, RestError> {
    let id = ResourceId::new(&id)?;
    driver.delete_document(&resource, id).await?;
    Ok(http::StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ITEMS;
    use crate::rest::testutils::*;
    use docapi_core::rest::testutils::*;
    use serde_json::json;

    fn route(resource: &str, id: &str) -> (http::Method, String) {
        (http::Method::DELETE, format!("/api/v1/{}/{}", resource, id))
    }

    #[tokio::test]
    async fn test_ok() {
        let context = TestContext::setup().await;
        let id1 = context.insert(ITEMS, json!({"name": "first", "qty": 1})).await;
        let id2 = context.insert(ITEMS, json!({"name": "second", "qty": 2})).await;

        OneShotBuilder::new(context.app(), route(ITEMS, &id1.to_hex()))
            .send_empty()
            .await
            .expect_status(http::StatusCode::NO_CONTENT)
            .expect_empty()
            .await;

        assert!(!context.has(ITEMS, id1).await);
        assert!(context.has(ITEMS, id2).await);
    }

    #[tokio::test]
    async fn test_twice() {
        let context = TestContext::setup().await;
        let id = context.insert(ITEMS, json!({"name": "first", "qty": 1})).await;

        OneShotBuilder::new(context.app(), route(ITEMS, &id.to_hex()))
            .send_empty()
            .await
            .expect_status(http::StatusCode::NO_CONTENT)
            .expect_empty()
            .await;

        OneShotBuilder::new(context.app(), route(ITEMS, &id.to_hex()))
            .send_empty()
            .await
            .expect_status(http::StatusCode::NOT_FOUND)
            .expect_error("not found")
            .await;
    }

    #[tokio::test]
    async fn test_bad_id() {
        let context = TestContext::setup().await;

        OneShotBuilder::new(context.into_app(), route(ITEMS, "xyz"))
            .send_empty()
            .await
            .expect_status(http::StatusCode::BAD_REQUEST)
            .expect_error("Invalid document id 'xyz'")
            .await;
    }

    test_payload_must_be_empty!(
        TestContext::setup().await.into_app(),
        route(ITEMS, &ResourceId::generate().to_hex())
    );
}
