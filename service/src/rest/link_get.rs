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

//! API to follow a shortened link.

use crate::driver::Driver;
use crate::model::ShortCode;
use axum::extract::{Path, State};
use axum::response::Redirect;
use docapi_core::rest::{EmptyBody, RestError};

/// GET handler for this API.
pub(crate) async fn handler(
    State(driver): State<Driver>,
    Path(code): Path<String>,
    _: EmptyBody,
) -> Result<Redirect, RestError> {
    // A malformed code can never have been issued, so it is as unknown as any other.
    let code = ShortCode::new(code).map_err(|e| RestError::NotFound(e.to_string()))?;
    let url = driver.resolve_link(&code).await?;
    Ok(Redirect::temporary(url.as_str()))
}

#[cfg(test)]
mod tests {
    use crate::rest::testutils::*;
    use axum::http;
    use docapi_core::rest::testutils::*;
    use serde_json::json;
    use std::time::Duration;

    fn route(code: &str) -> (http::Method, String) {
        (http::Method::GET, format!("/r/{}", code))
    }

    #[tokio::test]
    async fn test_ok() {
        let context = TestContext::setup().await;
        context.insert_link("abcdefg", json!({"long_url": "https://example.com/a?b=c"})).await;

        OneShotBuilder::new(context.into_app(), route("abcdefg"))
            .send_empty()
            .await
            .expect_status(http::StatusCode::TEMPORARY_REDIRECT)
            .expect_redirect("https://example.com/a?b=c")
            .await;
    }

    #[tokio::test]
    async fn test_unknown() {
        let context = TestContext::setup().await;
        context.insert_link("abcdefg", json!({"long_url": "https://example.com/"})).await;

        OneShotBuilder::new(context.app(), route("ABCDEFG"))
            .send_empty()
            .await
            .expect_status(http::StatusCode::NOT_FOUND)
            .expect_error("Unknown short code 'ABCDEFG'")
            .await;

        OneShotBuilder::new(context.app(), route("abc"))
            .send_empty()
            .await
            .expect_status(http::StatusCode::NOT_FOUND)
            .expect_error("Invalid short code 'abc'")
            .await;
    }

    #[tokio::test]
    async fn test_deactivated() {
        let context = TestContext::setup().await;
        context
            .insert_link("abcdefg", json!({"long_url": "https://example.com/", "is_active": false}))
            .await;

        OneShotBuilder::new(context.into_app(), route("abcdefg"))
            .send_empty()
            .await
            .expect_status(http::StatusCode::GONE)
            .expect_error("deactivated")
            .await;
    }

    #[tokio::test]
    async fn test_expired() {
        let context = TestContext::setup().await;
        context
            .insert_link(
                "abcdefg",
                json!({"long_url": "https://example.com/", "expires_at": "2024-05-02T08:00:00Z"}),
            )
            .await;

        OneShotBuilder::new(context.app(), route("abcdefg"))
            .send_empty()
            .await
            .expect_status(http::StatusCode::TEMPORARY_REDIRECT)
            .expect_redirect("https://example.com/")
            .await;

        context.clock().advance(Duration::from_secs(24 * 60 * 60));

        OneShotBuilder::new(context.app(), route("abcdefg"))
            .send_empty()
            .await
            .expect_status(http::StatusCode::GONE)
            .expect_error("expired")
            .await;
    }

    test_payload_must_be_empty!(TestContext::setup().await.into_app(), route("abcdefg"));
}
