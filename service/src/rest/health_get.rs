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

//! API to check the health of the service.

use crate::driver::Driver;
use axum::Json;
use axum::extract::State;
use axum::response::IntoResponse;
use docapi_core::rest::{EmptyBody, RestError};
use serde::Serialize;

/// Message returned by this API when the service is healthy.
#[derive(Serialize)]
struct HealthResponse {
    /// Always "ok".
    status: &'static str,
}

/// GET handler for this API.
pub(crate) async fn handler(
    State(driver): State<Driver>,
    _: EmptyBody,
) -> Result<impl IntoResponse, RestError> {
    driver.check_health().await?;
    Ok(Json(HealthResponse { status: "ok" }))
}

#[cfg(test)]
mod tests {
    use crate::rest::testutils::*;
    use axum::http;
    use docapi_core::rest::testutils::*;
    use serde_json::{Value, json};

    fn route() -> (http::Method, String) {
        (http::Method::GET, "/api/v1/health".to_owned())
    }

    #[tokio::test]
    async fn test_ok() {
        let context = TestContext::setup().await;

        let response = OneShotBuilder::new(context.into_app(), route())
            .send_empty()
            .await
            .expect_json::<Value>()
            .await;
        assert_eq!(json!({"status": "ok"}), response);
    }

    #[tokio::test]
    async fn test_unavailable() {
        let context = TestContext::setup().await;
        context.set_unavailable(true);

        OneShotBuilder::new(context.into_app(), route())
            .send_empty()
            .await
            .expect_status(http::StatusCode::SERVICE_UNAVAILABLE)
            .expect_error("Service unavailable")
            .await;
    }

    test_payload_must_be_empty!(TestContext::setup().await.into_app(), route());
}
