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

//! API to greet clients.

use axum::Json;
use axum::response::IntoResponse;
use docapi_core::rest::EmptyBody;

/// GET handler for this API.
pub(crate) async fn handler(_: EmptyBody) -> impl IntoResponse {
    Json("Hello world !")
}

#[cfg(test)]
mod tests {
    use crate::rest::testutils::*;
    use axum::http;
    use docapi_core::rest::testutils::*;

    fn route() -> (http::Method, String) {
        (http::Method::GET, "/api/v1/".to_owned())
    }

    #[tokio::test]
    async fn test_ok() {
        let context = TestContext::setup().await;

        let response = OneShotBuilder::new(context.into_app(), route())
            .send_empty()
            .await
            .expect_json::<String>()
            .await;
        assert_eq!("Hello world !", response);
    }

    test_payload_must_be_empty!(TestContext::setup().await.into_app(), route());
}
