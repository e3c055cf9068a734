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

//! REST interface for the service.

use crate::driver::Driver;
use axum::Router;

mod health_get;
mod link_get;
mod resource_delete;
mod resource_get;
mod resource_patch;
mod resources_get;
mod resources_post;
mod root_get;
#[cfg(test)]
mod testutils;

/// Creates the router for the application.
pub(crate) fn app(driver: Driver) -> Router {
    use axum::routing::get;
    Router::new()
        .route("/api/v1/", get(root_get::handler))
        .route("/api/v1/health", get(health_get::handler))
        .route("/api/v1/:resource", get(resources_get::handler).post(resources_post::handler))
        .route(
            "/api/v1/:resource/:id",
            get(resource_get::handler)
                .put(resource_patch::handler)
                .patch(resource_patch::handler)
                .delete(resource_delete::handler),
        )
        .route("/r/:code", get(link_get::handler))
        .with_state(driver)
}
