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

//! Test utilities for the REST API.

use crate::driver::testutils::TestContext as DriverTestContext;
use crate::driver::{Driver, ServiceOptions};
use crate::rest::app;
use axum::Router;
use docapi_core::clocks::testutils::SettableClock;
use docapi_core::model::ResourceId;
use serde_json::Value;

/// State of a running test.
pub(crate) struct TestContext {
    /// The driver-level context, which gives access to the backing database.
    inner: DriverTestContext,

    /// The app under test.
    app: Router,
}

impl TestContext {
    /// Initializes the app backed by an empty in-memory database.
    pub(crate) async fn setup() -> Self {
        Self::setup_with_opts(ServiceOptions::default()).await
    }

    /// Same as `setup` but allows customizing the service options.
    pub(crate) async fn setup_with_opts(opts: ServiceOptions) -> Self {
        let inner = DriverTestContext::setup_with_opts(opts).await;
        let app = app(inner.driver());
        Self { inner, app }
    }

    /// Returns a copy of the app under test.
    pub(crate) fn app(&self) -> Router {
        self.app.clone()
    }

    /// Consumes the context and returns the app under test.
    pub(crate) fn into_app(self) -> Router {
        self.app
    }

    /// Returns the clock used by the app.
    pub(crate) fn clock(&self) -> &SettableClock {
        &self.inner.clock
    }

    /// Returns a copy of the driver behind the app.
    pub(crate) fn driver(&self) -> Driver {
        self.inner.driver()
    }

    /// Makes the database fail all operations as unavailable if `unavailable` is true.
    pub(crate) fn set_unavailable(&self, unavailable: bool) {
        self.inner.set_unavailable(unavailable);
    }

    /// Stores a new document of `resource` with the `raw` contents.
    pub(crate) async fn insert(&self, resource: &str, raw: Value) -> ResourceId {
        self.inner.insert(resource, raw).await
    }

    /// Stores a new link with the given short `code` and `raw` contents.
    pub(crate) async fn insert_link(&self, code: &str, raw: Value) -> ResourceId {
        self.inner.insert_link(code, raw).await
    }

    /// Gets the rendered document `id` of `resource`.
    pub(crate) async fn get(&self, resource: &str, id: ResourceId) -> Value {
        self.inner.get(resource, id).await
    }

    /// Returns true if the document `id` of `resource` exists.
    pub(crate) async fn has(&self, resource: &str, id: ResourceId) -> bool {
        self.driver().get_document(resource, id).await.is_ok()
    }

    /// Gets all rendered documents of `resource` in insertion order.
    pub(crate) async fn list(&self, resource: &str) -> Vec<Value> {
        self.inner.list(resource).await
    }
}
