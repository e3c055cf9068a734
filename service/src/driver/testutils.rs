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

//! Test utilities for the business layer.

use crate::db::init_schema;
use crate::driver::{Driver, ListRequest, ServiceOptions};
use crate::model::{self, LINKS, ShortCode};
use bson::Bson;
use docapi_core::clocks::Clock;
use docapi_core::clocks::testutils::SettableClock;
use docapi_core::db::Collection;
use docapi_core::db::memory::MemoryDb;
use docapi_core::model::schema::to_bson_datetime;
use docapi_core::model::{ResourceId, Schema};
use serde_json::Value;
use std::sync::Arc;
use time::macros::datetime;

/// State of a running test.
pub(crate) struct TestContext {
    /// The database backing the driver.
    db: Arc<MemoryDb>,

    /// The clock used by the driver.
    pub(crate) clock: Arc<SettableClock>,

    /// The driver under test.
    driver: Driver,
}

impl TestContext {
    /// Initializes a driver backed by an empty in-memory database and a clock stopped at a
    /// well-known time.
    pub(crate) async fn setup() -> Self {
        Self::setup_with_opts(ServiceOptions::default()).await
    }

    /// Same as `setup` but allows customizing the service options.
    pub(crate) async fn setup_with_opts(opts: ServiceOptions) -> Self {
        let db = Arc::new(MemoryDb::default());
        init_schema(db.clone()).await.unwrap();
        let clock = Arc::new(SettableClock::new(datetime!(2024-05-01 08:00:00 UTC)));
        let driver = Driver::new(db.clone(), clock.clone(), opts);
        Self { db, clock, driver }
    }

    /// Returns a copy of the driver under test.
    pub(crate) fn driver(&self) -> Driver {
        self.driver.clone()
    }

    /// Makes the database fail all operations as unavailable if `unavailable` is true.
    pub(crate) fn set_unavailable(&self, unavailable: bool) {
        self.db.set_unavailable(unavailable);
    }

    /// Returns the schema of the `resource`.
    fn schema(resource: &str) -> Schema {
        model::resources()
            .into_iter()
            .find_map(|(name, schema)| if name == resource { Some(schema) } else { None })
            .unwrap()
    }

    /// Stores a new document of `resource` with the `raw` contents, bypassing the driver.
    pub(crate) async fn insert(&self, resource: &str, raw: Value) -> ResourceId {
        let doc = Self::schema(resource).validate(&raw).unwrap();
        Collection::new(self.db.clone(), resource).create(doc).await.unwrap()
    }

    /// Stores a new link with the given short `code` and `raw` contents, bypassing the driver.
    pub(crate) async fn insert_link(&self, code: &str, raw: Value) -> ResourceId {
        let code = ShortCode::new(code).unwrap();
        let now = to_bson_datetime(self.clock.now_utc());

        let schema = Self::schema(LINKS);
        let mut doc = schema.validate(&raw).unwrap();
        schema.assign(&mut doc, "short_code", Bson::String(code.as_str().to_owned())).unwrap();
        schema.assign(&mut doc, "created_at", Bson::DateTime(now)).unwrap();
        Collection::new(self.db.clone(), LINKS).create(doc).await.unwrap()
    }

    /// Gets the rendered document `id` of `resource`.
    pub(crate) async fn get(&self, resource: &str, id: ResourceId) -> Value {
        self.driver().get_document(resource, id).await.unwrap()
    }

    /// Gets all rendered documents of `resource` in insertion order.
    pub(crate) async fn list(&self, resource: &str) -> Vec<Value> {
        let request = ListRequest { limit: Some(100), ..Default::default() };
        self.driver().list_documents(resource, request).await.unwrap().items
    }
}
