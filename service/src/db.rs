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

//! Database abstraction in terms of the operations needed by the server.

use crate::model::LINKS;
use docapi_core::db::{Collection, Db, DbResult};
use std::sync::Arc;

/// Prepares the database to serve the app, creating the indexes that back its constraints.
///
/// This is idempotent and is called on every startup.
pub async fn init_schema(db: Arc<dyn Db + Send + Sync>) -> DbResult<()> {
    Collection::new(db, LINKS).ensure_unique("short_code").await
}
