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

//! Validated document CRUD service over MongoDB.

#![warn(anonymous_parameters, bad_style, clippy::missing_docs_in_private_items, missing_docs)]
#![warn(unused, unused_extern_crates, unused_import_braces, unused_qualifications)]
#![warn(unsafe_code)]

use docapi_core::clocks::{Clock, SystemClock};
use docapi_core::db::mongo::{MongoDb, MongoOptions};
use docapi_core::db::{Db, DbResult};
use log::{info, warn};
use std::error::Error;
use std::net::SocketAddr;
use std::sync::Arc;

pub mod db;
pub mod driver;
use driver::{Driver, ServiceOptions};
pub(crate) mod model;
mod rest;
use rest::app;

/// Verifies that the database is reachable and prepares it to serve the app.
async fn prepare_db(db: Arc<dyn Db + Send + Sync>) -> DbResult<()> {
    db.ping().await?;
    db::init_schema(db).await
}

/// Waits until the process is asked to terminate.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Cannot listen for the shutdown signal: {}", e);
        return;
    }
    info!("Shutting down");
}

/// Serves `app` on `bind_addr` until the process is asked to terminate.
async fn run(bind_addr: SocketAddr, app: axum::Router) -> Result<(), Box<dyn Error>> {
    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    info!("Listening on {}", listener.local_addr()?);
    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;
    Ok(())
}

/// Serves the application on `bind_addr` backed by an already-connected `db`.
///
/// The database is closed before returning, whether the server terminates cleanly or not.
async fn serve_db(
    bind_addr: SocketAddr,
    db: Arc<dyn Db + Send + Sync>,
    clock: Arc<dyn Clock + Send + Sync>,
    opts: ServiceOptions,
) -> Result<(), Box<dyn Error>> {
    if let Err(e) = prepare_db(db.clone()).await {
        db.close().await;
        return Err(e.into());
    }
    info!("Connected to the database");

    let driver = Driver::new(db.clone(), clock, opts);
    let result = run(bind_addr, app(driver)).await;
    db.close().await;
    result
}

/// Instantiates all resources to serve the application on `bind_addr`.
///
/// The database connection is established here and is closed before returning, whether the
/// server terminates cleanly or not.
pub async fn serve(
    bind_addr: impl Into<SocketAddr>,
    db_opts: MongoOptions,
    opts: ServiceOptions,
) -> Result<(), Box<dyn Error>> {
    let db = Arc::new(MongoDb::connect(db_opts).await?);
    serve_db(bind_addr.into(), db, Arc::new(SystemClock::default()), opts).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use docapi_core::db::memory::MemoryDb;

    #[tokio::test]
    async fn test_serve_db_closes_unavailable_store() {
        let db = Arc::new(MemoryDb::default());
        db.set_unavailable(true);

        let bind_addr = SocketAddr::from(([127, 0, 0, 1], 0));
        let err =
            serve_db(bind_addr, db.clone(), Arc::new(SystemClock::default()), Default::default())
                .await
                .unwrap_err();
        assert_eq!("Unavailable", err.to_string());
        assert!(db.is_closed());
    }

    #[tokio::test]
    async fn test_serve_db_closes_store_when_bind_fails() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let bind_addr = listener.local_addr().unwrap();

        let db = Arc::new(MemoryDb::default());
        serve_db(bind_addr, db.clone(), Arc::new(SystemClock::default()), Default::default())
            .await
            .unwrap_err();
        assert!(db.is_closed());
        drop(listener);
    }
}
