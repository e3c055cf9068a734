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

//! Operations specific to shortened links.

use crate::driver::Driver;
use crate::model::{LINKS, ShortCode};
use bson::{Bson, Document};
use docapi_core::db::{DbError, ListQuery};
use docapi_core::driver::{DriverError, DriverResult};
use docapi_core::model::StoredDocument;
use docapi_core::model::schema::to_bson_datetime;
use futures::TryStreamExt;
use log::warn;
use serde_json::Value;
use std::iter;
use url::Url;

/// Maximum number of short codes to try when creating a link before giving up.
const MAX_SHORT_CODE_ATTEMPTS: usize = 5;

impl Driver {
    /// Creates a new link from the client-supplied `raw` body, assigning it a fresh short code.
    pub(super) async fn create_link(self, raw: Value) -> DriverResult<Value> {
        let codes = iter::repeat_with(ShortCode::generate).take(MAX_SHORT_CODE_ATTEMPTS);
        self.create_link_with_codes(raw, codes).await
    }

    /// Creates a new link from `raw` using the first short code from `codes` that is not in use.
    async fn create_link_with_codes<I>(self, raw: Value, codes: I) -> DriverResult<Value>
    where
        I: IntoIterator<Item = ShortCode>,
    {
        let res = self.resource(LINKS)?;
        let doc = res.schema.validate(&raw)?;
        let created_at = Bson::DateTime(to_bson_datetime(self.clock.now_utc()));

        for code in codes {
            let mut doc = doc.clone();
            res.schema.assign(&mut doc, "short_code", Bson::String(code.as_str().to_owned()))?;
            res.schema.assign(&mut doc, "created_at", created_at.clone())?;

            let fields = doc.fields().clone();
            match res.collection.create(doc).await {
                Ok(id) => return self.render(LINKS, &StoredDocument::new(id, fields)),
                Err(DbError::AlreadyExists) => {
                    warn!("Short code {} already in use; trying another one", code.as_str());
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(DriverError::BackendError("Failed to allocate a unique short code".to_owned()))
    }

    /// Looks up the link identified by `code` and returns the URL it points to.
    ///
    /// Links that have been deactivated or whose expiration time has passed are reported as
    /// gone, not as missing.
    pub(crate) async fn resolve_link(self, code: &ShortCode) -> DriverResult<Url> {
        let res = self.resource(LINKS)?;

        let mut filter = Document::new();
        filter.insert("short_code", code.as_str());
        let query = ListQuery { filter, limit: Some(1), ..Default::default() };
        let doc = match res.collection.list(query).await?.try_next().await? {
            Some(doc) => doc,
            None => {
                return Err(DriverError::NotFound(format!(
                    "Unknown short code '{}'",
                    code.as_str()
                )));
            }
        };

        if let Some(Bson::Boolean(false)) = doc.get("is_active") {
            return Err(DriverError::Gone("This link has been deactivated".to_owned()));
        }
        if let Some(Bson::DateTime(expires_at)) = doc.get("expires_at") {
            if *expires_at <= to_bson_datetime(self.clock.now_utc()) {
                return Err(DriverError::Gone("This link has expired".to_owned()));
            }
        }

        let long_url = doc
            .fields()
            .get_str("long_url")
            .map_err(|e| DbError::DataIntegrityError(format!("Link {}: {}", doc.id(), e)))?;
        let long_url = Url::parse(long_url).map_err(|e| {
            DbError::DataIntegrityError(format!("Link {} has an invalid URL: {}", doc.id(), e))
        })?;
        Ok(long_url)
    }
}
