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

//! Business logic for the service.

use crate::model::{self, LINKS};
use docapi_core::clocks::Clock;
use docapi_core::db::{Collection, Db, DbError};
use docapi_core::driver::{DriverError, DriverResult};
use docapi_core::env::get_optional_var;
use docapi_core::model::{Schema, StoredDocument};
use std::collections::HashMap;
use std::sync::Arc;
use url::Url;

mod documents;
pub(crate) use documents::ListRequest;
mod health;
mod links;
#[cfg(test)]
pub(crate) mod testutils;

/// Default value for the `SHORT_BASE_URL` setting when not specified.
const DEFAULT_SHORT_BASE_URL: &str = "https://short.io/";

/// Default value for the `DEFAULT_PAGE_SIZE` setting when not specified.
const DEFAULT_PAGE_SIZE: u64 = 20;

/// Default value for the `MAX_PAGE_SIZE` setting when not specified.
const DEFAULT_MAX_PAGE_SIZE: u64 = 100;

/// Configuration options for the service.
#[derive(Clone, Debug)]
#[cfg_attr(test, derive(PartialEq))]
pub struct ServiceOptions {
    /// Base URL that short codes are appended to when reporting shortened links.  Must end with a
    /// slash.
    pub short_base_url: Url,

    /// Number of documents returned by a listing when the client does not ask for a limit.
    pub default_page_size: u64,

    /// Largest number of documents a client can request in a single listing.
    pub max_page_size: u64,
}

impl Default for ServiceOptions {
    fn default() -> Self {
        Self {
            short_base_url: Url::parse(DEFAULT_SHORT_BASE_URL)
                .expect("Hardcoded URL must be valid"),
            default_page_size: DEFAULT_PAGE_SIZE,
            max_page_size: DEFAULT_MAX_PAGE_SIZE,
        }
    }
}

impl ServiceOptions {
    /// Creates a new set of options from environment variables.
    ///
    /// This will use variables such as `<prefix>_SHORT_BASE_URL`, `<prefix>_DEFAULT_PAGE_SIZE` and
    /// `<prefix>_MAX_PAGE_SIZE`.  An unset default page size is capped to the maximum page size.
    pub fn from_env(prefix: &str) -> Result<Self, String> {
        let defaults = ServiceOptions::default();
        let max_page_size =
            get_optional_var::<u64>(prefix, "MAX_PAGE_SIZE")?.unwrap_or(defaults.max_page_size);
        let opts = Self {
            short_base_url: get_optional_var::<Url>(prefix, "SHORT_BASE_URL")?
                .unwrap_or(defaults.short_base_url),
            default_page_size: get_optional_var::<u64>(prefix, "DEFAULT_PAGE_SIZE")?
                .unwrap_or_else(|| defaults.default_page_size.min(max_page_size)),
            max_page_size,
        };

        if !opts.short_base_url.as_str().ends_with('/') {
            return Err(format!(
                "Short base URL {} must end with a slash",
                opts.short_base_url.as_str()
            ));
        }
        if opts.max_page_size == 0 {
            return Err("Maximum page size must be at least 1".to_owned());
        }
        if opts.default_page_size == 0 || opts.default_page_size > opts.max_page_size {
            return Err(format!(
                "Default page size {} must be between 1 and the maximum page size {}",
                opts.default_page_size, opts.max_page_size
            ));
        }
        Ok(opts)
    }
}

/// A resource served by the app: its schema and where its documents live.
struct Resource {
    /// Shape of the documents of this resource.
    schema: Schema,

    /// Collection that holds the documents of this resource.
    collection: Collection,
}

/// Business logic.
///
/// The public operations exposed by the driver are all "one shot": they perform a single
/// logical operation against the database.  For this reason, these operations consume the driver
/// in an attempt to minimize the possibility of executing two operations where one would do.
#[derive(Clone)]
pub(crate) struct Driver {
    /// The database that the driver uses for persistence.
    db: Arc<dyn Db + Send + Sync>,

    /// Clock instance to obtain the current time.
    clock: Arc<dyn Clock + Send + Sync>,

    /// All resources served by the app, keyed by name.
    resources: Arc<HashMap<&'static str, Resource>>,

    /// Options for the service.
    opts: ServiceOptions,
}

impl Driver {
    /// Creates a new driver backed by the given injected components.
    pub(crate) fn new(
        db: Arc<dyn Db + Send + Sync>,
        clock: Arc<dyn Clock + Send + Sync>,
        opts: ServiceOptions,
    ) -> Self {
        let resources: HashMap<&'static str, Resource> = model::resources()
            .into_iter()
            .map(|(name, schema)| {
                let collection = Collection::new(db.clone(), name);
                (name, Resource { schema, collection })
            })
            .collect();
        Self { db, clock, resources: Arc::new(resources), opts }
    }

    /// Looks up the resource called `name`.
    fn resource(&self, name: &str) -> DriverResult<&Resource> {
        self.resources
            .get(name)
            .ok_or_else(|| DriverError::NotFound(format!("Unknown resource '{}'", name)))
    }

    /// Renders `doc`, which belongs to the resource `name`, as returned to clients.
    ///
    /// Links are decorated with the full short URL that redirects to them.
    fn render(&self, name: &str, doc: &StoredDocument) -> DriverResult<serde_json::Value> {
        let resource = self.resource(name)?;
        let mut value = resource.schema.render(doc).map_err(DbError::from)?;
        if name == LINKS {
            let code = doc.fields().get_str("short_code").map_err(|e| {
                DbError::DataIntegrityError(format!("Link {} lacks a short code: {}", doc.id(), e))
            })?;
            let short_url = self
                .opts
                .short_base_url
                .join(code)
                .map_err(|e| DriverError::BackendError(format!("Cannot build short URL: {}", e)))?;
            if let Some(object) = value.as_object_mut() {
                object.insert("short_url".to_owned(), short_url.as_str().into());
            }
        }
        Ok(value)
    }
}
