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

//! Entry point to the DocAPI service.

#![warn(anonymous_parameters, bad_style, clippy::missing_docs_in_private_items, missing_docs)]
#![warn(unused, unused_extern_crates, unused_import_braces, unused_qualifications)]
#![warn(unsafe_code)]

use docapi_core::db::mongo::MongoOptions;
use docapi_service::driver::ServiceOptions;
use docapi_service::serve;
use std::env;
use std::net::Ipv4Addr;

/// Port to listen on when `PORT` is not set.
const DEFAULT_PORT: u16 = 8000;

#[tokio::main]
async fn main() {
    env_logger::init();

    let port: u16 = match env::var("PORT") {
        Ok(val) => val.parse().expect("PORT has to be a number"),
        Err(_) => DEFAULT_PORT,
    };
    let addr = (Ipv4Addr::LOCALHOST, port);

    let db_opts = MongoOptions::from_env("MONGODB").unwrap();
    let opts = ServiceOptions::from_env("DOCAPI").unwrap();

    serve(addr, db_opts, opts).await.unwrap()
}
