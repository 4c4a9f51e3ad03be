// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

//! Blocking [`reqwest`] implementation of `HttpSend` for dynsess.
//!
//! ```no_run
//! use std::time::Duration;
//!
//! use dynsess_core::Context;
//! use dynsess_http_send_reqwest::ReqwestHttpSend;
//!
//! let client = reqwest::blocking::Client::builder()
//!     .timeout(Duration::from_secs(30))
//!     .user_agent("dynsess/0.1")
//!     .build()
//!     .expect("client must build");
//!
//! let ctx = Context::new().with_http_send(ReqwestHttpSend::new(client));
//! ```

use bytes::Bytes;
use dynsess_core::{Error, HttpSend, RequestTimeout, Result};
use log::debug;
use reqwest::blocking::{Client, Request};

/// HttpSend backed by a blocking reqwest client.
///
/// A [`RequestTimeout`] found in the request extensions overrides the
/// client-wide timeout for that request.
#[derive(Debug, Default)]
pub struct ReqwestHttpSend {
    client: Client,
}

impl ReqwestHttpSend {
    /// Create a new ReqwestHttpSend with a reqwest::blocking::Client.
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

impl HttpSend for ReqwestHttpSend {
    fn http_send(&self, req: http::Request<Bytes>) -> Result<http::Response<Bytes>> {
        let timeout = req.extensions().get::<RequestTimeout>().copied();
        let uri = req.uri().to_string();

        let mut req = Request::try_from(req).map_err(|e| {
            Error::request_invalid("failed to build reqwest request")
                .with_context(format!("uri: {uri}"))
                .with_source(e)
        })?;
        if let Some(RequestTimeout(t)) = timeout {
            *req.timeout_mut() = Some(t);
        }

        let resp = self.client.execute(req).map_err(|e| {
            let message = if e.is_timeout() {
                "request timed out"
            } else {
                "failed to send request"
            };
            Error::transport(message)
                .with_context(format!("uri: {uri}"))
                .with_source(e)
        })?;

        let status = resp.status();
        let version = resp.version();
        let headers = resp.headers().clone();
        let body = resp.bytes().map_err(|e| {
            Error::transport("failed to read response body")
                .with_context(format!("uri: {uri}"))
                .with_source(e)
        })?;
        debug!("{uri} responded {status} with {} bytes", body.len());

        let mut out = http::Response::new(body);
        *out.status_mut() = status;
        *out.version_mut() = version;
        *out.headers_mut() = headers;
        Ok(out)
    }
}
