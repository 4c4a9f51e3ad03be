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

use crate::Credential;
use bytes::Bytes;
use dynsess_core::time::parse_expiration;
use dynsess_core::{Context, Error, RequestTimeout, Result};
use http::{Method, StatusCode};
use serde::Deserialize;
use std::time::Duration;

/// Credential document served by the container and instance metadata endpoints.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct MetadataCredentials {
    #[serde(default)]
    access_key_id: String,
    #[serde(default)]
    secret_access_key: String,
    #[serde(default)]
    token: Option<String>,
    #[serde(default)]
    expiration: Option<serde_json::Value>,
}

/// GET `url` within `timeout` and return the body of a `200 OK` response.
pub fn metadata_get(ctx: &Context, url: &str, timeout: Duration) -> Result<String> {
    metadata_send(ctx, Method::GET, url, &[], timeout)
}

/// Send an empty-bodied `method` request to `url` with extra `headers`
/// within `timeout` and return the body of a `200 OK` response.
pub fn metadata_send(
    ctx: &Context,
    method: Method,
    url: &str,
    headers: &[(&str, &str)],
    timeout: Duration,
) -> Result<String> {
    let mut builder = http::Request::builder().uri(url).method(method);
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    let mut req = builder.body(Bytes::new()).map_err(|e| {
        Error::request_invalid("failed to build metadata request")
            .with_source(e)
            .with_context(format!("url: {url}"))
    })?;
    req.extensions_mut().insert(RequestTimeout(timeout));

    let resp = ctx
        .http_send_as_string(req)
        .map_err(|e| e.with_context(format!("url: {url}")))?;

    if resp.status() != StatusCode::OK {
        return Err(Error::credential_invalid(format!(
            "metadata endpoint responded with status {}",
            resp.status()
        ))
        .with_context(format!("url: {url}"))
        .with_context(format!("body: {}", resp.body())));
    }

    Ok(resp.into_body())
}

/// Parse a metadata credential document.
///
/// Key and secret must both be present, `Expiration` may be RFC3339 text or
/// epoch seconds.
pub fn parse_metadata_credential(content: &str) -> Result<Credential> {
    let doc: MetadataCredentials = serde_json::from_str(content).map_err(|e| {
        Error::credential_invalid("failed to parse metadata credentials").with_source(e)
    })?;

    let expires_in = match &doc.expiration {
        None | Some(serde_json::Value::Null) => None,
        Some(v) => Some(parse_expiration(v).map_err(|e| {
            Error::credential_invalid("failed to parse expiration time").with_source(e)
        })?),
    };

    let cred = Credential::new(doc.access_key_id, doc.secret_access_key)
        .with_session_token(doc.token)
        .with_expires_in(expires_in);
    if !cred.is_complete() {
        return Err(Error::credential_invalid(
            "metadata credentials miss AccessKeyId or SecretAccessKey",
        ));
    }

    Ok(cred)
}
