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

use crate::constants::{AWS_QUERY_ENCODE_SET, AWS_URI_ENCODE_SET};
use dynsess_core::hash::hex_sha256;
use dynsess_core::{Error, Result, SigningRequest};
use http::header;
use http::Method;
use percent_encoding::{percent_decode_str, utf8_percent_encode};
use std::fmt::{Display, Formatter};

/// CanonicalRequest is the normalized form of a request used as SigV4
/// signing input.
///
/// - [Create a canonical request](https://docs.aws.amazon.com/IAM/latest/UserGuide/create-signed-request.html#create-canonical-request)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalRequest {
    /// HTTP method.
    pub method: Method,
    /// URI encoded absolute path.
    pub canonical_uri: String,
    /// Encoded and sorted query string.
    pub canonical_query: String,
    /// Lower-cased header names with their normalized values, sorted by name.
    pub canonical_headers: Vec<(String, String)>,
    /// Hex SHA-256 of the payload.
    pub hashed_payload: String,
}

impl CanonicalRequest {
    /// Build the canonical request for `req` carrying `body`.
    ///
    /// `host` is derived from the authority when the request doesn't carry it.
    /// `authorization` is never part of the signed headers.
    pub fn build(req: &SigningRequest, body: &[u8]) -> Result<Self> {
        let path = percent_decode_str(&req.path).decode_utf8().map_err(|e| {
            Error::request_invalid("request path is not valid utf-8").with_source(e)
        })?;
        let canonical_uri = if path.is_empty() {
            "/".to_string()
        } else {
            utf8_percent_encode(&path, &AWS_URI_ENCODE_SET).to_string()
        };

        let canonical_query = encode_query(&req.query)
            .into_iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&");

        let mut canonical_headers = Vec::with_capacity(req.headers.keys_len() + 1);
        for name in req.header_name_to_vec_sorted() {
            if name == header::AUTHORIZATION.as_str() {
                continue;
            }

            let value = req.header_value_joined(name).map_err(|e| {
                Error::request_invalid(format!("header {name} is not visible ascii"))
                    .with_source(e)
            })?;
            canonical_headers.push((name.to_string(), value));
        }
        if req.headers.get(header::HOST).is_none() {
            canonical_headers.push((
                header::HOST.to_string(),
                req.authority.as_str().to_string(),
            ));
            canonical_headers.sort();
        }

        Ok(CanonicalRequest {
            method: req.method.clone(),
            canonical_uri,
            canonical_query,
            canonical_headers,
            hashed_payload: hex_sha256(body),
        })
    }

    /// Signed header names joined by `;`.
    pub fn signed_headers(&self) -> String {
        self.canonical_headers
            .iter()
            .map(|(k, _)| k.as_str())
            .collect::<Vec<_>>()
            .join(";")
    }

    /// Hex SHA-256 of the canonical request string.
    pub fn hash(&self) -> String {
        hex_sha256(self.to_string().as_bytes())
    }
}

impl Display for CanonicalRequest {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{}", self.method)?;
        writeln!(f, "{}", self.canonical_uri)?;
        writeln!(f, "{}", self.canonical_query)?;
        for (name, value) in &self.canonical_headers {
            writeln!(f, "{name}:{value}")?;
        }
        writeln!(f)?;
        writeln!(f, "{}", self.signed_headers())?;
        write!(f, "{}", self.hashed_payload)
    }
}

/// Percent encode decoded query pairs and sort them by key, then value.
pub(crate) fn encode_query(query: &[(String, String)]) -> Vec<(String, String)> {
    let mut encoded = query
        .iter()
        .map(|(k, v)| {
            (
                utf8_percent_encode(k, &AWS_QUERY_ENCODE_SET).to_string(),
                utf8_percent_encode(v, &AWS_QUERY_ENCODE_SET).to_string(),
            )
        })
        .collect::<Vec<_>>();
    encoded.sort();
    encoded
}
