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

use crate::canonical_request::{encode_query, CanonicalRequest};
use crate::constants::{AWS4_HMAC_SHA256, AWS4_REQUEST, X_AMZ_DATE, X_AMZ_SECURITY_TOKEN};
use crate::Credential;
use dynsess_core::hash::{hex_hmac_sha256, hmac_sha256};
use dynsess_core::time::{format_date, format_iso8601, DateTime};
use dynsess_core::{Context, Error, Result, SignRequest, SigningRequest};
use http::request::Parts;
use http::{header, HeaderValue};
use log::debug;
use std::fmt::Write;

/// RequestSigner that implement AWS SigV4.
///
/// - [Signature Version 4 signing process](https://docs.aws.amazon.com/general/latest/gr/signature-version-4.html)
#[derive(Debug, Clone)]
pub struct RequestSigner {
    service: String,
    region: String,
}

impl RequestSigner {
    /// Create a new builder for AWS V4 signer.
    pub fn new(service: &str, region: &str) -> Self {
        Self {
            service: service.into(),
            region: region.into(),
        }
    }

    /// Service name this signer scopes signatures to.
    pub fn service(&self) -> &str {
        &self.service
    }

    /// Region this signer scopes signatures to.
    pub fn region(&self) -> &str {
        &self.region
    }
}

impl SignRequest for RequestSigner {
    type Credential = Credential;

    fn sign_request(
        &self,
        _: &Context,
        req: &mut Parts,
        body: &[u8],
        credential: Option<&Self::Credential>,
        now: DateTime,
    ) -> Result<()> {
        if self.region.is_empty() || self.service.is_empty() {
            return Err(Error::request_invalid(
                "region and service are required for signing",
            )
            .with_context(format!("region: {:?}", self.region))
            .with_context(format!("service: {:?}", self.service)));
        }

        let Some(cred) = credential else {
            return Ok(());
        };

        let mut signed_req = SigningRequest::build(req)?;

        // canonicalize context
        canonicalize_header(&mut signed_req, cred, now)?;

        let creq = CanonicalRequest::build(&signed_req, body)?;
        debug!("calculated canonical request: {creq}");

        let scope = SigningScope::new(now, &self.region, &self.service);
        debug!("calculated scope: {}", scope.scope());

        let string_to_sign = scope.string_to_sign(&creq)?;
        debug!("calculated string to sign: {string_to_sign}");

        let signing_key =
            generate_signing_key(&cred.secret_access_key, now, &self.region, &self.service);
        let signature = hex_hmac_sha256(&signing_key, string_to_sign.as_bytes());

        let mut authorization = HeaderValue::from_str(&format!(
            "{} Credential={}/{}, SignedHeaders={}, Signature={}",
            AWS4_HMAC_SHA256,
            cred.access_key_id,
            scope.scope(),
            creq.signed_headers(),
            signature
        ))
        .map_err(|e| {
            Error::credential_invalid("access key id is not a valid header value").with_source(e)
        })?;
        authorization.set_sensitive(true);

        signed_req
            .headers
            .insert(header::AUTHORIZATION, authorization);
        signed_req.query = encode_query(&signed_req.query);

        // Apply to the request.
        signed_req.apply(req)
    }
}

/// SigningScope binds a signature to one instant, region and service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SigningScope {
    /// Signing instant.
    pub time: DateTime,
    /// `time` formatted as `YYYYMMDD`.
    pub date_stamp: String,
    /// Region of the scope.
    pub region: String,
    /// Service of the scope.
    pub service: String,
}

impl SigningScope {
    /// Derive the scope for `time`.
    pub fn new(time: DateTime, region: &str, service: &str) -> Self {
        Self {
            time,
            date_stamp: format_date(time),
            region: region.to_string(),
            service: service.to_string(),
        }
    }

    /// `time` formatted as `YYYYMMDDTHHMMSSZ`.
    pub fn amz_date(&self) -> String {
        format_iso8601(self.time)
    }

    /// Scope: "20220313/<region>/<service>/aws4_request"
    pub fn scope(&self) -> String {
        format!(
            "{}/{}/{}/{}",
            self.date_stamp, self.region, self.service, AWS4_REQUEST
        )
    }

    /// StringToSign:
    ///
    /// ```text
    /// AWS4-HMAC-SHA256
    /// 20220313T072004Z
    /// 20220313/<region>/<service>/aws4_request
    /// <hashed_canonical_request>
    /// ```
    pub fn string_to_sign(&self, creq: &CanonicalRequest) -> Result<String> {
        let mut f = String::new();
        writeln!(f, "{AWS4_HMAC_SHA256}")?;
        writeln!(f, "{}", self.amz_date())?;
        writeln!(f, "{}", self.scope())?;
        write!(f, "{}", creq.hash())?;
        Ok(f)
    }
}

fn canonicalize_header(ctx: &mut SigningRequest, cred: &Credential, now: DateTime) -> Result<()> {
    // Header names and values need to be normalized according to Step 4 of https://docs.aws.amazon.com/general/latest/gr/sigv4-create-canonical-request.html
    for (_, value) in ctx.headers.iter_mut() {
        SigningRequest::header_value_normalize(value)?;
    }

    // Insert HOST header if not present.
    if ctx.headers.get(header::HOST).is_none() {
        ctx.headers
            .insert(header::HOST, ctx.authority.as_str().parse()?);
    }

    // The date header always carries the signing instant.
    ctx.headers
        .insert(X_AMZ_DATE, HeaderValue::try_from(format_iso8601(now))?);

    // Insert X_AMZ_SECURITY_TOKEN header if security token exists.
    if let Some(token) = &cred.session_token {
        let mut value = HeaderValue::from_str(token).map_err(|e| {
            Error::credential_invalid("session token is not a valid header value").with_source(e)
        })?;
        // Set token value sensitive to valid leaking.
        value.set_sensitive(true);

        ctx.headers.insert(X_AMZ_SECURITY_TOKEN, value);
    }

    Ok(())
}

/// Derive the SigV4 signing key through the date, region, service and
/// `aws4_request` stages.
pub fn generate_signing_key(secret: &str, time: DateTime, region: &str, service: &str) -> Vec<u8> {
    // Sign secret
    let secret = format!("AWS4{secret}");
    // Sign date
    let sign_date = hmac_sha256(secret.as_bytes(), format_date(time).as_bytes());
    // Sign region
    let sign_region = hmac_sha256(sign_date.as_slice(), region.as_bytes());
    // Sign service
    let sign_service = hmac_sha256(sign_region.as_slice(), service.as_bytes());
    // Sign request
    let sign_request = hmac_sha256(sign_service.as_slice(), AWS4_REQUEST.as_bytes());

    sign_request
}
