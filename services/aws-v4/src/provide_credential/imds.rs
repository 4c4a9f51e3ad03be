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

use crate::config::DEFAULT_METADATA_TIMEOUT;
use crate::constants::{
    AWS_EC2_METADATA_DISABLED, AWS_EC2_METADATA_SERVICE_ENDPOINT, EC2_METADATA_ENDPOINT,
    EC2_METADATA_TOKEN_PATH, EC2_SECURITY_CREDENTIALS_PATH, X_AWS_EC2_METADATA_TOKEN,
    X_AWS_EC2_METADATA_TOKEN_TTL_SECONDS,
};
use crate::provide_credential::utils::{metadata_send, parse_metadata_credential};
use crate::Credential;
use chrono::TimeDelta;
use dynsess_core::time::{now, DateTime};
use dynsess_core::{Context, Error, ProvideCredential, Result};
use http::Method;
use log::debug;
use std::fmt::{Debug, Formatter};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Lifetime requested for an IMDSv2 session token, 6 hours.
const TOKEN_TTL_SECONDS: i64 = 21600;
/// Tokens are dropped this long before the service expires them.
const TOKEN_EXPIRY_MARGIN_SECONDS: i64 = 600;

/// ImdsCredentialProvider loads the instance role credentials from the EC2
/// instance metadata service.
///
/// An IMDSv2 session token is requested first and sent with every metadata
/// read. When the token can't be obtained the provider falls back to plain
/// IMDSv1 reads. Two reads are issued: the first lists the role attached to
/// the instance, the second fetches that role's credentials.
#[derive(Clone)]
pub struct ImdsCredentialProvider {
    endpoint: Option<String>,
    timeout: Duration,
    disabled: bool,
    token: Arc<Mutex<Option<(String, DateTime)>>>,
}

impl Debug for ImdsCredentialProvider {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImdsCredentialProvider")
            .field("endpoint", &self.endpoint)
            .field("timeout", &self.timeout)
            .field("disabled", &self.disabled)
            .finish_non_exhaustive()
    }
}

impl Default for ImdsCredentialProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl ImdsCredentialProvider {
    /// Create a new provider.
    pub fn new() -> Self {
        Self {
            endpoint: None,
            timeout: DEFAULT_METADATA_TIMEOUT,
            disabled: false,
            token: Arc::new(Mutex::new(None)),
        }
    }

    /// Override the metadata endpoint.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Disable this provider regardless of the environment.
    pub fn with_disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    fn get_endpoint(&self, ctx: &Context) -> String {
        self.endpoint
            .clone()
            .or_else(|| ctx.env_var(AWS_EC2_METADATA_SERVICE_ENDPOINT))
            .unwrap_or_else(|| EC2_METADATA_ENDPOINT.to_string())
            .trim_end_matches('/')
            .to_string()
    }

    /// Session token for IMDSv2 reads, `None` when only IMDSv1 is reachable.
    fn load_token(&self, ctx: &Context, endpoint: &str) -> Option<String> {
        if let Some((token, expires_in)) = self.token.lock().expect("lock poisoned").clone() {
            if expires_in > now() {
                return Some(token);
            }
        }

        let url = format!("{endpoint}{EC2_METADATA_TOKEN_PATH}");
        let ttl = TOKEN_TTL_SECONDS.to_string();
        let token = match metadata_send(
            ctx,
            Method::PUT,
            &url,
            &[
                ("content-length", "0"),
                (X_AWS_EC2_METADATA_TOKEN_TTL_SECONDS, ttl.as_str()),
            ],
            self.timeout,
        ) {
            Ok(token) if !token.trim().is_empty() => token.trim().to_string(),
            Ok(_) => {
                debug!("instance metadata returned an empty token, falling back to IMDSv1");
                return None;
            }
            Err(err) => {
                debug!("instance metadata token unavailable, falling back to IMDSv1: {err}");
                return None;
            }
        };

        let expires_in =
            now() + TimeDelta::seconds(TOKEN_TTL_SECONDS - TOKEN_EXPIRY_MARGIN_SECONDS);
        *self.token.lock().expect("lock poisoned") = Some((token.clone(), expires_in));
        Some(token)
    }
}

impl ProvideCredential for ImdsCredentialProvider {
    type Credential = Credential;

    fn provide_credential(&self, ctx: &Context) -> Result<Option<Self::Credential>> {
        let disabled_env = ctx
            .env_var(AWS_EC2_METADATA_DISABLED)
            .map(|v| v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);
        if self.disabled || disabled_env {
            debug!("instance metadata credentials are disabled");
            return Ok(None);
        }

        let endpoint = self.get_endpoint(ctx);
        let token = self.load_token(ctx, &endpoint);
        let headers = match &token {
            Some(token) => vec![(X_AWS_EC2_METADATA_TOKEN, token.as_str())],
            None => vec![],
        };

        let url = format!("{endpoint}{EC2_SECURITY_CREDENTIALS_PATH}");
        let roles = metadata_send(ctx, Method::GET, &url, &headers, self.timeout)?;
        let Some(role) = roles.lines().map(str::trim).find(|v| !v.is_empty()) else {
            return Err(Error::credential_invalid(
                "instance metadata lists no iam role",
            )
            .with_context(format!("url: {url}")));
        };
        debug!("loading instance metadata credentials for role {role}");

        let content = metadata_send(
            ctx,
            Method::GET,
            &format!("{url}{role}"),
            &headers,
            self.timeout,
        )?;
        parse_metadata_credential(&content).map(Some)
    }
}
