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
use crate::constants::{AWS_CONTAINER_CREDENTIALS_RELATIVE_URI, ECS_CREDENTIALS_ENDPOINT};
use crate::provide_credential::utils::{metadata_get, parse_metadata_credential};
use crate::Credential;
use dynsess_core::{Context, ProvideCredential, Result};
use log::debug;
use std::time::Duration;

/// EcsCredentialProvider loads credentials from the container credentials
/// endpoint.
///
/// The request path is taken from `AWS_CONTAINER_CREDENTIALS_RELATIVE_URI`;
/// without it the provider yields nothing.
#[derive(Debug, Clone)]
pub struct EcsCredentialProvider {
    endpoint: String,
    timeout: Duration,
}

impl Default for EcsCredentialProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl EcsCredentialProvider {
    /// Create a new provider against the well-known container endpoint.
    pub fn new() -> Self {
        Self {
            endpoint: ECS_CREDENTIALS_ENDPOINT.to_string(),
            timeout: DEFAULT_METADATA_TIMEOUT,
        }
    }

    /// Override the endpoint host, mostly for tests.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl ProvideCredential for EcsCredentialProvider {
    type Credential = Credential;

    fn provide_credential(&self, ctx: &Context) -> Result<Option<Self::Credential>> {
        let Some(relative_uri) = ctx
            .env_var(AWS_CONTAINER_CREDENTIALS_RELATIVE_URI)
            .filter(|v| !v.is_empty())
        else {
            return Ok(None);
        };

        let url = format!("{}{}", self.endpoint.trim_end_matches('/'), relative_uri);
        debug!("loading container credentials from {url}");

        let content = metadata_get(ctx, &url, self.timeout)?;
        parse_metadata_credential(&content).map(Some)
    }
}
