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

use dynsess_aws_v4::constants::{AWS_DEFAULT_REGION, AWS_REGION};
use dynsess_core::utils::Redact;
use dynsess_core::{Context, Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Formatter};
use std::time::Duration;

/// Config for the DynamoDB session store.
///
/// Field names follow the configuration keys so a config can be deserialized
/// from any serde source:
///
/// ```
/// use dynsess_dynamodb::Config;
///
/// let config: Config = serde_json::from_str(
///     r#"{"region": "us-east-1", "table_name": "sessions", "timeout": 5}"#,
/// )
/// .unwrap();
/// assert_eq!(config.session_lifetime, 1440);
/// ```
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// `region` will be loaded from:
    ///
    /// - this field if it's `is_some`
    /// - env value: [`AWS_REGION`]
    /// - env value: [`AWS_DEFAULT_REGION`]
    pub region: Option<String>,
    /// Service name used in the signing scope.
    pub service: String,
    /// Override the regional endpoint, for local DynamoDB or tests.
    pub endpoint: Option<String>,
    /// Explicit credentials, they take precedence over every other source.
    pub credentials: Option<CredentialsConfig>,
    /// Path of the shared credentials file.
    pub credentials_file: Option<String>,
    /// Table holding the sessions.
    pub table_name: String,
    /// Timeout of a single DynamoDB call in seconds.
    pub timeout: u64,
    /// Timeout of a single metadata call in seconds.
    pub metadata_timeout: u64,
    /// Log request and response bodies at debug level.
    pub debug: bool,
    /// Name of the partition key attribute.
    pub hash_key: String,
    /// Name of the attribute holding the session payload.
    pub data_attribute: String,
    /// Name of the TTL attribute.
    pub session_lifetime_attribute: String,
    /// Session lifetime in seconds.
    pub session_lifetime: u64,
    /// Read sessions with strongly consistent reads.
    pub consistent_read: bool,
}

/// Explicit key pair.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct CredentialsConfig {
    /// Access key id.
    pub key: String,
    /// Secret access key.
    pub secret: String,
    /// Session token.
    #[serde(default)]
    pub token: Option<String>,
}

impl Debug for CredentialsConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialsConfig")
            .field("key", &Redact::from(&self.key))
            .field("secret", &Redact::from(&self.secret))
            .field("token", &Redact::from(&self.token))
            .finish()
    }
}

impl Debug for Config {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("region", &self.region)
            .field("service", &self.service)
            .field("endpoint", &self.endpoint)
            .field("credentials", &self.credentials)
            .field("credentials_file", &self.credentials_file)
            .field("table_name", &self.table_name)
            .field("timeout", &self.timeout)
            .field("metadata_timeout", &self.metadata_timeout)
            .field("debug", &self.debug)
            .field("hash_key", &self.hash_key)
            .field("data_attribute", &self.data_attribute)
            .field("session_lifetime_attribute", &self.session_lifetime_attribute)
            .field("session_lifetime", &self.session_lifetime)
            .field("consistent_read", &self.consistent_read)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            region: None,
            service: "dynamodb".to_string(),
            endpoint: None,
            credentials: None,
            credentials_file: None,
            table_name: String::new(),
            timeout: 10,
            metadata_timeout: 1,
            debug: false,
            hash_key: "id".to_string(),
            data_attribute: "data".to_string(),
            session_lifetime_attribute: "expires".to_string(),
            session_lifetime: 1440,
            consistent_read: true,
        }
    }
}

impl Config {
    /// Load config from env.
    pub fn from_env(mut self, ctx: &Context) -> Self {
        if self.region.as_deref().unwrap_or_default().is_empty() {
            self.region = ctx
                .env_var(AWS_REGION)
                .or_else(|| ctx.env_var(AWS_DEFAULT_REGION))
                .filter(|v| !v.is_empty());
        }

        self
    }

    /// Check the settings every call relies on.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("table_name", &self.table_name),
            ("hash_key", &self.hash_key),
            ("data_attribute", &self.data_attribute),
            ("session_lifetime_attribute", &self.session_lifetime_attribute),
        ] {
            if value.is_empty() {
                return Err(Error::config_invalid(format!("{name} must not be empty")));
            }
        }

        Ok(())
    }

    /// Region used for signing, empty when unset.
    pub fn region(&self) -> &str {
        self.region.as_deref().unwrap_or_default()
    }

    /// Endpoint every call is posted to.
    ///
    /// Regions in the China partition live under `amazonaws.com.cn`.
    pub fn endpoint(&self) -> Result<String> {
        if let Some(endpoint) = self.endpoint.as_ref().filter(|v| !v.is_empty()) {
            return Ok(endpoint.clone());
        }

        let region = self.region();
        if region.is_empty() {
            return Err(Error::request_invalid(
                "region is required to derive the dynamodb endpoint",
            ));
        }
        if region.starts_with("cn-") {
            Ok(format!("https://dynamodb.{region}.amazonaws.com.cn/"))
        } else {
            Ok(format!("https://dynamodb.{region}.amazonaws.com/"))
        }
    }

    /// Timeout of a single DynamoDB call.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }

    /// Credential chain settings derived from this config.
    pub fn credential_config(&self) -> dynsess_aws_v4::Config {
        let mut config = dynsess_aws_v4::Config::default()
            .with_metadata_timeout(Duration::from_secs(self.metadata_timeout));
        if let Some(cred) = &self.credentials {
            config = config.with_credential(&cred.key, &cred.secret, cred.token.clone());
        }
        if let Some(path) = &self.credentials_file {
            config = config.with_shared_credentials_file(path);
        }
        config
    }
}
