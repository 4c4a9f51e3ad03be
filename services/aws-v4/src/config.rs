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

use std::time::Duration;

/// Default timeout for container and instance metadata lookups.
pub const DEFAULT_METADATA_TIMEOUT: Duration = Duration::from_secs(1);

/// Config for the aws credential chain.
///
/// Every field is an explicit override. Values left unset are resolved by the
/// providers at load time from the environment exposed through
/// [`Context`](dynsess_core::Context).
#[derive(Clone, Debug)]
pub struct Config {
    /// `access_key_id` is used together with `secret_access_key` as the
    /// highest-priority credential. Both must be set to take effect.
    pub access_key_id: Option<String>,
    /// `secret_access_key` for the explicit credential.
    pub secret_access_key: Option<String>,
    /// `session_token` for the explicit credential.
    pub session_token: Option<String>,
    /// `shared_credentials_file` will be loaded from:
    ///
    /// - this field if it's `is_some`
    /// - env value: [`AWS_SHARED_CREDENTIALS_FILE`](crate::constants::AWS_SHARED_CREDENTIALS_FILE)
    /// - env value: [`AWS_CREDENTIALS_FILENAME`](crate::constants::AWS_CREDENTIALS_FILENAME)
    /// - default to: `~/.aws/credentials`
    pub shared_credentials_file: Option<String>,
    /// `profile` will be loaded from:
    ///
    /// - this field if it's `is_some`
    /// - env value: [`AWS_PROFILE`](crate::constants::AWS_PROFILE)
    /// - default to: `default`
    pub profile: Option<String>,
    /// Skip the container credentials endpoint.
    pub container_credentials_disabled: bool,
    /// `ec2_metadata_disabled` value will be loaded from:
    ///
    /// - this field
    /// - env value: [`AWS_EC2_METADATA_DISABLED`](crate::constants::AWS_EC2_METADATA_DISABLED)
    pub ec2_metadata_disabled: bool,
    /// `ec2_metadata_endpoint` will be loaded from:
    ///
    /// - this field if it's `is_some`
    /// - env value: [`AWS_EC2_METADATA_SERVICE_ENDPOINT`](crate::constants::AWS_EC2_METADATA_SERVICE_ENDPOINT)
    /// - default to: `http://169.254.169.254`
    pub ec2_metadata_endpoint: Option<String>,
    /// Timeout applied to every metadata request.
    pub metadata_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            access_key_id: None,
            secret_access_key: None,
            session_token: None,
            shared_credentials_file: None,
            profile: None,
            container_credentials_disabled: false,
            ec2_metadata_disabled: false,
            ec2_metadata_endpoint: None,
            metadata_timeout: DEFAULT_METADATA_TIMEOUT,
        }
    }
}

impl Config {
    /// Set the explicit key pair.
    pub fn with_credential(
        mut self,
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
        session_token: Option<String>,
    ) -> Self {
        self.access_key_id = Some(access_key_id.into());
        self.secret_access_key = Some(secret_access_key.into());
        self.session_token = session_token;
        self
    }

    /// Set the shared credentials file path.
    pub fn with_shared_credentials_file(mut self, path: impl Into<String>) -> Self {
        self.shared_credentials_file = Some(path.into());
        self
    }

    /// Set the timeout used for metadata endpoints.
    pub fn with_metadata_timeout(mut self, timeout: Duration) -> Self {
        self.metadata_timeout = timeout;
        self
    }
}
