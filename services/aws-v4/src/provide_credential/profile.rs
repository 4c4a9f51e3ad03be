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

use crate::constants::*;
use crate::Credential;
use dynsess_core::{Context, Error, ProvideCredential, Result};
use ini::Ini;
use log::debug;

/// ProfileCredentialProvider loads credentials from the shared credentials
/// file.
///
/// The file is looked up at:
///
/// - the path configured by [`ProfileCredentialProvider::with_credentials_file`]
/// - env value: [`AWS_SHARED_CREDENTIALS_FILE`]
/// - env value: [`AWS_CREDENTIALS_FILENAME`]
/// - default to: `~/.aws/credentials`
///
/// A missing file, profile or key is not an error, the provider just yields
/// nothing.
#[derive(Debug, Clone, Default)]
pub struct ProfileCredentialProvider {
    profile: Option<String>,
    credentials_file: Option<String>,
}

impl ProfileCredentialProvider {
    /// Create a new provider.
    pub fn new() -> Self {
        Self::default()
    }

    /// Read this profile instead of `AWS_PROFILE` or `default`.
    pub fn with_profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = Some(profile.into());
        self
    }

    /// Read this file instead of the env configured or default location.
    pub fn with_credentials_file(mut self, path: impl Into<String>) -> Self {
        self.credentials_file = Some(path.into());
        self
    }

    fn credentials_file(&self, ctx: &Context) -> String {
        self.credentials_file
            .clone()
            .or_else(|| ctx.env_var(AWS_SHARED_CREDENTIALS_FILE))
            .or_else(|| ctx.env_var(AWS_CREDENTIALS_FILENAME))
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| "~/.aws/credentials".to_string())
    }

    fn profile(&self, ctx: &Context) -> String {
        self.profile
            .clone()
            .or_else(|| ctx.env_var(AWS_PROFILE))
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| "default".to_string())
    }
}

impl ProvideCredential for ProfileCredentialProvider {
    type Credential = Credential;

    fn provide_credential(&self, ctx: &Context) -> Result<Option<Self::Credential>> {
        let path = self.credentials_file(ctx);
        let Some(expanded_path) = ctx.expand_home_dir(&path) else {
            debug!("failed to expand homedir for path: {path}");
            return Ok(None);
        };

        let content = match ctx.file_read_as_string(&expanded_path) {
            Ok(content) => content,
            Err(err) => {
                debug!("failed to read credentials file {expanded_path}: {err}");
                return Ok(None);
            }
        };

        let conf = Ini::load_from_str(&content).map_err(|e| {
            Error::config_invalid("failed to parse credentials file")
                .with_source(e)
                .with_context(format!("path: {expanded_path}"))
        })?;

        let profile = self.profile(ctx);
        let Some(props) = conf.section(Some(profile.as_str())) else {
            debug!("profile {profile} not found in credentials file {expanded_path}");
            return Ok(None);
        };

        let access_key_id = props.get("aws_access_key_id").unwrap_or_default();
        let secret_access_key = props.get("aws_secret_access_key").unwrap_or_default();
        let cred = Credential::new(access_key_id, secret_access_key)
            .with_session_token(props.get("aws_session_token").map(|v| v.to_string()));

        if !cred.is_complete() {
            debug!("profile {profile} in {expanded_path} misses the key pair");
            return Ok(None);
        }
        Ok(Some(cred))
    }
}
