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

use crate::provide_credential::{
    EcsCredentialProvider, EnvCredentialProvider, ImdsCredentialProvider,
    ProfileCredentialProvider, StaticCredentialProvider,
};
use crate::{Config, Credential};
use dynsess_core::{Context, ProvideCredential, ProvideCredentialChain, Result};

/// DefaultCredentialProvider resolves credentials in a fixed order:
///
/// 1. Explicit credentials from [`Config`]
/// 2. Environment variables
/// 3. Container credentials endpoint
/// 4. EC2 instance metadata
/// 5. Shared credentials file
///
/// The first source that yields a complete key pair wins.
#[derive(Debug)]
pub struct DefaultCredentialProvider {
    chain: ProvideCredentialChain<Credential>,
}

impl Default for DefaultCredentialProvider {
    fn default() -> Self {
        Self::new(&Config::default())
    }
}

impl DefaultCredentialProvider {
    /// Build the chain described by `config`.
    pub fn new(config: &Config) -> Self {
        let mut chain = ProvideCredentialChain::new();

        if let (Some(ak), Some(sk)) = (&config.access_key_id, &config.secret_access_key) {
            let mut provider = StaticCredentialProvider::new(ak, sk);
            if let Some(token) = &config.session_token {
                provider = provider.with_session_token(token);
            }
            chain = chain.push(provider);
        }

        chain = chain.push(EnvCredentialProvider::new());

        if !config.container_credentials_disabled {
            chain = chain.push(EcsCredentialProvider::new().with_timeout(config.metadata_timeout));
        }

        let mut imds = ImdsCredentialProvider::new()
            .with_timeout(config.metadata_timeout)
            .with_disabled(config.ec2_metadata_disabled);
        if let Some(endpoint) = &config.ec2_metadata_endpoint {
            imds = imds.with_endpoint(endpoint);
        }
        chain = chain.push(imds);

        let mut profile = ProfileCredentialProvider::new();
        if let Some(path) = &config.shared_credentials_file {
            profile = profile.with_credentials_file(path);
        }
        if let Some(name) = &config.profile {
            profile = profile.with_profile(name);
        }
        chain = chain.push(profile);

        Self { chain }
    }

    /// Use a custom chain instead.
    pub fn with_chain(chain: ProvideCredentialChain<Credential>) -> Self {
        Self { chain }
    }
}

impl ProvideCredential for DefaultCredentialProvider {
    type Credential = Credential;

    fn provide_credential(&self, ctx: &Context) -> Result<Option<Self::Credential>> {
        self.chain.provide_credential(ctx)
    }
}
