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

use crate::time::{now, DateTime};
use crate::{Context, Error, ProvideCredential, Result, SignRequest, SigningCredential};
use log::debug;
use std::sync::{Arc, Mutex, RwLock};

/// Signer is the main struct used to sign the request.
///
/// It owns the credential cache: the credential is loaded lazily on first use,
/// reused while [`SigningCredential::is_valid`] holds, and reloaded from the
/// provider once it turns stale. Clones share the same cache.
#[derive(Clone, Debug)]
pub struct Signer<K: SigningCredential> {
    ctx: Context,
    loader: Arc<dyn ProvideCredential<Credential = K>>,
    builder: Arc<dyn SignRequest<Credential = K>>,
    credential: Arc<RwLock<Option<K>>>,
    refresh: Arc<Mutex<()>>,
}

impl<K: SigningCredential> Signer<K> {
    /// Create a new signer.
    pub fn new(
        ctx: Context,
        loader: impl ProvideCredential<Credential = K>,
        builder: impl SignRequest<Credential = K>,
    ) -> Self {
        Self {
            ctx,

            loader: Arc::new(loader),
            builder: Arc::new(builder),
            credential: Arc::new(RwLock::new(None)),
            refresh: Arc::new(Mutex::new(())),
        }
    }

    /// The context this signer loads credentials and sends requests with.
    pub fn context(&self) -> &Context {
        &self.ctx
    }

    /// Resolve the credential, serving it from cache while it stays valid.
    ///
    /// Only one refresh runs at a time; concurrent callers wait for it and
    /// then observe the new credential.
    pub fn credential(&self) -> Result<K> {
        if let Some(cred) = self.cached() {
            return Ok(cred);
        }

        let _guard = self.refresh.lock().expect("lock poisoned");
        // Another caller may have refreshed while we were waiting.
        if let Some(cred) = self.cached() {
            return Ok(cred);
        }

        debug!("cached credential is missing or stale, loading from provider");
        let cred = self.loader.provide_credential(&self.ctx)?.ok_or_else(|| {
            Error::credential_unavailable("no credential found in any configured provider")
        })?;

        *self.credential.write().expect("lock poisoned") = Some(cred.clone());
        Ok(cred)
    }

    fn cached(&self) -> Option<K> {
        self.credential
            .read()
            .expect("lock poisoned")
            .as_ref()
            .filter(|cred| cred.is_valid())
            .cloned()
    }

    /// Signing request with the current time.
    pub fn sign(&self, req: &mut http::request::Parts, body: &[u8]) -> Result<()> {
        self.sign_at(req, body, now())
    }

    /// Signing request at the given instant.
    pub fn sign_at(
        &self,
        req: &mut http::request::Parts,
        body: &[u8],
        now: DateTime,
    ) -> Result<()> {
        let cred = self.credential()?;

        self.builder
            .sign_request(&self.ctx, req, body, Some(&cred), now)
    }
}
