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

use crate::{Config, DynamoDbClient, ItemCodec};
use bytes::Bytes;
use dynsess_core::time::{now, DateTime};
use dynsess_core::{Context, Error, Result};
use log::debug;

/// SessionStore keeps opaque session payloads in one DynamoDB table.
///
/// Every operation is a single signed call: `read` is `GetItem`, `write` is
/// an unconditional `PutItem` and `destroy` is `DeleteItem`.
#[derive(Debug, Clone)]
pub struct SessionStore {
    client: DynamoDbClient,
    codec: ItemCodec,
}

impl SessionStore {
    /// Create a store talking to the real network, filesystem and process
    /// environment.
    pub fn new(config: Config) -> Result<Self> {
        Self::with_client(DynamoDbClient::new(config)?)
    }

    /// Create a store on top of the given context.
    pub fn with_context(config: Config, ctx: Context) -> Result<Self> {
        Self::with_client(DynamoDbClient::with_context(config, ctx)?)
    }

    /// Create a store on top of an existing client.
    pub fn with_client(client: DynamoDbClient) -> Result<Self> {
        client.config().validate()?;
        let codec = ItemCodec::new(client.config());

        Ok(Self { client, codec })
    }

    /// Client used by this store.
    pub fn client(&self) -> &DynamoDbClient {
        &self.client
    }

    /// Read the payload of session `id`.
    ///
    /// Missing and expired sessions read as empty.
    pub fn read(&self, id: &str) -> Result<Bytes> {
        self.read_at(id, now())
    }

    /// Read the payload of session `id` as seen at `now`.
    pub fn read_at(&self, id: &str, now: DateTime) -> Result<Bytes> {
        check_id(id)?;

        let resp = self
            .client
            .invoke_at("GetItem", &self.codec.get_item(id), now)?;
        match self.codec.decode_get_item(&resp, now)? {
            Some(data) => Ok(data),
            None => {
                debug!("session {id} not found");
                Ok(Bytes::new())
            }
        }
    }

    /// Store `data` as the payload of session `id`, replacing any previous
    /// payload.
    pub fn write(&self, id: &str, data: &[u8]) -> Result<()> {
        self.write_at(id, data, now())
    }

    /// Store `data` for session `id`, computing its expiry from `now`.
    pub fn write_at(&self, id: &str, data: &[u8], now: DateTime) -> Result<()> {
        check_id(id)?;

        self.client
            .invoke_at("PutItem", &self.codec.put_item(id, data, now), now)?;
        Ok(())
    }

    /// Remove session `id`. Removing a missing session succeeds.
    pub fn destroy(&self, id: &str) -> Result<()> {
        check_id(id)?;

        self.client
            .invoke("DeleteItem", &self.codec.delete_item(id))?;
        Ok(())
    }
}

fn check_id(id: &str) -> Result<()> {
    if id.is_empty() {
        return Err(Error::request_invalid("session id must not be empty"));
    }
    Ok(())
}
