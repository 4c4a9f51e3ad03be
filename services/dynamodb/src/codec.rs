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

use crate::Config;
use bytes::Bytes;
use dynsess_core::hash::{base64_decode, base64_encode};
use dynsess_core::time::DateTime;
use dynsess_core::{Error, Result};
use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// A single DynamoDB attribute value, in its wire form `{"<type>": <value>}`.
///
/// Only the scalar types a session item uses are modeled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttributeValue {
    /// String.
    S(String),
    /// Number, carried as its decimal text.
    N(String),
    /// Binary, carried base64 encoded.
    B(String),
    /// Boolean.
    #[serde(rename = "BOOL")]
    Bool(bool),
}

impl AttributeValue {
    /// Encode raw bytes as a binary attribute.
    pub fn binary(data: &[u8]) -> Self {
        AttributeValue::B(base64_encode(data))
    }
}

/// ItemCodec maps session ids and payloads onto DynamoDB request bodies
/// and back.
#[derive(Debug, Clone)]
pub struct ItemCodec {
    table_name: String,
    hash_key: String,
    data_attribute: String,
    session_lifetime_attribute: String,
    session_lifetime: u64,
    consistent_read: bool,
}

impl ItemCodec {
    /// Create a codec for the table described by `config`.
    pub fn new(config: &Config) -> Self {
        Self {
            table_name: config.table_name.clone(),
            hash_key: config.hash_key.clone(),
            data_attribute: config.data_attribute.clone(),
            session_lifetime_attribute: config.session_lifetime_attribute.clone(),
            session_lifetime: config.session_lifetime,
            consistent_read: config.consistent_read,
        }
    }

    fn key(&self, id: &str) -> Value {
        json!({ &self.hash_key: AttributeValue::S(id.to_string()) })
    }

    /// `GetItem` body for `id`.
    pub fn get_item(&self, id: &str) -> Value {
        json!({
            "TableName": self.table_name,
            "Key": self.key(id),
            "ConsistentRead": self.consistent_read,
        })
    }

    /// `PutItem` body storing `data` under `id`, expiring one session
    /// lifetime after `now`.
    pub fn put_item(&self, id: &str, data: &[u8], now: DateTime) -> Value {
        let expires = now.timestamp().saturating_add_unsigned(self.session_lifetime);

        json!({
            "TableName": self.table_name,
            "Item": {
                &self.hash_key: AttributeValue::S(id.to_string()),
                &self.data_attribute: AttributeValue::binary(data),
                &self.session_lifetime_attribute: AttributeValue::N(expires.to_string()),
            },
        })
    }

    /// `DeleteItem` body for `id`.
    pub fn delete_item(&self, id: &str) -> Value {
        json!({
            "TableName": self.table_name,
            "Key": self.key(id),
        })
    }

    /// Extract the payload from a `GetItem` response.
    ///
    /// Returns `None` when the response carries no `Item` or when the item's
    /// TTL is already behind `now`. The payload may be stored as `B` or `S`.
    pub fn decode_get_item(&self, response: &Value, now: DateTime) -> Result<Option<Bytes>> {
        let item = match response.get("Item") {
            None | Some(Value::Null) => return Ok(None),
            Some(Value::Object(item)) => item,
            Some(v) => {
                return Err(Error::malformed_response(format!(
                    "GetItem returned a non-object Item: {v}"
                )))
            }
        };

        if let Some(expires) = self.expires_at(item)? {
            if expires <= now.timestamp() {
                debug!("session item expired at {expires}, treating it as absent");
                return Ok(None);
            }
        }

        let Some(data) = item.get(&self.data_attribute) else {
            return Ok(Some(Bytes::new()));
        };
        match decode_attribute(&self.data_attribute, data)? {
            AttributeValue::B(v) => {
                let data = base64_decode(&v).map_err(|e| {
                    Error::malformed_response("session payload is not valid base64").with_source(e)
                })?;
                Ok(Some(Bytes::from(data)))
            }
            AttributeValue::S(v) => Ok(Some(Bytes::from(v))),
            v => Err(Error::malformed_response(format!(
                "attribute {} has unsupported type: {v:?}",
                self.data_attribute
            ))),
        }
    }

    fn expires_at(&self, item: &Map<String, Value>) -> Result<Option<i64>> {
        let Some(v) = item.get(&self.session_lifetime_attribute) else {
            return Ok(None);
        };
        match decode_attribute(&self.session_lifetime_attribute, v)? {
            AttributeValue::N(n) => {
                let malformed = || {
                    Error::malformed_response(format!(
                        "attribute {} is not a finite number: {n}",
                        self.session_lifetime_attribute
                    ))
                };
                if let Ok(v) = n.trim().parse::<i64>() {
                    return Ok(Some(v));
                }
                match n.trim().parse::<f64>() {
                    Ok(v) if v.is_finite() => Ok(Some(v as i64)),
                    Ok(_) => Err(malformed()),
                    Err(e) => Err(malformed().with_source(e)),
                }
            }
            _ => Ok(None),
        }
    }
}

fn decode_attribute(name: &str, v: &Value) -> Result<AttributeValue> {
    serde_json::from_value(v.clone()).map_err(|e| {
        Error::malformed_response(format!("attribute {name} is not a supported value: {v}"))
            .with_source(e)
    })
}
