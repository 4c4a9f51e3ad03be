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

//! DynamoDB backed session storage signed with AWS SigV4.
//!
//! ```no_run
//! use dynsess_dynamodb::{Config, SessionStore};
//!
//! # fn example() -> dynsess_core::Result<()> {
//! let store = SessionStore::new(Config {
//!     region: Some("us-east-1".to_string()),
//!     table_name: "sessions".to_string(),
//!     ..Default::default()
//! })?;
//!
//! store.write("session-id", b"payload")?;
//! assert_eq!(store.read("session-id")?.as_ref(), b"payload");
//! store.destroy("session-id")?;
//! # Ok(())
//! # }
//! ```

mod config;
pub use config::{Config, CredentialsConfig};

mod client;
pub use client::{DynamoDbClient, CONTENT_TYPE_AMZ_JSON, TARGET_PREFIX};

mod codec;
pub use codec::{AttributeValue, ItemCodec};

mod session;
pub use session::SessionStore;
