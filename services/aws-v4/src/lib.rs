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

//! AWS SigV4 signer and credential chain for DynamoDB.
//!
//! ```no_run
//! use dynsess_aws_v4::{Config, DefaultCredentialProvider, RequestSigner};
//! use dynsess_core::{Context, OsEnv, Result, Signer};
//!
//! # fn example() -> Result<()> {
//! let config = Config::default();
//! let signer = Signer::new(
//!     Context::new().with_env(OsEnv),
//!     DefaultCredentialProvider::new(&config),
//!     RequestSigner::new("dynamodb", "us-east-1"),
//! );
//!
//! let mut parts = http::Request::post("https://dynamodb.us-east-1.amazonaws.com/")
//!     .header("x-amz-target", "DynamoDB_20120810.ListTables")
//!     .body(())
//!     .unwrap()
//!     .into_parts()
//!     .0;
//! signer.sign(&mut parts, b"{}")?;
//! # Ok(())
//! # }
//! ```

pub mod constants;

mod config;
pub use config::{Config, DEFAULT_METADATA_TIMEOUT};

mod credential;
pub use credential::Credential;

mod canonical_request;
pub use canonical_request::CanonicalRequest;

mod sign_request;
pub use sign_request::{generate_signing_key, RequestSigner, SigningScope};

mod provide_credential;
pub use provide_credential::{
    DefaultCredentialProvider, EcsCredentialProvider, EnvCredentialProvider,
    ImdsCredentialProvider, ProfileCredentialProvider, StaticCredentialProvider,
};
