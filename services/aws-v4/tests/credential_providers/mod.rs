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

mod imds;

use crate::FakeHttpSend;
use dynsess_core::{Context, StaticEnv};
use dynsess_file_read_std::StdFileRead;
use std::collections::HashMap;

pub const CONTAINER_URL: &str = "http://169.254.170.2/v2/credentials/task";
pub const IMDS_TOKEN_URL: &str = "http://169.254.169.254/latest/api/token";
pub const IMDS_ROLE_URL: &str = "http://169.254.169.254/latest/meta-data/iam/security-credentials/";
pub const IMDS_CREDENTIAL_URL: &str =
    "http://169.254.169.254/latest/meta-data/iam/security-credentials/session-role";

pub fn metadata_document(access_key_id: &str, expiration: &str) -> String {
    format!(
        r#"{{
  "Code": "Success",
  "Type": "AWS-HMAC",
  "AccessKeyId": "{access_key_id}",
  "SecretAccessKey": "{access_key_id}_secret",
  "Token": "{access_key_id}_token",
  "Expiration": "{expiration}"
}}"#
    )
}

pub fn create_test_context(http: FakeHttpSend, envs: &[(&str, &str)]) -> Context {
    let _ = env_logger::builder().is_test(true).try_init();

    Context::new()
        .with_file_read(StdFileRead)
        .with_http_send(http)
        .with_env(StaticEnv {
            home_dir: None,
            envs: envs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<HashMap<_, _>>(),
        })
}
