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

use dynsess_dynamodb::{Config, CredentialsConfig, SessionStore};
use log::warn;
use std::env;

fn init_store() -> Option<SessionStore> {
    let _ = env_logger::builder().is_test(true).try_init();
    let _ = dotenv::dotenv();

    if env::var("DYNSESS_DYNAMODB_TEST").unwrap_or_default() != "on" {
        return None;
    }

    let config = Config {
        region: env::var("DYNSESS_DYNAMODB_REGION").ok(),
        table_name: env::var("DYNSESS_DYNAMODB_TABLE").ok()?,
        credentials: match (
            env::var("DYNSESS_DYNAMODB_ACCESS_KEY"),
            env::var("DYNSESS_DYNAMODB_SECRET_KEY"),
        ) {
            (Ok(key), Ok(secret)) => Some(CredentialsConfig {
                key,
                secret,
                token: env::var("DYNSESS_DYNAMODB_SESSION_TOKEN").ok(),
            }),
            _ => None,
        },
        ..Default::default()
    };

    Some(SessionStore::new(config).expect("store must be created"))
}

#[test]
fn test_live_write_read_destroy() -> anyhow::Result<()> {
    let Some(store) = init_store() else {
        warn!("DYNSESS_DYNAMODB_TEST is not set, skipped");
        return Ok(());
    };

    let id = format!("dynsess-test-{}", chrono::Utc::now().timestamp_millis());
    store.write(&id, b"foo|s:3:\"bar\";")?;
    assert_eq!(store.read(&id)?.as_ref(), b"foo|s:3:\"bar\";");

    store.destroy(&id)?;
    assert!(store.read(&id)?.is_empty());
    Ok(())
}
