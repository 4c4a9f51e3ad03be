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

use anyhow::Result;
use dynsess_dynamodb::{Config, SessionStore};
use std::env;

fn main() -> Result<()> {
    env_logger::init();

    // Region and credentials are picked up from the environment, the
    // shared credentials file or instance metadata.
    let config = Config {
        table_name: env::var("SESSION_TABLE").unwrap_or_else(|_| "sessions".to_string()),
        debug: true,
        ..Default::default()
    };
    let store = SessionStore::new(config)?;

    let id = "example-session";
    store.write(id, b"user|s:5:\"alice\";")?;

    let data = store.read(id)?;
    println!("read back: {}", String::from_utf8_lossy(&data));

    store.destroy(id)?;
    println!("after destroy: {} bytes", store.read(id)?.len());

    Ok(())
}
