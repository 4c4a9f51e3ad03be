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

//! Blocking file reading implementation for dynsess.
//!
//! This crate provides `StdFileRead`, a file reader that implements the
//! `FileRead` trait from `dynsess_core` using `std::fs`.
//!
//! ## Example
//!
//! ```no_run
//! use dynsess_core::{Context, OsEnv};
//! use dynsess_file_read_std::StdFileRead;
//!
//! let ctx = Context::new()
//!     .with_file_read(StdFileRead)
//!     .with_env(OsEnv);
//!
//! match ctx.file_read("/path/to/credentials") {
//!     Ok(content) => println!("Read {} bytes", content.len()),
//!     Err(e) => eprintln!("Failed to read file: {}", e),
//! }
//! ```

use dynsess_core::{Error, FileRead, Result};

/// `std::fs` based implementation of the `FileRead` trait.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdFileRead;

impl FileRead for StdFileRead {
    fn file_read(&self, path: &str) -> Result<Vec<u8>> {
        std::fs::read(path).map_err(|e| {
            Error::unexpected("failed to read file")
                .with_context(format!("path: {path}"))
                .with_source(e)
        })
    }
}
