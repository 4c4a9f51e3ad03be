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
use dynsess_aws_v4::{Credential, DefaultCredentialProvider, RequestSigner};
use dynsess_core::time::{now, DateTime};
use dynsess_core::{Context, Error, OsEnv, RequestTimeout, Result, Signer};
use dynsess_file_read_std::StdFileRead;
use dynsess_http_send_reqwest::ReqwestHttpSend;
use http::header::CONTENT_TYPE;
use http::{Method, StatusCode};
use log::debug;
use serde_json::Value;

/// Prefix of the `x-amz-target` header, followed by the operation name.
pub const TARGET_PREFIX: &str = "DynamoDB_20120810";
/// Content type of every DynamoDB request.
pub const CONTENT_TYPE_AMZ_JSON: &str = "application/x-amz-json-1.0";
const X_AMZ_TARGET: &str = "x-amz-target";

/// Error codes DynamoDB uses to ask callers to back off.
const THROTTLING_CODES: &[&str] = &[
    "ProvisionedThroughputExceededException",
    "RequestLimitExceeded",
    "ThrottlingException",
];

/// DynamoDbClient signs and executes low level DynamoDB JSON calls.
///
/// No call is retried: transport errors and throttling are flagged
/// retryable on the returned [`Error`] and left to the caller.
#[derive(Debug, Clone)]
pub struct DynamoDbClient {
    config: Config,
    endpoint: String,
    signer: Signer<Credential>,
}

impl DynamoDbClient {
    /// Create a client talking to the real network, filesystem and process
    /// environment.
    pub fn new(config: Config) -> Result<Self> {
        let ctx = Context::new()
            .with_file_read(StdFileRead)
            .with_http_send(ReqwestHttpSend::default())
            .with_env(OsEnv);
        let config = config.from_env(&ctx);

        Self::with_context(config, ctx)
    }

    /// Create a client on top of the given context.
    pub fn with_context(config: Config, ctx: Context) -> Result<Self> {
        let endpoint = config.endpoint()?;
        let signer = Signer::new(
            ctx,
            DefaultCredentialProvider::new(&config.credential_config()),
            RequestSigner::new(&config.service, config.region()),
        );

        Ok(Self {
            config,
            endpoint,
            signer,
        })
    }

    /// Config of this client.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Endpoint every call is posted to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Signer holding the cached credential.
    pub fn signer(&self) -> &Signer<Credential> {
        &self.signer
    }

    /// Invoke `operation`, e.g. `GetItem`, with a JSON body.
    pub fn invoke(&self, operation: &str, body: &Value) -> Result<Value> {
        self.invoke_at(operation, body, now())
    }

    /// Invoke `operation` signing at the given instant.
    pub fn invoke_at(&self, operation: &str, body: &Value, now: DateTime) -> Result<Value> {
        let content = serde_json::to_vec(body)?;
        if self.config.debug {
            debug!("dynamodb {operation} request: {body}");
        }

        let req = http::Request::builder()
            .method(Method::POST)
            .uri(self.endpoint.as_str())
            .header(CONTENT_TYPE, CONTENT_TYPE_AMZ_JSON)
            .header(X_AMZ_TARGET, format!("{TARGET_PREFIX}.{operation}"))
            .body(())
            .map_err(|e| {
                Error::request_invalid(format!("failed to build {operation} request"))
                    .with_source(e)
                    .with_context(format!("endpoint: {}", self.endpoint))
            })?;
        let (mut parts, _) = req.into_parts();
        self.signer.sign_at(&mut parts, &content, now)?;

        let mut req = http::Request::from_parts(parts, Bytes::from(content));
        req.extensions_mut()
            .insert(RequestTimeout(self.config.timeout()));

        let resp = self
            .signer
            .context()
            .http_send(req)
            .map_err(|e| e.with_context(format!("operation: {operation}")))?;
        let status = resp.status();
        let body = resp.into_body();
        if self.config.debug {
            debug!(
                "dynamodb {operation} response: {status} {}",
                String::from_utf8_lossy(&body)
            );
        }

        if !status.is_success() {
            return Err(parse_service_error(status, &body)
                .with_context(format!("operation: {operation}")));
        }

        match serde_json::from_slice::<Value>(&body) {
            Ok(v @ Value::Object(_)) => Ok(v),
            Ok(v) => Err(Error::malformed_response(format!(
                "{operation} returned a non-object body: {v}"
            ))),
            Err(e) => Err(Error::malformed_response(format!(
                "{operation} returned an undecodable body"
            ))
            .with_source(e)
            .with_context(format!("status: {status}"))),
        }
    }
}

/// Classify a non-2xx response.
///
/// Structured bodies look like
/// `{"__type": "com.amazonaws.dynamodb.v20120810#ResourceNotFoundException", "message": "..."}`.
/// Anything else becomes code `Unknown` carrying the raw body.
fn parse_service_error(status: StatusCode, body: &[u8]) -> Error {
    let parsed = serde_json::from_slice::<Value>(body).ok();
    let structured = parsed
        .as_ref()
        .and_then(|v| v.get("__type"))
        .and_then(Value::as_str)
        .map(|ty| {
            let code = ty.rsplit('#').next().unwrap_or(ty).to_string();
            let message = parsed
                .as_ref()
                .and_then(|v| v.get("message").or_else(|| v.get("Message")))
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            (code, message)
        });

    let (code, message) = structured.unwrap_or_else(|| {
        (
            "Unknown".to_string(),
            String::from_utf8_lossy(body).trim().to_string(),
        )
    });

    let retryable = status.is_server_error() || THROTTLING_CODES.contains(&code.as_str());
    Error::service(code, message)
        .with_context(format!("status: {status}"))
        .set_retryable(retryable)
}
