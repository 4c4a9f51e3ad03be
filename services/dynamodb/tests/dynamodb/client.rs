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

use crate::{test_config, test_context, FakeDynamoDb};
use chrono::{TimeZone, Utc};
use dynsess_core::ErrorKind;
use dynsess_dynamodb::{Config, CredentialsConfig, DynamoDbClient};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::time::Duration;

#[test]
fn test_invoke_request_shape() {
    let dynamodb = FakeDynamoDb::default();
    let client = DynamoDbClient::with_context(test_config(), test_context(dynamodb.clone()))
        .unwrap();
    let now = Utc.with_ymd_and_hms(2015, 8, 30, 12, 36, 0).unwrap();

    let resp = client
        .invoke_at(
            "GetItem",
            &json!({"TableName": "sessions", "Key": {"id": {"S": "abc"}}}),
            now,
        )
        .unwrap();
    assert_eq!(resp, json!({}));

    let requests = dynamodb.requests();
    assert_eq!(requests.len(), 1);
    let req = &requests[0];
    assert_eq!(req.uri, "https://dynamodb.us-east-1.amazonaws.com/");
    assert_eq!(req.headers["content-type"], "application/x-amz-json-1.0");
    assert_eq!(req.headers["x-amz-target"], "DynamoDB_20120810.GetItem");
    assert_eq!(req.headers["x-amz-date"], "20150830T123600Z");
    assert_eq!(req.timeout, Some(Duration::from_secs(10)));

    let authorization = req.headers["authorization"].to_str().unwrap();
    assert!(authorization.starts_with(
        "AWS4-HMAC-SHA256 Credential=AKIDEXAMPLE/20150830/us-east-1/dynamodb/aws4_request, SignedHeaders=content-type;host;x-amz-date;x-amz-target, Signature="
    ));
}

#[test]
fn test_session_token_header() {
    let dynamodb = FakeDynamoDb::default();
    let config = Config {
        credentials: Some(CredentialsConfig {
            key: "ASIAEXAMPLE".to_string(),
            secret: "secret".to_string(),
            token: Some("session-token".to_string()),
        }),
        endpoint: Some("http://localhost:8000".to_string()),
        timeout: 3,
        ..test_config()
    };
    let client = DynamoDbClient::with_context(config, test_context(dynamodb.clone())).unwrap();

    client.invoke("DeleteItem", &json!({"TableName": "sessions", "Key": {"id": {"S": "abc"}}}))
        .unwrap();

    let req = &dynamodb.requests()[0];
    assert_eq!(req.uri, "http://localhost:8000/");
    assert_eq!(req.headers["x-amz-security-token"], "session-token");
    assert_eq!(req.timeout, Some(Duration::from_secs(3)));
    assert!(req.headers["authorization"]
        .to_str()
        .unwrap()
        .contains("SignedHeaders=content-type;host;x-amz-date;x-amz-security-token;x-amz-target,"));
}

#[test]
fn test_service_error() {
    let dynamodb = FakeDynamoDb::default();
    dynamodb.respond_with(
        400,
        r#"{"__type":"com.amazonaws.dynamodb.v20120810#ConditionalCheckFailedException","message":"The conditional request failed"}"#,
    );
    let client = DynamoDbClient::with_context(test_config(), test_context(dynamodb)).unwrap();

    let err = client.invoke("PutItem", &json!({})).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Service);
    assert_eq!(err.code(), Some("ConditionalCheckFailedException"));
    assert_eq!(err.message(), "The conditional request failed");
    assert!(!err.is_retryable());
}

#[test]
fn test_malformed_response() {
    let dynamodb = FakeDynamoDb::default();
    dynamodb.respond_with(200, "<html>captive portal</html>");
    dynamodb.respond_with(200, "");
    dynamodb.respond_with(200, "[]");
    let client = DynamoDbClient::with_context(test_config(), test_context(dynamodb)).unwrap();

    for _ in 0..3 {
        let err = client.invoke("GetItem", &json!({})).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedResponse);
    }
}

#[test]
fn test_transport_error() {
    // No http client configured behaves like an unreachable endpoint.
    let client = DynamoDbClient::with_context(
        test_config(),
        dynsess_core::Context::new().with_env(dynsess_core::StaticEnv::default()),
    )
    .unwrap();

    let err = client.invoke("GetItem", &json!({})).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Transport);
    assert!(err.is_retryable());
}

#[test]
fn test_missing_region_fails_before_sending() {
    let dynamodb = FakeDynamoDb::default();

    let err = DynamoDbClient::with_context(
        Config {
            region: None,
            ..test_config()
        },
        test_context(dynamodb.clone()),
    )
    .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::RequestInvalid);

    // An endpoint override still needs a region to sign with.
    let client = DynamoDbClient::with_context(
        Config {
            region: None,
            endpoint: Some("http://localhost:8000".to_string()),
            ..test_config()
        },
        test_context(dynamodb.clone()),
    )
    .unwrap();
    let err = client.invoke("GetItem", &json!({})).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::RequestInvalid);
    assert!(dynamodb.requests().is_empty());
}

#[test]
fn test_credentials_unavailable() {
    let dynamodb = FakeDynamoDb::default();
    let config = Config {
        credentials: None,
        ..test_config()
    };
    let client = DynamoDbClient::with_context(config, test_context(dynamodb.clone())).unwrap();

    let err = client.invoke("GetItem", &json!({})).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::CredentialUnavailable);
    assert!(dynamodb.requests().is_empty());
}
