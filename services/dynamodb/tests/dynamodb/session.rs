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
use chrono::{TimeDelta, TimeZone, Utc};
use dynsess_core::{ErrorKind, HttpSend};
use dynsess_dynamodb::{Config, SessionStore};
use pretty_assertions::assert_eq;
use serde_json::json;
use test_case::test_case;

fn store(dynamodb: &FakeDynamoDb) -> SessionStore {
    SessionStore::with_context(test_config(), test_context(dynamodb.clone())).unwrap()
}

#[test_case(b"" ; "empty payload")]
#[test_case(b"foo|s:3:\"bar\";" ; "serialized payload")]
#[test_case(&[0, 159, 146, 150, 255] ; "non utf8 payload")]
fn test_write_then_read(data: &[u8]) {
    let dynamodb = FakeDynamoDb::default();
    let store = store(&dynamodb);

    store.write("session-1", data).unwrap();
    assert_eq!(store.read("session-1").unwrap().as_ref(), data);
}

#[test]
fn test_overwrite() {
    let dynamodb = FakeDynamoDb::default();
    let store = store(&dynamodb);

    store.write("session-1", b"first").unwrap();
    store.write("session-1", b"second").unwrap();
    store.write("session-1", b"second").unwrap();

    assert_eq!(store.read("session-1").unwrap().as_ref(), b"second");
}

#[test]
fn test_read_missing() {
    let dynamodb = FakeDynamoDb::default();
    let store = store(&dynamodb);

    assert!(store.read("missing").unwrap().is_empty());
}

#[test]
fn test_destroy() {
    let dynamodb = FakeDynamoDb::default();
    let store = store(&dynamodb);

    store.write("session-1", b"payload").unwrap();
    store.write("session-2", b"other").unwrap();
    store.destroy("session-1").unwrap();

    assert!(store.read("session-1").unwrap().is_empty());
    assert_eq!(store.read("session-2").unwrap().as_ref(), b"other");
    // Destroying again is fine.
    store.destroy("session-1").unwrap();
}

#[test]
fn test_written_item() {
    let dynamodb = FakeDynamoDb::default();
    let store = store(&dynamodb);
    let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();

    store.write_at("session-1", b"hello", now).unwrap();

    assert_eq!(
        dynamodb.item("session-1"),
        Some(json!({
            "id": {"S": "session-1"},
            "data": {"B": "aGVsbG8="},
            "expires": {"N": (now.timestamp() + 1440).to_string()},
        }))
    );

    let put = &dynamodb.requests()[0];
    assert_eq!(put.headers["x-amz-target"], "DynamoDB_20120810.PutItem");
    assert_eq!(put.body["TableName"], "sessions");
}

#[test]
fn test_read_after_expiry() {
    let dynamodb = FakeDynamoDb::default();
    let store = store(&dynamodb);
    let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();

    store.write_at("session-1", b"hello", now).unwrap();

    let before = now + TimeDelta::seconds(1439);
    assert_eq!(store.read_at("session-1", before).unwrap().as_ref(), b"hello");
    let after = now + TimeDelta::seconds(1440);
    assert!(store.read_at("session-1", after).unwrap().is_empty());
}

#[test]
fn test_read_string_payload() {
    let dynamodb = FakeDynamoDb::default();
    dynamodb.insert_item(
        "legacy",
        json!({"id": {"S": "legacy"}, "data": {"S": "written elsewhere"}}),
    );
    let store = store(&dynamodb);

    assert_eq!(
        store.read("legacy").unwrap().as_ref(),
        b"written elsewhere"
    );
}

#[test]
fn test_read_is_consistent() {
    let dynamodb = FakeDynamoDb::default();
    let store = store(&dynamodb);

    store.read("session-1").unwrap();
    assert_eq!(dynamodb.requests()[0].body["ConsistentRead"], json!(true));
}

#[test]
fn test_empty_id() {
    let dynamodb = FakeDynamoDb::default();
    let store = store(&dynamodb);

    for err in [
        store.read("").unwrap_err(),
        store.write("", b"data").unwrap_err(),
        store.destroy("").unwrap_err(),
    ] {
        assert_eq!(err.kind(), ErrorKind::RequestInvalid);
    }
    assert!(dynamodb.requests().is_empty());
}

#[test]
fn test_empty_table_name() {
    let err = SessionStore::with_context(
        Config {
            table_name: String::new(),
            ..test_config()
        },
        test_context(FakeDynamoDb::default()),
    )
    .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::ConfigInvalid);
}

#[test]
fn test_service_error_surfaces() {
    let dynamodb = FakeDynamoDb::default();
    dynamodb.respond_with(
        400,
        r#"{"__type":"com.amazonaws.dynamodb.v20120810#ResourceNotFoundException","message":"Requested resource not found"}"#,
    );
    dynamodb.respond_with(
        400,
        r#"{"__type":"com.amazonaws.dynamodb.v20120810#ProvisionedThroughputExceededException","message":"slow down"}"#,
    );
    let store = store(&dynamodb);

    let err = store.read("session-1").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Service);
    assert_eq!(err.code(), Some("ResourceNotFoundException"));
    assert!(!err.is_retryable());

    let err = store.write("session-1", b"data").unwrap_err();
    assert_eq!(err.code(), Some("ProvisionedThroughputExceededException"));
    assert!(err.is_retryable());
}

#[test]
fn test_malformed_item() {
    let dynamodb = FakeDynamoDb::default();
    dynamodb.respond_with(200, r#"{"Item": {"id": {"S": "abc"}, "data": {"B": "%%%"}}}"#);
    let store = store(&dynamodb);

    let err = store.read("abc").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MalformedResponse);
}

#[test]
fn test_credential_resolved_once() {
    let dynamodb = FakeDynamoDb::default();
    let store = store(&dynamodb);

    store.write("a", b"1").unwrap();
    store.read("a").unwrap();
    store.destroy("a").unwrap();

    // Static credentials never expire, so all three calls share one.
    let cred = store.client().signer().credential().unwrap();
    assert_eq!(cred.access_key_id, "AKIDEXAMPLE");
    assert_eq!(cred.expires_in, None);
    assert_eq!(dynamodb.requests().len(), 3);
}

#[test]
fn test_container_credentials() {
    #[derive(Debug, Clone)]
    struct Container(FakeDynamoDb);

    impl HttpSend for Container {
        fn http_send(
            &self,
            req: http::Request<bytes::Bytes>,
        ) -> dynsess_core::Result<http::Response<bytes::Bytes>> {
            if req.uri().host() == Some("169.254.170.2") {
                let expiration = (Utc::now() + TimeDelta::hours(1)).to_rfc3339();
                let body = json!({
                    "AccessKeyId": "ASIACONTAINER",
                    "SecretAccessKey": "container-secret",
                    "Token": "container-token",
                    "Expiration": expiration,
                });
                return Ok(http::Response::builder()
                    .status(200)
                    .body(bytes::Bytes::from(body.to_string()))?);
            }
            self.0.http_send(req)
        }
    }

    let dynamodb = FakeDynamoDb::default();
    let ctx = dynsess_core::Context::new()
        .with_http_send(Container(dynamodb.clone()))
        .with_env(dynsess_core::StaticEnv {
            home_dir: None,
            envs: [(
                "AWS_CONTAINER_CREDENTIALS_RELATIVE_URI".to_string(),
                "/v2/credentials/task".to_string(),
            )]
            .into(),
        });
    let config = Config {
        credentials: None,
        ..test_config()
    };
    let store = SessionStore::with_context(config, ctx).unwrap();

    store.write("session-1", b"data").unwrap();

    let req = &dynamodb.requests()[0];
    assert_eq!(req.headers["x-amz-security-token"], "container-token");
    assert!(req.headers["authorization"]
        .to_str()
        .unwrap()
        .contains("Credential=ASIACONTAINER/"));
}
