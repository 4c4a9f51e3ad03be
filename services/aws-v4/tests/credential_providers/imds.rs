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

use super::{
    create_test_context, metadata_document, IMDS_CREDENTIAL_URL, IMDS_ROLE_URL, IMDS_TOKEN_URL,
};
use crate::FakeHttpSend;
use dynsess_aws_v4::constants::AWS_EC2_METADATA_SERVICE_ENDPOINT;
use dynsess_aws_v4::ImdsCredentialProvider;
use dynsess_core::ProvideCredential;
use pretty_assertions::assert_eq;

#[test]
fn test_imds_credential_provider_with_token() {
    let http = FakeHttpSend::default();
    http.route(IMDS_TOKEN_URL, 200, "imds-session-token")
        .route(IMDS_ROLE_URL, 200, "session-role\n")
        .route(
            IMDS_CREDENTIAL_URL,
            200,
            metadata_document("instance", "2099-01-01T00:00:00Z"),
        );
    let ctx = create_test_context(http.clone(), &[]);
    let provider = ImdsCredentialProvider::new();

    let cred = provider
        .provide_credential(&ctx)
        .unwrap()
        .expect("credential must be loaded");
    assert_eq!(cred.access_key_id, "instance");

    assert_eq!(
        http.last_request(IMDS_TOKEN_URL, "x-aws-ec2-metadata-token-ttl-seconds"),
        Some((http::Method::PUT, Some("21600".to_string())))
    );
    for url in [IMDS_ROLE_URL, IMDS_CREDENTIAL_URL] {
        assert_eq!(
            http.last_request(url, "x-aws-ec2-metadata-token"),
            Some((http::Method::GET, Some("imds-session-token".to_string()))),
            "url: {url}"
        );
    }

    // The session token is reused by later loads.
    provider.provide_credential(&ctx).unwrap();
    assert_eq!(http.call_count(IMDS_TOKEN_URL), 1);
    assert_eq!(http.call_count(IMDS_CREDENTIAL_URL), 2);
}

#[test]
fn test_imds_credential_provider_token_rejected() {
    let http = FakeHttpSend::default();
    http.route(IMDS_TOKEN_URL, 403, "Forbidden")
        .route(IMDS_ROLE_URL, 200, "session-role")
        .route(
            IMDS_CREDENTIAL_URL,
            200,
            metadata_document("instance", "2099-01-01T00:00:00Z"),
        );
    let ctx = create_test_context(http.clone(), &[]);

    let cred = ImdsCredentialProvider::new()
        .provide_credential(&ctx)
        .unwrap()
        .expect("credential must be loaded");
    assert_eq!(cred.access_key_id, "instance");
    assert_eq!(
        http.last_request(IMDS_ROLE_URL, "x-aws-ec2-metadata-token"),
        Some((http::Method::GET, None))
    );
}

#[test]
fn test_imds_credential_provider() {
    let http = FakeHttpSend::default();
    http.route(IMDS_ROLE_URL, 200, "session-role\n")
        .route(
            IMDS_CREDENTIAL_URL,
            200,
            metadata_document("instance", "2099-01-01T00:00:00Z"),
        );
    let ctx = create_test_context(http.clone(), &[]);

    let cred = ImdsCredentialProvider::new()
        .provide_credential(&ctx)
        .unwrap()
        .expect("credential must be loaded");

    assert_eq!(cred.access_key_id, "instance");
    assert_eq!(cred.session_token.as_deref(), Some("instance_token"));
    let urls = http.calls().into_iter().map(|(u, _)| u).collect::<Vec<_>>();
    // No token endpoint answers, so both reads fall back to IMDSv1.
    assert_eq!(
        urls,
        vec![
            IMDS_TOKEN_URL.to_string(),
            IMDS_ROLE_URL.to_string(),
            IMDS_CREDENTIAL_URL.to_string()
        ]
    );
    assert_eq!(
        http.last_request(IMDS_CREDENTIAL_URL, "x-aws-ec2-metadata-token"),
        Some((http::Method::GET, None))
    );
}

#[test]
fn test_imds_credential_provider_with_endpoint_env() {
    let http = FakeHttpSend::default();
    http.route(
        "http://127.0.0.1:1338/latest/meta-data/iam/security-credentials/",
        200,
        "local-role",
    )
    .route(
        "http://127.0.0.1:1338/latest/meta-data/iam/security-credentials/local-role",
        200,
        metadata_document("local", "2099-01-01T00:00:00Z"),
    );
    let ctx = create_test_context(
        http,
        &[(AWS_EC2_METADATA_SERVICE_ENDPOINT, "http://127.0.0.1:1338")],
    );

    let cred = ImdsCredentialProvider::new()
        .provide_credential(&ctx)
        .unwrap()
        .expect("credential must be loaded");
    assert_eq!(cred.access_key_id, "local");
}

#[test]
fn test_imds_credential_provider_without_role() {
    let http = FakeHttpSend::default();
    http.route(IMDS_ROLE_URL, 200, "");
    let ctx = create_test_context(http.clone(), &[]);

    assert!(ImdsCredentialProvider::new().provide_credential(&ctx).is_err());
    assert_eq!(http.call_count(IMDS_CREDENTIAL_URL), 0);

    let http = FakeHttpSend::default();
    http.route(IMDS_ROLE_URL, 404, "Not Found");
    let ctx = create_test_context(http, &[]);
    assert!(ImdsCredentialProvider::new().provide_credential(&ctx).is_err());
}
