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

use chrono::{TimeZone, Utc};
use dynsess_aws_v4::{
    generate_signing_key, CanonicalRequest, RequestSigner, SigningScope, StaticCredentialProvider,
};
use dynsess_core::time::DateTime;
use dynsess_core::{Context, Signer, SigningRequest};
use http::header::AUTHORIZATION;
use pretty_assertions::assert_eq;

const ACCESS_KEY_ID: &str = "AKIDEXAMPLE";
const SECRET_ACCESS_KEY: &str = "wJalrXUtnFEMI/K7MDENG+bPxRfiCYEXAMPLEKEY";

fn reference_time() -> DateTime {
    Utc.with_ymd_and_hms(2015, 8, 30, 12, 36, 0).unwrap()
}

fn reference_request() -> http::request::Parts {
    http::Request::get("https://example.amazonaws.com?Param2=value2&Param1=value1")
        .body(())
        .unwrap()
        .into_parts()
        .0
}

#[test]
fn test_reference_vectors() {
    let mut parts = reference_request();
    parts
        .headers
        .insert("x-amz-date", "20150830T123600Z".parse().unwrap());
    let req = SigningRequest::build(&mut parts).unwrap();

    let creq = CanonicalRequest::build(&req, b"").unwrap();
    assert_eq!(
        creq.hash(),
        "816cd5b414d056048ba4f7c5386d6e0533120fb1fcfa93762cf0fc39e2cf19e0"
    );

    let scope = SigningScope::new(reference_time(), "us-east-1", "service");
    assert_eq!(
        scope.string_to_sign(&creq).unwrap(),
        "AWS4-HMAC-SHA256\n20150830T123600Z\n20150830/us-east-1/service/aws4_request\n816cd5b414d056048ba4f7c5386d6e0533120fb1fcfa93762cf0fc39e2cf19e0"
    );

    let key = generate_signing_key(SECRET_ACCESS_KEY, reference_time(), "us-east-1", "iam");
    assert_eq!(
        key.iter().map(|b| format!("{b:02x}")).collect::<String>(),
        "c4afb1cc5771d871763a393e44b703571b55cc28424d1a5e86da6ed3c154a4b9"
    );
}

#[test]
fn test_signer_reference_authorization() {
    let signer = Signer::new(
        Context::new(),
        StaticCredentialProvider::new(ACCESS_KEY_ID, SECRET_ACCESS_KEY),
        RequestSigner::new("service", "us-east-1"),
    );

    let mut parts = reference_request();
    signer.sign_at(&mut parts, b"", reference_time()).unwrap();

    assert_eq!(parts.headers["x-amz-date"], "20150830T123600Z");
    assert_eq!(
        parts.headers[AUTHORIZATION],
        "AWS4-HMAC-SHA256 Credential=AKIDEXAMPLE/20150830/us-east-1/service/aws4_request, SignedHeaders=host;x-amz-date, Signature=b97d918cfa904a5beff61c982a1b6f458b799221646efd99d3219ec94cdf2500"
    );
}

#[test]
fn test_signing_is_deterministic() {
    let signer = Signer::new(
        Context::new(),
        StaticCredentialProvider::new(ACCESS_KEY_ID, SECRET_ACCESS_KEY)
            .with_session_token("session-token"),
        RequestSigner::new("dynamodb", "us-east-1"),
    );
    let body = br#"{"TableName":"sessions","Key":{"id":{"S":"abc"}}}"#;

    let sign = || {
        let mut parts = http::Request::post("https://dynamodb.us-east-1.amazonaws.com/")
            .header("content-type", "application/x-amz-json-1.0")
            .header("x-amz-target", "DynamoDB_20120810.GetItem")
            .body(())
            .unwrap()
            .into_parts()
            .0;
        signer.sign_at(&mut parts, body, reference_time()).unwrap();
        parts
    };

    let first = sign();
    let second = sign();
    assert_eq!(first.headers[AUTHORIZATION], second.headers[AUTHORIZATION]);

    let authorization = first.headers[AUTHORIZATION].to_str().unwrap();
    assert!(authorization.contains(
        "SignedHeaders=content-type;host;x-amz-date;x-amz-security-token;x-amz-target,"
    ));
    assert_eq!(first.headers["x-amz-security-token"], "session-token");
    assert_eq!(first.headers["host"], "dynamodb.us-east-1.amazonaws.com");
}
