//! JWKS fetching and issuer-discovery tests against a mock provider.

use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use artifact_core::auth::{AuthConfig, TokenVerifier};

// RFC 7517 appendix A.1 RSA public key.
const RSA_N: &str = "0vx7agoebGcQSuuPiLJXZptN9nndrQmbXEps2aiAFbWhM78LhWx4cbbfAAtVT86zwu1RK7aPFFxuhDR1L6tSoc_BJECPebWKRXjBZCiFV4n3oknjhMstn64tZ_2W-5JsGY4Hc5n9yBXArwl93lqt7_RN5w6Cf0h4QyQ5v-65YGjQR0_FDW2QvzqY368QQMicAtaSqzs8KJZgnYb9c7d0zgdAZHzu6qMQvRL5hajrn1n91CbOpbISD08qNLyrdkt-bFTWhAI4vMQFh6WeZu0fM4lFd2NcRwr3XPksINHaQ-G_xBniIqbw0Ls1jF44-csFCur-kEgU8awapJzKnqDKgw";

fn jwks_body(kid: &str) -> serde_json::Value {
    json!({
        "keys": [
            {
                "kty": "RSA",
                "kid": kid,
                "use": "sig",
                "alg": "RS256",
                "n": RSA_N,
                "e": "AQAB"
            },
            // Non-RSA entries must be skipped, not rejected.
            { "kty": "EC", "kid": "ec-key", "crv": "P-256" }
        ]
    })
}

#[tokio::test]
async fn test_fetches_keys_from_configured_jwks_uri() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/certs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(jwks_body("primary")))
        .expect(1)
        .mount(&server)
        .await;

    let verifier = TokenVerifier::new(AuthConfig {
        jwk_set_uri: Some(format!("{}/certs", server.uri())),
        ..Default::default()
    })
    .unwrap();

    verifier.refresh_keys().await.unwrap();

    assert!(verifier.has_key("primary"));
    assert!(!verifier.has_key("ec-key"));
}

#[tokio::test]
async fn test_discovers_jwks_uri_from_issuer() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/.well-known/openid-configuration"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "issuer": server.uri(),
            "jwks_uri": format!("{}/protocol/openid-connect/certs", server.uri())
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/protocol/openid-connect/certs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(jwks_body("rotated")))
        .mount(&server)
        .await;

    let verifier = TokenVerifier::new(AuthConfig {
        issuer_uri: Some(server.uri()),
        ..Default::default()
    })
    .unwrap();

    verifier.refresh_keys().await.unwrap();
    assert!(verifier.has_key("rotated"));

    // The discovery document is resolved once; a second refresh hits only
    // the JWKS endpoint (the discovery mock expects exactly one call).
    verifier.refresh_keys().await.unwrap();
}

#[tokio::test]
async fn test_unreachable_jwks_is_a_key_resolution_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/certs"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let verifier = TokenVerifier::new(AuthConfig {
        jwk_set_uri: Some(format!("{}/certs", server.uri())),
        ..Default::default()
    })
    .unwrap();

    let err = verifier.refresh_keys().await.unwrap_err();
    assert!(err.to_string().contains("JWKS fetch failed"));
}
