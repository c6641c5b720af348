//! Token verification.
//!
//! The verifier is the external collaborator that stands before the policy:
//! it checks signature, expiry, and (when configured) issuer, and hands the
//! verified claims to role normalization. The policy evaluator never
//! re-validates tokens.
//!
//! Key material comes from one of three sources, selected by configuration:
//! a remote JWKS document (`jwk_set_uri`), OIDC issuer discovery
//! (`issuer_uri`), or a static HS256 secret for development and tests. At
//! least one must be configured.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use dashmap::DashMap;
use jsonwebtoken::{
    decode, decode_header, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use metrics::counter;
use serde::Deserialize;
use thiserror::Error;
use tokio::sync::OnceCell;
use tracing::{debug, warn};

use super::claims::Claims;
use super::idp::IdpType;

// ═══════════════════════════════════════════════════════════════════════════════
// Errors
// ═══════════════════════════════════════════════════════════════════════════════

/// Authentication errors surfaced to the HTTP layer.
///
/// The taxonomy at this layer is two-valued (unauthenticated vs forbidden);
/// the extra variants only refine the 401 message and the internal cases.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Missing authentication credentials")]
    MissingCredentials,

    #[error("Invalid authentication token")]
    InvalidToken,

    #[error("Token has expired")]
    TokenExpired,

    #[error("Insufficient role for this resource")]
    InsufficientRole,

    #[error("Token validation error: {0}")]
    ValidationError(String),

    #[error("Key resolution error: {0}")]
    KeyResolution(String),

    #[error("Internal authentication error: {0}")]
    Internal(String),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            Self::MissingCredentials => (
                StatusCode::UNAUTHORIZED,
                "MISSING_CREDENTIALS",
                "Authentication credentials are required",
            ),
            Self::InvalidToken => (
                StatusCode::UNAUTHORIZED,
                "INVALID_TOKEN",
                "The provided token is invalid",
            ),
            Self::TokenExpired => (
                StatusCode::UNAUTHORIZED,
                "TOKEN_EXPIRED",
                "The authentication token has expired",
            ),
            Self::ValidationError(_) => (
                StatusCode::UNAUTHORIZED,
                "INVALID_TOKEN",
                "The provided token is invalid",
            ),
            Self::InsufficientRole => (
                StatusCode::FORBIDDEN,
                "INSUFFICIENT_ROLE",
                "You do not have permission to perform this action",
            ),
            Self::KeyResolution(_) | Self::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An authentication error occurred",
            ),
        };

        counter!(
            "auth_errors_total",
            "error_type" => code.to_string()
        )
        .increment(1);

        let body = serde_json::json!({
            "success": false,
            "error": {
                "code": code,
                "message": message,
            }
        });

        (status, Json(body)).into_response()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Configuration
// ═══════════════════════════════════════════════════════════════════════════════

/// Authentication configuration.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Which identity provider's role shape to normalize.
    pub idp_type: IdpType,

    /// Token issuer; enables discovery and pins the `iss` claim.
    pub issuer_uri: Option<String>,

    /// Direct JWKS document location; takes precedence over discovery.
    pub jwk_set_uri: Option<String>,

    /// Static symmetric key for development and tests.
    pub hs256_secret: Option<String>,

    /// Leeway for expiry checks, in seconds.
    pub leeway_secs: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            idp_type: IdpType::default(),
            issuer_uri: None,
            jwk_set_uri: None,
            hs256_secret: None,
            leeway_secs: 60,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// JWKS document
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Deserialize)]
struct JwkSet {
    keys: Vec<Jwk>,
}

#[derive(Debug, Deserialize)]
struct Jwk {
    kty: String,
    #[serde(default)]
    kid: Option<String>,
    #[serde(default)]
    n: Option<String>,
    #[serde(default)]
    e: Option<String>,
}

/// The slice of the OIDC discovery document we need.
#[derive(Debug, Deserialize)]
struct DiscoveryDocument {
    jwks_uri: String,
}

// ═══════════════════════════════════════════════════════════════════════════════
// Verifier
// ═══════════════════════════════════════════════════════════════════════════════

/// Verifies bearer tokens and produces their claims.
pub struct TokenVerifier {
    config: AuthConfig,
    static_key: Option<(EncodingKey, DecodingKey)>,
    http: reqwest::Client,
    jwks_uri: OnceCell<String>,
    /// Remote decoding keys by `kid`, refreshed on unknown ids.
    keys: DashMap<String, DecodingKey>,
}

impl std::fmt::Debug for TokenVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenVerifier")
            .field("config", &self.config)
            .field("static_key", &self.static_key.is_some())
            .field("http", &self.http)
            .field("jwks_uri", &self.jwks_uri)
            .field("keys", &self.keys.len())
            .finish()
    }
}

impl TokenVerifier {
    /// Create a verifier from configuration.
    ///
    /// Fails when no key source is configured; a resource server with
    /// neither an issuer nor a JWK set location cannot verify anything.
    pub fn new(config: AuthConfig) -> Result<Self, AuthError> {
        if config.jwk_set_uri.is_none()
            && config.issuer_uri.is_none()
            && config.hs256_secret.is_none()
        {
            return Err(AuthError::Internal(
                "either auth.issuer_uri, auth.jwk_set_uri, or auth.hs256_secret must be configured"
                    .into(),
            ));
        }

        let static_key = config.hs256_secret.as_ref().map(|secret| {
            (
                EncodingKey::from_secret(secret.as_bytes()),
                DecodingKey::from_secret(secret.as_bytes()),
            )
        });

        Ok(Self {
            config,
            static_key,
            http: reqwest::Client::new(),
            jwks_uri: OnceCell::new(),
            keys: DashMap::new(),
        })
    }

    /// The identity provider whose role shape applies to verified claims.
    pub fn idp_type(&self) -> IdpType {
        self.config.idp_type
    }

    /// Verify a bearer token and return its claims.
    pub async fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let header = decode_header(token).map_err(|e| {
            debug!("Unparsable token header: {}", e);
            AuthError::InvalidToken
        })?;

        let (key, algorithm) = match &self.static_key {
            Some((_, decoding)) => (decoding.clone(), Algorithm::HS256),
            None => {
                let algorithm = match header.alg {
                    Algorithm::RS256 | Algorithm::RS384 | Algorithm::RS512 => header.alg,
                    other => {
                        debug!(?other, "Rejecting token with unsupported algorithm");
                        return Err(AuthError::InvalidToken);
                    }
                };
                let kid = header.kid.ok_or(AuthError::InvalidToken)?;
                (self.remote_key(&kid).await?, algorithm)
            }
        };

        let mut validation = Validation::new(algorithm);
        validation.leeway = self.config.leeway_secs;
        validation.validate_aud = false;
        if let Some(issuer) = &self.config.issuer_uri {
            validation.set_issuer(&[issuer]);
        }

        let data = decode::<Claims>(token, &key, &validation).map_err(|e| {
            debug!("Token validation failed: {}", e);
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                jsonwebtoken::errors::ErrorKind::InvalidToken
                | jsonwebtoken::errors::ErrorKind::InvalidSignature => AuthError::InvalidToken,
                _ => AuthError::ValidationError(e.to_string()),
            }
        })?;

        Ok(data.claims)
    }

    /// Sign claims with the static HS256 secret. Development and test only.
    pub fn generate_token(&self, claims: &Claims) -> Result<String, AuthError> {
        let (encoding, _) = self
            .static_key
            .as_ref()
            .ok_or_else(|| AuthError::Internal("no HS256 secret configured".into()))?;

        encode(&Header::new(Algorithm::HS256), claims, encoding)
            .map_err(|e| AuthError::Internal(format!("failed to sign token: {}", e)))
    }

    /// Whether a decoding key for `kid` is cached.
    pub fn has_key(&self, kid: &str) -> bool {
        self.keys.contains_key(kid)
    }

    /// Fetch the JWKS document and (re)fill the key cache.
    pub async fn refresh_keys(&self) -> Result<(), AuthError> {
        let uri = self.resolve_jwks_uri().await?;

        let jwks: JwkSet = self
            .http
            .get(&uri)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| AuthError::KeyResolution(format!("JWKS fetch failed: {}", e)))?
            .json()
            .await
            .map_err(|e| AuthError::KeyResolution(format!("malformed JWKS document: {}", e)))?;

        let mut loaded = 0usize;
        for jwk in &jwks.keys {
            let (Some(kid), Some(n), Some(e)) = (&jwk.kid, &jwk.n, &jwk.e) else {
                continue;
            };
            if jwk.kty != "RSA" {
                continue;
            }
            match DecodingKey::from_rsa_components(n, e) {
                Ok(key) => {
                    self.keys.insert(kid.clone(), key);
                    loaded += 1;
                }
                Err(err) => {
                    warn!(kid = kid.as_str(), "Skipping unusable JWK: {}", err);
                }
            }
        }

        debug!(loaded, uri = uri.as_str(), "Refreshed JWKS key cache");
        Ok(())
    }

    async fn remote_key(&self, kid: &str) -> Result<DecodingKey, AuthError> {
        if let Some(key) = self.keys.get(kid) {
            return Ok(key.clone());
        }

        // Unknown kid: the provider may have rotated its keys.
        self.refresh_keys().await?;

        self.keys
            .get(kid)
            .map(|k| k.clone())
            .ok_or_else(|| AuthError::KeyResolution(format!("unknown key id '{}'", kid)))
    }

    /// Resolve the JWKS location once: directly from configuration, or via
    /// the issuer's OIDC discovery document.
    async fn resolve_jwks_uri(&self) -> Result<String, AuthError> {
        let uri = self
            .jwks_uri
            .get_or_try_init(|| async {
                if let Some(uri) = &self.config.jwk_set_uri {
                    return Ok(uri.clone());
                }

                let issuer = self.config.issuer_uri.as_ref().ok_or_else(|| {
                    AuthError::Internal("no JWKS location and no issuer to discover one".into())
                })?;

                let discovery_url = format!(
                    "{}/.well-known/openid-configuration",
                    issuer.trim_end_matches('/')
                );

                let doc: DiscoveryDocument = self
                    .http
                    .get(&discovery_url)
                    .send()
                    .await
                    .and_then(|r| r.error_for_status())
                    .map_err(|e| {
                        AuthError::KeyResolution(format!("issuer discovery failed: {}", e))
                    })?
                    .json()
                    .await
                    .map_err(|e| {
                        AuthError::KeyResolution(format!("malformed discovery document: {}", e))
                    })?;

                Ok::<String, AuthError>(doc.jwks_uri)
            })
            .await?;

        Ok(uri.clone())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn hs256_verifier() -> TokenVerifier {
        TokenVerifier::new(AuthConfig {
            hs256_secret: Some("unit-test-secret-key".into()),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_rejects_configuration_without_key_source() {
        let err = TokenVerifier::new(AuthConfig::default()).unwrap_err();
        assert!(matches!(err, AuthError::Internal(_)));
    }

    #[tokio::test]
    async fn test_hs256_round_trip() {
        let verifier = hs256_verifier();
        let claims = Claims::builder("alice")
            .realm_roles(vec!["artifact-admin".into()])
            .build();

        let token = verifier.generate_token(&claims).unwrap();
        let verified = verifier.verify(&token).await.unwrap();

        assert_eq!(verified.sub, "alice");
        assert_eq!(verified.realm_access.unwrap().roles, vec!["artifact-admin"]);
    }

    #[tokio::test]
    async fn test_rejects_expired_token() {
        let verifier = TokenVerifier::new(AuthConfig {
            hs256_secret: Some("unit-test-secret-key".into()),
            leeway_secs: 0,
            ..Default::default()
        })
        .unwrap();

        let claims = Claims::builder("alice")
            .expires_in(Duration::hours(-2))
            .build();
        let token = verifier.generate_token(&claims).unwrap();

        let err = verifier.verify(&token).await.unwrap_err();
        assert!(matches!(err, AuthError::TokenExpired));
    }

    #[tokio::test]
    async fn test_rejects_garbage_token() {
        let err = hs256_verifier().verify("not-a-jwt").await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidToken));
    }

    #[tokio::test]
    async fn test_rejects_token_signed_with_other_secret() {
        let signer = TokenVerifier::new(AuthConfig {
            hs256_secret: Some("other-secret".into()),
            ..Default::default()
        })
        .unwrap();
        let token = signer
            .generate_token(&Claims::builder("mallory").build())
            .unwrap();

        let err = hs256_verifier().verify(&token).await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidToken));
    }

    #[tokio::test]
    async fn test_rejects_wrong_issuer() {
        let verifier = TokenVerifier::new(AuthConfig {
            hs256_secret: Some("unit-test-secret-key".into()),
            issuer_uri: Some("https://idp.example.com/realms/artifacts".into()),
            ..Default::default()
        })
        .unwrap();

        let claims = Claims::builder("alice")
            .issuer("https://evil.example.com")
            .build();
        let token = verifier.generate_token(&claims).unwrap();

        let err = verifier.verify(&token).await.unwrap_err();
        assert!(matches!(err, AuthError::ValidationError(_)));
    }
}
