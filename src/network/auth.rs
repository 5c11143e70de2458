//! Operator Authentication
//!
//! Validates HS256 JWTs presented with operator-only requests (ticket reset,
//! QR image export). The server does NOT issue these tokens; they are minted
//! out of band with the shared operator secret.

use jsonwebtoken::{decode, Algorithm, DecodingKey, TokenData, Validation};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Role claim an operator token must carry.
pub const OPERATOR_ROLE: &str = "ticket-admin";

/// Operator authentication configuration.
#[derive(Clone, Default)]
pub struct OperatorAuthConfig {
    /// HS256 secret. If None, operator requests are refused.
    pub secret: Option<String>,
    /// Expected issuer claim ("iss"). If None, any issuer accepted.
    pub issuer: Option<String>,
}

impl OperatorAuthConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            secret: std::env::var("OPERATOR_SECRET").ok().filter(|s| !s.is_empty()),
            issuer: std::env::var("OPERATOR_ISSUER").ok(),
        }
    }

    /// Check if operator authentication is configured.
    pub fn is_configured(&self) -> bool {
        self.secret.is_some()
    }
}

impl std::fmt::Debug for OperatorAuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OperatorAuthConfig")
            .field("secret", &self.secret.as_ref().map(|_| "<redacted>"))
            .field("issuer", &self.issuer)
            .finish()
    }
}

/// Claims carried by an operator token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperatorClaims {
    /// Subject - the operator's identity.
    pub sub: String,
    /// Expiry timestamp (Unix seconds).
    pub exp: u64,
    /// Issued at timestamp.
    #[serde(default)]
    pub iat: u64,
    /// Issuer.
    #[serde(default)]
    pub iss: Option<String>,
    /// Granted role.
    #[serde(default)]
    pub role: String,
}

impl OperatorClaims {
    /// Short stable identifier for the operator, safe to log.
    pub fn operator_id(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(b"ticket-qr-operator:");
        hasher.update(self.sub.as_bytes());
        hex::encode(&hasher.finalize()[..6])
    }
}

/// Authentication errors.
#[derive(Debug, Error)]
pub enum AuthError {
    /// No operator secret configured on server.
    #[error("operator authentication not configured")]
    NotConfigured,
    /// Token format is invalid.
    #[error("invalid token format")]
    InvalidFormat,
    /// Token signature verification failed.
    #[error("invalid signature")]
    InvalidSignature,
    /// Token has expired.
    #[error("token expired")]
    Expired,
    /// Issuer claim doesn't match expected value.
    #[error("invalid issuer")]
    InvalidIssuer,
    /// Required claim is missing.
    #[error("missing required claim: {0}")]
    MissingClaim(String),
    /// Token is valid but lacks the operator role.
    #[error("operator role required")]
    Forbidden,
    /// JWT decoding error.
    #[error("decode error: {0}")]
    DecodeError(String),
}

/// Validate an operator token and extract its claims.
pub fn validate_operator_token(token: &str, config: &OperatorAuthConfig) -> Result<OperatorClaims, AuthError> {
    let secret = config.secret.as_ref().ok_or(AuthError::NotConfigured)?;

    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_required_spec_claims(&["exp", "sub"]);
    validation.validate_aud = false;
    validation.leeway = 0;

    if let Some(ref issuer) = config.issuer {
        validation.set_issuer(&[issuer]);
    }

    let key = DecodingKey::from_secret(secret.as_bytes());
    let token_data: TokenData<OperatorClaims> = decode(token, &key, &validation).map_err(map_jwt_error)?;
    let claims = token_data.claims;

    if claims.sub.is_empty() {
        return Err(AuthError::MissingClaim("sub".into()));
    }
    if claims.role != OPERATOR_ROLE {
        return Err(AuthError::Forbidden);
    }

    Ok(claims)
}

/// Map JWT library errors to our error type.
fn map_jwt_error(err: jsonwebtoken::errors::Error) -> AuthError {
    use jsonwebtoken::errors::ErrorKind;
    match err.kind() {
        ErrorKind::ExpiredSignature => AuthError::Expired,
        ErrorKind::InvalidSignature => AuthError::InvalidSignature,
        ErrorKind::InvalidIssuer => AuthError::InvalidIssuer,
        ErrorKind::MissingRequiredClaim(claim) => AuthError::MissingClaim(claim.clone()),
        ErrorKind::InvalidToken | ErrorKind::Base64(_) => AuthError::InvalidFormat,
        _ => AuthError::DecodeError(err.to_string()),
    }
}

// =============================================================================
// TESTS
// =============================================================================
