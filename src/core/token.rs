//! Ticket Token Codec
//!
//! Signs and verifies ticket claim sets as HS256 JWTs.
//!
//! The `exp` claim is fixed at 24 hours after the event, not after issuance.
//! A ticket for a far-future event stays valid long after it was created; a
//! ticket for an event that ended more than a day ago is already inert.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ticket::model::TicketClaims;

/// Claim schema version carried in every token.
pub const CLAIMS_VERSION: u8 = 1;

/// How long after the event a token remains verifiable.
pub const VALIDITY_AFTER_EVENT_SECS: i64 = 86_400;

/// Token errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    /// Signature does not match.
    #[error("invalid signature")]
    InvalidSignature,
    /// Expiry instant has passed.
    #[error("token expired")]
    Expired,
    /// Token could not be decoded.
    #[error("malformed token: {0}")]
    Malformed(String),
    /// Claims use a schema this server does not understand.
    #[error("unsupported claims version {0}")]
    UnsupportedVersion(u8),
    /// Signing failed.
    #[error("signing failed: {0}")]
    Signing(String),
}

/// On-the-wire token payload.
#[derive(Debug, Serialize, Deserialize)]
struct SignedPayload {
    v: u8,
    #[serde(flatten)]
    claims: TicketClaims,
    iat: u64,
    exp: u64,
}

/// Signs and verifies ticket tokens under one secret.
pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl TokenCodec {
    /// Create a codec for the configured JWT secret.
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_aud = false;
        validation.set_required_spec_claims(&["exp"]);

        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Expiry instant for a given event time.
    pub fn expiry_for(event_time: DateTime<Utc>) -> DateTime<Utc> {
        event_time + Duration::seconds(VALIDITY_AFTER_EVENT_SECS)
    }

    /// Sign a claim set.
    pub fn sign(&self, claims: &TicketClaims) -> Result<String, TokenError> {
        let payload = SignedPayload {
            v: CLAIMS_VERSION,
            claims: claims.clone(),
            iat: unix_seconds(Utc::now()),
            exp: unix_seconds(Self::expiry_for(claims.event_time)),
        };

        encode(&Header::new(Algorithm::HS256), &payload, &self.encoding)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    /// Verify a token and return its claim set.
    pub fn verify(&self, token: &str) -> Result<TicketClaims, TokenError> {
        let data = decode::<SignedPayload>(token, &self.decoding, &self.validation)
            .map_err(map_jwt_error)?;

        let payload = data.claims;
        if payload.v != CLAIMS_VERSION {
            return Err(TokenError::UnsupportedVersion(payload.v));
        }

        Ok(payload.claims)
    }
}

/// Seconds since the Unix epoch, clamped at zero.
fn unix_seconds(at: DateTime<Utc>) -> u64 {
    u64::try_from(at.timestamp()).unwrap_or(0)
}

/// Map JWT library errors to our error type.
fn map_jwt_error(err: jsonwebtoken::errors::Error) -> TokenError {
    use jsonwebtoken::errors::ErrorKind;
    match err.kind() {
        ErrorKind::ExpiredSignature => TokenError::Expired,
        ErrorKind::InvalidSignature => TokenError::InvalidSignature,
        _ => TokenError::Malformed(err.to_string()),
    }
}

// =============================================================================
// TESTS
// =============================================================================
