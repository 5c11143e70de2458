//! Issuance Protocol
//!
//! ```text
//! Ticket ──claims──▶ sign ──token──▶ seal ──envelope──▶ store[lookup_id]
//!                                                          │
//!                                   QR image ◀── lookup_id ┘
//! ```
//!
//! Every issuance mints a new lookup identifier. Earlier identifiers for the
//! same ticket stay in the store; the ledger's used flag is what rejects them
//! after redemption.

use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

use crate::core::envelope::{CipherEnvelope, EnvelopeError};
use crate::core::lookup::LookupId;
use crate::core::token::{TokenCodec, TokenError};

use super::model::{Ticket, TicketClaims};
use super::store::{IndirectionStore, StoreError};

/// Issuance errors. All are server faults.
#[derive(Debug, Error)]
pub enum IssueError {
    /// Token signing failed.
    #[error("token error: {0}")]
    Token(#[from] TokenError),
    /// Envelope sealing failed.
    #[error("envelope error: {0}")]
    Envelope(#[from] EnvelopeError),
    /// Store write failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Why a sealed token could not be opened.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UnsealError {
    /// Envelope malformed or tag mismatch.
    #[error(transparent)]
    Envelope(#[from] EnvelopeError),
    /// Signature, expiry or schema check failed.
    #[error(transparent)]
    Token(#[from] TokenError),
}

/// Token codec and envelope cipher used together.
pub struct TicketSealer {
    codec: TokenCodec,
    envelope: CipherEnvelope,
}

impl TicketSealer {
    /// Combine a codec and an envelope cipher.
    pub fn new(codec: TokenCodec, envelope: CipherEnvelope) -> Self {
        Self { codec, envelope }
    }

    /// Derive claims from the ticket's current state, sign, then seal.
    pub fn seal(&self, ticket: &Ticket) -> Result<String, IssueError> {
        let token = self.codec.sign(&ticket.claims())?;
        Ok(self.envelope.seal(&token)?)
    }

    /// Open an envelope and verify the token inside.
    pub fn unseal(&self, envelope: &str) -> Result<TicketClaims, UnsealError> {
        let token = self.envelope.open(envelope)?;
        Ok(self.codec.verify(&token)?)
    }
}

/// Issues lookup identifiers for tickets.
pub struct TicketIssuer {
    sealer: Arc<TicketSealer>,
    store: Arc<dyn IndirectionStore>,
}

impl TicketIssuer {
    /// Create an issuer writing to the given store.
    pub fn new(sealer: Arc<TicketSealer>, store: Arc<dyn IndirectionStore>) -> Self {
        Self { sealer, store }
    }

    /// Issue a fresh identifier for one ticket.
    pub async fn issue(&self, ticket: &Ticket) -> Result<LookupId, IssueError> {
        let envelope = self.sealer.seal(ticket)?;
        let lookup_id = LookupId::generate();

        self.store.set(lookup_id.as_str(), &envelope).await?;
        debug!(ticket_id = ticket.id, lookup = %lookup_id, "Issued ticket token");

        Ok(lookup_id)
    }

    /// Issue identifiers for many tickets with one batched store write.
    ///
    /// Returned identifiers are in the same order as `tickets`.
    pub async fn issue_many(&self, tickets: &[Ticket]) -> Result<Vec<LookupId>, IssueError> {
        let sealed = tickets
            .iter()
            .map(|ticket| -> Result<(LookupId, String), IssueError> {
                Ok((LookupId::generate(), self.sealer.seal(ticket)?))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let entries: Vec<(String, String)> = sealed
            .iter()
            .map(|(id, envelope)| (id.as_str().to_string(), envelope.clone()))
            .collect();
        self.store.set_many(&entries).await?;

        debug!(count = tickets.len(), "Issued ticket tokens in one batch");
        Ok(sealed.into_iter().map(|(id, _)| id).collect())
    }

    /// Re-seal a ticket's current state under an existing identifier.
    pub async fn refresh(&self, lookup_id: &LookupId, ticket: &Ticket) -> Result<(), IssueError> {
        let envelope = self.sealer.seal(ticket)?;
        self.store.set(lookup_id.as_str(), &envelope).await?;
        Ok(())
    }
}
