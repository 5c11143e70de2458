//! Redemption Protocol
//!
//! Resolves a scanned lookup identifier and drives `Unused -> Used`.
//!
//! ```text
//! lookup_id ─▶ store.get ─▶ open ─▶ verify ─▶ ledger.get ─▶ used? ─▶ mark used ─▶ refresh entry
//!     miss ─────┴── fail ──┴─ fail ─┘  (InvalidOrExpired)   │          │
//!                                          missing (NotFound)  used (AlreadyUsed)
//! ```
//!
//! The ledger's conditional update is the authoritative double-redemption
//! guard. Refreshing the store entry afterwards keeps the cached token in
//! step with the ledger but is not needed for correctness.

use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::core::lookup::LookupId;

use super::issuance::{TicketIssuer, TicketSealer};
use super::ledger::{LedgerError, TicketLedger, UseOutcome};
use super::model::Ticket;
use super::store::{IndirectionStore, StoreError};

/// Client-facing message for any lookup, envelope or token failure.
pub const MSG_INVALID_OR_EXPIRED: &str = "Invalid or expired token";
/// Client-facing message for a ticket missing from the ledger.
pub const MSG_NOT_FOUND: &str = "Ticket not found";
/// Client-facing message for a second redemption.
pub const MSG_ALREADY_USED: &str = "Ticket has already been used";
/// Client-facing message for a successful redemption.
pub const MSG_VERIFIED: &str = "Ticket verified successfully";
/// Client-facing message for server faults.
pub const MSG_INTERNAL: &str = "Internal server error";

/// Redemption rejections.
#[derive(Debug, Error)]
pub enum RedeemError {
    /// Unknown identifier, bad envelope, bad signature or expired token.
    /// The detail is for logs only.
    #[error("invalid or expired token: {0}")]
    InvalidOrExpired(String),
    /// Claims point at a ticket the ledger does not have.
    #[error("ticket not found")]
    NotFound,
    /// Ticket was redeemed before.
    #[error("ticket already used")]
    AlreadyUsed,
    /// Ledger fault.
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    /// Store fault.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl RedeemError {
    /// Message safe to show the scanning client.
    pub fn client_message(&self) -> &'static str {
        match self {
            RedeemError::InvalidOrExpired(_) => MSG_INVALID_OR_EXPIRED,
            RedeemError::NotFound => MSG_NOT_FOUND,
            RedeemError::AlreadyUsed => MSG_ALREADY_USED,
            RedeemError::Ledger(_) | RedeemError::Store(_) => MSG_INTERNAL,
        }
    }

    /// True for infrastructure faults.
    pub fn is_internal(&self) -> bool {
        matches!(self, RedeemError::Ledger(_) | RedeemError::Store(_))
    }
}

/// Redeems scanned identifiers.
pub struct TicketRedeemer {
    sealer: Arc<TicketSealer>,
    store: Arc<dyn IndirectionStore>,
    ledger: Arc<dyn TicketLedger>,
    issuer: Arc<TicketIssuer>,
}

impl TicketRedeemer {
    /// Create a redeemer over the given collaborators.
    pub fn new(
        sealer: Arc<TicketSealer>,
        store: Arc<dyn IndirectionStore>,
        ledger: Arc<dyn TicketLedger>,
        issuer: Arc<TicketIssuer>,
    ) -> Self {
        Self {
            sealer,
            store,
            ledger,
            issuer,
        }
    }

    /// Redeem an identifier. Returns the ticket with `is_used == true`.
    pub async fn redeem(&self, lookup_id: &LookupId) -> Result<Ticket, RedeemError> {
        let envelope = self
            .store
            .get(lookup_id.as_str())
            .await?
            .ok_or_else(|| RedeemError::InvalidOrExpired("unknown identifier".into()))?;

        let claims = self
            .sealer
            .unseal(&envelope)
            .map_err(|e| RedeemError::InvalidOrExpired(e.to_string()))?;

        let ticket = self
            .ledger
            .get_by_id(claims.id)
            .await?
            .ok_or(RedeemError::NotFound)?;

        if ticket.is_used {
            debug!(ticket_id = ticket.id, lookup = %lookup_id, "Ticket already used");
            return Err(RedeemError::AlreadyUsed);
        }

        let ticket = match self.ledger.mark_used_if_unused(ticket.id).await? {
            UseOutcome::Marked(ticket) => ticket,
            UseOutcome::AlreadyUsed(_) => {
                debug!(ticket_id = ticket.id, lookup = %lookup_id, "Lost redemption race");
                return Err(RedeemError::AlreadyUsed);
            }
            UseOutcome::Missing => return Err(RedeemError::NotFound),
        };

        info!(ticket_id = ticket.id, lookup = %lookup_id, "Ticket redeemed");

        // The ledger already committed; a failed refresh only leaves a stale
        // cached token behind, which the used flag still rejects.
        if let Err(e) = self.issuer.refresh(lookup_id, &ticket).await {
            warn!(ticket_id = ticket.id, lookup = %lookup_id, error = %e, "Failed to refresh redeemed token");
        }

        Ok(ticket)
    }
}
