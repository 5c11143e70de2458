//! Ticket domain: records, persistence contracts, issuance and redemption.

pub mod issuance;
pub mod ledger;
pub mod model;
pub mod redemption;
pub mod service;
pub mod store;

pub use issuance::{IssueError, TicketIssuer, TicketSealer, UnsealError};
pub use ledger::{LedgerError, MemoryLedger, TicketLedger, UseOutcome};
pub use model::{NewTicket, Ticket, TicketClaims, TicketId, TicketType, ValidationError, MAX_BULK_COUNT};
pub use redemption::{RedeemError, TicketRedeemer};
pub use service::{
    BulkIssued, BulkIssuedTicket, ExportedImage, IssuedTicket, RedeemResponse, Rejection, SecretsConfig,
    ServiceError, TicketService,
};
pub use store::{IndirectionStore, MemoryStore, StoreError};
