//! Protocol Messages
//!
//! Wire format for client-server communication over WebSocket.
//! Every frame is one JSON object tagged by `type`.
//!
//! ```text
//! client                                server
//!   │ {"type":"create_ticket",...}  ──▶   │
//!   │ ◀──  {"type":"ticket_issued",...}   │
//!   │ {"type":"redeem","token":"…"} ──▶   │
//!   │ ◀──  {"type":"redemption",...}      │
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::ticket::model::{Ticket, TicketId};
use crate::ticket::service::{BulkIssued, ExportedImage, IssuedTicket, RedeemResponse, Rejection};

// =============================================================================
// CLIENT -> SERVER MESSAGES
// =============================================================================

/// Messages sent from client to server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Create one ticket.
    CreateTicket(CreateTicketRequest),

    /// Create many identical tickets.
    CreateBulk(CreateBulkRequest),

    /// List all tickets.
    ListTickets,

    /// Issue a fresh QR code for an existing ticket.
    RegenerateQr { id: TicketId },

    /// Redeem a scanned lookup identifier.
    Redeem {
        #[serde(default)]
        token: Option<String>,
    },

    /// Operator: clear a ticket's used flag.
    ResetTicket { auth: String, id: TicketId },

    /// Operator: write QR images for every unused ticket.
    ExportQrImages { auth: String },

    /// Ping for latency measurement.
    Ping { timestamp: u64 },
}

/// Single ticket creation request.
///
/// Fields are optional on the wire so a missing field becomes a
/// validation error rather than a parse error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTicketRequest {
    /// `standard`, `premium` or `test`.
    #[serde(default)]
    pub ticket_type: Option<String>,
    /// Venue name.
    #[serde(default)]
    pub venue_name: Option<String>,
    /// RFC 3339 event start.
    #[serde(default)]
    pub event_time: Option<String>,
}

/// Bulk creation request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBulkRequest {
    /// `standard`, `premium` or `test`.
    #[serde(default)]
    pub ticket_type: Option<String>,
    /// Venue name.
    #[serde(default)]
    pub venue_name: Option<String>,
    /// RFC 3339 event start.
    #[serde(default)]
    pub event_time: Option<String>,
    /// Number of tickets; kept raw so non-integers are rejected with a message.
    #[serde(default)]
    pub count: Option<serde_json::Value>,
}

// =============================================================================
// SERVER -> CLIENT MESSAGES
// =============================================================================

/// Messages sent from server to client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Server greeting, sent once per connection.
    Welcome { server_version: String },

    /// A ticket and its QR code.
    TicketIssued(IssuedTicket),

    /// Bulk issuance result.
    BulkIssued(BulkIssued),

    /// Ticket listing.
    Tickets { tickets: Vec<Ticket> },

    /// Redemption outcome.
    Redemption(RedeemResponse),

    /// Ticket after an operator reset.
    TicketReset { ticket: Ticket },

    /// Images written by an operator export.
    QrImagesExported {
        count: usize,
        dir: PathBuf,
        images: Vec<ExportedImage>,
    },

    /// Pong response.
    Pong { timestamp: u64, server_time: u64 },

    /// Error message.
    Error(ServerError),

    /// Server is shutting down.
    Shutdown { reason: String },
}

/// Server error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerError {
    /// Error code.
    pub code: ErrorCode,
    /// Human-readable message.
    pub message: String,
}

impl ServerError {
    /// Build an error frame.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// Error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// Missing or malformed request fields.
    InvalidInput,
    /// Unknown identifier, or its token undecryptable, forged or expired.
    InvalidToken,
    /// Ticket already redeemed.
    AlreadyUsed,
    /// No such ticket.
    NotFound,
    /// Operator credentials missing or rejected.
    Unauthorized,
    /// Too many open connections.
    ServerOverloaded,
    /// Internal error.
    InternalError,
}

impl ErrorCode {
    /// Equivalent HTTP status, for gateways that front the socket.
    pub fn http_status(&self) -> u16 {
        match self {
            ErrorCode::InvalidInput | ErrorCode::InvalidToken | ErrorCode::AlreadyUsed => 400,
            ErrorCode::Unauthorized => 401,
            ErrorCode::NotFound => 404,
            ErrorCode::ServerOverloaded => 503,
            ErrorCode::InternalError => 500,
        }
    }
}

impl From<Rejection> for ErrorCode {
    fn from(rejection: Rejection) -> Self {
        match rejection {
            Rejection::InvalidInput => ErrorCode::InvalidInput,
            Rejection::InvalidToken => ErrorCode::InvalidToken,
            Rejection::AlreadyUsed => ErrorCode::AlreadyUsed,
            Rejection::NotFound => ErrorCode::NotFound,
            Rejection::InternalError => ErrorCode::InternalError,
        }
    }
}

// =============================================================================
// SERIALIZATION HELPERS
// =============================================================================

impl ClientMessage {
    /// Serialize to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize from JSON string.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }

    /// Short name for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            ClientMessage::CreateTicket(_) => "create_ticket",
            ClientMessage::CreateBulk(_) => "create_bulk",
            ClientMessage::ListTickets => "list_tickets",
            ClientMessage::RegenerateQr { .. } => "regenerate_qr",
            ClientMessage::Redeem { .. } => "redeem",
            ClientMessage::ResetTicket { .. } => "reset_ticket",
            ClientMessage::ExportQrImages { .. } => "export_qr_images",
            ClientMessage::Ping { .. } => "ping",
        }
    }
}

impl ServerMessage {
    /// Serialize to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize from JSON string.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }

    /// Shorthand for an error frame.
    pub fn error(code: ErrorCode, message: impl Into<String>) -> Self {
        ServerMessage::Error(ServerError::new(code, message))
    }
}
