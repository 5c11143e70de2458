//! # Ticket QR Server
//!
//! Issues event tickets as QR codes and redeems them exactly once.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      TICKET QR SERVER                        │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/           - Cryptographic primitives                  │
//! │  ├── token.rs    - HS256 claim tokens with event expiry      │
//! │  ├── envelope.rs - AES-256-GCM envelope (iv:tag:ct hex)      │
//! │  └── lookup.rs   - Opaque lookup identifiers                 │
//! │                                                              │
//! │  ticket/         - Ticket domain                             │
//! │  ├── model.rs    - Records, claims, request validation       │
//! │  ├── ledger.rs   - Authoritative ticket records              │
//! │  ├── store.rs    - Lookup id -> envelope map                 │
//! │  ├── issuance.rs - sign, seal, store                         │
//! │  ├── redemption.rs - resolve, verify, mark used              │
//! │  └── service.rs  - Outward operations                        │
//! │                                                              │
//! │  qr.rs           - PNG QR rendering                          │
//! │  config.rs       - Environment configuration                 │
//! │                                                              │
//! │  network/        - WebSocket transport                       │
//! │  ├── protocol.rs - Message types                             │
//! │  ├── auth.rs     - Operator tokens                           │
//! │  ├── handler.rs  - Request dispatch                          │
//! │  └── server.rs   - Connection server                         │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Redemption Guarantee
//!
//! A QR code carries only a random lookup identifier. The signed, encrypted
//! token behind it never leaves the server, and the ledger's used flag is the
//! single source of truth: a ticket is accepted at most once no matter how
//! many identifiers were issued for it or how many scanners race.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod config;
pub mod core;
pub mod network;
pub mod qr;
pub mod ticket;

// Re-export commonly used types
pub use config::{AppConfig, ConfigError};
pub use core::{CipherEnvelope, LookupId, TokenCodec};
pub use network::{RequestHandler, ServerConfig, TicketServer};
pub use qr::{QrConfig, QrRenderer, VisualEncoder};
pub use ticket::{MemoryLedger, MemoryStore, Ticket, TicketService, TicketType};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
