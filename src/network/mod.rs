//! Network Layer
//!
//! WebSocket transport for the ticket service: message types, operator
//! authentication, request dispatch and the connection server.

pub mod auth;
pub mod handler;
pub mod protocol;
pub mod server;

pub use auth::{validate_operator_token, AuthError, OperatorAuthConfig, OperatorClaims, OPERATOR_ROLE};
pub use handler::RequestHandler;
pub use protocol::{ClientMessage, CreateBulkRequest, CreateTicketRequest, ErrorCode, ServerError, ServerMessage};
pub use server::{ServerConfig, TicketServer, TicketServerError};
