//! Request Dispatch
//!
//! Maps one decoded [`ClientMessage`] to one [`ServerMessage`]. Transport
//! concerns (sockets, timeouts, connection limits) live in `server.rs`.

use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::network::auth::{validate_operator_token, AuthError, OperatorAuthConfig, OperatorClaims};
use crate::network::protocol::{ClientMessage, CreateBulkRequest, CreateTicketRequest, ErrorCode, ServerMessage};
use crate::ticket::service::{ServiceError, TicketService};

/// Dispatches client requests to the ticket service.
pub struct RequestHandler {
    service: Arc<TicketService>,
    operator: OperatorAuthConfig,
}

impl RequestHandler {
    /// Create a handler.
    pub fn new(service: Arc<TicketService>, operator: OperatorAuthConfig) -> Self {
        if !operator.is_configured() {
            warn!("OPERATOR_SECRET not set; reset and export requests will be refused");
        }
        Self { service, operator }
    }

    /// Handle one request.
    pub async fn handle(&self, msg: ClientMessage) -> ServerMessage {
        match msg {
            ClientMessage::CreateTicket(req) => self.create_ticket(req).await,
            ClientMessage::CreateBulk(req) => self.create_bulk(req).await,
            ClientMessage::ListTickets => match self.service.list_tickets().await {
                Ok(tickets) => ServerMessage::Tickets { tickets },
                Err(e) => service_error(e),
            },
            ClientMessage::RegenerateQr { id } => match self.service.regenerate_qr(id).await {
                Ok(issued) => ServerMessage::TicketIssued(issued),
                Err(e) => service_error(e),
            },
            ClientMessage::Redeem { token } => {
                ServerMessage::Redemption(self.service.redeem(token.as_deref()).await)
            }
            ClientMessage::ResetTicket { auth, id } => {
                let operator = match self.authorize(&auth) {
                    Ok(claims) => claims,
                    Err(reply) => return reply,
                };
                info!(operator = %operator.operator_id(), ticket_id = id, "Operator reset requested");
                match self.service.reset_ticket(id).await {
                    Ok(ticket) => ServerMessage::TicketReset { ticket },
                    Err(e) => service_error(e),
                }
            }
            ClientMessage::ExportQrImages { auth } => {
                let operator = match self.authorize(&auth) {
                    Ok(claims) => claims,
                    Err(reply) => return reply,
                };
                info!(operator = %operator.operator_id(), "Operator export requested");
                match self.service.export_qr_images().await {
                    Ok(images) => ServerMessage::QrImagesExported {
                        count: images.len(),
                        dir: self.service.image_dir().to_path_buf(),
                        images,
                    },
                    Err(e) => service_error(e),
                }
            }
            ClientMessage::Ping { timestamp } => ServerMessage::Pong {
                timestamp,
                server_time: chrono::Utc::now().timestamp_millis().max(0) as u64,
            },
        }
    }

    async fn create_ticket(&self, req: CreateTicketRequest) -> ServerMessage {
        let result = self
            .service
            .create_ticket(
                req.ticket_type.as_deref(),
                req.venue_name.as_deref(),
                req.event_time.as_deref(),
            )
            .await;

        match result {
            Ok(issued) => ServerMessage::TicketIssued(issued),
            Err(e) => service_error(e),
        }
    }

    async fn create_bulk(&self, req: CreateBulkRequest) -> ServerMessage {
        let result = self
            .service
            .create_bulk(
                req.ticket_type.as_deref(),
                req.venue_name.as_deref(),
                req.event_time.as_deref(),
                req.count.as_ref(),
            )
            .await;

        match result {
            Ok(bulk) => ServerMessage::BulkIssued(bulk),
            Err(e) => service_error(e),
        }
    }

    /// Check an operator token, or build the rejection to send back.
    fn authorize(&self, token: &str) -> Result<OperatorClaims, ServerMessage> {
        validate_operator_token(token, &self.operator).map_err(|e| {
            match e {
                AuthError::NotConfigured => warn!("Operator request refused: not configured"),
                ref other => debug!(error = %other, "Operator token rejected"),
            }
            ServerMessage::error(ErrorCode::Unauthorized, "Unauthorized")
        })
    }
}

/// Convert a service failure into an error frame.
fn service_error(err: ServiceError) -> ServerMessage {
    let code = match &err {
        ServiceError::Validation(_) => ErrorCode::InvalidInput,
        ServiceError::NotFound => ErrorCode::NotFound,
        _ => ErrorCode::InternalError,
    };

    if err.is_internal() {
        error!(error = %err, "Request failed");
    }
    ServerMessage::error(code, err.client_message())
}
