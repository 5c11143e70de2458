//! Ticket Service
//!
//! The outward operations: create, bulk create, list, regenerate QR, redeem,
//! plus the operator-only reset and image export. Validation happens here,
//! before any side effect; every failure leaves as a [`ServiceError`] or a
//! [`RedeemResponse`] with a client-safe message.

use futures_util::future::try_join_all;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, instrument};

use crate::core::envelope::{CipherEnvelope, EnvelopeError};
use crate::core::lookup::LookupId;
use crate::core::token::TokenCodec;
use crate::qr::{QrConfig, QrError, VisualEncoder};

use super::issuance::{IssueError, TicketIssuer, TicketSealer};
use super::ledger::{LedgerError, TicketLedger};
use super::model::{parse_bulk_count, NewTicket, Ticket, TicketId, ValidationError};
use super::redemption::{RedeemError, TicketRedeemer, MSG_INTERNAL, MSG_VERIFIED};
use super::store::{IndirectionStore, StoreError};

/// Secrets for token signing and envelope encryption.
#[derive(Clone)]
pub struct SecretsConfig {
    /// HS256 secret for ticket tokens.
    pub jwt_secret: String,
    /// Envelope key-derivation secret.
    pub encryption_secret: String,
}

impl SecretsConfig {
    /// Fallback JWT secret when none is configured.
    pub const DEFAULT_JWT_SECRET: &'static str = "default-secret";
    /// Fallback encryption secret when none is configured.
    pub const DEFAULT_ENCRYPTION_SECRET: &'static str = "default-encryption-secret";

    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            jwt_secret: std::env::var("JWT_SECRET")
                .ok()
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| Self::DEFAULT_JWT_SECRET.to_string()),
            encryption_secret: std::env::var("ENCRYPTION_SECRET")
                .ok()
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| Self::DEFAULT_ENCRYPTION_SECRET.to_string()),
        }
    }

    /// True if either secret is still the built-in default.
    pub fn uses_defaults(&self) -> bool {
        self.jwt_secret == Self::DEFAULT_JWT_SECRET
            || self.encryption_secret == Self::DEFAULT_ENCRYPTION_SECRET
    }
}

impl std::fmt::Debug for SecretsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretsConfig")
            .field("jwt_secret", &"<redacted>")
            .field("encryption_secret", &"<redacted>")
            .finish()
    }
}

/// Service errors.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Bad request fields.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// No such ticket.
    #[error("Ticket not found")]
    NotFound,
    /// Ledger fault.
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    /// Store fault.
    #[error(transparent)]
    Store(#[from] StoreError),
    /// Signing or sealing fault.
    #[error(transparent)]
    Issue(#[from] IssueError),
    /// QR rendering fault.
    #[error(transparent)]
    Qr(#[from] QrError),
}

impl ServiceError {
    /// True for infrastructure faults.
    pub fn is_internal(&self) -> bool {
        !matches!(self, ServiceError::Validation(_) | ServiceError::NotFound)
    }

    /// Message safe to show the client.
    pub fn client_message(&self) -> String {
        match self {
            ServiceError::Validation(e) => e.message().to_string(),
            ServiceError::NotFound => "Ticket not found".to_string(),
            _ => MSG_INTERNAL.to_string(),
        }
    }
}

/// A ticket with its inline QR code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssuedTicket {
    /// The ticket.
    pub ticket: Ticket,
    /// PNG data URL encoding the lookup identifier.
    pub qr_code: String,
}

/// One ticket of a bulk issuance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkIssuedTicket {
    /// The ticket.
    pub ticket: Ticket,
    /// PNG data URL encoding the lookup identifier.
    pub qr_code: String,
    /// Absolute path of the saved PNG.
    pub image_path: PathBuf,
}

/// Result of a bulk issuance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulkIssued {
    /// Number of tickets created.
    pub count: usize,
    /// Created tickets, in id order.
    pub tickets: Vec<BulkIssuedTicket>,
}

/// An image written by the export operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportedImage {
    /// Ticket the image belongs to.
    pub ticket_id: TicketId,
    /// Absolute path of the saved PNG.
    pub image_path: PathBuf,
}

/// Outcome of a redemption attempt, as shown to the scanner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RedeemResponse {
    /// Whether the ticket was accepted.
    pub valid: bool,
    /// Human-readable outcome.
    pub message: String,
    /// The redeemed ticket (only when valid).
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub ticket: Option<Ticket>,
    /// Rejection class (only when not valid).
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub code: Option<Rejection>,
}

/// Rejection classes for redemption.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rejection {
    /// Request was missing the identifier.
    InvalidInput,
    /// Identifier unknown, or its token undecryptable, forged or expired.
    InvalidToken,
    /// Ticket was already redeemed.
    AlreadyUsed,
    /// Ticket no longer in the ledger.
    NotFound,
    /// Server fault.
    InternalError,
}

impl RedeemResponse {
    fn accepted(ticket: Ticket) -> Self {
        Self {
            valid: true,
            message: MSG_VERIFIED.to_string(),
            ticket: Some(ticket),
            code: None,
        }
    }

    fn rejected(rejection: Rejection, message: impl Into<String>) -> Self {
        Self {
            valid: false,
            message: message.into(),
            ticket: None,
            code: Some(rejection),
        }
    }
}

impl From<&RedeemError> for Rejection {
    fn from(err: &RedeemError) -> Self {
        match err {
            RedeemError::InvalidOrExpired(_) => Rejection::InvalidToken,
            RedeemError::NotFound => Rejection::NotFound,
            RedeemError::AlreadyUsed => Rejection::AlreadyUsed,
            RedeemError::Ledger(_) | RedeemError::Store(_) => Rejection::InternalError,
        }
    }
}

/// Ticket issuance and redemption over injected collaborators.
pub struct TicketService {
    ledger: Arc<dyn TicketLedger>,
    issuer: Arc<TicketIssuer>,
    redeemer: TicketRedeemer,
    encoder: Arc<dyn VisualEncoder>,
    qr: QrConfig,
}

impl TicketService {
    /// Wire the service from secrets and collaborators.
    ///
    /// Derives the envelope key, so this takes as long as one scrypt run.
    pub fn new(
        secrets: &SecretsConfig,
        qr: QrConfig,
        ledger: Arc<dyn TicketLedger>,
        store: Arc<dyn IndirectionStore>,
        encoder: Arc<dyn VisualEncoder>,
    ) -> Result<Self, EnvelopeError> {
        let sealer = Arc::new(TicketSealer::new(
            TokenCodec::new(&secrets.jwt_secret),
            CipherEnvelope::new(&secrets.encryption_secret)?,
        ));
        Ok(Self::with_sealer(sealer, qr, ledger, store, encoder))
    }

    /// Wire the service around an existing sealer.
    pub fn with_sealer(
        sealer: Arc<TicketSealer>,
        qr: QrConfig,
        ledger: Arc<dyn TicketLedger>,
        store: Arc<dyn IndirectionStore>,
        encoder: Arc<dyn VisualEncoder>,
    ) -> Self {
        let issuer = Arc::new(TicketIssuer::new(sealer.clone(), store.clone()));
        let redeemer = TicketRedeemer::new(sealer, store, ledger.clone(), issuer.clone());

        Self {
            ledger,
            issuer,
            redeemer,
            encoder,
            qr,
        }
    }

    /// Root directory for written QR images.
    pub fn image_dir(&self) -> &Path {
        &self.qr.image_dir
    }

    /// Create one ticket and its QR code.
    #[instrument(skip(self))]
    pub async fn create_ticket(
        &self,
        ticket_type: Option<&str>,
        venue_name: Option<&str>,
        event_time: Option<&str>,
    ) -> Result<IssuedTicket, ServiceError> {
        let draft = NewTicket::parse(ticket_type, venue_name, event_time)?;

        let ticket = self.ledger.create(&draft).await?;
        let lookup_id = self.issuer.issue(&ticket).await?;
        let qr_code = self.encoder.render_data_url(lookup_id.as_str()).await?;

        info!(ticket_id = ticket.id, ticket_type = %ticket.ticket_type, "Ticket created");
        Ok(IssuedTicket { ticket, qr_code })
    }

    /// Create `count` identical tickets, their QR codes and PNG files.
    #[instrument(skip(self, count))]
    pub async fn create_bulk(
        &self,
        ticket_type: Option<&str>,
        venue_name: Option<&str>,
        event_time: Option<&str>,
        count: Option<&serde_json::Value>,
    ) -> Result<BulkIssued, ServiceError> {
        let draft = NewTicket::parse(ticket_type, venue_name, event_time)?;
        let count = parse_bulk_count(count)?;

        let tickets = self.ledger.create_many(&draft, count).await?;
        let lookup_ids = self.issuer.issue_many(&tickets).await?;

        let rendered = try_join_all(
            tickets
                .into_iter()
                .zip(lookup_ids)
                .map(|(ticket, lookup_id)| self.render_bulk_ticket(ticket, lookup_id)),
        )
        .await?;

        info!(count = rendered.len(), "Bulk tickets created");
        Ok(BulkIssued {
            count: rendered.len(),
            tickets: rendered,
        })
    }

    async fn render_bulk_ticket(
        &self,
        ticket: Ticket,
        lookup_id: LookupId,
    ) -> Result<BulkIssuedTicket, ServiceError> {
        let destination = self.qr.ticket_image_path(&ticket);
        let (qr_code, image_path) = tokio::try_join!(
            self.encoder.render_data_url(lookup_id.as_str()),
            self.encoder.render_to_file(lookup_id.as_str(), &destination),
        )?;

        Ok(BulkIssuedTicket {
            ticket,
            qr_code,
            image_path,
        })
    }

    /// All tickets.
    pub async fn list_tickets(&self) -> Result<Vec<Ticket>, ServiceError> {
        Ok(self.ledger.list_all().await?)
    }

    /// Issue a fresh identifier and QR code for an existing ticket.
    #[instrument(skip(self))]
    pub async fn regenerate_qr(&self, id: TicketId) -> Result<IssuedTicket, ServiceError> {
        let ticket = self.ledger.get_by_id(id).await?.ok_or(ServiceError::NotFound)?;
        let lookup_id = self.issuer.issue(&ticket).await?;
        let qr_code = self.encoder.render_data_url(lookup_id.as_str()).await?;

        Ok(IssuedTicket { ticket, qr_code })
    }

    /// Redeem a scanned identifier. Never fails; rejections are responses.
    pub async fn redeem(&self, token: Option<&str>) -> RedeemResponse {
        let token = match token.filter(|t| !t.trim().is_empty()) {
            Some(t) => t,
            None => return RedeemResponse::rejected(Rejection::InvalidInput, "Token is required"),
        };

        match self.redeemer.redeem(&LookupId::from_client(token)).await {
            Ok(ticket) => RedeemResponse::accepted(ticket),
            Err(e) => {
                if e.is_internal() {
                    error!(error = %e, "Redemption failed");
                } else {
                    info!(reason = %e, "Redemption rejected");
                }
                RedeemResponse::rejected(Rejection::from(&e), e.client_message())
            }
        }
    }

    /// Clear a ticket's used flag. Caller must have checked operator rights.
    #[instrument(skip(self))]
    pub async fn reset_ticket(&self, id: TicketId) -> Result<Ticket, ServiceError> {
        let ticket = self.ledger.set_used(id, false).await?.ok_or(ServiceError::NotFound)?;
        info!(ticket_id = ticket.id, "Ticket reset to unused");
        Ok(ticket)
    }

    /// Issue fresh identifiers for every unused ticket and write their PNGs.
    #[instrument(skip(self))]
    pub async fn export_qr_images(&self) -> Result<Vec<ExportedImage>, ServiceError> {
        let tickets = self.ledger.list_unused().await?;
        if tickets.is_empty() {
            return Ok(Vec::new());
        }

        let lookup_ids = self.issuer.issue_many(&tickets).await?;
        let exported = try_join_all(tickets.iter().zip(&lookup_ids).map(|(ticket, lookup_id)| async move {
            let destination = self.qr.ticket_image_path(ticket);
            let image_path = self.encoder.render_to_file(lookup_id.as_str(), &destination).await?;
            Ok::<_, ServiceError>(ExportedImage {
                ticket_id: ticket.id,
                image_path,
            })
        }))
        .await?;

        info!(count = exported.len(), dir = %self.qr.image_dir.display(), "Exported QR images");
        Ok(exported)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::qr::{QrRenderer, PNG_DATA_URL_PREFIX};
    use crate::ticket::issuance::tests::test_sealer;
    use crate::ticket::ledger::MemoryLedger;
    use crate::ticket::store::MemoryStore;
    use async_trait::async_trait;
    use chrono::{Duration, Utc};
    use serde_json::json;
    use std::collections::BTreeSet;
    use std::sync::Mutex;

    /// Records rendered payloads instead of drawing them.
    #[derive(Default)]
    struct RecordingEncoder {
        payloads: Mutex<Vec<String>>,
    }

    impl RecordingEncoder {
        fn payloads(&self) -> Vec<String> {
            self.payloads.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl VisualEncoder for RecordingEncoder {
        async fn render_data_url(&self, text: &str) -> Result<String, QrError> {
            self.payloads.lock().unwrap().push(text.to_string());
            Ok(format!("{PNG_DATA_URL_PREFIX}{text}"))
        }

        async fn render_to_file(&self, _text: &str, destination: &Path) -> Result<PathBuf, QrError> {
            Ok(destination.to_path_buf())
        }
    }

    struct Harness {
        service: TicketService,
        ledger: Arc<MemoryLedger>,
        store: Arc<MemoryStore>,
        encoder: Arc<RecordingEncoder>,
    }

    fn harness() -> Harness {
        let ledger = Arc::new(MemoryLedger::new());
        let store = Arc::new(MemoryStore::new());
        let encoder = Arc::new(RecordingEncoder::default());
        let service = TicketService::with_sealer(
            test_sealer(),
            QrConfig {
                image_dir: PathBuf::from("/tmp/qr"),
                image_size: 400,
            },
            ledger.clone(),
            store.clone(),
            encoder.clone(),
        );
        Harness {
            service,
            ledger,
            store,
            encoder,
        }
    }

    fn future_time() -> String {
        (Utc::now() + Duration::days(10)).to_rfc3339()
    }

    /// Issue one ticket and return the lookup identifier behind its QR code.
    async fn issue_one(h: &Harness) -> (Ticket, String) {
        let issued = h
            .service
            .create_ticket(Some("standard"), Some("Arena"), Some(&future_time()))
            .await
            .unwrap();
        let lookup = h.encoder.payloads().last().cloned().unwrap();
        (issued.ticket, lookup)
    }

    #[tokio::test]
    async fn test_create_ticket_scenario() {
        let h = harness();
        let when = "2030-05-01T19:30:00Z";

        let issued = h
            .service
            .create_ticket(Some("standard"), Some("Arena"), Some(when))
            .await
            .unwrap();

        let value = serde_json::to_value(&issued).unwrap();
        assert_eq!(
            value["ticket"],
            json!({"id": 1, "type": "standard", "venue": "Arena", "eventTime": when, "used": false})
        );
        assert!(issued.qr_code.starts_with(PNG_DATA_URL_PREFIX));
        assert_eq!(h.store.len().await, 1);
    }

    #[tokio::test]
    async fn test_create_ticket_with_real_renderer() {
        let service = TicketService::with_sealer(
            test_sealer(),
            QrConfig::default(),
            Arc::new(MemoryLedger::new()),
            Arc::new(MemoryStore::new()),
            Arc::new(QrRenderer::default()),
        );

        let issued = service
            .create_ticket(Some("test"), Some("Arena"), Some(&future_time()))
            .await
            .unwrap();
        assert!(issued.qr_code.len() > PNG_DATA_URL_PREFIX.len());
    }

    #[tokio::test]
    async fn test_create_ticket_validation_has_no_side_effects() {
        let h = harness();

        let err = h
            .service
            .create_ticket(Some("gold"), Some("Arena"), Some(&future_time()))
            .await
            .unwrap_err();

        assert!(matches!(err, ServiceError::Validation(_)));
        assert!(!err.is_internal());
        assert!(h.ledger.is_empty().await);
        assert!(h.store.is_empty().await);
    }

    #[tokio::test]
    async fn test_qr_carries_identifier_not_token() {
        let h = harness();
        let (_, lookup) = issue_one(&h).await;

        assert!(uuid::Uuid::parse_str(&lookup).is_ok());
        assert!(h.store.get(&lookup).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_bulk_creates_exact_count() {
        let h = harness();

        let bulk = h
            .service
            .create_bulk(Some("premium"), Some("Arena"), Some(&future_time()), Some(&json!(12)))
            .await
            .unwrap();

        assert_eq!(bulk.count, 12);
        assert_eq!(bulk.tickets.len(), 12);
        assert_eq!(h.ledger.len().await, 12);
        assert_eq!(h.store.len().await, 12);

        let identifiers: BTreeSet<String> = h.encoder.payloads().into_iter().collect();
        assert_eq!(identifiers.len(), 12);

        let first = &bulk.tickets[0];
        assert_eq!(first.image_path, PathBuf::from("/tmp/qr/premium/ticket-1.png"));
    }

    #[tokio::test]
    async fn test_bulk_upper_bound() {
        let h = harness();

        let bulk = h
            .service
            .create_bulk(Some("test"), Some("Arena"), Some(&future_time()), Some(&json!(500)))
            .await
            .unwrap();
        assert_eq!(bulk.count, 500);

        let err = h
            .service
            .create_bulk(Some("test"), Some("Arena"), Some(&future_time()), Some(&json!(501)))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
        assert_eq!(h.ledger.len().await, 500);
    }

    #[tokio::test]
    async fn test_bulk_zero_rejected() {
        let h = harness();
        let err = h
            .service
            .create_bulk(Some("test"), Some("Arena"), Some(&future_time()), Some(&json!(0)))
            .await
            .unwrap_err();

        assert_eq!(err.client_message(), "count must be an integer between 1 and 500");
        assert!(h.ledger.is_empty().await);
    }

    #[tokio::test]
    async fn test_list_tickets() {
        let h = harness();
        issue_one(&h).await;
        issue_one(&h).await;

        let tickets = h.service.list_tickets().await.unwrap();
        assert_eq!(tickets.iter().map(|t| t.id).collect::<Vec<_>>(), vec![1, 2]);
    }

    #[tokio::test]
    async fn test_regenerate_qr() {
        let h = harness();
        let (ticket, first) = issue_one(&h).await;

        let again = h.service.regenerate_qr(ticket.id).await.unwrap();
        let second = h.encoder.payloads().last().cloned().unwrap();

        assert_eq!(again.ticket, ticket);
        assert_ne!(first, second);
        assert_eq!(h.store.len().await, 2);

        assert!(matches!(h.service.regenerate_qr(404).await, Err(ServiceError::NotFound)));
    }

    #[tokio::test]
    async fn test_redeem_scenario() {
        let h = harness();
        let (_, lookup) = issue_one(&h).await;

        let first = h.service.redeem(Some(&lookup)).await;
        assert!(first.valid);
        assert_eq!(first.message, "Ticket verified successfully");
        assert!(first.ticket.unwrap().is_used);

        let second = h.service.redeem(Some(&lookup)).await;
        assert!(!second.valid);
        assert_eq!(second.message, "Ticket has already been used");
        assert_eq!(second.code, Some(Rejection::AlreadyUsed));
    }

    #[tokio::test]
    async fn test_redeem_unknown_identifier() {
        let h = harness();
        let (ticket, _) = issue_one(&h).await;

        let response = h.service.redeem(Some("00000000-0000-4000-8000-000000000000")).await;

        assert!(!response.valid);
        assert_eq!(response.message, "Invalid or expired token");
        assert!(response.ticket.is_none());
        assert!(!h.ledger.get_by_id(ticket.id).await.unwrap().unwrap().is_used);
    }

    #[tokio::test]
    async fn test_redeem_missing_token() {
        let h = harness();
        let response = h.service.redeem(None).await;
        assert_eq!(response.message, "Token is required");
        assert_eq!(response.code, Some(Rejection::InvalidInput));

        let response = h.service.redeem(Some("")).await;
        assert_eq!(response.code, Some(Rejection::InvalidInput));
    }

    #[tokio::test]
    async fn test_regenerated_qr_rejected_after_redemption() {
        let h = harness();
        let (ticket, original) = issue_one(&h).await;

        h.service.regenerate_qr(ticket.id).await.unwrap();
        let regenerated = h.encoder.payloads().last().cloned().unwrap();

        assert!(h.service.redeem(Some(&regenerated)).await.valid);
        let replay = h.service.redeem(Some(&original)).await;
        assert_eq!(replay.code, Some(Rejection::AlreadyUsed));
    }

    #[tokio::test]
    async fn test_reset_allows_second_redemption() {
        let h = harness();
        let (ticket, lookup) = issue_one(&h).await;

        assert!(h.service.redeem(Some(&lookup)).await.valid);
        let reset = h.service.reset_ticket(ticket.id).await.unwrap();
        assert!(!reset.is_used);
        assert!(h.service.redeem(Some(&lookup)).await.valid);

        assert!(matches!(h.service.reset_ticket(999).await, Err(ServiceError::NotFound)));
    }

    #[tokio::test]
    async fn test_export_only_unused() {
        let h = harness();
        let (_, used_lookup) = issue_one(&h).await;
        issue_one(&h).await;
        issue_one(&h).await;
        h.service.redeem(Some(&used_lookup)).await;

        let exported = h.service.export_qr_images().await.unwrap();

        let ids: Vec<TicketId> = exported.iter().map(|e| e.ticket_id).collect();
        assert_eq!(ids, vec![2, 3]);
        assert_eq!(exported[0].image_path, PathBuf::from("/tmp/qr/standard/ticket-2.png"));
        // Three original entries plus two fresh ones
        assert_eq!(h.store.len().await, 5);
    }

    #[tokio::test]
    async fn test_export_empty_ledger() {
        let h = harness();
        assert!(h.service.export_qr_images().await.unwrap().is_empty());
    }

    #[test]
    fn test_rejection_wire_names() {
        let response = RedeemResponse::rejected(Rejection::InvalidToken, "Invalid or expired token");
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(
            value,
            json!({"valid": false, "message": "Invalid or expired token", "code": "invalid_token"})
        );
    }

    #[test]
    fn test_empty_secrets_fall_back_to_defaults() {
        // The only test touching these variables; the environment is process-wide.
        std::env::set_var("JWT_SECRET", "");
        std::env::set_var("ENCRYPTION_SECRET", "");

        let secrets = SecretsConfig::from_env();

        std::env::remove_var("JWT_SECRET");
        std::env::remove_var("ENCRYPTION_SECRET");

        assert_eq!(secrets.jwt_secret, SecretsConfig::DEFAULT_JWT_SECRET);
        assert_eq!(secrets.encryption_secret, SecretsConfig::DEFAULT_ENCRYPTION_SECRET);
        assert!(secrets.uses_defaults());
    }

    #[test]
    fn test_secrets_debug_redacted() {
        let secrets = SecretsConfig {
            jwt_secret: "hunter2".into(),
            encryption_secret: "hunter3".into(),
        };
        let shown = format!("{:?}", secrets);
        assert!(!shown.contains("hunter"));
        assert!(!secrets.uses_defaults());
    }
}
