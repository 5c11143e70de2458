//! Ticket Model
//!
//! The ticket record, its claim set, and validation of incoming drafts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Ledger-assigned ticket identifier.
pub type TicketId = u64;

/// Upper bound for a single bulk issuance.
pub const MAX_BULK_COUNT: usize = 500;

/// Ticket tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketType {
    /// General admission.
    #[serde(alias = "regular")]
    Standard,
    /// Premium seating.
    #[serde(alias = "vip")]
    Premium,
    /// Test tickets for door-scanner checks.
    Test,
}

impl TicketType {
    /// All ticket types.
    pub const ALL: [TicketType; 3] = [TicketType::Standard, TicketType::Premium, TicketType::Test];

    /// Wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            TicketType::Standard => "standard",
            TicketType::Premium => "premium",
            TicketType::Test => "test",
        }
    }
}

impl fmt::Display for TicketType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TicketType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "standard" | "regular" => Ok(TicketType::Standard),
            "premium" | "vip" => Ok(TicketType::Premium),
            "test" => Ok(TicketType::Test),
            _ => Err(ValidationError::new(
                "ticketType must be 'standard', 'premium', or 'test'",
            )),
        }
    }
}

/// A persisted ticket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    /// Ledger identifier.
    pub id: TicketId,
    /// Tier.
    #[serde(rename = "type", alias = "ticketType")]
    pub ticket_type: TicketType,
    /// Venue name.
    #[serde(rename = "venue", alias = "venueName")]
    pub venue_name: String,
    /// Event start (UTC).
    #[serde(rename = "eventTime")]
    pub event_time: DateTime<Utc>,
    /// Has the ticket been redeemed.
    #[serde(rename = "used", alias = "isUsed")]
    pub is_used: bool,
}

impl Ticket {
    /// Derive the claim set for this ticket's current state.
    pub fn claims(&self) -> TicketClaims {
        TicketClaims {
            id: self.id,
            ticket_type: self.ticket_type,
            venue_name: self.venue_name.clone(),
            event_time: self.event_time,
        }
    }
}

/// Fields for a ticket that has not been persisted yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTicket {
    /// Tier.
    pub ticket_type: TicketType,
    /// Venue name.
    pub venue_name: String,
    /// Event start (UTC).
    pub event_time: DateTime<Utc>,
}

impl NewTicket {
    /// Validate raw request fields.
    ///
    /// All three fields are required; the type must be a known tier and the
    /// event time an RFC 3339 timestamp.
    pub fn parse(
        ticket_type: Option<&str>,
        venue_name: Option<&str>,
        event_time: Option<&str>,
    ) -> Result<Self, ValidationError> {
        let (ticket_type, venue_name, event_time) = match (
            non_blank(ticket_type),
            non_blank(venue_name),
            non_blank(event_time),
        ) {
            (Some(t), Some(v), Some(e)) => (t, v, e),
            _ => {
                return Err(ValidationError::new(
                    "ticketType, venueName, and eventTime are required",
                ))
            }
        };

        let ticket_type = ticket_type.parse::<TicketType>()?;
        let event_time = DateTime::parse_from_rfc3339(event_time)
            .map_err(|_| ValidationError::new("eventTime must be an RFC 3339 timestamp"))?
            .with_timezone(&Utc);

        Ok(Self {
            ticket_type,
            venue_name: venue_name.to_string(),
            event_time,
        })
    }

    /// Materialize as a ticket with the given id.
    pub fn into_ticket(self, id: TicketId) -> Ticket {
        Ticket {
            id,
            ticket_type: self.ticket_type,
            venue_name: self.venue_name,
            event_time: self.event_time,
            is_used: false,
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// Validate a bulk count: an integer in `1..=MAX_BULK_COUNT`.
pub fn parse_bulk_count(count: Option<&serde_json::Value>) -> Result<usize, ValidationError> {
    let count = count
        .filter(|v| !v.is_null())
        .ok_or_else(|| ValidationError::new("count is required"))?;

    // JSON has one number type, so `5.0` counts as the integer 5.
    count
        .as_u64()
        .or_else(|| {
            count
                .as_f64()
                .filter(|f| f.fract() == 0.0 && *f >= 1.0 && *f <= MAX_BULK_COUNT as f64)
                .map(|f| f as u64)
        })
        .and_then(|n| usize::try_from(n).ok())
        .filter(|n| (1..=MAX_BULK_COUNT).contains(n))
        .ok_or_else(|| {
            ValidationError::new(format!(
                "count must be an integer between 1 and {MAX_BULK_COUNT}"
            ))
        })
}

/// Signed payload describing a ticket at a point in time.
///
/// Does not carry the used flag: redemption always checks the live ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketClaims {
    /// Ticket identifier.
    pub id: TicketId,
    /// Tier.
    pub ticket_type: TicketType,
    /// Venue name.
    pub venue_name: String,
    /// Event start, RFC 3339 on the wire.
    pub event_time: DateTime<Utc>,
}

/// Request validation failure. Rejected before any side effect.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ValidationError {
    message: String,
}

impl ValidationError {
    /// Create with a client-facing message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Client-facing message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn arena_ticket() -> Ticket {
        Ticket {
            id: 1,
            ticket_type: TicketType::Standard,
            venue_name: "Arena".into(),
            event_time: Utc.with_ymd_and_hms(2026, 11, 20, 19, 0, 0).unwrap(),
            is_used: false,
        }
    }

    #[test]
    fn test_ticket_wire_shape() {
        let value = serde_json::to_value(arena_ticket()).unwrap();
        assert_eq!(
            value,
            json!({
                "id": 1,
                "type": "standard",
                "venue": "Arena",
                "eventTime": "2026-11-20T19:00:00Z",
                "used": false,
            })
        );
    }

    #[test]
    fn test_ticket_accepts_legacy_field_names() {
        let ticket: Ticket = serde_json::from_value(json!({
            "id": 7,
            "ticketType": "vip",
            "venueName": "Hall",
            "eventTime": "2026-11-20T19:00:00Z",
            "isUsed": true,
        }))
        .unwrap();

        assert_eq!(ticket.ticket_type, TicketType::Premium);
        assert_eq!(ticket.venue_name, "Hall");
        assert!(ticket.is_used);
    }

    #[test]
    fn test_ticket_type_parsing() {
        assert_eq!("standard".parse::<TicketType>().unwrap(), TicketType::Standard);
        assert_eq!("regular".parse::<TicketType>().unwrap(), TicketType::Standard);
        assert_eq!("premium".parse::<TicketType>().unwrap(), TicketType::Premium);
        assert_eq!("vip".parse::<TicketType>().unwrap(), TicketType::Premium);
        assert_eq!("test".parse::<TicketType>().unwrap(), TicketType::Test);
        assert!("gold".parse::<TicketType>().is_err());
        assert!("Standard".parse::<TicketType>().is_err());
    }

    #[test]
    fn test_new_ticket_parse() {
        let draft = NewTicket::parse(Some("premium"), Some("Arena"), Some("2026-11-20T21:00:00+02:00"))
            .unwrap();

        assert_eq!(draft.ticket_type, TicketType::Premium);
        assert_eq!(draft.event_time, Utc.with_ymd_and_hms(2026, 11, 20, 19, 0, 0).unwrap());
    }

    #[test]
    fn test_new_ticket_missing_fields() {
        let err = NewTicket::parse(None, Some("Arena"), Some("2026-11-20T19:00:00Z")).unwrap_err();
        assert_eq!(err.message(), "ticketType, venueName, and eventTime are required");

        let err = NewTicket::parse(Some("test"), Some("  "), Some("2026-11-20T19:00:00Z")).unwrap_err();
        assert_eq!(err.message(), "ticketType, venueName, and eventTime are required");
    }

    #[test]
    fn test_new_ticket_bad_values() {
        let err = NewTicket::parse(Some("gold"), Some("Arena"), Some("2026-11-20T19:00:00Z")).unwrap_err();
        assert!(err.message().starts_with("ticketType must be"));

        let err = NewTicket::parse(Some("test"), Some("Arena"), Some("next friday")).unwrap_err();
        assert!(err.message().starts_with("eventTime must be"));
    }

    #[test]
    fn test_bulk_count_bounds() {
        assert_eq!(parse_bulk_count(Some(&json!(1))).unwrap(), 1);
        assert_eq!(parse_bulk_count(Some(&json!(500))).unwrap(), 500);

        assert!(parse_bulk_count(None).is_err());
        assert!(parse_bulk_count(Some(&json!(null))).is_err());
        assert!(parse_bulk_count(Some(&json!(0))).is_err());
        assert!(parse_bulk_count(Some(&json!(501))).is_err());
        assert!(parse_bulk_count(Some(&json!(-3))).is_err());
        assert!(parse_bulk_count(Some(&json!(2.5))).is_err());
        assert!(parse_bulk_count(Some(&json!("10"))).is_err());
    }

    #[test]
    fn test_bulk_count_integral_float() {
        assert_eq!(parse_bulk_count(Some(&json!(5.0))).unwrap(), 5);
        assert_eq!(parse_bulk_count(Some(&json!(500.0))).unwrap(), 500);

        assert!(parse_bulk_count(Some(&json!(5.5))).is_err());
        assert!(parse_bulk_count(Some(&json!(0.0))).is_err());
        assert!(parse_bulk_count(Some(&json!(501.0))).is_err());
        assert!(parse_bulk_count(Some(&json!(-2.0))).is_err());
    }

    #[test]
    fn test_claims_follow_ticket() {
        let ticket = arena_ticket();
        let claims = ticket.claims();
        assert_eq!(claims.id, ticket.id);
        assert_eq!(claims.venue_name, "Arena");

        let value = serde_json::to_value(&claims).unwrap();
        assert_eq!(value["ticketType"], "standard");
        assert_eq!(value["eventTime"], "2026-11-20T19:00:00Z");
    }
}
