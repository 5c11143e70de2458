//! Ticket Ledger
//!
//! Persistence contract for ticket records plus an in-process implementation.

use async_trait::async_trait;
use std::collections::BTreeMap;
use thiserror::Error;
use tokio::sync::RwLock;

use super::model::{NewTicket, Ticket, TicketId};

/// Ledger errors. Always infrastructure faults, never client errors.
#[derive(Debug, Clone, Error)]
pub enum LedgerError {
    /// Backend unreachable or failed.
    #[error("ledger unavailable: {0}")]
    Unavailable(String),
}

/// Result of a conditional used-flag update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UseOutcome {
    /// Flag flipped false -> true by this call.
    Marked(Ticket),
    /// Flag was already true; nothing changed.
    AlreadyUsed(Ticket),
    /// No ticket with that id.
    Missing,
}

/// Ticket persistence.
#[async_trait]
pub trait TicketLedger: Send + Sync {
    /// Persist one ticket.
    async fn create(&self, ticket: &NewTicket) -> Result<Ticket, LedgerError>;

    /// Persist `count` identical tickets in one call.
    async fn create_many(&self, ticket: &NewTicket, count: usize) -> Result<Vec<Ticket>, LedgerError>;

    /// Load a ticket.
    async fn get_by_id(&self, id: TicketId) -> Result<Option<Ticket>, LedgerError>;

    /// Unconditionally set the used flag.
    async fn set_used(&self, id: TicketId, used: bool) -> Result<Option<Ticket>, LedgerError>;

    /// Set used = true only if it is currently false, atomically.
    ///
    /// Equivalent to `UPDATE tickets SET used = true WHERE id = ? AND used = false`.
    async fn mark_used_if_unused(&self, id: TicketId) -> Result<UseOutcome, LedgerError>;

    /// All tickets, by id.
    async fn list_all(&self) -> Result<Vec<Ticket>, LedgerError>;

    /// Tickets not yet redeemed, by id.
    async fn list_unused(&self) -> Result<Vec<Ticket>, LedgerError>;
}

// =============================================================================
// IN-PROCESS LEDGER
// =============================================================================

struct LedgerState {
    tickets: BTreeMap<TicketId, Ticket>,
    next_id: TicketId,
}

/// Ledger held in process memory.
pub struct MemoryLedger {
    state: RwLock<LedgerState>,
}

impl MemoryLedger {
    /// Create an empty ledger. Ids start at 1.
    pub fn new() -> Self {
        Self {
            state: RwLock::new(LedgerState {
                tickets: BTreeMap::new(),
                next_id: 1,
            }),
        }
    }

    /// Number of stored tickets.
    pub async fn len(&self) -> usize {
        self.state.read().await.tickets.len()
    }

    /// True when no tickets are stored.
    pub async fn is_empty(&self) -> bool {
        self.state.read().await.tickets.is_empty()
    }
}

impl Default for MemoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TicketLedger for MemoryLedger {
    async fn create(&self, ticket: &NewTicket) -> Result<Ticket, LedgerError> {
        let mut state = self.state.write().await;
        let id = state.next_id;
        state.next_id += 1;

        let ticket = ticket.clone().into_ticket(id);
        state.tickets.insert(id, ticket.clone());
        Ok(ticket)
    }

    async fn create_many(&self, ticket: &NewTicket, count: usize) -> Result<Vec<Ticket>, LedgerError> {
        let mut state = self.state.write().await;
        let mut created = Vec::with_capacity(count);

        for _ in 0..count {
            let id = state.next_id;
            state.next_id += 1;

            let ticket = ticket.clone().into_ticket(id);
            state.tickets.insert(id, ticket.clone());
            created.push(ticket);
        }

        Ok(created)
    }

    async fn get_by_id(&self, id: TicketId) -> Result<Option<Ticket>, LedgerError> {
        let state = self.state.read().await;
        Ok(state.tickets.get(&id).cloned())
    }

    async fn set_used(&self, id: TicketId, used: bool) -> Result<Option<Ticket>, LedgerError> {
        let mut state = self.state.write().await;
        Ok(state.tickets.get_mut(&id).map(|ticket| {
            ticket.is_used = used;
            ticket.clone()
        }))
    }

    async fn mark_used_if_unused(&self, id: TicketId) -> Result<UseOutcome, LedgerError> {
        let mut state = self.state.write().await;
        let outcome = match state.tickets.get_mut(&id) {
            None => UseOutcome::Missing,
            Some(ticket) if ticket.is_used => UseOutcome::AlreadyUsed(ticket.clone()),
            Some(ticket) => {
                ticket.is_used = true;
                UseOutcome::Marked(ticket.clone())
            }
        };
        Ok(outcome)
    }

    async fn list_all(&self) -> Result<Vec<Ticket>, LedgerError> {
        let state = self.state.read().await;
        Ok(state.tickets.values().cloned().collect())
    }

    async fn list_unused(&self) -> Result<Vec<Ticket>, LedgerError> {
        let state = self.state.read().await;
        Ok(state.tickets.values().filter(|t| !t.is_used).cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ticket::model::TicketType;
    use chrono::{TimeZone, Utc};
    use std::sync::Arc;

    fn draft() -> NewTicket {
        NewTicket {
            ticket_type: TicketType::Standard,
            venue_name: "Arena".into(),
            event_time: Utc.with_ymd_and_hms(2026, 11, 20, 19, 0, 0).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_create_assigns_sequential_ids() {
        let ledger = MemoryLedger::new();

        let first = ledger.create(&draft()).await.unwrap();
        let second = ledger.create(&draft()).await.unwrap();

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert!(!first.is_used);
        assert_eq!(ledger.len().await, 2);
    }

    #[tokio::test]
    async fn test_create_many() {
        let ledger = MemoryLedger::new();
        ledger.create(&draft()).await.unwrap();

        let tickets = ledger.create_many(&draft(), 5).await.unwrap();
        let ids: Vec<TicketId> = tickets.iter().map(|t| t.id).collect();

        assert_eq!(ids, vec![2, 3, 4, 5, 6]);
        assert_eq!(ledger.list_all().await.unwrap().len(), 6);
    }

    #[tokio::test]
    async fn test_get_missing() {
        let ledger = MemoryLedger::new();
        assert!(ledger.get_by_id(99).await.unwrap().is_none());
        assert!(ledger.set_used(99, true).await.unwrap().is_none());
        assert_eq!(ledger.mark_used_if_unused(99).await.unwrap(), UseOutcome::Missing);
    }

    #[tokio::test]
    async fn test_mark_used_once() {
        let ledger = MemoryLedger::new();
        let ticket = ledger.create(&draft()).await.unwrap();

        let first = ledger.mark_used_if_unused(ticket.id).await.unwrap();
        assert!(matches!(first, UseOutcome::Marked(ref t) if t.is_used));

        let second = ledger.mark_used_if_unused(ticket.id).await.unwrap();
        assert!(matches!(second, UseOutcome::AlreadyUsed(_)));
    }

    #[tokio::test]
    async fn test_set_used_resets() {
        let ledger = MemoryLedger::new();
        let ticket = ledger.create(&draft()).await.unwrap();
        ledger.mark_used_if_unused(ticket.id).await.unwrap();

        let reset = ledger.set_used(ticket.id, false).await.unwrap().unwrap();
        assert!(!reset.is_used);
        assert_eq!(ledger.list_unused().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_mark_used_single_winner() {
        let ledger = Arc::new(MemoryLedger::new());
        let ticket = ledger.create(&draft()).await.unwrap();

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let ledger = ledger.clone();
                tokio::spawn(async move { ledger.mark_used_if_unused(ticket.id).await.unwrap() })
            })
            .collect();

        let mut marked = 0;
        for handle in handles {
            if matches!(handle.await.unwrap(), UseOutcome::Marked(_)) {
                marked += 1;
            }
        }
        assert_eq!(marked, 1);
    }
}
