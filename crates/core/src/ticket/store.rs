//! Ticket storage trait and the in-memory store.
//!
//! Tickets live for the process lifetime only; there is no crash recovery.

use std::collections::HashMap;
use std::fmt;
use std::sync::{PoisonError, RwLock};

use chrono::Utc;

use crate::platform::ChannelId;
use crate::ticket::{Ticket, TicketState};

/// Error type for store operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TicketStoreError {
    /// Ticket not found.
    NotFound(ChannelId),
    /// A ticket already exists for this channel.
    AlreadyExists(ChannelId),
    /// The requested state change is not a legal transition.
    InvalidTransition {
        channel_id: ChannelId,
        from: TicketState,
        to: TicketState,
    },
}

impl fmt::Display for TicketStoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TicketStoreError::NotFound(id) => write!(f, "Ticket not found: {}", id),
            TicketStoreError::AlreadyExists(id) => write!(f, "Ticket already exists: {}", id),
            TicketStoreError::InvalidTransition {
                channel_id,
                from,
                to,
            } => write!(
                f,
                "Cannot move ticket {} from {} to {}",
                channel_id, from, to
            ),
        }
    }
}

impl std::error::Error for TicketStoreError {}

/// Trait for ticket storage backends.
pub trait TicketStore: Send + Sync {
    /// Record a newly provisioned ticket.
    fn insert(&self, ticket: Ticket) -> Result<(), TicketStoreError>;

    /// Get a ticket by its channel.
    fn get(&self, id: ChannelId) -> Option<Ticket>;

    /// Move a ticket to a new state, enforcing legal transitions.
    fn update_state(&self, id: ChannelId, state: TicketState) -> Result<Ticket, TicketStoreError>;

    /// Record a new channel name.
    fn rename(&self, id: ChannelId, name: &str) -> Result<Ticket, TicketStoreError>;

    /// Strike a ticket from the store. Returns it if it was present.
    fn remove(&self, id: ChannelId) -> Option<Ticket>;
}

/// Process-lifetime ticket store.
#[derive(Debug, Default)]
pub struct MemoryTicketStore {
    tickets: RwLock<HashMap<ChannelId, Ticket>>,
}

impl MemoryTicketStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.tickets
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl TicketStore for MemoryTicketStore {
    fn insert(&self, ticket: Ticket) -> Result<(), TicketStoreError> {
        let mut tickets = self.tickets.write().unwrap_or_else(PoisonError::into_inner);
        if tickets.contains_key(&ticket.channel_id) {
            return Err(TicketStoreError::AlreadyExists(ticket.channel_id));
        }
        tickets.insert(ticket.channel_id, ticket);
        Ok(())
    }

    fn get(&self, id: ChannelId) -> Option<Ticket> {
        self.tickets
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
            .cloned()
    }

    fn update_state(&self, id: ChannelId, state: TicketState) -> Result<Ticket, TicketStoreError> {
        let mut tickets = self.tickets.write().unwrap_or_else(PoisonError::into_inner);
        let ticket = tickets.get_mut(&id).ok_or(TicketStoreError::NotFound(id))?;
        if !ticket.state.can_transition_to(state) {
            return Err(TicketStoreError::InvalidTransition {
                channel_id: id,
                from: ticket.state,
                to: state,
            });
        }
        ticket.state = state;
        ticket.updated_at = Utc::now();
        Ok(ticket.clone())
    }

    fn rename(&self, id: ChannelId, name: &str) -> Result<Ticket, TicketStoreError> {
        let mut tickets = self.tickets.write().unwrap_or_else(PoisonError::into_inner);
        let ticket = tickets.get_mut(&id).ok_or(TicketStoreError::NotFound(id))?;
        ticket.name = name.to_string();
        ticket.updated_at = Utc::now();
        Ok(ticket.clone())
    }

    fn remove(&self, id: ChannelId) -> Option<Ticket> {
        self.tickets
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::ActorId;
    use crate::ticket::{channel_name_for, TicketType};

    fn ticket(channel: u64, ticket_type: TicketType, sequence: u64) -> Ticket {
        let now = Utc::now();
        Ticket {
            channel_id: ChannelId(channel),
            name: channel_name_for(ticket_type, sequence),
            ticket_type,
            sequence,
            state: TicketState::Open,
            requester: ActorId(1),
            counterparty: ActorId(2),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_insert_and_get() {
        let store = MemoryTicketStore::new();
        store.insert(ticket(100, TicketType::TrialMiddleman, 1)).unwrap();

        let found = store.get(ChannelId(100)).unwrap();
        assert_eq!(found.name, "trial_middleman-1");
        assert!(store.get(ChannelId(101)).is_none());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_insert_duplicate_fails() {
        let store = MemoryTicketStore::new();
        store.insert(ticket(100, TicketType::TrialMiddleman, 1)).unwrap();
        let err = store
            .insert(ticket(100, TicketType::HeadMiddleman, 2))
            .unwrap_err();
        assert_eq!(err, TicketStoreError::AlreadyExists(ChannelId(100)));
    }

    #[test]
    fn test_update_state_enforces_transitions() {
        let store = MemoryTicketStore::new();
        store.insert(ticket(100, TicketType::TrialMiddleman, 1)).unwrap();

        let closed = store.update_state(ChannelId(100), TicketState::Closed).unwrap();
        assert_eq!(closed.state, TicketState::Closed);

        let err = store
            .update_state(ChannelId(100), TicketState::Closed)
            .unwrap_err();
        assert!(matches!(err, TicketStoreError::InvalidTransition { .. }));

        let reopened = store.update_state(ChannelId(100), TicketState::Open).unwrap();
        assert_eq!(reopened.state, TicketState::Open);
    }

    #[test]
    fn test_update_state_missing_ticket() {
        let store = MemoryTicketStore::new();
        let err = store
            .update_state(ChannelId(5), TicketState::Closed)
            .unwrap_err();
        assert_eq!(err, TicketStoreError::NotFound(ChannelId(5)));
    }

    #[test]
    fn test_rename_and_remove() {
        let store = MemoryTicketStore::new();
        store.insert(ticket(100, TicketType::TrialMiddleman, 1)).unwrap();

        let renamed = store.rename(ChannelId(100), "my-cool-trade").unwrap();
        assert_eq!(renamed.name, "my-cool-trade");

        let removed = store.remove(ChannelId(100)).unwrap();
        assert_eq!(removed.name, "my-cool-trade");
        assert!(store.remove(ChannelId(100)).is_none());
        assert!(store.is_empty());
    }
}
