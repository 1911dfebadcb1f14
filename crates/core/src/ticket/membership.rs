//! Explicit per-ticket membership.
//!
//! Staff access is derived from roles and is never recorded here.

use std::collections::{BTreeSet, HashMap};
use std::sync::{PoisonError, RwLock};

use crate::platform::{ActorId, ChannelId};

/// Maps each open ticket to the actors explicitly attached to it.
#[derive(Debug, Default)]
pub struct MembershipRegistry {
    members: RwLock<HashMap<ChannelId, BTreeSet<ActorId>>>,
}

impl MembershipRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start tracking a ticket with its initial members.
    pub fn insert(&self, ticket: ChannelId, initial: impl IntoIterator<Item = ActorId>) {
        self.members
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(ticket, initial.into_iter().collect());
    }

    /// Attach an actor. Returns `false` if it was already attached.
    pub fn add(&self, ticket: ChannelId, actor: ActorId) -> bool {
        self.members
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(ticket)
            .or_default()
            .insert(actor)
    }

    /// Detach an actor. Returns `false` if it was not attached.
    pub fn remove(&self, ticket: ChannelId, actor: ActorId) -> bool {
        self.members
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .get_mut(&ticket)
            .is_some_and(|set| set.remove(&actor))
    }

    /// Current members of a ticket (empty if untracked).
    pub fn members(&self, ticket: ChannelId) -> BTreeSet<ActorId> {
        self.members
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&ticket)
            .cloned()
            .unwrap_or_default()
    }

    pub fn contains_ticket(&self, ticket: ChannelId) -> bool {
        self.members
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&ticket)
    }

    /// Forget a ticket entirely.
    pub fn erase(&self, ticket: ChannelId) -> Option<BTreeSet<ActorId>> {
        self.members
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&ticket)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TICKET: ChannelId = ChannelId(500);

    #[test]
    fn test_insert_sets_initial_members() {
        let registry = MembershipRegistry::new();
        registry.insert(TICKET, [ActorId(1), ActorId(2)]);
        let members: Vec<_> = registry.members(TICKET).into_iter().collect();
        assert_eq!(members, vec![ActorId(1), ActorId(2)]);
    }

    #[test]
    fn test_add_is_idempotent() {
        let registry = MembershipRegistry::new();
        registry.insert(TICKET, [ActorId(1)]);
        assert!(registry.add(TICKET, ActorId(3)));
        assert!(!registry.add(TICKET, ActorId(3)));
        assert_eq!(registry.members(TICKET).len(), 2);
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let registry = MembershipRegistry::new();
        registry.insert(TICKET, [ActorId(1)]);
        assert!(!registry.remove(TICKET, ActorId(9)));
        assert!(!registry.remove(ChannelId(1), ActorId(1)));
        assert!(registry.remove(TICKET, ActorId(1)));
        assert!(registry.members(TICKET).is_empty());
        assert!(registry.contains_ticket(TICKET));
    }

    #[test]
    fn test_add_to_untracked_ticket_starts_tracking() {
        let registry = MembershipRegistry::new();
        assert!(registry.add(TICKET, ActorId(4)));
        assert!(registry.contains_ticket(TICKET));
    }

    #[test]
    fn test_erase() {
        let registry = MembershipRegistry::new();
        registry.insert(TICKET, [ActorId(1), ActorId(2)]);
        let erased = registry.erase(TICKET).unwrap();
        assert_eq!(erased.len(), 2);
        assert!(!registry.contains_ticket(TICKET));
        assert!(registry.members(TICKET).is_empty());
        assert!(registry.erase(TICKET).is_none());
    }
}
