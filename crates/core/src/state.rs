//! Process-wide mutable state, owned explicitly and injected into the
//! lifecycle controller and the calc evaluator.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use tokio::sync::{Mutex, MutexGuard, OwnedMutexGuard};

use crate::calc::CooldownTracker;
use crate::platform::{CategoryId, ChannelId};
use crate::ticket::{MembershipRegistry, MemoryTicketStore, TicketStore};

/// First sequence number handed out after process start.
pub const FIRST_SEQUENCE: u64 = 1;

/// Serializes lifecycle mutations per ticket.
///
/// Operations on distinct tickets proceed concurrently.
#[derive(Debug, Default)]
pub struct TicketLocks {
    locks: std::sync::Mutex<HashMap<ChannelId, Arc<Mutex<()>>>>,
}

impl TicketLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to one ticket.
    pub async fn acquire(&self, id: ChannelId) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(locks.entry(id).or_default())
        };
        lock.lock_owned().await
    }

    /// Drop the lock entry of a deleted ticket.
    ///
    /// Holders and waiters keep their own handle, so this never unblocks anyone early.
    pub fn forget(&self, id: ChannelId) {
        self.locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id);
    }

    pub fn len(&self) -> usize {
        self.locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Single source of truth for everything that outlives one interaction.
pub struct StateStore {
    sequence: Mutex<u64>,
    tickets: Arc<dyn TicketStore>,
    membership: MembershipRegistry,
    category: RwLock<Option<CategoryId>>,
    locks: TicketLocks,
    cooldowns: CooldownTracker,
}

impl StateStore {
    pub fn new() -> Self {
        Self::with_store(Arc::new(MemoryTicketStore::new()))
    }

    /// Build around a specific ticket store.
    pub fn with_store(tickets: Arc<dyn TicketStore>) -> Self {
        Self {
            sequence: Mutex::new(FIRST_SEQUENCE),
            tickets,
            membership: MembershipRegistry::new(),
            category: RwLock::new(None),
            locks: TicketLocks::new(),
            cooldowns: CooldownTracker::new(),
        }
    }

    /// Hold the sequence counter for the duration of one creation.
    ///
    /// The holder increments it only once the channel exists.
    pub async fn lock_sequence(&self) -> MutexGuard<'_, u64> {
        self.sequence.lock().await
    }

    /// The number the next successful creation will use.
    pub async fn next_sequence(&self) -> u64 {
        *self.sequence.lock().await
    }

    pub fn tickets(&self) -> &dyn TicketStore {
        self.tickets.as_ref()
    }

    pub fn membership(&self) -> &MembershipRegistry {
        &self.membership
    }

    pub fn locks(&self) -> &TicketLocks {
        &self.locks
    }

    pub fn cooldowns(&self) -> &CooldownTracker {
        &self.cooldowns
    }

    pub fn cached_category(&self) -> Option<CategoryId> {
        *self.category.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn cache_category(&self, id: CategoryId) {
        *self.category.write().unwrap_or_else(PoisonError::into_inner) = Some(id);
    }

    pub fn invalidate_category(&self) {
        *self.category.write().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

impl Default for StateStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_sequence_starts_at_one() {
        let state = StateStore::new();
        assert_eq!(state.next_sequence().await, 1);

        {
            let mut seq = state.lock_sequence().await;
            *seq += 1;
        }
        assert_eq!(state.next_sequence().await, 2);
    }

    #[test]
    fn test_sequence_lock_is_released() {
        let state = StateStore::new();
        tokio_test::block_on(async {
            *state.lock_sequence().await = 41;
            assert_eq!(state.next_sequence().await, 41);
        });
    }

    #[test]
    fn test_category_cache() {
        let state = StateStore::new();
        assert_eq!(state.cached_category(), None);
        state.cache_category(CategoryId(9));
        assert_eq!(state.cached_category(), Some(CategoryId(9)));
        state.invalidate_category();
        assert_eq!(state.cached_category(), None);
    }

    #[tokio::test]
    async fn test_ticket_lock_serializes_same_ticket() {
        let locks = Arc::new(TicketLocks::new());
        let guard = locks.acquire(ChannelId(1)).await;

        let contender = {
            let locks = Arc::clone(&locks);
            tokio::spawn(async move {
                let _guard = locks.acquire(ChannelId(1)).await;
            })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!contender.is_finished());

        drop(guard);
        contender.await.unwrap();
    }

    #[tokio::test]
    async fn test_ticket_lock_independent_tickets() {
        let locks = TicketLocks::new();
        let _first = locks.acquire(ChannelId(1)).await;
        let second = tokio::time::timeout(Duration::from_millis(50), locks.acquire(ChannelId(2))).await;
        assert!(second.is_ok());
        assert_eq!(locks.len(), 2);

        locks.forget(ChannelId(1));
        assert_eq!(locks.len(), 1);
    }
}
