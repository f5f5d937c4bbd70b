//! Time-based cache for the reference tables backing form dropdowns.
//!
//! Each table gets its own slot so a refresh of one does not evict the
//! others. A slot older than the TTL is simply ignored; the caller refetches
//! and stores the new rows. Failed fetches are never stored, so the next read
//! retries.

use std::sync::{Arc, RwLock, RwLockWriteGuard};
use std::time::{Duration, Instant};

use crate::{BudgetLine, CostCenter, UserRef};

pub(crate) const DEFAULT_LOOKUP_TTL: Duration = Duration::from_secs(600);

#[derive(Debug)]
struct Slot<T> {
    fetched_at: Instant,
    rows: Arc<Vec<T>>,
}

#[derive(Debug)]
pub(crate) struct LookupCache {
    ttl: Duration,
    cost_centers: RwLock<Option<Slot<CostCenter>>>,
    users: RwLock<Option<Slot<UserRef>>>,
    budget_lines: RwLock<Option<Slot<BudgetLine>>>,
}

impl LookupCache {
    pub(crate) fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            cost_centers: RwLock::new(None),
            users: RwLock::new(None),
            budget_lines: RwLock::new(None),
        }
    }

    /// Drops every slot; the next read refetches.
    pub(crate) fn clear(&self) {
        *Self::write(&self.cost_centers) = None;
        *Self::write(&self.users) = None;
        *Self::write(&self.budget_lines) = None;
    }

    pub(crate) fn fresh_cost_centers(&self) -> Option<Arc<Vec<CostCenter>>> {
        Self::fresh(&self.cost_centers, self.ttl)
    }

    pub(crate) fn store_cost_centers(&self, rows: Vec<CostCenter>) -> Arc<Vec<CostCenter>> {
        Self::store(&self.cost_centers, rows)
    }

    pub(crate) fn fresh_users(&self) -> Option<Arc<Vec<UserRef>>> {
        Self::fresh(&self.users, self.ttl)
    }

    pub(crate) fn store_users(&self, rows: Vec<UserRef>) -> Arc<Vec<UserRef>> {
        Self::store(&self.users, rows)
    }

    pub(crate) fn fresh_budget_lines(&self) -> Option<Arc<Vec<BudgetLine>>> {
        Self::fresh(&self.budget_lines, self.ttl)
    }

    pub(crate) fn store_budget_lines(&self, rows: Vec<BudgetLine>) -> Arc<Vec<BudgetLine>> {
        Self::store(&self.budget_lines, rows)
    }

    fn fresh<T>(slot: &RwLock<Option<Slot<T>>>, ttl: Duration) -> Option<Arc<Vec<T>>> {
        let guard = slot.read().unwrap_or_else(|e| e.into_inner());
        guard
            .as_ref()
            .filter(|slot| slot.fetched_at.elapsed() < ttl)
            .map(|slot| Arc::clone(&slot.rows))
    }

    fn store<T>(slot: &RwLock<Option<Slot<T>>>, rows: Vec<T>) -> Arc<Vec<T>> {
        let rows = Arc::new(rows);
        *Self::write(slot) = Some(Slot {
            fetched_at: Instant::now(),
            rows: Arc::clone(&rows),
        });
        rows
    }

    fn write<T>(slot: &RwLock<Option<Slot<T>>>) -> RwLockWriteGuard<'_, Option<Slot<T>>> {
        slot.write().unwrap_or_else(|e| e.into_inner())
    }
}
