//! Write-notification registry powering live queries.
//!
//! Every live query registers a refresh closure together with the set of
//! tables it reads. Each write re-runs, inside the same serialized database
//! call, every registered closure whose table set intersects the written
//! tables. A closure reports whether its subscriber is still listening;
//! closed subscriptions are pruned on the spot.

use std::sync::{Mutex, MutexGuard, PoisonError};

// ─── Table sets ──────────────────────────────────────────────────────────────

/// Bitset of the store's tables, for matching writes to subscriptions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Tables(u8);

impl Tables {
  pub(crate) const USERS: Tables = Tables(1 << 0);
  pub(crate) const FACULTIES: Tables = Tables(1 << 1);
  pub(crate) const STUDENTS: Tables = Tables(1 << 2);
  pub(crate) const SESSION: Tables = Tables(1 << 3);

  pub(crate) fn intersects(self, other: Tables) -> bool {
    self.0 & other.0 != 0
  }
}

impl std::ops::BitOr for Tables {
  type Output = Tables;

  fn bitor(self, rhs: Tables) -> Tables {
    Tables(self.0 | rhs.0)
  }
}

// ─── Registry ────────────────────────────────────────────────────────────────

/// Re-runs a live query and publishes the fresh snapshot.
/// Returns `Ok(false)` once the subscriber is gone.
pub(crate) type Refresh =
  Box<dyn FnMut(&rusqlite::Connection) -> rusqlite::Result<bool> + Send>;

struct Subscription {
  tables:  Tables,
  refresh: Refresh,
}

/// All live-query subscriptions of one store.
#[derive(Default)]
pub(crate) struct Registry {
  subs: Mutex<Vec<Subscription>>,
}

impl Registry {
  pub(crate) fn register(&self, tables: Tables, refresh: Refresh) {
    self.lock().push(Subscription { tables, refresh });
  }

  /// Refresh every subscription reading one of `touched`.
  ///
  /// Runs on the connection thread, after the write and before the call
  /// returns — subscribers never observe partial writes, and per-table
  /// snapshots arrive in write order.
  pub(crate) fn notify(
    &self,
    conn: &rusqlite::Connection,
    touched: Tables,
  ) -> rusqlite::Result<()> {
    let mut subs = self.lock();
    let mut i = 0;
    while i < subs.len() {
      if !subs[i].tables.intersects(touched) {
        i += 1;
        continue;
      }
      match (subs[i].refresh)(conn) {
        Ok(true) => i += 1,
        Ok(false) => {
          subs.swap_remove(i);
        }
        Err(e) => return Err(e),
      }
    }
    Ok(())
  }

  fn lock(&self) -> MutexGuard<'_, Vec<Subscription>> {
    // The guarded value is a plain Vec; a poisoned lock is still usable.
    self.subs.lock().unwrap_or_else(PoisonError::into_inner)
  }
}
