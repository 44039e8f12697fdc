use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::warn;

/// Read guard, or `None` when a writer panicked; callers treat that as a miss.
pub(crate) fn rw_read<'a, T>(
    lock: &'a RwLock<T>,
    target: &'static str,
    op: &'static str,
) -> Option<RwLockReadGuard<'a, T>> {
    match lock.read() {
        Ok(guard) => Some(guard),
        Err(_) => {
            warn!(
                op,
                target_module = target,
                lock_kind = "rwlock.read",
                result = "poisoned_fail_open",
                hint = "serving uncached until the slot is rewritten",
                "Cache lock poisoned"
            );
            None
        }
    }
}

/// Write guard, recovering and clearing poison; writers always replace the
/// whole slot.
pub(crate) fn rw_write<'a, T>(
    lock: &'a RwLock<T>,
    target: &'static str,
    op: &'static str,
) -> RwLockWriteGuard<'a, T> {
    match lock.write() {
        Ok(guard) => guard,
        Err(poisoned) => {
            warn!(
                op,
                target_module = target,
                lock_kind = "rwlock.write",
                result = "poisoned_recovered",
                hint = "slot contents are overwritten by this write",
                "Recovered from poisoned cache lock"
            );
            let guard = poisoned.into_inner();
            lock.clear_poison();
            guard
        }
    }
}
