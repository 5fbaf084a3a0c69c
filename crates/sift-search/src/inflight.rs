//! Per-key in-flight marker: at most one search per sub-question inside
//! this process.

use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

use sift_core::keys::SubquestionKey;

#[derive(Debug, Default)]
pub struct InFlight {
    keys: Mutex<HashSet<SubquestionKey>>,
}

impl InFlight {
    /// Mark `key` as searching. `None` if it already is.
    pub fn try_acquire(&self, key: &SubquestionKey) -> Option<InFlightGuard<'_>> {
        let mut keys = self.keys.lock().unwrap_or_else(PoisonError::into_inner);
        keys.insert(key.clone()).then(|| InFlightGuard {
            owner: self,
            key: key.clone(),
        })
    }

    #[must_use]
    pub fn contains(&self, key: &SubquestionKey) -> bool {
        self.keys
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(key)
    }
}

/// Clears the marker on drop, including when the search fails or is
/// cancelled.
#[derive(Debug)]
pub struct InFlightGuard<'a> {
    owner: &'a InFlight,
    key: SubquestionKey,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.owner
            .keys
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_acquire_fails_until_release() {
        let in_flight = InFlight::default();
        let key = SubquestionKey::normalize("A");
        let guard = in_flight.try_acquire(&key).unwrap();
        assert!(in_flight.try_acquire(&key).is_none());
        assert!(in_flight.contains(&key));
        drop(guard);
        assert!(!in_flight.contains(&key));
        assert!(in_flight.try_acquire(&key).is_some());
    }

    #[test]
    fn different_keys_are_independent() {
        let in_flight = InFlight::default();
        let _a = in_flight.try_acquire(&SubquestionKey::normalize("A")).unwrap();
        assert!(in_flight.try_acquire(&SubquestionKey::normalize("B")).is_some());
    }
}
