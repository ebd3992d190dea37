//! Session-scoped identity map.
//!
//! # Invariants
//! - At most one handle is registered per primary key.
//! - Entries live until evicted, cleared, or the owning session is dropped.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

/// Cache of live instances keyed by persisted integer id.
#[derive(Debug)]
pub struct IdentityMap<T> {
    entries: BTreeMap<i64, Rc<RefCell<T>>>,
}

impl<T> Default for IdentityMap<T> {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }
}

impl<T> IdentityMap<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a new handle to the cached instance for `id`, if any.
    pub fn get(&self, id: i64) -> Option<Rc<RefCell<T>>> {
        self.entries.get(&id).map(Rc::clone)
    }

    /// Registers `handle` under `id`, returning the handle it replaced.
    pub fn insert(&mut self, id: i64, handle: Rc<RefCell<T>>) -> Option<Rc<RefCell<T>>> {
        self.entries.insert(id, handle)
    }

    /// Removes and returns the handle cached under `id`.
    pub fn evict(&mut self, id: i64) -> Option<Rc<RefCell<T>>> {
        self.entries.remove(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drops every cached handle. Handles held by callers stay valid.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::IdentityMap;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn get_returns_same_allocation() {
        let mut map = IdentityMap::new();
        let handle = Rc::new(RefCell::new("first"));
        assert!(map.insert(1, Rc::clone(&handle)).is_none());

        let cached = map.get(1).expect("id 1 should be cached");
        assert!(Rc::ptr_eq(&cached, &handle));
        assert!(map.get(2).is_none());
    }

    #[test]
    fn evict_and_clear_release_entries() {
        let mut map = IdentityMap::new();
        map.insert(3, Rc::new(RefCell::new(30)));
        map.insert(1, Rc::new(RefCell::new(10)));
        assert_eq!(map.len(), 2);

        let evicted = map.evict(3).expect("id 3 should be evicted");
        assert_eq!(*evicted.borrow(), 30);
        assert!(map.get(3).is_none());
        assert!(map.evict(3).is_none());

        map.clear();
        assert!(map.is_empty());
        assert_eq!(map.len(), 0);
    }
}
