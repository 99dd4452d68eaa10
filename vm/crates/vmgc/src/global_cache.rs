//! Global Method Cache
//!
//! Maps (receiver class, method name) to the module that defined the method
//! and the method object itself. Entries hold plain object words, so the
//! collector has to drop entries naming dead objects after a full pass and
//! rewrite entries naming promoted objects after a young pass.

use crate::object::ObjectRef;
use indexmap::IndexMap;
use parking_lot::Mutex;

/// Cache key: receiver class and method name symbol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub klass: ObjectRef,
    pub name: u32,
}

/// Cached lookup result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheEntry {
    pub module: ObjectRef,
    pub method: ObjectRef,
}

#[derive(Debug, Default)]
pub struct GlobalCache {
    entries: Mutex<IndexMap<CacheKey, CacheEntry>>,
}

impl GlobalCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, klass: ObjectRef, name: u32, module: ObjectRef, method: ObjectRef) {
        self.entries
            .lock()
            .insert(CacheKey { klass, name }, CacheEntry { module, method });
    }

    pub fn lookup(&self, klass: ObjectRef, name: u32) -> Option<CacheEntry> {
        self.entries.lock().get(&CacheKey { klass, name }).copied()
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Drop every entry naming an object `live` rejects
    ///
    /// Immediates are always live. Returns the number of dropped entries.
    pub fn prune<F>(&self, mut live: F) -> usize
    where
        F: FnMut(ObjectRef) -> bool,
    {
        let mut check = |obj: ObjectRef| !obj.reference_p() || live(obj);
        let mut entries = self.entries.lock();
        let before = entries.len();
        entries.retain(|key, entry| check(key.klass) && check(entry.module) && check(entry.method));
        before - entries.len()
    }

    /// Rewrite every object word through `update`
    ///
    /// Keys are rebuilt, so two keys collapsing onto one keep the later entry.
    pub fn update_references<F>(&self, mut update: F)
    where
        F: FnMut(ObjectRef) -> ObjectRef,
    {
        let mut entries = self.entries.lock();
        let rebuilt: IndexMap<CacheKey, CacheEntry> = entries
            .drain(..)
            .map(|(key, entry)| {
                (
                    CacheKey {
                        klass: update(key.klass),
                        name: key.name,
                    },
                    CacheEntry {
                        module: update(entry.module),
                        method: update(entry.method),
                    },
                )
            })
            .collect();
        *entries = rebuilt;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obj(address: usize) -> ObjectRef {
        ObjectRef::from_address(address)
    }

    #[test]
    fn test_prune_drops_dead_entries() {
        let cache = GlobalCache::new();
        cache.insert(obj(0x100), 1, obj(0x100), obj(0x200));
        cache.insert(obj(0x100), 2, obj(0x100), obj(0x300));

        let dropped = cache.prune(|o| o != obj(0x300));
        assert_eq!(dropped, 1);
        assert!(cache.lookup(obj(0x100), 1).is_some());
        assert!(cache.lookup(obj(0x100), 2).is_none());
    }

    #[test]
    fn test_update_references_rekeys() {
        let cache = GlobalCache::new();
        cache.insert(obj(0x100), 1, obj(0x100), obj(0x200));
        cache.update_references(|o| if o == obj(0x100) { obj(0x900) } else { o });

        let entry = cache.lookup(obj(0x900), 1).unwrap();
        assert_eq!(entry.module, obj(0x900));
        assert_eq!(entry.method, obj(0x200));
        assert!(cache.lookup(obj(0x100), 1).is_none());
    }
}
