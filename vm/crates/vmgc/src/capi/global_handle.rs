//! Global Handles
//!
//! A global handle pins an object for native code until it is explicitly
//! released. The location it guards is owned by native code; the collector
//! reads it as a root and writes the relocated address back into it.

use crate::object::ObjectRef;
use parking_lot::Mutex;
use std::sync::Arc;

/// A native-owned slot the collector treats as a root
pub type GlobalLocation = Arc<Mutex<ObjectRef>>;

/// One registered global handle location
#[derive(Debug)]
pub struct GlobalHandle {
    location: GlobalLocation,
    name: Option<String>,
}

impl GlobalHandle {
    pub fn location(&self) -> &GlobalLocation {
        &self.location
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn get(&self) -> ObjectRef {
        *self.location.lock()
    }
}

/// Every registered global handle location
#[derive(Debug, Default)]
pub struct GlobalHandles {
    locations: Mutex<Vec<Arc<GlobalHandle>>>,
}

impl GlobalHandles {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a native location
    pub fn register(&self, location: GlobalLocation, name: Option<&str>) -> Arc<GlobalHandle> {
        let handle = Arc::new(GlobalHandle {
            location,
            name: name.map(|s| s.to_string()),
        });
        self.locations.lock().push(handle.clone());
        handle
    }

    /// Release a location; its object is no longer pinned
    pub fn unregister(&self, handle: &Arc<GlobalHandle>) -> bool {
        let mut locations = self.locations.lock();
        let before = locations.len();
        locations.retain(|h| !Arc::ptr_eq(h, handle));
        locations.len() != before
    }

    pub fn handles(&self) -> Vec<Arc<GlobalHandle>> {
        self.locations.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.locations.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_and_unregister() {
        let globals = GlobalHandles::new();
        let slot: GlobalLocation = Arc::new(Mutex::new(ObjectRef::TRUE));
        let handle = globals.register(slot.clone(), Some("rb_cObject"));

        assert_eq!(globals.len(), 1);
        assert_eq!(handle.get(), ObjectRef::TRUE);
        assert_eq!(handle.name(), Some("rb_cObject"));

        *slot.lock() = ObjectRef::FALSE;
        assert_eq!(handle.get(), ObjectRef::FALSE);

        assert!(globals.unregister(&handle));
        assert!(!globals.unregister(&handle));
        assert!(globals.is_empty());
    }
}
