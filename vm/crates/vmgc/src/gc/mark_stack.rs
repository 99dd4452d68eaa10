//! Mark Stack - Pending Scan Work
//!
//! Objects a collector variant decided to keep but whose slots have not
//! been visited yet. The engine drains it depth first after every root
//! category, so no category starts before the previous one is fully traced.

use crate::object::ObjectRef;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct MarkStack {
    stack: Mutex<Vec<ObjectRef>>,
    pushed: AtomicU64,
}

impl MarkStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, obj: ObjectRef) {
        self.stack.lock().push(obj);
        self.pushed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn pop(&self) -> Option<ObjectRef> {
        self.stack.lock().pop()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.lock().is_empty()
    }

    pub fn len(&self) -> usize {
        self.stack.lock().len()
    }

    /// Objects pushed since the last reset
    pub fn pushed(&self) -> u64 {
        self.pushed.load(Ordering::Relaxed)
    }

    pub fn reset_counters(&self) {
        self.pushed.store(0, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lifo_order_and_counter() {
        let stack = MarkStack::new();
        stack.push(ObjectRef::from_address(0x10));
        stack.push(ObjectRef::from_address(0x20));

        assert_eq!(stack.len(), 2);
        assert_eq!(stack.pop(), Some(ObjectRef::from_address(0x20)));
        assert_eq!(stack.pop(), Some(ObjectRef::from_address(0x10)));
        assert!(stack.is_empty());
        assert_eq!(stack.pushed(), 2);

        stack.reset_counters();
        assert_eq!(stack.pushed(), 0);
    }
}
