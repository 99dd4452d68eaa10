//! Object Header - Metadata for GC-managed objects
//!
//! Object Header Layout (24 bytes on 64-bit):
//! ┌─────────────────────────────────────────┐
//! │  Type tag (4 bytes) │ Zone (4 bytes)    │
//! ├─────────────────────────────────────────┤
//! │         Mark Word (8 bytes)             │
//! │  - Bit 0: Marked                        │
//! │  - Bit 1: Remembered (write barrier)    │
//! │  - Bits 4-7: Age (passes survived)      │
//! ├─────────────────────────────────────────┤
//! │         Lock owner (8 bytes)            │  <- thread id, 0 = unlocked
//! └─────────────────────────────────────────┘

use super::ObjectType;

/// Size of object header in bytes
pub const HEADER_SIZE: usize = 24;

/// Minimum object alignment (bytes)
pub const OBJECT_ALIGNMENT: usize = 8;

/// Mark bit positions
pub const MARKED_BIT: usize = 0;
pub const REMEMBERED_BIT: usize = 1;
pub const AGE_SHIFT: usize = 4;

/// Masks for mark word fields
pub const MARKED_MASK: usize = 1 << MARKED_BIT;
pub const REMEMBERED_MASK: usize = 1 << REMEMBERED_BIT;
pub const AGE_MASK: usize = 0b1111 << AGE_SHIFT;

/// Maximum value the age field can hold
pub const MAX_AGE: u8 = 15;

/// Generation an object lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
pub enum Zone {
    Young,
    Mature,
}

/// Object Header
///
/// Every heap object starts with this header. The memory lock serializes
/// header access, so the mark word is a plain word.
#[derive(Debug, Clone)]
pub struct ObjectHeader {
    pub object_type: ObjectType,
    pub zone: Zone,
    pub mark_word: usize,
    /// Thread id of the lock holder, 0 when unlocked
    pub lock_owner: u64,
}

impl ObjectHeader {
    pub fn new(object_type: ObjectType, zone: Zone) -> Self {
        Self {
            object_type,
            zone,
            mark_word: 0,
            lock_owner: 0,
        }
    }

    // === Mark Bit Operations ===

    #[inline]
    pub fn is_marked(&self) -> bool {
        self.mark_word & MARKED_MASK != 0
    }

    /// Set the mark bit
    /// Returns true if bit was already set
    #[inline]
    pub fn set_marked(&mut self) -> bool {
        let was = self.is_marked();
        self.mark_word |= MARKED_MASK;
        was
    }

    #[inline]
    pub fn clear_mark(&mut self) {
        self.mark_word &= !MARKED_MASK;
    }

    // === Remembered Set ===

    #[inline]
    pub fn is_remembered(&self) -> bool {
        self.mark_word & REMEMBERED_MASK != 0
    }

    #[inline]
    pub fn set_remembered(&mut self, remembered: bool) {
        if remembered {
            self.mark_word |= REMEMBERED_MASK;
        } else {
            self.mark_word &= !REMEMBERED_MASK;
        }
    }

    // === Age ===

    #[inline]
    pub fn age(&self) -> u8 {
        ((self.mark_word & AGE_MASK) >> AGE_SHIFT) as u8
    }

    /// Bump the age, saturating at [`MAX_AGE`]
    #[inline]
    pub fn increment_age(&mut self) {
        let age = self.age().saturating_add(1).min(MAX_AGE) as usize;
        self.mark_word = (self.mark_word & !AGE_MASK) | (age << AGE_SHIFT);
    }

    // === Locking ===

    #[inline]
    pub fn is_locked(&self) -> bool {
        self.lock_owner != 0
    }
}
