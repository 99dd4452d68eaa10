//! Space - Bump Pointer Address Assignment
//!
//! Each generation owns one address window. Addresses are handed out by a
//! bump cursor; capacity is tracked separately as live bytes so that the
//! non-moving mature space can reuse capacity freed by a full pass even
//! though it never reuses addresses.

use crate::error::{GcError, Result};
use crate::object::{Zone, OBJECT_ALIGNMENT};

/// Base address of the young window
pub const YOUNG_BASE: usize = 0x0000_1000_0000_0000;
/// Base address of the mature window
pub const MATURE_BASE: usize = 0x0000_2000_0000_0000;
/// Size of each address window
pub const WINDOW_SIZE: usize = 1 << 40;

/// One generation's address window and capacity
#[derive(Debug)]
pub struct Space {
    zone: Zone,
    base: usize,
    top: usize,
    capacity: usize,
    used: usize,
}

impl Space {
    pub fn new(zone: Zone, capacity: usize) -> Self {
        let base = match zone {
            Zone::Young => YOUNG_BASE,
            Zone::Mature => MATURE_BASE,
        };
        Self {
            zone,
            base,
            top: base,
            capacity,
            used: 0,
        }
    }

    /// Reserve `size` bytes and return the new object's address
    pub fn allocate(&mut self, size: usize) -> Result<usize> {
        let aligned = (size + OBJECT_ALIGNMENT - 1) & !(OBJECT_ALIGNMENT - 1);

        if self.used + aligned > self.capacity {
            return Err(GcError::OutOfMemory {
                requested: size,
                available: self.capacity - self.used,
            });
        }

        let new_top = self.top + aligned;
        if new_top > self.base + WINDOW_SIZE {
            return Err(GcError::OutOfMemory {
                requested: size,
                available: (self.base + WINDOW_SIZE).saturating_sub(self.top),
            });
        }

        let address = self.top;
        self.top = new_top;
        self.used += aligned;
        Ok(address)
    }

    /// Return capacity of a freed or moved object
    pub fn release(&mut self, size: usize) {
        let aligned = (size + OBJECT_ALIGNMENT - 1) & !(OBJECT_ALIGNMENT - 1);
        self.used = self.used.saturating_sub(aligned);
    }

    /// Rewind the cursor; only valid once the space holds no objects
    pub fn reset(&mut self) {
        self.top = self.base;
        self.used = 0;
    }

    #[inline]
    pub fn contains(&self, address: usize) -> bool {
        address >= self.base && address < self.base + WINDOW_SIZE
    }

    pub fn zone(&self) -> Zone {
        self.zone
    }

    pub fn used(&self) -> usize {
        self.used
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn available(&self) -> usize {
        self.capacity - self.used
    }
}
