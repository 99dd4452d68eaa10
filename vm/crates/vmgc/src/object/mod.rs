//! Object Module - GC Object Model
//!
//! Tagged object words, the header carried by every heap object, and the
//! per-type slot layouts the tracer follows.

pub mod header;
pub mod reference;
pub mod type_info;

pub use header::{ObjectHeader, Zone, HEADER_SIZE, OBJECT_ALIGNMENT};
pub use reference::ObjectRef;
pub use type_info::{LexicalScopeLayout, ObjectType, VariableScopeLayout, WeakRefLayout};

/// A heap resident object: header, reference slots and raw payload
#[derive(Debug, Clone)]
pub struct HeapObject {
    pub header: ObjectHeader,
    pub slots: Vec<ObjectRef>,
    pub bytes: Vec<u8>,
}

impl HeapObject {
    pub fn new(object_type: ObjectType, zone: Zone, slots: Vec<ObjectRef>, bytes: Vec<u8>) -> Self {
        Self {
            header: ObjectHeader::new(object_type, zone),
            slots,
            bytes,
        }
    }

    /// Footprint in bytes, rounded to the object alignment
    pub fn size(&self) -> usize {
        object_size(self.slots.len(), self.bytes.len())
    }

    pub fn object_type(&self) -> ObjectType {
        self.header.object_type
    }
}

/// Footprint of an object with the given slot count and payload length
pub fn object_size(slot_count: usize, byte_len: usize) -> usize {
    let raw = HEADER_SIZE + slot_count * std::mem::size_of::<usize>() + byte_len;
    (raw + OBJECT_ALIGNMENT - 1) & !(OBJECT_ALIGNMENT - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_size_aligned() {
        assert_eq!(object_size(0, 0), HEADER_SIZE);
        assert_eq!(object_size(2, 0), HEADER_SIZE + 16);
        assert_eq!(object_size(0, 3) % OBJECT_ALIGNMENT, 0);
    }
}
