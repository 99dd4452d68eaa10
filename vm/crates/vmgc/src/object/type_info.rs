//! Type Info - Per-type slot layout
//!
//! The collector never interprets object bodies on its own: it asks the
//! object's type which slots hold strong references. Types that hold no
//! references (byte arrays) are skipped, and the referent slot of a weak
//! reference is deliberately left out so it never keeps its target alive.

use std::ops::Range;

/// Object type tag stored in the header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
pub enum ObjectType {
    /// Plain object: slot 0 is the class, the rest are instance variables
    Object,
    /// Fixed-size array of references
    Tuple,
    /// Raw bytes, no references
    ByteArray,
    /// Weak reference: slot 0 is the referent and is not traced
    WeakRef,
    /// Class or module: superclass, constant table, method table
    Module,
    /// Lexical scope: module, parent lexical scope
    LexicalScope,
    /// Heap variable scope: parent, self, block, module, locals...
    VariableScope,
    /// Object wrapping native data that must be released on deletion
    Data,
}

impl ObjectType {
    /// Slots holding strong references for an object with `slot_count` slots
    pub fn strong_slots(self, slot_count: usize) -> Range<usize> {
        match self {
            ObjectType::ByteArray => 0..0,
            ObjectType::WeakRef => slot_count.min(WeakRefLayout::FIRST_STRONG)..slot_count,
            _ => 0..slot_count,
        }
    }

    /// Whether deleting an object of this type must release native resources
    pub fn requires_cleanup(self) -> bool {
        matches!(self, ObjectType::Data)
    }

    pub fn name(self) -> &'static str {
        match self {
            ObjectType::Object => "Object",
            ObjectType::Tuple => "Tuple",
            ObjectType::ByteArray => "ByteArray",
            ObjectType::WeakRef => "WeakRef",
            ObjectType::Module => "Module",
            ObjectType::LexicalScope => "LexicalScope",
            ObjectType::VariableScope => "VariableScope",
            ObjectType::Data => "Data",
        }
    }
}

/// Slot indices of a `WeakRef`
pub struct WeakRefLayout;

impl WeakRefLayout {
    pub const REFERENT: usize = 0;
    pub const FIRST_STRONG: usize = 1;
}

/// Slot indices of a heap `VariableScope`
pub struct VariableScopeLayout;

impl VariableScopeLayout {
    pub const PARENT: usize = 0;
    pub const SELF: usize = 1;
    pub const BLOCK: usize = 2;
    pub const MODULE: usize = 3;
    pub const FIRST_LOCAL: usize = 4;
}

/// Slot indices of a `LexicalScope`
pub struct LexicalScopeLayout;

impl LexicalScopeLayout {
    pub const MODULE: usize = 0;
    pub const PARENT: usize = 1;
}
