//! Object References - Tagged Machine Words
//!
//! Every slot the collector looks at holds one machine word. The low three
//! bits decide what the word is:
//!
//! ```text
//! ┌──────────────────────────────────────────────┬─────┐
//! │                 payload                      │ tag │
//! └──────────────────────────────────────────────┴─────┘
//!   tag 000 (non-zero word) -> heap reference
//!   tag 001                 -> fixnum (payload = signed integer)
//!   tag 010                 -> special constant (nil, true, false, undef)
//!   tag 110                 -> symbol (payload = symbol id)
//!   word 0                  -> null
//! ```
//!
//! Only heap references are ever handed to a collector variant.

use std::fmt;

/// Mask covering the tag bits
pub const TAG_MASK: usize = 0b111;
/// Fixnum tag
pub const FIXNUM_TAG: usize = 0b001;
/// Special constant tag
pub const SPECIAL_TAG: usize = 0b010;
/// Symbol tag
pub const SYMBOL_TAG: usize = 0b110;

const TAG_BITS: u32 = 3;

const NIL_WORD: usize = (1 << TAG_BITS) | SPECIAL_TAG;
const TRUE_WORD: usize = (2 << TAG_BITS) | SPECIAL_TAG;
const FALSE_WORD: usize = (3 << TAG_BITS) | SPECIAL_TAG;
const UNDEF_WORD: usize = (4 << TAG_BITS) | SPECIAL_TAG;

/// A tagged object word: null, an immediate value or a heap reference
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
#[repr(transparent)]
pub struct ObjectRef(usize);

impl ObjectRef {
    /// The null word
    pub const NULL: ObjectRef = ObjectRef(0);
    /// nil
    pub const NIL: ObjectRef = ObjectRef(NIL_WORD);
    /// true
    pub const TRUE: ObjectRef = ObjectRef(TRUE_WORD);
    /// false
    pub const FALSE: ObjectRef = ObjectRef(FALSE_WORD);
    /// undef, the "no value passed" marker
    pub const UNDEF: ObjectRef = ObjectRef(UNDEF_WORD);

    /// Wrap a heap address
    ///
    /// The address must be word aligned so the tag bits stay clear.
    #[inline]
    pub fn from_address(address: usize) -> Self {
        debug_assert!(
            address & TAG_MASK == 0,
            "heap address {:#x} is not aligned",
            address
        );
        ObjectRef(address)
    }

    /// Rebuild a reference from a raw word
    #[inline]
    pub const fn from_raw(word: usize) -> Self {
        ObjectRef(word)
    }

    /// Encode a fixnum
    #[inline]
    pub fn fixnum(value: i64) -> Self {
        ObjectRef(((value << TAG_BITS) as usize) | FIXNUM_TAG)
    }

    /// Encode a symbol id
    #[inline]
    pub fn symbol(id: u32) -> Self {
        ObjectRef(((id as usize) << TAG_BITS) | SYMBOL_TAG)
    }

    /// Raw machine word
    #[inline]
    pub const fn raw(self) -> usize {
        self.0
    }

    /// Heap address, meaningful only for references
    #[inline]
    pub const fn address(self) -> usize {
        self.0
    }

    #[inline]
    pub const fn is_null(self) -> bool {
        self.0 == 0
    }

    /// True when the word names a heap object
    #[inline]
    pub const fn reference_p(self) -> bool {
        self.0 != 0 && self.0 & TAG_MASK == 0
    }

    #[inline]
    pub const fn fixnum_p(self) -> bool {
        self.0 & TAG_MASK == FIXNUM_TAG
    }

    #[inline]
    pub const fn symbol_p(self) -> bool {
        self.0 & TAG_MASK == SYMBOL_TAG
    }

    #[inline]
    pub const fn nil_p(self) -> bool {
        self.0 == NIL_WORD
    }

    /// Decoded fixnum value
    pub fn as_fixnum(self) -> Option<i64> {
        if self.fixnum_p() {
            Some((self.0 as i64) >> TAG_BITS)
        } else {
            None
        }
    }

    /// Decoded symbol id
    pub fn as_symbol(self) -> Option<u32> {
        if self.symbol_p() {
            Some((self.0 >> TAG_BITS) as u32)
        } else {
            None
        }
    }
}

impl fmt::Debug for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            write!(f, "null")
        } else if self.reference_p() {
            write!(f, "#<{:#x}>", self.0)
        } else if let Some(value) = self.as_fixnum() {
            write!(f, "{}", value)
        } else if let Some(id) = self.as_symbol() {
            write!(f, ":sym{}", id)
        } else {
            match self.0 {
                NIL_WORD => write!(f, "nil"),
                TRUE_WORD => write!(f, "true"),
                FALSE_WORD => write!(f, "false"),
                UNDEF_WORD => write!(f, "undef"),
                other => write!(f, "<word {:#x}>", other),
            }
        }
    }
}
