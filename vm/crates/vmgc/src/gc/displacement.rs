//! Address Displacement
//!
//! A linear relocation rule for native addresses. Addresses inside
//! `[lower, upper)` move by `offset`; everything else is left alone.
//!
//! ```text
//!         lower                      upper
//!   ───────┼──────────────────────────┼───────▶ address
//!   as is  │  address + offset        │ as is
//! ```
//!
//! Frame walkers always take one of these. Walking a live stack passes the
//! identity displacement (`AddressDisplacement::default()`), walking a saved
//! fiber stack passes the rule that maps the fiber's original stack range
//! onto its saved copy.

/// Relocation rule for addresses in one range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AddressDisplacement {
    offset: isize,
    lower: usize,
    upper: usize,
}

impl AddressDisplacement {
    /// Displacement that changes nothing
    pub const IDENTITY: AddressDisplacement = AddressDisplacement {
        offset: 0,
        lower: 0,
        upper: 0,
    };

    pub fn new(offset: isize, lower: usize, upper: usize) -> Self {
        debug_assert!(lower <= upper, "empty displacement range {:#x}..{:#x}", lower, upper);
        Self {
            offset,
            lower,
            upper,
        }
    }

    /// Translate `address` if it lies inside the displaced range
    #[inline]
    pub fn displace(&self, address: usize) -> usize {
        if address < self.lower || address >= self.upper {
            address
        } else {
            address.wrapping_add_signed(self.offset)
        }
    }

    pub fn is_identity(&self) -> bool {
        self.offset == 0 || self.lower >= self.upper
    }

    pub fn offset(&self) -> isize {
        self.offset
    }

    pub fn lower(&self) -> usize {
        self.lower
    }

    pub fn upper(&self) -> usize {
        self.upper
    }
}
