//! Call Frames and Native Stacks
//!
//! The interpreter lays out its call frames on the native stack and links
//! each frame to its caller by address. The collector walks that chain, so
//! frames are modelled here by address: a [`NativeStack`] maps native
//! addresses to frames and to plain object cells (native locals referenced
//! from variable root buffers).
//!
//! A suspended fiber's stack is saved elsewhere; its frames keep linking to
//! their original addresses, and the walker translates each link with the
//! fiber's [`AddressDisplacement`](crate::gc::AddressDisplacement).

use crate::gc::AddressDisplacement;
use crate::object::ObjectRef;
use indexmap::IndexMap;

/// Frame flag: frame belongs to a lambda
pub const FRAME_LAMBDA: u32 = 1 << 0;
/// Frame flag: frame runs a block body
pub const FRAME_BLOCK: u32 = 1 << 1;
/// Frame flag: frame was pushed by native code
pub const FRAME_NATIVE: u32 = 1 << 2;
/// Frame flag: frame owns more than one variable scope
pub const FRAME_MULTIPLE_SCOPES: u32 = 1 << 3;

/// Locals of one method or block activation
#[derive(Debug, Clone, Default)]
pub struct StackVariables {
    pub self_value: ObjectRef,
    pub block: ObjectRef,
    pub module: ObjectRef,
    pub last_match: ObjectRef,
    pub locals: Vec<ObjectRef>,
    /// Enclosing heap `VariableScope`, null at a method's top level
    pub parent: ObjectRef,
    /// Heap copy made when a closure captured these locals, null otherwise
    pub on_heap: ObjectRef,
}

impl StackVariables {
    pub fn new(self_value: ObjectRef, locals: Vec<ObjectRef>) -> Self {
        Self {
            self_value,
            block: ObjectRef::NIL,
            module: ObjectRef::NIL,
            last_match: ObjectRef::NIL,
            locals,
            parent: ObjectRef::NULL,
            on_heap: ObjectRef::NULL,
        }
    }
}

/// One interpreter activation
#[derive(Debug, Clone, Default)]
pub struct CallFrame {
    /// Native address of the caller's frame
    pub previous: Option<usize>,
    pub flags: u32,
    pub ip: usize,
    pub compiled_code: ObjectRef,
    pub lexical_scope: ObjectRef,
    /// Heap scope of the enclosing method when this frame runs a block
    pub top_scope: ObjectRef,
    pub arguments: Vec<ObjectRef>,
    /// Operand stack
    pub stack: Vec<ObjectRef>,
    pub scope: Option<StackVariables>,
}

impl CallFrame {
    pub fn new(compiled_code: ObjectRef, lexical_scope: ObjectRef) -> Self {
        Self {
            compiled_code,
            lexical_scope,
            ..Default::default()
        }
    }

    pub fn is_lambda(&self) -> bool {
        self.flags & FRAME_LAMBDA != 0
    }

    pub fn is_block(&self) -> bool {
        self.flags & FRAME_BLOCK != 0
    }

    pub fn is_native(&self) -> bool {
        self.flags & FRAME_NATIVE != 0
    }
}

/// Frames and object cells keyed by native address
#[derive(Debug, Clone, Default)]
pub struct NativeStack {
    frames: IndexMap<usize, CallFrame>,
    cells: IndexMap<usize, ObjectRef>,
    top: Option<usize>,
}

impl NativeStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push `frame` at `address`, linking it to the current top
    pub fn push_frame(&mut self, address: usize, mut frame: CallFrame) {
        frame.previous = self.top;
        self.frames.insert(address, frame);
        self.top = Some(address);
    }

    /// Pop the top frame
    pub fn pop_frame(&mut self) -> Option<CallFrame> {
        let address = self.top?;
        let frame = self.frames.shift_remove(&address)?;
        self.top = frame.previous;
        Some(frame)
    }

    pub fn top(&self) -> Option<usize> {
        self.top
    }

    pub fn frame(&self, address: usize) -> Option<&CallFrame> {
        self.frames.get(&address)
    }

    pub fn frame_mut(&mut self, address: usize) -> Option<&mut CallFrame> {
        self.frames.get_mut(&address)
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    pub fn set_cell(&mut self, address: usize, value: ObjectRef) {
        self.cells.insert(address, value);
    }

    pub fn cell(&self, address: usize) -> Option<ObjectRef> {
        self.cells.get(&address).copied()
    }

    pub fn cell_mut(&mut self, address: usize) -> Option<&mut ObjectRef> {
        self.cells.get_mut(&address)
    }

    /// Copy of this stack saved at a displaced location
    ///
    /// Frames and cells are rekeyed by `displacement`; links inside frames
    /// and the top address keep their original values, exactly like a raw
    /// copy of stack memory.
    pub fn saved_copy(&self, displacement: &AddressDisplacement) -> NativeStack {
        if displacement.is_identity() {
            return self.clone();
        }
        NativeStack {
            frames: self
                .frames
                .iter()
                .map(|(address, frame)| (displacement.displace(*address), frame.clone()))
                .collect(),
            cells: self
                .cells
                .iter()
                .map(|(address, value)| (displacement.displace(*address), *value))
                .collect(),
            top: self.top,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_links_previous() {
        let mut stack = NativeStack::new();
        stack.push_frame(0x7000, CallFrame::default());
        stack.push_frame(0x6f00, CallFrame::default());

        assert_eq!(stack.top(), Some(0x6f00));
        assert_eq!(stack.frame(0x6f00).unwrap().previous, Some(0x7000));
        assert!(stack.pop_frame().is_some());
        assert_eq!(stack.top(), Some(0x7000));
    }

    #[test]
    fn test_saved_copy_rekeys_but_keeps_links() {
        let mut stack = NativeStack::new();
        stack.push_frame(0x7000, CallFrame::default());
        stack.push_frame(0x6f00, CallFrame::default());
        stack.set_cell(0x6e00, ObjectRef::TRUE);

        let displacement = AddressDisplacement::new(0x1000_0000, 0x6000, 0x8000);
        let copy = stack.saved_copy(&displacement);

        assert!(copy.frame(0x6f00).is_none());
        let top = copy.frame(0x1000_6f00).unwrap();
        assert_eq!(top.previous, Some(0x7000));
        assert_eq!(copy.top(), Some(0x6f00));
        assert_eq!(copy.cell(0x1000_6e00), Some(ObjectRef::TRUE));
    }

    #[test]
    fn test_identity_copy_keeps_addresses() {
        let mut stack = NativeStack::new();
        stack.push_frame(0x7000, CallFrame::default());
        stack.set_cell(0x6e00, ObjectRef::TRUE);

        // Empty range moves nothing even with an offset
        for displacement in [
            AddressDisplacement::IDENTITY,
            AddressDisplacement::new(0x1000_0000, 0x6000, 0x6000),
        ] {
            let copy = stack.saved_copy(&displacement);
            assert!(copy.frame(0x7000).is_some());
            assert_eq!(copy.cell(0x6e00), Some(ObjectRef::TRUE));
            assert_eq!(copy.frame_count(), 1);
        }
    }
}
