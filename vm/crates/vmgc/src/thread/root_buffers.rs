//! Root Buffers
//!
//! Native code pins objects in two ways:
//!
//! - A `RootBuffer` owns a small array of object slots (arguments collected
//!   by a native method, temporaries of a primitive).
//! - A `VariableRootBuffer` records the native addresses of local variables
//!   that live on the native stack. The collector reads and rewrites the
//!   variables through those addresses, so a suspended fiber's buffers have
//!   to be read through the fiber's displacement.

use crate::object::ObjectRef;

/// Slots owned by native code for the duration of a call
#[derive(Debug, Clone, Default)]
pub struct RootBuffer {
    pub name: Option<String>,
    pub slots: Vec<ObjectRef>,
}

impl RootBuffer {
    pub fn new(name: Option<&str>, slots: Vec<ObjectRef>) -> Self {
        Self {
            name: name.map(|s| s.to_string()),
            slots,
        }
    }
}

/// Stack of root buffers of one thread
#[derive(Debug, Clone, Default)]
pub struct RootBuffers {
    buffers: Vec<RootBuffer>,
}

impl RootBuffers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a buffer, returning its depth
    pub fn push(&mut self, buffer: RootBuffer) -> usize {
        self.buffers.push(buffer);
        self.buffers.len() - 1
    }

    pub fn pop(&mut self) -> Option<RootBuffer> {
        self.buffers.pop()
    }

    pub fn get(&self, depth: usize) -> Option<&RootBuffer> {
        self.buffers.get(depth)
    }

    pub fn iter(&self) -> impl Iterator<Item = &RootBuffer> {
        self.buffers.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut RootBuffer> {
        self.buffers.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.buffers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffers.is_empty()
    }
}

/// Native addresses of local variables holding objects
#[derive(Debug, Clone, Default)]
pub struct VariableRootBuffer {
    pub cells: Vec<usize>,
}

impl VariableRootBuffer {
    pub fn new(cells: Vec<usize>) -> Self {
        Self { cells }
    }
}

#[derive(Debug, Clone, Default)]
pub struct VariableRootBuffers {
    buffers: Vec<VariableRootBuffer>,
}

impl VariableRootBuffers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, buffer: VariableRootBuffer) {
        self.buffers.push(buffer);
    }

    pub fn pop(&mut self) -> Option<VariableRootBuffer> {
        self.buffers.pop()
    }

    pub fn iter(&self) -> impl Iterator<Item = &VariableRootBuffer> {
        self.buffers.iter()
    }

    /// Every recorded cell address, innermost buffer last
    pub fn cells(&self) -> impl Iterator<Item = usize> + '_ {
        self.buffers.iter().flat_map(|buffer| buffer.cells.iter().copied())
    }

    pub fn len(&self) -> usize {
        self.buffers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffers.is_empty()
    }
}
