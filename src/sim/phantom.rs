//! Per-pass storage for phantom bodies
//!
//! Wall contacts are resolved against short-lived phantom bodies. They live
//! here for one refinement pass and are dropped together when the pass ends,
//! so the stepper never holds one past the call that created it.

use super::body::Body;

/// Index of a phantom in the current pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhantomHandle(usize);

#[derive(Debug, Default)]
pub struct PhantomArena {
    bodies: Vec<Body>,
}

impl PhantomArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a phantom until the next [`clear`](Self::clear)
    pub fn spawn(&mut self, body: Body) -> PhantomHandle {
        debug_assert!(body.is_phantom(), "only phantom bodies belong in the arena");
        self.bodies.push(body);
        PhantomHandle(self.bodies.len() - 1)
    }

    pub fn get(&self, handle: PhantomHandle) -> Option<&Body> {
        self.bodies.get(handle.0)
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    /// Release every phantom. Capacity is kept for the next pass.
    pub fn clear(&mut self) {
        self.bodies.clear();
    }
}
