//! Stack growth for deep AST recursion.
//!
//! Extraction, type inference and emission all recurse on the shape of the
//! tree. A long chain like `a + b + c + ...` or deeply nested blocks can
//! exceed the default thread stack, so every recursive walker runs its
//! per-node step through [`ensure_sufficient_stack`].
//!
//! On native targets the `stacker` crate allocates a fresh segment when less
//! than [`RED_ZONE`] bytes remain. On `wasm32` the call is a passthrough.

/// Remaining stack below which a new segment is allocated.
const RED_ZONE: usize = 128 * 1024;

/// Size of each newly allocated stack segment.
const SEGMENT_SIZE: usize = 2 * 1024 * 1024;

/// Run `f`, growing the stack first if it is nearly exhausted.
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, SEGMENT_SIZE, f)
}

#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}
