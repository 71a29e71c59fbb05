//! Stack growth guard for recursive element-tree walks.
//!
//! Generation dispatch, dependency identification and value-type inference
//! all recurse once per level of document nesting. A pathologically deep
//! document (thousands of nested groupings) would otherwise overflow the
//! thread stack, so every recursive entry point goes through
//! [`ensure_sufficient_stack`].
//!
//! - **Native targets**: `stacker` grows the stack on demand.
//! - **WASM targets**: plain call (the runtime manages its own stack).

/// If less than this remains, a new stack segment is allocated.
const RED_ZONE: usize = 100 * 1024;

/// Size of each freshly allocated stack segment.
const STACK_PER_RECURSION: usize = 1024 * 1024;

/// Run `f`, growing the stack first when the remaining space is below the
/// red zone.
///
/// ```text
/// fn dispatch(&mut self, id: ElementId) -> Result<(), GenerationError> {
///     ensure_sufficient_stack(|| {
///         // ... look up translator, recurse into children ...
///     })
/// }
/// ```
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}

/// WASM version: call straight through.
#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}
