//! Stack growth for deeply nested expressions.
//!
//! Both the parser and the evaluator descend once per nesting level, so an
//! input such as `((((...))))` or `-(-(-(...)))` can go deeper than the
//! thread's stack allows. Every recursive entry point wraps its body in
//! [`ensure_sufficient_stack`].

/// Grow when less than this much stack remains (100KB).
const RED_ZONE: usize = 100 * 1024;

/// Size of each newly allocated stack segment (1MB).
const SEGMENT: usize = 1024 * 1024;

/// Run `f`, first moving to a fresh stack segment if the current one is
/// nearly exhausted.
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, SEGMENT, f)
}

/// WASM manages its own stack.
#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn depth(n: u64) -> u64 {
        ensure_sufficient_stack(|| if n == 0 { 0 } else { depth(n - 1) + 1 })
    }

    #[test]
    fn test_passes_result_through() {
        let ok: Result<u8, &str> = ensure_sufficient_stack(|| Ok(7));
        assert_eq!(ok, Ok(7));
        assert_eq!(depth(3), 3);
    }

    #[test]
    fn test_deep_nesting_does_not_overflow() {
        assert_eq!(depth(200_000), 200_000);
    }
}
