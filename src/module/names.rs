//! Class-name allocation.
//!
//! Tokens are the marker character `ͼ` (U+037C) followed by the base-36
//! encoding of a counter that starts at 1 and only ever increases. The marker
//! keeps generated names apart from hand-written class names.

use std::sync::atomic::{AtomicU64, Ordering};

/// Prefix of every generated class token.
pub const MARKER: char = '\u{037c}';

static GLOBAL: NameAllocator = NameAllocator::new();

/// A monotonically increasing class-name generator.
///
/// The process-wide instance is [`NameAllocator::global`]. Separate instances
/// are useful in tests that need predictable names; two instances can hand
/// out the same token, so a process should only mount modules from one.
#[derive(Debug)]
pub struct NameAllocator {
    next: AtomicU64,
}

impl NameAllocator {
    /// Create an allocator whose first token is `ͼ1`.
    pub const fn new() -> Self {
        Self {
            next: AtomicU64::new(1),
        }
    }

    /// The process-wide allocator.
    pub fn global() -> &'static NameAllocator {
        &GLOBAL
    }

    /// Allocate the next class token.
    pub fn next_name(&self) -> String {
        let id = self.next.fetch_add(1, Ordering::Relaxed);
        format!("{MARKER}{}", to_base36(id))
    }

    /// Rewind to the first token. Only for test isolation.
    #[cfg(any(test, feature = "test-util"))]
    pub fn reset(&self) {
        self.next.store(1, Ordering::Relaxed);
    }
}

impl Default for NameAllocator {
    fn default() -> Self {
        Self::new()
    }
}

/// Lower-case base-36 encoding.
pub fn to_base36(mut n: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if n == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while n > 0 {
        digits.push(char::from(DIGITS[(n % 36) as usize]));
        n /= 36;
    }
    digits.iter().rev().collect()
}
