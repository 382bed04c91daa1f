//! Generation tokens: a session-wide counter bumped whenever in-flight
//! work must be abandoned. Work started under an older token notices the
//! mismatch and drops its result.

use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GenerationToken(u64);

impl GenerationToken {
    pub fn value(self) -> u64 {
        self.0
    }
}

/// Cheap to clone; clones share the counter.
#[derive(Debug, Clone, Default)]
pub struct GenerationCounter(Arc<AtomicU64>);

impl GenerationCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Invalidates every outstanding token and hands out a fresh one.
    pub fn begin(&self) -> GenerationToken {
        GenerationToken(self.0.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Invalidates every outstanding token.
    pub fn invalidate(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }

    pub fn is_current(&self, token: GenerationToken) -> bool {
        self.0.load(Ordering::SeqCst) == token.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn begin_supersedes_older_tokens() {
        let counter = GenerationCounter::new();
        let first = counter.begin();
        assert!(counter.is_current(first));

        let second = counter.clone().begin();
        assert!(!counter.is_current(first));
        assert!(counter.is_current(second));
        assert_eq!(second.value(), first.value() + 1);

        counter.invalidate();
        assert!(!counter.is_current(second));
    }
}
