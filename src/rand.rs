//! A minimal, dependency-free source of randomness used only to drive
//! [`Environment`](crate::environment::Environment)'s nondeterministic
//! evaluation mode (RFC 9535 permits, but never requires, object member
//! order to vary between evaluations).

use std::collections::hash_map::RandomState;
use std::hash::{BuildHasher, Hasher};

/// A small xorshift64 PRNG, reseeded from `RandomState` (which itself draws
/// OS randomness) on every construction.
pub(crate) struct Xorshift64(u64);

impl Xorshift64 {
    pub(crate) fn seeded() -> Self {
        let seed = RandomState::new().build_hasher().finish() | 1;
        Self(seed)
    }

    fn next_u64(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }

    fn next_below(&mut self, bound: usize) -> usize {
        if bound == 0 {
            return 0;
        }
        (self.next_u64() % bound as u64) as usize
    }
}

/// Shuffles `items` in place with a Fisher-Yates pass.
pub(crate) fn shuffle<T>(items: &mut [T]) {
    if items.len() < 2 {
        return;
    }
    let mut rng = Xorshift64::seeded();
    for i in (1..items.len()).rev() {
        let j = rng.next_below(i + 1);
        items.swap(i, j);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shuffle_is_a_permutation() {
        let mut items: Vec<u32> = (0..20).collect();
        let original = items.clone();
        shuffle(&mut items);
        let mut sorted = items.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, original);
    }
}
