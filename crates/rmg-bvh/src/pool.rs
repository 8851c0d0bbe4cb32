//! Power-of-two-sized array cache keyed by size exponent (LIFO reuse).
//!
//! The quick list and the treelet collector's scratch buffers both lean on
//! this instead of allocating directly, so repeated insert/refit/collect
//! cycles do not churn the allocator.

const MAX_EXPONENT: u32 = 30;

/// Smallest `p` with `2^p >= max(1, n)`.
///
/// Computed with a single branchless bit-scan (`leading_zeros`), the
/// Rust-native equivalent of a de Bruijn bit-scan table.
#[must_use]
pub fn pool_index(n: usize) -> u32 {
    let m = n.max(1) as u64;
    let t = (m << 1) - 1;
    63 - t.leading_zeros()
}

/// A LIFO stack of previously returned power-of-two arrays, keyed by
/// exponent, falling back to fresh default-initialized allocation when a
/// stack is empty.
pub struct BufferPool<T> {
    stacks: Vec<Vec<Vec<T>>>,
    #[cfg(feature = "debug_checks")]
    outstanding: Vec<usize>,
}

impl<T: Default + Clone> Default for BufferPool<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Default + Clone> BufferPool<T> {
    /// Creates an empty pool (nothing cached yet for any exponent).
    #[must_use]
    pub fn new() -> Self {
        Self {
            stacks: (0..=MAX_EXPONENT).map(|_| Vec::new()).collect(),
            #[cfg(feature = "debug_checks")]
            outstanding: vec![0; (MAX_EXPONENT + 1) as usize],
        }
    }

    /// Pops a length-`2^p` array from the pool, or allocates a fresh
    /// default-initialized one if the stack for `p` is empty.
    ///
    /// # Panics
    /// Panics (debug builds only) if `p` exceeds the maximum supported
    /// exponent.
    #[must_use]
    pub fn take(&mut self, p: u32) -> Vec<T> {
        debug_assert!(p <= MAX_EXPONENT, "pool exponent {p} out of range");
        #[cfg(feature = "debug_checks")]
        {
            self.outstanding[p as usize] += 1;
        }
        self.stacks[p as usize]
            .pop()
            .unwrap_or_else(|| vec![T::default(); 1usize << p])
    }

    /// Returns `buf` to the pool at exponent `p` for later reuse.
    ///
    /// # Panics
    /// Panics (debug builds only) if `p` exceeds the maximum supported
    /// exponent, or if `buf.len() != 2^p`.
    pub fn release(&mut self, buf: Vec<T>, p: u32) {
        debug_assert!(p <= MAX_EXPONENT, "pool exponent {p} out of range");
        debug_assert_eq!(
            buf.len(),
            1usize << p,
            "returned array has the wrong length for its exponent"
        );
        #[cfg(feature = "debug_checks")]
        {
            self.outstanding[p as usize] = self.outstanding[p as usize].saturating_sub(1);
        }
        self.stacks[p as usize].push(buf);
    }

    /// Pushes fresh `2^p`-length arrays until the stack for `p` holds at
    /// least `k` entries.
    ///
    /// # Panics
    /// Panics (debug builds only) if `p` exceeds the maximum supported
    /// exponent.
    pub fn ensure_count(&mut self, p: u32, k: usize) {
        debug_assert!(p <= MAX_EXPONENT, "pool exponent {p} out of range");
        while self.stacks[p as usize].len() < k {
            self.stacks[p as usize].push(vec![T::default(); 1usize << p]);
        }
    }

    /// Drops every cached array across all exponents. Arrays currently
    /// taken-but-not-returned are unaffected.
    pub fn clear(&mut self) {
        for stack in &mut self.stacks {
            stack.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_index_matches_exact_powers_of_two() {
        for p in 0..=20u32 {
            assert_eq!(pool_index(1usize << p), p, "p = {p}");
        }
    }

    #[test]
    fn pool_index_rounds_up_past_a_power_of_two() {
        assert_eq!(pool_index((1usize << 10) + 1), 11);
    }

    #[test]
    fn pool_index_of_zero_and_one_is_zero() {
        assert_eq!(pool_index(0), 0);
        assert_eq!(pool_index(1), 0);
    }

    #[test]
    fn take_then_release_reuses_the_same_array_lifo() {
        let mut pool: BufferPool<u32> = BufferPool::new();
        let a = pool.take(5);
        let a_ptr = a.as_ptr();
        pool.release(a, 5);
        let b = pool.take(5);
        assert_eq!(b.as_ptr(), a_ptr);
    }

    #[test]
    fn ensure_count_tops_up_the_stack() {
        let mut pool: BufferPool<u32> = BufferPool::new();
        pool.ensure_count(3, 4);
        let mut taken = Vec::new();
        for _ in 0..4 {
            taken.push(pool.take(3));
        }
        assert_eq!(taken.len(), 4);
        assert!(taken.iter().all(|b| b.len() == 8));
    }

    #[test]
    fn clear_drops_cached_arrays() {
        let mut pool: BufferPool<u32> = BufferPool::new();
        let a = pool.take(4);
        pool.release(a, 4);
        pool.clear();
        let b = pool.take(4);
        assert_eq!(b, vec![0u32; 16]);
    }

    proptest::proptest! {
        #[test]
        fn pool_index_is_the_smallest_covering_exponent(n in 1usize..1_000_000) {
            let p = pool_index(n);
            proptest::prop_assert!((1usize << p) >= n);
            if p > 0 {
                proptest::prop_assert!((1usize << (p - 1)) < n);
            }
        }
    }
}
