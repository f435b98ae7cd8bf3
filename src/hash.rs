use core::hash::BuildHasher;
use core::hash::Hasher;

#[inline(always)]
fn mix(state: u32, byte: u8) -> u32 {
    // state * 8719 + byte, spelled as shifts.
    (byte as u32)
        .wrapping_add(state << 13)
        .wrapping_add(state << 9)
        .wrapping_add(state << 4)
        .wrapping_sub(state)
}

#[inline(always)]
fn avalanche(mut state: u32) -> u32 {
    state = state.wrapping_add(state << 3);
    state ^= state >> 11;
    state.wrapping_add(state << 15)
}

/// Computes the 32-bit shift-add digest of `bytes`.
///
/// Every byte is folded into an accumulator (`h = h * 8719 + byte`), then a
/// fixed three-step shift/xor/add finisher spreads the high bits. The result
/// depends only on the content and length of `bytes`.
///
/// This is not a cryptographic hash and offers no resistance to chosen-key
/// collisions.
///
/// # Examples
///
/// ```rust
/// use linear_hash::hash::hash_bytes;
///
/// assert_eq!(hash_bytes(b""), 0);
/// assert_eq!(hash_bytes(b"a"), 28_607_337);
/// assert_eq!(hash_bytes(b"hello"), hash_bytes(b"hello"));
/// ```
#[inline]
pub fn hash_bytes(bytes: &[u8]) -> u32 {
    avalanche(bytes.iter().fold(0, |state, &byte| mix(state, byte)))
}

/// A streaming [`Hasher`] computing the same digest as [`hash_bytes`].
///
/// Feeding a byte span through [`Hasher::write`] in one or several calls
/// yields `hash_bytes` of the concatenation, widened to `u64`. Hashing
/// values through [`core::hash::Hash`] adds whatever framing their `Hash`
/// impl writes (slices, for instance, prefix their length).
#[derive(Debug, Clone, Copy, Default)]
pub struct ShiftAddHasher {
    state: u32,
}

impl ShiftAddHasher {
    /// Creates a hasher whose accumulator starts at `seed`.
    pub fn with_seed(seed: u32) -> Self {
        Self { state: seed }
    }
}

impl Hasher for ShiftAddHasher {
    #[inline]
    fn finish(&self) -> u64 {
        avalanche(self.state) as u64
    }

    #[inline]
    fn write(&mut self, bytes: &[u8]) {
        self.state = bytes.iter().fold(self.state, |state, &byte| mix(state, byte));
    }
}

/// [`BuildHasher`] for [`ShiftAddHasher`].
///
/// The default builder is unseeded and reproduces [`hash_bytes`] exactly. A
/// seed only perturbs the starting accumulator; it does not make the hash
/// collision resistant.
///
/// # Examples
///
/// ```rust
/// use core::hash::BuildHasher;
/// use core::hash::Hasher;
///
/// use linear_hash::hash::ShiftAddBuildHasher;
/// use linear_hash::hash::hash_bytes;
///
/// let mut hasher = ShiftAddBuildHasher::default().build_hasher();
/// hasher.write(b"hello");
/// assert_eq!(hasher.finish(), hash_bytes(b"hello") as u64);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ShiftAddBuildHasher {
    seed: u32,
}

impl ShiftAddBuildHasher {
    /// Creates a builder whose hashers start from `seed`.
    pub fn with_seed(seed: u32) -> Self {
        Self { seed }
    }
}

impl BuildHasher for ShiftAddBuildHasher {
    type Hasher = ShiftAddHasher;

    fn build_hasher(&self) -> Self::Hasher {
        ShiftAddHasher::with_seed(self.seed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_digests() {
        assert_eq!(hash_bytes(b""), 0);
        assert_eq!(hash_bytes(b"a"), 28_607_337);
        assert_eq!(hash_bytes(b"ab"), 327_296_540);
        assert_eq!(hash_bytes(b"hello"), 702_849_442);
    }

    #[test]
    fn zero_bytes_collide_across_lengths() {
        // The digest of all-zero spans is zero regardless of length, which is
        // why key equality must still compare lengths.
        assert_eq!(hash_bytes(&[0]), 0);
        assert_eq!(hash_bytes(&[0, 0]), 0);
    }

    #[test]
    fn streaming_matches_one_shot() {
        let mut hasher = ShiftAddHasher::default();
        hasher.write(b"hel");
        hasher.write(b"lo");
        assert_eq!(hasher.finish(), hash_bytes(b"hello") as u64);
    }

    #[test]
    fn seed_changes_digest() {
        let unseeded = ShiftAddBuildHasher::default().hash_one(42u64);
        let seeded = ShiftAddBuildHasher::with_seed(0x9e37_79b9).hash_one(42u64);
        assert_ne!(unseeded, seeded);
        assert_eq!(unseeded, ShiftAddBuildHasher::with_seed(0).hash_one(42u64));
    }

    #[test]
    fn finish_does_not_consume_state() {
        let mut hasher = ShiftAddHasher::default();
        hasher.write(b"abc");
        assert_eq!(hasher.finish(), hasher.finish());
    }
}
