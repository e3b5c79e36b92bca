/// Finalization mix of [MurmurHash3][murmur3].
///
/// Every input bit affects every output bit, which keeps the low bits of
/// combined hashes usable as bucket indices.
///
/// [murmur3]: https://github.com/aappleby/smhasher/wiki/MurmurHash3
pub fn fmix64(mut k: u64) -> u64 {
    k ^= k >> 33;
    k = k.wrapping_mul(0xff51afd7ed558ccd);
    k ^= k >> 33;
    k = k.wrapping_mul(0xc4ceb9fe1a85ec53);
    k ^= k >> 33;
    k
}

/// Fold `value` into the running hash `seed`.
///
/// ```text
/// seed ^ (mix(value) + φ + (seed << 6) + (seed >> 2))
/// ```
///
/// The combination is order-sensitive: `combine(combine(s, a), b)` and
/// `combine(combine(s, b), a)` differ in general.
pub fn hash_combine(seed: u64, value: u64) -> u64 {
    seed ^ fmix64(value)
        .wrapping_add(0x9e3779b97f4a7c15)
        .wrapping_add(seed << 6)
        .wrapping_add(seed >> 2)
}

/// Hash of a pair of `u64` values.
pub fn hash_pair(a: u64, b: u64) -> u64 {
    hash_combine(fmix64(a), b)
}

pub trait StructuralHash {
    /// Hash of the structure, consistent with structural equality.
    fn structural_hash(&self) -> u64;
}

impl StructuralHash for bool {
    fn structural_hash(&self) -> u64 {
        hash_pair(0, *self as u64)
    }
}

impl StructuralHash for i32 {
    fn structural_hash(&self) -> u64 {
        hash_pair(1, *self as i64 as u64)
    }
}
