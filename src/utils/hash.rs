use std::collections::{HashMap, HashSet};
use std::hash::{BuildHasherDefault, Hash, Hasher};

use byteorder::{ByteOrder, LittleEndian};

/// A `HashMap` using the non-cryptographic `FxHasher`. Keys in this crate are
/// identities and names produced in-process, so HashDoS is not a concern.
pub type FastHashMap<K, V> = HashMap<K, V, BuildHasherDefault<FxHasher>>;

/// A `HashSet` using the non-cryptographic `FxHasher`.
pub type FastHashSet<K> = HashSet<K, BuildHasherDefault<FxHasher>>;

const SEED: u64 = 0x51_7c_c1_b7_27_22_0a_95;

/// The hash algorithm used by rustc. It consumes the input word by word, which makes
/// it fast and, unlike `RandomState`, stable across runs.
#[derive(Debug, Default, Clone, Copy)]
pub struct FxHasher {
    hash: u64,
}

impl FxHasher {
    #[inline]
    fn add_to_hash(&mut self, word: u64) {
        self.hash = (self.hash.rotate_left(5) ^ word).wrapping_mul(SEED);
    }
}

impl Hasher for FxHasher {
    fn write(&mut self, bytes: &[u8]) {
        let mut chunks = bytes.chunks_exact(8);
        for chunk in &mut chunks {
            self.add_to_hash(LittleEndian::read_u64(chunk));
        }

        let remainder = chunks.remainder();
        if !remainder.is_empty() {
            let mut buf = [0; 8];
            buf[..remainder.len()].copy_from_slice(remainder);
            self.add_to_hash(LittleEndian::read_u64(&buf));
        }
    }

    #[inline]
    fn write_u8(&mut self, i: u8) {
        self.add_to_hash(u64::from(i));
    }

    #[inline]
    fn write_u32(&mut self, i: u32) {
        self.add_to_hash(u64::from(i));
    }

    #[inline]
    fn write_u64(&mut self, i: u64) {
        self.add_to_hash(i);
    }

    #[inline]
    fn write_usize(&mut self, i: usize) {
        self.add_to_hash(i as u64);
    }

    #[inline]
    fn finish(&self) -> u64 {
        self.hash
    }
}

/// Hashes `t` with `FxHasher`.
pub fn hash<T: Hash + ?Sized>(t: &T) -> u64 {
    let mut s = FxHasher::default();
    t.hash(&mut s);
    s.finish()
}

/// Folds the 64-bits hash of `t` into 32 bits.
pub fn hash32<T: Hash + ?Sized>(t: &T) -> u32 {
    let v = hash(t);
    (v ^ (v >> 32)) as u32
}
