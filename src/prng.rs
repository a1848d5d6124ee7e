//! Passphrase seeded pseudo random number generator.
//!
//! The generator is xoshiro128** over four 32 bit words. Seeding hashes the passphrase into a
//! single integer and expands it into the four words with a SplitMix32 style mixer, whose second
//! xor-shift uses 13 bits where the other two use 16.
//!
//! The key schedule is fixed: images watermarked with a passphrase can only be read back if the
//! exact same permutation is reproduced, so every step here must stay bit for bit identical.
//! In particular the multiply rounds of the mixer are evaluated in `f64` and the intermediate
//! reductions use a remainder by `2^32 - 1` (not `2^32`). Products above `2^53` round, that
//! rounding is part of the schedule.

use rand::{RngCore, SeedableRng};

/// Modulus of the seeding reductions.
const SEED_MODULUS: i64 = 4_294_967_295;

/// Increment of the SplitMix32 accumulator.
const GOLDEN_GAMMA: i64 = 0x9e37_79b9;

/// The complete generator state, copying it forks the stream.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct PrngState {
    pub a: u32,
    pub b: u32,
    pub c: u32,
    pub d: u32,
}

/// Anything the generator can be seeded from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Seed {
    /// Passphrase, hashed over its UTF-16 code units.
    Text(String),
    /// Integer seed.
    Number(i64),
    /// Explicit state, used verbatim.
    State(PrngState),
}

impl From<&str> for Seed {
    fn from(v: &str) -> Self {
        Seed::Text(v.to_owned())
    }
}

impl From<String> for Seed {
    fn from(v: String) -> Self {
        Seed::Text(v)
    }
}

impl From<i64> for Seed {
    fn from(v: i64) -> Self {
        Seed::Number(v)
    }
}

impl From<PrngState> for Seed {
    fn from(v: PrngState) -> Self {
        Seed::State(v)
    }
}

/// Reinterpret the low 32 bits as a signed integer.
fn to_int32(v: i64) -> i32 {
    v as u32 as i32
}

/// Rolling hash `hash * 31 + unit`, with the multiply done as a wrapping 32 bit shift.
pub fn hash_passphrase(s: &str) -> i64 {
    let mut hash: i64 = 0;
    for unit in s.encode_utf16() {
        let shifted = to_int32(hash).wrapping_shl(5) as i64;
        hash = (shifted - hash + unit as i64) % SEED_MODULUS;
    }
    hash
}

/// `z ^ (z >>> shift)` on the 32 bit pattern of `z`, yielding a signed value.
fn xor_shift(z: i64, shift: u32) -> i32 {
    to_int32(z) ^ ((z as u32) >> shift) as i32
}

/// One SplitMix32 step, advancing the accumulator and producing one state word.
fn split_mix_32(accumulator: &mut i64) -> u32 {
    *accumulator = (*accumulator + GOLDEN_GAMMA) % SEED_MODULUS;
    let modulus = SEED_MODULUS as f64;
    let z = (xor_shift(*accumulator, 16) as f64 * 0x85eb_ca6b_u32 as f64) % modulus;
    // The second round shifts by 13, the other two by 16.
    let z = (xor_shift(z as i64, 13) as f64 * 0xc2b2_ae35_u32 as f64) % modulus;
    xor_shift(z as i64, 16) as u32
}

impl PrngState {
    /// Expand a seed into the four state words.
    pub fn from_seed(seed: &Seed) -> Self {
        let mut accumulator = match seed {
            Seed::State(state) => return *state,
            Seed::Text(s) => hash_passphrase(s) % SEED_MODULUS,
            Seed::Number(n) => n % SEED_MODULUS,
        };
        let a = split_mix_32(&mut accumulator);
        let b = split_mix_32(&mut accumulator);
        let c = split_mix_32(&mut accumulator);
        let d = split_mix_32(&mut accumulator);
        PrngState { a, b, c, d }
    }
}

/// Deterministic generator, see the module documentation.
#[derive(Clone, Debug)]
pub struct Prng {
    state: PrngState,
}

impl Prng {
    /// Create a generator from a passphrase, a number or a previous state.
    pub fn new(seed: impl Into<Seed>) -> Self {
        Prng {
            state: PrngState::from_seed(&seed.into()),
        }
    }

    /// The current state, seeding a new generator with it resumes the stream.
    pub fn state(&self) -> PrngState {
        self.state
    }

    /// Replace the state, equivalent to re-seeding.
    pub fn set_state(&mut self, seed: impl Into<Seed>) {
        self.state = PrngState::from_seed(&seed.into());
    }

    /// Advance the state, returning the output word derived from the state before the update.
    fn step(&mut self) -> u32 {
        let s = &mut self.state;
        let t = s.b << 9;
        let r = s.a.wrapping_mul(5).rotate_left(7).wrapping_mul(9);
        s.c ^= s.a;
        s.d ^= s.b;
        s.b ^= s.c;
        s.a ^= s.d;
        s.c ^= t;
        s.d = s.d.rotate_left(11);
        r
    }

    /// Uniform float in `[0, 1)`.
    pub fn next_f64(&mut self) -> f64 {
        self.step() as f64 / 4_294_967_296.0
    }

    /// Fisher-Yates shuffle of `0..n`.
    ///
    /// The swap partner for position `i` is drawn from `0..i`, excluding `i` itself.
    pub fn permutation(&mut self, n: usize) -> Vec<usize> {
        let mut values: Vec<usize> = (0..n).collect();
        let mut length = n;
        while length > 1 {
            length -= 1;
            let j = (self.next_f64() * length as f64).floor() as usize;
            values.swap(length, j);
        }
        values
    }
}

impl RngCore for Prng {
    fn next_u32(&mut self) -> u32 {
        self.step()
    }

    fn next_u64(&mut self) -> u64 {
        let low = self.next_u32() as u64;
        let high = self.next_u32() as u64;
        (high << 32) | low
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(4) {
            let word = self.next_u32().to_le_bytes();
            chunk.copy_from_slice(&word[..chunk.len()]);
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

impl SeedableRng for Prng {
    type Seed = [u8; 16];

    /// The four state words, little endian, in `a, b, c, d` order.
    fn from_seed(seed: Self::Seed) -> Self {
        let word = |i: usize| u32::from_le_bytes([seed[i], seed[i + 1], seed[i + 2], seed[i + 3]]);
        Prng::new(PrngState {
            a: word(0),
            b: word(4),
            c: word(8),
            d: word(12),
        })
    }
}
