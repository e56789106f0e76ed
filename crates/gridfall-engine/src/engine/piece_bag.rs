use std::{collections::VecDeque, fmt::Write as _};

use rand::{
    Rng, SeedableRng as _,
    distr::{Distribution, StandardUniform},
    seq::SliceRandom,
};
use rand_pcg::Pcg32;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::PieceKind;

/// Supplies falling pieces using the 7-bag system.
///
/// A bag holds each of the seven piece kinds exactly once, shuffled with the
/// sequencer's own random number generator. Pieces are drawn front-to-back
/// and a fresh bag is shuffled in only when the previous one is exhausted,
/// so every kind appears exactly once per seven draws.
///
/// # Example
///
/// ```
/// use gridfall_engine::PieceBag;
///
/// let mut bag = PieceBag::new();
/// let first = bag.pop_next();
/// # let _ = first;
/// ```
#[derive(Debug, Clone)]
pub struct PieceBag {
    rng: Pcg32,
    bag: VecDeque<PieceKind>,
}

impl Default for PieceBag {
    fn default() -> Self {
        Self::new()
    }
}

/// Seed for deterministic bag shuffling.
///
/// A 128-bit (16-byte) value used to initialize the sequencer's random
/// number generator. Two sequencers built from the same seed produce the
/// same piece sequence, enabling:
///
/// - Reproducible shuffles in tests
/// - Session recording and replay
/// - Debugging a specific piece sequence
///
/// # Example
///
/// ```
/// use gridfall_engine::{BagSeed, PieceBag};
/// use rand::Rng as _;
///
/// let seed: BagSeed = rand::rng().random();
/// let mut first = PieceBag::with_seed(seed);
/// let mut second = PieceBag::with_seed(seed);
/// assert_eq!(first.pop_next(), second.pop_next());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BagSeed([u8; 16]);

impl Serialize for BagSeed {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let num = u128::from_be_bytes(self.0);
        let mut hex_str = String::with_capacity(2 * self.0.len());
        write!(&mut hex_str, "{num:032x}").unwrap();
        serializer.serialize_str(&hex_str)
    }
}

impl<'de> Deserialize<'de> for BagSeed {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let hex_str = String::deserialize(deserializer)?;
        if hex_str.len() != 32 {
            return Err(serde::de::Error::custom(format!(
                "invalid hex: expected 32 characters, got {}",
                hex_str.len()
            )));
        }
        let num = u128::from_str_radix(&hex_str, 16)
            .map_err(|e| serde::de::Error::custom(format!("invalid hex: {hex_str} ({e})")))?;
        Ok(Self(num.to_be_bytes()))
    }
}

/// Allows generating random `BagSeed` values with `rng.random()`.
impl Distribution<BagSeed> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> BagSeed {
        let mut seed = [0; 16];
        rng.fill(&mut seed);
        BagSeed(seed)
    }
}

impl PieceBag {
    /// Creates a new piece bag with a random seed.
    ///
    /// For a deterministic piece sequence, use [`Self::with_seed`] instead.
    #[must_use]
    pub fn new() -> Self {
        Self::with_seed(rand::rng().random())
    }

    /// Like [`Self::new`], but with a specific seed for a deterministic
    /// piece sequence.
    #[must_use]
    pub fn with_seed(seed: BagSeed) -> Self {
        Self {
            rng: Pcg32::from_seed(seed.0),
            bag: VecDeque::with_capacity(PieceKind::LEN),
        }
    }

    /// Shuffles a fresh full set of the seven kinds into the queue.
    fn refill(&mut self) {
        let mut kinds = PieceKind::ALL;
        kinds.shuffle(&mut self.rng);
        self.bag.extend(kinds);
    }

    /// Draws the next piece, refilling the bag first when it is exhausted.
    ///
    /// # Panics
    ///
    /// Panics if the bag is empty after a refill (cannot happen).
    pub fn pop_next(&mut self) -> PieceKind {
        if self.bag.is_empty() {
            self.refill();
        }
        self.bag.pop_front().expect("refilled bag cannot be empty")
    }
}
