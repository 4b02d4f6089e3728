//! Deterministic randomness.
//!
//! Every roll is a pure function of a seed mixed from the game seed, the
//! action nonce, the acting entity and a per-roll context counter, so any
//! resolution can be replayed exactly.

use std::collections::VecDeque;
use std::sync::Mutex;

use crate::config::GameConfig;
use crate::state::EntityId;

/// RNG oracle. Implementations must return the same value for the same seed.
pub trait RngOracle: Send + Sync {
    fn next_u32(&self, seed: u64) -> u32;

    /// Roll a die with `sides` faces (1..=sides). A zero-sided die rolls 0.
    fn roll_die(&self, seed: u64, sides: u32) -> u32 {
        if sides == 0 {
            return 0;
        }
        (self.next_u32(seed) % sides) + 1
    }

    fn roll_d100(&self, seed: u64) -> u32 {
        self.roll_die(seed, 100)
    }
}

/// Stateless PCG-XSH-RR: one LCG step on the seed, then the permuted output.
#[derive(Clone, Copy, Debug, Default)]
pub struct PcgRng;

impl PcgRng {
    const MULTIPLIER: u64 = 6364136223846793005;
    const INCREMENT: u64 = 1442695040888963407;

    #[inline]
    fn step(state: u64) -> u64 {
        state
            .wrapping_mul(Self::MULTIPLIER)
            .wrapping_add(Self::INCREMENT)
    }

    #[inline]
    fn output(state: u64) -> u32 {
        let xorshifted = (((state >> 18) ^ state) >> 27) as u32;
        let rot = (state >> 59) as u32;
        xorshifted.rotate_right(rot)
    }
}

impl RngOracle for PcgRng {
    fn next_u32(&self, seed: u64) -> u32 {
        Self::output(Self::step(seed))
    }
}

/// Mixes the roll coordinates into a single seed (SplitMix64-style avalanche).
pub fn compute_seed(game_seed: u64, nonce: u64, actor_id: u32, context: u32) -> u64 {
    let mut hash = game_seed;
    hash ^= nonce.wrapping_mul(0x9e3779b97f4a7c15);
    hash ^= (actor_id as u64).wrapping_mul(0x517cc1b727220a95);
    hash ^= (context as u64).wrapping_mul(0x85ebca6b);

    hash ^= hash >> 33;
    hash = hash.wrapping_mul(0xff51afd7ed558ccd);
    hash ^= hash >> 33;
    hash
}

/// Scripted die faces for tests and replays of recorded sessions.
///
/// Each `roll_die` call consumes one queued face (clamped into `1..=sides`);
/// once the script runs dry it falls back to [`PcgRng`].
#[derive(Debug, Default)]
pub struct SequenceRng {
    faces: Mutex<VecDeque<u32>>,
}

impl SequenceRng {
    pub fn new(faces: impl IntoIterator<Item = u32>) -> Self {
        Self {
            faces: Mutex::new(faces.into_iter().collect()),
        }
    }

    pub fn push(&self, face: u32) {
        if let Ok(mut faces) = self.faces.lock() {
            faces.push_back(face);
        }
    }

    pub fn remaining(&self) -> usize {
        self.faces.lock().map(|faces| faces.len()).unwrap_or(0)
    }

    fn next_face(&self) -> Option<u32> {
        self.faces.lock().ok()?.pop_front()
    }
}

impl RngOracle for SequenceRng {
    fn next_u32(&self, seed: u64) -> u32 {
        PcgRng.next_u32(seed)
    }

    fn roll_die(&self, seed: u64, sides: u32) -> u32 {
        if sides == 0 {
            return 0;
        }
        match self.next_face() {
            Some(face) => face.clamp(1, sides),
            None => PcgRng.roll_die(seed, sides),
        }
    }
}

/// Per-resolution roller. Every roll advances the context counter.
pub struct Dice<'a> {
    rng: &'a dyn RngOracle,
    game_seed: u64,
    nonce: u64,
    actor: EntityId,
    context: u32,
}

impl<'a> Dice<'a> {
    pub fn new(rng: &'a dyn RngOracle, game_seed: u64, nonce: u64, actor: EntityId) -> Self {
        Self {
            rng,
            game_seed,
            nonce,
            actor,
            context: 0,
        }
    }

    /// Number of rolls made so far.
    pub fn rolls(&self) -> u32 {
        self.context
    }

    fn seed(&mut self) -> u64 {
        let seed = compute_seed(self.game_seed, self.nonce, self.actor.0, self.context);
        self.context = self.context.wrapping_add(1);
        seed
    }

    pub fn roll(&mut self, sides: u32) -> u32 {
        let seed = self.seed();
        self.rng.roll_die(seed, sides)
    }

    /// Sum of `count` dice with `sides` faces each.
    pub fn roll_many(&mut self, count: u32, sides: u32) -> i32 {
        (0..count).map(|_| self.roll(sides) as i32).sum()
    }

    pub fn d20(&mut self) -> i32 {
        self.roll(GameConfig::D20) as i32
    }

    /// True with `percent` percent probability.
    pub fn chance(&mut self, percent: u32) -> bool {
        if percent == 0 {
            return false;
        }
        let seed = self.seed();
        self.rng.roll_d100(seed) <= percent
    }

    /// Uniform index into a collection of `len` elements.
    pub fn pick(&mut self, len: usize) -> Option<usize> {
        if len == 0 {
            return None;
        }
        Some(self.roll(len as u32) as usize - 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pcg_is_deterministic() {
        let rng = PcgRng;
        assert_eq!(rng.next_u32(42), rng.next_u32(42));
        assert_ne!(rng.next_u32(42), rng.next_u32(43));
    }

    #[test]
    fn rolls_stay_in_range() {
        let rng = PcgRng;
        for seed in 0..500 {
            let face = rng.roll_die(seed, 6);
            assert!((1..=6).contains(&face));
        }
        assert_eq!(rng.roll_die(7, 0), 0);
    }

    #[test]
    fn seeds_differ_by_every_coordinate() {
        let base = compute_seed(1, 2, 3, 4);
        assert_ne!(base, compute_seed(9, 2, 3, 4));
        assert_ne!(base, compute_seed(1, 9, 3, 4));
        assert_ne!(base, compute_seed(1, 2, 9, 4));
        assert_ne!(base, compute_seed(1, 2, 3, 9));
    }

    #[test]
    fn sequence_rng_replays_script_then_falls_back() {
        let rng = SequenceRng::new([14, 30, 0]);
        let mut dice = Dice::new(&rng, 0, 0, EntityId(1));
        assert_eq!(dice.d20(), 14);
        assert_eq!(dice.d20(), 20);
        assert_eq!(dice.roll(6), 1);
        assert_eq!(rng.remaining(), 0);
        let face = dice.roll(6);
        assert!((1..=6).contains(&face));
        assert_eq!(dice.rolls(), 4);
    }

    #[test]
    fn dice_replay_matches() {
        let rng = PcgRng;
        let mut first = Dice::new(&rng, 99, 5, EntityId(2));
        let mut second = Dice::new(&rng, 99, 5, EntityId(2));
        let a: Vec<u32> = (0..8).map(|_| first.roll(20)).collect();
        let b: Vec<u32> = (0..8).map(|_| second.roll(20)).collect();
        assert_eq!(a, b);
    }

    #[test]
    fn chance_bounds() {
        let rng = SequenceRng::new([100, 1]);
        let mut dice = Dice::new(&rng, 0, 0, EntityId(1));
        assert!(!dice.chance(0));
        assert!(dice.chance(100));
        assert!(dice.chance(1));
    }
}
