//! Sources of randomness for the randomized rule effects and the AI.

use rand::Rng;
use std::collections::VecDeque;

/// Uniform random source consulted by the rules.
///
/// Blocked layouts, bomb triggers, chaos swaps and the AI's random fallback
/// all draw from here, so a game can be replayed with [`ScriptedDice`].
pub trait Dice {
    /// Returns true with the given probability.
    fn chance(&mut self, probability: f64) -> bool;

    /// Returns an index in `0..len`. `len` is never zero.
    fn pick(&mut self, len: usize) -> usize;

    /// Picks `count` distinct indices from `0..len`, in random order.
    fn sample(&mut self, len: usize, count: usize) -> Vec<usize> {
        let mut pool: Vec<usize> = (0..len).collect();
        let count = count.min(len);
        for i in 0..count {
            let j = i + self.pick(len - i);
            pool.swap(i, j);
        }
        pool.truncate(count);
        pool
    }
}

/// [`Dice`] backed by any `rand` generator.
#[derive(Debug, Clone)]
pub struct RngDice<R>(pub R);

impl<R: Rng> Dice for RngDice<R> {
    fn chance(&mut self, probability: f64) -> bool {
        self.0.random_bool(probability.clamp(0.0, 1.0))
    }

    fn pick(&mut self, len: usize) -> usize {
        self.0.random_range(0..len)
    }
}

/// Deterministic [`Dice`] that replays queued answers.
///
/// Once a queue runs dry, `chance` answers `false` and `pick` answers `0`.
#[derive(Debug, Clone, Default)]
pub struct ScriptedDice {
    chances: VecDeque<bool>,
    picks: VecDeque<usize>,
}

impl ScriptedDice {
    /// Dice that never triggers an effect and always picks the first option.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues answers for [`Dice::chance`].
    pub fn with_chances(mut self, chances: impl IntoIterator<Item = bool>) -> Self {
        self.chances.extend(chances);
        self
    }

    /// Queues answers for [`Dice::pick`]. Each is reduced modulo the requested length.
    pub fn with_picks(mut self, picks: impl IntoIterator<Item = usize>) -> Self {
        self.picks.extend(picks);
        self
    }
}

impl Dice for ScriptedDice {
    fn chance(&mut self, _probability: f64) -> bool {
        self.chances.pop_front().unwrap_or(false)
    }

    fn pick(&mut self, len: usize) -> usize {
        self.picks.pop_front().map(|p| p % len).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_sample_is_distinct_and_in_range() {
        let mut dice = RngDice(StdRng::from_os_rng());
        for _ in 0..50 {
            let mut picked = dice.sample(100, 15);
            assert_eq!(picked.len(), 15);
            assert!(picked.iter().all(|&i| i < 100));
            picked.sort_unstable();
            picked.dedup();
            assert_eq!(picked.len(), 15);
        }
    }

    #[test]
    fn test_sample_caps_at_len() {
        let mut dice = ScriptedDice::new();
        assert_eq!(dice.sample(3, 10).len(), 3);
    }

    #[test]
    fn test_scripted_dice_replays_then_defaults() {
        let mut dice = ScriptedDice::new()
            .with_chances([true])
            .with_picks([7]);
        assert!(dice.chance(0.1));
        assert!(!dice.chance(0.9));
        assert_eq!(dice.pick(5), 2);
        assert_eq!(dice.pick(5), 0);
    }

    #[test]
    fn test_chance_extremes() {
        let mut dice = RngDice(StdRng::from_os_rng());
        assert!((0..100).all(|_| dice.chance(1.0)));
        assert!((0..100).all(|_| !dice.chance(0.0)));
    }
}
