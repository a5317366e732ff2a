use crate::card::CardId;
use crate::game::zones::CardMultiset;
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Seeded random number generator for reproducible playouts
#[derive(Clone)]
pub struct GameRng {
    rng: ChaCha8Rng,
    seed: u64,
}

impl GameRng {
    /// Create a new GameRng with an optional seed
    /// If seed is None, generates a random seed
    pub fn new(seed: Option<u64>) -> Self {
        let seed = seed.unwrap_or_else(|| rand::thread_rng().gen());
        GameRng {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }

    /// Independent stream for trial `index` of a batch
    pub fn for_trial(base_seed: u64, index: u64) -> Self {
        Self::new(Some(base_seed.wrapping_add(index)))
    }

    /// Get the seed used for this RNG
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Generate a random integer in range [0, max)
    pub fn random_range(&mut self, max: usize) -> usize {
        self.rng.gen_range(0..max)
    }

    /// Fisher-Yates shuffle for a mutable slice
    pub fn shuffle<T>(&mut self, array: &mut [T]) {
        for i in (1..array.len()).rev() {
            let j = self.random_range(i + 1);
            array.swap(i, j);
        }
    }

    /// A shuffled draw order for the cards of a pile; index 0 is the top
    pub fn draw_order(&mut self, pile: &CardMultiset) -> Vec<CardId> {
        let mut cards = pile.to_cards();
        self.shuffle(&mut cards);
        cards
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shuffle_reproducibility() {
        let mut arr1 = vec![1, 2, 3, 4, 5, 6, 7, 8, 9, 10];
        let mut arr2 = arr1.clone();

        GameRng::new(Some(42)).shuffle(&mut arr1);
        GameRng::new(Some(42)).shuffle(&mut arr2);

        assert_eq!(arr1, arr2, "Same seed should produce same shuffle");
    }

    #[test]
    fn test_trial_seeds() {
        assert_eq!(GameRng::for_trial(100, 5).seed(), 105);
        assert_eq!(GameRng::for_trial(u64::MAX, 1).seed(), 0);
    }

    #[test]
    fn test_draw_order_is_permutation() {
        let pile: CardMultiset = [CardId(0), CardId(0), CardId(1), CardId(4)]
            .into_iter()
            .collect();
        let mut order = GameRng::new(Some(7)).draw_order(&pile);
        assert_eq!(order.len(), 4);
        order.sort();
        assert_eq!(order, pile.to_cards());
    }

    #[test]
    fn test_random_range() {
        let mut rng = GameRng::new(Some(123));
        for _ in 0..1000 {
            assert!(rng.random_range(10) < 10);
        }
    }
}
