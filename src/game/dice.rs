use rand::Rng;

/// A roll of two six-sided dice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct DiceRoll {
    pub first: u8,
    pub second: u8,
}

impl DiceRoll {
    pub fn new(first: u8, second: u8) -> Self {
        assert!(
            (1..=6).contains(&first) && (1..=6).contains(&second),
            "dice faces must be 1-6, got {first} and {second}"
        );
        DiceRoll { first, second }
    }

    pub fn total(self) -> usize {
        (self.first + self.second) as usize
    }

    pub fn is_double(self) -> bool {
        self.first == self.second
    }
}

/// Source of the randomness a turn consumes: one dice roll per step and
/// an occasional card draw.
pub trait DiceSource {
    fn roll_dice(&mut self) -> DiceRoll;

    /// Uniform index in `0..deck_len`.
    fn pick_card(&mut self, deck_len: usize) -> usize;
}

impl<R: Rng + ?Sized> DiceSource for R {
    fn roll_dice(&mut self) -> DiceRoll {
        DiceRoll {
            first: self.random_range(1..=6),
            second: self.random_range(1..=6),
        }
    }

    fn pick_card(&mut self, deck_len: usize) -> usize {
        self.random_range(0..deck_len)
    }
}

#[cfg(test)]
pub(crate) mod scripted {
    use std::collections::VecDeque;

    use super::{DiceRoll, DiceSource};

    /// Replays a fixed script of rolls and card picks. Panics when a step
    /// consumes more randomness than the test prepared.
    #[derive(Default)]
    pub struct ScriptedDice {
        rolls: VecDeque<DiceRoll>,
        cards: VecDeque<usize>,
    }

    impl ScriptedDice {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn roll(mut self, first: u8, second: u8) -> Self {
            self.rolls.push_back(DiceRoll::new(first, second));
            self
        }

        pub fn card(mut self, index: usize) -> Self {
            self.cards.push_back(index);
            self
        }

        pub fn is_exhausted(&self) -> bool {
            self.rolls.is_empty() && self.cards.is_empty()
        }
    }

    impl DiceSource for ScriptedDice {
        fn roll_dice(&mut self) -> DiceRoll {
            self.rolls.pop_front().expect("script ran out of dice rolls")
        }

        fn pick_card(&mut self, deck_len: usize) -> usize {
            let index = self.cards.pop_front().expect("script ran out of card picks");
            assert!(index < deck_len);
            index
        }
    }
}
