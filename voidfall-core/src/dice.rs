//! The fate wheel: a d20 skill-check roll.
//!
//! Every randomized check in the engine draws a single die from a
//! [`DiceRoller`], an injected capability so tests can script exact
//! roll sequences instead of fighting a global generator.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of faces on the fate wheel.
pub const FATE_DIE_SIDES: u8 = 20;

/// Source of d20 rolls.
pub trait DiceRoller {
    /// Draw a uniform value in `[1, 20]`.
    fn roll_d20(&mut self) -> u8;
}

/// Rolls from the thread-local RNG. The production roller.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomRoller;

impl DiceRoller for RandomRoller {
    fn roll_d20(&mut self) -> u8 {
        rand::thread_rng().gen_range(1..=FATE_DIE_SIDES)
    }
}

/// Rolls from any [`rand::Rng`], for seeded determinism.
#[derive(Debug, Clone)]
pub struct RngRoller<R: Rng>(pub R);

impl<R: Rng> DiceRoller for RngRoller<R> {
    fn roll_d20(&mut self) -> u8 {
        self.0.gen_range(1..=FATE_DIE_SIDES)
    }
}

/// A settled skill-check roll: the drawn value against a difficulty class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roll {
    pub value: u8,
    pub difficulty: u8,
}

impl Roll {
    /// The check succeeds when the roll meets or beats the difficulty.
    pub fn is_success(&self) -> bool {
        self.value >= self.difficulty
    }
}

impl fmt::Display for Roll {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} vs DC {} ({})",
            self.value,
            self.difficulty,
            if self.is_success() {
                "success"
            } else {
                "failure"
            }
        )
    }
}
