//! Learner seam for the adaptive module strategy

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::trace;

use crate::mental_state::MentalState;
use crate::program::{ActionCombo, Substitution, Term};

/// An enabled action combo the learner may pick
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    /// Index of the rule the combo comes from
    pub rule: usize,
    pub combo: ActionCombo,
    pub substitution: Substitution,
    pub focus: Option<Term>,
}

impl Candidate {
    /// The combo with its substitution applied
    pub fn instantiated(&self) -> ActionCombo {
        self.combo.apply(&self.substitution)
    }
}

pub trait Learner: Send {
    /// Pick one of `candidates` (never empty); returns its index
    fn act(&mut self, module: &str, mental_state: &dyn MentalState, candidates: &[Candidate]) -> usize;

    /// Reward for the most recent choice in `module`
    fn update(&mut self, module: &str, mental_state: &dyn MentalState, reward: f64);
}

/// Uniform choice, ignores rewards
#[derive(Debug)]
pub struct RandomLearner {
    rng: StdRng,
}

impl RandomLearner {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { rng }
    }
}

impl Default for RandomLearner {
    fn default() -> Self {
        Self::new(None)
    }
}

impl Learner for RandomLearner {
    fn act(&mut self, module: &str, _mental_state: &dyn MentalState, candidates: &[Candidate]) -> usize {
        let choice = self.rng.gen_range(0..candidates.len());
        trace!(module, choice, options = candidates.len(), "random choice");
        choice
    }

    fn update(&mut self, _module: &str, _mental_state: &dyn MentalState, _reward: f64) {}
}
