use std::collections::BTreeSet;

use rand::Rng;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;

use crate::generator::{MAX_FACTOR, MIN_FACTOR, OPTION_COUNT};

/// Random draws tried before the option set is topped up deterministically.
const MAX_DISTRACTOR_ATTEMPTS: usize = 64;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Question {
    pub factor_a: u32,
    pub factor_b: u32,
    pub answer: u32,
    /// Exactly `OPTION_COUNT` distinct values including `answer`, in display order.
    pub options: Vec<u32>,
}

impl Question {
    pub fn new(factor_a: u32, factor_b: u32, rng: &mut SmallRng) -> Self {
        let answer = factor_a * factor_b;
        Self {
            factor_a,
            factor_b,
            answer,
            options: build_options(answer, rng),
        }
    }

    pub fn is_correct(&self, option: u32) -> bool {
        option == self.answer
    }
}

/// One question per multiplier 1..=10 of `table`, multipliers in shuffled
/// order. `count` below 10 keeps the first `count` of the permutation.
pub fn generate_table_quiz(table: u32, count: usize, rng: &mut SmallRng) -> Vec<Question> {
    let mut multipliers: Vec<u32> = (MIN_FACTOR..=MAX_FACTOR).collect();
    multipliers.shuffle(rng);
    multipliers
        .into_iter()
        .take(count)
        .map(|factor_b| Question::new(table, factor_b, rng))
        .collect()
}

/// `count` independent draws: a mastered table and a multiplier, both
/// uniform and with replacement. No mastered tables means no questions.
pub fn generate_review_quiz(
    mastered_tables: &BTreeSet<u32>,
    count: usize,
    rng: &mut SmallRng,
) -> Vec<Question> {
    let tables: Vec<u32> = mastered_tables.iter().copied().collect();
    if tables.is_empty() {
        return Vec::new();
    }

    (0..count)
        .map(|_| {
            let table = tables[rng.gen_range(0..tables.len())];
            let factor_b = rng.gen_range(MIN_FACTOR..=MAX_FACTOR);
            Question::new(table, factor_b, rng)
        })
        .collect()
}

/// The answer plus three distinct positive distractors near it, shuffled.
pub fn build_options(answer: u32, rng: &mut SmallRng) -> Vec<u32> {
    let mut options = BTreeSet::from([answer]);

    let mut attempts = 0;
    while options.len() < OPTION_COUNT && attempts < MAX_DISTRACTOR_ATTEMPTS {
        let offset: i64 = rng.gen_range(-5..=4);
        let candidate = (i64::from(answer) + offset).max(1);
        options.insert(candidate as u32);
        attempts += 1;
    }

    // Unlucky streak: fill upward past the random window.
    let mut next = answer.saturating_add(5);
    while options.len() < OPTION_COUNT {
        options.insert(next);
        next = next.saturating_add(1);
    }

    let mut options: Vec<u32> = options.into_iter().collect();
    options.shuffle(rng);
    options
}
