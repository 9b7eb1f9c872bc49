use std::time::{Duration, Instant};

use crate::config::Config;
use crate::generator::question::Question;
use crate::voice::resolve_spoken_answer;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QuizKind {
    Table(u32),
    Review,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Feedback {
    Correct { until: Instant },
    Wrong { until: Instant },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QuizTick {
    Idle,
    /// Wrong-answer feedback expired; the same question is open again.
    Retry,
    Advanced,
    Finished { success: bool },
}

#[derive(Clone, Copy, Debug)]
pub struct QuizTiming {
    pub correct_delay: Duration,
    pub wrong_delay: Duration,
    pub max_mistakes: Option<u32>,
}

impl QuizTiming {
    pub fn from_config(config: &Config) -> Self {
        Self {
            correct_delay: Duration::from_millis(config.correct_delay_ms),
            wrong_delay: Duration::from_millis(config.wrong_delay_ms),
            max_mistakes: config.max_mistakes,
        }
    }
}

impl Default for QuizTiming {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// A running quiz or review. Per-question state (selection, feedback,
/// transcript) is reset whenever the quiz moves to the next question.
pub struct QuizState {
    pub kind: QuizKind,
    pub questions: Vec<Question>,
    pub current: usize,
    pub selected: Option<u32>,
    pub feedback: Option<Feedback>,
    pub transcript: String,
    pub mistakes: u32,
    pub cursor: usize,
    timing: QuizTiming,
}

impl QuizState {
    pub fn new(kind: QuizKind, questions: Vec<Question>, timing: QuizTiming) -> Self {
        Self {
            kind,
            questions,
            current: 0,
            selected: None,
            feedback: None,
            transcript: String::new(),
            mistakes: 0,
            cursor: 0,
            timing,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn question(&self) -> Option<&Question> {
        self.questions.get(self.current)
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    /// Fraction of questions already answered correctly.
    pub fn progress(&self) -> f64 {
        if self.questions.is_empty() {
            return 0.0;
        }
        self.current as f64 / self.questions.len() as f64
    }

    pub fn is_locked(&self) -> bool {
        self.selected.is_some()
    }

    /// Pick an option. Ignored while a previous pick is still showing
    /// feedback. Returns whether the pick was accepted.
    pub fn choose(&mut self, option: u32, now: Instant) -> bool {
        if self.is_locked() {
            return false;
        }
        let Some(question) = self.question() else {
            return false;
        };

        let feedback = if question.is_correct(option) {
            Feedback::Correct {
                until: now + self.timing.correct_delay,
            }
        } else {
            self.mistakes += 1;
            Feedback::Wrong {
                until: now + self.timing.wrong_delay,
            }
        };
        self.selected = Some(option);
        self.feedback = Some(feedback);
        true
    }

    pub fn choose_index(&mut self, index: usize, now: Instant) -> bool {
        let option = self
            .question()
            .and_then(|q| q.options.get(index))
            .copied();
        match option {
            Some(option) => {
                self.cursor = index;
                self.choose(option, now)
            }
            None => false,
        }
    }

    pub fn choose_cursor(&mut self, now: Instant) -> bool {
        self.choose_index(self.cursor, now)
    }

    pub fn move_cursor(&mut self, delta: isize) {
        let count = self.question().map_or(0, |q| q.options.len());
        if count == 0 {
            return;
        }
        self.cursor = (self.cursor as isize + delta).rem_euclid(count as isize) as usize;
    }

    /// Feed a transcript snapshot. A spoken match submits the answer; a
    /// non-match does nothing. Returns whether an answer was submitted.
    pub fn hear(&mut self, transcript: &str, now: Instant) -> bool {
        self.transcript = transcript.trim().to_lowercase();
        if self.is_locked() {
            return false;
        }
        let Some(expected) = self.question().map(|q| q.answer) else {
            return false;
        };
        match resolve_spoken_answer(transcript, expected) {
            Some(answer) => self.choose(answer, now),
            None => false,
        }
    }

    pub fn tick(&mut self, now: Instant) -> QuizTick {
        match self.feedback {
            Some(Feedback::Wrong { until }) if now >= until => {
                self.selected = None;
                self.feedback = None;
                // Reviews never end early.
                let exceeded = matches!(self.kind, QuizKind::Table(_))
                    && self
                        .timing
                        .max_mistakes
                        .is_some_and(|max| self.mistakes > max);
                if exceeded {
                    QuizTick::Finished { success: false }
                } else {
                    QuizTick::Retry
                }
            }
            Some(Feedback::Correct { until }) if now >= until => {
                if self.current + 1 < self.questions.len() {
                    self.current += 1;
                    self.selected = None;
                    self.feedback = None;
                    self.transcript.clear();
                    self.cursor = 0;
                    QuizTick::Advanced
                } else {
                    self.feedback = None;
                    QuizTick::Finished { success: true }
                }
            }
            _ => QuizTick::Idle,
        }
    }
}
