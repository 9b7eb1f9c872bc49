use std::sync::Arc;
use std::time::Instant;

use rand::SeedableRng;
use rand::rngs::SmallRng;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::engine::achievements::{Achievement, achievement_for};
use crate::engine::navigation::{NavAction, NavigationState, View};
use crate::engine::progress::{FIRST_MASTERY_STARS, Progress, REPEAT_PASS_STARS};
use crate::explain::{
    ExplanationProvider, ExplanationWorker, TextRequest, Ticket, table_achievement_summary,
};
use crate::generator::question::{generate_review_quiz, generate_table_quiz};
use crate::generator::{MAX_TABLE, MIN_TABLE};
use crate::session::quiz::{QuizKind, QuizState, QuizTick, QuizTiming};
use crate::store::json_store::JsonStore;
use crate::ui::theme::Theme;
use crate::voice::VoiceSession;

/// Tables per row on the map grid.
pub const MAP_COLUMNS: u32 = 5;

/// The one outstanding text request, with the screen it was made for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pending {
    pub ticket: Ticket,
    pub view: View,
    pub table: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RewardSummary {
    pub table: u32,
    pub stars_earned: u32,
    pub first_mastery: bool,
}

pub struct App {
    pub config: Config,
    pub theme: &'static Theme,
    pub progress: Progress,
    pub nav: NavigationState,
    pub store: Option<JsonStore>,
    pub quiz: Option<QuizState>,
    pub voice: Option<VoiceSession>,
    pub voice_supported: bool,
    pub pending: Option<Pending>,
    pub explanation: Option<String>,
    pub motivation: Option<String>,
    pub last_reward: Option<RewardSummary>,
    pub map_cursor: u32,
    pub should_quit: bool,
    worker: ExplanationWorker,
    rng: SmallRng,
}

impl App {
    pub fn new(
        config: Config,
        store: Option<JsonStore>,
        provider: Arc<dyn ExplanationProvider>,
    ) -> Self {
        let loaded_theme = Theme::load(&config.theme).unwrap_or_default();
        let theme: &'static Theme = Box::leak(Box::new(loaded_theme));

        let progress = store
            .as_ref()
            .map(JsonStore::load_progress)
            .unwrap_or_default();
        let nav = store
            .as_ref()
            .map(|s| s.restore_navigation(&progress))
            .unwrap_or_default();
        let voice_supported = VoiceSession::is_supported(&config);
        info!(
            view = nav.view.as_str(),
            table = nav.selected_table,
            stars = progress.stars,
            "session restored"
        );

        let mut app = Self {
            config,
            theme,
            progress,
            nav,
            store,
            quiz: None,
            voice: None,
            voice_supported,
            pending: None,
            explanation: None,
            motivation: None,
            last_reward: None,
            map_cursor: nav.selected_table,
            should_quit: false,
            worker: ExplanationWorker::new(provider),
            rng: SmallRng::from_entropy(),
        };
        app.enter_view();
        app
    }

    pub fn with_rng(mut self, rng: SmallRng) -> Self {
        self.rng = rng;
        self
    }

    /// Apply a navigation action. Rejected actions leave everything as is.
    pub fn dispatch(&mut self, action: NavAction) -> bool {
        let Some(step) = self.nav.next(action, &self.progress) else {
            debug!(?action, view = self.nav.view.as_str(), "navigation action ignored");
            return false;
        };

        if let NavAction::FinishQuiz { success: true } = action {
            let table = self.nav.selected_table;
            let first_mastery = !self.progress.is_mastered(table);
            self.last_reward = Some(RewardSummary {
                table,
                stars_earned: if first_mastery {
                    FIRST_MASTERY_STARS
                } else {
                    REPEAT_PASS_STARS
                },
                first_mastery,
            });
            info!(table, first_mastery, "table quiz passed");
        }

        let progress_changed = step.progress != self.progress;
        self.progress = step.progress;
        self.nav = step.nav;
        self.persist(progress_changed);
        self.enter_view();
        true
    }

    fn persist(&self, progress_changed: bool) {
        let Some(store) = &self.store else {
            return;
        };
        if progress_changed && let Err(e) = store.save_progress(&self.progress) {
            warn!("failed to save progress: {e}");
        }
        if let Err(e) = store.save_session(&self.nav) {
            warn!("failed to save session: {e}");
        }
    }

    /// Set up the screen the navigation state now shows.
    fn enter_view(&mut self) {
        self.stop_voice();
        self.pending = None;
        let table = self.nav.selected_table;

        match self.nav.view {
            View::Map => {
                self.quiz = None;
                self.explanation = None;
                self.motivation = None;
                self.map_cursor = table;
            }
            View::Learn => {
                self.quiz = None;
                self.explanation = None;
                let ticket = self.worker.request(TextRequest::Explanation {
                    table,
                    sample_factor: self.config.explanation_sample_factor,
                });
                self.pending = Some(Pending {
                    ticket,
                    view: View::Learn,
                    table,
                });
            }
            View::Quiz => {
                let questions = generate_table_quiz(table, self.config.quiz_length, &mut self.rng);
                self.quiz = Some(QuizState::new(
                    QuizKind::Table(table),
                    questions,
                    QuizTiming::from_config(&self.config),
                ));
            }
            View::Review => {
                let questions = generate_review_quiz(
                    &self.progress.mastered_tables,
                    self.config.review_length,
                    &mut self.rng,
                );
                self.quiz = Some(QuizState::new(
                    QuizKind::Review,
                    questions,
                    QuizTiming::from_config(&self.config),
                ));
            }
            View::Reward => {
                self.quiz = None;
                self.motivation = None;
                let ticket = self.worker.request(TextRequest::Motivation {
                    child_name: self.config.child_name.clone(),
                    achievement: table_achievement_summary(table),
                });
                self.pending = Some(Pending {
                    ticket,
                    view: View::Reward,
                    table,
                });
            }
        }
    }

    pub fn select_table(&mut self, table: u32) -> bool {
        self.dispatch(NavAction::SelectTable(table))
    }

    pub fn select_cursor(&mut self) -> bool {
        self.select_table(self.map_cursor)
    }

    /// Move the map cursor on the 2x5 grid, clamped at the edges.
    pub fn move_map_cursor(&mut self, dx: i32, dy: i32) {
        let index = (self.map_cursor - MIN_TABLE) as i32;
        let columns = MAP_COLUMNS as i32;
        let rows = ((MAX_TABLE - MIN_TABLE + 1) as i32 + columns - 1) / columns;
        let col = (index % columns + dx).clamp(0, columns - 1);
        let row = (index / columns + dy).clamp(0, rows - 1);
        let next = (row * columns + col) as u32 + MIN_TABLE;
        self.map_cursor = next.min(MAX_TABLE);
    }

    pub fn back(&mut self) -> bool {
        self.dispatch(NavAction::Back)
    }

    pub fn start_quiz(&mut self) -> bool {
        self.dispatch(NavAction::StartQuiz)
    }

    pub fn cancel_quiz(&mut self) -> bool {
        self.dispatch(NavAction::CancelQuiz)
    }

    pub fn start_review(&mut self) -> bool {
        self.dispatch(NavAction::StartReview)
    }

    pub fn finish_review(&mut self) -> bool {
        self.dispatch(NavAction::FinishReview)
    }

    pub fn continue_from_reward(&mut self) -> bool {
        self.dispatch(NavAction::Continue)
    }

    pub fn choose_option(&mut self, index: usize, now: Instant) -> bool {
        self.quiz
            .as_mut()
            .is_some_and(|quiz| quiz.choose_index(index, now))
    }

    pub fn choose_cursor(&mut self, now: Instant) -> bool {
        self.quiz
            .as_mut()
            .is_some_and(|quiz| quiz.choose_cursor(now))
    }

    pub fn move_option_cursor(&mut self, delta: isize) {
        if let Some(quiz) = self.quiz.as_mut() {
            quiz.move_cursor(delta);
        }
    }

    pub fn is_listening(&self) -> bool {
        self.voice.is_some()
    }

    /// Voice on/off while a quiz or review is showing. Turning it on always
    /// starts a fresh session.
    pub fn toggle_voice(&mut self) {
        if self.voice.is_some() {
            self.stop_voice();
            return;
        }
        if !self.voice_supported || self.quiz.is_none() {
            return;
        }
        self.voice = VoiceSession::start(&self.config);
    }

    pub fn attach_voice(&mut self, session: VoiceSession) {
        self.stop_voice();
        self.voice = Some(session);
    }

    fn stop_voice(&mut self) {
        if let Some(mut session) = self.voice.take() {
            session.stop();
        }
    }

    /// Advance timers and drain background deliveries.
    pub fn tick(&mut self, now: Instant) {
        if let Some(voice) = &mut self.voice {
            if let Some(transcript) = voice.latest()
                && let Some(quiz) = &mut self.quiz
            {
                quiz.hear(&transcript, now);
            }
            if voice.has_ended() {
                info!("voice recognizer exited");
                self.stop_voice();
            }
        }

        let outcome = self.quiz.as_mut().map_or(QuizTick::Idle, |q| q.tick(now));
        if let QuizTick::Finished { success } = outcome {
            self.finish_quiz(success);
        }

        for delivery in self.worker.poll() {
            self.apply_delivery(delivery.ticket, delivery.text);
        }
    }

    fn finish_quiz(&mut self, success: bool) {
        let Some(kind) = self.quiz.as_ref().map(|q| q.kind) else {
            return;
        };
        match kind {
            QuizKind::Table(table) => {
                info!(table, success, "table quiz finished");
                self.dispatch(NavAction::FinishQuiz { success });
            }
            QuizKind::Review => {
                info!("review finished");
                self.dispatch(NavAction::FinishReview);
            }
        }
    }

    fn apply_delivery(&mut self, ticket: Ticket, text: String) {
        let current = self.pending.filter(|p| {
            p.ticket == ticket && p.view == self.nav.view && p.table == self.nav.selected_table
        });
        let Some(pending) = current else {
            debug!(ticket, "discarding stale text delivery");
            return;
        };
        match pending.view {
            View::Learn => self.explanation = Some(text),
            View::Reward => self.motivation = Some(text),
            _ => {}
        }
        self.pending = None;
    }

    pub fn achievement(&self) -> Option<Achievement> {
        self.last_reward
            .and_then(|r| achievement_for(r.table, &self.config.child_name))
    }
}
