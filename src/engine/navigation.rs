use crate::engine::progress::{Progress, apply_quiz_result};
use crate::generator::{MAX_TABLE, MIN_TABLE};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum View {
    Map,
    Learn,
    Quiz,
    Reward,
    Review,
}

impl View {
    pub fn as_str(self) -> &'static str {
        match self {
            View::Map => "map",
            View::Learn => "learn",
            View::Quiz => "quiz",
            View::Reward => "reward",
            View::Review => "review",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "map" => Some(View::Map),
            "learn" => Some(View::Learn),
            "quiz" => Some(View::Quiz),
            "reward" => Some(View::Reward),
            "review" => Some(View::Review),
            _ => None,
        }
    }

    /// Quiz and Reward are mid-flow and never resumed after a restart.
    pub fn is_restorable(self) -> bool {
        matches!(self, View::Map | View::Learn | View::Review)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NavAction {
    SelectTable(u32),
    Back,
    StartQuiz,
    CancelQuiz,
    FinishQuiz { success: bool },
    Continue,
    StartReview,
    FinishReview,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NavigationState {
    pub view: View,
    pub selected_table: u32,
}

impl Default for NavigationState {
    fn default() -> Self {
        Self {
            view: View::Map,
            selected_table: MIN_TABLE,
        }
    }
}

/// Result of an accepted transition. `progress` is the value to commit
/// alongside the new navigation state (unchanged unless a quiz succeeded).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Step {
    pub nav: NavigationState,
    pub progress: Progress,
}

impl NavigationState {
    /// Rebuild the navigation state from the last persisted view and table.
    pub fn restore(last_view: Option<&str>, last_table: Option<&str>, progress: &Progress) -> Self {
        let selected_table = last_table
            .and_then(|s| s.trim().parse::<u32>().ok())
            .filter(|t| (MIN_TABLE..=MAX_TABLE).contains(t))
            .unwrap_or(MIN_TABLE);

        let view = match last_view.and_then(View::from_key) {
            Some(View::Learn) if !progress.is_unlocked(selected_table) => View::Map,
            Some(v) if v.is_restorable() => v,
            _ => View::Map,
        };

        Self {
            view,
            selected_table,
        }
    }

    /// Compute the next state for `action`. Returns `None` when the action
    /// is not valid from the current view (including selecting a locked
    /// table); callers treat that as a no-op.
    pub fn next(&self, action: NavAction, progress: &Progress) -> Option<Step> {
        let unchanged = |view: View| Step {
            nav: NavigationState {
                view,
                selected_table: self.selected_table,
            },
            progress: progress.clone(),
        };

        match (self.view, action) {
            (View::Map, NavAction::SelectTable(table)) if progress.is_unlocked(table) => {
                Some(Step {
                    nav: NavigationState {
                        view: View::Learn,
                        selected_table: table,
                    },
                    progress: progress.clone(),
                })
            }
            (View::Map, NavAction::StartReview) => Some(unchanged(View::Review)),
            (View::Learn, NavAction::Back) => Some(unchanged(View::Map)),
            (View::Learn, NavAction::StartQuiz) => Some(unchanged(View::Quiz)),
            (View::Quiz, NavAction::CancelQuiz) => Some(unchanged(View::Map)),
            (View::Quiz, NavAction::FinishQuiz { success: true }) => Some(Step {
                nav: NavigationState {
                    view: View::Reward,
                    selected_table: self.selected_table,
                },
                progress: apply_quiz_result(progress, self.selected_table, true),
            }),
            (View::Quiz, NavAction::FinishQuiz { success: false }) => Some(unchanged(View::Map)),
            (View::Reward, NavAction::Continue) => Some(unchanged(View::Map)),
            (View::Review, NavAction::FinishReview) => Some(unchanged(View::Map)),
            _ => None,
        }
    }
}
