use std::fs;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use rand::SeedableRng;
use rand::rngs::SmallRng;
use tempfile::TempDir;

use tablas::app::App;
use tablas::config::Config;
use tablas::engine::navigation::{NavAction, NavigationState, View};
use tablas::engine::progress::{Progress, apply_quiz_result};
use tablas::explain::{ExplanationProvider, motivation_fallback};
use tablas::generator::question::generate_review_quiz;
use tablas::store::json_store::JsonStore;

/// Provider that answers instantly with fixed texts.
struct CannedProvider;

impl ExplanationProvider for CannedProvider {
    fn table_explanation(&self, table: u32, sample_factor: u32) -> String {
        format!("{table} por {sample_factor}")
    }

    fn motivational_message(&self, child_name: &str, _achievement: &str) -> String {
        motivation_fallback(child_name)
    }
}

fn open_app(dir: &TempDir) -> App {
    let store = JsonStore::with_base_dir(dir.path().to_path_buf()).unwrap();
    App::new(Config::default(), Some(store), Arc::new(CannedProvider))
        .with_rng(SmallRng::seed_from_u64(11))
}

fn pass_current_quiz(app: &mut App) {
    let mut now = Instant::now();
    while let Some(answer) = app
        .quiz
        .as_ref()
        .and_then(|q| q.question())
        .map(|q| q.answer)
    {
        app.quiz.as_mut().unwrap().choose(answer, now);
        now += Duration::from_secs(2);
        app.tick(now);
    }
}

fn settle(app: &mut App) {
    let deadline = Instant::now() + Duration::from_secs(5);
    while app.pending.is_some() && Instant::now() < deadline {
        app.tick(Instant::now());
        thread::sleep(Duration::from_millis(5));
    }
}

#[test]
fn fresh_install_walkthrough() {
    let dir = TempDir::new().unwrap();
    let mut app = open_app(&dir);
    assert_eq!(app.nav, NavigationState::default());

    assert!(app.select_table(1));
    settle(&mut app);
    assert_eq!(app.explanation.as_deref(), Some("1 por 5"));

    assert!(app.start_quiz());
    pass_current_quiz(&mut app);
    assert_eq!(app.nav.view, View::Reward);
    assert_eq!(app.progress.stars, 20);
    assert_eq!(
        app.progress.unlocked_tables.iter().copied().collect::<Vec<_>>(),
        vec![1, 2]
    );
    settle(&mut app);
    assert_eq!(app.motivation, Some(motivation_fallback("Valentina")));

    assert!(app.continue_from_reward());
    assert_eq!(app.nav.view, View::Map);

    // Passing the same table again only adds the repeat bonus.
    app.select_table(1);
    app.start_quiz();
    pass_current_quiz(&mut app);
    app.continue_from_reward();
    assert_eq!(app.progress.stars, 25);
    assert_eq!(app.progress.mastered_tables.len(), 1);
    assert!(!app.progress.is_unlocked(3));
}

#[test]
fn state_survives_restart() {
    let dir = TempDir::new().unwrap();
    {
        let mut app = open_app(&dir);
        app.select_table(1);
        app.start_quiz();
        pass_current_quiz(&mut app);
        app.continue_from_reward();
        app.select_table(2);
        assert_eq!(app.nav.view, View::Learn);
    }

    let app = open_app(&dir);
    assert_eq!(app.nav.view, View::Learn);
    assert_eq!(app.nav.selected_table, 2);
    assert_eq!(app.progress.stars, 20);
    assert!(app.pending.is_some(), "restored learn screen asks for its text");
}

#[test]
fn quiz_and_reward_are_not_resumed() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("session.json"),
        r#"{"lastView":"reward","lastTable":"1"}"#,
    )
    .unwrap();
    let app = open_app(&dir);
    assert_eq!(app.nav.view, View::Map);
    assert!(app.quiz.is_none());

    fs::write(
        dir.path().join("session.json"),
        r#"{"lastView":"quiz","lastTable":"1"}"#,
    )
    .unwrap();
    let app = open_app(&dir);
    assert_eq!(app.nav.view, View::Map);
}

#[test]
fn hand_edited_progress_is_repaired() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("progress.json"),
        r#"{"unlockedTables":[1,2,3,4,5,6,7,8,9,10],"masteredTables":[1,4],"stars":40}"#,
    )
    .unwrap();
    let mut app = open_app(&dir);
    assert!(app.progress.is_consistent());
    assert!(app.progress.is_unlocked(2));
    assert!(!app.progress.is_unlocked(3));
    assert!(!app.select_table(5));
}

#[test]
fn every_table_can_be_mastered_in_order() {
    let mut progress = Progress::default();
    let mut nav = NavigationState::default();
    for table in 1..=10 {
        let step = nav.next(NavAction::SelectTable(table), &progress).unwrap();
        let step = step.nav.next(NavAction::StartQuiz, &step.progress).unwrap();
        let step = step
            .nav
            .next(NavAction::FinishQuiz { success: true }, &step.progress)
            .unwrap();
        let step = step.nav.next(NavAction::Continue, &step.progress).unwrap();
        nav = step.nav;
        progress = step.progress;
        assert!(progress.is_consistent());
    }
    assert_eq!(progress.mastered_tables.len(), 10);
    assert_eq!(progress.unlocked_tables.len(), 10);
    assert_eq!(progress.stars, 200);
    assert!((progress.mastered_ratio() - 1.0).abs() < f64::EPSILON);
    assert_eq!(apply_quiz_result(&progress, 10, true).stars, 205);
}

#[test]
fn review_draws_only_from_mastered_tables() {
    let mut rng = SmallRng::seed_from_u64(5);
    let mut progress = Progress::default();
    for table in 1..=3 {
        progress = apply_quiz_result(&progress, table, true);
    }
    let questions = generate_review_quiz(&progress.mastered_tables, 30, &mut rng);
    assert_eq!(questions.len(), 30);
    assert!(questions.iter().all(|q| (1..=3).contains(&q.factor_a)));
    assert!(questions.iter().all(|q| q.options.contains(&q.answer)));
}
