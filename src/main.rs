use std::io;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::Result;
use clap::Parser;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Paragraph, Wrap};
use tracing::{info, warn};

use tablas::app::App;
use tablas::config::Config;
use tablas::engine::navigation::View;
use tablas::event::{AppEvent, EventHandler};
use tablas::explain::provider_from_config;
use tablas::generator::{MAX_FACTOR, MAX_TABLE, MIN_FACTOR};
use tablas::logging;
use tablas::store::json_store::JsonStore;
use tablas::ui::components::progress_bar::ProgressBar;
use tablas::ui::components::quiz_card::QuizCard;
use tablas::ui::components::table_map::TableMap;
use tablas::ui::layout::{AppLayout, centered_rect, pack_hint_lines};
use tablas::ui::theme::Theme;

#[derive(Parser)]
#[command(
    name = "tablas",
    version,
    about = "Multiplication-table tutor with unlockable tables and voice answers"
)]
struct Cli {
    #[arg(short, long, help = "Learner's name used in messages")]
    name: Option<String>,

    #[arg(short, long, help = "Theme name (bundled: hada, unicornio)")]
    theme: Option<String>,

    #[arg(long, help = "Never contact the text generation service")]
    offline: bool,

    #[arg(long, help = "Disable voice answers")]
    no_voice: bool,

    #[arg(long, help = "Directory for saved progress and logs")]
    data_dir: Option<PathBuf>,

    #[arg(long, help = "Write the effective configuration to the config file and exit")]
    write_config: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load().unwrap_or_default();
    if let Some(name) = cli.name {
        config.child_name = name;
    }
    if let Some(theme) = cli.theme {
        if Theme::load(&theme).is_some() {
            config.theme = theme;
        } else {
            eprintln!(
                "Unknown theme '{theme}'. Available: {}",
                Theme::available_themes().join(", ")
            );
        }
    }
    if cli.offline {
        config.ai_enabled = false;
    }
    if cli.no_voice {
        config.voice_command.clear();
    }
    config.validate();

    if cli.write_config {
        config.save()?;
        println!("Configuration written to {}", Config::config_dir().display());
        return Ok(());
    }

    let store = match cli.data_dir {
        Some(dir) => JsonStore::with_base_dir(dir),
        None => JsonStore::new(),
    }
    .ok();
    let log_dir = store
        .as_ref()
        .map(|s| s.base_dir().to_path_buf())
        .unwrap_or_else(JsonStore::default_dir);
    let _ = logging::init(&log_dir);
    if store.is_none() {
        warn!("data directory unavailable, progress will not be saved");
    }
    info!(version = env!("CARGO_PKG_VERSION"), "starting tablas");

    let provider = provider_from_config(&config);
    let mut app = App::new(config, store, provider);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let events = EventHandler::new(Duration::from_millis(100));

    let result = run_app(&mut terminal, &mut app, &events);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        eprintln!("Error: {err:?}");
    }

    Ok(())
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &EventHandler,
) -> Result<()> {
    loop {
        terminal.draw(|frame| render(frame, app))?;

        match events.next()? {
            AppEvent::Key(key) => {
                let now = Instant::now();
                handle_key(app, key, now);
                app.tick(now);
            }
            AppEvent::Tick(now) => app.tick(now),
            AppEvent::Resize => {}
        }

        if app.should_quit {
            info!("quitting");
            return Ok(());
        }
    }
}

fn handle_key(app: &mut App, key: KeyEvent, now: Instant) {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.should_quit = true;
        return;
    }

    match app.nav.view {
        View::Map => handle_map_key(app, key),
        View::Learn => handle_learn_key(app, key),
        View::Quiz | View::Review => handle_quiz_key(app, key, now),
        View::Reward => handle_reward_key(app, key),
    }
}

fn handle_map_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.should_quit = true,
        KeyCode::Left | KeyCode::Char('h') => app.move_map_cursor(-1, 0),
        KeyCode::Right | KeyCode::Char('l') => app.move_map_cursor(1, 0),
        KeyCode::Up | KeyCode::Char('k') => app.move_map_cursor(0, -1),
        KeyCode::Down | KeyCode::Char('j') => app.move_map_cursor(0, 1),
        KeyCode::Enter => {
            app.select_cursor();
        }
        KeyCode::Char('r') => {
            app.start_review();
        }
        KeyCode::Char(ch) if ch.is_ascii_digit() => {
            let table = match ch.to_digit(10) {
                Some(0) => MAX_TABLE,
                Some(n) => n,
                None => return,
            };
            app.map_cursor = table;
            app.select_table(table);
        }
        _ => {}
    }
}

fn handle_learn_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Enter => {
            app.start_quiz();
        }
        KeyCode::Esc | KeyCode::Backspace => {
            app.back();
        }
        _ => {}
    }
}

fn handle_quiz_key(app: &mut App, key: KeyEvent, now: Instant) {
    match key.code {
        KeyCode::Esc => {
            if app.nav.view == View::Review {
                app.finish_review();
            } else {
                app.cancel_quiz();
            }
        }
        KeyCode::Char(ch @ '1'..='4') => {
            let index = (ch as u8 - b'1') as usize;
            app.choose_option(index, now);
        }
        KeyCode::Left | KeyCode::Char('h') => app.move_option_cursor(-1),
        KeyCode::Right | KeyCode::Char('l') | KeyCode::Tab => app.move_option_cursor(1),
        KeyCode::Enter => {
            app.choose_cursor(now);
        }
        KeyCode::Char('v') => app.toggle_voice(),
        _ => {}
    }
}

fn handle_reward_key(app: &mut App, key: KeyEvent) {
    if matches!(key.code, KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ')) {
        app.continue_from_reward();
    }
}

fn render(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let colors = &app.theme.colors;

    let bg = Block::default().style(Style::default().bg(colors.bg()).fg(colors.fg()));
    frame.render_widget(bg, area);

    let layout = AppLayout::new(area);
    render_header(frame, app, layout.header);

    match app.nav.view {
        View::Map => render_map(frame, app, &layout),
        View::Learn => render_learn(frame, app, &layout),
        View::Quiz | View::Review => render_quiz(frame, app, &layout),
        View::Reward => render_reward(frame, app, &layout),
    }

    render_footer(frame, app, layout.footer);
}

fn render_header(frame: &mut ratatui::Frame, app: &App, area: Rect) {
    let colors = &app.theme.colors;
    let title = match app.nav.view {
        View::Map => "Mapa de tablas".to_string(),
        View::Learn => format!("Aprende la tabla del {}", app.nav.selected_table),
        View::Quiz => format!("Desafío: tabla del {}", app.nav.selected_table),
        View::Review => "Repaso mágico".to_string(),
        View::Reward => "¡Recompensa!".to_string(),
    };

    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            " tablas ",
            Style::default()
                .fg(colors.header_bg())
                .bg(colors.header_fg())
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!(" {title} "),
            Style::default()
                .fg(colors.header_fg())
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("| {} ", app.config.child_name),
            Style::default().fg(colors.muted()),
        ),
        Span::styled(
            format!("| ⭐ {} ", app.progress.stars),
            Style::default().fg(colors.star()).add_modifier(Modifier::BOLD),
        ),
    ]))
    .block(
        Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(colors.border())),
    )
    .style(Style::default().bg(colors.header_bg()));
    frame.render_widget(header, area);
}

fn render_footer(frame: &mut ratatui::Frame, app: &App, area: Rect) {
    let colors = &app.theme.colors;
    let hints: Vec<&str> = match app.nav.view {
        View::Map => {
            let mut hints = vec!["[←↑↓→] Mover", "[Enter/1-0] Elegir tabla"];
            if app.progress.mastered_count() > 0 {
                hints.push("[r] Repaso");
            }
            hints.push("[q] Salir");
            hints
        }
        View::Learn => vec!["[Enter] ¡Al desafío!", "[Esc] Volver al mapa"],
        View::Quiz | View::Review => {
            let mut hints = vec!["[1-4] Responder", "[←→ Enter] Elegir"];
            if app.voice_supported {
                hints.push(if app.is_listening() {
                    "[v] Apagar micrófono"
                } else {
                    "[v] Responder con la voz"
                });
            }
            hints.push(if app.nav.view == View::Review {
                "[Esc] Terminar repaso"
            } else {
                "[Esc] Salir del desafío"
            });
            hints
        }
        View::Reward => vec!["[Enter] Continuar"],
    };

    let lines: Vec<Line> = pack_hint_lines(&hints, area.width as usize)
        .into_iter()
        .map(|l| Line::from(Span::styled(l, Style::default().fg(colors.muted()))))
        .collect();
    frame.render_widget(Paragraph::new(lines), area);
}

fn render_map(frame: &mut ratatui::Frame, app: &App, layout: &AppLayout) {
    let grid = centered_rect(90, 100, 60, 8, layout.main);
    frame.render_widget(TableMap::new(&app.progress, app.map_cursor, app.theme), grid);

    if let Some(progress_area) = layout.progress {
        frame.render_widget(
            ProgressBar::new(
                "Tablas dominadas",
                app.progress.mastered_count(),
                MAX_TABLE as usize,
                app.theme,
            ),
            progress_area,
        );
    }
}

fn render_learn(frame: &mut ratatui::Frame, app: &App, layout: &AppLayout) {
    let colors = &app.theme.colors;
    let table = app.nav.selected_table;

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(layout.main);

    let facts: Vec<Line> = (MIN_FACTOR..=MAX_FACTOR)
        .map(|factor| {
            Line::from(vec![
                Span::styled(
                    format!("{table} × {factor:>2} = "),
                    Style::default().fg(colors.fg()),
                ),
                Span::styled(
                    format!("{:>3}", table * factor),
                    Style::default()
                        .fg(colors.accent())
                        .add_modifier(Modifier::BOLD),
                ),
            ])
        })
        .collect();
    frame.render_widget(
        Paragraph::new(facts).alignment(Alignment::Center).block(
            Block::bordered()
                .title(format!(" Tabla del {table} "))
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(colors.border())),
        ),
        columns[0],
    );

    let explanation = match &app.explanation {
        Some(text) => Line::from(Span::styled(text.as_str(), Style::default().fg(colors.fg()))),
        None => Line::from(Span::styled(
            "El hada está pensando… ✨",
            Style::default()
                .fg(colors.muted())
                .add_modifier(Modifier::ITALIC),
        )),
    };
    frame.render_widget(
        Paragraph::new(explanation).wrap(Wrap { trim: true }).block(
            Block::bordered()
                .title(" ✨ Explicación mágica ")
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(colors.accent_alt())),
        ),
        columns[1],
    );
}

fn render_quiz(frame: &mut ratatui::Frame, app: &App, layout: &AppLayout) {
    let colors = &app.theme.colors;
    let Some(quiz) = app.quiz.as_ref() else {
        return;
    };

    if quiz.is_empty() {
        let message = Paragraph::new(vec![
            Line::from("Todavía no has dominado ninguna tabla."),
            Line::from("¡Aprende una tabla primero para poder repasar! 🦄"),
        ])
        .style(Style::default().fg(colors.muted()))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
        frame.render_widget(message, centered_rect(60, 30, 40, 4, layout.main));
        return;
    }

    let card = centered_rect(80, 90, 50, 12, layout.main);
    frame.render_widget(QuizCard::new(quiz, app.is_listening(), app.theme), card);

    if let Some(progress_area) = layout.progress {
        frame.render_widget(
            ProgressBar::new("Pregunta", quiz.current, quiz.len(), app.theme),
            progress_area,
        );
    }
}

fn render_reward(frame: &mut ratatui::Frame, app: &App, layout: &AppLayout) {
    let colors = &app.theme.colors;
    let table = app.nav.selected_table;

    let mut lines = vec![
        Line::from(Span::styled(
            format!("🏆 ¡Tabla del {table} dominada! 🏆"),
            Style::default()
                .fg(colors.header_fg())
                .add_modifier(Modifier::BOLD),
        )),
        Line::default(),
    ];

    if let Some(reward) = app.last_reward.filter(|r| r.table == table) {
        lines.push(Line::from(Span::styled(
            format!("+{} ⭐  (total: {})", reward.stars_earned, app.progress.stars),
            Style::default().fg(colors.star()).add_modifier(Modifier::BOLD),
        )));
        if reward.first_mastery && table < MAX_TABLE {
            lines.push(Line::from(Span::styled(
                format!("¡Has desbloqueado la tabla del {}!", table + 1),
                Style::default().fg(colors.mastered()),
            )));
        }
        lines.push(Line::default());
    }

    if let Some(achievement) = app.achievement() {
        lines.push(Line::from(Span::styled(
            format!("{} {}", achievement.icon, achievement.title),
            Style::default()
                .fg(colors.accent_alt())
                .add_modifier(Modifier::BOLD),
        )));
        lines.push(Line::from(Span::styled(
            achievement.description,
            Style::default().fg(colors.fg()),
        )));
        lines.push(Line::default());
    }

    lines.push(match &app.motivation {
        Some(text) => Line::from(Span::styled(text.as_str(), Style::default().fg(colors.accent()))),
        None => Line::from(Span::styled(
            "El hada está escribiendo un mensaje… 🧚",
            Style::default()
                .fg(colors.muted())
                .add_modifier(Modifier::ITALIC),
        )),
    });

    frame.render_widget(
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .block(
                Block::bordered()
                    .border_type(BorderType::Double)
                    .border_style(Style::default().fg(colors.star())),
            ),
        centered_rect(70, 80, 50, 12, layout.main),
    );
}
