use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Paragraph, Widget};

use crate::session::quiz::{Feedback, QuizState};
use crate::ui::theme::Theme;

pub struct QuizCard<'a> {
    pub quiz: &'a QuizState,
    pub listening: bool,
    pub theme: &'a Theme,
}

impl<'a> QuizCard<'a> {
    pub fn new(quiz: &'a QuizState, listening: bool, theme: &'a Theme) -> Self {
        Self {
            quiz,
            listening,
            theme,
        }
    }
}

impl Widget for QuizCard<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(colors.border()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let Some(question) = self.quiz.question() else {
            return;
        };

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2),
                Constraint::Length(3),
                Constraint::Length(2),
                Constraint::Length(1),
                Constraint::Min(0),
            ])
            .split(inner);

        Paragraph::new(Line::from(format!(
            "{} × {} = ?",
            question.factor_a, question.factor_b
        )))
        .style(
            Style::default()
                .fg(colors.header_fg())
                .add_modifier(Modifier::BOLD),
        )
        .alignment(Alignment::Center)
        .render(layout[0], buf);

        let option_areas = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(vec![
                Constraint::Ratio(1, question.options.len().max(1) as u32);
                question.options.len()
            ])
            .split(layout[1]);

        for (index, (&option, cell)) in question.options.iter().zip(option_areas.iter()).enumerate() {
            let picked = self.quiz.selected == Some(option);
            let tone = match self.quiz.feedback {
                Some(Feedback::Correct { .. }) if picked => colors.correct(),
                Some(Feedback::Wrong { .. }) if picked => colors.wrong(),
                _ if index == self.quiz.cursor => colors.accent_alt(),
                _ => colors.accent(),
            };
            let border_type = if index == self.quiz.cursor {
                BorderType::Thick
            } else {
                BorderType::Rounded
            };
            Paragraph::new(Line::from(vec![
                Span::styled(format!("[{}] ", index + 1), Style::default().fg(colors.muted())),
                Span::styled(
                    option.to_string(),
                    Style::default().fg(tone).add_modifier(Modifier::BOLD),
                ),
            ]))
            .alignment(Alignment::Center)
            .block(
                Block::bordered()
                    .border_type(border_type)
                    .border_style(Style::default().fg(tone)),
            )
            .render(*cell, buf);
        }

        let verdict = match self.quiz.feedback {
            Some(Feedback::Correct { .. }) => {
                Line::from("¡Muy bien! 🎉").style(Style::default().fg(colors.correct()))
            }
            Some(Feedback::Wrong { .. }) => {
                Line::from("¡Casi! Inténtalo otra vez 💪").style(Style::default().fg(colors.wrong()))
            }
            None => Line::default(),
        };
        Paragraph::new(verdict)
            .alignment(Alignment::Center)
            .render(layout[2], buf);

        if self.listening || !self.quiz.transcript.is_empty() {
            let mut spans = Vec::new();
            if self.listening {
                spans.push(Span::styled(
                    "🎤 Escuchando… ",
                    Style::default().fg(colors.listening()),
                ));
            }
            if !self.quiz.transcript.is_empty() {
                spans.push(Span::styled(
                    format!("Dijiste: \"{}\"", self.quiz.transcript),
                    Style::default().fg(colors.muted()),
                ));
            }
            Paragraph::new(Line::from(spans))
                .alignment(Alignment::Center)
                .render(layout[3], buf);
        }
    }
}
