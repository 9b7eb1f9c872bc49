use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, BorderType, Paragraph, Widget};

use crate::app::MAP_COLUMNS;
use crate::engine::progress::{Progress, TableStatus};
use crate::generator::{MAX_TABLE, MIN_TABLE};
use crate::ui::theme::Theme;

/// The grid of tables on the map screen.
pub struct TableMap<'a> {
    pub progress: &'a Progress,
    pub cursor: u32,
    pub theme: &'a Theme,
}

impl<'a> TableMap<'a> {
    pub fn new(progress: &'a Progress, cursor: u32, theme: &'a Theme) -> Self {
        Self {
            progress,
            cursor,
            theme,
        }
    }
}

pub fn status_marker(status: TableStatus) -> &'static str {
    match status {
        TableStatus::Locked => "🔒",
        TableStatus::Unlocked => "✨",
        TableStatus::Mastered => "⭐",
    }
}

impl Widget for TableMap<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let tables: Vec<u32> = (MIN_TABLE..=MAX_TABLE).collect();
        let rows: Vec<&[u32]> = tables.chunks(MAP_COLUMNS as usize).collect();

        let row_areas = Layout::default()
            .direction(Direction::Vertical)
            .constraints(vec![Constraint::Ratio(1, rows.len() as u32); rows.len()])
            .split(area);

        for (row, row_area) in rows.iter().zip(row_areas.iter()) {
            let cells = Layout::default()
                .direction(Direction::Horizontal)
                .constraints(vec![Constraint::Ratio(1, MAP_COLUMNS); MAP_COLUMNS as usize])
                .split(*row_area);

            for (&table, cell) in row.iter().zip(cells.iter()) {
                let status = self.progress.table_status(table);
                let selected = table == self.cursor;

                let tone = match status {
                    TableStatus::Locked => colors.locked(),
                    TableStatus::Unlocked => colors.accent(),
                    TableStatus::Mastered => colors.mastered(),
                };
                let mut border = Style::default().fg(if selected { colors.accent_alt() } else { tone });
                if selected {
                    border = border.add_modifier(Modifier::BOLD);
                }

                let block = Block::bordered()
                    .border_type(if selected {
                        BorderType::Thick
                    } else {
                        BorderType::Rounded
                    })
                    .border_style(border)
                    .style(Style::default().bg(colors.bg()));

                let lines = vec![
                    Line::from(format!("Tabla del {table}"))
                        .style(Style::default().fg(tone).add_modifier(Modifier::BOLD)),
                    Line::from(status_marker(status)),
                ];
                Paragraph::new(lines)
                    .alignment(Alignment::Center)
                    .block(block)
                    .render(*cell, buf);
            }
        }
    }
}
