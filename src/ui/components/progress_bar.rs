use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::widgets::{Block, Widget};

use crate::ui::theme::Theme;

/// One-row bar with a bordered title and a centered caption such as `3/10`.
pub struct ProgressBar<'a> {
    pub title: String,
    pub ratio: f64,
    pub caption: String,
    pub theme: &'a Theme,
}

impl<'a> ProgressBar<'a> {
    pub fn new(title: &str, done: usize, total: usize, theme: &'a Theme) -> Self {
        let ratio = if total == 0 {
            0.0
        } else {
            done as f64 / total as f64
        };
        Self {
            title: title.to_string(),
            ratio: ratio.clamp(0.0, 1.0),
            caption: format!("{done}/{total}"),
            theme,
        }
    }
}

impl Widget for ProgressBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .title(format!(" {} ", self.title))
            .border_style(Style::default().fg(colors.border()));
        let inner = block.inner(area);
        block.render(area, buf);

        if inner.width == 0 || inner.height == 0 {
            return;
        }

        let filled_width = (self.ratio * inner.width as f64).round() as u16;
        for x in inner.x..inner.x + inner.width {
            let bg = if x < inner.x + filled_width {
                colors.bar_filled()
            } else {
                colors.bar_empty()
            };
            buf[(x, inner.y)].set_style(Style::default().bg(bg));
        }

        let caption_x = inner.x + inner.width.saturating_sub(self.caption.len() as u16) / 2;
        buf.set_string(
            caption_x,
            inner.y,
            &self.caption,
            Style::default().fg(colors.fg()),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ratio_and_caption() {
        let theme = Theme::default();
        let bar = ProgressBar::new("Tablas", 3, 10, &theme);
        assert!((bar.ratio - 0.3).abs() < 1e-9);
        assert_eq!(bar.caption, "3/10");
        assert_eq!(ProgressBar::new("Vacío", 0, 0, &theme).ratio, 0.0);
    }

    #[test]
    fn test_renders_fill_and_caption() {
        let theme = Theme::default();
        let area = Rect::new(0, 0, 12, 3);
        let mut buf = Buffer::empty(area);
        ProgressBar::new("T", 5, 10, &theme).render(area, &mut buf);
        let row: String = (1..11).map(|x| buf[(x, 1)].symbol().to_string()).collect();
        assert!(row.contains("5/10"));
        assert_eq!(buf[(1, 1)].bg, theme.colors.bar_filled());
        assert_eq!(buf[(10, 1)].bg, theme.colors.bar_empty());
    }
}
