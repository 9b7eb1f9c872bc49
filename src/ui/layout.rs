use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Screens shorter than this drop the progress bar row.
const COMPACT_HEIGHT: u16 = 18;

pub struct AppLayout {
    pub header: Rect,
    pub main: Rect,
    pub progress: Option<Rect>,
    pub footer: Rect,
}

impl AppLayout {
    pub fn new(area: Rect) -> Self {
        if area.height < COMPACT_HEIGHT {
            let vertical = Layout::default()
                .direction(Direction::Vertical)
                .constraints([
                    Constraint::Length(3),
                    Constraint::Min(6),
                    Constraint::Length(1),
                ])
                .split(area);
            return Self {
                header: vertical[0],
                main: vertical[1],
                progress: None,
                footer: vertical[2],
            };
        }

        let vertical = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(10),
                Constraint::Length(3),
                Constraint::Length(2),
            ])
            .split(area);

        Self {
            header: vertical[0],
            main: vertical[1],
            progress: Some(vertical[2]),
            footer: vertical[3],
        }
    }
}

pub fn pack_hint_lines(hints: &[&str], width: usize) -> Vec<String> {
    if width == 0 || hints.is_empty() {
        return Vec::new();
    }

    let prefix = "  ";
    let separator = "  ";
    let mut out: Vec<String> = Vec::new();
    let mut current = prefix.to_string();
    let mut has_hint = false;

    for hint in hints.iter().filter(|h| !h.is_empty()) {
        let candidate = if has_hint {
            format!("{current}{separator}{hint}")
        } else {
            format!("{current}{hint}")
        };
        if candidate.chars().count() <= width {
            current = candidate;
        } else {
            if has_hint {
                out.push(current);
            }
            current = format!("{prefix}{hint}");
        }
        has_hint = true;
    }

    if has_hint {
        out.push(current);
    }
    out
}

/// Rect of the given percentage size centered in `area`, never smaller
/// than `min_w` x `min_h` unless `area` itself is.
pub fn centered_rect(percent_x: u16, percent_y: u16, min_w: u16, min_h: u16, area: Rect) -> Rect {
    let requested_w = area.width.saturating_mul(percent_x.min(100)) / 100;
    let requested_h = area.height.saturating_mul(percent_y.min(100)) / 100;

    let target_w = requested_w.max(min_w).min(area.width);
    let target_h = requested_h.max(min_h).min(area.height);

    let left = area.x + (area.width - target_w) / 2;
    let top = area.y + (area.height - target_h) / 2;

    Rect::new(left, top, target_w, target_h)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compact_layout_drops_progress_row() {
        assert!(AppLayout::new(Rect::new(0, 0, 80, 12)).progress.is_none());
        let full = AppLayout::new(Rect::new(0, 0, 80, 30));
        assert!(full.progress.is_some());
        assert_eq!(full.header.height, 3);
    }

    #[test]
    fn test_hints_wrap_to_width() {
        let lines = pack_hint_lines(&["[Enter] Elegir", "[r] Repasar", "[q] Salir"], 30);
        assert_eq!(lines.len(), 2);
        assert!(lines.iter().all(|l| l.chars().count() <= 30));
        assert!(pack_hint_lines(&[], 30).is_empty());
    }

    #[test]
    fn test_centered_rect_stays_inside() {
        let area = Rect::new(0, 0, 40, 10);
        let r = centered_rect(50, 50, 60, 20, area);
        assert_eq!(r, area);
        let r = centered_rect(50, 50, 10, 4, Rect::new(0, 0, 100, 40));
        assert_eq!(r, Rect::new(25, 10, 50, 20));
    }
}
