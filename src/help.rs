use crate::terminal::Terminal;
use crossterm::style::Color;

/// Where a boxed panel is anchored on screen.
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum Anchor {
    Center,
    TopLeft,
    TopRight,
    BottomLeft,
}

/// Draw `text` inside a single-line box. Returns the box's (x, y, w, h).
pub fn render_panel(
    term: &mut Terminal,
    anchor: Anchor,
    text: &str,
    border: Color,
    fg: Color,
) -> (usize, usize, usize, usize) {
    let lines: Vec<&str> = text.lines().collect();
    let max_width = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0);
    let box_width = max_width + 4; // 2 chars padding each side
    let box_height = lines.len() + 2;

    let (width, height) = term.size();
    let (width, height) = (width as usize, height as usize);
    let (start_x, start_y) = match anchor {
        Anchor::Center => (
            width.saturating_sub(box_width) / 2,
            height.saturating_sub(box_height) / 2,
        ),
        Anchor::TopLeft => (1, 0),
        Anchor::TopRight => (width.saturating_sub(box_width + 1), 0),
        Anchor::BottomLeft => (1, height.saturating_sub(box_height)),
    };

    let (x0, y0) = (start_x as i32, start_y as i32);
    let right = x0 + box_width as i32 - 1;
    let bottom = y0 + box_height as i32 - 1;

    term.set(x0, y0, '┌', Some(border), false);
    term.set(right, y0, '┐', Some(border), false);
    term.set(x0, bottom, '└', Some(border), false);
    term.set(right, bottom, '┘', Some(border), false);
    for x in x0 + 1..right {
        term.set(x, y0, '─', Some(border), false);
        term.set(x, bottom, '─', Some(border), false);
    }

    for (i, line) in lines.iter().enumerate() {
        let y = y0 + 1 + i as i32;
        term.set(x0, y, '│', Some(border), false);
        let padding = max_width.saturating_sub(line.chars().count());
        let padded = format!(" {}{} ", line, " ".repeat(padding));
        term.set_str(x0 + 1, y, &padded, Some(fg), false);
        term.set(right, y, '│', Some(border), false);
    }

    (start_x, start_y, box_width, box_height)
}

/// Centered help overlay box.
pub fn render_help_overlay(term: &mut Terminal, help_text: &str) {
    if help_text.is_empty() {
        return;
    }
    render_panel(term, Anchor::Center, help_text, Color::White, Color::Grey);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn panel_is_centered_and_boxed() {
        let mut term = Terminal::headless(20, 7);
        let (x, y, w, h) = render_panel(&mut term, Anchor::Center, "ab\ncdef", Color::White, Color::Grey);
        assert_eq!((w, h), (8, 4));
        assert_eq!((x, y), (6, 1));
        assert_eq!(term.row_text(1).trim(), "┌──────┐");
        assert_eq!(term.row_text(2).trim(), "│ ab   │");
        assert_eq!(term.row_text(4).trim(), "└──────┘");
    }

    #[test]
    fn top_right_anchor_leaves_margin() {
        let mut term = Terminal::headless(30, 5);
        let (x, _, w, _) = render_panel(&mut term, Anchor::TopRight, "hi", Color::White, Color::Grey);
        assert_eq!(x + w, 29);
    }

    #[test]
    fn empty_help_draws_nothing() {
        let mut term = Terminal::headless(10, 3);
        render_help_overlay(&mut term, "");
        assert!(term.row_text(1).trim().is_empty());
    }
}
