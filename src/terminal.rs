use crossterm::{
    cursor::{Hide, MoveTo, Show},
    event::{poll, read, Event, KeyCode, KeyModifiers},
    execute, queue,
    style::{Attribute, Color, Print, ResetColor, SetAttribute, SetForegroundColor},
    terminal::{
        disable_raw_mode, enable_raw_mode, size, Clear, ClearType, EnterAlternateScreen,
        LeaveAlternateScreen,
    },
    tty::IsTty,
};
use std::io::{self, stdout, Write};
use std::time::Duration;

/// Terminal abstraction for rendering
pub struct Terminal {
    width: u16,
    height: u16,
    buffer: Vec<Vec<Cell>>,
    alternate_screen: bool,
}

/// A single cell in the terminal buffer
#[derive(Clone, PartialEq, Debug)]
pub struct Cell {
    pub ch: char,
    pub fg: Option<Color>,
    pub bold: bool,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            ch: ' ',
            fg: None,
            bold: false,
        }
    }
}

impl Terminal {
    /// Take over the terminal: raw mode, alternate screen, hidden cursor.
    /// Fails when stdout is not a terminal.
    pub fn new() -> io::Result<Self> {
        if !stdout().is_tty() {
            return Err(io::Error::other("stdout is not a terminal"));
        }
        let (width, height) = size()?;

        enable_raw_mode()?;
        execute!(stdout(), EnterAlternateScreen, Hide)?;

        Ok(Self {
            width,
            height,
            buffer: vec![vec![Cell::default(); width as usize]; height as usize],
            alternate_screen: true,
        })
    }

    /// Off-screen buffer of a fixed size (print mode and tests)
    pub fn headless(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            buffer: vec![vec![Cell::default(); width as usize]; height as usize],
            alternate_screen: false,
        }
    }

    /// Get terminal dimensions
    pub fn size(&self) -> (u16, u16) {
        (self.width, self.height)
    }

    /// Current size of the real terminal, falling back to the buffer size
    pub fn poll_size(&self) -> (u16, u16) {
        if self.alternate_screen {
            size().unwrap_or((self.width, self.height))
        } else {
            (self.width, self.height)
        }
    }

    pub fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
        self.buffer = vec![vec![Cell::default(); width as usize]; height as usize];
    }

    /// Clear the buffer
    pub fn clear(&mut self) {
        for row in &mut self.buffer {
            row.fill(Cell::default());
        }
    }

    /// Clear the actual terminal
    pub fn clear_screen(&self) -> io::Result<()> {
        if self.alternate_screen {
            execute!(stdout(), Clear(ClearType::All))?;
        }
        Ok(())
    }

    /// Set a character at position with optional color
    pub fn set(&mut self, x: i32, y: i32, ch: char, fg: Option<Color>, bold: bool) {
        if x >= 0 && x < self.width as i32 && y >= 0 && y < self.height as i32 {
            self.buffer[y as usize][x as usize] = Cell { ch, fg, bold };
        }
    }

    /// Set a string starting at position
    pub fn set_str(&mut self, x: i32, y: i32, s: &str, fg: Option<Color>, bold: bool) {
        for (i, ch) in s.chars().enumerate() {
            self.set(x + i as i32, y, ch, fg, bold);
        }
    }

    #[cfg(test)]
    pub fn get(&self, x: u16, y: u16) -> Option<&Cell> {
        self.buffer.get(y as usize)?.get(x as usize)
    }

    /// Buffer row as plain text
    #[cfg(test)]
    pub fn row_text(&self, y: u16) -> String {
        self.buffer
            .get(y as usize)
            .map(|row| row.iter().map(|c| c.ch).collect())
            .unwrap_or_default()
    }

    /// Render the entire buffer to screen
    pub fn present(&self) -> io::Result<()> {
        let mut out = stdout();

        for (y, row) in self.buffer.iter().enumerate() {
            queue!(out, MoveTo(0, y as u16))?;

            for cell in row {
                if cell.bold {
                    queue!(out, SetAttribute(Attribute::Bold))?;
                }

                if let Some(color) = cell.fg {
                    queue!(out, SetForegroundColor(color), Print(cell.ch), ResetColor)?;
                } else {
                    queue!(out, Print(cell.ch))?;
                }

                if cell.bold {
                    queue!(out, SetAttribute(Attribute::Reset))?;
                }
            }
        }

        out.flush()?;
        Ok(())
    }

    /// Check for keypress (non-blocking), returns (code, modifiers)
    pub fn check_key(&self) -> io::Result<Option<(KeyCode, KeyModifiers)>> {
        if !self.alternate_screen {
            return Ok(None);
        }
        if poll(Duration::from_millis(0))? {
            if let Event::Key(key_event) = read()? {
                return Ok(Some((key_event.code, key_event.modifiers)));
            }
        }
        Ok(None)
    }

    /// Sleep for specified duration
    pub fn sleep(&self, seconds: f32) {
        std::thread::sleep(Duration::from_secs_f32(seconds));
    }

    /// Write the buffer as ANSI text (print mode)
    pub fn write_ansi<W: Write>(&self, out: &mut W) -> io::Result<()> {
        for row in &self.buffer {
            for cell in row {
                if cell.ch == ' ' {
                    write!(out, " ")?;
                    continue;
                }

                if cell.bold {
                    write!(out, "\x1b[1m")?;
                }

                if let Some(color) = cell.fg {
                    match color {
                        Color::Rgb { r, g, b } => write!(out, "\x1b[38;2;{};{};{}m", r, g, b)?,
                        Color::AnsiValue(v) => write!(out, "\x1b[38;5;{}m", v)?,
                        // Standard colors (0-7)
                        Color::Black => write!(out, "\x1b[30m")?,
                        Color::DarkRed => write!(out, "\x1b[31m")?,
                        Color::DarkGreen => write!(out, "\x1b[32m")?,
                        Color::DarkYellow => write!(out, "\x1b[33m")?,
                        Color::DarkBlue => write!(out, "\x1b[34m")?,
                        Color::DarkMagenta => write!(out, "\x1b[35m")?,
                        Color::DarkCyan => write!(out, "\x1b[36m")?,
                        Color::Grey => write!(out, "\x1b[37m")?,
                        // Bright colors (8-15)
                        Color::DarkGrey => write!(out, "\x1b[90m")?,
                        Color::Red => write!(out, "\x1b[91m")?,
                        Color::Green => write!(out, "\x1b[92m")?,
                        Color::Yellow => write!(out, "\x1b[93m")?,
                        Color::Blue => write!(out, "\x1b[94m")?,
                        Color::Magenta => write!(out, "\x1b[95m")?,
                        Color::Cyan => write!(out, "\x1b[96m")?,
                        Color::White => write!(out, "\x1b[97m")?,
                        _ => {}
                    }
                }

                write!(out, "{}\x1b[0m", cell.ch)?;
            }
            writeln!(out)?;
        }
        out.flush()
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        if self.alternate_screen {
            let _ = execute!(stdout(), Show, LeaveAlternateScreen);
            let _ = disable_raw_mode();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headless_set_and_clip() {
        let mut term = Terminal::headless(4, 2);
        term.set_str(2, 1, "abc", Some(Color::Cyan), false);
        term.set(-1, 0, 'x', None, false);
        assert_eq!(term.row_text(0), "    ");
        assert_eq!(term.row_text(1), "  ab");
        assert_eq!(term.get(2, 1).unwrap().fg, Some(Color::Cyan));
        assert!(term.get(9, 9).is_none());
    }

    #[test]
    fn ansi_output_has_one_line_per_row() {
        let mut term = Terminal::headless(3, 2);
        term.set(0, 0, '⠿', Some(Color::Green), true);
        let mut out = Vec::new();
        term.write_ansi(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.lines().count(), 2);
        assert!(text.contains("\x1b[1m\x1b[92m⠿\x1b[0m"));
    }

    #[test]
    fn resize_reallocates() {
        let mut term = Terminal::headless(2, 2);
        term.resize(5, 3);
        assert_eq!(term.size(), (5, 3));
        assert_eq!(term.row_text(2).chars().count(), 5);
    }
}
