use crossterm::event::KeyCode;
use crossterm::style::Color;

/// Palette per scheme, faint to bright. Index 0 is the default emerald.
const PALETTES: [(&str, [Color; 4]); 10] = [
    ("emerald", [Color::DarkGreen, Color::Green, Color::Green, Color::AnsiValue(10)]),
    ("fire", [Color::DarkRed, Color::Red, Color::DarkYellow, Color::Yellow]),
    ("ice", [Color::DarkBlue, Color::Blue, Color::Cyan, Color::Cyan]),
    ("pink", [Color::DarkMagenta, Color::Magenta, Color::Magenta, Color::AnsiValue(13)]),
    ("gold", [Color::DarkYellow, Color::Yellow, Color::Yellow, Color::AnsiValue(11)]),
    ("electric", [Color::DarkCyan, Color::Cyan, Color::Cyan, Color::AnsiValue(14)]),
    ("lava", [Color::DarkRed, Color::Red, Color::Magenta, Color::AnsiValue(9)]),
    ("mono", [Color::DarkGrey, Color::Grey, Color::White, Color::White]),
    ("rainbow", [Color::Red, Color::Yellow, Color::Green, Color::Cyan]),
    ("ocean", [Color::DarkBlue, Color::Blue, Color::DarkCyan, Color::Cyan]),
];

/// Shared color scheme state
#[derive(Clone, Copy)]
pub struct ColorState {
    pub scheme: u8,
}

impl ColorState {
    pub fn new(default_scheme: u8) -> Self {
        Self {
            scheme: default_scheme.min(PALETTES.len() as u8 - 1),
        }
    }

    /// Shifted digits pick a scheme. Returns true if the key was handled.
    pub fn handle_key(&mut self, code: KeyCode) -> bool {
        const SHIFTED: [char; 10] = [')', '!', '@', '#', '$', '%', '^', '&', '*', '('];
        match code {
            KeyCode::Char(c) => match SHIFTED.iter().position(|&s| s == c) {
                Some(idx) => {
                    self.scheme = idx as u8;
                    true
                }
                None => false,
            },
            _ => false,
        }
    }

    pub fn name(&self) -> &'static str {
        PALETTES[self.scheme as usize % PALETTES.len()].0
    }
}

/// Get color from scheme based on intensity (0-3)
pub fn scheme_color(scheme: u8, intensity: u8, bold: bool) -> (Color, bool) {
    let palette = &PALETTES[scheme as usize % PALETTES.len()].1;
    let idx = intensity.min(3) as usize;
    (palette[idx], bold || idx == 3)
}

/// Color for a braille dot level: 1 faint, 2 mid, 3 landmass, 4+ markers
pub fn dot_color(scheme: u8, level: u8) -> (Color, bool) {
    match level {
        0 | 1 => scheme_color(scheme, 0, false),
        2 => scheme_color(scheme, 1, false),
        3 => scheme_color(scheme, 2, true),
        _ => (Color::White, true),
    }
}
