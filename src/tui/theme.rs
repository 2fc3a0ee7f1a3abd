use chrono::NaiveDate;
use ratatui::style::Color;

use crate::io::config::UiConfig;

/// Parsed color theme for the TUI
#[derive(Debug, Clone)]
pub struct Theme {
    pub background: Color,
    pub text: Color,
    pub text_bright: Color,
    pub highlight: Color,
    pub dim: Color,
    pub red: Color,
    pub yellow: Color,
    pub green: Color,
    pub cyan: Color,
    pub purple: Color,
    pub blue: Color,
    pub selection_bg: Color,
    pub selection_border: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Theme {
            background: Color::Rgb(0x0C, 0x00, 0x1B),
            text: Color::Rgb(0xB0, 0xAA, 0xFF),
            text_bright: Color::Rgb(0xFF, 0xFF, 0xFF),
            highlight: Color::Rgb(0xFB, 0x41, 0x96),
            dim: Color::Rgb(0x7D, 0x78, 0xBF),
            red: Color::Rgb(0xFF, 0x44, 0x44),
            yellow: Color::Rgb(0xFF, 0xD7, 0x00),
            green: Color::Rgb(0x44, 0xFF, 0x88),
            cyan: Color::Rgb(0x44, 0xDD, 0xFF),
            purple: Color::Rgb(0xCC, 0x66, 0xFF),
            blue: Color::Rgb(0x44, 0x88, 0xFF),
            selection_bg: Color::Rgb(0x3D, 0x14, 0x38),
            selection_border: Color::Rgb(0xFB, 0x41, 0x96),
        }
    }
}

/// Parse a hex color string like "#FF4444" into an RGB Color
fn parse_hex_color(hex: &str) -> Option<Color> {
    let hex = hex.strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some(Color::Rgb(r, g, b))
}

impl Theme {
    /// Create a theme from config, falling back to defaults
    pub fn from_config(ui: &UiConfig) -> Self {
        let mut theme = Theme::default();

        // Apply color overrides from [ui.colors]
        for (key, value) in &ui.colors {
            if let Some(color) = parse_hex_color(value) {
                match key.as_str() {
                    "background" => theme.background = color,
                    "text" => theme.text = color,
                    "text_bright" => theme.text_bright = color,
                    "highlight" => theme.highlight = color,
                    "dim" => theme.dim = color,
                    "red" => theme.red = color,
                    "yellow" => theme.yellow = color,
                    "green" => theme.green = color,
                    "cyan" => theme.cyan = color,
                    "purple" => theme.purple = color,
                    "blue" => theme.blue = color,
                    "selection_bg" => theme.selection_bg = color,
                    "selection_border" => theme.selection_border = color,
                    _ => {}
                }
            }
        }

        theme
    }

    /// Color for a priority label. The server's vocabulary is open-ended,
    /// so match loosely on the usual names and fall back to text.
    pub fn priority_color(&self, priority: &str) -> Color {
        let p = priority.to_lowercase();
        if p.starts_with("alta") || p.starts_with("high") || p.starts_with("urg") {
            self.red
        } else if p.starts_with("m\u{e9}dia") || p.starts_with("media") || p.starts_with("med") {
            self.yellow
        } else if p.starts_with("baixa") || p.starts_with("low") {
            self.green
        } else {
            self.text
        }
    }

    /// Color for a due date relative to today: overdue red, due today
    /// yellow, otherwise dim.
    pub fn due_color(&self, due: NaiveDate, today: NaiveDate) -> Color {
        if due < today {
            self.red
        } else if due == today {
            self.yellow
        } else {
            self.dim
        }
    }

    /// Stable color for a tag name, picked from a small palette by
    /// hashing the name. Tags come from the server list, so there is no
    /// per-tag config; the hash keeps a tag's color consistent across runs.
    pub fn tag_color(&self, tag: &str) -> Color {
        let palette = [self.blue, self.cyan, self.green, self.purple, self.yellow];
        let hash: usize = tag.bytes().map(|b| b as usize).sum();
        palette[hash % palette.len()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(
            parse_hex_color("#FF4444"),
            Some(Color::Rgb(0xFF, 0x44, 0x44))
        );
        assert_eq!(
            parse_hex_color("#0C001B"),
            Some(Color::Rgb(0x0C, 0x00, 0x1B))
        );
        assert_eq!(parse_hex_color("FF4444"), None); // missing #
        assert_eq!(parse_hex_color("#FF44"), None); // too short
        assert_eq!(parse_hex_color("#ZZZZZZ"), None); // invalid hex
    }

    #[test]
    fn test_from_config_overrides() {
        let mut ui = UiConfig::default();
        ui.colors.insert("background".into(), "#000000".into());
        ui.colors.insert("bogus".into(), "not-a-color".into());

        let theme = Theme::from_config(&ui);
        assert_eq!(theme.background, Color::Rgb(0, 0, 0));
        // Unchanged defaults still present
        assert_eq!(theme.text, Color::Rgb(0xB0, 0xAA, 0xFF));
    }

    #[test]
    fn test_priority_color() {
        let theme = Theme::default();
        assert_eq!(theme.priority_color("Alta"), theme.red);
        assert_eq!(theme.priority_color("high"), theme.red);
        assert_eq!(theme.priority_color("M\u{e9}dia"), theme.yellow);
        assert_eq!(theme.priority_color("Baixa"), theme.green);
        assert_eq!(theme.priority_color("whatever"), theme.text);
    }

    #[test]
    fn test_due_color() {
        let theme = Theme::default();
        let today = NaiveDate::from_ymd_opt(2024, 5, 10).unwrap();
        let yesterday = NaiveDate::from_ymd_opt(2024, 5, 9).unwrap();
        let tomorrow = NaiveDate::from_ymd_opt(2024, 5, 11).unwrap();
        assert_eq!(theme.due_color(yesterday, today), theme.red);
        assert_eq!(theme.due_color(today, today), theme.yellow);
        assert_eq!(theme.due_color(tomorrow, today), theme.dim);
    }

    #[test]
    fn test_tag_color_is_stable() {
        let theme = Theme::default();
        assert_eq!(theme.tag_color("backend"), theme.tag_color("backend"));
    }
}
