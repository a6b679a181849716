//! ANSI output adapter (crossterm)

use crossterm::style::{Color, Stylize};
use opshell_foundation::{OutputAdapter, StyledText};

/// Renders highlighted spans in bold colour
#[derive(Debug, Clone, Copy)]
pub struct AnsiAdapter {
    color: Color,
}

impl AnsiAdapter {
    pub fn new(color: Color) -> Self {
        Self { color }
    }

    /// Adapter for a configured colour name (unknown names fall back to yellow)
    pub fn from_name(name: &str) -> Self {
        Self::new(parse_color(name).unwrap_or(Color::Yellow))
    }
}

impl OutputAdapter for AnsiAdapter {
    fn name(&self) -> &str {
        "ansi"
    }

    fn render(&self, text: &StyledText) -> String {
        let mut out = String::new();
        for span in text.spans() {
            if span.highlighted {
                out.push_str(&span.text.as_str().with(self.color).bold().to_string());
            } else {
                out.push_str(&span.text);
            }
        }
        out
    }
}

fn parse_color(name: &str) -> Option<Color> {
    let color = match name.trim().to_ascii_lowercase().as_str() {
        "black" => Color::Black,
        "red" => Color::Red,
        "green" => Color::Green,
        "yellow" => Color::Yellow,
        "blue" => Color::Blue,
        "magenta" => Color::Magenta,
        "cyan" => Color::Cyan,
        "white" => Color::White,
        "grey" | "gray" => Color::Grey,
        "dark_red" => Color::DarkRed,
        "dark_green" => Color::DarkGreen,
        "dark_yellow" => Color::DarkYellow,
        "dark_blue" => Color::DarkBlue,
        "dark_magenta" => Color::DarkMagenta,
        "dark_cyan" => Color::DarkCyan,
        "dark_grey" | "dark_gray" => Color::DarkGrey,
        _ => return None,
    };
    Some(color)
}
