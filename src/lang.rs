//! Message formatting and colour codes.
//!
//! Templates use `&` colour codes (`&c`, `&l`, ...). They are translated to
//! section-sign codes when the configuration is loaded, and a console can turn
//! those into ANSI styling with [`render_ansi`].

use colored::{Color, ColoredString, Colorize};
use lazy_static::lazy_static;
use regex::Regex;

/// Marker that introduces a colour code in translated text
pub const COLOR_CHAR: char = '\u{00A7}';

lazy_static! {
    static ref ALT_COLOR_CODE: Regex = Regex::new(r"&([0-9a-fk-orA-FK-OR])").unwrap();
    static ref COLOR_CODE: Regex = Regex::new(r"\x{00A7}([0-9a-fk-orA-FK-OR])").unwrap();
}

/// Replace `&x` colour codes with their section-sign form.
pub fn translate_color_codes(text: &str) -> String {
    ALT_COLOR_CODE
        .replace_all(text, |caps: &regex::Captures| {
            format!("{}{}", COLOR_CHAR, caps[1].to_lowercase())
        })
        .into_owned()
}

/// Fill a suggestion template: `{0}` is the prefix, `{1}` the corrected command.
pub fn format_suggestion(template: &str, prefix: &str, command: &str) -> String {
    template.replace("{0}", prefix).replace("{1}", command)
}

/// Remove section-sign colour codes.
pub fn strip_color_codes(text: &str) -> String {
    COLOR_CODE.replace_all(text, "").into_owned()
}

#[derive(Debug, Default, Clone, Copy)]
struct Style {
    color: Option<Color>,
    bold: bool,
    italic: bool,
    underline: bool,
    strikethrough: bool,
}

impl Style {
    /// Apply one code; colours and `r` reset any formatting in effect.
    fn apply(&mut self, code: char) {
        match code {
            'l' => self.bold = true,
            'o' => self.italic = true,
            'n' => self.underline = true,
            'm' => self.strikethrough = true,
            'k' => {}
            'r' => *self = Style::default(),
            other => {
                *self = Style {
                    color: palette(other),
                    ..Style::default()
                }
            }
        }
    }

    fn paint(&self, segment: &str) -> ColoredString {
        let mut painted = match self.color {
            Some(color) => segment.color(color),
            None => segment.normal(),
        };
        if self.bold {
            painted = painted.bold();
        }
        if self.italic {
            painted = painted.italic();
        }
        if self.underline {
            painted = painted.underline();
        }
        if self.strikethrough {
            painted = painted.strikethrough();
        }
        painted
    }
}

fn palette(code: char) -> Option<Color> {
    let color = match code {
        '0' => Color::Black,
        '1' => Color::Blue,
        '2' => Color::Green,
        '3' => Color::Cyan,
        '4' => Color::Red,
        '5' => Color::Magenta,
        '6' => Color::Yellow,
        '7' => Color::White,
        '8' => Color::BrightBlack,
        '9' => Color::BrightBlue,
        'a' => Color::BrightGreen,
        'b' => Color::BrightCyan,
        'c' => Color::BrightRed,
        'd' => Color::BrightMagenta,
        'e' => Color::BrightYellow,
        'f' => Color::BrightWhite,
        _ => return None,
    };
    Some(color)
}

/// Render section-sign colour codes as ANSI styling.
pub fn render_ansi(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut style = Style::default();
    let mut last = 0;

    for caps in COLOR_CODE.captures_iter(text) {
        let Some(marker) = caps.get(0) else {
            continue;
        };
        if marker.start() > last {
            out.push_str(&style.paint(&text[last..marker.start()]).to_string());
        }
        if let Some(code) = caps[1].to_lowercase().chars().next() {
            style.apply(code);
        }
        last = marker.end();
    }
    if last < text.len() {
        out.push_str(&style.paint(&text[last..]).to_string());
    }
    out
}
