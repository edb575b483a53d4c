//! Terminal capability detection and colouring

use std::sync::LazyLock;

use owo_colors::{OwoColorize, colors::css};
use reqedit::Kind;

/// Width assumed when the terminal size cannot be detected.
const FALLBACK_WIDTH: usize = 80;

/// Below this many columns listings drop their table layout.
const NARROW_WIDTH: u16 = 60;

static COLOR: LazyLock<bool> =
    LazyLock::new(|| supports_color::on(supports_color::Stream::Stdout).is_some());

fn terminal_width() -> Option<u16> {
    terminal_size::terminal_size().map(|(width, _)| width.0)
}

/// Terminal width in columns, or a fallback when not attached to a terminal
pub fn width() -> usize {
    terminal_width().map_or(FALLBACK_WIDTH, usize::from)
}

pub fn is_narrow() -> bool {
    terminal_width().is_some_and(|width| width < NARROW_WIDTH)
}

/// Colours `text` with the colour associated with `kind`.
///
/// Titles are also set in bold.
pub fn paint_kind(kind: Kind, text: &str) -> String {
    if !*COLOR {
        return text.to_string();
    }
    match kind {
        Kind::Title => text.fg::<css::MediumPurple>().bold().to_string(),
        Kind::Subtitle => text.fg::<css::DeepSkyBlue>().to_string(),
        Kind::Requirement => text.fg::<css::LimeGreen>().to_string(),
        Kind::Comment => text.fg::<css::GoldenRod>().to_string(),
        Kind::Dattr => text.fg::<css::DarkOrange>().to_string(),
        Kind::Unknown => text.fg::<css::Gray>().to_string(),
    }
}

#[derive(Clone, Copy)]
enum Tone {
    Success,
    Warning,
    Error,
    Info,
    Dim,
}

fn paint(text: &str, tone: Tone) -> String {
    if !*COLOR {
        return text.to_string();
    }
    match tone {
        Tone::Success => text.fg::<css::Green>().to_string(),
        Tone::Warning => text.fg::<css::Orange>().to_string(),
        Tone::Error => text.fg::<css::Red>().to_string(),
        Tone::Info => text.fg::<css::LightBlue>().to_string(),
        Tone::Dim => text.dimmed().to_string(),
    }
}

/// Status colouring for messages printed by commands.
pub trait Colorize {
    fn success(&self) -> String;
    fn warning(&self) -> String;
    fn error(&self) -> String;
    fn info(&self) -> String;
    fn dim(&self) -> String;
}

impl<T: AsRef<str> + ?Sized> Colorize for T {
    fn success(&self) -> String {
        paint(self.as_ref(), Tone::Success)
    }

    fn warning(&self) -> String {
        paint(self.as_ref(), Tone::Warning)
    }

    fn error(&self) -> String {
        paint(self.as_ref(), Tone::Error)
    }

    fn info(&self) -> String {
        paint(self.as_ref(), Tone::Info)
    }

    fn dim(&self) -> String {
        paint(self.as_ref(), Tone::Dim)
    }
}
