//! Terminal glyphs, labels and styling

use std::io::IsTerminal;

use crossterm::style::{StyledContent, Stylize};

use crate::domain::{Group, TaskState};
use crate::storage::GlyphStyle;

/// Maps states and groups to what the terminal shows
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    glyphs: GlyphStyle,
    styled: bool,
}

impl Palette {
    pub fn new(glyphs: GlyphStyle, styled: bool) -> Self {
        Self { glyphs, styled }
    }

    /// Styles only when stdout is a terminal and `NO_COLOR` is unset
    pub fn for_stdout(glyphs: GlyphStyle) -> Self {
        let styled = std::io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none();
        Self::new(glyphs, styled)
    }

    /// Glyph shown in front of a task in the given state
    pub fn glyph(&self, state: TaskState) -> &'static str {
        match (self.glyphs, state) {
            (GlyphStyle::Emoji, TaskState::Active) => "🔥",
            (GlyphStyle::Emoji, TaskState::Backlog) => "💤",
            (GlyphStyle::Emoji, TaskState::OnHold) => "🔒",
            (GlyphStyle::Emoji, TaskState::Done) => "✅",
            (GlyphStyle::Ascii, TaskState::Active) => ">",
            (GlyphStyle::Ascii, TaskState::Backlog) => "-",
            (GlyphStyle::Ascii, TaskState::OnHold) => "#",
            (GlyphStyle::Ascii, TaskState::Done) => "+",
        }
    }

    /// Glyph for stale tasks
    pub fn stale_glyph(&self) -> &'static str {
        match self.glyphs {
            GlyphStyle::Emoji => "⚠️",
            GlyphStyle::Ascii => "!",
        }
    }

    /// Section heading for a group
    pub fn label(&self, group: Group) -> &'static str {
        match group {
            Group::Active => "ACTIVE",
            Group::OnHold => "ON HOLD",
            Group::Backlog => "BACKLOG",
            Group::Done => "DONE",
        }
    }

    /// Styled group heading
    pub fn heading(&self, group: Group) -> String {
        let label = self.label(group);
        self.paint(label, |s| {
            let s = s.bold();
            match group {
                Group::Active => s.green(),
                Group::OnHold => s.yellow(),
                Group::Backlog => s.blue(),
                Group::Done => s.dark_grey(),
            }
        })
    }

    /// Bold cyan heading for sub-sections such as weekdays
    pub fn subheading(&self, text: &str) -> String {
        self.paint(text, |s| s.bold().cyan())
    }

    pub fn title(&self, text: &str) -> String {
        self.paint(text, |s| s.bold())
    }

    pub fn id(&self, id: impl std::fmt::Display) -> String {
        self.paint(&format!("[{}]", id), |s| s.cyan())
    }

    pub fn muted(&self, text: &str) -> String {
        self.paint(text, |s| s.dim())
    }

    fn paint<F>(&self, text: &str, style: F) -> String
    where
        F: FnOnce(StyledContent<String>) -> StyledContent<String>,
    {
        if self.styled {
            style(text.to_string().stylize()).to_string()
        } else {
            text.to_string()
        }
    }
}
