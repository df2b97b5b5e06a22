use std::io::Write;

use chrono::Local;
use colored::{ Color, Colorize };

use super::settings::Theme;
use super::{ Frontend, PENDING_TEXT };
use crate::models::chat::Role;

/// Terminal renderer for the composer. Bubbles are single lines with a
/// local timestamp; the pending placeholder is drawn in place and wiped
/// once the reply (or the error bubble) arrives.
pub struct TerminalFrontend {
    theme: Theme,
    pending_shown: bool,
}

impl TerminalFrontend {
    pub fn new(theme: Theme) -> Self {
        Self {
            theme,
            pending_shown: false,
        }
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
    }

    fn role_color(&self, role: Role) -> Color {
        match (self.theme, role) {
            (Theme::Dark, Role::User) => Color::BrightCyan,
            (Theme::Dark, Role::Assistant) => Color::BrightGreen,
            (Theme::Dark, Role::System) => Color::BrightYellow,
            (Theme::Light, Role::User) => Color::Blue,
            (Theme::Light, Role::Assistant) => Color::Green,
            (Theme::Light, Role::System) => Color::Yellow,
        }
    }

    fn label(role: Role) -> &'static str {
        match role {
            Role::User => "you",
            Role::Assistant => "assistant",
            Role::System => "system",
        }
    }
}

impl Frontend for TerminalFrontend {
    fn bubble(&mut self, role: Role, text: &str) {
        let stamp = Local::now().format("%H:%M");
        let label = format!("[{}]", Self::label(role));
        println!("{} {} {}", stamp, label.color(self.role_color(role)).bold(), text);
    }

    fn notice(&mut self, text: &str) {
        println!("{}", text.dimmed());
    }

    fn pending(&mut self) {
        print!("{}\r", PENDING_TEXT.dimmed());
        let _ = std::io::stdout().flush();
        self.pending_shown = true;
    }

    fn clear_pending(&mut self) {
        if self.pending_shown {
            print!("\r{}\r", " ".repeat(PENDING_TEXT.chars().count() + 2));
            let _ = std::io::stdout().flush();
            self.pending_shown = false;
        }
    }

    fn set_busy(&mut self, _busy: bool) {
        // the line loop already serializes input; nothing to disable
    }
}
