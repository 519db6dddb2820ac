use std::sync::{Arc, Mutex};

use crate::modal::{Dialog, Severity};

/// Line-oriented output shared by every terminal view.
///
/// `stdout()` prints straight away; `buffered()` keeps the lines in memory
/// so they can be inspected afterwards.
#[derive(Clone, Default)]
pub struct Terminal {
    buffer: Option<Arc<Mutex<Vec<String>>>>,
}

impl Terminal {
    pub fn stdout() -> Self {
        Self { buffer: None }
    }

    pub fn buffered() -> Self {
        Self {
            buffer: Some(Arc::new(Mutex::new(Vec::new()))),
        }
    }

    pub fn line(&self, text: impl AsRef<str>) {
        match &self.buffer {
            Some(buffer) => {
                let mut lines = buffer.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
                lines.extend(text.as_ref().lines().map(str::to_string));
            }
            None => println!("{}", text.as_ref()),
        }
    }

    pub fn blank(&self) {
        self.line("");
    }

    pub fn heading(&self, title: &str) {
        self.blank();
        self.line(format!("== {} ==", title));
    }

    /// Everything written so far; always empty for stdout.
    pub fn lines(&self) -> Vec<String> {
        self.buffer
            .as_ref()
            .map(|buffer| {
                buffer
                    .lock()
                    .unwrap_or_else(|poisoned| poisoned.into_inner())
                    .clone()
            })
            .unwrap_or_default()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.lines().iter().any(|line| line.contains(needle))
    }

    pub fn clear(&self) {
        if let Some(buffer) = &self.buffer {
            buffer
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner())
                .clear();
        }
    }
}

/// Renders an open dialog. Confirmation dialogs list the answers.
pub fn render_dialog<A>(terminal: &Terminal, dialog: &Dialog<A>) {
    let marker = match dialog.severity {
        Severity::Danger => "!!",
        Severity::Warning => "!",
        Severity::Success => "+",
        Severity::Info => "i",
    };
    terminal.blank();
    terminal.line(format!(
        "[{}] {} ({})",
        marker,
        dialog.title,
        dialog.severity.label()
    ));
    terminal.line(format!("    {}", dialog.message));
    if dialog.is_alert() {
        terminal.line("    Type `confirm` to close.");
    } else {
        terminal.line("    Type `confirm` to proceed or `cancel` to go back.");
    }
}

/// Pads or truncates `text` to exactly `width` characters.
pub fn cell(text: &str, width: usize) -> String {
    let count = text.chars().count();
    if count > width {
        let mut cut: String = text.chars().take(width.saturating_sub(1)).collect();
        cut.push('~');
        cut
    } else {
        format!("{:<width$}", text, width = width)
    }
}
