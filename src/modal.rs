//! Confirmation and alert dialogs.
//!
//! A dialog carries the action it confirms. Confirming closes the dialog
//! and hands the action back to the screen, which then runs it; the dialog
//! itself never shows a loading state.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Danger,
    Warning,
    Success,
    Info,
}

impl Severity {
    pub fn label(self) -> &'static str {
        match self {
            Severity::Danger => "DANGER",
            Severity::Warning => "WARNING",
            Severity::Success => "SUCCESS",
            Severity::Info => "INFO",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Dialog<A> {
    pub title: String,
    pub message: String,
    pub severity: Severity,
    action: Option<A>,
}

impl<A> Dialog<A> {
    /// Yes/no dialog that yields `action` when confirmed
    pub fn confirm(title: impl Into<String>, message: impl Into<String>, severity: Severity, action: A) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            severity,
            action: Some(action),
        }
    }

    /// Informational dialog; confirming only closes it
    pub fn alert(title: impl Into<String>, message: impl Into<String>, severity: Severity) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            severity,
            action: None,
        }
    }

    pub fn is_alert(&self) -> bool {
        self.action.is_none()
    }
}

/// At most one dialog is open per screen.
#[derive(Debug, Clone, PartialEq)]
pub struct DialogSlot<A> {
    current: Option<Dialog<A>>,
}

impl<A> Default for DialogSlot<A> {
    fn default() -> Self {
        Self { current: None }
    }
}

impl<A> DialogSlot<A> {
    pub fn open(&mut self, dialog: Dialog<A>) {
        self.current = Some(dialog);
    }

    pub fn current(&self) -> Option<&Dialog<A>> {
        self.current.as_ref()
    }

    pub fn is_open(&self) -> bool {
        self.current.is_some()
    }

    /// Closes the dialog and returns its action, if it had one.
    pub fn confirm(&mut self) -> Option<A> {
        self.current.take().and_then(|dialog| dialog.action)
    }

    pub fn dismiss(&mut self) {
        self.current = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confirm_closes_and_yields_action() {
        let mut slot = DialogSlot::default();
        slot.open(Dialog::confirm("Delete", "Sure?", Severity::Danger, 42));
        assert!(slot.is_open());

        assert_eq!(slot.confirm(), Some(42));
        assert!(!slot.is_open());
        assert_eq!(slot.confirm(), None);
    }

    #[test]
    fn alert_confirm_just_closes() {
        let mut slot: DialogSlot<u8> = DialogSlot::default();
        slot.open(Dialog::alert("Saved", "Done", Severity::Success));
        assert!(slot.current().unwrap().is_alert());
        assert_eq!(slot.confirm(), None);
        assert!(!slot.is_open());
    }

    #[test]
    fn dismiss_drops_action() {
        let mut slot = DialogSlot::default();
        slot.open(Dialog::confirm("Block", "Sure?", Severity::Danger, "block"));
        slot.dismiss();
        assert_eq!(slot.confirm(), None);
    }
}
