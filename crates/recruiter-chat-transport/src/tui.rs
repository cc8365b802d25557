//! TUI bridge for ratatui presenters.
//!
//! Maps crossterm key events onto presenter intent, using the current
//! [`ChatView`] to compute the new field and input values.

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use recruiter_chat_core::IdentityField;
use recruiter_chat_session::{ChatView, PresenterEvent};

/// Which control receives typed characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    /// One of the identity form fields.
    Identity(IdentityField),
    /// The message input line.
    Message,
}

/// What the presenter loop should do with a key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyAction {
    /// Forward to the chat client.
    Dispatch(PresenterEvent),
    /// Scroll the transcript by this many lines (negative is up).
    Scroll(i16),
    /// Leave the application.
    Quit,
    /// Nothing to forward; focus may have moved.
    None,
}

/// Keyboard state for a terminal presenter.
#[derive(Debug)]
pub struct TuiInput {
    focus: Focus,
}

impl Default for TuiInput {
    fn default() -> Self {
        Self::new()
    }
}

impl TuiInput {
    /// Start with the first identity field focused.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            focus: Focus::Identity(IdentityField::VisitorName),
        }
    }

    #[must_use]
    pub const fn focus(&self) -> Focus {
        self.focus
    }

    /// Move focus to the message line once identity capture is done.
    pub fn focus_input(&mut self, view: &ChatView) {
        if !view.gate_open {
            self.focus = Focus::Message;
        }
    }

    /// Handle a crossterm event.
    pub fn handle_event(&mut self, event: &Event, view: &ChatView) -> KeyAction {
        match event {
            Event::Key(key) => self.handle_key(key, view),
            _ => KeyAction::None,
        }
    }

    /// Map one key press.
    pub fn handle_key(&mut self, key: &KeyEvent, view: &ChatView) -> KeyAction {
        if key.kind == KeyEventKind::Release {
            return KeyAction::None;
        }
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return KeyAction::Quit;
        }

        if view.gate_open {
            let field = match self.focus {
                Focus::Identity(field) => field,
                Focus::Message => IdentityField::VisitorName,
            };
            self.focus = Focus::Identity(field);
            self.identity_key(key, field, view)
        } else {
            self.focus = Focus::Message;
            Self::message_key(key, view)
        }
    }

    fn identity_key(&mut self, key: &KeyEvent, field: IdentityField, view: &ChatView) -> KeyAction {
        let current = view.identity_form.get(field);
        match key.code {
            KeyCode::Tab | KeyCode::Down => {
                self.focus = Focus::Identity(step(field, true));
                KeyAction::None
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.focus = Focus::Identity(step(field, false));
                KeyAction::None
            }
            KeyCode::Enter => KeyAction::Dispatch(PresenterEvent::IdentitySubmitted),
            KeyCode::Backspace => {
                let mut value = current.to_string();
                value.pop();
                KeyAction::Dispatch(PresenterEvent::IdentityFieldChanged { field, value })
            }
            KeyCode::Char(c) if is_plain(key) => {
                let mut value = current.to_string();
                value.push(c);
                KeyAction::Dispatch(PresenterEvent::IdentityFieldChanged { field, value })
            }
            _ => KeyAction::None,
        }
    }

    fn message_key(key: &KeyEvent, view: &ChatView) -> KeyAction {
        match key.code {
            KeyCode::Enter => KeyAction::Dispatch(PresenterEvent::MessageSubmitted),
            KeyCode::Backspace => {
                let mut value = view.input.clone();
                value.pop();
                KeyAction::Dispatch(PresenterEvent::InputChanged(value))
            }
            KeyCode::Char(c) if is_plain(key) => {
                let mut value = view.input.clone();
                value.push(c);
                KeyAction::Dispatch(PresenterEvent::InputChanged(value))
            }
            KeyCode::Up => KeyAction::Scroll(-1),
            KeyCode::Down => KeyAction::Scroll(1),
            KeyCode::PageUp => KeyAction::Scroll(-10),
            KeyCode::PageDown => KeyAction::Scroll(10),
            _ => KeyAction::None,
        }
    }
}

fn is_plain(key: &KeyEvent) -> bool {
    key.modifiers == KeyModifiers::NONE || key.modifiers == KeyModifiers::SHIFT
}

fn step(field: IdentityField, forward: bool) -> IdentityField {
    let all = IdentityField::ALL;
    let idx = all.iter().position(|f| *f == field).unwrap_or(0);
    let next = if forward { idx + 1 } else { idx + all.len() - 1 };
    all[next % all.len()]
}
