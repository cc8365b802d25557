//! Deterministic replies standing in for the language model.

use recruiter_chat_core::{MessageEntry, Role};
use recruiter_chat_transport::RecruiterInfo;

/// Number of prior messages the responder looks at.
pub const CONTEXT_WINDOW: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Topic {
    Greeting,
    Skills,
    Experience,
    Availability,
    Location,
    Compensation,
    Other,
}

impl Topic {
    fn detect(message: &str) -> Self {
        let lower = message.to_lowercase();
        let words: Vec<&str> = lower
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .collect();
        let has_stem = |stems: &[&str]| words.iter().any(|w| stems.iter().any(|s| w.starts_with(s)));

        if has_stem(&["skill", "stack", "technolog", "language", "tool"]) {
            Self::Skills
        } else if has_stem(&["experience", "background", "worked", "career", "project"]) {
            Self::Experience
        } else if has_stem(&["avail", "start", "notice", "when"]) {
            Self::Availability
        } else if has_stem(&["location", "remote", "relocat", "based", "onsite"]) {
            Self::Location
        } else if has_stem(&["salary", "compensation", "pay", "expectation"]) {
            Self::Compensation
        } else if words.iter().any(|w| matches!(*w, "hi" | "hello" | "hey")) {
            Self::Greeting
        } else {
            Self::Other
        }
    }

    const fn answer(self) -> &'static str {
        match self {
            Self::Greeting => "How can I help you learn about the candidate today?",
            Self::Skills => {
                "The candidate works mainly in Rust and Python, with solid experience in \
                 distributed systems, cloud infrastructure and developer tooling."
            }
            Self::Experience => {
                "The candidate has several years of backend and platform engineering \
                 experience, most recently leading work on service reliability."
            }
            Self::Availability => {
                "The candidate is open to new opportunities and can usually start within \
                 a few weeks of an offer."
            }
            Self::Location => "The candidate is open to remote roles and to hybrid arrangements.",
            Self::Compensation => {
                "Compensation is best discussed with the candidate directly; I can pass \
                 along your contact details."
            }
            Self::Other => {
                "I don't have specific details on that. The candidate would be happy to \
                 answer directly if you reach out."
            }
        }
    }
}

/// Messages the responder considers for a new request.
#[must_use]
pub fn context_window(history: &[MessageEntry]) -> &[MessageEntry] {
    &history[history.len().saturating_sub(CONTEXT_WINDOW)..]
}

/// Compose the reply to `message` given the recent `context`.
#[must_use]
pub fn reply(info: &RecruiterInfo, context: &[MessageEntry], message: &str) -> String {
    let topic = Topic::detect(message);
    let mut user_turns = context
        .iter()
        .filter(|entry| entry.role() == Role::User)
        .peekable();
    let first_turn = user_turns.peek().is_none();
    let repeated =
        topic != Topic::Other && user_turns.any(|entry| Topic::detect(entry.content()) == topic);

    let mut out = String::new();
    if first_turn && !info.name.trim().is_empty() {
        out.push_str("Thanks for reaching out, ");
        out.push_str(info.name.trim());
        if !info.company.trim().is_empty() {
            out.push_str(" from ");
            out.push_str(info.company.trim());
        }
        out.push_str(". ");
    }
    if repeated {
        out.push_str("As mentioned earlier, ");
        let answer = topic.answer();
        let mut chars = answer.chars();
        if let Some(first) = chars.next() {
            out.extend(first.to_lowercase());
            out.push_str(chars.as_str());
        }
    } else {
        out.push_str(topic.answer());
    }
    out
}
