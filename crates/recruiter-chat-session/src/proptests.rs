//! Property-based tests for the exchange coordinator
//!
//! Any mix of submissions and service outcomes must keep the transcript
//! ordered, paired and never stuck in `Pending`.

use std::sync::Arc;

use proptest::prelude::*;
use recruiter_chat_core::{AssistantError, Role, UNAVAILABLE_MESSAGE};

use crate::coordinator::{ExchangeCoordinator, ExchangeState, SubmitError, TurnOutcome};
use crate::testing::{ScriptedAssistant, identified_context};

#[derive(Debug, Clone)]
enum Outcome {
    Reply(String),
    Fail(AssistantError),
}

fn arb_error() -> impl Strategy<Value = AssistantError> {
    prop_oneof![
        Just(AssistantError::timeout("timed out")),
        Just(AssistantError::transport("connection reset")),
        (400u16..600).prop_map(|code| AssistantError::status(code, "bad status")),
        Just(AssistantError::malformed("missing field `response`")),
    ]
}

fn arb_outcome() -> impl Strategy<Value = Outcome> {
    prop_oneof![
        "[a-zA-Z ]{1,30}".prop_map(Outcome::Reply),
        arb_error().prop_map(Outcome::Fail),
    ]
}

fn arb_message() -> impl Strategy<Value = String> {
    prop_oneof![
        3 => "[a-zA-Z?]{1,20}",
        1 => "[ \t]{0,3}",
    ]
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

proptest! {
    #[test]
    fn turns_stay_ordered_and_paired(
        steps in proptest::collection::vec((arb_message(), arb_outcome()), 1..20)
    ) {
        let service = Arc::new(ScriptedAssistant::new());
        let coordinator = ExchangeCoordinator::new(Arc::clone(&service), identified_context());
        let session_id = coordinator.session_id();
        let mut accepted = 0usize;

        runtime().block_on(async {
            for (message, outcome) in &steps {
                let before = coordinator.snapshot().len();
                let blank = message.trim().is_empty();
                if !blank {
                    match outcome {
                        Outcome::Reply(text) => service.queue_reply(text.clone()),
                        Outcome::Fail(e) => service.queue_error(e.clone()),
                    }
                }

                match coordinator.submit_user_message(message).await {
                    Ok(turn) => {
                        accepted += 1;
                        prop_assert!(!blank);
                        prop_assert_eq!(coordinator.snapshot().len(), before + 2);
                        match (outcome, turn.outcome) {
                            (Outcome::Reply(text), TurnOutcome::Replied) => {
                                prop_assert_eq!(turn.assistant.content(), text.as_str());
                            }
                            (Outcome::Fail(e), TurnOutcome::Unavailable(kind)) => {
                                prop_assert_eq!(kind, e.kind);
                                prop_assert_eq!(turn.assistant.content(), UNAVAILABLE_MESSAGE);
                            }
                            (expected, got) => {
                                prop_assert!(false, "expected {:?}, got {:?}", expected, got);
                            }
                        }
                    }
                    Err(e) => {
                        prop_assert!(blank);
                        prop_assert_eq!(e, SubmitError::EmptyMessage);
                        prop_assert_eq!(coordinator.snapshot().len(), before);
                    }
                }
                prop_assert_eq!(coordinator.state(), ExchangeState::Idle);
            }
            Ok::<(), TestCaseError>(())
        })?;

        let entries = coordinator.snapshot();
        prop_assert_eq!(entries.len(), 1 + 2 * accepted);
        prop_assert_eq!(entries[0].role(), Role::Assistant);
        for (i, pair) in entries[1..].chunks(2).enumerate() {
            prop_assert_eq!(pair[0].role(), Role::User, "turn {}", i);
            prop_assert_eq!(pair[1].role(), Role::Assistant, "turn {}", i);
        }
        for window in entries.windows(2) {
            prop_assert!(window[0].timestamp() <= window[1].timestamp());
        }

        let requests = service.recorded_requests();
        prop_assert_eq!(requests.len(), accepted);
        prop_assert!(requests.iter().all(|r| r.session_id == session_id));
    }
}
