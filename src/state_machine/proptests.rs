//! Property-based tests for the state machine
//!
//! These tests verify key invariants hold across all possible inputs.

use super::*;
use crate::step::{Branch, Step, StepSequence, Validator};
use proptest::prelude::*;

// ============================================================================
// Test Helpers
// ============================================================================

/// Steps that accept input of at least `min_len` chars, optionally branching
/// to another step by id
fn build_context(specs: &[(usize, Option<usize>, bool)]) -> SessionContext {
    let steps = specs
        .iter()
        .enumerate()
        .map(|(i, (min_len, jump, terminal))| {
            let mut step = Step::new(format!("step {i}"))
                .with_id(format!("s{i}"))
                .with_validator(Validator::MinLength(*min_len));
            if let Some(target) = jump {
                step = step.with_branch(Branch::goto(format!("s{target}")));
            }
            step.terminal = *terminal;
            step
        })
        .collect();
    SessionContext::new(StepSequence::new(steps).unwrap())
}

/// Drive a started session through `inputs`, collecting all effects
fn run(context: &SessionContext, inputs: &[String]) -> (SessionState, Vec<Effect>) {
    let start = transition(&SessionState::NotStarted, context, Event::Start).unwrap();
    let mut state = start.new_state;
    let mut effects = start.effects;

    for input in inputs {
        match transition(&state, context, Event::input(input.clone())) {
            Ok(result) => {
                if let Some(cursor) = result.new_state.cursor() {
                    assert!(cursor < context.steps.len(), "cursor {cursor} out of range");
                }
                state = result.new_state;
                effects.extend(result.effects);
            }
            Err(e) => {
                assert!(state.is_finished(), "unexpected error {e:?} in {state:?}");
                assert_eq!(e, TransitionError::Finished);
            }
        }
    }

    (state, effects)
}

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_step_specs() -> impl Strategy<Value = Vec<(usize, Option<usize>, bool)>> {
    (1usize..6).prop_flat_map(|len| {
        proptest::collection::vec(
            (0usize..4, proptest::option::of(0..len + 1), proptest::bool::weighted(0.2)),
            len,
        )
    })
}

fn arb_inputs() -> impl Strategy<Value = Vec<String>> {
    proptest::collection::vec("[a-z]{0,5}", 0..20)
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn completion_is_invoked_at_most_once(specs in arb_step_specs(), inputs in arb_inputs()) {
        let context = build_context(&specs);
        let (state, effects) = run(&context, &inputs);

        let completions = effects.iter().filter(|e| **e == Effect::InvokeCompletion).count();
        prop_assert!(completions <= 1);
        prop_assert_eq!(completions == 1, matches!(state, SessionState::Completed { .. }));
    }

    #[test]
    fn every_accept_is_echoed_once(specs in arb_step_specs(), inputs in arb_inputs()) {
        let context = build_context(&specs);
        let (_, effects) = run(&context, &inputs);

        let accepts = effects.iter().filter(|e| matches!(e, Effect::Accept { .. })).count();
        let echoes = effects
            .iter()
            .filter(|e| matches!(e, Effect::Notify(Notice::Echo { .. })))
            .count();
        prop_assert_eq!(accepts, echoes);
    }

    #[test]
    fn invalid_input_never_moves_cursor(
        specs in arb_step_specs(),
        cursor_seed in any::<usize>(),
    ) {
        let context = build_context(&specs);
        let cursor = cursor_seed % context.steps.len();
        let min_len = specs[cursor].0;
        prop_assume!(min_len > 0);

        let short = "x".repeat(min_len - 1);
        let result = transition(&SessionState::Active { cursor }, &context, Event::input(short)).unwrap();

        prop_assert_eq!(result.new_state, SessionState::Active { cursor });
        let accepted = result.effects.iter().any(|e| matches!(e, Effect::Accept { .. }));
        prop_assert!(!accepted);
    }

    #[test]
    fn cancel_token_always_cancels(
        specs in arb_step_specs(),
        cursor_seed in any::<usize>(),
        upper in any::<bool>(),
    ) {
        let context = build_context(&specs);
        let cursor = cursor_seed % context.steps.len();
        let token = if upper { "CANCEL" } else { "cancel" };

        let result = transition(&SessionState::Active { cursor }, &context, Event::input(token)).unwrap();

        prop_assert_eq!(
            result.new_state,
            SessionState::Cancelled { reason: CancelReason::Participant }
        );
        prop_assert!(!result.effects.contains(&Effect::InvokeCompletion));
    }
}
