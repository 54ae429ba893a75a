//! Structural checks on parsed strategies
//!
//! Validation only inspects a machine. It reports every problem in one pass:
//! missing transitions, references to states that are never declared, and
//! states the initial state can never reach.

use crate::error::ValidationError;
use crate::machine::{MooreMachine, Move};

/// Run every check and return all findings (empty when the machine is sound).
pub fn validate(machine: &MooreMachine) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    if machine.initial_state().is_none() {
        errors.push(ValidationError::EmptyStrategy);
    }
    errors.extend(check_totality(machine));
    errors.extend(check_declarations(machine));
    errors.extend(check_reachability(machine));
    errors
}

/// One error per (state, symbol) pair without a transition.
pub fn check_totality(machine: &MooreMachine) -> Vec<ValidationError> {
    machine
        .states()
        .flat_map(|state| {
            Move::ALL
                .into_iter()
                .filter(move |&symbol| state.next(symbol).is_none())
                .map(move |symbol| ValidationError::IncompleteTransition {
                    state: state.name.to_string(),
                    symbol,
                })
        })
        .collect()
}

/// One error per transition that leads to a state never declared with an action.
pub fn check_declarations(machine: &MooreMachine) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    for state in machine.states() {
        for symbol in Move::ALL {
            let Some(next) = state.next(symbol) else {
                continue;
            };
            if !machine.is_declared(next) {
                errors.push(ValidationError::UndeclaredState {
                    state: machine.state_name(next).unwrap_or_default().to_string(),
                    from: state.name.to_string(),
                    symbol,
                });
            }
        }
    }
    errors
}

/// Names every state not reachable from the initial state, in one error.
///
/// Traverses both transition symbols with an explicit stack.
pub fn check_reachability(machine: &MooreMachine) -> Option<ValidationError> {
    let initial = machine.initial_state()?;

    let mut visited = vec![false; machine.len()];
    let mut stack = vec![initial];
    visited[initial.index()] = true;

    while let Some(state) = stack.pop() {
        for symbol in Move::ALL {
            if let Some(next) = machine.transition(state, symbol) {
                if !visited[next.index()] {
                    visited[next.index()] = true;
                    stack.push(next);
                }
            }
        }
    }

    let unreachable: Vec<String> = machine
        .states()
        .filter(|state| !visited[state.id.index()])
        .map(|state| state.name.to_string())
        .collect();

    if unreachable.is_empty() {
        None
    } else {
        Some(ValidationError::UnreachableStates { states: unreachable })
    }
}
