//! WASM bindings for frontend strategy checking and match replay

#![cfg(feature = "wasm")]

use wasm_bindgen::prelude::*;

use crate::{
    calculate_match_count, play_match, Classic, ForbiddenStrategies, MooreMachine,
    PayoffSettings, RoundLengths, StrategyGraph, Submission, ValidationError, ValidationPolicy,
};

/// Parse and validate strategy text under the default (strict) policy.
fn compile(automaton: &str, initial_state: &str) -> Result<MooreMachine, Vec<ValidationError>> {
    let submission = Submission {
        player: String::new(),
        name: String::new(),
        automaton: automaton.to_string(),
        initial_state: initial_state.to_string(),
        motivation: String::new(),
    };
    submission
        .accept(&ValidationPolicy::default(), &ForbiddenStrategies::default())
        .map(|accepted| accepted.entrant.machine)
}

fn compile_or_throw(automaton: &str, initial_state: &str, which: &str) -> Result<MooreMachine, JsError> {
    compile(automaton, initial_state).map_err(|errors| {
        let messages: Vec<String> = errors.iter().map(ToString::to_string).collect();
        let label = if which.is_empty() { String::new() } else { format!(" {}", which) };
        JsError::new(&format!("Invalid strategy{}: {}", label, messages.join(" ")))
    })
}

#[derive(serde::Serialize)]
struct CheckResult {
    valid: bool,
    errors: Vec<String>,
}

/// Check strategy text as the submit form would.
///
/// Returns `{valid: true, errors: []}` or `{valid: false, errors: [...]}`.
/// Never throws: validation errors are returned as structured data.
#[wasm_bindgen]
pub fn check_strategy(automaton: &str, initial_state: &str) -> JsValue {
    let result = match compile(automaton, initial_state) {
        Ok(_) => CheckResult { valid: true, errors: Vec::new() },
        Err(errors) => CheckResult {
            valid: false,
            errors: errors.iter().map(ToString::to_string).collect(),
        },
    };
    serde_wasm_bindgen::to_value(&result).unwrap_or(JsValue::NULL)
}

/// Human-readable validation messages as a plain JS array of strings.
#[wasm_bindgen]
pub fn strategy_errors(automaton: &str, initial_state: &str) -> js_sys::Array {
    match compile(automaton, initial_state) {
        Ok(_) => js_sys::Array::new(),
        Err(errors) => errors
            .iter()
            .map(|e| JsValue::from_str(&e.to_string()))
            .collect(),
    }
}

/// Graph projection (nodes and labeled edges) of a valid strategy
#[wasm_bindgen]
pub fn strategy_graph(automaton: &str, initial_state: &str) -> Result<JsValue, JsError> {
    let machine = compile_or_throw(automaton, initial_state, "")?;
    serde_wasm_bindgen::to_value(&StrategyGraph::from_machine(&machine))
        .map_err(|e| JsError::new(&format!("Serialization error: {}", e)))
}

/// Replay a match with full round-by-round details
///
/// # Arguments
/// * `automaton_a` / `initial_a` - Strategy text and start state of player A
/// * `automaton_b` / `initial_b` - Strategy text and start state of player B
/// * `rounds` - Match length
/// * `payoffs_json` - JSON `PayoffSettings`; empty string for the defaults
///
/// # Returns
/// JSON serialized MatchResult
#[wasm_bindgen]
pub fn replay_match(
    automaton_a: &str,
    initial_a: &str,
    automaton_b: &str,
    initial_b: &str,
    rounds: u32,
    payoffs_json: &str,
) -> Result<JsValue, JsError> {
    let machine_a = compile_or_throw(automaton_a, initial_a, "A")?;
    let machine_b = compile_or_throw(automaton_b, initial_b, "B")?;

    let payoffs: PayoffSettings = if payoffs_json.trim().is_empty() {
        PayoffSettings::default()
    } else {
        serde_json::from_str(payoffs_json)
            .map_err(|e| JsError::new(&format!("Invalid payoffs: {}", e)))?
    };

    let result = play_match(&machine_a, &machine_b, rounds, &payoffs.table())
        .map_err(|e| JsError::new(&e.to_string()))?;

    serde_wasm_bindgen::to_value(&result)
        .map_err(|e| JsError::new(&format!("Serialization error: {}", e)))
}

#[derive(serde::Serialize)]
struct StrategyInfo {
    id: Classic,
    name: &'static str,
    description: &'static str,
    automaton: &'static str,
    initial_state: &'static str,
}

/// Get all classic strategies, with their strategy text
#[wasm_bindgen]
pub fn get_strategy_types() -> Result<JsValue, JsError> {
    let types: Vec<StrategyInfo> = Classic::ALL
        .into_iter()
        .map(|classic| StrategyInfo {
            id: classic,
            name: classic.name(),
            description: classic.description(),
            automaton: classic.source(),
            initial_state: classic.initial_state(),
        })
        .collect();

    serde_wasm_bindgen::to_value(&types)
        .map_err(|e| JsError::new(&format!("Serialization error: {}", e)))
}

/// Parse a comma-separated list of round lengths
#[wasm_bindgen]
pub fn parse_round_lengths(text: &str) -> Result<Vec<u32>, JsError> {
    let lengths: RoundLengths = text.parse().map_err(|e| JsError::new(&format!("{}", e)))?;
    Ok(lengths.as_slice().to_vec())
}

/// Get total number of simulated matches for a tournament
#[wasm_bindgen]
pub fn get_match_count(participant_count: u32, round_lengths: &str) -> Result<u32, JsError> {
    let lengths: RoundLengths = round_lengths
        .parse()
        .map_err(|e| JsError::new(&format!("{}", e)))?;
    Ok(calculate_match_count(participant_count as usize, lengths.as_slice().len()) as u32)
}
