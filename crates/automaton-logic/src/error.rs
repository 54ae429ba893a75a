//! Error types for strategy validation, simulation and tournaments

use thiserror::Error;

use crate::machine::Move;

/// Why a strategy line does not match `STATE: ACTION, NEXT_ON_C, NEXT_ON_D`.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SyntaxIssue {
    #[error("expected `STATE: ACTION, NEXT_ON_C, NEXT_ON_D` but found no `:` in {0:?}")]
    MissingColon(String),

    #[error("expected 3 comma-separated values after `:`, found {0}")]
    FieldCount(usize),

    #[error("invalid state name {0:?} (only letters and digits are allowed)")]
    InvalidStateName(String),

    #[error("invalid action {0:?} (expected C or D)")]
    InvalidAction(String),
}

/// A problem found while parsing or validating a submitted strategy.
///
/// The messages are shown to submitters as-is.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Line does not match the grammar (1-based line number).
    #[error("Line {line}: {issue}.")]
    Syntax { line: usize, issue: SyntaxIssue },

    /// A state's transitions were already set by an earlier line.
    #[error("Line {line}: the state {state} has already been defined.")]
    Redefinition { line: usize, state: String },

    #[error("No transition is specified for state {state} and symbol {symbol}.")]
    IncompleteTransition { state: String, symbol: Move },

    /// A next-state that is never declared on its own line.
    #[error("The state {state} reached from ({from}, {symbol}) is not a known state.")]
    UndeclaredState {
        state: String,
        from: String,
        symbol: Move,
    },

    /// Every state the traversal from the initial state never visits.
    #[error(
        "The following states cannot be reached from the initial state: {}.",
        .states.join(", ")
    )]
    UnreachableStates { states: Vec<String> },

    #[error("The initial state {state} is not part of the states described in the strategy.")]
    UnknownInitialState { state: String },

    #[error("The strategy does not describe any state.")]
    EmptyStrategy,

    #[error("The admin of this session has forbidden this strategy, please submit another one.")]
    ForbiddenStrategy,
}

/// Errors raised when stepping through a machine.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum MachineError {
    #[error("state id {0} does not belong to this machine")]
    UnknownState(usize),

    #[error("state {state} has no declared action")]
    MissingOutcome { state: String },

    #[error("missing transition for state {state} on symbol {symbol}")]
    MissingTransition { state: String, symbol: Move },

    #[error("machine has no initial state")]
    NoInitialState,
}

/// Payoff table misconfiguration. Never recovered from locally.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum PayoffError {
    #[error("payoff table has no entry for ({a}, {b})")]
    MissingEntry { a: Move, b: Move },

    #[error("payoff for ({a}, {b}) is not a finite number")]
    NonFinite { a: Move, b: Move },
}

/// Failure while playing one match.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum MatchError {
    #[error(transparent)]
    Machine(#[from] MachineError),

    #[error(transparent)]
    Payoff(#[from] PayoffError),
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum TournamentError {
    #[error(transparent)]
    Payoff(#[from] PayoffError),

    #[error("at least one round length must be configured")]
    NoRoundLengths,

    #[error("round lengths must be positive, found {0}")]
    InvalidRoundLength(u32),

    #[error("match {a} vs {b} ({rounds} rounds) failed: {source}")]
    Match {
        a: String,
        b: String,
        rounds: u32,
        #[source]
        source: MatchError,
    },
}

/// Organizer configuration that cannot be used.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("round length {0:?} is not a positive integer")]
    InvalidRoundLength(String),

    #[error("no round length configured")]
    EmptyRoundLengths,

    #[error("forbidden strategy #{index} is invalid: {}", join_errors(.errors))]
    InvalidForbiddenStrategy {
        index: usize,
        errors: Vec<ValidationError>,
    },

    #[error("invalid settings document: {0}")]
    Json(#[from] serde_json::Error),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}
