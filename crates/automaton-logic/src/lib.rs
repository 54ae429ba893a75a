//! Automaton Logic for Automaton Arena
//!
//! Core game logic for Iterated Prisoner's Dilemma tournaments between
//! player-written Moore machines.
//! This crate is compiled to:
//! - Native (for the tournament runner)
//! - WASM (for frontend strategy checking and match replay)

mod classic;
mod error;
mod game;
mod graph;
mod machine;
mod parser;
mod payoff;
mod settings;
mod submission;
mod tournament;
mod validator;

#[cfg(feature = "wasm")]
mod wasm;

pub use classic::Classic;
pub use error::{
    MachineError, MatchError, PayoffError, SettingsError, SyntaxIssue, TournamentError,
    ValidationError,
};
pub use game::{play_match, simulate, MatchResult, RoundResult};
pub use graph::{EdgeLabel, GraphEdge, GraphNode, StrategyGraph};
pub use machine::{MachineBuilder, MooreMachine, Move, StateId, StateView};
pub use parser::{parse, parse_strategy};
pub use payoff::{PayoffEntry, PayoffTable};
pub use settings::{
    ForbiddenStrategies, PayoffSettings, RoundLengths, Settings, Severity, ValidationPolicy,
    DEFAULT_ROUND_LENGTHS,
};
pub use submission::{Accepted, Entrant, Submission};
pub use tournament::{
    calculate_match_count, round_robin_pairs, run_tournament, MatchRecord, Standing,
    TournamentResult, WINNER_TOLERANCE,
};
pub use validator::{check_declarations, check_reachability, check_totality, validate};
