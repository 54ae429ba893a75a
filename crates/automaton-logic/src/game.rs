//! Match execution engine

use serde::{Deserialize, Serialize};

use crate::error::{MachineError, MatchError};
use crate::machine::{MooreMachine, Move, StateId};
use crate::payoff::PayoffTable;

/// Result of a single round
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoundResult {
    pub round: u32,
    pub move_a: Move,
    pub move_b: Move,
    pub score_a: f64,
    pub score_b: f64,
    pub cumulative_a: f64,
    pub cumulative_b: f64,
}

/// Result of a complete match
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub rounds: Vec<RoundResult>,
    pub total_score_a: f64,
    pub total_score_b: f64,
    pub round_count: u32,
}

/// Per-simulation position in one machine.
///
/// Lives only as long as the match that created it.
#[derive(Clone, Copy, Debug)]
struct Cursor<'m> {
    machine: &'m MooreMachine,
    state: StateId,
}

impl<'m> Cursor<'m> {
    fn start(machine: &'m MooreMachine) -> Result<Self, MachineError> {
        let state = machine.initial_state().ok_or(MachineError::NoInitialState)?;
        Ok(Self { machine, state })
    }

    fn current(&self) -> Result<Move, MachineError> {
        self.machine.outcome(self.state)
    }

    fn advance(&mut self, opponent_move: Move) -> Result<(), MachineError> {
        self.state = self.machine.step(self.state, opponent_move)?;
        Ok(())
    }
}

/// Play two machines against each other for `number_of_rounds` rounds.
///
/// Each round both current moves are recorded first; only then does each
/// machine transition on the move its opponent just played.
///
/// # Returns
/// The two move sequences, each exactly `number_of_rounds` long
pub fn simulate(
    machine_a: &MooreMachine,
    machine_b: &MooreMachine,
    number_of_rounds: u32,
) -> Result<(Vec<Move>, Vec<Move>), MachineError> {
    let mut cursor_a = Cursor::start(machine_a)?;
    let mut cursor_b = Cursor::start(machine_b)?;

    let mut moves_a = Vec::with_capacity(number_of_rounds as usize);
    let mut moves_b = Vec::with_capacity(number_of_rounds as usize);

    for _ in 0..number_of_rounds {
        let move_a = cursor_a.current()?;
        let move_b = cursor_b.current()?;
        moves_a.push(move_a);
        moves_b.push(move_b);

        cursor_a.advance(move_b)?;
        cursor_b.advance(move_a)?;
    }

    Ok((moves_a, moves_b))
}

/// Run a complete match between two machines
///
/// # Arguments
/// * `machine_a` - First player's strategy
/// * `machine_b` - Second player's strategy
/// * `number_of_rounds` - Match length
/// * `payoffs` - Scores for each ordered pair of moves
///
/// # Returns
/// Complete match result with round-by-round details
pub fn play_match(
    machine_a: &MooreMachine,
    machine_b: &MooreMachine,
    number_of_rounds: u32,
    payoffs: &PayoffTable,
) -> Result<MatchResult, MatchError> {
    let (moves_a, moves_b) = simulate(machine_a, machine_b, number_of_rounds)?;

    let mut rounds = Vec::with_capacity(moves_a.len());
    let mut total_a = 0.0;
    let mut total_b = 0.0;

    for (round, (&move_a, &move_b)) in (0..).zip(moves_a.iter().zip(&moves_b)) {
        let (score_a, score_b) = payoffs.payoff(move_a, move_b)?;
        total_a += score_a;
        total_b += score_b;

        rounds.push(RoundResult {
            round,
            move_a,
            move_b,
            score_a,
            score_b,
            cumulative_a: total_a,
            cumulative_b: total_b,
        });
    }

    Ok(MatchResult {
        rounds,
        total_score_a: total_a,
        total_score_b: total_b,
        round_count: number_of_rounds,
    })
}

/// Round totals only, without per-round records.
pub(crate) fn score_match(
    machine_a: &MooreMachine,
    machine_b: &MooreMachine,
    number_of_rounds: u32,
    payoffs: &PayoffTable,
) -> Result<(f64, f64), MatchError> {
    let (moves_a, moves_b) = simulate(machine_a, machine_b, number_of_rounds)?;
    let mut total_a = 0.0;
    let mut total_b = 0.0;
    for (&move_a, &move_b) in moves_a.iter().zip(&moves_b) {
        let (score_a, score_b) = payoffs.payoff(move_a, move_b)?;
        total_a += score_a;
        total_b += score_b;
    }
    Ok((total_a, total_b))
}
