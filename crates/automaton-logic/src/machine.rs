//! Moore machine strategy descriptions
//!
//! A [`MooreMachine`] is an immutable description: which states exist, what
//! each state plays, and where each state goes on the opponent's move. It
//! never tracks a "current" state. Callers hold a [`StateId`] cursor per
//! simulation, so one machine can be replayed by any number of matches at
//! once.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{MachineError, ValidationError};

/// A move in the Prisoner's Dilemma
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Move {
    #[serde(rename = "C")]
    Cooperate,
    #[serde(rename = "D")]
    Defect,
}

impl Move {
    /// Input alphabet, in transition column order.
    pub const ALL: [Move; 2] = [Move::Cooperate, Move::Defect];

    pub fn symbol(self) -> char {
        match self {
            Move::Cooperate => 'C',
            Move::Defect => 'D',
        }
    }

    fn column(self) -> usize {
        match self {
            Move::Cooperate => 0,
            Move::Defect => 1,
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

impl FromStr for Move {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "C" => Ok(Move::Cooperate),
            "D" => Ok(Move::Defect),
            other => Err(other.to_string()),
        }
    }
}

/// Handle to a state of one particular machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StateId(usize);

impl StateId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct StateEntry {
    name: String,
    /// `None` for states that are only referenced as a next-state.
    outcome: Option<Move>,
    next: [Option<StateId>; 2],
}

/// Read-only view of one state, as yielded by [`MooreMachine::states`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StateView<'m> {
    pub id: StateId,
    pub name: &'m str,
    pub outcome: Option<Move>,
    pub on_cooperate: Option<StateId>,
    pub on_defect: Option<StateId>,
}

impl StateView<'_> {
    pub fn next(&self, symbol: Move) -> Option<StateId> {
        match symbol {
            Move::Cooperate => self.on_cooperate,
            Move::Defect => self.on_defect,
        }
    }
}

/// Finite-state strategy whose move depends only on the current state.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct MooreMachine {
    states: Vec<StateEntry>,
    by_name: HashMap<String, StateId>,
    initial: Option<StateId>,
}

impl MooreMachine {
    pub fn builder() -> MachineBuilder {
        MachineBuilder::default()
    }

    /// Number of states, including referenced-but-undeclared ones.
    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn initial_state(&self) -> Option<StateId> {
        self.initial
    }

    pub fn state_id(&self, name: &str) -> Option<StateId> {
        self.by_name.get(name).copied()
    }

    pub fn state_name(&self, id: StateId) -> Option<&str> {
        self.states.get(id.0).map(|s| s.name.as_str())
    }

    /// States in declaration order.
    pub fn states(&self) -> impl Iterator<Item = StateView<'_>> + '_ {
        self.states.iter().enumerate().map(|(i, s)| StateView {
            id: StateId(i),
            name: &s.name,
            outcome: s.outcome,
            on_cooperate: s.next[0],
            on_defect: s.next[1],
        })
    }

    /// Raw transition lookup, `None` when undefined.
    pub fn transition(&self, state: StateId, symbol: Move) -> Option<StateId> {
        self.states.get(state.0).and_then(|s| s.next[symbol.column()])
    }

    /// Whether the state was declared with an action (not only referenced).
    pub fn is_declared(&self, state: StateId) -> bool {
        self.states.get(state.0).is_some_and(|s| s.outcome.is_some())
    }

    /// The move played while in `state`.
    pub fn outcome(&self, state: StateId) -> Result<Move, MachineError> {
        let entry = self.entry(state)?;
        entry.outcome.ok_or_else(|| MachineError::MissingOutcome {
            state: entry.name.clone(),
        })
    }

    /// Next state after the opponent played `opponent_move`.
    pub fn step(&self, state: StateId, opponent_move: Move) -> Result<StateId, MachineError> {
        let entry = self.entry(state)?;
        entry.next[opponent_move.column()].ok_or_else(|| MachineError::MissingTransition {
            state: entry.name.clone(),
            symbol: opponent_move,
        })
    }

    /// Re-targets the initial state to a declared state.
    pub fn with_initial_state(mut self, name: &str) -> Result<Self, ValidationError> {
        match self.state_id(name.trim()) {
            Some(id) if self.is_declared(id) => {
                self.initial = Some(id);
                Ok(self)
            }
            _ => Err(ValidationError::UnknownInitialState {
                state: name.trim().to_string(),
            }),
        }
    }

    /// Structural equivalence of the parts reachable from both initial states.
    ///
    /// Holds when some bijection maps initial to initial, preserves every
    /// state's move, and commutes with both transitions.
    pub fn is_isomorphic(&self, other: &MooreMachine) -> bool {
        let (a0, b0) = match (self.initial, other.initial) {
            (Some(a), Some(b)) => (a, b),
            (None, None) => return true,
            _ => return false,
        };

        let mut forward: HashMap<StateId, StateId> = HashMap::from([(a0, b0)]);
        let mut backward: HashMap<StateId, StateId> = HashMap::from([(b0, a0)]);
        let mut stack = vec![(a0, b0)];

        while let Some((a, b)) = stack.pop() {
            if self.states[a.0].outcome != other.states[b.0].outcome {
                return false;
            }
            for symbol in Move::ALL {
                match (self.transition(a, symbol), other.transition(b, symbol)) {
                    (None, None) => {}
                    (Some(na), Some(nb)) => match (forward.get(&na), backward.get(&nb)) {
                        (Some(&mapped), _) if mapped != nb => return false,
                        (_, Some(&mapped)) if mapped != na => return false,
                        (Some(_), Some(_)) => {}
                        (None, None) => {
                            forward.insert(na, nb);
                            backward.insert(nb, na);
                            stack.push((na, nb));
                        }
                        _ => return false,
                    },
                    _ => return false,
                }
            }
        }
        true
    }

    fn entry(&self, state: StateId) -> Result<&StateEntry, MachineError> {
        self.states
            .get(state.0)
            .ok_or(MachineError::UnknownState(state.0))
    }
}

impl fmt::Display for MooreMachine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let initial = self
            .initial
            .and_then(|id| self.state_name(id))
            .unwrap_or("-");
        writeln!(f, "Init: {}", initial)?;
        for state in &self.states {
            let out = state.outcome.map_or('?', Move::symbol);
            writeln!(f, "State {}:", state.name)?;
            writeln!(f, "\tOut: {}", out)?;
            for symbol in Move::ALL {
                if let Some(next) = state.next[symbol.column()] {
                    writeln!(f, "\t{} -> {}", symbol, self.states[next.0].name)?;
                }
            }
        }
        Ok(())
    }
}

/// Incremental construction of a [`MooreMachine`].
///
/// States are created on first mention, either as a declared state or as a
/// transition target.
#[derive(Clone, Debug, Default)]
pub struct MachineBuilder {
    machine: MooreMachine,
}

impl MachineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Gets or creates a state.
    pub fn state(&mut self, name: &str) -> StateId {
        if let Some(id) = self.machine.state_id(name) {
            return id;
        }
        let id = StateId(self.machine.states.len());
        self.machine.states.push(StateEntry {
            name: name.to_string(),
            outcome: None,
            next: [None, None],
        });
        self.machine.by_name.insert(name.to_string(), id);
        id
    }

    /// True once both transitions of `name` have been set.
    pub fn is_fully_defined(&self, name: &str) -> bool {
        self.machine
            .state_id(name)
            .is_some_and(|id| self.machine.states[id.0].next.iter().all(Option::is_some))
    }

    pub fn outcome(&mut self, name: &str, outcome: Move) -> &mut Self {
        let id = self.state(name);
        self.machine.states[id.0].outcome = Some(outcome);
        self
    }

    pub fn transition(&mut self, from: &str, symbol: Move, to: &str) -> &mut Self {
        let from = self.state(from);
        let to = self.state(to);
        self.machine.states[from.0].next[symbol.column()] = Some(to);
        self
    }

    /// One full `STATE: ACTION, NEXT_ON_C, NEXT_ON_D` rule.
    pub fn rule(&mut self, name: &str, outcome: Move, on_cooperate: &str, on_defect: &str) -> &mut Self {
        self.outcome(name, outcome)
            .transition(name, Move::Cooperate, on_cooperate)
            .transition(name, Move::Defect, on_defect)
    }

    pub fn initial(&mut self, name: &str) -> &mut Self {
        let id = self.state(name);
        self.machine.initial = Some(id);
        self
    }

    /// Finishes the machine. Without an explicit initial state the first
    /// declared state is used.
    pub fn build(&self) -> MooreMachine {
        let mut machine = self.machine.clone();
        if machine.initial.is_none() {
            machine.initial = machine
                .states
                .iter()
                .position(|s| s.outcome.is_some())
                .map(StateId);
        }
        machine
    }
}
