//! Well-known strategies written as Moore machines
//!
//! Used as reference opponents, as forbidden-strategy presets and by the
//! frontend to pre-fill the strategy editor.

use serde::{Deserialize, Serialize};

use crate::machine::MooreMachine;
use crate::parser::parse_strategy;

/// Classic finite-state strategy
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Classic {
    /// Always cooperate, never defect.
    AlwaysCooperate,
    /// Always defect, never cooperate.
    AlwaysDefect,
    /// Copy opponent's last move. Start with cooperate.
    TitForTat,
    /// Tit-for-Tat but start with defect.
    SuspiciousTitForTat,
    /// Cooperate until opponent defects once, then always defect.
    GrimTrigger,
    /// Win-stay, lose-switch.
    Pavlov,
    /// Defect only if opponent defected twice in a row.
    TitForTwoTats,
}

impl Classic {
    pub const ALL: [Classic; 7] = [
        Classic::AlwaysCooperate,
        Classic::AlwaysDefect,
        Classic::TitForTat,
        Classic::SuspiciousTitForTat,
        Classic::GrimTrigger,
        Classic::Pavlov,
        Classic::TitForTwoTats,
    ];

    /// Strategy text in submission format.
    pub fn source(self) -> &'static str {
        match self {
            Classic::AlwaysCooperate => "0: C, 0, 0\n",
            Classic::AlwaysDefect => "0: D, 0, 0\n",
            Classic::TitForTat => "c: C, c, d\nd: D, c, d\n",
            Classic::SuspiciousTitForTat => "d: D, c, d\nc: C, c, d\n",
            Classic::GrimTrigger => "c: C, c, d\nd: D, d, d\n",
            // Stays after C/C and D/C, switches after being exploited or mutual defection
            Classic::Pavlov => "c: C, c, d\nd: D, d, c\n",
            Classic::TitForTwoTats => "c0: C, c0, c1\nc1: C, c0, d\nd: D, c0, d\n",
        }
    }

    /// Name of the state the strategy starts in.
    pub fn initial_state(self) -> &'static str {
        self.source()
            .split_once(':')
            .map_or("", |(state, _)| state.trim())
    }

    pub fn machine(self) -> MooreMachine {
        let (machine, _) = parse_strategy(self.source());
        machine
    }

    pub fn name(self) -> &'static str {
        match self {
            Classic::AlwaysCooperate => "Always Cooperate",
            Classic::AlwaysDefect => "Always Defect",
            Classic::TitForTat => "Tit for Tat",
            Classic::SuspiciousTitForTat => "Suspicious Tit for Tat",
            Classic::GrimTrigger => "Grim Trigger",
            Classic::Pavlov => "Pavlov",
            Classic::TitForTwoTats => "Tit for Two Tats",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Classic::AlwaysCooperate => "Never defects. Always cooperates.",
            Classic::AlwaysDefect => "Never cooperates. Always defects.",
            Classic::TitForTat => "Copies opponent's last move. Starts by cooperating.",
            Classic::SuspiciousTitForTat => "Like Tit for Tat, but starts with defect.",
            Classic::GrimTrigger => "Cooperates until betrayed, then always defects.",
            Classic::Pavlov => "Repeats move if outcome was good, switches if bad.",
            Classic::TitForTwoTats => "Only retaliates after two consecutive defections.",
        }
    }
}
