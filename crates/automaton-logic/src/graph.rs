//! Read-only graph view of a strategy, for rendering
//!
//! Nodes are the machine's states. Each defined transition becomes an edge
//! labeled with the opponent move that triggers it; when both moves lead to
//! the same state the two edges are merged into one labeled `C/D`.

use serde::{Deserialize, Serialize};

use crate::machine::{MooreMachine, Move};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: String,
    /// `None` for states that are referenced but never declared.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<Move>,
    pub initial: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EdgeLabel {
    #[serde(rename = "C")]
    Cooperate,
    #[serde(rename = "D")]
    Defect,
    #[serde(rename = "C/D")]
    Both,
}

impl From<Move> for EdgeLabel {
    fn from(symbol: Move) -> Self {
        match symbol {
            Move::Cooperate => EdgeLabel::Cooperate,
            Move::Defect => EdgeLabel::Defect,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphEdge {
    pub source: String,
    pub target: String,
    pub label: EdgeLabel,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyGraph {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

impl StrategyGraph {
    pub fn from_machine(machine: &MooreMachine) -> Self {
        let initial = machine.initial_state();
        let name = |id| machine.state_name(id).unwrap_or_default().to_string();

        let nodes = machine
            .states()
            .map(|state| GraphNode {
                id: state.name.to_string(),
                action: state.outcome,
                initial: Some(state.id) == initial,
            })
            .collect();

        let mut edges = Vec::new();
        for state in machine.states() {
            match (state.on_cooperate, state.on_defect) {
                (Some(c), Some(d)) if c == d => edges.push(GraphEdge {
                    source: state.name.to_string(),
                    target: name(c),
                    label: EdgeLabel::Both,
                }),
                _ => {
                    for symbol in Move::ALL {
                        if let Some(next) = state.next(symbol) {
                            edges.push(GraphEdge {
                                source: state.name.to_string(),
                                target: name(next),
                                label: symbol.into(),
                            });
                        }
                    }
                }
            }
        }

        Self { nodes, edges }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
