//! Payoff tables
//!
//! The table is organizer configuration. A missing entry is never defaulted:
//! looking it up fails with [`PayoffError::MissingEntry`]. Scores must be
//! finite for a table to pass [`PayoffTable::check_complete`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::PayoffError;
use crate::machine::Move;

/// One configured payoff: what A and B score when they play `a` and `b`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PayoffEntry {
    pub a: Move,
    pub b: Move,
    pub score_a: f64,
    pub score_b: f64,
}

/// Mapping from ordered move pairs to (score_a, score_b).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<PayoffEntry>", into = "Vec<PayoffEntry>")]
pub struct PayoffTable {
    entries: BTreeMap<(Move, Move), (f64, f64)>,
}

impl PayoffTable {
    /// Builds a table from explicit entries; later entries override earlier ones.
    pub fn from_entries<I: IntoIterator<Item = PayoffEntry>>(entries: I) -> Self {
        Self {
            entries: entries
                .into_iter()
                .map(|e| ((e.a, e.b), (e.score_a, e.score_b)))
                .collect(),
        }
    }

    /// Symmetric dilemma table.
    ///
    /// * `high` - defector's payoff against a cooperator
    /// * `medium` - both cooperate
    /// * `low` - both defect
    /// * `tiny` - cooperator's payoff against a defector
    pub fn symmetric(high: f64, medium: f64, low: f64, tiny: f64) -> Self {
        use Move::{Cooperate as C, Defect as D};
        Self {
            entries: BTreeMap::from([
                ((C, C), (medium, medium)),
                ((C, D), (tiny, high)),
                ((D, C), (high, tiny)),
                ((D, D), (low, low)),
            ]),
        }
    }

    /// Returns (score_a, score_b) for the ordered pair of moves.
    pub fn payoff(&self, a: Move, b: Move) -> Result<(f64, f64), PayoffError> {
        self.entries
            .get(&(a, b))
            .copied()
            .ok_or(PayoffError::MissingEntry { a, b })
    }

    /// Fails on the first of the four combinations that has no entry or a
    /// NaN/infinite score.
    pub fn check_complete(&self) -> Result<(), PayoffError> {
        for a in Move::ALL {
            for b in Move::ALL {
                let (score_a, score_b) = self.payoff(a, b)?;
                if !score_a.is_finite() || !score_b.is_finite() {
                    return Err(PayoffError::NonFinite { a, b });
                }
            }
        }
        Ok(())
    }
}

impl From<Vec<PayoffEntry>> for PayoffTable {
    fn from(entries: Vec<PayoffEntry>) -> Self {
        Self::from_entries(entries)
    }
}

impl From<PayoffTable> for Vec<PayoffEntry> {
    fn from(table: PayoffTable) -> Self {
        table
            .entries
            .into_iter()
            .map(|((a, b), (score_a, score_b))| PayoffEntry { a, b, score_a, score_b })
            .collect()
    }
}
