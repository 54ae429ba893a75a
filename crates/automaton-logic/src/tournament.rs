//! Round-robin tournament over accepted entrants
//!
//! Every unordered pair plays once per configured round length. Pair jobs are
//! independent: each simulation owns its cursors, and with the `parallel`
//! feature they run on the rayon pool. Results are gathered in pair order and
//! reduced sequentially, so totals do not depend on thread scheduling.

#[cfg(feature = "parallel")]
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::TournamentError;
use crate::game::score_match;
use crate::payoff::PayoffTable;
use crate::submission::Entrant;

/// Relative tolerance when comparing grand totals for the winner set.
pub const WINNER_TOLERANCE: f64 = 1e-9;

/// One directional score record: how `entrant` did against `opponent`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub entrant: usize,
    pub opponent: usize,
    pub round_length: u32,
    /// Round total of `entrant`.
    pub score: f64,
    /// Round total of `opponent`.
    pub opponent_score: f64,
    /// `score` per round.
    pub avg_score: f64,
    /// `opponent_score` per round.
    pub opp_avg_score: f64,
}

/// Aggregate result of one entrant.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Standing {
    pub entrant: usize,
    pub player: String,
    pub name: String,
    /// Sum of round totals over all opponents and lengths.
    pub total_score: f64,
    /// `total_score / (sum of round lengths * max(1, opponents))`.
    pub avg_score: f64,
    pub winner: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TournamentResult {
    /// One entry per entrant, in entrant order.
    pub standings: Vec<Standing>,
    /// Two records per (pair, round length): (i, j, L) then (j, i, L).
    pub records: Vec<MatchRecord>,
    /// Indices of every entrant attaining the best grand total.
    pub winners: Vec<usize>,
}

impl TournamentResult {
    /// Standings by decreasing grand total; ties keep entrant order.
    pub fn ranking(&self) -> Vec<&Standing> {
        let mut ranked: Vec<&Standing> = self.standings.iter().collect();
        ranked.sort_by(|a, b| b.total_score.total_cmp(&a.total_score));
        ranked
    }

    /// Records of `entrant` against every opponent.
    pub fn records_for(&self, entrant: usize) -> impl Iterator<Item = &MatchRecord> + '_ {
        self.records.iter().filter(move |r| r.entrant == entrant)
    }
}

/// All unordered pairs `(i, j)` with `i < j`, in lexicographic order.
pub fn round_robin_pairs(participant_count: usize) -> impl Iterator<Item = (usize, usize)> {
    (0..participant_count).flat_map(move |i| (i + 1..participant_count).map(move |j| (i, j)))
}

/// Total number of simulations a tournament runs.
pub fn calculate_match_count(participant_count: usize, round_length_count: usize) -> usize {
    participant_count * participant_count.saturating_sub(1) / 2 * round_length_count
}

struct PairOutcome {
    i: usize,
    j: usize,
    rounds: u32,
    score_i: f64,
    score_j: f64,
}

/// Run the full round-robin and compute scores and winners.
///
/// Nothing is returned unless every match succeeded; configuration problems
/// are reported before any match is played.
///
/// # Arguments
/// * `entrants` - Accepted submissions
/// * `round_lengths` - Lengths every pair plays, all positive
/// * `payoffs` - Complete payoff table
pub fn run_tournament(
    entrants: &[Entrant],
    round_lengths: &[u32],
    payoffs: &PayoffTable,
) -> Result<TournamentResult, TournamentError> {
    if entrants.is_empty() {
        return Ok(TournamentResult::default());
    }
    payoffs.check_complete()?;
    if round_lengths.is_empty() {
        return Err(TournamentError::NoRoundLengths);
    }
    if let Some(&bad) = round_lengths.iter().find(|&&length| length == 0) {
        return Err(TournamentError::InvalidRoundLength(bad));
    }

    let span = tracing::info_span!("tournament", entrants = entrants.len());
    let _enter = span.enter();

    let n = entrants.len();
    let pairs: Vec<(usize, usize)> = round_robin_pairs(n).collect();
    tracing::info!(
        pairs = pairs.len(),
        matches = calculate_match_count(n, round_lengths.len()),
        ?round_lengths,
        "starting tournament"
    );

    let play_pair = |&(i, j): &(usize, usize)| -> Result<Vec<PairOutcome>, TournamentError> {
        let (a, b) = (&entrants[i], &entrants[j]);
        let outcomes = round_lengths
            .iter()
            .map(|&rounds| {
                let (score_i, score_j) = score_match(&a.machine, &b.machine, rounds, payoffs)
                    .map_err(|source| TournamentError::Match {
                        a: a.player.clone(),
                        b: b.player.clone(),
                        rounds,
                        source,
                    })?;
                Ok(PairOutcome { i, j, rounds, score_i, score_j })
            })
            .collect::<Result<Vec<_>, TournamentError>>()?;
        tracing::debug!(a = %a.player, b = %b.player, "pair played");
        Ok(outcomes)
    };

    #[cfg(feature = "parallel")]
    let outcomes = pairs
        .par_iter()
        .map(play_pair)
        .collect::<Result<Vec<_>, _>>()?;
    #[cfg(not(feature = "parallel"))]
    let outcomes = pairs
        .iter()
        .map(play_pair)
        .collect::<Result<Vec<_>, _>>()?;

    let mut totals = vec![0.0f64; n];
    let mut records = Vec::with_capacity(pairs.len() * round_lengths.len() * 2);
    for outcome in outcomes.into_iter().flatten() {
        let length = f64::from(outcome.rounds);
        totals[outcome.i] += outcome.score_i;
        totals[outcome.j] += outcome.score_j;
        records.push(MatchRecord {
            entrant: outcome.i,
            opponent: outcome.j,
            round_length: outcome.rounds,
            score: outcome.score_i,
            opponent_score: outcome.score_j,
            avg_score: outcome.score_i / length,
            opp_avg_score: outcome.score_j / length,
        });
        records.push(MatchRecord {
            entrant: outcome.j,
            opponent: outcome.i,
            round_length: outcome.rounds,
            score: outcome.score_j,
            opponent_score: outcome.score_i,
            avg_score: outcome.score_j / length,
            opp_avg_score: outcome.score_i / length,
        });
    }

    let winners = winner_set(&totals);
    let total_length: u64 = round_lengths.iter().map(|&l| u64::from(l)).sum();
    let normalizer = total_length as f64 * n.saturating_sub(1).max(1) as f64;

    let standings = entrants
        .iter()
        .zip(&totals)
        .enumerate()
        .map(|(index, (entrant, &total_score))| Standing {
            entrant: index,
            player: entrant.player.clone(),
            name: entrant.name.clone(),
            total_score,
            avg_score: total_score / normalizer,
            winner: winners.contains(&index),
        })
        .collect();

    tracing::info!(?winners, "tournament complete");

    Ok(TournamentResult {
        standings,
        records,
        winners,
    })
}

/// Indices whose total is within [`WINNER_TOLERANCE`] (relative) of the best.
fn winner_set(totals: &[f64]) -> Vec<usize> {
    let Some(best) = totals.iter().copied().reduce(f64::max) else {
        return Vec::new();
    };
    // An overflowed best total admits only exact matches
    let tolerance = if best.is_finite() {
        WINNER_TOLERANCE * best.abs().max(1.0)
    } else {
        0.0
    };
    totals
        .iter()
        .enumerate()
        .filter(|&(_, &total)| total == best || best - total <= tolerance)
        .map(|(index, _)| index)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classic::Classic;
    use crate::error::{MachineError, MatchError, PayoffError};
    use crate::machine::{MooreMachine, Move};

    fn entrant(classic: Classic) -> Entrant {
        Entrant::new(classic.name(), classic.name(), classic.machine())
    }

    fn classroom() -> PayoffTable {
        PayoffTable::symmetric(0.0, -10.0, -20.0, -25.0)
    }

    #[test]
    fn test_pairs_are_unique_and_ordered() {
        let pairs: Vec<_> = round_robin_pairs(4).collect();
        assert_eq!(pairs, vec![(0, 1), (0, 2), (0, 3), (1, 2), (1, 3), (2, 3)]);
        assert_eq!(round_robin_pairs(0).count(), 0);
        assert_eq!(round_robin_pairs(1).count(), 0);
        assert_eq!(calculate_match_count(4, 3), 18);
        assert_eq!(calculate_match_count(1, 3), 0);
    }

    #[test]
    fn test_empty_tournament() {
        let result = run_tournament(&[], &[10], &classroom()).unwrap();
        assert_eq!(result, TournamentResult::default());
        // Nothing is played, so the configuration is never consulted
        let result = run_tournament(&[], &[], &PayoffTable::default()).unwrap();
        assert_eq!(result, TournamentResult::default());
    }

    #[test]
    fn test_single_entrant_wins_alone() {
        let result = run_tournament(&[entrant(Classic::Pavlov)], &[10, 20], &classroom()).unwrap();
        assert_eq!(result.winners, vec![0]);
        assert!(result.records.is_empty());
        let standing = &result.standings[0];
        assert_eq!(standing.total_score, 0.0);
        assert_eq!(standing.avg_score, 0.0);
        assert!(standing.winner);
    }

    #[test]
    fn test_defect_vs_cooperate_totals() {
        let entrants = [entrant(Classic::AlwaysDefect), entrant(Classic::AlwaysCooperate)];
        let result = run_tournament(&entrants, &[3, 5], &classroom()).unwrap();

        assert_eq!(result.standings[0].total_score, 0.0);
        assert_eq!(result.standings[1].total_score, -25.0 * 8.0);
        assert_eq!(result.standings[1].avg_score, -25.0);
        assert_eq!(result.winners, vec![0]);
        assert!(result.standings[0].winner);
        assert!(!result.standings[1].winner);
    }

    #[test]
    fn test_directional_records() {
        let entrants = [entrant(Classic::AlwaysDefect), entrant(Classic::AlwaysCooperate)];
        let result = run_tournament(&entrants, &[4], &classroom()).unwrap();

        assert_eq!(
            result.records,
            vec![
                MatchRecord {
                    entrant: 0,
                    opponent: 1,
                    round_length: 4,
                    score: 0.0,
                    opponent_score: -100.0,
                    avg_score: 0.0,
                    opp_avg_score: -25.0,
                },
                MatchRecord {
                    entrant: 1,
                    opponent: 0,
                    round_length: 4,
                    score: -100.0,
                    opponent_score: 0.0,
                    avg_score: -25.0,
                    opp_avg_score: 0.0,
                },
            ]
        );
        assert_eq!(result.records_for(1).count(), 1);
    }

    #[test]
    fn test_grand_total_is_sum_of_records() {
        let entrants: Vec<_> = Classic::ALL.into_iter().map(entrant).collect();
        let lengths = [7, 13, 21];
        let result = run_tournament(&entrants, &lengths, &classroom()).unwrap();

        assert_eq!(result.records.len(), 2 * calculate_match_count(entrants.len(), lengths.len()));
        for standing in &result.standings {
            let sum: f64 = result.records_for(standing.entrant).map(|r| r.score).sum();
            assert!((sum - standing.total_score).abs() < 1e-9);
            let expected_avg = standing.total_score / (41.0 * 6.0);
            assert!((standing.avg_score - expected_avg).abs() < 1e-12);
        }
    }

    #[test]
    fn test_ties_yield_multiple_winners() {
        let entrants = [
            entrant(Classic::TitForTat),
            Entrant::new("copy", "copy", Classic::TitForTat.machine()),
            entrant(Classic::AlwaysCooperate),
        ];
        let result = run_tournament(&entrants, &[10], &classroom()).unwrap();
        // Everyone cooperates throughout
        assert_eq!(result.winners, vec![0, 1, 2]);
    }

    #[test]
    fn test_winner_tolerance() {
        assert_eq!(winner_set(&[-1000.0, -1000.0 + 1e-10, -2000.0]), vec![0, 1]);
        assert_eq!(winner_set(&[1.0, 1.5]), vec![1]);
        assert!(winner_set(&[]).is_empty());
    }

    #[test]
    fn test_overflowing_total_still_wins() {
        assert_eq!(winner_set(&[f64::INFINITY, 0.0]), vec![0]);
        assert_eq!(winner_set(&[-5.0, f64::INFINITY, f64::INFINITY]), vec![1, 2]);

        let entrants = [entrant(Classic::AlwaysDefect), entrant(Classic::AlwaysCooperate)];
        let huge = PayoffTable::symmetric(1e308, 0.0, 0.0, 0.0);
        let result = run_tournament(&entrants, &[10], &huge).unwrap();
        assert_eq!(result.standings[0].total_score, f64::INFINITY);
        assert_eq!(result.winners, vec![0]);
        assert!(result.standings[0].winner);
        assert!(!result.standings[1].winner);
    }

    #[test]
    fn test_non_finite_payoff_aborts() {
        let entrants = [entrant(Classic::AlwaysDefect), entrant(Classic::AlwaysCooperate)];
        let table = PayoffTable::symmetric(f64::INFINITY, -10.0, -20.0, -25.0);
        assert_eq!(
            run_tournament(&entrants, &[10], &table),
            Err(TournamentError::Payoff(PayoffError::NonFinite {
                a: Move::Cooperate,
                b: Move::Defect,
            }))
        );
    }

    #[test]
    fn test_ranking() {
        let entrants = [
            entrant(Classic::AlwaysCooperate),
            entrant(Classic::AlwaysDefect),
            entrant(Classic::TitForTat),
        ];
        let result = run_tournament(&entrants, &[10, 20], &classroom()).unwrap();
        let ranking = result.ranking();
        for pair in ranking.windows(2) {
            assert!(pair[0].total_score >= pair[1].total_score);
        }
        assert_eq!(ranking[0].entrant, result.winners[0]);
    }

    #[test]
    fn test_incomplete_payoff_table_aborts() {
        let entrants = [entrant(Classic::AlwaysDefect), entrant(Classic::AlwaysCooperate)];
        let err = run_tournament(&entrants, &[10], &PayoffTable::default()).unwrap_err();
        assert_eq!(
            err,
            TournamentError::Payoff(PayoffError::MissingEntry {
                a: Move::Cooperate,
                b: Move::Cooperate,
            })
        );
    }

    #[test]
    fn test_bad_round_lengths() {
        let entrants = [entrant(Classic::AlwaysDefect)];
        assert_eq!(
            run_tournament(&entrants, &[], &classroom()),
            Err(TournamentError::NoRoundLengths)
        );
        assert_eq!(
            run_tournament(&entrants, &[5, 0], &classroom()),
            Err(TournamentError::InvalidRoundLength(0))
        );
    }

    #[test]
    fn test_non_total_machine_aborts() {
        let partial = MooreMachine::builder()
            .outcome("s", Move::Cooperate)
            .transition("s", Move::Cooperate, "s")
            .build();
        let entrants = [
            entrant(Classic::AlwaysCooperate),
            Entrant::new("broken", "broken", partial),
            entrant(Classic::AlwaysDefect),
        ];
        let err = run_tournament(&entrants, &[3], &classroom()).unwrap_err();
        assert_eq!(
            err,
            TournamentError::Match {
                a: "broken".to_string(),
                b: "Always Defect".to_string(),
                rounds: 3,
                source: MatchError::Machine(MachineError::MissingTransition {
                    state: "s".to_string(),
                    symbol: Move::Defect,
                }),
            }
        );
    }
}
