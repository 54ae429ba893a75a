use std::path::PathBuf;

use anyhow::{bail, Context};
use automaton_logic::{run_tournament, Settings, Submission, TournamentResult};
use serde::{Deserialize, Serialize};

use crate::util::{self, Output};

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct TournamentArg {
    /// Tournament JSON: `{"settings": {...}, "submissions": [...]}`
    input: PathBuf,
    /// Abort when any submission is rejected
    #[arg(long)]
    strict: bool,
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct TournamentInput {
    #[serde(default)]
    settings: Settings,
    submissions: Vec<Submission>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
struct Rejection {
    player: String,
    name: String,
    errors: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
struct TournamentReport {
    round_lengths: Vec<u32>,
    rejected: Vec<Rejection>,
    #[serde(flatten)]
    result: TournamentResult,
}

fn build_report(input: &TournamentInput, strict: bool) -> anyhow::Result<TournamentReport> {
    let TournamentInput {
        settings,
        submissions,
    } = input;

    let mut entrants = Vec::with_capacity(submissions.len());
    let mut rejected = Vec::new();
    for submission in submissions {
        match submission.accept(&settings.policy, &settings.forbidden_strategies) {
            Ok(accepted) => entrants.push(accepted.entrant),
            Err(errors) => {
                tracing::warn!(
                    player = %submission.player,
                    errors = errors.len(),
                    "submission rejected"
                );
                rejected.push(Rejection {
                    player: submission.player.clone(),
                    name: submission.name.clone(),
                    errors: errors.iter().map(ToString::to_string).collect(),
                });
            }
        }
    }

    if strict && !rejected.is_empty() {
        let players: Vec<&str> = rejected.iter().map(|r| r.player.as_str()).collect();
        bail!("Rejected submissions: {}", players.join(", "));
    }

    let round_lengths = settings.round_lengths.as_slice();
    let result = run_tournament(&entrants, round_lengths, &settings.payoffs.table())
        .context("Tournament failed")?;

    Ok(TournamentReport {
        round_lengths: round_lengths.to_vec(),
        rejected,
        result,
    })
}

pub(crate) fn run(arg: &TournamentArg) -> anyhow::Result<()> {
    let TournamentArg {
        input,
        strict,
        output,
    } = arg;

    let tournament: TournamentInput = util::read_json(input)?;
    let report = build_report(&tournament, *strict)?;

    for standing in report.result.ranking() {
        tracing::info!(
            player = %standing.player,
            total = standing.total_score,
            avg = standing.avg_score,
            winner = standing.winner,
            "standing"
        );
    }
    Output::save_json(&report, output.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    const INPUT: &str = r#"{
        "settings": {
            "num_repetitions": "10, 20",
            "forbidden_strategies": "x: C, x, x"
        },
        "submissions": [
            {"player": "p1", "name": "grim", "automaton": "c: C, c, d\nd: D, d, d", "initial_state": "c"},
            {"player": "p2", "name": "nice", "automaton": "n: C, n, n", "initial_state": "n"},
            {"player": "p3", "name": "mean", "automaton": "m: D, m, m", "initial_state": "m"}
        ]
    }"#;

    fn input() -> TournamentInput {
        serde_json::from_str(INPUT).unwrap()
    }

    #[test]
    fn test_rejected_submission_is_reported() {
        let report = build_report(&input(), false).unwrap();
        assert_eq!(report.round_lengths, vec![10, 20]);
        assert_eq!(report.rejected.len(), 1);
        assert_eq!(report.rejected[0].player, "p2");
        assert_eq!(report.result.standings.len(), 2);
        // grim cooperates once per length, then both defect
        assert_eq!(report.result.standings[0].total_score, -25.0 * 2.0 - 20.0 * 28.0);
        assert_eq!(report.result.standings[1].total_score, -20.0 * 28.0);
        assert_eq!(report.result.winners, vec![1]);
    }

    #[test]
    fn test_strict_aborts_on_rejection() {
        let err = build_report(&input(), true).unwrap_err();
        assert!(err.to_string().contains("p2"));
    }

    #[test]
    fn test_settings_default_when_missing() {
        let input: TournamentInput = serde_json::from_str(
            r#"{"submissions": [{"player": "solo", "automaton": "s: D, s, s", "initial_state": "s"}]}"#,
        )
        .unwrap();
        let report = build_report(&input, true).unwrap();
        assert_eq!(report.round_lengths, vec![168, 359, 306, 622, 319]);
        assert_eq!(report.result.winners, vec![0]);
    }

    #[test]
    fn test_run_writes_report() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("tournament.json");
        let output = dir.path().join("result.json");
        std::fs::write(&input, INPUT).unwrap();

        let arg = TournamentArg {
            input,
            strict: false,
            output: Some(output.clone()),
        };
        run(&arg).unwrap();

        let report: serde_json::Value = util::read_json(&output).unwrap();
        assert_eq!(report["rejected"][0]["player"], "p2");
        assert_eq!(report["winners"], serde_json::json!([1]));
        assert_eq!(report["records"].as_array().unwrap().len(), 4);
    }
}
