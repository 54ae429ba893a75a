use std::path::PathBuf;

use anyhow::{anyhow, Context};
use automaton_logic::{
    play_match, ForbiddenStrategies, MatchResult, MooreMachine, PayoffSettings, Submission,
    ValidationPolicy,
};

use crate::util::{self, Output};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct PlayArg {
    /// Strategy of player A: a file, or `classic:<name>`
    strategy_a: String,
    /// Strategy of player B: a file, or `classic:<name>`
    strategy_b: String,
    /// Number of rounds
    #[arg(long, default_value_t = 10)]
    rounds: u32,
    /// Initial state of player A
    #[arg(long)]
    initial_a: Option<String>,
    /// Initial state of player B
    #[arg(long)]
    initial_b: Option<String>,
    /// Payoff settings JSON file (defaults to the classroom payoffs)
    #[arg(long)]
    payoffs: Option<PathBuf>,
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
}

fn compile(submission: &Submission) -> anyhow::Result<MooreMachine> {
    submission
        .accept(&ValidationPolicy::default(), &ForbiddenStrategies::default())
        .map(|accepted| accepted.entrant.machine)
        .map_err(|errors| {
            let messages: Vec<String> = errors.iter().map(ToString::to_string).collect();
            anyhow!("Invalid strategy {}: {}", submission.name, messages.join(" "))
        })
}

fn play(
    a: &Submission,
    b: &Submission,
    rounds: u32,
    payoffs: &PayoffSettings,
) -> anyhow::Result<MatchResult> {
    let machine_a = compile(a)?;
    let machine_b = compile(b)?;
    play_match(&machine_a, &machine_b, rounds, &payoffs.table())
        .with_context(|| format!("Match {} vs {} failed", a.name, b.name))
}

pub(crate) fn run(arg: &PlayArg) -> anyhow::Result<()> {
    let PlayArg {
        strategy_a,
        strategy_b,
        rounds,
        initial_a,
        initial_b,
        payoffs,
        output,
    } = arg;

    let a = util::load_submission(strategy_a, initial_a.as_deref())?;
    let b = util::load_submission(strategy_b, initial_b.as_deref())?;
    let payoffs = match payoffs {
        Some(path) => util::read_json(path)?,
        None => PayoffSettings::default(),
    };

    let result = play(&a, &b, *rounds, &payoffs)?;
    tracing::info!(
        a = %a.name,
        b = %b.name,
        rounds = result.round_count,
        score_a = result.total_score_a,
        score_b = result.total_score_b,
        "match played"
    );
    Output::save_json(&result, output.clone())
}
