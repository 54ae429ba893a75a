use std::path::PathBuf;

use anyhow::bail;
use automaton_logic::{ForbiddenStrategies, Submission, ValidationPolicy};
use serde::Serialize;

use crate::util::{self, Output};

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct CheckArg {
    /// Strategy file, or `classic:<name>` for a built-in strategy
    strategy: String,
    /// Initial state (defaults to the state on the first line)
    #[arg(long)]
    initial_state: Option<String>,
    /// Downgrade redefinitions and unreachable states to warnings
    #[arg(long)]
    lenient: bool,
    /// Exit with an error when the strategy is rejected
    #[arg(long)]
    fail: bool,
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
struct CheckReport {
    name: String,
    valid: bool,
    errors: Vec<String>,
    warnings: Vec<String>,
}

fn check_submission(submission: &Submission, policy: &ValidationPolicy) -> CheckReport {
    let (valid, errors, warnings) =
        match submission.accept(policy, &ForbiddenStrategies::default()) {
            Ok(accepted) => (true, Vec::new(), accepted.warnings),
            Err(errors) => (false, errors, Vec::new()),
        };
    CheckReport {
        name: submission.name.clone(),
        valid,
        errors: errors.iter().map(ToString::to_string).collect(),
        warnings: warnings.iter().map(ToString::to_string).collect(),
    }
}

pub(crate) fn run(arg: &CheckArg) -> anyhow::Result<()> {
    let CheckArg {
        strategy,
        initial_state,
        lenient,
        fail,
        output,
    } = arg;

    let submission = util::load_submission(strategy, initial_state.as_deref())?;
    let policy = if *lenient {
        ValidationPolicy::lenient()
    } else {
        ValidationPolicy::default()
    };

    let report = check_submission(&submission, &policy);
    tracing::info!(strategy = %report.name, valid = report.valid, "checked strategy");
    Output::save_json(&report, output.clone())?;

    if *fail && !report.valid {
        bail!("Strategy {} is invalid", report.name);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn submission(automaton: &str, initial_state: &str) -> Submission {
        Submission {
            player: "tester".to_string(),
            name: "probe".to_string(),
            automaton: automaton.to_string(),
            initial_state: initial_state.to_string(),
            motivation: String::new(),
        }
    }

    #[test]
    fn test_valid_strategy() {
        let report = check_submission(
            &submission("c: C, c, d\nd: D, c, d", "c"),
            &ValidationPolicy::default(),
        );
        assert!(report.valid);
        assert!(report.errors.is_empty());
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_lenient_reports_warnings() {
        let text = "a: C, a, a\nb: D, b, b";
        let strict = check_submission(&submission(text, "a"), &ValidationPolicy::default());
        assert!(!strict.valid);
        assert_eq!(
            strict.errors,
            vec!["The following states cannot be reached from the initial state: b.".to_string()]
        );

        let lenient = check_submission(&submission(text, "a"), &ValidationPolicy::lenient());
        assert!(lenient.valid);
        assert_eq!(lenient.warnings.len(), 1);
    }

    #[test]
    fn test_unknown_initial_state() {
        let report = check_submission(&submission("a: C, a, a", "zz"), &ValidationPolicy::default());
        assert!(!report.valid);
        assert_eq!(report.errors.len(), 1);
    }

    #[test]
    fn test_run_writes_report() {
        let dir = tempfile::tempdir().unwrap();
        let strategy = dir.path().join("s.txt");
        let output = dir.path().join("report.json");
        std::fs::write(&strategy, "a: C, a, b\n").unwrap();

        let arg = CheckArg {
            strategy: strategy.to_str().unwrap().to_string(),
            output: Some(output.clone()),
            ..CheckArg::default()
        };
        run(&arg).unwrap();

        let report: serde_json::Value = util::read_json(&output).unwrap();
        assert_eq!(report["valid"], false);

        let failing = CheckArg { fail: true, ..arg };
        assert!(run(&failing).is_err());
    }
}
