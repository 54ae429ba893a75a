//! Player submissions and the acceptance gate
//!
//! A [`Submission`] is what a player or team hands in. [`Submission::accept`]
//! derives its machine once, runs every check, and either yields an
//! [`Entrant`] for the tournament or the complete list of problems.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::machine::MooreMachine;
use crate::parser::parse_strategy;
use crate::settings::{ForbiddenStrategies, Severity, ValidationPolicy};
use crate::validator::{check_declarations, check_totality, validate};

/// Raw strategy submission
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    /// External player or team identity.
    pub player: String,
    /// Name of the strategy.
    #[serde(default)]
    pub name: String,
    /// Strategy text, one `STATE: ACTION, NEXT_ON_C, NEXT_ON_D` rule per line.
    pub automaton: String,
    pub initial_state: String,
    #[serde(default)]
    pub motivation: String,
}

/// A validated submission taking part in tournaments.
#[derive(Clone, Debug, PartialEq)]
pub struct Entrant {
    pub player: String,
    pub name: String,
    pub machine: MooreMachine,
}

impl Entrant {
    pub fn new(player: impl Into<String>, name: impl Into<String>, machine: MooreMachine) -> Self {
        Self {
            player: player.into(),
            name: name.into(),
            machine,
        }
    }
}

/// Outcome of a successful acceptance.
#[derive(Clone, Debug, PartialEq)]
pub struct Accepted {
    pub entrant: Entrant,
    /// Findings the policy downgraded to warnings.
    pub warnings: Vec<ValidationError>,
}

impl Submission {
    /// Parses and validates the submission.
    ///
    /// On rejection every finding is returned, warnings included, so the
    /// submitter can fix everything in one go.
    pub fn accept(
        &self,
        policy: &ValidationPolicy,
        forbidden: &ForbiddenStrategies,
    ) -> Result<Accepted, Vec<ValidationError>> {
        let (parsed, mut findings) = parse_strategy(&self.automaton);

        let machine = if parsed.initial_state().is_none() {
            findings.push(ValidationError::EmptyStrategy);
            None
        } else {
            match parsed.clone().with_initial_state(&self.initial_state) {
                Ok(machine) => {
                    findings.extend(validate(&machine));
                    Some(machine)
                }
                Err(err) => {
                    // Reachability is meaningless without a start state
                    findings.push(err);
                    findings.extend(check_totality(&parsed));
                    findings.extend(check_declarations(&parsed));
                    None
                }
            }
        };

        let fatal = |findings: &[ValidationError]| {
            findings
                .iter()
                .any(|f| policy.severity(f) == Severity::Fatal)
        };

        let machine = match machine {
            Some(machine) if !fatal(&findings) => machine,
            _ => {
                tracing::debug!(player = %self.player, errors = findings.len(), "submission rejected");
                return Err(findings);
            }
        };

        if forbidden.forbids(&machine) {
            findings.push(ValidationError::ForbiddenStrategy);
            tracing::debug!(player = %self.player, "submission matches a forbidden strategy");
            return Err(findings);
        }

        for warning in &findings {
            tracing::warn!(player = %self.player, %warning, "submission accepted with warning");
        }

        Ok(Accepted {
            entrant: Entrant::new(&self.player, &self.name, machine),
            warnings: findings,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classic::Classic;
    use crate::error::SyntaxIssue;
    use crate::machine::Move;

    fn submission(automaton: &str, initial_state: &str) -> Submission {
        Submission {
            player: "team-7".to_string(),
            name: "probe".to_string(),
            automaton: automaton.to_string(),
            initial_state: initial_state.to_string(),
            motivation: String::new(),
        }
    }

    fn strict() -> (ValidationPolicy, ForbiddenStrategies) {
        (ValidationPolicy::default(), ForbiddenStrategies::default())
    }

    #[test]
    fn test_accepts_sound_strategy() {
        let (policy, forbidden) = strict();
        let accepted = submission("c: C, c, d\nd: D, c, d", "d")
            .accept(&policy, &forbidden)
            .unwrap();

        assert!(accepted.warnings.is_empty());
        assert_eq!(accepted.entrant.player, "team-7");
        let machine = &accepted.entrant.machine;
        assert_eq!(machine.initial_state(), machine.state_id("d"));
    }

    #[test]
    fn test_unknown_initial_state() {
        let (policy, forbidden) = strict();
        let errors = submission("c: C, c, d\nd: D, c, d", "x")
            .accept(&policy, &forbidden)
            .unwrap_err();
        assert_eq!(
            errors,
            vec![ValidationError::UnknownInitialState { state: "x".to_string() }]
        );
    }

    #[test]
    fn test_reports_syntax_and_semantic_errors_together() {
        let (policy, forbidden) = strict();
        let errors = submission("a: C, a, b\nb: ?, a, a\n", "a")
            .accept(&policy, &forbidden)
            .unwrap_err();

        assert!(errors.contains(&ValidationError::Syntax {
            line: 2,
            issue: SyntaxIssue::InvalidAction("?".to_string()),
        }));
        assert!(errors.contains(&ValidationError::IncompleteTransition {
            state: "b".to_string(),
            symbol: Move::Cooperate,
        }));
    }

    #[test]
    fn test_unreachable_is_fatal_by_default() {
        let (policy, forbidden) = strict();
        let errors = submission("a: C, a, a\nb: D, b, b", "a")
            .accept(&policy, &forbidden)
            .unwrap_err();
        assert_eq!(
            errors,
            vec![ValidationError::UnreachableStates { states: vec!["b".to_string()] }]
        );
    }

    #[test]
    fn test_lenient_policy_downgrades_to_warnings() {
        let policy = ValidationPolicy::lenient();
        let forbidden = ForbiddenStrategies::default();
        let accepted = submission("a: C, a, a\nb: D, b, b\na: D, a, a", "a")
            .accept(&policy, &forbidden)
            .unwrap();

        assert_eq!(accepted.warnings.len(), 2);
        assert!(matches!(accepted.warnings[0], ValidationError::Redefinition { line: 3, .. }));
        assert!(matches!(accepted.warnings[1], ValidationError::UnreachableStates { .. }));
    }

    #[test]
    fn test_lenient_policy_still_rejects_incomplete() {
        let policy = ValidationPolicy::lenient();
        let forbidden = ForbiddenStrategies::default();
        assert!(submission("a: C, a, ghost", "a").accept(&policy, &forbidden).is_err());
    }

    #[test]
    fn test_forbidden_strategy() {
        let policy = ValidationPolicy::default();
        let forbidden = ForbiddenStrategies::parse(Classic::TitForTat.source()).unwrap();

        let errors = submission("nice: C, nice, mean\nmean: D, nice, mean", "nice")
            .accept(&policy, &forbidden)
            .unwrap_err();
        assert_eq!(errors, vec![ValidationError::ForbiddenStrategy]);

        // Same states, different start: not the forbidden strategy
        assert!(submission("nice: C, nice, mean\nmean: D, nice, mean", "mean")
            .accept(&policy, &forbidden)
            .is_ok());
    }

    #[test]
    fn test_empty_submission() {
        let (policy, forbidden) = strict();
        let errors = submission("  \n", "0").accept(&policy, &forbidden).unwrap_err();
        assert_eq!(errors, vec![ValidationError::EmptyStrategy]);
    }

    #[test]
    fn test_submission_json() {
        let json = r#"{"player": "p1", "automaton": "0: C, 0, 0", "initial_state": "0"}"#;
        let s: Submission = serde_json::from_str(json).unwrap();
        assert_eq!(s.name, "");
        assert_eq!(s.motivation, "");
        assert_eq!(s.initial_state, "0");
    }
}
