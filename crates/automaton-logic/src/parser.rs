//! Strategy text parser
//!
//! One rule per non-blank line:
//!
//! ```text
//! STATE: ACTION, NEXT_ON_COOPERATE, NEXT_ON_DEFECT
//! ```
//!
//! `ACTION` is `C` or `D`, state names are alphanumeric and whitespace
//! around tokens is ignored. Parsing never stops at the first bad line so a
//! submitter sees every problem at once.

use crate::error::{SyntaxIssue, ValidationError};
use crate::machine::{MachineBuilder, MooreMachine, Move};

struct Rule<'a> {
    state: &'a str,
    outcome: Move,
    on_cooperate: &'a str,
    on_defect: &'a str,
}

/// Parse strategy lines into a machine plus every syntax/redefinition error.
///
/// Line numbers in errors are 1-based over the given lines, blank lines
/// included. A redefining line is reported and ignored; the first definition
/// of a state is kept.
pub fn parse<'a, I>(lines: I) -> (MooreMachine, Vec<ValidationError>)
where
    I: IntoIterator<Item = &'a str>,
{
    let mut builder = MachineBuilder::new();
    let mut errors = Vec::new();

    for (index, raw) in lines.into_iter().enumerate() {
        let line = index + 1;
        let text = raw.trim();
        if text.is_empty() {
            continue;
        }

        match parse_rule(text) {
            Ok(rule) => {
                if builder.is_fully_defined(rule.state) {
                    errors.push(ValidationError::Redefinition {
                        line,
                        state: rule.state.to_string(),
                    });
                    continue;
                }
                builder.rule(rule.state, rule.outcome, rule.on_cooperate, rule.on_defect);
            }
            Err(issue) => errors.push(ValidationError::Syntax { line, issue }),
        }
    }

    (builder.build(), errors)
}

/// Parse a whole submission text.
pub fn parse_strategy(text: &str) -> (MooreMachine, Vec<ValidationError>) {
    parse(text.lines())
}

fn parse_rule(line: &str) -> Result<Rule<'_>, SyntaxIssue> {
    let (state, rest) = line
        .split_once(':')
        .ok_or_else(|| SyntaxIssue::MissingColon(line.to_string()))?;

    let fields: Vec<&str> = rest.split(',').map(str::trim).collect();
    let &[action, on_cooperate, on_defect] = fields.as_slice() else {
        return Err(SyntaxIssue::FieldCount(fields.len()));
    };

    Ok(Rule {
        state: identifier(state.trim())?,
        outcome: action.parse().map_err(SyntaxIssue::InvalidAction)?,
        on_cooperate: identifier(on_cooperate)?,
        on_defect: identifier(on_defect)?,
    })
}

fn identifier(name: &str) -> Result<&str, SyntaxIssue> {
    if !name.is_empty() && name.chars().all(char::is_alphanumeric) {
        Ok(name)
    } else {
        Err(SyntaxIssue::InvalidStateName(name.to_string()))
    }
}
