//! Organizer settings for one tournament
//!
//! Everything here is external configuration: the list of match lengths, the
//! four payoff values, the strategies organizers refuse, and how strictly
//! soft validation findings are treated. Settings deserialize from JSON with
//! every field defaulted.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{SettingsError, ValidationError};
use crate::machine::MooreMachine;
use crate::parser::parse;
use crate::payoff::PayoffTable;
use crate::validator::validate;

/// Default comma-separated match lengths.
pub const DEFAULT_ROUND_LENGTHS: &str = "168, 359, 306, 622, 319";

/// Match lengths played by every pair. Several lengths keep the end of a
/// match unpredictable.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoundLengths(Vec<u32>);

impl RoundLengths {
    pub fn new(lengths: Vec<u32>) -> Result<Self, SettingsError> {
        if lengths.is_empty() {
            return Err(SettingsError::EmptyRoundLengths);
        }
        if lengths.contains(&0) {
            return Err(SettingsError::InvalidRoundLength("0".to_string()));
        }
        Ok(Self(lengths))
    }

    pub fn as_slice(&self) -> &[u32] {
        &self.0
    }

    pub fn total(&self) -> u64 {
        self.0.iter().map(|&l| u64::from(l)).sum()
    }
}

impl Default for RoundLengths {
    fn default() -> Self {
        Self(vec![168, 359, 306, 622, 319])
    }
}

impl FromStr for RoundLengths {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lengths = s
            .split(',')
            .map(str::trim)
            .map(|value| match value.parse::<u32>() {
                Ok(n) if n > 0 => Ok(n),
                _ => Err(SettingsError::InvalidRoundLength(value.to_string())),
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(lengths)
    }
}

impl fmt::Display for RoundLengths {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(u32::to_string).collect();
        write!(f, "{}", parts.join(", "))
    }
}

impl Serialize for RoundLengths {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for RoundLengths {
    /// Accepts `"10, 20"` as well as `[10, 20]`.
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            List(Vec<u32>),
        }

        let lengths = match Raw::deserialize(deserializer)? {
            Raw::Text(text) => text.parse(),
            Raw::List(list) => RoundLengths::new(list),
        };
        lengths.map_err(serde::de::Error::custom)
    }
}

/// The four payoff values of a symmetric dilemma.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PayoffSettings {
    /// Defector's payoff when the other player cooperates.
    pub payoff_high: f64,
    /// Payoff of both players when they both cooperate.
    pub payoff_medium: f64,
    /// Payoff of both players when they both defect.
    pub payoff_low: f64,
    /// Cooperator's payoff when the other player defects.
    pub payoff_tiny: f64,
}

impl Default for PayoffSettings {
    fn default() -> Self {
        Self {
            payoff_high: 0.0,
            payoff_medium: -10.0,
            payoff_low: -20.0,
            payoff_tiny: -25.0,
        }
    }
}

impl PayoffSettings {
    pub fn table(&self) -> PayoffTable {
        PayoffTable::symmetric(
            self.payoff_high,
            self.payoff_medium,
            self.payoff_low,
            self.payoff_tiny,
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Rejects the submission.
    #[default]
    Fatal,
    /// Reported, submission still accepted.
    Warning,
}

/// How strictly the policy-dependent findings are treated.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationPolicy {
    pub redefinition: Severity,
    pub unreachable_states: Severity,
}

impl ValidationPolicy {
    /// Both redefinitions and unreachable states only warn.
    pub fn lenient() -> Self {
        Self {
            redefinition: Severity::Warning,
            unreachable_states: Severity::Warning,
        }
    }

    pub fn severity(&self, error: &ValidationError) -> Severity {
        match error {
            ValidationError::Redefinition { .. } => self.redefinition,
            ValidationError::UnreachableStates { .. } => self.unreachable_states,
            _ => Severity::Fatal,
        }
    }
}

/// Strategies organizers refuse, compared up to state renaming.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ForbiddenStrategies {
    source: String,
    machines: Vec<MooreMachine>,
}

impl ForbiddenStrategies {
    /// Parses strategy blocks separated by lines starting with `---`.
    ///
    /// Each block starts in the state declared on its first line.
    pub fn parse(text: &str) -> Result<Self, SettingsError> {
        let mut blocks: Vec<Vec<&str>> = Vec::new();
        let mut current: Vec<&str> = Vec::new();
        for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
            if line.starts_with("---") {
                blocks.push(std::mem::take(&mut current));
            } else {
                current.push(line);
            }
        }
        if !current.is_empty() {
            blocks.push(current);
        }

        let machines = blocks
            .into_iter()
            .filter(|block| !block.is_empty())
            .enumerate()
            .map(|(i, block)| {
                let (machine, mut errors) = parse(block.iter().copied());
                errors.extend(validate(&machine));
                if errors.is_empty() {
                    Ok(machine)
                } else {
                    Err(SettingsError::InvalidForbiddenStrategy { index: i + 1, errors })
                }
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            source: text.to_string(),
            machines,
        })
    }

    pub fn len(&self) -> usize {
        self.machines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.machines.is_empty()
    }

    pub fn forbids(&self, machine: &MooreMachine) -> bool {
        self.machines.iter().any(|m| m.is_isomorphic(machine))
    }
}

impl Serialize for ForbiddenStrategies {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.source)
    }
}

impl<'de> Deserialize<'de> for ForbiddenStrategies {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        ForbiddenStrategies::parse(&text).map_err(serde::de::Error::custom)
    }
}

/// Complete tournament configuration.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    #[serde(rename = "num_repetitions")]
    pub round_lengths: RoundLengths,
    #[serde(flatten)]
    pub payoffs: PayoffSettings,
    pub forbidden_strategies: ForbiddenStrategies,
    pub policy: ValidationPolicy,
}

impl Settings {
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        Ok(serde_json::from_str(json)?)
    }
}
