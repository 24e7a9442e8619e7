use crate::rules::RuleViolation;
use crate::{Decision, GamePhase};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Cannot draw from an empty deck")]
    EmptyDeck,
    #[error("Invalid brain type: {0}")]
    InvalidBrainType(String),
    #[error("Invalid decision context: {0}")]
    InvalidContext(String),
    #[error("Decision cancelled")]
    DecisionCancelled,
    #[error("Bet cancelled")]
    BetCancelled,
    #[error("Unknown rules preset: {0}")]
    UnknownPreset(String),
    #[error("Invalid rules: {}", format_violations(.0))]
    InvalidRules(Vec<RuleViolation>),
    #[error("A table needs at least one seat")]
    NoSeats,
    #[error("Duplicate seat id: {0}")]
    DuplicateSeat(String),
    #[error("Illegal decision {decision:?} for seat {seat_id}")]
    IllegalDecision { seat_id: String, decision: Decision },
    #[error("Rules can only change between rounds, the table is in {0:?}")]
    RoundInProgress(GamePhase),
}

fn format_violations(violations: &[RuleViolation]) -> String {
    violations
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}
