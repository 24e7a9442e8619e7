//! Decision makers that sit at a seat: a human behind some input widget or
//! one of the scripted strategies. The round loop treats them all the same.

mod basic;
mod heuristic;
mod human;
mod random;

pub use basic::{BasicBrain, Cell, StrategyChart};
pub use heuristic::HeuristicBrain;
pub use human::{HumanBrain, HumanInput, Prompt, PromptHook};
pub use random::RandomBrain;

use crate::{Card, Error, Hand, PlayerAction, Rank};
use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Hit,
    Stand,
    Double,
    Split,
    Surrender,
    Insurance,
}

impl Decision {
    /// Insurance is a side decision with no table action behind it.
    pub fn to_action(self) -> Option<PlayerAction> {
        match self {
            Decision::Hit => Some(PlayerAction::Hit),
            Decision::Stand => Some(PlayerAction::Stand),
            Decision::Double => Some(PlayerAction::Double),
            Decision::Split => Some(PlayerAction::Split),
            Decision::Surrender => Some(PlayerAction::Surrender),
            Decision::Insurance => None,
        }
    }
}

impl FromStr for Decision {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "hit" | "h" => Ok(Decision::Hit),
            "stand" | "s" => Ok(Decision::Stand),
            "double" | "d" => Ok(Decision::Double),
            "split" | "p" => Ok(Decision::Split),
            "surrender" | "r" => Ok(Decision::Surrender),
            "insurance" | "i" => Ok(Decision::Insurance),
            other => Err(format!("Unknown decision '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrainType {
    Human,
    Random,
    Basic,
    Heuristic,
}

impl FromStr for BrainType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "human" => Ok(BrainType::Human),
            "easy" | "random" => Ok(BrainType::Random),
            "basic" | "medium" => Ok(BrainType::Basic),
            "hard" | "heuristic" => Ok(BrainType::Heuristic),
            _ => Err(Error::InvalidBrainType(s.to_string())),
        }
    }
}

impl fmt::Display for BrainType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BrainType::Human => "human",
            BrainType::Random => "random",
            BrainType::Basic => "basic",
            BrainType::Heuristic => "heuristic",
        };
        f.write_str(name)
    }
}

/// Everything a brain may look at when choosing a play. Built fresh for
/// every decision and never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionContext {
    pub hand: Hand,
    pub dealer_up_card: Card,
    pub can_double: bool,
    pub can_split: bool,
    pub can_surrender: bool,
    pub can_insurance: bool,
}

impl DecisionContext {
    /// Context where only hit and stand are on offer.
    pub fn new(hand: Hand, dealer_up_card: Card) -> Self {
        Self {
            hand,
            dealer_up_card,
            can_double: false,
            can_split: false,
            can_surrender: false,
            can_insurance: false,
        }
    }

    pub fn legal_decisions(&self) -> Vec<Decision> {
        [
            Decision::Hit,
            Decision::Stand,
            Decision::Double,
            Decision::Split,
            Decision::Surrender,
            Decision::Insurance,
        ]
        .into_iter()
        .filter(|d| is_valid_decision(*d, self))
        .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BetContext {
    pub balance: u64,
    pub min_bet: u64,
    pub max_bet: u64,
}

impl BetContext {
    pub fn clamp(&self, amount: u64) -> u64 {
        amount.max(self.min_bet).min(self.max_bet)
    }

    /// `fraction` of the chip stack, clamped to the table limits.
    pub fn fraction_of_balance(&self, fraction: f64) -> u64 {
        self.clamp((self.balance as f64 * fraction).floor() as u64)
    }
}

#[async_trait]
pub trait Brain: Send {
    fn brain_type(&self) -> BrainType;

    async fn make_decision(&mut self, context: &DecisionContext) -> Result<Decision, Error>;

    async fn decide_bet(&mut self, context: &BetContext) -> Result<u64, Error>;
}

pub fn is_valid_decision(decision: Decision, context: &DecisionContext) -> bool {
    match decision {
        Decision::Hit | Decision::Stand => true,
        Decision::Double => context.can_double,
        Decision::Split => context.can_split,
        Decision::Surrender => context.can_surrender,
        Decision::Insurance => context.can_insurance,
    }
}

/// No brain may be asked about a finished hand or a context whose flags
/// contradict the cards.
pub fn validate_decision_context(context: &DecisionContext) -> Result<(), Error> {
    let hand = &context.hand;
    if hand.is_empty() {
        return Err(Error::InvalidContext("hand has no cards".to_string()));
    }
    if hand.is_bust {
        return Err(Error::InvalidContext(format!(
            "hand is bust ({}), no decision is possible",
            hand.value
        )));
    }
    if hand.is_blackjack {
        return Err(Error::InvalidContext(
            "hand is a blackjack, no decision is possible".to_string(),
        ));
    }
    if context.can_split && !hand.is_pair() {
        return Err(Error::InvalidContext(
            "split offered but the hand is not a pair of equal rank".to_string(),
        ));
    }
    if context.can_insurance && context.dealer_up_card.rank != Rank::Ace {
        return Err(Error::InvalidContext(format!(
            "insurance offered but the dealer shows {}",
            context.dealer_up_card
        )));
    }
    Ok(())
}

/// Build a scripted brain by name. Human brains need an input resolver and
/// are constructed with [`HumanBrain::new`] instead.
pub fn create_cpu_brain(kind: &str) -> Result<Box<dyn Brain>, Error> {
    cpu_brain_with_rng(kind, StdRng::from_entropy())
}

pub fn create_seeded_cpu_brain(kind: &str, seed: u64) -> Result<Box<dyn Brain>, Error> {
    cpu_brain_with_rng(kind, StdRng::seed_from_u64(seed))
}

fn cpu_brain_with_rng(kind: &str, rng: StdRng) -> Result<Box<dyn Brain>, Error> {
    match kind.parse::<BrainType>() {
        Ok(BrainType::Random) => Ok(Box::new(RandomBrain::new(rng))),
        Ok(BrainType::Basic) => Ok(Box::new(BasicBrain::new(rng))),
        Ok(BrainType::Heuristic) => Ok(Box::new(HeuristicBrain::new(rng))),
        Ok(BrainType::Human) | Err(_) => Err(Error::InvalidBrainType(kind.to_string())),
    }
}
