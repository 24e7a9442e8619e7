use crate::{Error, Hand, HandOutcome, Rank};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Payout multiplier as a ratio
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayoutRatio {
    pub numerator: u16,
    pub denominator: u16,
}

impl PayoutRatio {
    pub const THREE_TO_TWO: Self = Self {
        numerator: 3,
        denominator: 2,
    };
    pub const SIX_TO_FIVE: Self = Self {
        numerator: 6,
        denominator: 5,
    };
    pub const TWO_TO_ONE: Self = Self {
        numerator: 2,
        denominator: 1,
    };
    pub const ONE_TO_ONE: Self = Self {
        numerator: 1,
        denominator: 1,
    };

    pub fn new(numerator: u16, denominator: u16) -> Result<Self, &'static str> {
        if denominator == 0 {
            return Err("Denominator cannot be zero");
        }
        Ok(Self {
            numerator,
            denominator,
        })
    }

    /// Winnings for `bet`, floored to a whole currency unit.
    pub fn calculate_payout(&self, bet: u64) -> u64 {
        if self.denominator == 0 {
            return 0;
        }
        ((bet as u128 * self.numerator as u128) / self.denominator as u128) as u64
    }

    pub fn as_f64(&self) -> f64 {
        if self.denominator == 0 {
            return f64::NAN;
        }
        self.numerator as f64 / self.denominator as f64
    }
}

impl fmt::Display for PayoutRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.numerator, self.denominator)
    }
}

impl FromStr for PayoutRatio {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (num, den) = s
            .split_once(':')
            .ok_or_else(|| format!("Invalid payout ratio '{s}', expected N:D (e.g. 3:2)"))?;
        let num: u16 = num
            .trim()
            .parse()
            .map_err(|_| format!("Invalid numerator in payout ratio '{s}'"))?;
        let den: u16 = den
            .trim()
            .parse()
            .map_err(|_| format!("Invalid denominator in payout ratio '{s}'"))?;
        PayoutRatio::new(num, den).map_err(|e| format!("Invalid payout ratio: {e}"))
    }
}

/// Configurable blackjack table rules
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rules {
    /// Number of decks in the shoe
    pub deck_count: u8,

    /// Fraction of the shoe dealt before the cut card
    pub cut_card_ratio: f64,

    /// Dealer stands on this total or higher
    pub dealer_stands_on: u8,

    /// Dealer hits a soft `dealer_stands_on`
    pub dealer_hits_soft_17: bool,

    /// Allow doubling after split
    pub double_after_split: bool,

    /// Double on any first two cards, otherwise only on 9, 10 or 11
    pub double_on_any_two: bool,

    /// Maximum number of hands a seat may split into
    pub max_split_hands: u8,

    /// Aces may be split
    pub split_aces: bool,

    /// Split aces may draw more than one card
    pub hit_split_aces: bool,

    pub surrender_allowed: bool,

    /// Surrender only after the dealer checks for blackjack
    pub late_surrender: bool,

    pub blackjack_payout: PayoutRatio,

    pub insurance_payout: PayoutRatio,

    pub min_bet: u64,

    pub max_bet: u64,
}

impl Default for Rules {
    fn default() -> Self {
        // Standard Las Vegas rules
        Self {
            deck_count: 6,
            cut_card_ratio: 0.75,
            dealer_stands_on: 17,
            dealer_hits_soft_17: true,
            double_after_split: true,
            double_on_any_two: true,
            max_split_hands: 4,
            split_aces: true,
            hit_split_aces: false,
            surrender_allowed: true,
            late_surrender: true,
            blackjack_payout: PayoutRatio::THREE_TO_TWO,
            insurance_payout: PayoutRatio::TWO_TO_ONE,
            min_bet: 5,
            max_bet: 500,
        }
    }
}

/// Named rule sets a table can be opened with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RulesPreset {
    Vegas,
    AtlanticCity,
    European,
    /// Starting point for ad hoc edits
    Custom,
}

impl FromStr for RulesPreset {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "vegas" | "default" => Ok(RulesPreset::Vegas),
            "atlantic-city" | "atlantic_city" => Ok(RulesPreset::AtlanticCity),
            "european" => Ok(RulesPreset::European),
            "custom" => Ok(RulesPreset::Custom),
            other => Err(Error::UnknownPreset(other.to_string())),
        }
    }
}

impl RulesPreset {
    pub fn rules(&self) -> Rules {
        match self {
            RulesPreset::Vegas | RulesPreset::Custom => Rules::default(),
            RulesPreset::AtlanticCity => Rules::atlantic_city(),
            RulesPreset::European => Rules::european(),
        }
    }
}

pub fn default_rules() -> Rules {
    Rules::default()
}

pub fn preset_rules(name: &str) -> Result<Rules, Error> {
    Ok(name.parse::<RulesPreset>()?.rules())
}

/// A single out-of-range field reported by [`validate`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleViolation {
    pub field: &'static str,
    pub message: String,
}

impl RuleViolation {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for RuleViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl Rules {
    /// Atlantic City rules: eight decks, dealer stands on all 17s
    pub fn atlantic_city() -> Self {
        Self {
            deck_count: 8,
            dealer_hits_soft_17: false,
            ..Self::default()
        }
    }

    /// European rules: no surrender, no doubling after split
    pub fn european() -> Self {
        Self {
            surrender_allowed: false,
            late_surrender: false,
            double_after_split: false,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Vec<RuleViolation> {
        validate(self)
    }

    /// Apply a field-level edit, keeping the current rules if the edit
    /// leaves any field out of range.
    pub fn update(&self, edit: impl FnOnce(&mut Rules)) -> Result<Rules, Error> {
        let mut next = *self;
        edit(&mut next);
        let violations = validate(&next);
        if violations.is_empty() {
            Ok(next)
        } else {
            Err(Error::InvalidRules(violations))
        }
    }
}

pub fn validate(rules: &Rules) -> Vec<RuleViolation> {
    let mut violations = Vec::new();

    if !(1..=8).contains(&rules.deck_count) {
        violations.push(RuleViolation::new(
            "deck_count",
            format!("must be between 1 and 8, got {}", rules.deck_count),
        ));
    }
    if !(0.5..=0.9).contains(&rules.cut_card_ratio) {
        violations.push(RuleViolation::new(
            "cut_card_ratio",
            format!("must be between 0.5 and 0.9, got {}", rules.cut_card_ratio),
        ));
    }
    if !(17..=21).contains(&rules.dealer_stands_on) {
        violations.push(RuleViolation::new(
            "dealer_stands_on",
            format!("must be between 17 and 21, got {}", rules.dealer_stands_on),
        ));
    }
    if !(1..=4).contains(&rules.max_split_hands) {
        violations.push(RuleViolation::new(
            "max_split_hands",
            format!("must be between 1 and 4, got {}", rules.max_split_hands),
        ));
    }
    if !(1.0..=2.0).contains(&rules.blackjack_payout.as_f64()) {
        violations.push(RuleViolation::new(
            "blackjack_payout",
            format!("must be between 1.0 and 2.0, got {}", rules.blackjack_payout),
        ));
    }
    if !(1.0..=3.0).contains(&rules.insurance_payout.as_f64()) {
        violations.push(RuleViolation::new(
            "insurance_payout",
            format!("must be between 1.0 and 3.0, got {}", rules.insurance_payout),
        ));
    }
    if rules.min_bet < 1 {
        violations.push(RuleViolation::new("min_bet", "must be at least 1"));
    }
    if rules.min_bet > rules.max_bet {
        violations.push(RuleViolation::new(
            "min_bet",
            format!(
                "must not exceed max_bet ({} > {})",
                rules.min_bet, rules.max_bet
            ),
        ));
    }

    violations
}

pub fn can_double(hand: &Hand, rules: &Rules, is_after_split: bool) -> bool {
    if hand.cards.len() != 2 {
        return false;
    }
    if is_after_split && !rules.double_after_split {
        return false;
    }
    if rules.double_on_any_two {
        return true;
    }
    (9..=11).contains(&hand.value)
}

pub fn can_split_pair(hand: &Hand, rules: &Rules, current_split_count: u8) -> bool {
    if !hand.is_pair() {
        return false;
    }
    if current_split_count >= rules.max_split_hands {
        return false;
    }
    !(hand.cards[0].rank == Rank::Ace && !rules.split_aces)
}

/// First-action-only surrender is enforced by the caller.
pub fn can_surrender(rules: &Rules) -> bool {
    rules.surrender_allowed
}

/// Net result for the seat: positive winnings, zero on a push, minus the bet on a loss.
pub fn payout(outcome: HandOutcome, bet: u64, is_blackjack: bool, rules: &Rules) -> i64 {
    match outcome {
        HandOutcome::Win | HandOutcome::Blackjack => {
            if is_blackjack || outcome == HandOutcome::Blackjack {
                rules.blackjack_payout.calculate_payout(bet) as i64
            } else {
                bet as i64
            }
        }
        HandOutcome::Push => 0,
        HandOutcome::Lose => -(bet as i64),
    }
}

pub fn dealer_should_hit(hand: &Hand, rules: &Rules) -> bool {
    if hand.value < rules.dealer_stands_on {
        return true;
    }
    hand.value == rules.dealer_stands_on && rules.dealer_hits_soft_17 && hand.is_soft()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Card, Suit};

    fn hand(ranks: &[Rank]) -> Hand {
        let cards: Vec<Card> = ranks.iter().map(|&r| Card::new(r, Suit::Hearts)).collect();
        Hand::from_cards(&cards)
    }

    #[test]
    fn test_payout_ratio_three_to_two() {
        let ratio = PayoutRatio::THREE_TO_TWO;
        assert_eq!(ratio.calculate_payout(100), 150);
        assert_eq!(ratio.calculate_payout(10), 15);
        assert_eq!(ratio.calculate_payout(5), 7); // floored
    }

    #[test]
    fn test_payout_ratio_six_to_five() {
        let ratio = PayoutRatio::SIX_TO_FIVE;
        assert_eq!(ratio.calculate_payout(100), 120);
        assert_eq!(ratio.calculate_payout(50), 60);
    }

    #[test]
    fn test_payout_ratio_zero_denominator() {
        assert!(PayoutRatio::new(3, 0).is_err());
    }

    #[test]
    fn test_payout_ratio_parse() {
        assert_eq!("3:2".parse::<PayoutRatio>(), Ok(PayoutRatio::THREE_TO_TWO));
        assert!("3-2".parse::<PayoutRatio>().is_err());
        assert!("3:0".parse::<PayoutRatio>().is_err());
    }

    #[test]
    fn test_default_rules_are_valid() {
        let rules = default_rules();
        assert!(validate(&rules).is_empty());
        assert_eq!(rules.deck_count, 6);
        assert!(rules.dealer_hits_soft_17);
        assert_eq!(rules.blackjack_payout, PayoutRatio::THREE_TO_TWO);
        assert_eq!(rules.insurance_payout, PayoutRatio::TWO_TO_ONE);
        assert_eq!((rules.min_bet, rules.max_bet), (5, 500));
    }

    #[test]
    fn test_presets() {
        let ac = preset_rules("atlantic-city").unwrap();
        assert_eq!(ac.deck_count, 8);
        assert!(!ac.dealer_hits_soft_17);

        let eu = preset_rules("european").unwrap();
        assert!(!eu.surrender_allowed);
        assert!(!eu.double_after_split);

        assert_eq!(preset_rules("custom").unwrap(), Rules::default());
        assert_eq!(
            preset_rules("macau"),
            Err(Error::UnknownPreset("macau".to_string()))
        );
        for preset in ["vegas", "atlantic-city", "european", "custom"] {
            assert!(validate(&preset_rules(preset).unwrap()).is_empty());
        }
    }

    #[test]
    fn test_validate_reports_every_field() {
        let rules = Rules {
            deck_count: 9,
            cut_card_ratio: 0.95,
            dealer_stands_on: 30,
            max_split_hands: 0,
            blackjack_payout: PayoutRatio::new(5, 2).unwrap(),
            insurance_payout: PayoutRatio::new(1, 2).unwrap(),
            min_bet: 0,
            ..Rules::default()
        };
        let fields: Vec<&str> = validate(&rules).iter().map(|v| v.field).collect();
        assert_eq!(
            fields,
            vec![
                "deck_count",
                "cut_card_ratio",
                "dealer_stands_on",
                "max_split_hands",
                "blackjack_payout",
                "insurance_payout",
                "min_bet"
            ]
        );
    }

    #[test]
    fn test_validate_min_above_max() {
        let rules = Rules {
            min_bet: 600,
            ..Rules::default()
        };
        let violations = validate(&rules);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].field, "min_bet");
    }

    #[test]
    fn test_update_validates() {
        let rules = Rules::default();
        let edited = rules.update(|r| r.deck_count = 2).unwrap();
        assert_eq!(edited.deck_count, 2);

        let rejected = rules.update(|r| r.deck_count = 12);
        assert!(matches!(rejected, Err(Error::InvalidRules(v)) if v[0].field == "deck_count"));
    }

    #[test]
    fn test_can_double() {
        let rules = Rules::default();
        assert!(can_double(&hand(&[Rank::Two, Rank::Three]), &rules, false));
        assert!(!can_double(&hand(&[Rank::Two, Rank::Three, Rank::Four]), &rules, false));

        let restricted = Rules {
            double_on_any_two: false,
            ..Rules::default()
        };
        assert!(can_double(&hand(&[Rank::Five, Rank::Six]), &restricted, false));
        assert!(can_double(&hand(&[Rank::Four, Rank::Five]), &restricted, false));
        assert!(!can_double(&hand(&[Rank::Ten, Rank::Two]), &restricted, false));

        let no_das = Rules {
            double_after_split: false,
            ..Rules::default()
        };
        assert!(!can_double(&hand(&[Rank::Five, Rank::Six]), &no_das, true));
        assert!(can_double(&hand(&[Rank::Five, Rank::Six]), &no_das, false));
    }

    #[test]
    fn test_can_split_pair() {
        let rules = Rules::default();
        assert!(can_split_pair(&hand(&[Rank::Eight, Rank::Eight]), &rules, 0));
        assert!(!can_split_pair(&hand(&[Rank::King, Rank::Queen]), &rules, 0));
        assert!(!can_split_pair(&hand(&[Rank::Eight, Rank::Eight]), &rules, 4));
        assert!(!can_split_pair(
            &hand(&[Rank::Eight, Rank::Eight, Rank::Two]),
            &rules,
            0
        ));

        let no_aces = Rules {
            split_aces: false,
            ..Rules::default()
        };
        assert!(!can_split_pair(&hand(&[Rank::Ace, Rank::Ace]), &no_aces, 0));
        assert!(can_split_pair(&hand(&[Rank::Ace, Rank::Ace]), &rules, 0));
    }

    #[test]
    fn test_can_surrender() {
        assert!(can_surrender(&Rules::default()));
        assert!(!can_surrender(&Rules::european()));
    }

    #[test]
    fn test_payout_table() {
        let rules = Rules::default();
        assert_eq!(payout(HandOutcome::Win, 100, false, &rules), 100);
        assert_eq!(payout(HandOutcome::Win, 100, true, &rules), 150);
        assert_eq!(payout(HandOutcome::Blackjack, 15, true, &rules), 22);
        assert_eq!(payout(HandOutcome::Push, 100, false, &rules), 0);
        assert_eq!(payout(HandOutcome::Lose, 100, false, &rules), -100);
    }

    #[test]
    fn test_dealer_should_hit() {
        let h17 = Rules::default();
        let s17 = Rules::atlantic_city();
        let soft_17 = hand(&[Rank::Ace, Rank::Six]);
        let hard_17 = hand(&[Rank::Ten, Rank::Seven]);

        assert!(dealer_should_hit(&hand(&[Rank::Ten, Rank::Six]), &h17));
        assert!(dealer_should_hit(&soft_17, &h17));
        assert!(!dealer_should_hit(&soft_17, &s17));
        assert!(!dealer_should_hit(&hard_17, &h17));
        assert!(!dealer_should_hit(&hand(&[Rank::Ace, Rank::Seven]), &h17));
    }
}
