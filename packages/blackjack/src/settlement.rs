use crate::game_state::{HistoryEntry, ParticipantResult};
use crate::{rules, HandOutcome, Rules};
use serde::{Deserialize, Serialize};

/// Amount credited back to the seat's balance. The bet itself was debited
/// when it was accepted, so a win returns the stake plus even money.
pub fn settle_seat(outcome: HandOutcome, bet: u64, rules: &Rules) -> u64 {
    match outcome {
        HandOutcome::Lose => 0,
        HandOutcome::Push => bet,
        HandOutcome::Win | HandOutcome::Blackjack => {
            let winnings = rules::payout(outcome, bet, outcome == HandOutcome::Blackjack, rules);
            bet + winnings.max(0) as u64
        }
    }
}

/// Per-round totals handed to whatever presents the round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettlementSummary {
    pub round_number: u32,
    pub results: Vec<ParticipantResult>,
    pub dealer_value: u8,
    pub dealer_bust: bool,
    pub total_wagered: u64,
    pub total_paid: u64,
    /// Positive when the house came out ahead.
    pub house_net: i64,
}

impl SettlementSummary {
    pub fn from_history(entry: &HistoryEntry) -> Self {
        let total_wagered: u64 = entry.results.iter().map(|r| r.bet).sum();
        let total_paid: u64 = entry.results.iter().map(|r| r.payout).sum();
        Self {
            round_number: entry.round_number,
            results: entry.results.clone(),
            dealer_value: entry.dealer_hand.value,
            dealer_bust: entry.dealer_hand.is_bust,
            total_wagered,
            total_paid,
            house_net: total_wagered as i64 - total_paid as i64,
        }
    }

    pub fn result_for(&self, seat_id: &str) -> Option<&ParticipantResult> {
        self.results.iter().find(|r| r.seat_id == seat_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Card, Hand, Rank, Suit};

    #[test]
    fn test_settle_seat_credits() {
        let rules = Rules::default();
        assert_eq!(settle_seat(HandOutcome::Win, 100, &rules), 200);
        assert_eq!(settle_seat(HandOutcome::Blackjack, 100, &rules), 250);
        assert_eq!(settle_seat(HandOutcome::Push, 100, &rules), 100);
        assert_eq!(settle_seat(HandOutcome::Lose, 100, &rules), 0);
    }

    #[test]
    fn test_settle_seat_six_to_five() {
        let rules = Rules {
            blackjack_payout: crate::PayoutRatio::SIX_TO_FIVE,
            ..Rules::default()
        };
        assert_eq!(settle_seat(HandOutcome::Blackjack, 25, &rules), 55);
    }

    #[test]
    fn test_balance_conservation() {
        let rules = Rules::default();
        let start = 1000u64;
        let bet = 100u64;
        let net = |outcome| (start - bet + settle_seat(outcome, bet, &rules)) as i64 - start as i64;

        assert_eq!(net(HandOutcome::Win), 100);
        assert_eq!(net(HandOutcome::Blackjack), 150);
        assert_eq!(net(HandOutcome::Push), 0);
        assert_eq!(net(HandOutcome::Lose), -100);
    }

    #[test]
    fn test_summary_from_history() {
        let dealer = Hand::from_cards(&[
            Card::new(Rank::Ten, Suit::Spades),
            Card::new(Rank::Nine, Suit::Clubs),
        ]);
        let seat_hand = Hand::from_cards(&[
            Card::new(Rank::Ten, Suit::Hearts),
            Card::new(Rank::King, Suit::Hearts),
        ]);
        let entry = HistoryEntry {
            round_number: 3,
            results: vec![
                ParticipantResult {
                    seat_id: "a".to_string(),
                    final_hand: seat_hand.clone(),
                    bet: 50,
                    payout: 100,
                    net: 50,
                    outcome: HandOutcome::Win,
                },
                ParticipantResult {
                    seat_id: "b".to_string(),
                    final_hand: seat_hand,
                    bet: 30,
                    payout: 0,
                    net: -30,
                    outcome: HandOutcome::Lose,
                },
            ],
            dealer_hand: dealer,
            timestamp: 0,
        };

        let summary = SettlementSummary::from_history(&entry);
        assert_eq!(summary.round_number, 3);
        assert_eq!(summary.dealer_value, 19);
        assert!(!summary.dealer_bust);
        assert_eq!(summary.total_wagered, 80);
        assert_eq!(summary.total_paid, 100);
        assert_eq!(summary.house_net, -20);
        assert_eq!(summary.result_for("b").unwrap().outcome, HandOutcome::Lose);
    }
}
