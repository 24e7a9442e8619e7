use crate::Card;
use serde::{Deserialize, Serialize};

pub use crate::card::rank_value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HandOutcome {
    Win,
    Lose,
    Push,
    Blackjack,
}

/// Calculate the value of a blackjack hand
pub fn hand_value(cards: &[Card]) -> u8 {
    let mut total: u16 = 0;
    let mut aces = 0;

    for card in cards {
        if card.is_ace() {
            aces += 1;
        }
        total += card.value() as u16;
    }

    // Demote one ace at a time, never more than needed
    while total > 21 && aces > 0 {
        total -= 10;
        aces -= 1;
    }

    total.min(u8::MAX as u16) as u8
}

/// The all-aces-low total, if the hand holds an ace and that total does not bust.
pub fn soft_value(cards: &[Card]) -> Option<u8> {
    if !cards.iter().any(Card::is_ace) {
        return None;
    }
    let low: u16 = cards
        .iter()
        .map(|c| if c.is_ace() { 1 } else { c.value() as u16 })
        .sum();
    (low <= 21).then_some(low as u8)
}

/// Check if a hand is busted
pub fn is_bust(cards: &[Card]) -> bool {
    hand_value(cards) > 21
}

/// Two-card 21 made of an ace and a ten-valued card
pub fn is_blackjack(cards: &[Card]) -> bool {
    cards.len() == 2
        && hand_value(cards) == 21
        && cards.iter().any(Card::is_ace)
        && cards.iter().any(|c| c.rank.is_ten_valued())
}

/// Like `hand_value` but blind to face-down cards.
pub fn visible_value(cards: &[Card]) -> u8 {
    let visible: Vec<Card> = cards.iter().copied().filter(|c| c.face_up).collect();
    hand_value(&visible)
}

pub fn build_hand(cards: &[Card]) -> Hand {
    Hand {
        cards: cards.to_vec(),
        value: hand_value(cards),
        soft_value: soft_value(cards),
        is_bust: is_bust(cards),
        is_blackjack: is_blackjack(cards),
    }
}

/// Snapshot of a hand. Every derived field is recomputed from `cards`
/// whenever a card is added, so a new `Hand` replaces the old one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hand {
    pub cards: Vec<Card>,
    pub value: u8,
    pub soft_value: Option<u8>,
    pub is_bust: bool,
    pub is_blackjack: bool,
}

impl Hand {
    pub fn new() -> Self {
        build_hand(&[])
    }

    pub fn from_cards(cards: &[Card]) -> Self {
        build_hand(cards)
    }

    pub fn with_card(&self, card: Card) -> Self {
        let mut cards = self.cards.clone();
        cards.push(card);
        build_hand(&cards)
    }

    /// True while an ace is still being counted as 11.
    pub fn is_soft(&self) -> bool {
        matches!(self.soft_value, Some(low) if low + 10 == self.value)
    }

    /// Two cards of the same rank.
    pub fn is_pair(&self) -> bool {
        self.cards.len() == 2 && self.cards[0].rank == self.cards[1].rank
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn visible_value(&self) -> u8 {
        visible_value(&self.cards)
    }
}

impl Default for Hand {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Rank, Suit};

    fn cards(ranks: &[Rank]) -> Vec<Card> {
        ranks.iter().map(|&r| Card::new(r, Suit::Spades)).collect()
    }

    #[test]
    fn test_hand_value_simple() {
        assert_eq!(hand_value(&cards(&[Rank::Two, Rank::Three])), 5);
    }

    #[test]
    fn test_hand_value_with_face_cards() {
        assert_eq!(hand_value(&cards(&[Rank::King, Rank::Queen])), 20);
    }

    #[test]
    fn test_hand_value_empty() {
        assert_eq!(hand_value(&[]), 0);
        let hand = Hand::new();
        assert_eq!(hand.value, 0);
        assert_eq!(hand.soft_value, None);
        assert!(!hand.is_bust);
        assert!(!hand.is_blackjack);
    }

    #[test]
    fn test_hand_value_soft_ace() {
        assert_eq!(hand_value(&cards(&[Rank::Ace, Rank::Six])), 17);
    }

    #[test]
    fn test_hand_value_hard_ace() {
        assert_eq!(hand_value(&cards(&[Rank::Ace, Rank::Six, Rank::Nine])), 16);
    }

    #[test]
    fn test_hand_value_demotes_only_needed_aces() {
        // One ace stays high, one drops low
        assert_eq!(hand_value(&cards(&[Rank::Ace, Rank::Ace, Rank::Nine])), 21);
        assert_eq!(hand_value(&cards(&[Rank::Ace, Rank::Ace])), 12);
        assert_eq!(
            hand_value(&cards(&[Rank::Ace, Rank::Ace, Rank::Ace, Rank::Ace])),
            14
        );
    }

    #[test]
    fn test_hand_value_all_aces_low_still_bust() {
        let hand = cards(&[Rank::Ace, Rank::King, Rank::Queen, Rank::Five]);
        assert_eq!(hand_value(&hand), 26);
        assert!(is_bust(&hand));
        assert_eq!(soft_value(&hand), None);
    }

    #[test]
    fn test_soft_value() {
        assert_eq!(soft_value(&cards(&[Rank::Ace, Rank::Six])), Some(7));
        assert_eq!(soft_value(&cards(&[Rank::Ace, Rank::Six, Rank::Nine])), Some(16));
        assert_eq!(soft_value(&cards(&[Rank::King, Rank::Six])), None);
    }

    #[test]
    fn test_is_soft() {
        assert!(Hand::from_cards(&cards(&[Rank::Ace, Rank::Six])).is_soft());
        assert!(!Hand::from_cards(&cards(&[Rank::Ace, Rank::Six, Rank::Nine])).is_soft());
        assert!(!Hand::from_cards(&cards(&[Rank::Ten, Rank::Six])).is_soft());
    }

    #[test]
    fn test_is_blackjack() {
        assert!(is_blackjack(&cards(&[Rank::Ace, Rank::King])));
        assert!(is_blackjack(&cards(&[Rank::Ten, Rank::Ace])));
    }

    #[test]
    fn test_not_blackjack_three_cards() {
        assert!(!is_blackjack(&cards(&[Rank::Seven, Rank::Seven, Rank::Seven])));
        assert!(!is_blackjack(&cards(&[Rank::Ace, Rank::Five, Rank::Five])));
    }

    #[test]
    fn test_not_blackjack_wrong_value() {
        assert!(!is_blackjack(&cards(&[Rank::King, Rank::Queen])));
    }

    #[test]
    fn test_visible_value_ignores_hole_card() {
        let dealer = vec![
            Card::new(Rank::Six, Suit::Hearts),
            Card::new(Rank::King, Suit::Clubs).face_down(),
        ];
        assert_eq!(visible_value(&dealer), 6);
        assert_eq!(hand_value(&dealer), 16);
    }

    #[test]
    fn test_with_card_rebuilds() {
        let hand = Hand::from_cards(&cards(&[Rank::King, Rank::Six]));
        let next = hand.with_card(Card::new(Rank::Nine, Suit::Clubs));
        assert_eq!(hand.value, 16);
        assert_eq!(next.value, 25);
        assert!(next.is_bust);
        assert_eq!(next.len(), 3);
    }

    #[test]
    fn test_build_hand_idempotent() {
        let samples = [
            cards(&[Rank::Ace, Rank::King]),
            cards(&[Rank::Ace, Rank::Ace, Rank::Nine]),
            cards(&[Rank::Seven, Rank::Seven, Rank::Seven]),
            cards(&[Rank::King, Rank::Queen, Rank::Two]),
        ];
        for sample in samples {
            let hand = build_hand(&sample);
            assert_eq!(build_hand(&hand.cards), hand);
        }
    }

    #[test]
    fn test_is_pair() {
        assert!(Hand::from_cards(&cards(&[Rank::Eight, Rank::Eight])).is_pair());
        assert!(!Hand::from_cards(&cards(&[Rank::King, Rank::Queen])).is_pair());
    }
}
