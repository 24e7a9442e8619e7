use crate::{Card, Error, Rank, Suit};
use rand::seq::SliceRandom;
use rand::Rng;

/// `52 * deck_count` cards in a fixed order: sub-deck, then suit, then rank.
pub fn build_deck(deck_count: u8) -> Vec<Card> {
    let mut deck = Vec::with_capacity(52 * deck_count as usize);
    for _ in 0..deck_count {
        for suit in Suit::ALL {
            for rank in Rank::ALL {
                deck.push(Card::new(rank, suit));
            }
        }
    }
    deck
}

/// Returns a shuffled copy; the input is left untouched.
pub fn shuffle<R: Rng + ?Sized>(deck: &[Card], rng: &mut R) -> Vec<Card> {
    let mut shuffled = deck.to_vec();
    shuffled.shuffle(rng);
    shuffled
}

pub fn fresh_shoe<R: Rng + ?Sized>(deck_count: u8, rng: &mut R) -> Vec<Card> {
    shuffle(&build_deck(deck_count), rng)
}

/// Take the top card. The top of the deck is the end of the vector.
pub fn draw(deck: &mut Vec<Card>) -> Result<Card, Error> {
    deck.pop().ok_or(Error::EmptyDeck)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand_chacha::{rand_core::SeedableRng, ChaCha8Rng};
    use std::collections::HashSet;

    #[test]
    fn test_build_single_deck() {
        let deck = build_deck(1);
        assert_eq!(deck.len(), 52);
        let unique: HashSet<(Suit, Rank)> = deck.iter().map(|c| (c.suit, c.rank)).collect();
        assert_eq!(unique.len(), 52);
        assert!(deck.iter().all(|c| c.face_up));
    }

    #[test]
    fn test_build_six_decks() {
        let deck = build_deck(6);
        assert_eq!(deck.len(), 312);
        let aces_of_spades = deck
            .iter()
            .filter(|c| c.rank == Rank::Ace && c.suit == Suit::Spades)
            .count();
        assert_eq!(aces_of_spades, 6);
    }

    #[test]
    fn test_build_deck_is_deterministic() {
        assert_eq!(build_deck(2), build_deck(2));
        assert_eq!(build_deck(1)[0], Card::new(Rank::Ace, Suit::Hearts));
    }

    #[test]
    fn test_shuffle_is_permutation_and_pure() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let deck = build_deck(1);
        let original = deck.clone();
        let shuffled = shuffle(&deck, &mut rng);

        assert_eq!(deck, original);
        assert_eq!(shuffled.len(), deck.len());
        assert_ne!(shuffled, deck);

        let mut a = deck.clone();
        let mut b = shuffled.clone();
        a.sort_by_key(|c| (c.suit as u8, c.rank as u8));
        b.sort_by_key(|c| (c.suit as u8, c.rank as u8));
        assert_eq!(a, b);
    }

    #[test]
    fn test_draw_takes_top() {
        let mut deck = vec![
            Card::new(Rank::Two, Suit::Clubs),
            Card::new(Rank::King, Suit::Hearts),
        ];
        assert_eq!(draw(&mut deck).unwrap(), Card::new(Rank::King, Suit::Hearts));
        assert_eq!(deck.len(), 1);
    }

    #[test]
    fn test_draw_empty_deck() {
        let mut deck = Vec::new();
        assert_eq!(draw(&mut deck), Err(Error::EmptyDeck));
    }
}
