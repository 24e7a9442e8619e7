use crate::brain::{BetContext, BrainType, DecisionContext};
use crate::deck;
use crate::events::{GameEvent, Recipient};
use crate::settlement::{settle_seat, SettlementSummary};
use crate::{rules, Card, Error, Hand, HandOutcome, Rules};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

pub const DEALER_ID: &str = "dealer";

/// Phases of a round. Every phase has exactly one successor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GamePhase {
    Waiting,
    Betting,
    Dealing,
    Playing,
    DealerTurn,
    Settlement,
}

impl GamePhase {
    pub const ALL: [GamePhase; 6] = [
        GamePhase::Waiting,
        GamePhase::Betting,
        GamePhase::Dealing,
        GamePhase::Playing,
        GamePhase::DealerTurn,
        GamePhase::Settlement,
    ];

    pub fn next(self) -> Self {
        match self {
            GamePhase::Waiting => GamePhase::Betting,
            GamePhase::Betting => GamePhase::Dealing,
            GamePhase::Dealing => GamePhase::Playing,
            GamePhase::Playing => GamePhase::DealerTurn,
            GamePhase::DealerTurn => GamePhase::Settlement,
            GamePhase::Settlement => GamePhase::Waiting,
        }
    }
}

pub fn transition_to_next_phase(phase: GamePhase) -> GamePhase {
    phase.next()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayerAction {
    Hit,
    Stand,
    Double,
    Split,
    Surrender,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeatStatus {
    /// Sitting out: no bet and no hand this round
    Waiting,
    Active,
    Stand,
    Bust,
    Blackjack,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Seat {
    pub id: String,
    pub name: String,
    pub status: SeatStatus,
    pub hand: Option<Hand>,
    pub bet: Option<u64>,
    pub balance: u64,
    pub brain: BrainType,
}

impl Seat {
    pub fn new(id: impl Into<String>, name: impl Into<String>, balance: u64, brain: BrainType) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            status: SeatStatus::Waiting,
            hand: None,
            bet: None,
            balance,
            brain,
        }
    }

    /// Still owes the table a decision this round.
    pub fn is_in_turn(&self) -> bool {
        self.status == SeatStatus::Active && self.bet.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dealer {
    pub id: String,
    pub hand: Hand,
    pub is_showing_hole_card: bool,
}

impl Dealer {
    pub fn new() -> Self {
        Self {
            id: DEALER_ID.to_string(),
            hand: Hand::new(),
            is_showing_hole_card: false,
        }
    }

    pub fn up_card(&self) -> Option<&Card> {
        self.hand.cards.first()
    }
}

impl Default for Dealer {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantResult {
    pub seat_id: String,
    pub final_hand: Hand,
    pub bet: u64,
    /// Credited back to the balance at settlement
    pub payout: u64,
    pub net: i64,
    pub outcome: HandOutcome,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub round_number: u32,
    pub results: Vec<ParticipantResult>,
    pub dealer_hand: Hand,
    pub timestamp: u64,
}

pub fn determine_winner(seat_hand: &Hand, dealer_hand: &Hand) -> HandOutcome {
    if seat_hand.is_bust {
        return HandOutcome::Lose;
    }
    if dealer_hand.is_bust {
        return HandOutcome::Win;
    }
    if seat_hand.is_blackjack && !dealer_hand.is_blackjack {
        return HandOutcome::Blackjack;
    }
    match seat_hand.value.cmp(&dealer_hand.value) {
        std::cmp::Ordering::Equal => HandOutcome::Push,
        std::cmp::Ordering::Greater => HandOutcome::Win,
        std::cmp::Ordering::Less => HandOutcome::Lose,
    }
}

/// Authoritative state of one table. Callers serialize access; every
/// phase-advancing method takes `&mut self`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    pub phase: GamePhase,
    pub seats: Vec<Seat>,
    pub dealer: Dealer,
    /// Top of the deck is the last element
    pub deck: Vec<Card>,
    pub current_turn_index: Option<usize>,
    pub round_number: u32,
    pub history: Vec<HistoryEntry>,
    rules: Rules,
    #[serde(skip)]
    events: Vec<GameEvent>,
}

impl GameState {
    pub fn new(seats: Vec<Seat>, rules: Rules) -> Result<Self, Error> {
        if seats.is_empty() {
            return Err(Error::NoSeats);
        }
        let mut ids = HashSet::new();
        for seat in &seats {
            if !ids.insert(seat.id.as_str()) {
                return Err(Error::DuplicateSeat(seat.id.clone()));
            }
        }
        let violations = rules::validate(&rules);
        if !violations.is_empty() {
            return Err(Error::InvalidRules(violations));
        }

        Ok(Self {
            phase: GamePhase::Waiting,
            seats,
            dealer: Dealer::new(),
            deck: deck::build_deck(rules.deck_count),
            current_turn_index: None,
            round_number: 0,
            history: Vec::new(),
            rules,
            events: Vec::new(),
        })
    }

    pub fn rules(&self) -> &Rules {
        &self.rules
    }

    /// Swap the whole rule set. Only allowed between rounds, and rejected
    /// without any change if the new rules do not validate.
    pub fn set_rules(&mut self, rules: Rules) -> Result<(), Error> {
        if self.phase != GamePhase::Waiting {
            return Err(Error::RoundInProgress(self.phase));
        }
        let violations = rules::validate(&rules);
        if !violations.is_empty() {
            return Err(Error::InvalidRules(violations));
        }
        log::info!("Rules replaced ({} decks)", rules.deck_count);
        self.deck = deck::build_deck(rules.deck_count);
        self.rules = rules;
        Ok(())
    }

    pub fn seat(&self, seat_id: &str) -> Option<&Seat> {
        self.seats.iter().find(|s| s.id == seat_id)
    }

    pub fn current_seat(&self) -> Option<&Seat> {
        self.current_turn_index.and_then(|i| self.seats.get(i))
    }

    /// Events recorded since the last drain, oldest first.
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn start_new_round(&mut self) {
        self.start_new_round_with(&mut rand::thread_rng());
    }

    pub fn start_new_round_with<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        for seat in &mut self.seats {
            seat.hand = None;
            seat.bet = None;
            seat.status = SeatStatus::Active;
        }
        self.dealer = Dealer::new();
        self.deck = deck::fresh_shoe(self.rules.deck_count, rng);
        self.round_number += 1;
        self.phase = GamePhase::Betting;
        self.current_turn_index = None;

        log::info!("Round {} started", self.round_number);
        self.events.push(GameEvent::RoundStarted {
            round_number: self.round_number,
        });
    }

    /// Seats with no entry, a zero entry, or an entry above their balance sit
    /// the round out. Always moves on to dealing.
    pub fn process_bets(&mut self, bets: &HashMap<String, u64>) {
        for seat in &mut self.seats {
            match bets.get(&seat.id) {
                Some(&amount) if amount > 0 && amount <= seat.balance => {
                    seat.balance -= amount;
                    seat.bet = Some(amount);
                    log::debug!("Seat {} bets {amount}", seat.id);
                    self.events.push(GameEvent::BetPlaced {
                        seat_id: seat.id.clone(),
                        amount,
                    });
                }
                other => {
                    if let Some(amount) = other {
                        log::debug!(
                            "Seat {} bet of {amount} ignored (balance {})",
                            seat.id,
                            seat.balance
                        );
                    }
                    seat.bet = None;
                    seat.status = SeatStatus::Waiting;
                }
            }
        }
        self.phase = GamePhase::Dealing;
    }

    /// Seat, dealer up-card, seat, dealer hole card. A draw failure leaves the
    /// round half-dealt and is fatal to it.
    pub fn deal_initial_cards(&mut self) -> Result<(), Error> {
        let bettors: Vec<usize> = (0..self.seats.len())
            .filter(|&i| self.seats[i].bet.is_some())
            .collect();

        for pass in 0..2 {
            for &i in &bettors {
                let card = deck::draw(&mut self.deck)?;
                self.give_card(i, card);
            }
            let mut card = deck::draw(&mut self.deck)?;
            if pass == 1 {
                card = card.face_down();
            }
            self.dealer.hand = self.dealer.hand.with_card(card);
            self.events.push(GameEvent::CardDealt {
                recipient: Recipient::Dealer,
                card: card.face_up.then_some(card),
            });
        }

        for &i in &bettors {
            let seat = &mut self.seats[i];
            if seat.hand.as_ref().is_some_and(|h| h.is_blackjack) {
                seat.status = SeatStatus::Blackjack;
                log::debug!("Seat {} has blackjack", seat.id);
            }
        }

        self.phase = GamePhase::Playing;
        self.current_turn_index = self.next_turn_from(0);
        Ok(())
    }

    /// Ignored outside the playing phase, as are unknown seats and seats
    /// without a hand. Double, split and surrender have no execution path in
    /// the round loop and change nothing.
    pub fn process_player_action(&mut self, seat_id: &str, action: PlayerAction) -> Result<(), Error> {
        if self.phase != GamePhase::Playing {
            return Ok(());
        }
        let Some(index) = self
            .seats
            .iter()
            .position(|s| s.id == seat_id && s.hand.is_some())
        else {
            return Ok(());
        };

        match action {
            PlayerAction::Hit => {
                let card = deck::draw(&mut self.deck)?;
                self.events.push(GameEvent::PlayerActed {
                    seat_id: seat_id.to_string(),
                    action,
                });
                self.give_card(index, card);
                let seat = &mut self.seats[index];
                if let Some(hand) = seat.hand.as_ref().filter(|h| h.is_bust) {
                    seat.status = SeatStatus::Bust;
                    log::debug!("Seat {} busts with {}", seat.id, hand.value);
                    self.events.push(GameEvent::PlayerBusted {
                        seat_id: seat.id.clone(),
                        value: hand.value,
                    });
                }
            }
            PlayerAction::Stand => {
                self.seats[index].status = SeatStatus::Stand;
                self.events.push(GameEvent::PlayerActed {
                    seat_id: seat_id.to_string(),
                    action,
                });
            }
            PlayerAction::Double | PlayerAction::Split | PlayerAction::Surrender => {
                log::debug!("Seat {seat_id}: {action:?} is not supported by the round loop");
            }
        }

        self.current_turn_index = self.next_turn_from(index);
        if self.current_turn_index.is_none() {
            self.phase = GamePhase::DealerTurn;
        }
        Ok(())
    }

    /// Draws per [`rules::dealer_should_hit`]; use [`Rules::atlantic_city`]
    /// for a dealer that stands on every 17.
    pub fn process_dealer_turn(&mut self) -> Result<(), Error> {
        self.dealer.is_showing_hole_card = true;
        let revealed: Vec<Card> = self.dealer.hand.cards.iter().map(|c| c.revealed()).collect();
        self.dealer.hand = Hand::from_cards(&revealed);
        self.events.push(GameEvent::DealerTurnStarted {
            hole_card: revealed.get(1).copied(),
        });

        while rules::dealer_should_hit(&self.dealer.hand, &self.rules) {
            let card = deck::draw(&mut self.deck)?;
            self.dealer.hand = self.dealer.hand.with_card(card);
            self.events.push(GameEvent::CardDealt {
                recipient: Recipient::Dealer,
                card: Some(card),
            });
        }
        log::debug!("Dealer finishes on {}", self.dealer.hand.value);

        self.phase = GamePhase::Settlement;
        self.current_turn_index = None;
        Ok(())
    }

    /// Pays every seat that played, records the round and returns to waiting.
    pub fn settle_round(&mut self, timestamp: u64) -> SettlementSummary {
        let dealer_hand = self.dealer.hand.clone();
        let mut results = Vec::new();

        for seat in &mut self.seats {
            let (Some(hand), Some(bet)) = (seat.hand.as_ref(), seat.bet) else {
                continue;
            };
            let outcome = determine_winner(hand, &dealer_hand);
            let payout = settle_seat(outcome, bet, &self.rules);
            seat.balance += payout;
            results.push(ParticipantResult {
                seat_id: seat.id.clone(),
                final_hand: hand.clone(),
                bet,
                payout,
                net: payout as i64 - bet as i64,
                outcome,
            });
        }

        let entry = HistoryEntry {
            round_number: self.round_number,
            results,
            dealer_hand,
            timestamp,
        };
        let summary = SettlementSummary::from_history(&entry);
        self.history.push(entry);

        log::info!(
            "Round {} settled: wagered {}, paid {}",
            summary.round_number,
            summary.total_wagered,
            summary.total_paid
        );
        self.events.push(GameEvent::SettlementCompleted {
            summary: summary.clone(),
        });
        self.phase = GamePhase::Waiting;
        self.current_turn_index = None;
        summary
    }

    pub fn validate_action(&self, seat_id: &str, action: PlayerAction) -> bool {
        if self.phase != GamePhase::Playing {
            return false;
        }
        let Some(seat) = self.current_seat() else {
            return false;
        };
        if seat.id != seat_id || seat.status != SeatStatus::Active {
            return false;
        }
        let Some(hand) = seat.hand.as_ref() else {
            return false;
        };
        match action {
            PlayerAction::Hit => !hand.is_bust,
            PlayerAction::Stand => true,
            PlayerAction::Double | PlayerAction::Split | PlayerAction::Surrender => false,
        }
    }

    /// Context for the seat's next decision. Optional plays are offered only
    /// when the round loop can actually execute them.
    pub fn decision_context(&self, seat_id: &str) -> Option<DecisionContext> {
        let hand = self.seat(seat_id)?.hand.clone()?;
        let dealer_up_card = *self.dealer.up_card()?;
        Some(DecisionContext {
            hand,
            dealer_up_card,
            can_double: self.validate_action(seat_id, PlayerAction::Double),
            can_split: self.validate_action(seat_id, PlayerAction::Split),
            can_surrender: self.validate_action(seat_id, PlayerAction::Surrender),
            can_insurance: false,
        })
    }

    pub fn bet_context(&self, seat_id: &str) -> Option<BetContext> {
        let seat = self.seat(seat_id)?;
        Some(BetContext {
            balance: seat.balance,
            min_bet: self.rules.min_bet,
            max_bet: self.rules.max_bet,
        })
    }

    fn give_card(&mut self, index: usize, card: Card) {
        let seat = &mut self.seats[index];
        let hand = match seat.hand.as_ref() {
            Some(hand) => hand.with_card(card),
            None => Hand::from_cards(&[card]),
        };
        seat.hand = Some(hand);
        self.events.push(GameEvent::CardDealt {
            recipient: Recipient::Seat(seat.id.clone()),
            card: Some(card),
        });
    }

    fn next_turn_from(&self, start: usize) -> Option<usize> {
        (start..self.seats.len()).find(|&i| self.seats[i].is_in_turn())
    }
}
