//! Round driver tying the state machine to the brains sitting at it.

use crate::brain::{is_valid_decision, validate_decision_context, Brain, Decision};
use crate::events::{EventBus, GameEvent, ListenerId};
use crate::game_state::{GamePhase, GameState, Seat};
use crate::settlement::SettlementSummary;
use crate::{Error, Rules};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};

pub struct Table {
    state: GameState,
    brains: HashMap<String, Box<dyn Brain>>,
    bus: EventBus,
    rng: StdRng,
}

impl Table {
    pub fn new(rules: Rules, seats: Vec<(Seat, Box<dyn Brain>)>) -> Result<Self, Error> {
        Self::with_rng(rules, seats, StdRng::from_entropy())
    }

    /// Same shuffles for the same seed, so whole sessions can be replayed.
    pub fn with_seed(rules: Rules, seats: Vec<(Seat, Box<dyn Brain>)>, seed: u64) -> Result<Self, Error> {
        Self::with_rng(rules, seats, StdRng::seed_from_u64(seed))
    }

    fn with_rng(rules: Rules, seats: Vec<(Seat, Box<dyn Brain>)>, rng: StdRng) -> Result<Self, Error> {
        let mut brains = HashMap::new();
        let mut table_seats = Vec::with_capacity(seats.len());
        for (mut seat, brain) in seats {
            seat.brain = brain.brain_type();
            brains.insert(seat.id.clone(), brain);
            table_seats.push(seat);
        }

        Ok(Self {
            state: GameState::new(table_seats, rules)?,
            brains,
            bus: EventBus::new(),
            rng,
        })
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// See [`GameState::set_rules`].
    pub fn set_rules(&mut self, rules: Rules) -> Result<(), Error> {
        self.state.set_rules(rules)
    }

    pub fn events_mut(&mut self) -> &mut EventBus {
        &mut self.bus
    }

    pub fn subscribe<F>(&mut self, listener: F) -> ListenerId
    where
        F: Fn(&GameEvent) + Send + Sync + 'static,
    {
        self.bus.subscribe(listener)
    }

    /// Plays one full round, from betting to settlement.
    ///
    /// A cancelled bet sits the seat out and a cancelled decision stands.
    /// Any other brain error, or a decision the table cannot execute, aborts
    /// the round and leaves the state where it stopped.
    pub async fn play_round(&mut self) -> Result<SettlementSummary, Error> {
        self.state.start_new_round_with(&mut self.rng);
        self.flush_events();

        let bets = self.collect_bets().await?;
        self.state.process_bets(&bets);
        self.flush_events();

        self.state.deal_initial_cards()?;
        self.flush_events();

        self.play_turns().await?;

        self.state.process_dealer_turn()?;
        self.flush_events();

        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();
        let summary = self.state.settle_round(timestamp);
        self.flush_events();
        Ok(summary)
    }

    async fn collect_bets(&mut self) -> Result<HashMap<String, u64>, Error> {
        let mut bets = HashMap::new();
        for seat in &self.state.seats {
            let Some(context) = self.state.bet_context(&seat.id) else {
                continue;
            };
            let Some(brain) = self.brains.get_mut(&seat.id) else {
                continue;
            };
            match brain.decide_bet(&context).await {
                Ok(amount) => {
                    let clamped = context.clamp(amount);
                    if clamped != amount {
                        log::debug!("Seat {} bet {amount} clamped to {clamped}", seat.id);
                    }
                    bets.insert(seat.id.clone(), clamped);
                }
                Err(Error::BetCancelled) => {
                    log::info!("Seat {} sits this round out", seat.id);
                }
                Err(e) => return Err(e),
            }
        }
        Ok(bets)
    }

    async fn play_turns(&mut self) -> Result<(), Error> {
        while self.state.phase == GamePhase::Playing {
            let Some(seat_id) = self.state.current_seat().map(|s| s.id.clone()) else {
                break;
            };
            let context = self
                .state
                .decision_context(&seat_id)
                .ok_or_else(|| Error::InvalidContext(format!("seat {seat_id} has no hand to play")))?;
            validate_decision_context(&context)?;

            let brain = self
                .brains
                .get_mut(&seat_id)
                .ok_or_else(|| Error::InvalidContext(format!("seat {seat_id} has no brain")))?;
            let decision = match brain.make_decision(&context).await {
                Ok(decision) => decision,
                Err(Error::DecisionCancelled) => {
                    log::info!("Seat {seat_id} decision cancelled, standing");
                    Decision::Stand
                }
                Err(e) => return Err(e),
            };

            let action = decision
                .to_action()
                .filter(|&action| {
                    is_valid_decision(decision, &context) && self.state.validate_action(&seat_id, action)
                })
                .ok_or_else(|| Error::IllegalDecision {
                    seat_id: seat_id.clone(),
                    decision,
                })?;

            log::debug!("Seat {seat_id} plays {decision:?} on {}", context.hand.value);
            self.state.process_player_action(&seat_id, action)?;
            self.flush_events();
        }
        Ok(())
    }

    fn flush_events(&mut self) {
        let events = self.state.drain_events();
        self.bus.publish_all(events);
    }
}
