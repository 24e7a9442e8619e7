mod card;
mod error;
pub mod brain;
pub mod deck;
pub mod events;
pub mod game_state;
pub mod hand;
pub mod rules;
pub mod settlement;
pub mod table;

pub use brain::{
    create_cpu_brain, create_seeded_cpu_brain, is_valid_decision, validate_decision_context, BetContext, Brain,
    BrainType, Decision, DecisionContext, HumanBrain, HumanInput, Prompt,
};
pub use card::{rank_value, Card, Rank, Suit};
pub use error::Error;
pub use events::{EventBus, GameEvent, ListenerId, Recipient};
pub use game_state::{
    determine_winner, transition_to_next_phase, Dealer, GamePhase, GameState, HistoryEntry, ParticipantResult,
    PlayerAction, Seat, SeatStatus, DEALER_ID,
};
pub use hand::{Hand, HandOutcome};
pub use rules::{default_rules, preset_rules, PayoutRatio, RuleViolation, Rules, RulesPreset};
pub use settlement::SettlementSummary;
pub use table::Table;
