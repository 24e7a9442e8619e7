//! Output channel for presentation layers. The engine never reads events back.

use crate::settlement::SettlementSummary;
use crate::{Card, PlayerAction};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::panic::{self, AssertUnwindSafe};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recipient {
    Seat(String),
    Dealer,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEvent {
    RoundStarted {
        round_number: u32,
    },
    BetPlaced {
        seat_id: String,
        amount: u64,
    },
    /// `card` is `None` for the dealer's hole card.
    CardDealt {
        recipient: Recipient,
        card: Option<Card>,
    },
    PlayerActed {
        seat_id: String,
        action: PlayerAction,
    },
    PlayerBusted {
        seat_id: String,
        value: u8,
    },
    DealerTurnStarted {
        hole_card: Option<Card>,
    },
    SettlementCompleted {
        summary: SettlementSummary,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

pub type Listener = Box<dyn Fn(&GameEvent) + Send + Sync>;

/// Synchronous fan-out. A panicking listener is logged and skipped; the
/// remaining listeners still receive the event.
#[derive(Default)]
pub struct EventBus {
    listeners: Vec<(ListenerId, Listener)>,
    next_id: u64,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&mut self, listener: F) -> ListenerId
    where
        F: Fn(&GameEvent) + Send + Sync + 'static,
    {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(lid, _)| *lid != id);
        self.listeners.len() != before
    }

    pub fn publish(&self, event: &GameEvent) {
        for (id, listener) in &self.listeners {
            if panic::catch_unwind(AssertUnwindSafe(|| listener(event))).is_err() {
                log::warn!("Event listener {:?} panicked while handling {event:?}", id);
            }
        }
    }

    pub fn publish_all(&self, events: impl IntoIterator<Item = GameEvent>) {
        for event in events {
            self.publish(&event);
        }
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
