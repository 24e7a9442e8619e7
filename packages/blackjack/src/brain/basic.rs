use super::{is_valid_decision, BetContext, Brain, BrainType, Decision, DecisionContext};
use crate::{Card, Error};
use async_trait::async_trait;
use rand::Rng;

/// One chart entry: the preferred play and what to do when it is not on offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub primary: Decision,
    pub fallback: Option<Decision>,
}

impl Cell {
    const fn new(primary: Decision, fallback: Option<Decision>) -> Self {
        Self { primary, fallback }
    }

    pub fn resolve(&self, context: &DecisionContext) -> Decision {
        if is_valid_decision(self.primary, context) {
            return self.primary;
        }
        self.fallback
            .filter(|d| is_valid_decision(*d, context))
            .unwrap_or(Decision::Hit)
    }
}

const H: Cell = Cell::new(Decision::Hit, None);
const S: Cell = Cell::new(Decision::Stand, None);
/// Double, else hit
const DH: Cell = Cell::new(Decision::Double, Some(Decision::Hit));
/// Double, else stand
const DS: Cell = Cell::new(Decision::Double, Some(Decision::Stand));
const P: Cell = Cell::new(Decision::Split, Some(Decision::Hit));
/// Surrender, else hit
const RH: Cell = Cell::new(Decision::Surrender, Some(Decision::Hit));

// Columns: dealer up-card 2, 3, 4, 5, 6, 7, 8, 9, 10, A

/// Hard totals 8 through 16. Below 8 always hits, 17 and up always stands.
const HARD_TOTALS: [[Cell; 10]; 9] = [
    [H, H, H, H, H, H, H, H, H, H],           // 8
    [H, DH, DH, DH, DH, H, H, H, H, H],       // 9
    [DH, DH, DH, DH, DH, DH, DH, DH, H, H],   // 10
    [DH, DH, DH, DH, DH, DH, DH, DH, DH, DH], // 11
    [H, H, S, S, S, H, H, H, H, H],           // 12
    [S, S, S, S, S, H, H, H, H, H],           // 13
    [S, S, S, S, S, H, H, H, H, H],           // 14
    [S, S, S, S, S, H, H, H, RH, RH],         // 15
    [S, S, S, S, S, H, H, RH, RH, RH],        // 16
];

/// Soft totals 13 (A-2) through 21 (A-10).
const SOFT_TOTALS: [[Cell; 10]; 9] = [
    [H, H, H, DH, DH, H, H, H, H, H],     // A-2
    [H, H, H, DH, DH, H, H, H, H, H],     // A-3
    [H, H, DH, DH, DH, H, H, H, H, H],    // A-4
    [H, H, DH, DH, DH, H, H, H, H, H],    // A-5
    [H, DH, DH, DH, DH, H, H, H, H, H],   // A-6
    [DS, DS, DS, DS, DS, S, S, H, H, H],  // A-7
    [S, S, S, S, DS, S, S, S, S, S],      // A-8
    [S, S, S, S, S, S, S, S, S, S],       // A-9
    [S, S, S, S, S, S, S, S, S, S],       // A-10
];

/// Pairs 2-2 through A-A, indexed by card value.
const PAIRS: [[Cell; 10]; 10] = [
    [P, P, P, P, P, P, H, H, H, H],           // 2-2
    [P, P, P, P, P, P, H, H, H, H],           // 3-3
    [H, H, H, P, P, H, H, H, H, H],           // 4-4
    [DH, DH, DH, DH, DH, DH, DH, DH, H, H],   // 5-5
    [P, P, P, P, P, H, H, H, H, H],           // 6-6
    [P, P, P, P, P, P, H, H, H, H],           // 7-7
    [P, P, P, P, P, P, P, P, P, P],           // 8-8
    [P, P, P, P, P, S, P, P, S, S],           // 9-9
    [S, S, S, S, S, S, S, S, S, S],           // 10-10
    [P, P, P, P, P, P, P, P, P, P],           // A-A
];

fn dealer_column(up_card: &Card) -> usize {
    // Ace is valued 11, so it lands in the last column
    up_card.value().clamp(2, 11) as usize - 2
}

/// Fixed basic-strategy chart for a multi-deck shoe.
#[derive(Debug, Clone, Copy, Default)]
pub struct StrategyChart;

impl StrategyChart {
    pub fn lookup(&self, context: &DecisionContext) -> Decision {
        let hand = &context.hand;
        let column = dealer_column(&context.dealer_up_card);

        if context.can_split && hand.is_pair() {
            let row = hand.cards[0].value() as usize - 2;
            return PAIRS[row][column].resolve(context);
        }

        if hand.is_soft() {
            return match hand.value {
                13..=21 => SOFT_TOTALS[hand.value as usize - 13][column].resolve(context),
                // Only an unsplit A-A is soft 12
                _ => Decision::Hit,
            };
        }

        match hand.value {
            0..=7 => Decision::Hit,
            8..=16 => HARD_TOTALS[hand.value as usize - 8][column].resolve(context),
            _ => Decision::Stand,
        }
    }
}

/// Plays the chart and bets 10-20% of the stack.
pub struct BasicBrain<R> {
    chart: StrategyChart,
    rng: R,
}

impl<R: Rng + Send> BasicBrain<R> {
    pub fn new(rng: R) -> Self {
        Self {
            chart: StrategyChart,
            rng,
        }
    }
}

#[async_trait]
impl<R: Rng + Send> Brain for BasicBrain<R> {
    fn brain_type(&self) -> BrainType {
        BrainType::Basic
    }

    async fn make_decision(&mut self, context: &DecisionContext) -> Result<Decision, Error> {
        Ok(self.chart.lookup(context))
    }

    async fn decide_bet(&mut self, context: &BetContext) -> Result<u64, Error> {
        let fraction = self.rng.gen_range(0.10..=0.20);
        Ok(context.fraction_of_balance(fraction))
    }
}
