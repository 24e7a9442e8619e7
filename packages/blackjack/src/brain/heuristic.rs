use super::{BetContext, Brain, BrainType, Decision, DecisionContext, StrategyChart};
use crate::Error;
use async_trait::async_trait;
use rand::Rng;

/// Basic strategy plus a handful of count-driven deviations. The "count" is
/// a single sample in [-1, 1] drawn per call, standing in for a true count.
pub struct HeuristicBrain<R> {
    chart: StrategyChart,
    rng: R,
}

impl<R: Rng + Send> HeuristicBrain<R> {
    pub fn new(rng: R) -> Self {
        Self {
            chart: StrategyChart,
            rng,
        }
    }

    fn sample_count(&mut self) -> f64 {
        self.rng.gen_range(-1.0..=1.0)
    }

    pub fn decide_with_count(&self, context: &DecisionContext, count: f64) -> Decision {
        let hand = &context.hand;
        let hard = !hand.is_soft();
        let dealer = context.dealer_up_card.value();

        if context.can_insurance && count > 0.8 {
            return Decision::Insurance;
        }
        if hard && hand.value == 16 && dealer == 10 && count > 0.3 {
            if count > 0.5 && context.can_surrender {
                return Decision::Surrender;
            }
            return Decision::Stand;
        }
        if hard && hand.value == 12 && dealer == 3 && count < -0.3 {
            return Decision::Hit;
        }
        if hand.value == 10 && dealer == 10 && count > 0.6 && context.can_double {
            return Decision::Double;
        }
        self.chart.lookup(context)
    }

    pub fn bet_with_count(&self, context: &BetContext, count: f64) -> u64 {
        let fraction = if count > 0.5 {
            0.30
        } else if count > 0.0 {
            0.20
        } else {
            0.10
        };
        context.fraction_of_balance(fraction)
    }
}

#[async_trait]
impl<R: Rng + Send> Brain for HeuristicBrain<R> {
    fn brain_type(&self) -> BrainType {
        BrainType::Heuristic
    }

    async fn make_decision(&mut self, context: &DecisionContext) -> Result<Decision, Error> {
        let count = self.sample_count();
        log::trace!("heuristic count sample {count:.2}");
        Ok(self.decide_with_count(context, count))
    }

    async fn decide_bet(&mut self, context: &BetContext) -> Result<u64, Error> {
        let count = self.sample_count();
        Ok(self.bet_with_count(context, count))
    }
}
