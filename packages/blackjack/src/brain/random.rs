use super::{BetContext, Brain, BrainType, Decision, DecisionContext};
use crate::Error;
use async_trait::async_trait;
use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;

const STRONG: u32 = 8;
const LEAN: u32 = 4;

/// Weighted random play over the legal actions, always betting the table minimum.
pub struct RandomBrain<R> {
    rng: R,
}

impl<R: Rng + Send> RandomBrain<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

/// Stand dominates on 19+, hit and double dominate on 11 or less.
pub(crate) fn decision_weights(context: &DecisionContext) -> Vec<(Decision, u32)> {
    let total = context.hand.value;
    context
        .legal_decisions()
        .into_iter()
        .map(|decision| {
            let weight = match decision {
                Decision::Stand if total >= 19 => STRONG,
                Decision::Hit | Decision::Double if total <= 11 => LEAN,
                _ => 1,
            };
            (decision, weight)
        })
        .collect()
}

#[async_trait]
impl<R: Rng + Send> Brain for RandomBrain<R> {
    fn brain_type(&self) -> BrainType {
        BrainType::Random
    }

    async fn make_decision(&mut self, context: &DecisionContext) -> Result<Decision, Error> {
        let weights = decision_weights(context);
        let decision = match WeightedIndex::new(weights.iter().map(|(_, w)| *w)) {
            Ok(dist) => weights[dist.sample(&mut self.rng)].0,
            Err(_) => Decision::Stand,
        };
        Ok(decision)
    }

    async fn decide_bet(&mut self, context: &BetContext) -> Result<u64, Error> {
        Ok(context.min_bet)
    }
}
