use super::{is_valid_decision, BetContext, Brain, BrainType, Decision, DecisionContext};
use crate::Error;
use async_trait::async_trait;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::oneshot;

/// What the seat is currently waiting on, handed to the prompt hook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Prompt {
    Decision(DecisionContext),
    Bet(BetContext),
}

pub type PromptHook = Arc<dyn Fn(&Prompt) + Send + Sync>;

#[derive(Default)]
struct Pending {
    decision: Option<(DecisionContext, oneshot::Sender<Decision>)>,
    bet: Option<(BetContext, oneshot::Sender<u64>)>,
    hook: Option<PromptHook>,
}

/// Resolver handle held by the input layer. At most one decision and one
/// bet can be outstanding; a new request replaces the old one, which then
/// resolves as cancelled.
#[derive(Clone, Default)]
pub struct HumanInput {
    pending: Arc<Mutex<Pending>>,
}

impl HumanInput {
    fn lock(&self) -> MutexGuard<'_, Pending> {
        self.pending.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Called every time a new request is registered.
    pub fn set_prompt_hook<F>(&self, hook: F)
    where
        F: Fn(&Prompt) + Send + Sync + 'static,
    {
        self.lock().hook = Some(Arc::new(hook));
    }

    pub async fn request_action(&self, context: DecisionContext) -> Result<Decision, Error> {
        let (tx, rx) = oneshot::channel();
        let hook = {
            let mut pending = self.lock();
            if pending.decision.is_some() {
                log::warn!("Replacing an unanswered decision request");
            }
            pending.decision = Some((context.clone(), tx));
            pending.hook.clone()
        };
        if let Some(hook) = hook {
            hook(&Prompt::Decision(context));
        }
        rx.await.map_err(|_| Error::DecisionCancelled)
    }

    pub async fn request_bet(&self, context: BetContext) -> Result<u64, Error> {
        let (tx, rx) = oneshot::channel();
        let hook = {
            let mut pending = self.lock();
            if pending.bet.is_some() {
                log::warn!("Replacing an unanswered bet request");
            }
            pending.bet = Some((context, tx));
            pending.hook.clone()
        };
        if let Some(hook) = hook {
            hook(&Prompt::Bet(context));
        }
        rx.await.map_err(|_| Error::BetCancelled)
    }

    /// Returns `false` and changes nothing when no decision is pending or
    /// the decision is not legal for the pending context.
    pub fn submit_decision(&self, decision: Decision) -> bool {
        let mut pending = self.lock();
        match pending.decision.take() {
            Some((context, tx)) if is_valid_decision(decision, &context) => tx.send(decision).is_ok(),
            other => {
                pending.decision = other;
                false
            }
        }
    }

    pub fn submit_bet(&self, amount: u64) -> bool {
        match self.lock().bet.take() {
            Some((_, tx)) => tx.send(amount).is_ok(),
            None => false,
        }
    }

    pub fn cancel_decision(&self) -> bool {
        self.lock().decision.take().is_some()
    }

    pub fn cancel_bet(&self) -> bool {
        self.lock().bet.take().is_some()
    }

    pub fn pending_decision_context(&self) -> Option<DecisionContext> {
        self.lock().decision.as_ref().map(|(context, _)| context.clone())
    }

    pub fn pending_bet_context(&self) -> Option<BetContext> {
        self.lock().bet.as_ref().map(|(context, _)| *context)
    }
}

/// Seat driven by external input. Every call suspends until the paired
/// [`HumanInput`] submits or cancels.
pub struct HumanBrain {
    input: HumanInput,
}

impl HumanBrain {
    pub fn new() -> (Self, HumanInput) {
        let input = HumanInput::default();
        (
            HumanBrain {
                input: input.clone(),
            },
            input,
        )
    }
}

#[async_trait]
impl Brain for HumanBrain {
    fn brain_type(&self) -> BrainType {
        BrainType::Human
    }

    async fn make_decision(&mut self, context: &DecisionContext) -> Result<Decision, Error> {
        self.input.request_action(context.clone()).await
    }

    async fn decide_bet(&mut self, context: &BetContext) -> Result<u64, Error> {
        self.input.request_bet(*context).await
    }
}
