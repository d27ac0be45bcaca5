use dashmap::DashMap;
use log::debug;
use tokio::sync::oneshot;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc
};

use crate::intercept::{EngineControl, ResourceId, ResumeOutcome};
use crate::utils::HoldupError;

/// Decision a held proxy request is waiting for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Verdict {
    Forward,
    Drop
}

/// Proxy tasks park here while their request is on hold. Shared between every
/// handler clone and the engine that answers them from the UI thread.
#[derive(Clone, Default)]
pub(crate) struct HeldExchanges {
    pending: Arc<DashMap<ResourceId, oneshot::Sender<Verdict>>>,
    holding: Arc<AtomicBool>,
}

impl HeldExchanges {
    pub(crate) fn is_holding(&self) -> bool {
        self.holding.load(Ordering::Acquire)
    }

    pub(crate) fn set_holding(&self, on: bool) {
        self.holding.store(on, Ordering::Release);
    }

    pub(crate) fn register(&self, id: ResourceId) -> oneshot::Receiver<Verdict> {
        let (tx, rx) = oneshot::channel();
        self.pending.insert(id, tx);
        rx
    }

    /// `false` when nothing waits under this id, or the waiting client already went away.
    pub(crate) fn release(&self, id: ResourceId, verdict: Verdict) -> bool {
        match self.pending.remove(&id) {
            Some((_, tx)) => tx.send(verdict).is_ok(),
            None => false
        }
    }

    pub(crate) fn forget(&self, id: ResourceId) {
        self.pending.remove(&id);
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.pending.len()
    }
}

/// Engine side of the controller: answers held proxy requests.
pub(crate) struct ProxyEngine {
    held: HeldExchanges,
}

impl ProxyEngine {
    pub(crate) fn new(held: HeldExchanges) -> Self {
        ProxyEngine { held }
    }
}

impl EngineControl for ProxyEngine {
    fn resume(&mut self, id: ResourceId, edited: Option<&str>) -> Result<ResumeOutcome, HoldupError> {
        if !self.held.release(id, Verdict::Forward) {
            return Err(HoldupError::ExchangeGone(id));
        }

        // The request already went upstream as captured; edited text has nowhere to go.
        match edited {
            Some(_) => Ok(ResumeOutcome::EditsDiscarded),
            None => Ok(ResumeOutcome::Resumed)
        }
    }

    fn cancel(&mut self, id: ResourceId) -> Result<(), HoldupError> {
        if self.held.release(id, Verdict::Drop) {
            Ok(())
        }
        else {
            Err(HoldupError::ExchangeGone(id))
        }
    }

    fn pass_through(&mut self, id: ResourceId) {
        debug!("Letting {} through untouched", id);
        self.held.release(id, Verdict::Forward);
    }

    fn set_holding(&mut self, on: bool) {
        self.held.set_holding(on);
    }
}
