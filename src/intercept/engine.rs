use super::exchange::{HeaderList, ResourceId};
use crate::utils::HoldupError;

/// What the engine did with a resumed exchange.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ResumeOutcome {
    Resumed,
    /// The original request went out; operator edits could not be applied to it.
    EditsDiscarded,
}

/// Actions the controller asks of the engine that owns the actual network exchanges.
pub(crate) trait EngineControl {
    /// Let a held exchange proceed. `edited` carries the operator's request text when modified.
    fn resume(&mut self, id: ResourceId, edited: Option<&str>) -> Result<ResumeOutcome, HoldupError>;

    /// Best-effort abort of a held exchange.
    fn cancel(&mut self, id: ResourceId) -> Result<(), HoldupError>;

    /// Release an exchange the controller refused to capture. Engines that never block need nothing.
    fn pass_through(&mut self, _id: ResourceId) {}

    /// Mirror of the session switch, so an engine can stop holding requests while it is off.
    fn set_holding(&mut self, _on: bool) {}
}

pub(crate) struct RequestStarted {
    pub(crate) id: ResourceId,
    pub(crate) method: String,
    pub(crate) uri: String,
    pub(crate) headers: HeaderList,
}

pub(crate) struct ResponseArrived {
    pub(crate) id: ResourceId,
    pub(crate) status_code: u16,
    pub(crate) content_type: String,
    pub(crate) headers: HeaderList,
}

/// The two request-lifecycle notifications the engine drives the controller with.
pub(crate) trait RequestListener {
    fn on_request_start(&mut self, request: RequestStarted);
    fn on_response_arrived(&mut self, response: ResponseArrived);
}
