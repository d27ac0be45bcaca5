use crate::intercept::{RequestListener, RequestStarted, ResponseArrived};

/// Request-lifecycle notifications travelling from proxy tasks to the UI thread.
pub(crate) enum EngineEvent {
    RequestStarted(RequestStarted),
    ResponseArrived(ResponseArrived)
}

impl EngineEvent {
    pub(crate) fn deliver_to<L: RequestListener>(self, listener: &mut L) {
        match self {
            EngineEvent::RequestStarted(request) => listener.on_request_start(request),
            EngineEvent::ResponseArrived(response) => listener.on_response_arrived(response)
        }
    }
}
