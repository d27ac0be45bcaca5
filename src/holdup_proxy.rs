pub(crate) mod events;
pub(crate) mod engine;
pub(crate) mod request_response;

use events::EngineEvent;
use engine::{HeldExchanges, Verdict};
use request_response::{request_started, response_arrived};
use tokio::sync::{mpsc::Sender, oneshot};
use log::{debug, error};
use async_trait::async_trait;
use hyper::{Body, Method, Request, Response, StatusCode};
use hudsucker::{
    HttpHandler,
    RequestOrResponse,
    HttpContext
};
use std::sync::Arc;

use cursive::{Cursive, CbSink};

use crate::intercept::ResourceId;
use crate::scope::Scope;
use crate::siv_ui::drain_engine_events;

const DROPPED_BODY: &str = "Request dropped by holdup";

/// Requests go upstream untouched; their responses are what gets held until the
/// operator forwards or drops the exchange.
pub(crate) struct HoldupHandler {
    proxy_tx: Sender<EngineEvent>,
    cursive_sink: CbSink,
    held: HeldExchanges,
    scope: Arc<Scope>,
    resource_id: Option<ResourceId>,
    verdict: Option<oneshot::Receiver<Verdict>>,
}

// hudsucker clones the handler for every request, the per-exchange part starts empty.
impl Clone for HoldupHandler {
    fn clone(&self) -> Self {
        HoldupHandler {
            proxy_tx: self.proxy_tx.clone(),
            cursive_sink: self.cursive_sink.clone(),
            held: self.held.clone(),
            scope: self.scope.clone(),
            resource_id: None,
            verdict: None,
        }
    }
}

#[async_trait]
impl HttpHandler for HoldupHandler {
    async fn should_intercept(&mut self, _ctx: &HttpContext, _req: &Request<Body>) -> bool {
        // CONNECT tunnels are relayed as-is, nothing is decrypted
        false
    }

    async fn handle_request(&mut self, _ctx: &HttpContext, req: Request<Body>) -> RequestOrResponse {
        RequestOrResponse::Request(self.capture_request(req).await)
    }

    async fn handle_response(&mut self, _ctx: &HttpContext, res: Response<Body>) -> Response<Body> {
        self.hold_response(res).await
    }
}

impl HoldupHandler {
    pub(crate) fn new(proxy_tx: Sender<EngineEvent>, cursive_sink: CbSink, held: HeldExchanges, scope: Arc<Scope>) -> Self {
        HoldupHandler {
            proxy_tx,
            cursive_sink,
            held,
            scope,
            resource_id: None,
            verdict: None,
        }
    }

    fn make_dropped_response(&self) -> Response<Body> {
        let mut response = Response::new(Body::from(DROPPED_BODY));
        *response.status_mut() = StatusCode::BAD_GATEWAY;
        response
    }

    async fn notify(&self, event: EngineEvent) -> bool {
        if let Err(err) = self.proxy_tx.send(event).await {
            error!("Proxy could not pass event to UI: {}", err);
            return false;
        }

        let wake_result = self.cursive_sink.send(
            Box::new(
                |siv: &mut Cursive| {
                    drain_engine_events(siv);
                }
            )
        );

        match wake_result {
            Ok(_) => true,
            Err(err) => {
                error!("Proxy could not sync with UI: {}", err);
                false
            }
        }
    }

    pub(crate) async fn capture_request(&mut self, req: Request<Body>) -> Request<Body> {
        if req.method() == Method::CONNECT || !self.held.is_holding() {
            return req;
        }

        if !self.scope.fits(&req.uri().to_string()) {
            return req;
        }

        let id = ResourceId::next();
        let verdict = self.held.register(id);
        let event = EngineEvent::RequestStarted(request_started(id, &req));

        if self.notify(event).await {
            debug!("HTTP Request with id {}", id);
            self.resource_id = Some(id);
            self.verdict = Some(verdict);
        }
        else {
            self.held.forget(id);
        }

        req
    }

    pub(crate) async fn hold_response(&mut self, res: Response<Body>) -> Response<Body> {
        let (id, verdict) = match (self.resource_id.take(), self.verdict.take()) {
            (Some(id), Some(verdict)) => (id, verdict),
            _ => return res
        };

        debug!("HTTP Response with id {}", id);
        if !self.notify(EngineEvent::ResponseArrived(response_arrived(id, &res))).await {
            self.held.forget(id);
            return res;
        }

        match verdict.await {
            Ok(Verdict::Forward) => res,
            Ok(Verdict::Drop) => self.make_dropped_response(),
            Err(_) => {
                debug!("Verdict for {} was abandoned, dropping", id);
                self.make_dropped_response()
            }
        }
    }
}
