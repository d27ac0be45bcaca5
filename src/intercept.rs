pub(crate) mod exchange;
pub(crate) mod queue;
pub(crate) mod display;
pub(crate) mod engine;

pub(crate) use exchange::{HeaderList, PendingExchange, ResourceId, ResponseMeta};
pub(crate) use engine::{EngineControl, RequestListener, RequestStarted, ResponseArrived, ResumeOutcome};

use display::DisplayState;
use queue::PendingQueue;
use log::{debug, info, warn};

use crate::utils::HoldupError;

/// Lifecycle of the intercept window, independent of the captured data.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ViewState {
    Absent,
    Hidden,
    Shown,
}

/// One line of the held-requests listing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct HeldRow {
    pub(crate) id: ResourceId,
    pub(crate) method: String,
    pub(crate) uri: String,
    pub(crate) status_code: Option<u16>,
    pub(crate) current: bool,
}

impl HeldRow {
    fn from_exchange(exchange: &PendingExchange, current: bool) -> Self {
        HeldRow {
            id: exchange.id(),
            method: exchange.method().to_string(),
            uri: exchange.uri().to_string(),
            status_code: exchange.response().map(|r| r.status_code),
            current,
        }
    }
}

/// The intercept controller. One per process, owned by the UI thread and driven from there,
/// so nothing in here locks.
///
/// A held exchange sits either in `current` or in `queue`, never both, and a resource id
/// is tracked at most once across the two.
pub(crate) struct InterceptSession<E: EngineControl> {
    engine: E,
    enabled: bool,
    view: ViewState,
    display: DisplayState,
    queue: PendingQueue,
    current: Option<PendingExchange>,
    modified: bool,
    notice: Option<HoldupError>,
}

impl<E: EngineControl> InterceptSession<E> {
    pub(crate) fn new(engine: E) -> Self {
        InterceptSession {
            engine,
            enabled: false,
            view: ViewState::Absent,
            display: DisplayState::default(),
            queue: PendingQueue::default(),
            current: None,
            modified: false,
            notice: None,
        }
    }

    pub(crate) fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub(crate) fn view_state(&self) -> ViewState {
        self.view
    }

    pub(crate) fn display(&self) -> &DisplayState {
        &self.display
    }

    #[cfg(test)]
    pub(crate) fn current(&self) -> Option<&PendingExchange> {
        self.current.as_ref()
    }

    pub(crate) fn queue_len(&self) -> usize {
        self.queue.len()
    }

    pub(crate) fn is_modified(&self) -> bool {
        self.modified
    }

    /// Number of exchanges held right now, current one included.
    pub(crate) fn held_count(&self) -> usize {
        self.queue.len() + usize::from(self.current.is_some())
    }

    pub(crate) fn is_tracked(&self, id: ResourceId) -> bool {
        self.current.as_ref().map_or(false, |c| c.id() == id) || self.queue.contains(id)
    }

    /// Current exchange first, then the queue head to tail.
    pub(crate) fn held_rows(&self) -> Vec<HeldRow> {
        self.current
            .iter()
            .map(|c| HeldRow::from_exchange(c, true))
            .chain(self.queue.iter().map(|q| HeldRow::from_exchange(q, false)))
            .collect()
    }

    /// Warning left behind by the last operator action, if any.
    pub(crate) fn take_notice(&mut self) -> Option<HoldupError> {
        self.notice.take()
    }

    fn push_notice(&mut self, notice: HoldupError) {
        warn!("{}", &notice);
        self.notice = Some(notice);
    }

    fn install_current(&mut self, exchange: PendingExchange) {
        self.display.show_exchange(&exchange);
        self.current = Some(exchange);
        self.modified = false;
    }

    /// Pops the queue head on display, or goes idle.
    fn advance(&mut self) {
        match self.queue.pop_front() {
            Some(next) => {
                debug!("Displaying next held exchange {}", next.id());
                self.install_current(next);
            },
            None => {
                self.modified = false;
                self.display.blank();
            }
        }
    }

    pub(crate) fn forward(&mut self) {
        if !self.enabled {
            return;
        }

        let exchange = match self.current.take() {
            Some(exchange) => exchange,
            None => return
        };

        let edited = if self.modified {
            Some(self.display.request.clone())
        }
        else {
            None
        };

        match self.engine.resume(exchange.id(), edited.as_deref()) {
            Ok(ResumeOutcome::Resumed) => {
                debug!("Forwarded {} {} {}", exchange.id(), exchange.method(), exchange.uri());
            },
            Ok(ResumeOutcome::EditsDiscarded) => {
                self.push_notice(HoldupError::EditsDiscarded(exchange.id()));
            },
            Err(err) => {
                self.push_notice(err);
            }
        }

        self.advance();
    }

    pub(crate) fn drop(&mut self) {
        if !self.enabled {
            return;
        }

        if self.current.is_none() && self.queue.is_empty() {
            return;
        }

        if let Some(exchange) = self.current.take() {
            match self.engine.cancel(exchange.id()) {
                Ok(_) => debug!("Dropped {} {} {}", exchange.id(), exchange.method(), exchange.uri()),
                Err(err) => self.push_notice(err)
            }
        }

        self.advance();
    }

    /// Returns the view state the window should be brought to.
    pub(crate) fn toggle_enabled(&mut self, on: bool) -> ViewState {
        self.enabled = on;
        self.engine.set_holding(on);

        self.view = match (on, self.view) {
            (true, _) => ViewState::Shown,
            (false, ViewState::Absent) => ViewState::Absent,
            (false, _) => ViewState::Hidden,
        };

        info!("Interception {}", if on { "enabled" } else { "disabled" });
        self.view
    }

    pub(crate) fn on_request_edited(&mut self, text: String) {
        if self.current.is_none() {
            return;
        }

        self.display.set_edited_request(text);
        self.modified = true;
    }

    /// The window went away. Everything still held is cancelled so no client stalls forever.
    /// Returns how many exchanges were cancelled.
    pub(crate) fn on_view_destroyed(&mut self) -> usize {
        self.enabled = false;
        self.engine.set_holding(false);
        self.view = ViewState::Absent;
        self.modified = false;
        self.display.blank();

        let mut abandoned: Vec<ResourceId> = self.current.take().map(|c| c.id()).into_iter().collect();
        abandoned.extend(self.queue.drain().map(|q| q.id()));

        for id in abandoned.iter() {
            if let Err(err) = self.engine.cancel(*id) {
                warn!("Could not drop {} on window teardown: {}", id, err);
            }
        }

        if !abandoned.is_empty() {
            info!("Intercept window closed, dropped {} held exchange(s)", abandoned.len());
        }

        abandoned.len()
    }
}

impl<E: EngineControl> RequestListener for InterceptSession<E> {
    fn on_request_start(&mut self, request: RequestStarted) {
        if !self.enabled {
            self.engine.pass_through(request.id);
            return;
        }

        if self.is_tracked(request.id) {
            debug!("Request {} is already held, ignoring repeated start", request.id);
            return;
        }

        let exchange = PendingExchange::new(request.id, request.method, request.uri, request.headers);
        if self.current.is_none() {
            debug!("Holding {} for display", exchange.id());
            self.install_current(exchange);
        }
        else {
            debug!("Queueing {} behind {} others", exchange.id(), self.queue.len());
            self.queue.push_back(exchange);
        }
    }

    fn on_response_arrived(&mut self, response: ResponseArrived) {
        if !self.enabled {
            return;
        }

        let meta = ResponseMeta {
            status_code: response.status_code,
            content_type: response.content_type,
            headers: response.headers,
        };

        if let Some(current) = self.current.as_mut() {
            if current.id() == response.id {
                self.display.show_response(&meta);
                current.attach_response(meta);
                return;
            }
        }

        match self.queue.find_mut(response.id) {
            Some(queued) => queued.attach_response(meta),
            None => debug!("Response for untracked resource {}, skipping", response.id)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Call {
        Resume(u64, Option<String>),
        Cancel(u64),
        PassThrough(u64),
        Holding(bool),
    }

    #[derive(Default)]
    struct RecordingEngine {
        calls: Vec<Call>,
        fail: bool,
        discard_edits: bool,
    }

    impl EngineControl for RecordingEngine {
        fn resume(&mut self, id: ResourceId, edited: Option<&str>) -> Result<ResumeOutcome, HoldupError> {
            self.calls.push(Call::Resume(id.as_u64(), edited.map(str::to_string)));
            if self.fail {
                return Err(HoldupError::ExchangeGone(id));
            }

            if self.discard_edits && edited.is_some() {
                Ok(ResumeOutcome::EditsDiscarded)
            }
            else {
                Ok(ResumeOutcome::Resumed)
            }
        }

        fn cancel(&mut self, id: ResourceId) -> Result<(), HoldupError> {
            self.calls.push(Call::Cancel(id.as_u64()));
            if self.fail {
                return Err(HoldupError::ExchangeGone(id));
            }
            Ok(())
        }

        fn pass_through(&mut self, id: ResourceId) {
            self.calls.push(Call::PassThrough(id.as_u64()));
        }

        fn set_holding(&mut self, on: bool) {
            self.calls.push(Call::Holding(on));
        }
    }

    fn enabled_session() -> InterceptSession<RecordingEngine> {
        let mut session = InterceptSession::new(RecordingEngine::default());
        session.toggle_enabled(true);
        session.engine.calls.clear();
        session
    }

    fn start(session: &mut InterceptSession<RecordingEngine>, id: u64, uri: &str) {
        session.on_request_start(RequestStarted {
            id: ResourceId::new(id),
            method: "GET".to_string(),
            uri: uri.to_string(),
            headers: vec![("Host".to_string(), "a".to_string())],
        });
    }

    fn respond(session: &mut InterceptSession<RecordingEngine>, id: u64, status_code: u16) {
        session.on_response_arrived(ResponseArrived {
            id: ResourceId::new(id),
            status_code,
            content_type: "text/html".to_string(),
            headers: vec![("Server".to_string(), "test".to_string())],
        });
    }

    fn current_id(session: &InterceptSession<RecordingEngine>) -> Option<u64> {
        session.current().map(|c| c.id().as_u64())
    }

    fn queued_ids(session: &InterceptSession<RecordingEngine>) -> Vec<u64> {
        session.held_rows().iter().filter(|r| !r.current).map(|r| r.id.as_u64()).collect()
    }

    #[test]
    fn every_start_is_tracked_until_released() {
        let mut session = enabled_session();
        for id in 1..=5 {
            start(&mut session, id, "http://a");
            assert_eq!(session.held_count(), id as usize);
        }

        session.forward();
        assert_eq!(session.held_count(), 4);
        session.drop();
        assert_eq!(session.held_count(), 3);
    }

    #[test]
    fn first_request_is_displayed_rest_queued() {
        let mut session = enabled_session();
        start(&mut session, 1, "http://a");
        start(&mut session, 2, "http://b");

        assert_eq!(current_id(&session), Some(1));
        assert_eq!(queued_ids(&session), vec![2]);
        assert!(session.display().request.contains("URI: http://a"));
    }

    #[test]
    fn response_for_current_renders_without_touching_queue() {
        let mut session = enabled_session();
        start(&mut session, 1, "http://a");
        start(&mut session, 2, "http://b");
        let revision = session.display().revision();

        respond(&mut session, 1, 204);

        assert_eq!(session.queue_len(), 1);
        assert!(session.display().response.starts_with("Status: 204\n"));
        assert!(session.display().revision() > revision);
        assert_eq!(session.current().and_then(|c| c.response()).map(|r| r.status_code), Some(204));
    }

    #[test]
    fn response_for_queued_entry_is_attached_silently() {
        let mut session = enabled_session();
        start(&mut session, 1, "http://a");
        start(&mut session, 2, "http://b");
        start(&mut session, 3, "http://c");
        let display_before = session.display().clone();

        respond(&mut session, 3, 500);

        assert_eq!(session.display(), &display_before);
        assert_eq!(current_id(&session), Some(1));
        assert_eq!(queued_ids(&session), vec![2, 3]);
        let statuses: Vec<Option<u16>> = session.held_rows().iter().map(|r| r.status_code).collect();
        assert_eq!(statuses, vec![None, None, Some(500)]);
    }

    #[test]
    fn release_promotes_former_queue_head() {
        let mut session = enabled_session();
        start(&mut session, 1, "http://a");
        start(&mut session, 2, "http://b");
        start(&mut session, 3, "http://c");

        session.forward();
        assert_eq!(current_id(&session), Some(2));
        assert_eq!(queued_ids(&session), vec![3]);

        session.drop();
        assert_eq!(current_id(&session), Some(3));
        assert_eq!(session.queue_len(), 0);

        assert_eq!(
            session.engine.calls,
            vec![Call::Resume(1, None), Call::Cancel(2)]
        );
    }

    #[test]
    fn last_release_goes_idle_and_blanks_display() {
        let mut session = enabled_session();
        start(&mut session, 1, "http://a");
        respond(&mut session, 1, 200);

        session.forward();

        assert!(session.current().is_none());
        assert!(session.display().is_blank());
    }

    #[test]
    fn disable_enable_keeps_queue() {
        let mut session = enabled_session();
        start(&mut session, 1, "http://a");
        start(&mut session, 2, "http://b");

        assert_eq!(session.toggle_enabled(false), ViewState::Hidden);
        assert_eq!(current_id(&session), Some(1));
        assert_eq!(queued_ids(&session), vec![2]);

        assert_eq!(session.toggle_enabled(true), ViewState::Shown);
        session.forward();

        assert_eq!(current_id(&session), Some(2));
        assert_eq!(session.queue_len(), 0);
    }

    #[test]
    fn dropping_nothing_twice_is_harmless() {
        let mut session = enabled_session();
        let display_before = session.display().clone();

        session.drop();
        session.drop();

        assert!(session.current().is_none());
        assert_eq!(session.queue_len(), 0);
        assert_eq!(session.display(), &display_before);
        assert!(session.engine.calls.is_empty());
    }

    #[test]
    fn queued_response_is_shown_once_promoted() {
        let mut session = enabled_session();
        start(&mut session, 1, "http://a");
        start(&mut session, 2, "http://b");
        assert_eq!(queued_ids(&session), vec![2]);

        respond(&mut session, 2, 200);
        assert_eq!(current_id(&session), Some(1));
        assert_eq!(session.current().and_then(|c| c.response()), None);
        assert_eq!(session.held_rows()[1].status_code, Some(200));

        session.forward();

        assert_eq!(current_id(&session), Some(2));
        assert_eq!(session.current().and_then(|c| c.response()).map(|r| r.status_code), Some(200));
        assert_eq!(session.queue_len(), 0);
        assert!(session.display().request.contains("URI: http://b"));
        assert!(session.display().response.starts_with("Status: 200\n"));
    }

    #[test]
    fn unmatched_response_is_ignored() {
        let mut session = enabled_session();
        start(&mut session, 1, "http://a");
        let display_before = session.display().clone();

        respond(&mut session, 99, 200);
        session.forward();
        respond(&mut session, 1, 200);

        assert!(session.current().is_none());
        assert_eq!(session.display().revision(), display_before.revision() + 1);
        assert!(session.display().is_blank());
    }

    #[test]
    fn disabled_session_ignores_events_and_actions() {
        let mut session = InterceptSession::new(RecordingEngine::default());
        start(&mut session, 1, "http://a");
        respond(&mut session, 1, 200);
        session.forward();
        session.drop();

        assert_eq!(session.held_count(), 0);
        assert_eq!(session.engine.calls, vec![Call::PassThrough(1)]);
    }

    #[test]
    fn actions_while_disabled_keep_held_exchange() {
        let mut session = enabled_session();
        start(&mut session, 1, "http://a");
        session.toggle_enabled(false);

        session.forward();
        session.drop();

        assert_eq!(current_id(&session), Some(1));
    }

    #[test]
    fn repeated_start_for_same_id_is_ignored() {
        let mut session = enabled_session();
        start(&mut session, 1, "http://a");
        start(&mut session, 2, "http://b");
        start(&mut session, 2, "http://b");
        start(&mut session, 1, "http://a");

        assert_eq!(session.held_count(), 2);
    }

    #[test]
    fn edited_text_is_handed_to_engine_and_discard_is_reported() {
        let mut session = enabled_session();
        session.engine.discard_edits = true;
        start(&mut session, 1, "http://a");
        start(&mut session, 2, "http://b");

        session.on_request_edited("Method: POST\nURI: http://a\n".to_string());
        assert!(session.is_modified());

        session.forward();

        assert_eq!(
            session.engine.calls,
            vec![Call::Resume(1, Some("Method: POST\nURI: http://a\n".to_string()))]
        );
        assert!(!session.is_modified());
        assert!(matches!(session.take_notice(), Some(HoldupError::EditsDiscarded(id)) if id == ResourceId::new(1)));
        assert!(session.take_notice().is_none());
    }

    #[test]
    fn edit_while_idle_is_not_a_modification() {
        let mut session = enabled_session();
        session.on_request_edited("junk".to_string());

        assert!(!session.is_modified());
        assert!(session.display().is_blank());
    }

    #[test]
    fn drop_clears_modified_flag() {
        let mut session = enabled_session();
        start(&mut session, 1, "http://a");
        start(&mut session, 2, "http://b");
        session.on_request_edited("changed".to_string());

        session.drop();

        assert!(!session.is_modified());
        assert!(session.display().request.contains("URI: http://b"));
    }

    #[test]
    fn engine_failures_become_notices() {
        let mut session = enabled_session();
        session.engine.fail = true;
        start(&mut session, 1, "http://a");
        start(&mut session, 2, "http://b");

        session.forward();
        assert!(matches!(session.take_notice(), Some(HoldupError::ExchangeGone(id)) if id == ResourceId::new(1)));
        assert_eq!(current_id(&session), Some(2));

        session.drop();
        assert!(matches!(session.take_notice(), Some(HoldupError::ExchangeGone(id)) if id == ResourceId::new(2)));
        assert!(session.current().is_none());
    }

    #[test]
    fn view_teardown_cancels_everything_held() {
        let mut session = enabled_session();
        start(&mut session, 1, "http://a");
        start(&mut session, 2, "http://b");
        start(&mut session, 3, "http://c");
        session.on_request_edited("x".to_string());

        let dropped = session.on_view_destroyed();

        assert_eq!(dropped, 3);
        assert!(!session.is_enabled());
        assert!(!session.is_modified());
        assert_eq!(session.view_state(), ViewState::Absent);
        assert_eq!(session.held_count(), 0);
        assert!(session.display().is_blank());
        assert_eq!(
            session.engine.calls,
            vec![Call::Holding(false), Call::Cancel(1), Call::Cancel(2), Call::Cancel(3)]
        );
    }

    #[test]
    fn toggle_drives_view_and_engine_gate() {
        let mut session = InterceptSession::new(RecordingEngine::default());
        assert_eq!(session.view_state(), ViewState::Absent);
        assert_eq!(session.toggle_enabled(false), ViewState::Absent);
        assert_eq!(session.toggle_enabled(true), ViewState::Shown);
        assert_eq!(session.toggle_enabled(false), ViewState::Hidden);

        assert_eq!(
            session.engine.calls,
            vec![Call::Holding(false), Call::Holding(true), Call::Holding(false)]
        );
    }

    #[test]
    fn events_after_disable_are_passed_through() {
        let mut session = enabled_session();
        start(&mut session, 1, "http://a");
        session.toggle_enabled(false);
        session.engine.calls.clear();

        start(&mut session, 2, "http://b");

        assert_eq!(session.held_count(), 1);
        assert_eq!(session.engine.calls, vec![Call::PassThrough(2)]);
    }
}
