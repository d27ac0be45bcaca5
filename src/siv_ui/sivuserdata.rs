use cursive::{Cursive, views::TextContent};
use tokio::sync::mpsc::Receiver as TokioReceiver;

use super::status_bar;
use crate::{
    holdup_proxy::{engine::ProxyEngine, events::EngineEvent},
    intercept::{InterceptSession, ViewState},
    utils::HoldupError
};

pub(super) struct SivUserData {
    pub(super) proxy_receiver: TokioReceiver<EngineEvent>,
    pub(super) session: InterceptSession<ProxyEngine>,
    pub(super) response_view_content: TextContent,
    pub(super) rendered_revision: Option<u64>,
    pub(super) window_state: ViewState,
    pub(super) errors: Vec<HoldupError>,
    pub(super) status: status_bar::StatusBarContent,
}

impl SivUserData {
    /// Feeds everything the proxy sent so far into the session, in arrival order.
    pub(super) fn receive_data_from_proxy(&mut self) -> usize {
        let mut received = 0;
        while let Ok(event) = self.proxy_receiver.try_recv() {
            event.deliver_to(&mut self.session);
            received += 1;
        }

        received
    }

    pub(crate) fn push_error(&mut self, err: HoldupError) {
        self.errors.push(err);
        self.update_status();
    }

    pub(super) fn update_status(&mut self) {
        self.status.set_stats(
            self.session.is_enabled(),
            self.session.held_count(),
            self.session.queue_len(),
            self.session.is_modified(),
            self.errors.len()
        );
    }
}

pub(super) trait GetHoldupUserData {
    fn get_holdup_userdata(&mut self) -> &mut SivUserData;
}

impl GetHoldupUserData for Cursive {
    fn get_holdup_userdata(&mut self) -> &mut SivUserData {
        self.user_data()
            .expect("holdup user data is installed before the UI starts")
    }
}
