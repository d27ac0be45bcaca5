mod help_view;
mod quit_popup;
mod held_table;
mod status_bar;
mod sivuserdata;
mod intercept_view;
pub(super) mod error_view;

use cursive::{Cursive, CursiveExt};
use cursive::traits::*;
use cursive::event::Key;
use cursive::utils::markup::StyledString;
use cursive::theme::{BaseColor, BorderStyle, Palette};
use cursive::views::{Dialog, LinearLayout, TextContent, TextView, StackView};

use log::debug;
use std::rc::Rc;
use tokio::sync::mpsc::Receiver;

use crate::config::Config;
use crate::holdup_proxy::{engine::ProxyEngine, events::EngineEvent};
use crate::intercept::{InterceptSession, ViewState};
use sivuserdata::{GetHoldupUserData, SivUserData};
use status_bar::StatusBarContent;

fn make_dashboard(config: &Config) -> Dialog {
    let text = format!(
        "\n  Listening on {}:{}\n\n  F2 - start/stop holding requests\n  ?  - help\n",
        &config.address,
        config.port
    );

    Dialog::around(TextView::new(text).full_screen()).title("Holdup")
}

pub(super) fn bootstrap_ui(
    mut siv: Cursive,
    config: &Config,
    rx: Receiver<EngineEvent>,
    session: InterceptSession<ProxyEngine>
) {
    install_ui(&mut siv, config, rx, session);
    siv.run();
}

/// Everything short of running the event loop: callbacks, theme, user data, layout.
fn install_ui(
    siv: &mut Cursive,
    config: &Config,
    rx: Receiver<EngineEvent>,
    session: InterceptSession<ProxyEngine>
) {
    let help_message = Rc::new(help_view::make_help_message());

    siv.add_global_callback('q', |s| quit_popup::draw_popup(s));
    siv.add_global_callback('e', |s| error_view::draw_error_view(s));
    siv.add_global_callback('?', move |s| help_view::draw_help_view(s, &help_message));
    siv.add_global_callback(Key::F2, |s| toggle_interception(s));
    siv.add_global_callback(Key::F5, |s| forward_current(s));
    siv.add_global_callback(Key::F6, |s| drop_current(s));

    siv.set_theme(cursive::theme::Theme {
        shadow: false,
        borders: BorderStyle::Simple,
        palette: Palette::default().with(|palette| {
            use cursive::theme::BaseColor::*;
            use cursive::theme::Color::TerminalDefault;
            use cursive::theme::PaletteColor::*;

            palette[Background] = TerminalDefault;
            palette[View] = TerminalDefault;
            palette[Primary] = White.light();
            palette[TitlePrimary] = Green.light();
            palette[Secondary] = TerminalDefault;
            palette[Highlight] = White.light();
            palette[HighlightText] = BaseColor::Black.dark();
        }),
    });

    let response_view_content = TextContent::new("");
    let status_bar_message = TextContent::new(
        StyledString::styled(" ", BaseColor::Black.light())
    );
    let status_bar_stats = TextContent::new(
        StyledString::styled("Press '?' to get help", BaseColor::Black.light())
    );

    let intercept_on_start = config.intercept_on_start;
    let mut views_stack = StackView::new();
    views_stack.add_fullscreen_layer(make_dashboard(config));

    siv.set_user_data(
        SivUserData {
            proxy_receiver: rx,
            session,
            response_view_content,
            rendered_revision: None,
            window_state: ViewState::Absent,
            errors: Vec::new(),
            status: StatusBarContent::new(status_bar_message.clone(), status_bar_stats.clone()),
        }
    );

    let base_layout = LinearLayout::vertical()
        .child(status_bar::make_status_bar(status_bar_message, status_bar_stats))
        .child(Dialog::around(held_table::new_table().fixed_height(8)).title("Held"))
        .child(views_stack.with_name("views-stack").full_width());

    siv.add_fullscreen_layer(base_layout);

    if intercept_on_start {
        siv.get_holdup_userdata().session.toggle_enabled(true);
    }
    refresh_views(siv);
}

/// Pulls pending engine events into the session and redraws. Scheduled by the proxy after every event.
pub(crate) fn drain_engine_events(siv: &mut Cursive) {
    let received = siv.get_holdup_userdata().receive_data_from_proxy();
    if received > 0 {
        debug!("Delivered {} engine event(s) to the intercept session", received);
    }

    refresh_views(siv);
}

/// Makes every widget reflect the session: window lifecycle, panes, held listing, status bar.
fn refresh_views(siv: &mut Cursive) {
    let ud = siv.get_holdup_userdata();
    let state = ud.session.view_state();
    let window_changed = ud.window_state != state;
    ud.window_state = state;
    let response_content = ud.response_view_content.clone();

    if window_changed {
        let created = intercept_view::sync_window(siv, state, &response_content);
        if created {
            siv.get_holdup_userdata().rendered_revision = None;
        }
    }

    let ud = siv.get_holdup_userdata();
    let revision = ud.session.display().revision();
    let mut request_text = None;
    if ud.rendered_revision != Some(revision) {
        ud.rendered_revision = Some(revision);
        ud.response_view_content.set_content(ud.session.display().response.clone());
        // an edited pane already holds the newest request text
        if !ud.session.is_modified() {
            request_text = Some((ud.session.display().request.clone(), !ud.session.display().is_blank()));
        }
    }

    let rows = ud.session.held_rows();
    if let Some(notice) = ud.session.take_notice() {
        ud.status.set_message(&notice);
        ud.push_error(notice);
    }
    ud.update_status();

    if let Some((text, editable)) = request_text {
        intercept_view::set_request_text(siv, &text, editable);
    }
    held_table::fill(siv, rows);
}

fn toggle_interception(siv: &mut Cursive) {
    let ud = siv.get_holdup_userdata();
    let on = !ud.session.is_enabled();
    ud.session.toggle_enabled(on);
    ud.status.clear_message();
    refresh_views(siv);
}

pub(super) fn forward_current(siv: &mut Cursive) {
    siv.get_holdup_userdata().session.forward();
    refresh_views(siv);
}

pub(super) fn drop_current(siv: &mut Cursive) {
    siv.get_holdup_userdata().session.drop();
    refresh_views(siv);
}

/// Copies the request pane into the session after a keystroke changed it.
pub(super) fn request_edited(siv: &mut Cursive) {
    let text = siv.call_on_name(intercept_view::REQUEST_PANE, |pane: &mut intercept_view::RequestPane| {
        pane.get_inner().get_content().to_string()
    });

    if let Some(text) = text {
        let ud = siv.get_holdup_userdata();
        ud.session.on_request_edited(text);
        ud.update_status();
    }
}

pub(super) fn destroy_intercept_window(siv: &mut Cursive) {
    let ud = siv.get_holdup_userdata();
    let dropped = ud.session.on_view_destroyed();
    ud.status.set_message(format!("Intercept window closed, {} held request(s) dropped", dropped));
    refresh_views(siv);
}
