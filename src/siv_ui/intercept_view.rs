use cursive::{
    Cursive,
    event::{Event, EventResult, EventTrigger, Key},
    view::{Nameable, Resizable, Scrollable, View},
    views::{
        Dialog,
        HideableView,
        LinearLayout,
        NamedView,
        OnEventView,
        StackView,
        TextArea,
        TextContent,
        TextView,
    },
};
use log::debug;

use crate::intercept::ViewState;

pub(super) const INTERCEPT_WINDOW: &str = "intercept-window";
pub(super) const REQUEST_PANE: &str = "intercept-request";

pub(super) type InterceptWindow = HideableView<OnEventView<Dialog>>;
pub(super) type RequestPane = OnEventView<TextArea>;

fn is_edit_event(event: &Event) -> bool {
    matches!(
        event,
        Event::Char(_)
        | Event::Key(Key::Backspace)
        | Event::Key(Key::Del)
        | Event::Key(Key::Enter)
        | Event::Key(Key::Tab)
    )
}

fn make_request_pane() -> NamedView<RequestPane> {
    OnEventView::new(TextArea::new())
        .on_pre_event_inner(EventTrigger::from_fn(is_edit_event), |area: &mut TextArea, event: &Event| {
            let _ = area.on_event(event.clone());
            Some(EventResult::with_cb(|s| super::request_edited(s)))
        })
        .with_name(REQUEST_PANE)
}

fn make_window(response_content: TextContent) -> NamedView<InterceptWindow> {
    let panes = LinearLayout::horizontal()
        .child(
            Dialog::around(make_request_pane().scrollable().full_screen())
                .title("Request")
        )
        .child(
            Dialog::around(
                TextView::new_with_content(response_content)
                    .scrollable()
                    .full_screen()
            ).title("Response")
        );

    let window = OnEventView::new(
        Dialog::around(panes)
            .title("Request/Response Interceptor")
            .button("Forward", |s| super::forward_current(s))
            .button("Drop", |s| super::drop_current(s))
    )
        .on_event(Key::Esc, |s| super::destroy_intercept_window(s));

    HideableView::new(window).with_name(INTERCEPT_WINDOW)
}

/// Brings the window in line with the session's view state.
/// Returns true when the window was created by this call.
pub(super) fn sync_window(siv: &mut Cursive, state: ViewState, response_content: &TextContent) -> bool {
    let visible = state == ViewState::Shown;
    siv.call_on_name(INTERCEPT_WINDOW, |window: &mut InterceptWindow| {
        window.set_visible(visible);
    });

    let content = response_content.clone();
    siv.call_on_name("views-stack", move |sv: &mut StackView| {
        match (state, sv.find_layer_from_name(INTERCEPT_WINDOW)) {
            (ViewState::Absent, Some(pos)) => {
                debug!("Destroying intercept window");
                sv.remove_layer(pos);
                false
            },
            (ViewState::Hidden, Some(pos)) => {
                sv.move_to_back(pos);
                false
            },
            (ViewState::Shown, Some(pos)) => {
                sv.move_to_front(pos);
                false
            },
            (ViewState::Shown, None) => {
                debug!("Creating intercept window");
                sv.add_fullscreen_layer(make_window(content));
                true
            },
            (_, None) => false
        }
    }).unwrap_or(false)
}

/// Nothing to edit while idle, so the pane is disabled then.
pub(super) fn set_request_text(siv: &mut Cursive, text: &str, editable: bool) {
    siv.call_on_name(REQUEST_PANE, |pane: &mut RequestPane| {
        let area = pane.get_inner_mut();
        area.set_content(text);
        if editable { area.enable(); } else { area.disable(); }
    });
}
