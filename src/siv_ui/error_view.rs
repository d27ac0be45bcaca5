use cursive::{
    Cursive,
    views::{
        TextView,
        OnEventView,
        Dialog,
    },
    align::HAlign,
    view::{
        Resizable,
        Nameable
    },
    event::Key, utils::span::SpannedString, theme::{Style, BaseColor}
};
use super::sivuserdata::GetHoldupUserData;
use crate::utils::HoldupError;

pub(super) fn draw_error_view(siv: &mut Cursive) {
    if siv.find_name::<TextView>("errors-popup").is_some() { return; }

    let ud = siv.get_holdup_userdata();
    ud.status.clear_message();

    let mut err_msg = SpannedString::new();
    for e in ud.errors.iter() {
        err_msg.append_styled(">>> ", Style::from(BaseColor::Red.light()));
        err_msg.append(e.to_string());
        err_msg.append("\n");
    }

    let errors = TextView::new(err_msg)
        .with_name("errors-popup");
    let errors = OnEventView::new(errors)
        .on_event(Key::Esc, |s| { s.pop_layer(); });

    let errors = Dialog::around(errors).title("Errors")
        .title_position(HAlign::Center)
        .full_screen();

    siv.add_fullscreen_layer(errors);
}

/// The proxy task died (usually failed to bind); the UI keeps running so the reason is visible.
pub(crate) fn report_proxy_failure(siv: &mut Cursive, err: HoldupError) {
    let ud = siv.get_holdup_userdata();
    ud.status.set_message(format!("Proxy stopped: {}", &err));
    ud.push_error(err);
}
