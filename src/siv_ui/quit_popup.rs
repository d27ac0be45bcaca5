use cursive::{Cursive,
    view::Nameable,
    theme::BaseColor,
    utils::markup::StyledString,
    views::{
        TextView,
        Dialog,
        StackView
    },
};

use super::sivuserdata::GetHoldupUserData;

fn release_and_quit(siv: &mut Cursive) {
    let ud = siv.get_holdup_userdata();
    ud.session.on_view_destroyed();
    siv.quit();
}

pub(super) fn draw_popup(siv: &mut Cursive) {
    if siv.find_name::<Dialog>("quit-popup").is_some() { return; }

    let held = siv.get_holdup_userdata().session.held_count();
    let text = if held > 0 {
        format!("\n  {} held request(s) will be dropped. Quit?  ", held)
    }
    else {
        "\n         Are you sure?         ".to_string()
    };

    let styled_text = StyledString::styled(text, BaseColor::Yellow.light());
    let txt = TextView::new(styled_text);

    let dialog_with_txt = Dialog::around(txt)
        .title("Quit")
        .button("No", |s: &mut Cursive| { hide_popup(s); })
        .button("Yes", |s: &mut Cursive| { release_and_quit(s); })
        .h_align(cursive::align::HAlign::Center)
        .with_name("quit-popup");

    siv.call_on_name("views-stack", |sv: &mut StackView| { sv.add_layer(dialog_with_txt) });
}

/// Removes the popup wherever it sits in the stack.
pub(super) fn hide_popup(siv: &mut Cursive) {
    siv.call_on_name("views-stack", |sv: &mut StackView| {
        if let Some(pos) = sv.find_layer_from_name("quit-popup") {
            sv.remove_layer(pos);
        }
    });
}
