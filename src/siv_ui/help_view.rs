use cursive::{
    Cursive,
    views::{
        TextView,
        OnEventView,
        Dialog
    },
    align::HAlign,
    view::Resizable, utils::span::SpannedString, theme::{Style, Effect, BaseColor},
    event::Key
};
use std::{rc::Rc, ops::Deref};

pub(super) fn make_help_message() -> SpannedString<Style> {
    let letters_style: Style = BaseColor::Green.light().into();
    let descriptions_style: Style = Effect::Bold.into();
    let txt: Vec<SpannedString<Style>> = vec![
        SpannedString::styled("F2  - ", letters_style),
        SpannedString::styled("Turn interception on/off (shows/hides the intercept window)\n", descriptions_style),

        SpannedString::styled("F5  - ", letters_style),
        SpannedString::styled("Forward the request on display, show the next held one\n", descriptions_style),

        SpannedString::styled("F6  - ", letters_style),
        SpannedString::styled("Drop the request on display, show the next held one\n", descriptions_style),

        SpannedString::styled("Esc - ", letters_style),
        SpannedString::styled("Close the intercept window, every held request is dropped\n", descriptions_style),

        SpannedString::styled("?   - ", letters_style),
        SpannedString::styled("Show this help view\n", descriptions_style),

        SpannedString::styled("e   - ", letters_style),
        SpannedString::styled("Show error logs view\n", descriptions_style),

        SpannedString::styled("q   - ", letters_style),
        SpannedString::styled("Quit\n", descriptions_style),

        SpannedString::styled("\nEdits made in the request pane are not applied: a forwarded request is sent as captured.\n", BaseColor::Yellow.light()),
    ];

    let mut result = SpannedString::<Style>::default();
    for item in txt {
        result.append(item);
    }

    return result;
}

pub(super) fn draw_help_view(siv: &mut Cursive, content: &Rc<SpannedString<Style>>) {
    let help = TextView::new(content.deref().clone());
    let help = OnEventView::new(help)
        .on_event('q', |s| { s.pop_layer(); })
        .on_event(Key::Esc, |s| { s.pop_layer(); })
        .on_event('?', |_| {})
        .on_event('e', |_| {});
    let help = Dialog::around(help).title("Help")
        .title_position(HAlign::Center)
        .full_screen();

    siv.add_fullscreen_layer(help);
}
