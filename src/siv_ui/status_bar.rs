use cursive::{
    views::{
        TextView,
        LinearLayout, ResizedView, TextContent,
    },
    align::{Align, },
    view::{Resizable, Nameable}, utils::{markup::StyledString}, theme::{Style, Effect, BaseColor, },
};
use std::fmt::Display;

type StatusBar = ResizedView<LinearLayout>;

pub(super) struct StatusBarContent {
    message: TextContent,
    stats: TextContent
}

impl StatusBarContent {
    pub(super) fn new(m: TextContent, s: TextContent) -> Self {
        StatusBarContent {
            message: m,
            stats: s
        }
    }

    pub(super) fn set_message<T: Display>(&mut self, m: T) {
        self.message.set_content(StyledString::styled(format!(" {}", m), BaseColor::Black.light()));
    }

    pub(super) fn clear_message(&mut self) {
        self.message.set_content(StyledString::styled(" ", BaseColor::Black.light()));
    }

    pub(super) fn set_stats(&mut self, intercepting: bool, held: usize, queued: usize, modified: bool, errors: usize) {
        let mut stats = StyledString::new();
        if intercepting {
            stats.append_styled("Intercept: ON", Style::from(BaseColor::Green.light()).combine(Effect::Bold));
        }
        else {
            stats.append_styled("Intercept: OFF", BaseColor::Black.light());
        }

        let edited = if modified { " (edited)" } else { "" };
        stats.append_styled(
            format!(" ▾ Held: {} ({} queued){} ▾ Errors: {} ▾ Press '?' to get help ", held, queued, edited, errors),
            Style::from(BaseColor::Black.light()).combine(Effect::Underline)
        );

        self.stats.set_content(stats);
    }
}

pub(super) fn make_status_bar(left_content: TextContent, right_content: TextContent) -> StatusBar {
    let left_status_bar_part = TextView::new_with_content(left_content)
        .with_name("left-sb-part")
        .full_width();

    let right_status_bar_part = TextView::new_with_content(right_content)
        .align(Align::center_right())
        .with_name("right-sb-part")
        .full_width();

    let layout = LinearLayout::horizontal()
        .child(left_status_bar_part)
        .child(right_status_bar_part)
        .fixed_height(1);

    return layout;
}
