use iced::alignment::Alignment;
use iced::widget::{button, checkbox, container, horizontal_space, row, text};
use iced::{Element, Length};

use crate::Message;

use super::style;

pub struct HeaderState<'a> {
    pub user_uid: &'a str,
    pub count_info: bool,
    pub dirty: bool,
    pub loading: bool,
    pub saving: bool,
}

pub fn view<'a>(state: HeaderState<'a>) -> Element<'a, Message> {
    let busy = state.loading || state.saving;

    let reload = button(text(if state.loading { "Loading…" } else { "Reload" }).size(12))
        .on_press_maybe((!busy).then_some(Message::ReloadPressed))
        .padding([5, 12])
        .style(style::ghost_button);

    let save = button(text(if state.saving { "Saving…" } else { "Save layout" }).size(12))
        .on_press_maybe((state.dirty && !busy).then_some(Message::SavePressed))
        .padding([5, 12])
        .style(style::primary_button);

    let counts = checkbox("Show counts", state.count_info)
        .on_toggle(Message::CountInfoToggled)
        .size(14)
        .text_size(12);

    container(
        row![
            text("DealerDesk Reports").size(16),
            text(format!("v{}", env!("CARGO_PKG_VERSION"))).size(10).color(style::TEXT_MUTED),
            text(state.user_uid).size(12).color(style::TEXT_MUTED),
            horizontal_space(),
            counts,
            reload,
            save,
        ]
        .spacing(10)
        .padding([6, 12])
        .align_y(Alignment::Center),
    )
    .width(Length::Fill)
    .style(|_| style::surface_style(style::SURFACE_1, 0.0))
    .into()
}

/// Bottom line showing the last error, or otherwise the last notice.
pub fn status_line<'a>(error: Option<&'a str>, notice: Option<&'a str>) -> Element<'a, Message> {
    let line = match (error, notice) {
        (Some(err), _) => text(format!("Error: {err}")).size(12).color(style::DANGER),
        (None, Some(notice)) => text(notice).size(12).color(style::TEXT_MUTED),
        (None, None) => text("").size(12),
    };

    container(line)
        .width(Length::Fill)
        .padding([4, 12])
        .style(|_| style::flat_surface_style(style::SURFACE_1))
        .into()
}
