use iced::alignment::Alignment;
use iced::widget::{button, column, container, pick_list, row, scrollable, text, Column, Space};
use iced::{Element, Length};

use crate::reports::drag_drop::{DropChoice, EditSession};
use crate::reports::tree::{self, TreeNode};
use crate::Message;

use super::style;

const INDENT: f32 = 16.0;

pub fn view<'a>(session: Option<&'a EditSession>, selected: Option<&'a str>, locked: bool) -> Element<'a, Message> {
    let mut panel = column![text("Report collections").size(11).color(style::TEXT_MUTED)].spacing(6);

    let Some(session) = session else {
        panel = panel.push(text("Nothing loaded yet").size(12).color(style::TEXT_MUTED));
        return container(panel).padding([8, 10]).height(Length::Fill).into();
    };

    let summary = if session.is_dirty() {
        format!("{} reports · unsaved changes", session.document_count())
    } else {
        format!("{} reports", session.document_count())
    };
    panel = panel.push(text(summary).size(10).color(if session.is_dirty() {
        style::WARNING
    } else {
        style::TEXT_MUTED
    }));

    if let Some(selected) = selected {
        panel = panel.push(move_controls(session, selected, locked));
    }

    let mut list = Column::new().spacing(2);
    if session.nodes().is_empty() {
        list = list.push(text("No collections").size(12).color(style::TEXT_MUTED));
    } else {
        list = push_nodes(list, session.nodes(), 0, selected);
    }
    panel = panel.push(scrollable(list).height(Length::Fill));

    container(panel)
        .padding([8, 10])
        .height(Length::Fill)
        .style(|_| style::surface_style(style::SURFACE_0, 0.0))
        .into()
}

fn push_nodes<'a>(
    mut list: Column<'a, Message>,
    nodes: &'a [TreeNode],
    depth: usize,
    selected: Option<&str>,
) -> Column<'a, Message> {
    for node in nodes {
        let is_selected = selected == Some(node.id());
        let marker = if node.is_collection() { "▾" } else { "•" };

        let row_button = button(
            row![
                text(marker).size(11).color(style::TEXT_MUTED),
                text(node.label()).size(12),
            ]
            .spacing(6)
            .align_y(Alignment::Center),
        )
        .on_press(Message::NodeSelected(node.id().to_string()))
        .width(Length::Fill)
        .padding([4, 6])
        .style(move |theme, status| style::tree_row_button(is_selected, theme, status));

        list = list.push(row![Space::with_width(depth as f32 * INDENT), row_button]);

        if let TreeNode::Collection(collection) = node {
            list = push_nodes(list, &collection.children, depth + 1, selected);
        }
    }
    list
}

fn move_controls<'a>(session: &'a EditSession, selected: &'a str, locked: bool) -> Element<'a, Message> {
    let Some(node) = tree::find_node(session.nodes(), selected) else {
        return Space::with_height(0).into();
    };

    let action = |label: &'a str, message: Message| {
        button(text(label).size(11))
            .on_press_maybe((!locked).then_some(message))
            .padding([3, 8])
            .style(style::ghost_button)
    };

    let choices = session.drop_choices(selected);
    let move_into = pick_list(choices, None::<DropChoice>, Message::MoveIntoSelected)
        .placeholder("Move into…")
        .text_size(11)
        .padding([3, 8])
        .width(Length::Fill)
        .style(style::pick_list_style);

    let mut controls = row![
        action("▲", Message::MoveUpPressed),
        action("▼", Message::MoveDownPressed),
        action("Outdent", Message::OutdentPressed),
    ]
    .spacing(4)
    .align_y(Alignment::Center);
    if !locked {
        controls = controls.push(move_into);
    }

    column![
        text(format!("Selected: {}", node.label())).size(11).color(style::TEXT),
        controls,
    ]
    .spacing(4)
    .into()
}
