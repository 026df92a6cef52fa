use iced::alignment::Alignment;
use iced::widget::{button, checkbox, column, container, horizontal_space, row, scrollable, text, Column};
use iced::{Element, Length};

use crate::datasets::column_select::ColumnSelection;
use crate::datasets::{Dataset, DatasetInfo, ReportColumn};
use crate::Message;

use super::style;

pub struct ColumnSelectState<'a> {
    pub catalog: &'a [DatasetInfo],
    pub selection: &'a ColumnSelection,
    pub columns: Option<&'a [ReportColumn]>,
}

pub fn view<'a>(state: ColumnSelectState<'a>) -> Element<'a, Message> {
    let selectable = state.selection.selectable_datasets(state.catalog);
    let browsing = state.selection.browsing();

    let mut tabs = row![].spacing(0).height(32);
    for dataset in Dataset::ALL {
        let enabled = selectable.contains(&dataset);
        let active = browsing == Some(dataset);
        tabs = tabs.push(
            button(text(dataset.to_string()).size(12))
                .on_press_maybe(enabled.then_some(Message::DatasetBrowsed(dataset)))
                .width(Length::Fill)
                .padding([7, 10])
                .style(move |theme, status| style::dataset_tab_button(dataset, active, theme, status)),
        );
    }

    let mut hints = Column::new().spacing(2);
    for hint in state.selection.incompatible_pairs(state.catalog) {
        hints = hints.push(text(hint).size(11).color(style::WARNING));
    }

    column![
        container(tabs).style(|_| style::flat_surface_style(style::SURFACE_0)),
        hints,
        row![
            container(available_columns(&state)).width(Length::FillPortion(1)),
            container(selected_columns(state.selection)).width(Length::FillPortion(1)),
        ]
        .spacing(10)
        .height(Length::Fill),
    ]
    .spacing(8)
    .padding(10)
    .height(Length::Fill)
    .into()
}

fn available_columns<'a>(state: &ColumnSelectState<'a>) -> Element<'a, Message> {
    let selection = state.selection;
    let Some(dataset) = selection.browsing() else {
        return text("Pick a dataset").size(12).color(style::TEXT_MUTED).into();
    };

    let mut list = column![text(format!("{dataset} columns")).size(11).color(style::TEXT_MUTED)].spacing(4);
    match state.columns {
        None => list = list.push(text("Loading columns…").size(12).color(style::TEXT_MUTED)),
        Some([]) => list = list.push(text("No columns").size(12).color(style::TEXT_MUTED)),
        Some(columns) => {
            for column in columns {
                let toggled = column.clone();
                list = list.push(
                    checkbox(column.name.as_str(), selection.is_selected(column))
                        .on_toggle(move |checked| Message::ColumnToggled(toggled.clone(), checked))
                        .size(14)
                        .text_size(12),
                );
            }
        }
    }

    scrollable(list).height(Length::Fill).into()
}

fn selected_columns(selection: &ColumnSelection) -> Element<'_, Message> {
    let mut list = column![text("Selected columns").size(11).color(style::TEXT_MUTED)].spacing(4);

    if selection.selected().is_empty() {
        list = list.push(text("No columns selected").size(12).color(style::TEXT_MUTED));
    }

    for (index, column) in selection.selected().iter().enumerate() {
        list = list.push(
            row![
                text(column.dataset.to_string()).size(10).color(style::dataset_color(column.dataset)),
                text(column.name.as_str()).size(12),
                horizontal_space(),
                button(text("✕").size(11))
                    .on_press(Message::ColumnRemoved(index))
                    .padding([2, 6])
                    .style(style::ghost_button),
            ]
            .spacing(6)
            .align_y(Alignment::Center),
        );
    }

    container(scrollable(list).height(Length::Fill))
        .padding(8)
        .height(Length::Fill)
        .style(|_| style::surface_style(style::SURFACE_1, 8.0))
        .into()
}
