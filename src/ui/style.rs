use iced::widget::{button, container, pick_list};
use iced::{Background, Border, Color, Theme};

use crate::datasets::Dataset;

const fn rgb(r: u8, g: u8, b: u8) -> Color {
    Color {
        r: r as f32 / 255.0,
        g: g as f32 / 255.0,
        b: b as f32 / 255.0,
        a: 1.0,
    }
}

pub const BG: Color = rgb(16, 20, 26);
pub const SURFACE_0: Color = rgb(21, 26, 33);
pub const SURFACE_1: Color = rgb(27, 33, 42);
pub const SURFACE_2: Color = rgb(34, 41, 52);
pub const SURFACE_3: Color = rgb(42, 50, 63);
pub const BORDER: Color = rgb(52, 62, 76);
pub const TEXT: Color = rgb(228, 234, 242);
pub const TEXT_MUTED: Color = rgb(130, 143, 158);
pub const PRIMARY: Color = rgb(64, 150, 236);
pub const PRIMARY_HOVER: Color = rgb(86, 168, 246);
pub const WARNING: Color = rgb(242, 186, 64);
pub const DANGER: Color = rgb(226, 92, 92);

pub fn dataset_color(dataset: Dataset) -> Color {
    match dataset {
        Dataset::Inventory => rgb(82, 167, 244),
        Dataset::Contacts => rgb(255, 176, 59),
        Dataset::Deals => rgb(73, 204, 144),
        Dataset::Accounts => rgb(180, 130, 240),
    }
}

pub fn app_theme() -> Theme {
    Theme::custom(
        "DealerDesk".to_string(),
        iced::theme::Palette {
            background: BG,
            text: TEXT,
            primary: PRIMARY,
            success: rgb(58, 201, 111),
            danger: DANGER,
        },
    )
}

pub fn surface_style(color: Color, border_radius: f32) -> container::Style {
    container::Style::default()
        .background(Background::Color(color))
        .color(TEXT)
        .border(Border {
            radius: border_radius.into(),
            width: 1.0,
            color: BORDER,
        })
}

pub fn flat_surface_style(color: Color) -> container::Style {
    container::Style::default()
        .background(Background::Color(color))
        .color(TEXT)
}

fn filled(bg: Color, text_color: Color, radius: f32, border: Color) -> button::Style {
    button::Style {
        background: Some(Background::Color(bg)),
        text_color,
        border: Border {
            radius: radius.into(),
            width: 1.0,
            color: border,
        },
        shadow: Default::default(),
    }
}

pub fn primary_button(_theme: &Theme, status: button::Status) -> button::Style {
    match status {
        button::Status::Active | button::Status::Pressed => filled(PRIMARY, BG, 8.0, PRIMARY),
        button::Status::Hovered => filled(PRIMARY_HOVER, BG, 8.0, PRIMARY_HOVER),
        button::Status::Disabled => filled(SURFACE_3, TEXT_MUTED, 8.0, SURFACE_3),
    }
}

pub fn ghost_button(_theme: &Theme, status: button::Status) -> button::Style {
    let bg = match status {
        button::Status::Hovered | button::Status::Pressed => SURFACE_2,
        button::Status::Active | button::Status::Disabled => SURFACE_1,
    };
    let text_color = if matches!(status, button::Status::Disabled) {
        SURFACE_3
    } else {
        TEXT_MUTED
    };
    filled(bg, text_color, 6.0, BORDER)
}

/// Tree rows. The selected row gets a tinted background and an accent border.
pub fn tree_row_button(selected: bool, _theme: &Theme, status: button::Status) -> button::Style {
    let bg = match status {
        button::Status::Active | button::Status::Disabled if selected => Color { a: 0.18, ..PRIMARY },
        button::Status::Active | button::Status::Disabled => Color::TRANSPARENT,
        button::Status::Hovered => SURFACE_2,
        button::Status::Pressed => SURFACE_3,
    };

    button::Style {
        background: Some(Background::Color(bg)),
        text_color: if selected { TEXT } else { TEXT_MUTED },
        border: Border {
            radius: 4.0.into(),
            width: if selected { 1.0 } else { 0.0 },
            color: if selected { PRIMARY } else { Color::TRANSPARENT },
        },
        shadow: Default::default(),
    }
}

/// Dataset tabs. Disabled tabs are datasets the current selection rules out.
pub fn dataset_tab_button(dataset: Dataset, active: bool, _theme: &Theme, status: button::Status) -> button::Style {
    let accent = dataset_color(dataset);
    let (bg, text_color) = match status {
        button::Status::Disabled => (SURFACE_0, SURFACE_3),
        button::Status::Active if active => (Color { a: 0.16, ..accent }, accent),
        button::Status::Active => (SURFACE_1, TEXT_MUTED),
        button::Status::Hovered | button::Status::Pressed => (SURFACE_2, TEXT),
    };

    button::Style {
        background: Some(Background::Color(bg)),
        text_color,
        border: Border {
            radius: 0.0.into(),
            width: if active { 1.0 } else { 0.0 },
            color: accent,
        },
        shadow: Default::default(),
    }
}

pub fn pick_list_style(_theme: &Theme, status: pick_list::Status) -> pick_list::Style {
    let border_color = match status {
        pick_list::Status::Active => BORDER,
        pick_list::Status::Hovered | pick_list::Status::Opened => PRIMARY,
    };

    pick_list::Style {
        text_color: TEXT,
        background: Background::Color(SURFACE_1),
        placeholder_color: TEXT_MUTED,
        handle_color: TEXT_MUTED,
        border: Border {
            radius: 6.0.into(),
            width: 1.0,
            color: border_color,
        },
    }
}
