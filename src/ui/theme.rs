use crate::app::Theme;
use ratatui::style::Color;

/// Colors for one theme.
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    pub bg: Color,
    pub fg: Color,
    pub muted: Color,
    pub border: Color,
    pub accent: Color,
    pub card_bg: Color,
    pub selected_border: Color,
}

const DARK: Palette = Palette {
    bg: Color::Rgb(9, 9, 11),
    fg: Color::Rgb(241, 245, 249),
    muted: Color::Rgb(148, 163, 184),
    border: Color::Rgb(51, 65, 85),
    accent: Color::Rgb(220, 38, 38),
    card_bg: Color::Rgb(39, 39, 42),
    selected_border: Color::Rgb(239, 68, 68),
};

const LIGHT: Palette = Palette {
    bg: Color::Rgb(255, 255, 255),
    fg: Color::Rgb(15, 23, 42),
    muted: Color::Rgb(100, 116, 139),
    border: Color::Rgb(203, 213, 225),
    accent: Color::Rgb(220, 38, 38),
    card_bg: Color::Rgb(241, 245, 249),
    selected_border: Color::Rgb(185, 28, 28),
};

pub fn palette(theme: Theme) -> Palette {
    match theme {
        Theme::Dark => DARK,
        Theme::Light => LIGHT,
    }
}
