use ratatui::style::Color;

/// Colours used by the TUI
#[derive(Debug, Clone)]
pub struct Theme {
    pub text_primary: Color,
    pub text_secondary: Color,
    pub text_tertiary: Color,
    pub accent_primary: Color,
    pub accent_success: Color,
    pub accent_warning: Color,
    pub accent_error: Color,
    pub border_primary: Color,
    pub bg_surface: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            text_primary: Color::White,
            text_secondary: Color::Gray,
            text_tertiary: Color::DarkGray,
            accent_primary: Color::Cyan,
            accent_success: Color::Green,
            accent_warning: Color::Yellow,
            accent_error: Color::Red,
            border_primary: Color::DarkGray,
            bg_surface: Color::Rgb(40, 44, 52),
        }
    }
}
