use ratatui::style::{Color, Modifier, Style};

use super::settings::AccentColor;

#[derive(Debug, Clone)]
pub struct Theme {
    pub accent: AccentColor,
    pub colors: ThemeColors,
    pub bubbles: BubbleStyle,
}

#[derive(Debug, Clone)]
pub struct ThemeColors {
    pub foreground: HexColor,
    pub muted: HexColor,
    pub border: HexColor,
    pub success: HexColor,
    pub error: HexColor,
}

impl Default for ThemeColors {
    fn default() -> Self {
        Self {
            foreground: HexColor::new("#c0caf5"),
            muted: HexColor::new("#565f89"),
            border: HexColor::new("#3b4261"),
            success: HexColor::new("#9ece6a"),
            error: HexColor::new("#f7768e"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct BubbleStyle {
    pub user: HexColor,
    pub assistant: HexColor,
    pub system: HexColor,
}

impl Default for BubbleStyle {
    fn default() -> Self {
        Self {
            user: HexColor::new("#7dcfff"),
            assistant: HexColor::new("#9ece6a"),
            system: HexColor::new("#a9b1d6"),
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::with_accent(AccentColor::default())
    }
}

impl Theme {
    pub fn with_accent(accent: AccentColor) -> Self {
        Self {
            accent,
            colors: ThemeColors::default(),
            bubbles: BubbleStyle::default(),
        }
    }

    pub fn accent_color(&self) -> Color {
        let hex = match self.accent {
            AccentColor::Blue => "#3584e4",
            AccentColor::Red => "#e01b24",
            AccentColor::Black => "#241f31",
            AccentColor::White => "#f6f5f4",
            AccentColor::Green => "#33d17a",
        };
        HexColor::new(hex).to_color()
    }

    /// Text colour that stays readable on top of the accent
    pub fn on_accent_color(&self) -> Color {
        match self.accent {
            AccentColor::White => Color::Black,
            _ => Color::White,
        }
    }

    pub fn border_style(&self, focused: bool) -> Style {
        if focused {
            Style::default()
                .fg(self.accent_color())
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(self.colors.border.to_color())
        }
    }

    pub fn active_tab_style(&self) -> Style {
        Style::default()
            .fg(self.on_accent_color())
            .bg(self.accent_color())
            .add_modifier(Modifier::BOLD)
    }

    pub fn muted_style(&self) -> Style {
        Style::default().fg(self.colors.muted.to_color())
    }
}

#[derive(Debug, Clone)]
pub struct HexColor(String);

impl HexColor {
    pub fn new(hex: &str) -> Self {
        Self(hex.to_string())
    }

    pub fn to_color(&self) -> Color {
        self.parse_hex().unwrap_or(Color::Reset)
    }

    fn parse_hex(&self) -> Option<Color> {
        let hex = self.0.strip_prefix('#').unwrap_or(&self.0);
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16).ok();
        Some(Color::Rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_color_parsing() {
        assert_eq!(HexColor::new("#ff8000").to_color(), Color::Rgb(255, 128, 0));
        assert_eq!(HexColor::new("00ff00").to_color(), Color::Rgb(0, 255, 0));
        assert_eq!(HexColor::new("#fff").to_color(), Color::Reset);
        assert_eq!(HexColor::new("#gg0000").to_color(), Color::Reset);
    }

    #[test]
    fn test_white_accent_uses_dark_text() {
        let theme = Theme::with_accent(AccentColor::White);
        assert_eq!(theme.on_accent_color(), Color::Black);
        assert_eq!(Theme::default().on_accent_color(), Color::White);
    }
}
