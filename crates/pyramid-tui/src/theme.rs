use crossterm::style::Color;

/// Color theme for the TUI
#[derive(Debug, Clone)]
pub struct Theme {
    pub name: &'static str,
    /// Background color
    pub bg: Color,
    /// Default text color
    pub fg: Color,
    /// Brick outline color
    pub border: Color,
    /// Given brick color
    pub given: Color,
    /// Player answer color
    pub filled: Color,
    /// Placeholder in empty bricks
    pub empty: Color,
    /// Selected brick background
    pub selected_bg: Color,
    /// Brick marked wrong
    pub wrong: Color,
    /// Solved puzzle / correct answer
    pub success: Color,
    /// Banner color while the "not quite" flash is on
    pub oops: Color,
    /// Info text color
    pub info: Color,
    /// Key binding text color
    pub key: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}

impl Theme {
    /// Dark theme (default)
    pub fn dark() -> Self {
        Self {
            name: "Dark",
            bg: Color::Rgb { r: 20, g: 22, b: 30 },
            fg: Color::Rgb { r: 230, g: 230, b: 240 },
            border: Color::Rgb { r: 110, g: 115, b: 140 },
            given: Color::Rgb { r: 255, g: 255, b: 255 },
            filled: Color::Rgb { r: 80, g: 180, b: 255 },
            empty: Color::DarkGrey,
            selected_bg: Color::Rgb { r: 70, g: 90, b: 140 },
            wrong: Color::Rgb { r: 255, g: 90, b: 90 },
            success: Color::Rgb { r: 90, g: 255, b: 130 },
            oops: Color::Rgb { r: 255, g: 170, b: 60 },
            info: Color::Rgb { r: 160, g: 165, b: 185 },
            key: Color::Rgb { r: 255, g: 210, b: 100 },
        }
    }

    /// Light theme
    pub fn light() -> Self {
        Self {
            name: "Light",
            bg: Color::Rgb { r: 248, g: 248, b: 252 },
            fg: Color::Rgb { r: 30, g: 30, b: 40 },
            border: Color::Rgb { r: 150, g: 150, b: 170 },
            given: Color::Rgb { r: 0, g: 0, b: 0 },
            filled: Color::Rgb { r: 30, g: 100, b: 200 },
            empty: Color::Rgb { r: 170, g: 170, b: 185 },
            selected_bg: Color::Rgb { r: 180, g: 200, b: 255 },
            wrong: Color::Rgb { r: 220, g: 50, b: 50 },
            success: Color::Rgb { r: 40, g: 160, b: 60 },
            oops: Color::Rgb { r: 210, g: 120, b: 0 },
            info: Color::Rgb { r: 90, g: 90, b: 110 },
            key: Color::Rgb { r: 200, g: 120, b: 20 },
        }
    }

    /// High contrast theme
    pub fn high_contrast() -> Self {
        Self {
            name: "High contrast",
            bg: Color::Black,
            fg: Color::White,
            border: Color::Grey,
            given: Color::Yellow,
            filled: Color::Cyan,
            empty: Color::Grey,
            selected_bg: Color::Blue,
            wrong: Color::Red,
            success: Color::Green,
            oops: Color::Magenta,
            info: Color::Grey,
            key: Color::Yellow,
        }
    }

    /// The theme after this one, wrapping around
    pub fn next(&self) -> Self {
        match self.name {
            "Dark" => Self::light(),
            "Light" => Self::high_contrast(),
            _ => Self::dark(),
        }
    }
}
