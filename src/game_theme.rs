use clap::ValueEnum;
use ratatui::style::Color;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum GameTheme {
    Classic,
    Monokai,
    Solarized,
    Dracula,
    GruvboxDark,
    Nord,
    OneDark,
}

pub struct ThemeColors {
    /// Play field fill; trail points fade toward it.
    pub field: Color,
    pub border: Color,
    pub text: Color,
    pub accent: Color,
    pub paddle: Color,
    pub net: Color,
    pub ball: Color,
}

const ALL_THEMES: [GameTheme; 7] = [
    GameTheme::Classic,
    GameTheme::Monokai,
    GameTheme::Solarized,
    GameTheme::Dracula,
    GameTheme::GruvboxDark,
    GameTheme::Nord,
    GameTheme::OneDark,
];

impl GameTheme {
    pub fn name(&self) -> &'static str {
        match self {
            GameTheme::Classic => "Classic",
            GameTheme::Monokai => "Monokai",
            GameTheme::Solarized => "Solarized",
            GameTheme::Dracula => "Dracula",
            GameTheme::GruvboxDark => "Gruvbox Dark",
            GameTheme::Nord => "Nord",
            GameTheme::OneDark => "One Dark",
        }
    }

    pub fn next(&self) -> Self {
        let idx = *self as usize;
        ALL_THEMES[(idx + 1) % ALL_THEMES.len()]
    }

    pub fn previous(&self) -> Self {
        let idx = *self as usize;
        ALL_THEMES[(idx + ALL_THEMES.len() - 1) % ALL_THEMES.len()]
    }

    pub fn colors(&self) -> ThemeColors {
        match self {
            GameTheme::Classic => ThemeColors {
                field: Color::Rgb(0, 0, 0),
                border: Color::White,
                text: Color::White,
                accent: Color::Gray,
                paddle: Color::Rgb(255, 255, 255),
                net: Color::Rgb(255, 255, 255),
                ball: Color::Rgb(255, 255, 255),
            },
            GameTheme::Monokai => ThemeColors {
                field: Color::Rgb(39, 40, 34),     // Monokai background
                border: Color::Rgb(249, 38, 114),  // Monokai pink
                text: Color::Rgb(248, 248, 242),   // Monokai foreground
                accent: Color::Rgb(166, 226, 46),  // Monokai green
                paddle: Color::Rgb(102, 217, 239), // Monokai cyan
                net: Color::Rgb(117, 113, 94),     // Monokai comment
                ball: Color::Rgb(255, 95, 135),    // Monokai light pink
            },
            GameTheme::Solarized => ThemeColors {
                field: Color::Rgb(0, 43, 54),     // Solarized base03
                border: Color::Rgb(38, 139, 210), // Solarized blue
                text: Color::Rgb(131, 148, 150),  // Solarized base0
                accent: Color::Rgb(42, 161, 152), // Solarized cyan
                paddle: Color::Rgb(133, 153, 0),  // Solarized green
                net: Color::Rgb(88, 110, 117),    // Solarized base01
                ball: Color::Rgb(220, 50, 47),    // Solarized red
            },
            GameTheme::Dracula => ThemeColors {
                field: Color::Rgb(40, 42, 54),     // Dracula background
                border: Color::Rgb(255, 121, 198), // Dracula pink
                text: Color::Rgb(248, 248, 242),   // Dracula foreground
                accent: Color::Rgb(189, 147, 249), // Dracula purple
                paddle: Color::Rgb(80, 250, 123),  // Dracula green
                net: Color::Rgb(98, 114, 164),     // Dracula comment
                ball: Color::Rgb(255, 85, 85),     // Dracula red
            },
            GameTheme::GruvboxDark => ThemeColors {
                field: Color::Rgb(40, 40, 40),     // Gruvbox bg
                border: Color::Rgb(250, 189, 47),  // Gruvbox yellow
                text: Color::Rgb(235, 219, 178),   // Gruvbox fg
                accent: Color::Rgb(184, 187, 38),  // Gruvbox green
                paddle: Color::Rgb(131, 165, 152), // Gruvbox blue
                net: Color::Rgb(146, 131, 116),    // Gruvbox gray
                ball: Color::Rgb(251, 73, 52),     // Gruvbox red
            },
            GameTheme::Nord => ThemeColors {
                field: Color::Rgb(46, 52, 64),     // Nord polar night
                border: Color::Rgb(136, 192, 208), // Nord frost
                text: Color::Rgb(216, 222, 233),   // Nord snow storm
                accent: Color::Rgb(143, 188, 187), // Nord cyan
                paddle: Color::Rgb(94, 129, 172),  // Nord blue
                net: Color::Rgb(76, 86, 106),      // Nord polar night 4
                ball: Color::Rgb(191, 97, 106),    // Nord red
            },
            GameTheme::OneDark => ThemeColors {
                field: Color::Rgb(40, 44, 52),     // One Dark background
                border: Color::Rgb(198, 120, 221), // One Dark purple
                text: Color::Rgb(171, 178, 191),   // One Dark fg
                accent: Color::Rgb(97, 175, 239),  // One Dark blue
                paddle: Color::Rgb(152, 195, 121), // One Dark green
                net: Color::Rgb(92, 99, 112),      // One Dark comment
                ball: Color::Rgb(224, 108, 117),   // One Dark red
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycling_visits_every_theme() {
        let mut theme = GameTheme::Classic;
        for expected in ALL_THEMES.iter().skip(1) {
            theme = theme.next();
            assert_eq!(theme, *expected);
        }
        assert_eq!(theme.next(), GameTheme::Classic);
        assert_eq!(GameTheme::Classic.previous(), GameTheme::OneDark);
    }
}
