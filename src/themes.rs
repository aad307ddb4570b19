/// Colors for one heatmap theme: the cell color for days without posts plus
/// an ordered ramp of four increasingly intense colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThemeSpec {
    pub empty: &'static str,
    pub ramp: [&'static str; 4],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    Github,
    Halloween,
    Winter,
}

const GITHUB: ThemeSpec = ThemeSpec {
    empty: "#ebedf0",
    ramp: ["#9be9a8", "#40c463", "#30a14e", "#216e39"],
};

const HALLOWEEN: ThemeSpec = ThemeSpec {
    empty: "#ebedf0",
    ramp: ["#fdf156", "#ffc722", "#ff9711", "#ff0999"],
};

const WINTER: ThemeSpec = ThemeSpec {
    empty: "#ebedf0",
    ramp: ["#b6e3ff", "#54aeff", "#0969da", "#0a3069"],
};

impl Theme {
    pub const ALL: [Theme; 3] = [Theme::Github, Theme::Halloween, Theme::Winter];

    pub fn parse(name: &str) -> Option<Theme> {
        match name {
            "github" => Some(Theme::Github),
            "halloween" => Some(Theme::Halloween),
            "winter" => Some(Theme::Winter),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Theme::Github => "github",
            Theme::Halloween => "halloween",
            Theme::Winter => "winter",
        }
    }

    pub fn spec(self) -> &'static ThemeSpec {
        match self {
            Theme::Github => &GITHUB,
            Theme::Halloween => &HALLOWEEN,
            Theme::Winter => &WINTER,
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Theme::Github
    }
}
