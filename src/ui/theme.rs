use std::fs;

use ratatui::style::Color;
use rust_embed::Embed;
use serde::{Deserialize, Serialize};

use crate::config::Config;

#[derive(Embed)]
#[folder = "assets/themes/"]
struct ThemeAssets;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Theme {
    pub name: String,
    pub colors: ThemeColors,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ThemeColors {
    pub bg: String,
    pub fg: String,
    pub muted: String,
    pub accent: String,
    pub accent_alt: String,
    pub border: String,
    pub header_bg: String,
    pub header_fg: String,
    pub star: String,
    pub locked: String,
    pub mastered: String,
    pub correct: String,
    pub wrong: String,
    pub listening: String,
    pub bar_filled: String,
    pub bar_empty: String,
}

impl Theme {
    pub fn load(name: &str) -> Option<Self> {
        let user_theme_path = Config::config_dir()
            .join("themes")
            .join(format!("{name}.toml"));
        if let Ok(content) = fs::read_to_string(&user_theme_path)
            && let Ok(theme) = toml::from_str::<Theme>(&content)
        {
            return Some(theme);
        }

        let file = ThemeAssets::get(&format!("{name}.toml"))?;
        let content = std::str::from_utf8(file.data.as_ref()).ok()?;
        toml::from_str::<Theme>(content).ok()
    }

    pub fn available_themes() -> Vec<String> {
        ThemeAssets::iter()
            .filter_map(|f| f.strip_suffix(".toml").map(|n| n.to_string()))
            .collect()
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::load("hada").unwrap_or_else(|| Self {
            name: "default".to_string(),
            colors: ThemeColors::default(),
        })
    }
}

impl Default for ThemeColors {
    fn default() -> Self {
        Self {
            bg: "#fff0f6".to_string(),
            fg: "#4a3b47".to_string(),
            muted: "#a8929f".to_string(),
            accent: "#f06595".to_string(),
            accent_alt: "#9775fa".to_string(),
            border: "#fcc2d7".to_string(),
            header_bg: "#ffdeeb".to_string(),
            header_fg: "#c2255c".to_string(),
            star: "#fab005".to_string(),
            locked: "#ced4da".to_string(),
            mastered: "#40c057".to_string(),
            correct: "#51cf66".to_string(),
            wrong: "#ff6b6b".to_string(),
            listening: "#339af0".to_string(),
            bar_filled: "#f783ac".to_string(),
            bar_empty: "#e9ecef".to_string(),
        }
    }
}

impl ThemeColors {
    pub fn parse_color(hex: &str) -> Color {
        let hex = hex.trim_start_matches('#');
        if hex.len() == 6
            && let (Ok(r), Ok(g), Ok(b)) = (
                u8::from_str_radix(&hex[0..2], 16),
                u8::from_str_radix(&hex[2..4], 16),
                u8::from_str_radix(&hex[4..6], 16),
            )
        {
            return Color::Rgb(r, g, b);
        }
        Color::White
    }

    pub fn bg(&self) -> Color { Self::parse_color(&self.bg) }
    pub fn fg(&self) -> Color { Self::parse_color(&self.fg) }
    pub fn muted(&self) -> Color { Self::parse_color(&self.muted) }
    pub fn accent(&self) -> Color { Self::parse_color(&self.accent) }
    pub fn accent_alt(&self) -> Color { Self::parse_color(&self.accent_alt) }
    pub fn border(&self) -> Color { Self::parse_color(&self.border) }
    pub fn header_bg(&self) -> Color { Self::parse_color(&self.header_bg) }
    pub fn header_fg(&self) -> Color { Self::parse_color(&self.header_fg) }
    pub fn star(&self) -> Color { Self::parse_color(&self.star) }
    pub fn locked(&self) -> Color { Self::parse_color(&self.locked) }
    pub fn mastered(&self) -> Color { Self::parse_color(&self.mastered) }
    pub fn correct(&self) -> Color { Self::parse_color(&self.correct) }
    pub fn wrong(&self) -> Color { Self::parse_color(&self.wrong) }
    pub fn listening(&self) -> Color { Self::parse_color(&self.listening) }
    pub fn bar_filled(&self) -> Color { Self::parse_color(&self.bar_filled) }
    pub fn bar_empty(&self) -> Color { Self::parse_color(&self.bar_empty) }
}
