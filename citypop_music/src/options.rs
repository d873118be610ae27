// Per-run generation options.
//
// `GenerationOptions` is what the caller asks for: an era, a style, an
// artist influence. Every field is optional and unmatched combinations
// degrade to catalog fallbacks rather than erroring. The enums parse from
// the same lowercase strings the catalog JSON uses.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::OptionError;

/// Production era, which biases register, tension density and bass depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Era {
    #[serde(rename = "70s")]
    Seventies,
    #[serde(rename = "early80s")]
    EarlyEighties,
    #[serde(rename = "mid80s")]
    MidEighties,
    #[serde(rename = "late80s")]
    LateEighties,
}

impl Era {
    pub const ALL: [Era; 4] = [
        Era::Seventies,
        Era::EarlyEighties,
        Era::MidEighties,
        Era::LateEighties,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Era::Seventies => "70s",
            Era::EarlyEighties => "early80s",
            Era::MidEighties => "mid80s",
            Era::LateEighties => "late80s",
        }
    }
}

impl fmt::Display for Era {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Era {
    type Err = OptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Era::ALL
            .into_iter()
            .find(|era| era.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| OptionError::UnknownEra(s.to_string()))
    }
}

/// Playing style. Selects the tempo/velocity profile and spacing rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Style {
    Ballad,
    #[default]
    Uptempo,
    Fusion,
}

impl Style {
    pub const ALL: [Style; 3] = [Style::Ballad, Style::Uptempo, Style::Fusion];

    pub fn as_str(self) -> &'static str {
        match self {
            Style::Ballad => "ballad",
            Style::Uptempo => "uptempo",
            Style::Fusion => "fusion",
        }
    }
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Style {
    type Err = OptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Style::ALL
            .into_iter()
            .find(|style| style.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| OptionError::UnknownStyle(s.to_string()))
    }
}

/// Artists with a dedicated voicing rule. Influence strings are free-form;
/// anything else simply matches no rule.
pub const TATSURO_YAMASHITA: &str = "Tatsuro Yamashita";
pub const MARIYA_TAKEUCHI: &str = "Mariya Takeuchi";
pub const TOSHIKI_KADOMATSU: &str = "Toshiki Kadomatsu";

/// Options for a single generation run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GenerationOptions {
    pub era: Option<Era>,
    pub style: Option<Style>,
    pub artist_influence: Option<String>,
    /// Reserved for weighting voicing choice; not read by generation yet.
    pub complexity: Option<f64>,
    /// Offset chord onsets by the style profile's swing factor.
    pub swing: bool,
}

impl GenerationOptions {
    /// The style in effect: the requested one, or uptempo.
    pub fn effective_style(&self) -> Style {
        self.style.unwrap_or_default()
    }

    pub fn artist(&self) -> Option<&str> {
        self.artist_influence.as_deref()
    }

    pub fn with_era(mut self, era: Era) -> Self {
        self.era = Some(era);
        self
    }

    pub fn with_style(mut self, style: Style) -> Self {
        self.style = Some(style);
        self
    }

    pub fn with_artist(mut self, artist: impl Into<String>) -> Self {
        self.artist_influence = Some(artist.into());
        self
    }
}
